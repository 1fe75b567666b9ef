//! Frostglass renders a parametrized "frosted glass" visual: a canvas of
//! horizontal wavy strips, each filled with a semi-transparent gradient
//! derived from three colors, optionally over centered text, finished with a
//! sparse-noise + blur frost pass.
//!
//! # Pipeline overview
//!
//! 1. **Parameters**: an immutable [`RenderParams`] snapshot, replaced
//!    wholesale per control change via the pure reducer
//!    [`RenderParams::with_update`]
//! 2. **Coalesce**: [`UpdateCoalescer`] keeps only the newest pending
//!    snapshot per tick
//! 3. **Render**: [`Renderer::render`] turns one snapshot into a
//!    premultiplied RGBA8 [`FrameRgba`] (clear, text, strips, frost)
//!
//! Rendering is deterministic for a given snapshot: all randomness (pastel
//! defaults, frost noise) derives from the snapshot's seed.

#![forbid(unsafe_code)]

pub mod blur;
pub mod color;
pub mod error;
pub mod gradient;
pub mod noise;
pub mod params;
pub mod render;
pub mod rng;
pub mod session;
pub mod strips;
pub mod text;

pub use color::{MID_GRAY, Rgb, lerp};
pub use error::{FrostError, FrostResult};
pub use gradient::{GradientCache, GradientColors, GradientParams, STOP_ALPHA, map_to_color};
pub use params::{ParamUpdate, RenderParams};
pub use render::{FrameRgba, RenderSettings, Renderer, VIEWPORT_SCALE};
pub use rng::Rng64;
pub use session::{RenderSession, UpdateCoalescer};
pub use strips::{StripLayout, layout_strips, strip_path, strip_position};
pub use text::{TextBrush, TextEngine};
