use std::sync::Arc;

use crate::{
    color::Rgb,
    error::{FrostError, FrostResult},
    gradient::{GradientCache, STOP_ALPHA, STOP_POSITIONS},
    noise,
    params::RenderParams,
    strips::{StripLayout, layout_strips, strip_path, strip_stop_colors},
    text::{TextBrush, TextEngine, centered_origin},
};

/// The canvas occupies this fraction of the viewport, per axis.
pub const VIEWPORT_SCALE: f64 = 0.8;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Opaque background the strips composite over (RGBA8, straight alpha).
    pub background: [u8; 4],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 800,
            background: [255, 255, 255, 255],
        }
    }
}

/// One rendered frame: premultiplied RGBA8 bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Owns the raster surface and the gradient cache; re-runs the full pipeline
/// for each parameter snapshot. A render is synchronous and atomic: either a
/// complete frame comes back or an error does, never a partial frame.
pub struct Renderer {
    settings: RenderSettings,
    cache: GradientCache,
    text: TextEngine,
    font_bytes: Option<Vec<u8>>,
    font: Option<vello_cpu::peniko::FontData>,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> FrostResult<Self> {
        if settings.viewport_width == 0 || settings.viewport_height == 0 {
            return Err(FrostError::validation("viewport must be non-zero"));
        }
        let placeholder = RenderParams::with_random_pastels(0);
        Ok(Self {
            settings,
            cache: GradientCache::new(placeholder.gradient_params()),
            text: TextEngine::new(),
            font_bytes: None,
            font: None,
        })
    }

    /// Font used by the text overlay. Without one, non-empty `text` is
    /// skipped with a warning rather than failing the render.
    pub fn set_font_bytes(&mut self, bytes: Vec<u8>) {
        self.font = Some(vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.clone()),
            0,
        ));
        self.font_bytes = Some(bytes);
    }

    /// Viewport is read once per render; there is no live resize handling.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.settings.viewport_width = width.max(1);
        self.settings.viewport_height = height.max(1);
    }

    /// Canvas dimensions for the next render: 80% of the viewport, floored.
    pub fn canvas_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((f64::from(v) * VIEWPORT_SCALE).floor() as u32).max(1);
        (
            scale(self.settings.viewport_width),
            scale(self.settings.viewport_height),
        )
    }

    #[tracing::instrument(skip(self, params))]
    pub fn render(&mut self, params: &RenderParams) -> FrostResult<FrameRgba> {
        let params = params.normalized();
        params.validate()?;

        let (width, height) = self.canvas_size();
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| FrostError::render("canvas width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| FrostError::render("canvas height exceeds u16"))?;

        self.cache.ensure_params(params.gradient_params());

        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        self.draw_background(&mut ctx, width, height);
        // Text goes down first so strips can partially occlude it.
        self.draw_text(&mut ctx, &params, width, height)?;

        let strips = layout_strips(f64::from(height), &params);
        for strip in &strips {
            self.draw_strip(&mut ctx, strip, &params, width)?;
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        ctx.render_to_pixmap(&mut pixmap);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        noise::frost(&mut data, width, height, params.noise_scale, params.seed)?;

        tracing::debug!(
            strips = strips.len(),
            cache_entries = self.cache.len(),
            frost_sigma = noise::blur_sigma_px(params.noise_scale),
            "rendered frame"
        );

        Ok(FrameRgba {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    fn draw_background(&self, ctx: &mut vello_cpu::RenderContext, width: u32, height: u32) {
        let [r, g, b, a] = self.settings.background;
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        params: &RenderParams,
        width: u32,
        height: u32,
    ) -> FrostResult<()> {
        if params.text.is_empty() {
            return Ok(());
        }
        let (Some(font_bytes), Some(font)) = (self.font_bytes.as_ref(), self.font.as_ref()) else {
            tracing::warn!("text overlay skipped: no font bytes supplied");
            return Ok(());
        };

        let brush = TextBrush::opaque(params.text_color);
        let layout = self
            .text
            .layout(&params.text, font_bytes, params.font_size as f32, brush)?;

        let (ox, oy) = centered_origin(
            f64::from(width),
            f64::from(height),
            f64::from(layout.width()),
            f64::from(layout.height()),
        );
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((ox, oy)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn draw_strip(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        strip: &StripLayout,
        params: &RenderParams,
        width: u32,
    ) -> FrostResult<()> {
        let stops = strip_stop_colors(&mut self.cache, strip.position);
        let gradient_height = (strip.height.ceil() as u32).max(1);
        let paint = gradient_image(&stops, width, gradient_height)?;

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((0.0, strip.y_offset)));
        ctx.set_paint(paint);
        ctx.fill_path(&bezpath_to_cpu(&strip_path(width, strip, params)));
        Ok(())
    }
}

/// Rasterize the six-stop vertical gradient for one strip into an image
/// paint. Rows interpolate linearly between adjacent stops; every stop
/// carries the fixed strip alpha.
fn gradient_image(stops: &[Rgb; 6], width: u32, height: u32) -> FrostResult<vello_cpu::Image> {
    let mut bytes = vec![0u8; (width as usize) * (height as usize) * 4];
    let h1 = (height.max(1) - 1) as f64;
    for y in 0..height {
        let t = if h1 <= 0.0 { 0.0 } else { f64::from(y) / h1 };
        let px = premul_rgba8(row_color(stops, t), STOP_ALPHA);
        let row_start = (y as usize) * (width as usize) * 4;
        for x in 0..width as usize {
            let idx = row_start + x * 4;
            bytes[idx..idx + 4].copy_from_slice(&px);
        }
    }
    rgba_premul_to_image(&bytes, width, height)
}

fn row_color(stops: &[Rgb; 6], t: f64) -> Rgb {
    let segment_span = STOP_POSITIONS[1] - STOP_POSITIONS[0];
    let seg = ((t / segment_span).floor() as usize).min(stops.len() - 2);
    let local = ((t - STOP_POSITIONS[seg]) / segment_span).clamp(0.0, 1.0);
    let (a, b) = (stops[seg], stops[seg + 1]);

    fn mix(a: u8, b: u8, t: f64) -> u8 {
        crate::color::lerp(f64::from(a), f64::from(b), t)
            .round()
            .clamp(0.0, 255.0) as u8
    }

    Rgb {
        r: mix(a.r, b.r, local),
        g: mix(a.g, b.g, local),
        b: mix(a.b, b.b, local),
    }
}

fn premul_rgba8(color: Rgb, alpha: u8) -> [u8; 4] {
    fn premul(c: u8, a: u8) -> u8 {
        let c = u16::from(c);
        let a = u16::from(a);
        (((c * a) + 127) / 255) as u8
    }
    [
        premul(color.r, alpha),
        premul(color.g, alpha),
        premul(color.b, alpha),
        alpha,
    ]
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> FrostResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FrostError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FrostError::render("pixmap height exceeds u16"))?;
    if bytes.len() != width as usize * height as usize * 4 {
        return Err(FrostError::render("pixmap byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in bytes.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn rgba_premul_to_image(bytes: &[u8], width: u32, height: u32) -> FrostResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}
