use kurbo::BezPath;

use crate::{
    color::Rgb,
    gradient::{GradientCache, STOP_POSITIONS},
    params::RenderParams,
};

/// Placement of one horizontal strip, in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StripLayout {
    pub index: u32,
    /// Top of the strip band (before wave modulation).
    pub y_offset: f64,
    pub height: f64,
    /// Normalized position of the strip across the canvas, in [0,1].
    pub position: f64,
    /// Sine phase offset for this strip.
    pub phase: f64,
}

/// `i / (N-1)` with the single-strip guard: one strip sits at position 0
/// rather than dividing by zero and feeding NaN into cache keys.
pub fn strip_position(index: u32, strip_count: u32) -> f64 {
    if strip_count <= 1 {
        0.0
    } else {
        f64::from(index) / f64::from(strip_count - 1)
    }
}

pub fn layout_strips(canvas_height: f64, params: &RenderParams) -> Vec<StripLayout> {
    let n = params.strip_count.max(1);
    let height = canvas_height / f64::from(n);
    (0..n)
        .map(|i| StripLayout {
            index: i,
            y_offset: f64::from(i) * height,
            height,
            position: strip_position(i, n),
            phase: f64::from(i) * params.wave_offset * std::f64::consts::PI,
        })
        .collect()
}

/// Wave displacement at horizontal position `x`.
pub fn wave_y(x: f64, frequency: f64, phase: f64, amplitude: f64) -> f64 {
    (x * frequency * 0.01 + phase).sin() * amplitude
}

/// The closed region of one strip, in strip-local coordinates (the renderer
/// translates by `y_offset`). Top and bottom edges sample the wave at every
/// integer x from 0 to `canvas_width` inclusive; the bottom edge is the same
/// wave shifted down by the strip height, traced right to left.
pub fn strip_path(canvas_width: u32, strip: &StripLayout, params: &RenderParams) -> BezPath {
    let freq = params.wave_frequency;
    let amp = params.wave_amplitude;
    let mut path = BezPath::new();

    path.move_to((0.0, wave_y(0.0, freq, strip.phase, amp)));
    for x in 1..=canvas_width {
        let x = f64::from(x);
        path.line_to((x, wave_y(x, freq, strip.phase, amp)));
    }
    for x in (0..=canvas_width).rev() {
        let x = f64::from(x);
        path.line_to((x, strip.height + wave_y(x, freq, strip.phase, amp)));
    }
    path.close_path();
    path
}

/// The six gradient stop colors for a strip, sampled through the cache at 0.2
/// intervals.
pub fn strip_stop_colors(cache: &mut GradientCache, strip_position: f64) -> [Rgb; 6] {
    STOP_POSITIONS.map(|pos| cache.color_at(pos, strip_position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::GradientParams;
    use kurbo::Shape;

    fn params(strip_count: u32) -> RenderParams {
        let mut p = RenderParams::with_random_pastels(1);
        p.strip_count = strip_count;
        p
    }

    #[test]
    fn single_strip_position_is_defined() {
        let pos = strip_position(0, 1);
        assert_eq!(pos, 0.0);
        assert!(!pos.is_nan());
    }

    #[test]
    fn positions_span_unit_interval() {
        let n = 5;
        assert_eq!(strip_position(0, n), 0.0);
        assert_eq!(strip_position(n - 1, n), 1.0);
        for i in 1..n {
            assert!(strip_position(i, n) > strip_position(i - 1, n));
        }
    }

    #[test]
    fn layout_tiles_the_canvas() {
        let p = params(4);
        let strips = layout_strips(200.0, &p);
        assert_eq!(strips.len(), 4);
        for (i, s) in strips.iter().enumerate() {
            assert_eq!(s.height, 50.0);
            assert_eq!(s.y_offset, 50.0 * i as f64);
        }
        let phase_step = strips[1].phase - strips[0].phase;
        assert!((phase_step - p.wave_offset * std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn zero_amplitude_path_is_a_rect() {
        let mut p = params(1);
        p.wave_amplitude = 0.0;
        let strips = layout_strips(64.0, &p);
        let path = strip_path(64, &strips[0], &p);
        let bbox = path.bounding_box();
        assert_eq!(bbox.x0, 0.0);
        assert_eq!(bbox.y0, 0.0);
        assert_eq!(bbox.x1, 64.0);
        assert_eq!(bbox.y1, 64.0);
    }

    #[test]
    fn wave_amplitude_bounds_the_path() {
        let mut p = params(2);
        p.wave_amplitude = 10.0;
        p.wave_frequency = 3.0;
        let strips = layout_strips(128.0, &p);
        let path = strip_path(128, &strips[1], &p);
        let bbox = path.bounding_box();
        assert!(bbox.y0 >= -10.0 - 1e-9);
        assert!(bbox.y1 <= strips[1].height + 10.0 + 1e-9);
    }

    #[test]
    fn stop_colors_use_all_six_positions() {
        let p = params(3);
        let mut cache = GradientCache::new(GradientParams {
            colors: p.gradient_params().colors,
            vertical_bias: 0.0,
        });
        let stops = strip_stop_colors(&mut cache, strip_position(1, 3));
        assert_eq!(stops.len(), 6);
        assert_eq!(cache.computed(), 6);
        // Same strip again: fully served from cache.
        strip_stop_colors(&mut cache, strip_position(1, 3));
        assert_eq!(cache.computed(), 6);
    }
}
