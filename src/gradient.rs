use std::collections::HashMap;

use crate::color::{Rgb, lerp};

/// Stop positions every strip gradient is sampled at.
pub const STOP_POSITIONS: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

/// Fixed alpha applied to gradient stop paints (the rgba(..., 0.5) of the
/// strip fills).
pub const STOP_ALPHA: u8 = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GradientColors {
    pub start: Rgb,
    pub mid: Rgb,
    pub end: Rgb,
}

/// The subset of render parameters the gradient cache is sensitive to.
/// A cache survives exactly as long as this subset stays unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientParams {
    pub colors: GradientColors,
    pub vertical_bias: f64,
}

/// Map a scalar in [0,1] to a color along start -> mid -> end.
///
/// `value == 0.5` routes through the first segment with t = 1.0, which equals
/// mid exactly, so the two segments meet without a seam. Channels are floored
/// after interpolation.
pub fn map_to_color(value: f64, colors: &GradientColors) -> Rgb {
    let (from, to, t) = if value <= 0.5 {
        (colors.start, colors.mid, value * 2.0)
    } else {
        (colors.mid, colors.end, (value - 0.5) * 2.0)
    };

    fn channel(a: u8, b: u8, t: f64) -> u8 {
        lerp(f64::from(a), f64::from(b), t).floor().clamp(0.0, 255.0) as u8
    }

    Rgb {
        r: channel(from.r, to.r, t),
        g: channel(from.g, to.g, t),
        b: channel(from.b, to.b, t),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct StopKey {
    position_bits: u64,
    fraction_bits: u64,
}

/// Memoizes mapped stop colors for the current color/bias parameters.
///
/// Keys are the bit patterns of the two scalar inputs; the color/bias subset
/// is held beside the map and checked once per parameter snapshot via
/// [`GradientCache::ensure_params`], never per lookup. Growth between clears
/// is unbounded but tiny (stop positions x strip count).
#[derive(Debug)]
pub struct GradientCache {
    params: GradientParams,
    map: HashMap<StopKey, Rgb>,
    computed: u64,
}

impl GradientCache {
    pub fn new(params: GradientParams) -> Self {
        Self {
            params,
            map: HashMap::new(),
            computed: 0,
        }
    }

    /// Clear the cache if the color/bias subset changed since the last
    /// snapshot. Stale entries under old colors must never be served.
    pub fn ensure_params(&mut self, params: GradientParams) {
        if self.params != params {
            self.params = params;
            self.map.clear();
        }
    }

    /// Color for a stop `position` within a strip at `strip_fraction` of the
    /// canvas. The vertical bias blends the two scalars before mapping.
    pub fn color_at(&mut self, position: f64, strip_fraction: f64) -> Rgb {
        let key = StopKey {
            position_bits: position.to_bits(),
            fraction_bits: strip_fraction.to_bits(),
        };
        if let Some(c) = self.map.get(&key) {
            return *c;
        }

        let biased = lerp(position, strip_fraction, self.params.vertical_bias).clamp(0.0, 1.0);
        let color = map_to_color(biased, &self.params.colors);
        self.map.insert(key, color);
        self.computed += 1;
        color
    }

    /// Number of cache misses (underlying mapper invocations) so far.
    pub fn computed(&self) -> u64 {
        self.computed
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> GradientColors {
        GradientColors {
            start: Rgb::new(10, 20, 30),
            mid: Rgb::new(100, 110, 120),
            end: Rgb::new(200, 210, 220),
        }
    }

    #[test]
    fn endpoints_map_exactly() {
        let c = colors();
        assert_eq!(map_to_color(0.0, &c), c.start);
        assert_eq!(map_to_color(0.5, &c), c.mid);
        assert_eq!(map_to_color(1.0, &c), c.end);
    }

    #[test]
    fn no_seam_at_midpoint() {
        let c = colors();
        let eps = 1e-9;
        let below = map_to_color(0.5 - eps, &c);
        let above = map_to_color(0.5 + eps, &c);
        assert_eq!(below, c.mid);
        assert_eq!(above, c.mid);
    }

    #[test]
    fn channels_are_floored() {
        let c = GradientColors {
            start: Rgb::new(0, 0, 0),
            mid: Rgb::new(255, 255, 255),
            end: Rgb::new(255, 255, 255),
        };
        // t = 0.5 on the first segment: 127.5 floors to 127.
        assert_eq!(map_to_color(0.25, &c), Rgb::new(127, 127, 127));
    }

    #[test]
    fn cache_hits_do_not_recompute() {
        let mut cache = GradientCache::new(GradientParams {
            colors: colors(),
            vertical_bias: 0.3,
        });
        let a = cache.color_at(0.4, 0.5);
        assert_eq!(cache.computed(), 1);
        let b = cache.color_at(0.4, 0.5);
        assert_eq!(cache.computed(), 1);
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn color_change_clears_and_recomputes() {
        let mut cache = GradientCache::new(GradientParams {
            colors: colors(),
            vertical_bias: 0.3,
        });
        let before = cache.color_at(0.4, 0.5);
        assert_eq!(cache.computed(), 1);

        let mut changed = colors();
        changed.start = Rgb::new(250, 0, 0);
        cache.ensure_params(GradientParams {
            colors: changed,
            vertical_bias: 0.3,
        });
        assert!(cache.is_empty());

        let after = cache.color_at(0.4, 0.5);
        assert_eq!(cache.computed(), 2);
        assert_ne!(before, after);
    }

    #[test]
    fn same_params_keep_cache_warm() {
        let params = GradientParams {
            colors: colors(),
            vertical_bias: 0.7,
        };
        let mut cache = GradientCache::new(params);
        cache.color_at(0.2, 0.0);
        cache.ensure_params(params);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn bias_blends_position_and_fraction() {
        let c = colors();
        let mut zero_bias = GradientCache::new(GradientParams {
            colors: c,
            vertical_bias: 0.0,
        });
        let mut full_bias = GradientCache::new(GradientParams {
            colors: c,
            vertical_bias: 1.0,
        });
        // bias 0 uses only the stop position, bias 1 only the strip fraction.
        assert_eq!(zero_bias.color_at(0.0, 1.0), map_to_color(0.0, &c));
        assert_eq!(full_bias.color_at(0.0, 1.0), map_to_color(1.0, &c));
    }
}
