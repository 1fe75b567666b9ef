use crate::error::{FrostError, FrostResult};

/// Linear interpolation. `t` is deliberately not clamped; callers supply
/// `t` in [0,1].
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start * (1.0 - t) + end * t
}

/// An sRGB color with 8-bit channels. Serializes as a `#rrggbb` hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Fallback for colors that failed to parse.
pub const MID_GRAY: Rgb = Rgb {
    r: 0x80,
    g: 0x80,
    b: 0x80,
};

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a 6-digit hex color, optional leading `#`, case-insensitive.
    pub fn parse_hex(s: &str) -> FrostResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 {
            return Err(FrostError::color(format!(
                "hex color must be 6 digits (#rrggbb), got \"{s}\""
            )));
        }

        fn hex_byte(pair: &str) -> FrostResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| FrostError::color(format!("invalid hex byte \"{pair}\"")))
        }

        Ok(Self {
            r: hex_byte(&s[0..2])?,
            g: hex_byte(&s[2..4])?,
            b: hex_byte(&s[4..6])?,
        })
    }

    /// Parse like [`Rgb::parse_hex`], but fall back to mid-gray on malformed
    /// input instead of failing the whole render.
    pub fn parse_hex_lossy(s: &str) -> Self {
        match Self::parse_hex(s) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("color parse failed, using mid-gray fallback: {e}");
                MID_GRAY
            }
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Standard HSL -> sRGB conversion. `h` in degrees (wrapped), `s` and `l`
    /// clamped to [0,1].
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);

        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        if s == 0.0 {
            let v = to_u8(l);
            return Self::new(v, v, v);
        }

        fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                return p + (q - p) * 6.0 * t;
            }
            if t < 1.0 / 2.0 {
                return q;
            }
            if t < 2.0 / 3.0 {
                return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
            }
            p
        }

        let q = if l < 0.5 {
            l * (1.0 + s)
        } else {
            l + s - l * s
        };
        let p = 2.0 * l - q;

        Self::new(
            to_u8(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            to_u8(hue_to_rgb(p, q, h)),
            to_u8(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        )
    }
}

impl serde::Serialize for Rgb {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgb {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_case_normalized() {
        for h in ["#1a2b3c", "#A1B2C3", "000000", "FFFFFF"] {
            let c = Rgb::parse_hex(h).unwrap();
            let back = c.to_hex();
            assert_eq!(back, format!("#{}", h.trim_start_matches('#').to_lowercase()));
            assert_eq!(Rgb::parse_hex(&back).unwrap(), c);
        }
    }

    #[test]
    fn rejects_malformed_hex() {
        for bad in ["", "#fff", "#gggggg", "#12345", "#1234567", "red"] {
            assert!(Rgb::parse_hex(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn lossy_parse_falls_back_to_mid_gray() {
        assert_eq!(Rgb::parse_hex_lossy("nope"), MID_GRAY);
        assert_eq!(Rgb::parse_hex_lossy("#336699"), Rgb::new(0x33, 0x66, 0x99));
    }

    #[test]
    fn lerp_is_exact_at_endpoints() {
        assert_eq!(lerp(10.0, 20.0, 0.0), 10.0);
        assert_eq!(lerp(10.0, 20.0, 1.0), 20.0);
        assert_eq!(lerp(0.0, 255.0, 0.5), 127.5);
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(Rgb::from_hsl(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsl(120.0, 1.0, 0.5), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsl(240.0, 1.0, 0.5), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_hsl(0.0, 0.0, 0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn serde_as_hex_string() {
        let c = Rgb::new(0x12, 0x34, 0x56);
        let s = serde_json::to_string(&c).unwrap();
        assert_eq!(s, "\"#123456\"");
        let back: Rgb = serde_json::from_str(&s).unwrap();
        assert_eq!(back, c);
        assert!(serde_json::from_str::<Rgb>("\"#xyzxyz\"").is_err());
    }
}
