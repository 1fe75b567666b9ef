use crate::{
    color::Rgb,
    error::{FrostError, FrostResult},
    gradient::{GradientColors, GradientParams},
    rng::Rng64,
};

pub const STRIP_COUNT_MIN: u32 = 1;
pub const STRIP_COUNT_MAX: u32 = 50;
pub const NOISE_SCALE_MAX: f64 = 20.0;

/// One immutable render parameter snapshot.
///
/// A snapshot is never mutated in place: every control change goes through the
/// pure reducer [`RenderParams::with_update`], which produces a fresh value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderParams {
    pub strip_count: u32,
    pub start_color: Rgb,
    pub mid_color: Rgb,
    pub end_color: Rgb,
    pub noise_scale: f64,
    pub vertical_bias: f64,
    pub text: String,
    pub font_size: u32,
    pub text_color: Rgb,
    pub wave_amplitude: f64,
    pub wave_frequency: f64,
    pub wave_offset: f64,
    /// Seed for the frost noise and for the randomized pastel defaults.
    pub seed: u64,
}

impl RenderParams {
    /// Startup defaults: three randomized pastel gradient colors derived from
    /// `seed`, everything else fixed.
    pub fn with_random_pastels(seed: u64) -> Self {
        let mut rng = Rng64::new(seed);
        let mut pastel = || Rgb::from_hsl(rng.next_f64_01() * 360.0, 0.7, 0.8);
        Self {
            strip_count: 8,
            start_color: pastel(),
            mid_color: pastel(),
            end_color: pastel(),
            noise_scale: 5.0,
            vertical_bias: 0.5,
            text: String::new(),
            font_size: 48,
            text_color: Rgb::new(0x33, 0x33, 0x33),
            wave_amplitude: 20.0,
            wave_frequency: 1.0,
            wave_offset: 0.25,
            seed,
        }
    }

    /// Pure reducer: replace exactly one field, keep the rest.
    pub fn with_update(&self, update: ParamUpdate) -> Self {
        let mut next = self.clone();
        match update {
            ParamUpdate::StripCount(v) => next.strip_count = v,
            ParamUpdate::StartColor(v) => next.start_color = v,
            ParamUpdate::MidColor(v) => next.mid_color = v,
            ParamUpdate::EndColor(v) => next.end_color = v,
            ParamUpdate::NoiseScale(v) => next.noise_scale = v,
            ParamUpdate::VerticalBias(v) => next.vertical_bias = v,
            ParamUpdate::Text(v) => next.text = v,
            ParamUpdate::FontSize(v) => next.font_size = v,
            ParamUpdate::TextColor(v) => next.text_color = v,
            ParamUpdate::WaveAmplitude(v) => next.wave_amplitude = v,
            ParamUpdate::WaveFrequency(v) => next.wave_frequency = v,
            ParamUpdate::WaveOffset(v) => next.wave_offset = v,
            ParamUpdate::Seed(v) => next.seed = v,
        }
        next
    }

    /// Defensive clamp of all numeric fields into their documented ranges.
    /// The control surface enforces its own min/max; the core does not trust
    /// that. Non-finite floats collapse to the range minimum.
    pub fn normalized(&self) -> Self {
        fn clamp_finite(v: f64, min: f64, max: f64) -> f64 {
            if v.is_finite() { v.clamp(min, max) } else { min }
        }

        let mut p = self.clone();
        p.strip_count = p.strip_count.clamp(STRIP_COUNT_MIN, STRIP_COUNT_MAX);
        p.noise_scale = clamp_finite(p.noise_scale, 0.0, NOISE_SCALE_MAX);
        p.vertical_bias = clamp_finite(p.vertical_bias, 0.0, 1.0);
        p.font_size = p.font_size.max(1);
        p.wave_amplitude = clamp_finite(p.wave_amplitude, 0.0, f64::MAX);
        if !p.wave_frequency.is_finite() {
            p.wave_frequency = 0.0;
        }
        if !p.wave_offset.is_finite() {
            p.wave_offset = 0.0;
        }
        p
    }

    pub fn validate(&self) -> FrostResult<()> {
        if !(STRIP_COUNT_MIN..=STRIP_COUNT_MAX).contains(&self.strip_count) {
            return Err(FrostError::validation(format!(
                "strip_count must be in [{STRIP_COUNT_MIN},{STRIP_COUNT_MAX}]"
            )));
        }
        if !self.noise_scale.is_finite() || !(0.0..=NOISE_SCALE_MAX).contains(&self.noise_scale) {
            return Err(FrostError::validation(format!(
                "noise_scale must be in [0,{NOISE_SCALE_MAX}]"
            )));
        }
        if !self.vertical_bias.is_finite() || !(0.0..=1.0).contains(&self.vertical_bias) {
            return Err(FrostError::validation("vertical_bias must be in [0,1]"));
        }
        if self.font_size == 0 {
            return Err(FrostError::validation("font_size must be > 0"));
        }
        for (name, v) in [
            ("wave_amplitude", self.wave_amplitude),
            ("wave_frequency", self.wave_frequency),
            ("wave_offset", self.wave_offset),
        ] {
            if !v.is_finite() {
                return Err(FrostError::validation(format!("{name} must be finite")));
            }
        }
        Ok(())
    }

    /// The subset the gradient cache is keyed on.
    pub fn gradient_params(&self) -> GradientParams {
        GradientParams {
            colors: GradientColors {
                start: self.start_color,
                mid: self.mid_color,
                end: self.end_color,
            },
            vertical_bias: self.vertical_bias,
        }
    }
}

/// A single-field change emitted by a control.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamUpdate {
    StripCount(u32),
    StartColor(Rgb),
    MidColor(Rgb),
    EndColor(Rgb),
    NoiseScale(f64),
    VerticalBias(f64),
    Text(String),
    FontSize(u32),
    TextColor(Rgb),
    WaveAmplitude(f64),
    WaveFrequency(f64),
    WaveOffset(f64),
    Seed(u64),
}

impl ParamUpdate {
    /// Parse a `(name, value)` pair as emitted by the control surface.
    pub fn parse(name: &str, value: &str) -> FrostResult<Self> {
        fn int<T: std::str::FromStr>(name: &str, v: &str) -> FrostResult<T> {
            v.trim()
                .parse()
                .map_err(|_| FrostError::validation(format!("'{name}' expects an integer, got \"{v}\"")))
        }
        fn float(name: &str, v: &str) -> FrostResult<f64> {
            v.trim()
                .parse()
                .map_err(|_| FrostError::validation(format!("'{name}' expects a number, got \"{v}\"")))
        }

        match name {
            "strips" | "stripCount" => Ok(Self::StripCount(int(name, value)?)),
            "startColor" => Ok(Self::StartColor(Rgb::parse_hex(value)?)),
            "midColor" => Ok(Self::MidColor(Rgb::parse_hex(value)?)),
            "endColor" => Ok(Self::EndColor(Rgb::parse_hex(value)?)),
            "noiseScale" => Ok(Self::NoiseScale(float(name, value)?)),
            "verticalBias" => Ok(Self::VerticalBias(float(name, value)?)),
            "text" => Ok(Self::Text(value.to_string())),
            "fontSize" => Ok(Self::FontSize(int(name, value)?)),
            "textColor" => Ok(Self::TextColor(Rgb::parse_hex(value)?)),
            "waveAmplitude" => Ok(Self::WaveAmplitude(float(name, value)?)),
            "waveFrequency" => Ok(Self::WaveFrequency(float(name, value)?)),
            "waveOffset" => Ok(Self::WaveOffset(float(name, value)?)),
            "seed" => Ok(Self::Seed(int(name, value)?)),
            _ => Err(FrostError::validation(format!(
                "unknown parameter '{name}'"
            ))),
        }
    }
}
