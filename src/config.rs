// Copyright (c) 2026 rezky_nightky

//! Immutable simulation settings.
//!
//! A [`RainConfig`] is built once (by the binary from command line
//! arguments, or by a test), validated, and then passed by reference to
//! every component. Nothing in the core mutates it.

use crate::color::Rgb;
use crate::error::ConfigError;

/// Inclusive `low..=high` pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span<T> {
    pub low: T,
    pub high: T,
}

impl<T: Copy> Span<T> {
    pub const fn new(low: T, high: T) -> Self {
        Self { low, high }
    }
}

impl Span<f32> {
    pub fn width(&self) -> f32 {
        self.high - self.low
    }

    /// Position of `v` inside the span, clamped to [0,1]. A zero-width span
    /// reports the midpoint.
    pub fn normalize(&self, v: f32) -> f32 {
        let w = self.width();
        if w > 0.0 {
            ((v - self.low) / w).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectFlags {
    pub haze: bool,
    pub grid: bool,
    pub ripples: bool,
    pub cascades: bool,
}

impl Default for EffectFlags {
    fn default() -> Self {
        Self {
            haze: true,
            grid: true,
            ripples: true,
            cascades: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FontTuning {
    /// Nominal glyph size in pixels.
    pub size: f32,
    pub line_height_multiplier: f32,
    /// Vertical stretch applied to every rasterized glyph.
    pub stretch: f32,
    pub bold: bool,
    /// Extra 1px offset copies drawn around the head glyph.
    pub leader_extra_boldness: u32,
}

impl FontTuning {
    pub fn line_height(&self) -> f32 {
        self.size * self.line_height_multiplier
    }
}

impl Default for FontTuning {
    fn default() -> Self {
        Self {
            size: 18.0,
            line_height_multiplier: 1.1,
            stretch: 1.25,
            bold: false,
            leader_extra_boldness: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnTuning {
    pub spacing: u32,
    /// Head speed in pixels per second.
    pub speed_range: Span<f32>,
    pub length_range: Span<u32>,
    /// Frames a column waits before its first streak.
    pub dormancy_range: Span<u32>,
    pub flicker_chance: f32,
    pub leader_color: Rgb,
    pub second_color: Rgb,
    pub trail_color: Rgb,
    pub alphabet: Vec<char>,
    pub halo_size: u32,
    pub speed_bias: f32,
    pub leader_brightness_speed_multiplier: f32,
    pub flicker_slowest_ms: f32,
    pub flicker_fastest_ms: f32,
    pub flicker_curve_exponent: f32,
    pub variable_speed: bool,
    /// Seconds between speed perturbations.
    pub speed_change_interval: Span<f32>,
    /// Largest perturbation as a fraction of the speed span.
    pub speed_change_amount: f32,
}

pub const CANON_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabdefghijklmnopqrstuvwx____";

impl Default for ColumnTuning {
    fn default() -> Self {
        Self {
            spacing: 11,
            speed_range: Span::new(10.0, 300.0),
            length_range: Span::new(5, 70),
            dormancy_range: Span::new(0, 1000),
            flicker_chance: 0.04,
            leader_color: Rgb::new(255, 255, 255),
            second_color: Rgb::new(80, 255, 160),
            trail_color: Rgb::new(50, 180, 120),
            alphabet: CANON_ALPHABET.chars().collect(),
            halo_size: 8,
            speed_bias: 2.5,
            leader_brightness_speed_multiplier: 1.0,
            flicker_slowest_ms: 600.0,
            flicker_fastest_ms: 4.0,
            flicker_curve_exponent: 1.3,
            variable_speed: true,
            speed_change_interval: Span::new(0.1, 0.5),
            speed_change_amount: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CascadeTuning {
    pub rate_per_second: f32,
    /// Radius growth in pixels per second.
    pub radius_speed: f32,
    pub max_radius: f32,
    pub fade_in_ms: f32,
    pub dark_chance: f32,
    pub brightness_boost: f32,
    /// Trail cells over which an overlay ramps in and out.
    pub fade_length: u32,
    /// Overlay travel toward the head, in cells per second.
    pub decay_speed_cps: f32,
}

impl CascadeTuning {
    /// Shortest trail that can show the whole fade envelope.
    pub fn min_trail_length(&self) -> usize {
        self.fade_length as usize * 2 + 5
    }
}

impl Default for CascadeTuning {
    fn default() -> Self {
        Self {
            rate_per_second: 0.25,
            radius_speed: 500.0,
            max_radius: 500.0,
            fade_in_ms: 250.0,
            dark_chance: 0.5,
            brightness_boost: 1.0,
            fade_length: 10,
            decay_speed_cps: 20.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RippleTuning {
    pub rate_per_second: f32,
    pub radius_speed: f32,
    pub max_radius: f32,
    pub fade_in_ms: f32,
    pub fade_out_s: f32,
    pub brightness_boost: f32,
    pub distortion_frequency: f32,
    pub distortion_amplitude: f32,
    pub distortion_speed: f32,
}

impl RippleTuning {
    pub fn fade_in_s(&self) -> f32 {
        self.fade_in_ms / 1000.0
    }

    pub fn lifetime_s(&self) -> f32 {
        self.fade_in_s() + self.fade_out_s
    }
}

impl Default for RippleTuning {
    fn default() -> Self {
        Self {
            rate_per_second: 0.25,
            radius_speed: 120.0,
            max_radius: 700.0,
            fade_in_ms: 2000.0,
            fade_out_s: 5.0,
            brightness_boost: 1.3,
            distortion_frequency: 5.0,
            distortion_amplitude: 80.0,
            distortion_speed: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HazeTuning {
    pub color: Rgb,
    pub alpha: u8,
}

impl Default for HazeTuning {
    fn default() -> Self {
        Self {
            color: Rgb::new(0, 255, 0),
            alpha: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridTuning {
    pub size: u32,
    pub color: Rgb,
    pub alpha: u8,
}

impl Default for GridTuning {
    fn default() -> Self {
        Self {
            size: 3,
            color: Rgb::BLACK,
            alpha: 40,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RainConfig {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub effects: EffectFlags,
    pub target_fps: f32,
    pub quantization_step: u8,
    /// Mean FPS below which optional effects are shed. 0 disables.
    pub adaptive_threshold_fps: f32,
    pub fps_window: usize,
    /// Longest elapsed time fed into one simulation step, in seconds.
    pub max_frame_delta: f32,
    pub seed: Option<u64>,
    pub font: FontTuning,
    pub column: ColumnTuning,
    pub cascade: CascadeTuning,
    pub ripple: RippleTuning,
    pub haze: HazeTuning,
    pub grid: GridTuning,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            background: Rgb::BLACK,
            effects: EffectFlags::default(),
            target_fps: 60.0,
            quantization_step: 16,
            adaptive_threshold_fps: 45.0,
            fps_window: 20,
            max_frame_delta: 0.25,
            seed: None,
            font: FontTuning::default(),
            column: ColumnTuning::default(),
            cascade: CascadeTuning::default(),
            ripple: RippleTuning::default(),
            haze: HazeTuning::default(),
            grid: GridTuning::default(),
        }
    }
}

fn require_finite(name: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name })
    }
}

fn require_f32_range(name: &'static str, v: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    require_finite(name, v)?;
    if v < min || v > max {
        return Err(ConfigError::OutOfBounds {
            name,
            value: v as f64,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(())
}

fn require_u32_range(name: &'static str, v: u32, min: u32, max: u32) -> Result<(), ConfigError> {
    if v < min || v > max {
        return Err(ConfigError::OutOfBounds {
            name,
            value: v as f64,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(())
}

fn require_f32_span(
    name: &'static str,
    span: Span<f32>,
    min: f32,
    max: f32,
) -> Result<(), ConfigError> {
    require_f32_range(name, span.low, min, max)?;
    require_f32_range(name, span.high, min, max)?;
    if span.low > span.high {
        return Err(ConfigError::InvertedRange {
            name,
            low: span.low as f64,
            high: span.high as f64,
        });
    }
    Ok(())
}

fn require_u32_span(
    name: &'static str,
    span: Span<u32>,
    min: u32,
    max: u32,
) -> Result<(), ConfigError> {
    require_u32_range(name, span.low, min, max)?;
    require_u32_range(name, span.high, min, max)?;
    if span.low > span.high {
        return Err(ConfigError::InvertedRange {
            name,
            low: span.low as f64,
            high: span.high as f64,
        });
    }
    Ok(())
}

impl RainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        require_f32_range("target fps", self.target_fps, 1.0, 1000.0)?;
        require_f32_range("adaptive threshold", self.adaptive_threshold_fps, 0.0, 1000.0)?;
        require_u32_range("fps window", self.fps_window as u32, 1, 10_000)?;
        require_f32_range("max frame delta", self.max_frame_delta, 0.001, 10.0)?;

        let f = &self.font;
        require_f32_range("font size", f.size, 0.0, 512.0)?;
        require_f32_range("line height multiplier", f.line_height_multiplier, 0.0, 16.0)?;
        require_f32_range("font stretch", f.stretch, 0.1, 8.0)?;
        require_u32_range("leader boldness", f.leader_extra_boldness, 0, 16)?;

        let c = &self.column;
        require_u32_range("column spacing", c.spacing, 1, 4096)?;
        require_f32_span("speed range", c.speed_range, 0.0, 100_000.0)?;
        require_u32_span("length range", c.length_range, 1, 100_000)?;
        require_u32_span("dormancy range", c.dormancy_range, 0, u32::MAX)?;
        require_f32_range("flicker chance", c.flicker_chance, 0.0, 1.0)?;
        if c.alphabet.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        require_f32_range("speed bias", c.speed_bias, 0.0, 100.0)?;
        require_f32_range(
            "leader brightness multiplier",
            c.leader_brightness_speed_multiplier,
            0.0,
            16.0,
        )?;
        require_f32_range("slowest flicker", c.flicker_slowest_ms, 0.0, 60_000.0)?;
        require_f32_range("fastest flicker", c.flicker_fastest_ms, 0.0, 60_000.0)?;
        require_f32_range("flicker curve", c.flicker_curve_exponent, 0.0, 16.0)?;
        require_f32_span("speed change interval", c.speed_change_interval, 0.0, 3600.0)?;
        require_f32_range("speed change amount", c.speed_change_amount, 0.0, 1.0)?;

        let k = &self.cascade;
        require_f32_range("cascade rate", k.rate_per_second, 0.0, 1000.0)?;
        require_f32_range("cascade radius speed", k.radius_speed, 0.0, 1_000_000.0)?;
        require_f32_range("cascade max radius", k.max_radius, 0.0, 1_000_000.0)?;
        require_f32_range("cascade fade-in", k.fade_in_ms, 0.0, 600_000.0)?;
        require_f32_range("dark cascade chance", k.dark_chance, 0.0, 1.0)?;
        require_f32_range("cascade brightness", k.brightness_boost, 0.0, 16.0)?;
        require_f32_range("cascade decay speed", k.decay_speed_cps, 0.0, 100_000.0)?;

        let r = &self.ripple;
        require_f32_range("ripple rate", r.rate_per_second, 0.0, 1000.0)?;
        require_f32_range("ripple radius speed", r.radius_speed, 0.0, 1_000_000.0)?;
        require_f32_range("ripple max radius", r.max_radius, 0.0, 1_000_000.0)?;
        require_f32_range("ripple fade-in", r.fade_in_ms, 0.0, 600_000.0)?;
        require_f32_range("ripple fade-out", r.fade_out_s, 0.0, 600.0)?;
        require_f32_range("ripple brightness", r.brightness_boost, 0.0, 16.0)?;
        require_f32_range("ripple distortion frequency", r.distortion_frequency, 0.0, 1000.0)?;
        require_f32_range("ripple distortion amplitude", r.distortion_amplitude, 0.0, 100_000.0)?;
        require_f32_range("ripple distortion speed", r.distortion_speed, -1000.0, 1000.0)?;

        if self.effects.grid {
            require_u32_range("grid size", self.grid.size, 1, 4096)?;
        }
        Ok(())
    }

    /// Horizontal positions of every column, left to right.
    pub fn column_positions(&self) -> impl Iterator<Item = u32> {
        (0..self.width).step_by(self.column.spacing.max(1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_validate() {
        assert_eq!(RainConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_speed_range() {
        let mut cfg = RainConfig::default();
        cfg.column.speed_range = Span::new(300.0, 10.0);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvertedRange {
                name: "speed range",
                low: 300.0,
                high: 10.0
            })
        );
    }

    #[test]
    fn rejects_empty_alphabet_and_zero_spacing() {
        let mut cfg = RainConfig::default();
        cfg.column.alphabet.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyAlphabet));

        let mut cfg = RainConfig::default();
        cfg.column.spacing = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::OutOfBounds {
                name: "column spacing",
                ..
            })
        ));
    }

    #[test]
    fn rejects_nan_probability() {
        let mut cfg = RainConfig::default();
        cfg.cascade.dark_chance = f32::NAN;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NotFinite {
                name: "dark cascade chance"
            })
        );
    }

    #[test]
    fn zero_font_size_is_accepted() {
        let mut cfg = RainConfig::default();
        cfg.font.size = 0.0;
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.font.line_height(), 0.0);
    }

    #[test]
    fn zero_width_span_normalizes_to_midpoint() {
        assert_eq!(Span::new(5.0f32, 5.0).normalize(5.0), 0.5);
        assert_eq!(Span::new(0.0f32, 10.0).normalize(20.0), 1.0);
    }

    #[test]
    fn column_positions_follow_spacing() {
        let cfg = RainConfig {
            width: 40,
            ..RainConfig::default()
        };
        let xs: Vec<u32> = cfg.column_positions().collect();
        assert_eq!(xs, vec![0, 11, 22, 33]);
    }
}
