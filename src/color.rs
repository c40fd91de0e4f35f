// Copyright (c) 2026 rezky_nightky

use std::fmt;
use std::str::FromStr;

use crate::error::ColorParseError;

/// 8-bit RGB triple. Every constructor clamps, so a value of this type is
/// always a displayable color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn clamped(r: i32, g: i32, b: i32) -> Self {
        Self {
            r: r.clamp(0, 255) as u8,
            g: g.clamp(0, 255) as u8,
            b: b.clamp(0, 255) as u8,
        }
    }

    pub fn from_f32(r: f32, g: f32, b: f32) -> Self {
        fn ch(v: f32) -> u8 {
            if v.is_nan() {
                0
            } else {
                v.clamp(0.0, 255.0) as u8
            }
        }
        Self {
            r: ch(r),
            g: ch(g),
            b: ch(b),
        }
    }

    /// Moves toward `target` by `t`; channels truncate toward zero.
    pub fn lerp(self, target: Rgb, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| -> i32 {
            let a = a as f32;
            let b = b as f32;
            (a + (b - a) * t) as i32
        };
        Rgb::clamped(
            mix(self.r, target.r),
            mix(self.g, target.g),
            mix(self.b, target.b),
        )
    }

    /// Snaps every channel to the nearest multiple of `step`.
    pub fn quantize(self, step: u8) -> Rgb {
        if step <= 1 {
            return self;
        }
        let step = step as f32;
        let q = |c: u8| ((c as f32 / step).round() * step) as i32;
        Rgb::clamped(q(self.r), q(self.g), q(self.b))
    }

    /// Brightens by `factor`, rescaling so no channel overflows.
    pub fn boosted(self, factor: f32) -> Rgb {
        let mut r = self.r as f32 * factor;
        let mut g = self.g as f32 * factor;
        let mut b = self.b as f32 * factor;
        let max = r.max(g).max(b);
        if max > 255.0 {
            // the brightest channel lands on exactly 255
            r = r / max * 255.0;
            g = g / max * 255.0;
            b = b / max * 255.0;
        }
        Rgb::from_f32(r, g, b)
    }

    pub fn halved(self) -> Rgb {
        Rgb::new(self.r / 2, self.g / 2, self.b / 2)
    }

    pub fn midpoint(self, other: Rgb) -> Rgb {
        Rgb::new(
            ((self.r as u16 + other.r as u16) / 2) as u8,
            ((self.g as u16 + other.g as u16) / 2) as u8,
            ((self.b as u16 + other.b as u16) / 2) as u8,
        )
    }

    pub fn max(self, other: Rgb) -> Rgb {
        Rgb::new(
            self.r.max(other.r),
            self.g.max(other.g),
            self.b.max(other.b),
        )
    }

    /// Multiplies by an 8-bit coverage value.
    #[inline]
    pub fn mul_coverage(self, coverage: u8) -> Rgb {
        let m = |c: u8| ((c as u16 * coverage as u16 + 127) / 255) as u8;
        Rgb::new(m(self.r), m(self.g), m(self.b))
    }

    /// Source-over blend of `src` with 8-bit `alpha`.
    #[inline]
    pub fn blend(self, src: Rgb, alpha: u8) -> Rgb {
        let a = alpha as u16;
        let ch = |d: u8, s: u8| {
            let v = s as u16 * a + d as u16 * (255 - a);
            ((v + 1 + (v >> 8)) >> 8) as u8
        };
        Rgb::new(ch(self.r, src.r), ch(self.g, src.g), ch(self.b, src.b))
    }

    pub fn luminance_sum(self) -> u16 {
        self.r as u16 + self.g as u16 + self.b as u16
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    /// Accepts `#rrggbb`, `rrggbb` or `r,g,b`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains(',') {
            let parts: Vec<&str> = s.split(',').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(ColorParseError::ComponentCount(parts.len()));
            }
            let mut out = [0u8; 3];
            for (slot, part) in out.iter_mut().zip(parts) {
                *slot = part
                    .parse::<u8>()
                    .map_err(|_| ColorParseError::Component(part.to_string()))?;
            }
            return Ok(Rgb::new(out[0], out[1], out[2]));
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Hex(s.to_string()));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError::Hex(s.to_string()))
        };
        Ok(Rgb::new(byte(0)?, byte(2)?, byte(4)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_snaps_and_clamps() {
        assert_eq!(Rgb::new(250, 7, 9).quantize(16), Rgb::new(255, 0, 16));
        assert_eq!(Rgb::new(33, 47, 200).quantize(16), Rgb::new(32, 48, 208));
        assert_eq!(Rgb::new(3, 4, 5).quantize(0), Rgb::new(3, 4, 5));
    }

    #[test]
    fn lerp_truncates_toward_zero() {
        let c = Rgb::new(0, 100, 255).lerp(Rgb::new(255, 0, 0), 0.5);
        assert_eq!(c, Rgb::new(127, 50, 127));
        assert_eq!(Rgb::WHITE.lerp(Rgb::BLACK, 2.0), Rgb::BLACK);
    }

    #[test]
    fn boost_preserves_hue_when_saturating() {
        assert_eq!(Rgb::WHITE.boosted(1.3), Rgb::WHITE);
        assert_eq!(Rgb::new(64, 128, 32).boosted(4.0), Rgb::new(127, 255, 63));
        assert_eq!(Rgb::new(10, 20, 30).boosted(1.0), Rgb::new(10, 20, 30));
        assert_eq!(Rgb::new(5, 9, 11).boosted(1.5), Rgb::new(7, 13, 16));
    }

    #[test]
    fn parses_hex_and_triplets() {
        assert_eq!("#32b478".parse::<Rgb>().unwrap(), Rgb::new(50, 180, 120));
        assert_eq!("80, 255, 160".parse::<Rgb>().unwrap(), Rgb::new(80, 255, 160));
        assert!("300,0,0".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("1,2".parse::<Rgb>().is_err());
    }

    #[test]
    fn blend_with_zero_alpha_keeps_destination() {
        let d = Rgb::new(10, 20, 30);
        assert_eq!(d.blend(Rgb::WHITE, 0), d);
        assert_eq!(d.blend(Rgb::WHITE, 255), Rgb::WHITE);
    }
}
