// Copyright (c) 2026 rezky_nightky

use crate::color::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Green,
    Classic,
    Gold,
    Red,
    Blue,
    Cyan,
    Purple,
    Fire,
    Ocean,
    Snow,
    Vaporwave,
    Gray,
}

/// The four colors a stream is painted with: head, the cell right behind it,
/// the body of the trail, and the haze laid over the whole frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamColors {
    pub leader: Rgb,
    pub second: Rgb,
    pub trail: Rgb,
    pub haze: Rgb,
}

pub const SCHEMES: &[(&str, &str)] = &[
    ("green", "White heads over cyan-tinted green (alias: canon, matrix)"),
    ("classic", "Pure green heads and trails"),
    ("gold", "Gold theme"),
    ("red", "Red theme"),
    ("blue", "Blue theme"),
    ("cyan", "Cyan theme"),
    ("purple", "Purple theme"),
    ("fire", "Fire theme (alias: inferno)"),
    ("ocean", "Ocean theme (alias: deep-sea)"),
    ("snow", "Snow / ice theme"),
    ("vaporwave", "Vaporwave theme"),
    ("gray", "Gray theme (alias: grey)"),
];

pub fn parse_color_scheme(s: &str) -> Result<ColorScheme, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "green" | "canon" | "matrix" => Ok(ColorScheme::Green),
        "classic" => Ok(ColorScheme::Classic),
        "gold" => Ok(ColorScheme::Gold),
        "red" => Ok(ColorScheme::Red),
        "blue" => Ok(ColorScheme::Blue),
        "cyan" => Ok(ColorScheme::Cyan),
        "purple" => Ok(ColorScheme::Purple),
        "fire" | "inferno" => Ok(ColorScheme::Fire),
        "ocean" | "deep-sea" | "deep_sea" | "deepsea" => Ok(ColorScheme::Ocean),
        "snow" => Ok(ColorScheme::Snow),
        "vaporwave" => Ok(ColorScheme::Vaporwave),
        "gray" | "grey" => Ok(ColorScheme::Gray),
        _ => Err(format!("invalid color: {} (see --list-colors)", s)),
    }
}

const fn rgb(r: u8, g: u8, b: u8) -> Rgb {
    Rgb::new(r, g, b)
}

pub fn stream_colors(scheme: ColorScheme) -> StreamColors {
    let (leader, second, trail, haze) = match scheme {
        ColorScheme::Green => (
            rgb(255, 255, 255),
            rgb(80, 255, 160),
            rgb(50, 180, 120),
            rgb(0, 255, 0),
        ),
        ColorScheme::Classic => (
            rgb(180, 255, 180),
            rgb(0, 255, 70),
            rgb(0, 170, 40),
            rgb(0, 255, 0),
        ),
        ColorScheme::Gold => (
            rgb(255, 250, 220),
            rgb(255, 215, 90),
            rgb(200, 150, 40),
            rgb(255, 190, 0),
        ),
        ColorScheme::Red => (
            rgb(255, 225, 225),
            rgb(255, 70, 70),
            rgb(170, 20, 30),
            rgb(255, 0, 0),
        ),
        ColorScheme::Blue => (
            rgb(225, 235, 255),
            rgb(90, 140, 255),
            rgb(30, 60, 200),
            rgb(0, 60, 255),
        ),
        ColorScheme::Cyan => (
            rgb(230, 255, 255),
            rgb(80, 240, 255),
            rgb(20, 150, 180),
            rgb(0, 230, 255),
        ),
        ColorScheme::Purple => (
            rgb(245, 230, 255),
            rgb(190, 120, 255),
            rgb(110, 60, 190),
            rgb(150, 0, 255),
        ),
        ColorScheme::Fire => (
            rgb(255, 255, 210),
            rgb(255, 170, 0),
            rgb(200, 50, 0),
            rgb(255, 80, 0),
        ),
        ColorScheme::Ocean => (
            rgb(220, 255, 255),
            rgb(0, 200, 220),
            rgb(0, 90, 160),
            rgb(0, 140, 255),
        ),
        ColorScheme::Snow => (
            rgb(255, 255, 255),
            rgb(200, 230, 255),
            rgb(130, 160, 190),
            rgb(180, 220, 255),
        ),
        ColorScheme::Vaporwave => (
            rgb(255, 240, 255),
            rgb(255, 110, 220),
            rgb(90, 120, 230),
            rgb(255, 0, 200),
        ),
        ColorScheme::Gray => (
            rgb(255, 255, 255),
            rgb(200, 200, 200),
            rgb(120, 120, 120),
            rgb(160, 160, 160),
        ),
    };
    StreamColors {
        leader,
        second,
        trail,
        haze,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnTuning, HazeTuning};

    #[test]
    fn green_matches_default_tuning() {
        let c = stream_colors(parse_color_scheme("canon").unwrap());
        let col = ColumnTuning::default();
        assert_eq!(c.leader, col.leader_color);
        assert_eq!(c.second, col.second_color);
        assert_eq!(c.trail, col.trail_color);
        assert_eq!(c.haze, HazeTuning::default().color);
    }

    #[test]
    fn every_listed_scheme_parses() {
        for (name, _) in SCHEMES {
            assert!(parse_color_scheme(name).is_ok(), "{name}");
        }
        assert!(parse_color_scheme("plaid").is_err());
    }
}
