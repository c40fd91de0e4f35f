// Copyright (c) 2026 rezky_nightky

//! Glyph rasterization.
//!
//! Every source renders into a fixed cell box so that all characters of an
//! alphabet share one width and height. Masks hold 8-bit coverage; color is
//! applied later by the tint cache.

use std::fs;
use std::path::Path;

use font8x8::{
    UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, HIRAGANA_FONTS, LATIN_FONTS,
};
use fontdue::{Font, FontSettings};

use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::error::GlyphError;

/// Coverage bitmap of one character at full brightness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphMask {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
        }
    }

    /// Renders the mask in `color`, premultiplied by coverage.
    pub fn tint(&self, color: Rgb) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
            pixels: self
                .coverage
                .iter()
                .map(|&c| color.mul_coverage(c))
                .collect(),
        }
    }

    /// Nearest-neighbour vertical resample to `height` rows.
    fn stretched(&self, height: u32) -> GlyphMask {
        if height == self.height || self.height == 0 {
            return self.clone();
        }
        let w = self.width as usize;
        let mut out = GlyphMask::empty(self.width, height);
        for y in 0..height as usize {
            let sy = (y * self.height as usize / height as usize).min(self.height as usize - 1);
            out.coverage[y * w..(y + 1) * w].copy_from_slice(&self.coverage[sy * w..(sy + 1) * w]);
        }
        out
    }
}

pub trait GlyphSource {
    /// Width and height, in pixels, of the box every mask is rendered into.
    fn cell_size(&self) -> (u32, u32);

    fn rasterize(&self, ch: char) -> Result<GlyphMask, GlyphError>;
}

/// Built-in 8x8 bitmap font, scaled to the requested size.
#[derive(Clone, Debug)]
pub struct BitmapFont {
    width: u32,
    height: u32,
}

impl BitmapFont {
    pub fn new(size: f32, stretch: f32) -> Self {
        let size = if size.is_finite() { size.max(0.0) } else { 0.0 };
        let stretch = if stretch.is_finite() && stretch > 0.0 {
            stretch
        } else {
            1.0
        };
        Self {
            width: ((size * 0.6).round() as u32).max(1),
            height: ((size * stretch).round() as u32).max(1),
        }
    }

    fn lookup(ch: char) -> Option<[u8; 8]> {
        BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .or_else(|| GREEK_FONTS.get(ch))
            .or_else(|| BLOCK_FONTS.get(ch))
            .or_else(|| BOX_FONTS.get(ch))
            .or_else(|| HIRAGANA_FONTS.get(ch))
    }
}

impl GlyphSource for BitmapFont {
    fn cell_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn rasterize(&self, ch: char) -> Result<GlyphMask, GlyphError> {
        let rows = Self::lookup(ch).ok_or(GlyphError::MissingGlyph(ch))?;
        let mut mask = GlyphMask::empty(self.width, self.height);
        for y in 0..self.height {
            let row = rows[(y * 8 / self.height).min(7) as usize];
            for x in 0..self.width {
                // bit 0 is the leftmost pixel
                let bit = (x * 8 / self.width).min(7);
                if row & (1 << bit) != 0 {
                    mask.coverage[(y * self.width + x) as usize] = 255;
                }
            }
        }
        Ok(mask)
    }
}

/// Anti-aliased glyphs from a TrueType/OpenType file.
pub struct TrueTypeFont {
    font: Font,
    px: f32,
    ascent: i32,
    width: u32,
    line_height: u32,
    height: u32,
}

impl TrueTypeFont {
    pub fn load(path: &Path, px: f32, stretch: f32) -> Result<Self, GlyphError> {
        let bytes = fs::read(path).map_err(|source| GlyphError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes, px, stretch)
    }

    pub fn from_bytes(bytes: &[u8], px: f32, stretch: f32) -> Result<Self, GlyphError> {
        let px = px.max(1.0);
        let settings = FontSettings {
            scale: px,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(bytes, settings)
            .map_err(|e| GlyphError::FontParse(e.to_string()))?;

        let (ascent, line_height) = match font.horizontal_line_metrics(px) {
            Some(m) => (m.ascent.round() as i32, m.new_line_size.ceil() as u32),
            None => (px.round() as i32, px.ceil() as u32),
        };
        let width = (font.metrics('M', px).advance_width.ceil() as u32).max(1);
        let line_height = line_height.max(1);
        let stretch = if stretch.is_finite() && stretch > 0.0 {
            stretch
        } else {
            1.0
        };
        let height = ((line_height as f32 * stretch) as u32).max(1);

        Ok(Self {
            font,
            px,
            ascent,
            width,
            line_height,
            height,
        })
    }
}

impl GlyphSource for TrueTypeFont {
    fn cell_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn rasterize(&self, ch: char) -> Result<GlyphMask, GlyphError> {
        if !ch.is_whitespace() && self.font.lookup_glyph_index(ch) == 0 {
            return Err(GlyphError::MissingGlyph(ch));
        }
        let (metrics, bitmap) = self.font.rasterize(ch, self.px);

        let mut mask = GlyphMask::empty(self.width, self.line_height);
        let y0 = self.ascent - metrics.height as i32 - metrics.ymin;
        let x0 = metrics.xmin.max(0);
        for gy in 0..metrics.height {
            let y = y0 + gy as i32;
            if y < 0 || y >= self.line_height as i32 {
                continue;
            }
            for gx in 0..metrics.width {
                let x = x0 + gx as i32;
                if x >= self.width as i32 {
                    break;
                }
                let idx = y as usize * self.width as usize + x as usize;
                mask.coverage[idx] = mask.coverage[idx].max(bitmap[gy * metrics.width + gx]);
            }
        }
        Ok(mask.stretched(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_cell_follows_size_and_stretch() {
        let font = BitmapFont::new(20.0, 1.25);
        assert_eq!(font.cell_size(), (12, 25));
        let degenerate = BitmapFont::new(0.0, 1.25);
        assert_eq!(degenerate.cell_size(), (1, 1));
    }

    #[test]
    fn bitmap_masks_fill_the_cell() {
        let font = BitmapFont::new(16.0, 1.0);
        let mask = font.rasterize('A').unwrap();
        assert_eq!((mask.width, mask.height), font.cell_size());
        assert!(mask.coverage.iter().any(|&c| c == 255));

        let blank = font.rasterize(' ').unwrap();
        assert!(blank.coverage.iter().all(|&c| c == 0));
    }

    #[test]
    fn bitmap_covers_preset_scripts() {
        let font = BitmapFont::new(8.0, 1.0);
        for ch in ['_', 'é', 'λ', 'あ', '▒', '┼'] {
            assert!(font.rasterize(ch).is_ok(), "{ch}");
        }
        assert!(matches!(
            font.rasterize('\u{1F600}'),
            Err(GlyphError::MissingGlyph('\u{1F600}'))
        ));
    }

    #[test]
    fn tint_premultiplies_coverage() {
        let mask = GlyphMask {
            width: 2,
            height: 1,
            coverage: vec![255, 0],
        };
        let c = mask.tint(Rgb::new(80, 255, 160));
        assert_eq!(c.pixels, vec![Rgb::new(80, 255, 160), Rgb::BLACK]);
    }

    #[test]
    fn stretch_repeats_rows() {
        let mask = GlyphMask {
            width: 1,
            height: 2,
            coverage: vec![10, 20],
        };
        assert_eq!(mask.stretched(4).coverage, vec![10, 10, 20, 20]);
    }

    #[test]
    fn unreadable_font_reports_path() {
        let err = TrueTypeFont::load(Path::new("/nonexistent/glyphfall.ttf"), 18.0, 1.25)
            .err()
            .unwrap();
        assert!(err.to_string().contains("/nonexistent/glyphfall.ttf"));
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        assert!(matches!(
            TrueTypeFont::from_bytes(b"not a font", 18.0, 1.0),
            Err(GlyphError::FontParse(_))
        ));
    }
}
