// Copyright (c) 2026 rezky_nightky

use std::collections::HashMap;

use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::error::GlyphError;
use crate::glyph::{GlyphMask, GlyphSource};

/// Full-brightness masters for every character of the alphabet plus a
/// lazily grown memo of tinted renderings keyed by `(char, color)`.
///
/// Colors reaching the cache are quantized by the caller, which keeps the
/// tinted map small. Entries are never evicted.
pub struct GlyphTintCache {
    cell: (u32, u32),
    masters: HashMap<char, GlyphMask>,
    tinted: HashMap<(char, Rgb), Canvas>,
}

impl GlyphTintCache {
    pub fn new(source: &dyn GlyphSource, alphabet: &[char]) -> Result<Self, GlyphError> {
        let mut masters = HashMap::new();
        for &ch in alphabet {
            if masters.contains_key(&ch) {
                continue;
            }
            masters.insert(ch, source.rasterize(ch)?);
        }
        Ok(Self {
            cell: source.cell_size(),
            masters,
            tinted: HashMap::new(),
        })
    }

    pub fn cell_size(&self) -> (u32, u32) {
        self.cell
    }

    /// Tinted rendering of `ch`. `None` for characters outside the alphabet.
    pub fn get(&mut self, ch: char, color: Rgb) -> Option<&Canvas> {
        let mask = self.masters.get(&ch)?;
        Some(
            self.tinted
                .entry((ch, color))
                .or_insert_with(|| mask.tint(color)),
        )
    }

    pub fn master_count(&self) -> usize {
        self.masters.len()
    }

    pub fn len(&self) -> usize {
        self.tinted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tinted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::BitmapFont;

    #[test]
    fn masters_are_deduplicated() {
        let font = BitmapFont::new(10.0, 1.0);
        let cache = GlyphTintCache::new(&font, &['_', '_', 'a', '_']).unwrap();
        assert_eq!(cache.master_count(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn tinted_variants_are_memoized() {
        let font = BitmapFont::new(10.0, 1.0);
        let mut cache = GlyphTintCache::new(&font, &['0', '1']).unwrap();
        let green = Rgb::new(0, 255, 0);

        let first = cache.get('0', green).cloned().unwrap();
        assert_eq!(cache.len(), 1);
        let again = cache.get('0', green).cloned().unwrap();
        assert_eq!(first, again);
        assert_eq!(cache.len(), 1);

        cache.get('0', Rgb::WHITE).unwrap();
        cache.get('1', green).unwrap();
        assert_eq!(cache.len(), 3);
        assert!(first.pixels.iter().all(|p| p.r == 0 && p.b == 0));
    }

    #[test]
    fn unknown_characters_are_not_cached() {
        let font = BitmapFont::new(10.0, 1.0);
        let mut cache = GlyphTintCache::new(&font, &['0']).unwrap();
        assert!(cache.get('Z', Rgb::WHITE).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn missing_glyph_fails_construction() {
        let font = BitmapFont::new(10.0, 1.0);
        assert!(matches!(
            GlyphTintCache::new(&font, &['0', '\u{1F600}']),
            Err(GlyphError::MissingGlyph(_))
        ));
    }
}
