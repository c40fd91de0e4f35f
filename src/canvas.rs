// Copyright (c) 2026 rezky_nightky

use std::io::{self, Write};

use crate::color::Rgb;

/// Row-major RGB pixel buffer. Used for the shared frame, per-column scratch
/// buffers and tinted glyphs alike.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgb::BLACK)
    }

    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }

    pub fn set(&mut self, x: u32, y: u32, color: Rgb) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.pixels[idx] = color;
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Fills `rows` rows starting at `y`, clipped to the buffer.
    pub fn fill_rows(&mut self, y: i32, rows: u32, color: Rgb) {
        let (start, end) = match clip_span(y, rows, self.height) {
            Some(v) => v,
            None => return,
        };
        let w = self.width as usize;
        self.pixels[start as usize * w..end as usize * w].fill(color);
    }

    /// Per-channel max of `src` onto this buffer with its top-left corner at
    /// (`dx`, `dy`). Out-of-range parts are clipped.
    pub fn blit_max(&mut self, src: &Canvas, dx: i32, dy: i32) {
        self.blit_rows_max(src, 0, src.height, dx, dy);
    }

    /// Like [`Canvas::blit_max`] but only copies the band of `rows` rows of
    /// `src` starting at `src_y`.
    pub fn blit_rows_max(&mut self, src: &Canvas, src_y: u32, rows: u32, dx: i32, dy: i32) {
        let rows = rows.min(src.height.saturating_sub(src_y));
        if rows == 0 || src.width == 0 {
            return;
        }

        let (x0, x1) = match clip_span(dx, src.width, self.width) {
            Some(v) => v,
            None => return,
        };
        let (y0, y1) = match clip_span(dy, rows, self.height) {
            Some(v) => v,
            None => return,
        };

        let sx0 = (x0 as i64 - dx as i64) as usize;
        let span = (x1 - x0) as usize;
        for y in y0..y1 {
            let sy = (y as i64 - dy as i64) as u32 + src_y;
            let s = src.index(0, sy) + sx0;
            let d = self.index(x0, y);
            let src_row = &src.pixels[s..s + span];
            let dst_row = &mut self.pixels[d..d + span];
            for (dst, &px) in dst_row.iter_mut().zip(src_row) {
                *dst = dst.max(px);
            }
        }
    }

    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgb, alpha: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.pixels[idx] = self.pixels[idx].blend(color, alpha);
    }

    /// Writes the buffer as a binary PPM (P6) image.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for px in &self.pixels {
            bytes.extend_from_slice(&[px.r, px.g, px.b]);
        }
        out.write_all(&bytes)?;
        out.flush()
    }
}

/// Intersects `[start, start + len)` with `[0, limit)`.
fn clip_span(start: i32, len: u32, limit: u32) -> Option<(u32, u32)> {
    let lo = (start as i64).max(0);
    let hi = (start as i64 + len as i64).min(limit as i64);
    if lo >= hi {
        None
    } else {
        Some((lo as u32, hi as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_max_keeps_brighter_channels() {
        let mut dst = Canvas::filled(3, 3, Rgb::new(50, 0, 200));
        let src = Canvas::filled(2, 2, Rgb::new(100, 10, 0));
        dst.blit_max(&src, 1, 1);
        assert_eq!(dst.get(0, 0), Some(Rgb::new(50, 0, 200)));
        assert_eq!(dst.get(2, 2), Some(Rgb::new(100, 10, 200)));
    }

    #[test]
    fn blit_clips_negative_offsets() {
        let mut dst = Canvas::new(2, 2);
        let mut src = Canvas::new(2, 2);
        src.set(1, 1, Rgb::WHITE);
        dst.blit_max(&src, -1, -1);
        assert_eq!(dst.get(0, 0), Some(Rgb::WHITE));
        assert_eq!(dst.pixels.iter().filter(|p| **p == Rgb::WHITE).count(), 1);

        dst.blit_max(&src, 5, 0);
        dst.blit_max(&src, 0, -10);
        assert_eq!(dst.pixels.iter().filter(|p| **p == Rgb::WHITE).count(), 1);
    }

    #[test]
    fn blit_rows_copies_only_the_band() {
        let mut src = Canvas::filled(1, 4, Rgb::WHITE);
        src.set(0, 0, Rgb::new(9, 9, 9));
        let mut dst = Canvas::new(1, 4);
        dst.blit_rows_max(&src, 1, 2, 0, 1);
        let col: Vec<Rgb> = dst.pixels.clone();
        assert_eq!(col, vec![Rgb::BLACK, Rgb::WHITE, Rgb::WHITE, Rgb::BLACK]);
    }

    #[test]
    fn fill_rows_clips() {
        let mut c = Canvas::new(2, 3);
        c.fill_rows(-1, 2, Rgb::WHITE);
        assert_eq!(c.get(1, 0), Some(Rgb::WHITE));
        assert_eq!(c.get(0, 1), Some(Rgb::BLACK));
        c.fill_rows(3, 5, Rgb::WHITE);
    }

    #[test]
    fn ppm_header_and_payload() {
        let c = Canvas::filled(2, 1, Rgb::new(1, 2, 3));
        let mut out = Vec::new();
        c.write_ppm(&mut out).unwrap();
        let header = b"P6\n2 1\n255\n";
        assert_eq!(&out[..header.len()], header);
        assert_eq!(&out[header.len()..], &[1, 2, 3, 1, 2, 3]);
    }
}
