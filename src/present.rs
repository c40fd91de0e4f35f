// Copyright (c) 2026 rezky_nightky

//! Turns a pixel canvas into terminal cells. Every cell shows two stacked
//! pixel blocks using the upper half block glyph, foreground on top and
//! background below.

use std::env;

use anyhow::bail;
use crossterm::style::Color;

use glyphfall::{Canvas, Rgb};

use crate::frame::{Cell, Frame};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }
}

pub fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }
    ColorMode::Color16
}

pub fn color_mode_from_arg(forced: Option<u16>) -> anyhow::Result<ColorMode> {
    Ok(match forced {
        None => detect_color_mode_auto(),
        Some(0) => ColorMode::Mono,
        Some(16) => ColorMode::Color16,
        Some(8) | Some(256) => ColorMode::Color256,
        Some(24) | Some(32) => ColorMode::TrueColor,
        Some(m) => bail!("invalid --colormode: {} (allowed: 0,16,8/256,24/32)", m),
    })
}

fn dist2(a: (i32, i32, i32), b: (i32, i32, i32)) -> i32 {
    let (dr, dg, db) = (a.0 - b.0, a.1 - b.1, a.2 - b.2);
    dr * dr + dg * dg + db * db
}

const CUBE_LEVELS: [i32; 6] = [0, 95, 135, 175, 215, 255];

fn nearest_cube_level(v: i32) -> usize {
    CUBE_LEVELS
        .iter()
        .enumerate()
        .min_by_key(|(_, &l)| (l - v).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Closest xterm-256 index, choosing between the 6x6x6 cube and the
/// 24-step gray ramp.
pub fn rgb_to_ansi256(c: Rgb) -> u8 {
    let px = (c.r as i32, c.g as i32, c.b as i32);

    let (ri, gi, bi) = (
        nearest_cube_level(px.0),
        nearest_cube_level(px.1),
        nearest_cube_level(px.2),
    );
    let cube = (CUBE_LEVELS[ri], CUBE_LEVELS[gi], CUBE_LEVELS[bi]);
    let cube_idx = 16 + 36 * ri + 6 * gi + bi;

    let avg = (px.0 + px.1 + px.2) / 3;
    let gray_step = ((avg - 8).max(0) / 10).min(23);
    let gray_v = 8 + gray_step * 10;
    let gray_idx = 232 + gray_step as usize;

    if dist2(px, (gray_v, gray_v, gray_v)) < dist2(px, cube) {
        gray_idx as u8
    } else {
        cube_idx as u8
    }
}

const ANSI16: [(Color, (i32, i32, i32)); 16] = [
    (Color::Black, (0, 0, 0)),
    (Color::DarkRed, (128, 0, 0)),
    (Color::DarkGreen, (0, 128, 0)),
    (Color::DarkYellow, (128, 128, 0)),
    (Color::DarkBlue, (0, 0, 128)),
    (Color::DarkMagenta, (128, 0, 128)),
    (Color::DarkCyan, (0, 128, 128)),
    (Color::Grey, (192, 192, 192)),
    (Color::DarkGrey, (128, 128, 128)),
    (Color::Red, (255, 0, 0)),
    (Color::Green, (0, 255, 0)),
    (Color::Yellow, (255, 255, 0)),
    (Color::Blue, (0, 0, 255)),
    (Color::Magenta, (255, 0, 255)),
    (Color::Cyan, (0, 255, 255)),
    (Color::White, (255, 255, 255)),
];

pub fn rgb_to_color16(c: Rgb) -> Color {
    let px = (c.r as i32, c.g as i32, c.b as i32);
    ANSI16
        .iter()
        .min_by_key(|(_, v)| dist2(px, *v))
        .map(|(color, _)| *color)
        .unwrap_or(Color::White)
}

pub fn map_color(c: Rgb, mode: ColorMode) -> Option<Color> {
    match mode {
        ColorMode::TrueColor => Some(Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(c))),
        ColorMode::Color16 => Some(rgb_to_color16(c)),
        ColorMode::Mono => None,
    }
}

/// Per-channel max over the `w`x`h` pixel block at (`x`, `y`).
fn block_max(canvas: &Canvas, x: u32, y: u32, w: u32, h: u32) -> Rgb {
    let mut out = Rgb::BLACK;
    for py in y..y.saturating_add(h) {
        for px in x..x.saturating_add(w) {
            if let Some(p) = canvas.get(px, py) {
                out = out.max(p);
            }
        }
    }
    out
}

/// Brightness above which a block counts as lit in mono mode.
const MONO_THRESHOLD: u16 = 120;

/// Canvas size that covers a `cols`x`rows` terminal at `scale`.
pub fn canvas_size(cols: u16, rows: u16, scale: u32) -> (u32, u32) {
    let scale = scale.max(1);
    (
        (cols as u32 * scale).max(1),
        (rows as u32 * 2 * scale).max(1),
    )
}

pub fn present(canvas: &Canvas, frame: &mut Frame, mode: ColorMode, scale: u32) {
    let scale = scale.max(1);
    for cy in 0..frame.height {
        for cx in 0..frame.width {
            let x = cx as u32 * scale;
            let y = cy as u32 * 2 * scale;
            let top = block_max(canvas, x, y, scale, scale);
            let bottom = block_max(canvas, x, y + scale, scale, scale);

            let cell = if mode == ColorMode::Mono {
                let lit_top = top.luminance_sum() > MONO_THRESHOLD;
                let lit_bottom = bottom.luminance_sum() > MONO_THRESHOLD;
                let ch = match (lit_top, lit_bottom) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                };
                Cell { ch, fg: None, bg: None }
            } else {
                Cell {
                    ch: '▀',
                    fg: map_color(top, mode),
                    bg: map_color(bottom, mode),
                }
            };
            frame.set(cx, cy, cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ansi256_picks_cube_and_gray() {
        assert_eq!(rgb_to_ansi256(Rgb::new(255, 0, 0)), 196);
        assert_eq!(rgb_to_ansi256(Rgb::new(0, 255, 0)), 46);
        assert_eq!(rgb_to_ansi256(Rgb::new(128, 128, 128)), 244);
        assert_eq!(rgb_to_ansi256(Rgb::BLACK), 16);
    }

    #[test]
    fn color16_nearest() {
        assert_eq!(rgb_to_color16(Rgb::new(250, 10, 10)), Color::Red);
        assert_eq!(rgb_to_color16(Rgb::new(0, 120, 0)), Color::DarkGreen);
        assert_eq!(rgb_to_color16(Rgb::new(250, 250, 250)), Color::White);
    }

    #[test]
    fn forced_modes() {
        assert_eq!(color_mode_from_arg(Some(0)).unwrap(), ColorMode::Mono);
        assert_eq!(color_mode_from_arg(Some(256)).unwrap(), ColorMode::Color256);
        assert_eq!(color_mode_from_arg(Some(32)).unwrap(), ColorMode::TrueColor);
        assert!(color_mode_from_arg(Some(7)).is_err());
    }

    #[test]
    fn half_blocks_take_block_maximum() {
        let mut canvas = Canvas::new(4, 8);
        canvas.set(1, 0, Rgb::new(10, 200, 0));
        canvas.set(0, 3, Rgb::new(0, 0, 90));
        let (w, h) = canvas_size(2, 2, 2);
        assert_eq!((w, h), (4, 8));

        let mut frame = Frame::new(2, 2);
        present(&canvas, &mut frame, ColorMode::TrueColor, 2);
        let cell = frame.cell_at_index(0);
        assert_eq!(cell.ch, '▀');
        assert_eq!(cell.fg, Some(Color::Rgb { r: 10, g: 200, b: 0 }));
        assert_eq!(cell.bg, Some(Color::Rgb { r: 0, g: 0, b: 90 }));
    }

    #[test]
    fn mono_uses_block_shapes() {
        let mut canvas = Canvas::new(1, 4);
        canvas.set(0, 3, Rgb::WHITE);
        let mut frame = Frame::new(1, 2);
        present(&canvas, &mut frame, ColorMode::Mono, 1);
        assert_eq!(frame.cell_at_index(0).ch, ' ');
        assert_eq!(frame.cell_at_index(1).ch, '▄');
    }
}
