// Copyright (c) 2026 rezky_nightky

use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::config::RainConfig;

/// Static decoration laid over every finished frame: a faint uniform haze
/// and a CRT-style line grid.
#[derive(Clone, Debug)]
pub struct Overlays {
    haze: Option<(Rgb, u8)>,
    grid_color: Rgb,
    grid_alpha: u8,
    /// Pixels on a grid line, each listed once.
    grid_pixels: Vec<(u32, u32)>,
}

impl Overlays {
    pub fn new(config: &RainConfig) -> Self {
        let haze = (config.effects.haze && config.haze.alpha > 0)
            .then_some((config.haze.color, config.haze.alpha));

        let mut grid_pixels = Vec::new();
        if config.effects.grid && config.grid.alpha > 0 && config.grid.size > 0 {
            let size = config.grid.size;
            for y in 0..config.height {
                for x in 0..config.width {
                    if x % size == 0 || y % size == 0 {
                        grid_pixels.push((x, y));
                    }
                }
            }
        }

        Self {
            haze,
            grid_color: config.grid.color,
            grid_alpha: config.grid.alpha,
            grid_pixels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.haze.is_none() && self.grid_pixels.is_empty()
    }

    pub fn apply(&self, canvas: &mut Canvas) {
        if let Some((color, alpha)) = self.haze {
            for px in &mut canvas.pixels {
                *px = px.blend(color, alpha);
            }
        }
        for &(x, y) in &self.grid_pixels {
            canvas.blend_pixel(x, y, self.grid_color, self.grid_alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RainConfig {
        RainConfig {
            width: 6,
            height: 4,
            ..RainConfig::default()
        }
    }

    #[test]
    fn grid_lines_are_blended_once() {
        let mut cfg = small_config();
        cfg.effects.haze = false;
        cfg.grid.color = Rgb::BLACK;
        cfg.grid.alpha = 128;
        let overlays = Overlays::new(&cfg);

        let mut canvas = Canvas::filled(6, 4, Rgb::new(200, 200, 200));
        overlays.apply(&mut canvas);
        let dim = Rgb::new(200, 200, 200).blend(Rgb::BLACK, 128);
        assert_eq!(canvas.get(0, 0), Some(dim), "intersection is not darkened twice");
        assert_eq!(canvas.get(3, 1), Some(dim));
        assert_eq!(canvas.get(1, 3), Some(dim));
        assert_eq!(canvas.get(1, 1), Some(Rgb::new(200, 200, 200)));
    }

    #[test]
    fn haze_tints_black_background() {
        let mut cfg = small_config();
        cfg.effects.grid = false;
        let overlays = Overlays::new(&cfg);
        let mut canvas = Canvas::new(6, 4);
        overlays.apply(&mut canvas);
        let hazed = Rgb::BLACK.blend(Rgb::new(0, 255, 0), 10);
        assert!(hazed.g > 0);
        assert!(canvas.pixels.iter().all(|p| *p == hazed));
    }

    #[test]
    fn disabled_effects_leave_the_frame_alone() {
        let mut cfg = small_config();
        cfg.effects.grid = false;
        cfg.effects.haze = false;
        let overlays = Overlays::new(&cfg);
        assert!(overlays.is_empty());
        let mut canvas = Canvas::filled(6, 4, Rgb::new(1, 2, 3));
        overlays.apply(&mut canvas);
        assert!(canvas.pixels.iter().all(|p| *p == Rgb::new(1, 2, 3)));
    }
}
