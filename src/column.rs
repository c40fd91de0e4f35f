// Copyright (c) 2026 rezky_nightky

//! One vertical character stream.
//!
//! A column owns its slots, the head position, the precomputed trail
//! gradient and at most one cascade overlay. Each frame it advances, picks
//! a color for every visible cell, and composites the cells through a
//! private scratch buffer onto the shared canvas.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::config::{ColumnTuning, RainConfig};
use crate::glyph_cache::GlyphTintCache;
use crate::ripple::Ripple;

/// Everything a column borrows from the simulation for one frame.
pub struct FrameCtx<'a> {
    pub config: &'a RainConfig,
    pub glyphs: &'a mut GlyphTintCache,
    pub rng: &'a mut StdRng,
    pub canvas: &'a mut Canvas,
}

/// Uniform sample in `[low, high]`; a collapsed range returns `low`.
pub(crate) fn uniform(rng: &mut StdRng, low: f32, high: f32) -> f32 {
    low + (high - low) * rng.random::<f32>()
}

/// Head re-roll period in seconds for a normalized speed.
fn flicker_interval_s(normalized_speed: f32, col: &ColumnTuning) -> f32 {
    let c = normalized_speed
        .clamp(0.0, 1.0)
        .powf(col.flicker_curve_exponent);
    ((1.0 - c) * col.flicker_slowest_ms + c * col.flicker_fastest_ms) / 1000.0
}

/// Per-frame re-roll chance of a trail cell `distance` cells behind the
/// head. Triples toward the tail.
fn tail_flicker_chance(base: f32, distance: usize, trail_length: usize) -> f32 {
    base * (1.0 + 2.0 * distance as f32 / trail_length.max(1) as f32)
}

fn cells_per_second(pps: f32, line_height: f32) -> f32 {
    if line_height > 0.0 {
        pps / line_height
    } else {
        0.0
    }
}

/// Head-to-tail color ramp for a trail of `trail_length` cells.
pub fn gradient_ramp(trail_length: usize, normalized_speed: f32, col: &ColumnTuning) -> Vec<Rgb> {
    if trail_length == 0 {
        return Vec::new();
    }

    let mult = 1.0 + normalized_speed * (col.leader_brightness_speed_multiplier - 1.0);
    let l = col.leader_color;
    let leader = Rgb::from_f32(l.r as f32 * mult, l.g as f32 * mult, l.b as f32 * mult);
    let stops = [
        (0.0, leader),
        (0.02, col.second_color),
        (0.15, col.second_color),
        (0.30, col.second_color.midpoint(col.trail_color)),
        (0.50, col.trail_color),
        (0.75, col.trail_color.halved()),
        (1.0, Rgb::BLACK),
    ];

    let denom = (trail_length - 1).max(1) as f32;
    let mut out = Vec::with_capacity(trail_length);
    out.push(leader);
    for i in 1..trail_length {
        let pos = i as f32 / denom;
        let (start, end) = stops
            .windows(2)
            .find(|w| w[0].0 <= pos && pos <= w[1].0)
            .map(|w| (w[0], w[1]))
            .unwrap_or((stops[0], stops[stops.len() - 1]));

        let t = if end.0 > start.0 {
            let t = (pos - start.0) / (end.0 - start.0);
            t * t * (3.0 - 2.0 * t)
        } else {
            1.0
        };
        out.push(start.1.lerp(end.1, t));
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CascadeOverlay {
    /// Trail offset of the highlight center, decaying toward the head.
    pos: f32,
    age: f32,
    color: Rgb,
}

impl CascadeOverlay {
    fn weight(&self, distance: usize, trail_length: usize, config: &RainConfig) -> Option<f32> {
        let halo = config.column.halo_size as i64;
        let d = (distance as i64 - self.pos as i64).abs();
        if d > halo {
            return None;
        }
        let halo_falloff = if halo > 0 {
            (halo - d) as f32 / halo as f32
        } else {
            1.0
        };

        let fade_len = config.cascade.fade_length;
        let ramp = |v: f32| {
            if fade_len > 1 {
                v / (fade_len - 1) as f32
            } else {
                1.0
            }
        };
        let mut lifecycle = 1.0;
        if fade_len > 0 {
            let from_start = (trail_length as f32 - 1.0) - self.pos;
            if from_start < fade_len as f32 {
                lifecycle = ramp(from_start);
            } else if self.pos < fade_len as f32 {
                lifecycle = ramp(self.pos);
            }
        }

        let mut w = halo_falloff * lifecycle;
        let fade_in = config.cascade.fade_in_ms / 1000.0;
        if fade_in > 0.0 && self.age < fade_in {
            w *= self.age / fade_in;
        }
        Some(w.clamp(0.0, 1.0))
    }
}

#[derive(Clone, Copy, Debug)]
struct CellDraw {
    ch: char,
    color: Rgb,
    y: i32,
    leader: bool,
}

pub struct Column {
    x: u32,
    line_height: f32,
    slots: Vec<char>,
    scratch: Canvas,
    padding: u32,

    first_run: bool,
    dormant: u32,
    leader_pos: f32,
    trail_length: usize,
    speed_pps: f32,
    speed_cps: f32,
    gradient: Vec<Rgb>,

    flicker_timer: f32,
    flicker_interval: f32,
    speed_timer: f32,
    next_speed_change: f32,

    cascade: Option<CascadeOverlay>,
    pending: Vec<CellDraw>,
}

impl Column {
    pub fn new(x: u32, config: &RainConfig, glyph_width: u32, rng: &mut StdRng) -> Self {
        let line_height = config.font.line_height();
        // sub-pixel rows would mean an unbounded slot count
        let num_chars = if line_height >= 1.0 && line_height.is_finite() {
            (config.height as f32 / line_height).ceil() as usize
        } else {
            0
        };

        let col = &config.column;
        let padding = config.font.leader_extra_boldness;
        let scratch = if num_chars > 0 {
            Canvas::new(
                glyph_width + 2 * padding + config.font.bold as u32,
                config.height,
            )
        } else {
            Canvas::new(0, 0)
        };

        let mut column = Self {
            x,
            line_height,
            slots: (0..num_chars).map(|_| pick_char(rng, col)).collect(),
            scratch,
            padding,
            first_run: true,
            dormant: 0,
            leader_pos: 0.0,
            trail_length: rng.random_range(col.length_range.low..=col.length_range.high) as usize,
            speed_pps: 0.0,
            speed_cps: 0.0,
            gradient: Vec::new(),
            flicker_timer: 0.0,
            flicker_interval: 0.0,
            speed_timer: 0.0,
            next_speed_change: uniform(
                rng,
                col.speed_change_interval.low,
                col.speed_change_interval.high,
            ),
            cascade: None,
            pending: Vec::new(),
        };
        if num_chars > 0 {
            column.reset_streak(config, rng);
        }
        column
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn num_chars(&self) -> usize {
        self.slots.len()
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn leader_pos(&self) -> f32 {
        self.leader_pos
    }

    pub fn trail_length(&self) -> usize {
        self.trail_length
    }

    pub fn speed_pps(&self) -> f32 {
        self.speed_pps
    }

    pub fn dormant(&self) -> u32 {
        self.dormant
    }

    pub fn gradient(&self) -> &[Rgb] {
        &self.gradient
    }

    /// Current head re-roll period in seconds.
    pub fn flicker_interval(&self) -> f32 {
        self.flicker_interval
    }

    /// Trail offset of the active cascade overlay, if any.
    pub fn cascade_pos(&self) -> Option<f32> {
        self.cascade.map(|c| c.pos)
    }

    /// Starts a new streak: fresh head position, speed, length, flicker
    /// cadence and gradient. The first call also applies the initial
    /// dormancy.
    pub(crate) fn reset_streak(&mut self, config: &RainConfig, rng: &mut StdRng) {
        let col = &config.column;
        if self.first_run {
            let n = self.slots.len().max(1) as i64;
            self.leader_pos = rng.random_range(-n..=-1) as f32;
            self.dormant = rng.random_range(col.dormancy_range.low..=col.dormancy_range.high);
            self.first_run = false;
        } else {
            self.leader_pos = rng.random_range(-(self.trail_length as i64)..=0) as f32;
            self.dormant = 0;
        }

        let exponent = if col.speed_bias > 0.0 {
            1.0 / col.speed_bias
        } else {
            1.0
        };
        let normalized = rng.random::<f32>().powf(exponent);
        self.speed_pps = col.speed_range.low + col.speed_range.width() * normalized;
        self.speed_cps = cells_per_second(self.speed_pps, self.line_height);
        self.speed_timer = 0.0;
        self.next_speed_change = uniform(
            rng,
            col.speed_change_interval.low,
            col.speed_change_interval.high,
        );

        // seeds the cadence; the per-frame value replaces it once the head draws
        self.flicker_interval = flicker_interval_s(normalized, col);

        let (low, high) = (col.length_range.low, col.length_range.high);
        let bias = rng.random::<f32>().powi(2);
        self.trail_length = ((low as f32 + (high - low) as f32 * bias) as usize).max(1);
        self.flicker_timer = 0.0;

        self.cascade = None;
        self.gradient = gradient_ramp(self.trail_length, normalized, col);
    }

    /// Requests a highlight overlay centred on the cell nearest `origin_y`.
    /// Refused when an overlay is already running, the column is dormant,
    /// the trail is too short for the fade envelope, or the cell is not on
    /// the visible trail.
    pub fn begin_cascade(&mut self, origin_y: f32, dark: bool, config: &RainConfig) -> bool {
        if self.cascade.is_some()
            || self.dormant > 0
            || self.trail_length <= config.cascade.min_trail_length()
        {
            return false;
        }
        if self.line_height <= 0.0 {
            return false;
        }

        let target = (origin_y / self.line_height).round();
        if !(target >= 0.0 && (target as usize) < self.slots.len()) {
            return false;
        }
        let start = self.leader_pos as i64 - target as i64;
        if start < 0 || start >= self.trail_length as i64 {
            return false;
        }

        let color = if dark {
            config.background
        } else {
            config
                .column
                .leader_color
                .boosted(config.cascade.brightness_boost)
        };
        self.cascade = Some(CascadeOverlay {
            pos: start as f32,
            age: 0.0,
            color,
        });
        true
    }

    fn update_speed(&mut self, dt: f32, col: &ColumnTuning, rng: &mut StdRng) {
        self.speed_timer += dt;
        if self.speed_timer < self.next_speed_change {
            return;
        }
        let max_change = col.speed_range.width() * col.speed_change_amount;
        let delta = uniform(rng, -max_change, max_change);
        self.speed_pps = (self.speed_pps + delta).clamp(col.speed_range.low, col.speed_range.high);
        self.speed_cps = cells_per_second(self.speed_pps, self.line_height);
        self.speed_timer = 0.0;
        self.next_speed_change = uniform(
            rng,
            col.speed_change_interval.low,
            col.speed_change_interval.high,
        );
    }

    /// Advances the stream by `dt` seconds and draws its visible cells onto
    /// `ctx.canvas`. Returns the number of cells drawn.
    pub fn advance(&mut self, dt: f32, ripples: &[Ripple], ctx: &mut FrameCtx<'_>) -> usize {
        if self.slots.is_empty() {
            return 0;
        }
        if self.dormant > 0 {
            self.dormant -= 1;
            return 0;
        }

        let config = ctx.config;
        let col = &config.column;
        if col.variable_speed {
            self.update_speed(dt, col, ctx.rng);
        }

        self.flicker_timer += dt;
        self.leader_pos += self.speed_cps * dt;

        let n = self.slots.len() as i64;
        let trail = self.trail_length as i64;
        if self.leader_pos - self.trail_length as f32 > n as f32 {
            self.reset_streak(config, ctx.rng);
            return 0;
        }

        let leader = self.leader_pos as i64;
        let start = (leader - trail + 1).max(0);
        let end = (leader + 2).min(n);

        self.pending.clear();
        for i in start..end {
            let distance = leader - i;
            if distance < 0 || distance >= trail {
                continue;
            }
            let (i, distance) = (i as usize, distance as usize);
            let is_leader = distance == 0;

            if is_leader {
                let interval = flicker_interval_s(col.speed_range.normalize(self.speed_pps), col);
                let due = self.flicker_timer >= interval;
                if interval < dt || due {
                    self.slots[i] = pick_char(ctx.rng, col);
                }
                if due {
                    self.flicker_timer = 0.0;
                }
                self.flicker_interval = interval;
            } else {
                let chance = tail_flicker_chance(col.flicker_chance, distance, self.trail_length);
                if ctx.rng.random::<f32>() < chance {
                    self.slots[i] = pick_char(ctx.rng, col);
                }
            }

            let mut color = self.gradient.get(distance).copied().unwrap_or(Rgb::BLACK);
            if let Some(overlay) = &self.cascade {
                if let Some(w) = overlay.weight(distance, self.trail_length, config) {
                    color = color.lerp(overlay.color, w);
                }
            }

            let cell_y = i as f32 * self.line_height;
            for ripple in ripples {
                if let Some(w) = ripple.influence(self.x as f32, cell_y, &config.ripple) {
                    color = color.lerp(ripple.target_color, w);
                }
            }

            self.pending.push(CellDraw {
                ch: self.slots[i],
                color: color.quantize(config.quantization_step),
                y: cell_y as i32,
                leader: is_leader,
            });
        }

        let drawn = self.composite(ctx);

        if let Some(overlay) = &mut self.cascade {
            overlay.pos -= config.cascade.decay_speed_cps * dt;
            overlay.age += dt;
            if overlay.pos < 0.0 {
                self.cascade = None;
            }
        }
        drawn
    }

    /// Draws the pending cells into the scratch buffer and copies the dirty
    /// band onto the canvas.
    fn composite(&mut self, ctx: &mut FrameCtx<'_>) -> usize {
        let (first, last) = match (self.pending.first(), self.pending.last()) {
            (Some(f), Some(l)) => (f.y, l.y),
            _ => return 0,
        };
        let (_, glyph_h) = ctx.glyphs.cell_size();
        let min_y = first.max(0);
        let band = (last - min_y).max(0) as u32 + glyph_h;
        self.scratch.fill_rows(min_y, band, Rgb::BLACK);

        let font = &ctx.config.font;
        let ox = self.padding as i32;
        let bold = font.bold as i32;
        for cell in &self.pending {
            let glyph = match ctx.glyphs.get(cell.ch, cell.color) {
                Some(g) => g,
                None => continue,
            };
            self.scratch.blit_max(glyph, ox, cell.y);
            if font.bold {
                self.scratch.blit_max(glyph, ox + 1, cell.y);
            }
            if cell.leader {
                for i in 0..font.leader_extra_boldness as i32 {
                    let off = i / 2 + 1;
                    let dx = if i % 2 == 0 { ox + bold + off } else { ox - off };
                    self.scratch.blit_max(glyph, dx, cell.y);
                }
            }
        }

        ctx.canvas.blit_rows_max(
            &self.scratch,
            min_y as u32,
            band,
            self.x as i32 - ox,
            min_y,
        );
        self.pending.len()
    }
}

fn pick_char(rng: &mut StdRng, col: &ColumnTuning) -> char {
    col.alphabet.choose(rng).copied().unwrap_or(' ')
}

#[cfg(test)]
impl Column {
    /// Puts the column mid-streak with its head on `leader`.
    pub(crate) fn place_head(&mut self, leader: f32, trail: usize, config: &RainConfig) {
        self.dormant = 0;
        self.leader_pos = leader;
        self.trail_length = trail;
        self.cascade = None;
        self.gradient = gradient_ramp(trail, 0.5, &config.column);
    }
}
