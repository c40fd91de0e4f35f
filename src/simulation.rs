// Copyright (c) 2026 rezky_nightky

//! Per-frame driver that owns every column and effect and composites a
//! frame onto a caller-provided [`Canvas`].
//!
//! A frame runs in a fixed order: observe frame rate, clear, advance and
//! draw all columns (with the live ripples), update cascades, update
//! ripples, lay the overlays on top.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::cascade::HighlightCascadeManager;
use crate::column::{Column, FrameCtx};
use crate::config::{EffectFlags, RainConfig};
use crate::error::RainError;
use crate::glyph::GlyphSource;
use crate::glyph_cache::GlyphTintCache;
use crate::overlay::Overlays;
use crate::quality::AdaptiveQualityController;
use crate::ripple::RippleManager;

/// Counters reported by [`Simulation::shutdown`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub cells_drawn: u64,
    pub peak_cascades: usize,
    pub peak_ripples: usize,
    pub tint_cache_entries: usize,
    pub degrade_events: u32,
}

pub struct Simulation {
    config: RainConfig,
    columns: Vec<Column>,
    glyphs: GlyphTintCache,
    rng: StdRng,
    cascades: HighlightCascadeManager,
    ripples: RippleManager,
    quality: AdaptiveQualityController,
    overlays: Overlays,
    running: bool,
    stats: FrameStats,
}

impl Simulation {
    pub fn initialize(config: RainConfig, glyphs: &dyn GlyphSource) -> Result<Self, RainError> {
        config.validate()?;

        let cache = GlyphTintCache::new(glyphs, &config.column.alphabet)?;
        let (glyph_w, glyph_h) = cache.cell_size();

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let columns: Vec<Column> = config
            .column_positions()
            .map(|x| Column::new(x, &config, glyph_w, &mut rng))
            .collect();

        debug!(
            columns = columns.len(),
            glyph_w,
            glyph_h,
            alphabet = cache.master_count(),
            width = config.width,
            height = config.height,
            "simulation initialized"
        );

        let quality = AdaptiveQualityController::new(
            config.target_fps,
            config.fps_window,
            config.adaptive_threshold_fps,
            config.effects.ripples,
            config.effects.cascades,
        );
        let overlays = Overlays::new(&config);

        Ok(Self {
            config,
            columns,
            glyphs: cache,
            rng,
            cascades: HighlightCascadeManager::new(),
            ripples: RippleManager::new(),
            quality,
            overlays,
            running: true,
            stats: FrameStats::default(),
        })
    }

    /// Starts a simulation for a new canvas size from `config`, keeping any
    /// effect this one has already shed switched off.
    pub fn reinitialize(
        &self,
        mut config: RainConfig,
        glyphs: &dyn GlyphSource,
    ) -> Result<Self, RainError> {
        let live = self.quality();
        config.effects.ripples &= live.ripples;
        config.effects.cascades &= live.cascades;
        debug!(
            ripples = config.effects.ripples,
            cascades = config.effects.cascades,
            "reinitializing simulation"
        );
        Self::initialize(config, glyphs)
    }

    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn cascades(&self) -> &HighlightCascadeManager {
        &self.cascades
    }

    pub fn ripples(&self) -> &RippleManager {
        &self.ripples
    }

    /// A blank canvas of the configured size.
    pub fn new_canvas(&self) -> Canvas {
        Canvas::filled(self.config.width, self.config.height, self.config.background)
    }

    /// Effect flags currently in force, after any adaptive degradation.
    pub fn quality(&self) -> EffectFlags {
        EffectFlags {
            ripples: self.quality.ripples_enabled(),
            cascades: self.quality.cascades_enabled(),
            ..self.config.effects
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Simulates `elapsed` seconds and draws the frame onto `canvas`.
    /// Returns the number of cells drawn. Does nothing once stopped.
    pub fn step(&mut self, elapsed: f32, canvas: &mut Canvas) -> usize {
        if !self.running {
            return 0;
        }
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        if elapsed > 0.0 {
            self.quality.observe(1.0 / elapsed);
        }
        let dt = elapsed.min(self.config.max_frame_delta);
        let ripples_on = self.quality.ripples_enabled();
        let cascades_on = self.quality.cascades_enabled();

        canvas.fill(self.config.background);

        let live: &[_] = if ripples_on { self.ripples.active() } else { &[] };
        let mut ctx = FrameCtx {
            config: &self.config,
            glyphs: &mut self.glyphs,
            rng: &mut self.rng,
            canvas: &mut *canvas,
        };
        let mut drawn = 0;
        for column in &mut self.columns {
            drawn += column.advance(dt, live, &mut ctx);
        }

        if cascades_on {
            self.cascades
                .update(dt, &mut self.columns, &self.config, &mut self.rng);
        } else {
            self.cascades.clear();
        }
        if ripples_on {
            self.ripples.update(dt, &self.config, &mut self.rng);
        } else {
            self.ripples.clear();
        }

        self.overlays.apply(canvas);

        self.stats.frames += 1;
        self.stats.cells_drawn += drawn as u64;
        drawn
    }

    /// Stops the simulation and reports its counters.
    pub fn shutdown(mut self) -> FrameStats {
        self.running = false;
        let stats = FrameStats {
            peak_cascades: self.cascades.peak(),
            peak_ripples: self.ripples.peak(),
            tint_cache_entries: self.glyphs.len(),
            degrade_events: self.quality.degrade_events(),
            ..self.stats
        };
        info!(
            frames = stats.frames,
            cells_drawn = stats.cells_drawn,
            peak_cascades = stats.peak_cascades,
            peak_ripples = stats.peak_ripples,
            tint_cache_entries = stats.tint_cache_entries,
            degrade_events = stats.degrade_events,
            "simulation shut down"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::glyph::BitmapFont;
    use pretty_assertions::assert_eq;

    fn seeded(width: u32, height: u32) -> RainConfig {
        let mut cfg = RainConfig {
            width,
            height,
            seed: Some(11),
            ..RainConfig::default()
        };
        cfg.column.dormancy_range.high = 5;
        cfg
    }

    fn font_for(cfg: &RainConfig) -> BitmapFont {
        BitmapFont::new(cfg.font.size, cfg.font.stretch)
    }

    #[test]
    fn lays_out_columns_at_spacing() {
        let cfg = seeded(100, 60);
        let sim = Simulation::initialize(cfg.clone(), &font_for(&cfg)).unwrap();
        let xs: Vec<u32> = sim.columns().iter().map(|c| c.x()).collect();
        assert_eq!(xs, vec![0, 11, 22, 33, 44, 55, 66, 77, 88, 99]);
    }

    #[test]
    fn invalid_config_is_rejected_before_any_frame() {
        let mut cfg = seeded(100, 60);
        cfg.column.alphabet.clear();
        let err = Simulation::initialize(cfg.clone(), &font_for(&cfg))
            .err()
            .unwrap();
        assert!(matches!(err, RainError::Config(_)));
    }

    #[test]
    fn stopped_simulation_leaves_canvas_untouched() {
        let cfg = seeded(64, 48);
        let mut sim = Simulation::initialize(cfg.clone(), &font_for(&cfg)).unwrap();
        let mut canvas = Canvas::filled(64, 48, Rgb::new(9, 9, 9));
        sim.stop();
        assert!(!sim.is_running());
        assert_eq!(sim.step(1.0 / 60.0, &mut canvas), 0);
        assert!(canvas.pixels.iter().all(|p| *p == Rgb::new(9, 9, 9)));
        assert_eq!(sim.shutdown().frames, 0);
    }

    #[test]
    fn slow_frames_shed_ripples_then_cascades() {
        let mut cfg = seeded(64, 48);
        cfg.fps_window = 1;
        let mut sim = Simulation::initialize(cfg.clone(), &font_for(&cfg)).unwrap();
        let mut canvas = sim.new_canvas();

        sim.step(0.5, &mut canvas);
        let q = sim.quality();
        assert!(!q.ripples && q.cascades && q.haze && q.grid);
        sim.step(0.5, &mut canvas);
        assert!(!sim.quality().cascades);
        assert!(sim.ripples().active().is_empty());
        assert!(sim.cascades().active().is_empty());
        assert_eq!(sim.shutdown().degrade_events, 2);
    }

    #[test]
    fn shed_effects_stay_off_across_reinitialize() {
        let mut cfg = seeded(64, 48);
        cfg.fps_window = 1;
        let font = font_for(&cfg);
        let mut sim = Simulation::initialize(cfg.clone(), &font).unwrap();
        let mut canvas = sim.new_canvas();
        sim.step(0.5, &mut canvas);
        assert!(!sim.quality().ripples);

        let bigger = RainConfig {
            width: 128,
            height: 96,
            ..cfg.clone()
        };
        let mut next = sim.reinitialize(bigger, &font).unwrap();
        assert_eq!(next.config().width, 128);
        assert!(!next.quality().ripples);
        assert!(next.quality().cascades);

        let mut canvas = next.new_canvas();
        for _ in 0..10 {
            next.step(1.0 / 60.0, &mut canvas);
        }
        assert!(!next.quality().ripples);
        assert_eq!(next.shutdown().peak_ripples, 0);
    }

    #[test]
    fn bad_elapsed_values_are_harmless() {
        let cfg = seeded(64, 48);
        let mut sim = Simulation::initialize(cfg.clone(), &font_for(&cfg)).unwrap();
        let mut canvas = sim.new_canvas();
        sim.step(f32::NAN, &mut canvas);
        sim.step(-1.0, &mut canvas);
        sim.step(f32::INFINITY, &mut canvas);
        assert_eq!(sim.quality(), cfg.effects);
        assert_eq!(sim.shutdown().frames, 3);
    }
}
