// Copyright (c) 2026 rezky_nightky

//! Software renderer for glowing "digital rain".
//!
//! Columns of characters fall at varied speeds with bright heads and
//! fading trails. Two spatial effects play on top: highlight cascades that
//! sweep a travelling glow across nearby trails, and distortion ripples that
//! tint any cell they pass over. An adaptive controller sheds those effects
//! when the frame rate drops.
//!
//! The entry point is [`Simulation`]: build a [`RainConfig`], pick a
//! [`GlyphSource`], then call [`Simulation::step`] once per frame with the
//! elapsed time and a [`Canvas`] to draw into.
//!
//! ```no_run
//! use glyphfall::{BitmapFont, RainConfig, Simulation};
//!
//! let config = RainConfig { width: 320, height: 200, ..RainConfig::default() };
//! let font = BitmapFont::new(config.font.size, config.font.stretch);
//! let mut sim = Simulation::initialize(config, &font)?;
//! let mut canvas = sim.new_canvas();
//! for _ in 0..60 {
//!     sim.step(1.0 / 60.0, &mut canvas);
//! }
//! let stats = sim.shutdown();
//! println!("{} frames", stats.frames);
//! # Ok::<(), glyphfall::RainError>(())
//! ```

pub mod canvas;
pub mod cascade;
pub mod charset;
pub mod color;
pub mod column;
pub mod config;
pub mod error;
pub mod glyph;
pub mod glyph_cache;
pub mod overlay;
pub mod palette;
pub mod quality;
pub mod ripple;
pub mod simulation;

pub use canvas::Canvas;
pub use color::Rgb;
pub use config::{EffectFlags, RainConfig, Span};
pub use error::{ColorParseError, ConfigError, GlyphError, RainError};
pub use glyph::{BitmapFont, GlyphSource, TrueTypeFont};
pub use simulation::{FrameStats, Simulation};
