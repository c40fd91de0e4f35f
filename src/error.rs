// Copyright (c) 2026 rezky_nightky

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Rejected configuration values. Raised once, before any frame runs.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("canvas must be at least 1x1 pixels (got {width}x{height})")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("{name}: low {low} is greater than high {high}")]
    InvertedRange {
        name: &'static str,
        low: f64,
        high: f64,
    },

    #[error("{name} must be a finite number")]
    NotFinite { name: &'static str },

    #[error("{name} {value} is out of bounds (min {min} max {max})")]
    OutOfBounds {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("character alphabet is empty")]
    EmptyAlphabet,
}

#[derive(Debug, Error)]
pub enum GlyphError {
    #[error("font has no glyph for {0:?}")]
    MissingGlyph(char),

    #[error("failed to read font {}: {source}", .path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse font: {0}")]
    FontParse(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected 3 comma separated components, got {0}")]
    ComponentCount(usize),

    #[error("invalid color component {0:?} (expected 0-255)")]
    Component(String),

    #[error("invalid hex color {0:?} (expected #rrggbb)")]
    Hex(String),
}

/// Startup failures of the simulation.
#[derive(Debug, Error)]
pub enum RainError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Glyph(#[from] GlyphError),
}
