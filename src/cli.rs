// Copyright (c) 2026 rezky_nightky

use std::fmt::Display;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, ensure, Context};
use clap::Parser;

use glyphfall::charset::{build_chars, charset_from_str, parse_user_ranges, PRESETS};
use glyphfall::palette::{parse_color_scheme, stream_colors, SCHEMES};
use glyphfall::{RainConfig, Rgb, Span};

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphfall --color green --charset canon --fps 60 --pixel-scale 1 --font-size 8 --spacing 5 --flicker-pct 4 --cascade-rate 0.25 --ripple-rate 0.25 --adaptive-fps 45 --quantize 16";

/// Font size used in the terminal when none is given. Each terminal cell
/// shows 1x2 pixels, so the core's default size would be several cells tall.
pub const TERMINAL_FONT_SIZE: f32 = 8.0;
pub const TERMINAL_SPACING: u32 = 5;
pub const HEADLESS_DURATION_S: f64 = 10.0;

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();
        if is_heading {
            out.push_str(&format!("\x1b[1;36m{line}\x1b[0m{nl}"));
        } else if let Some(rest) = line.strip_prefix("      Example:") {
            out.push_str(&format!("      \x1b[32mExample:\x1b[0m{rest}{nl}"));
        } else if let Some(rest) = line.strip_prefix("  glyphfall") {
            out.push_str(&format!("  \x1b[1;34mglyphfall\x1b[0m{rest}{nl}"));
        } else if let Some(rest) = line.strip_prefix("  -") {
            out.push_str(&format!("  \x1b[33m-{rest}\x1b[0m{nl}"));
        } else {
            out.push_str(line);
            out.push_str(nl);
        }
    }
    out
}

fn print_maybe_colored(text: &str) {
    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(text));
    } else {
        print!("{}", text);
    }
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

/// `LOW,HIGH` pair accepted by range options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeArg<T> {
    pub low: T,
    pub high: T,
}

impl<T> FromStr for RangeArg<T>
where
    T: FromStr + PartialOrd + Copy,
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(',')
            .ok_or_else(|| "expected: NUM1,NUM2".to_string())?;
        let low: T = a
            .trim()
            .parse()
            .map_err(|_| "invalid low value".to_string())?;
        let high: T = b
            .trim()
            .parse()
            .map_err(|_| "invalid high value".to_string())?;
        if low > high {
            return Err("range must have low <= high".to_string());
        }
        Ok(Self { low, high })
    }
}

impl<T: Copy> From<RangeArg<T>> for Span<T> {
    fn from(r: RangeArg<T>) -> Self {
        Span::new(r.low, r.high)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphfall", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on any keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed the random generator for a reproducible run"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write logs to this file (filter with GLYPHFALL_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "headless",
        help_heading = "HEADLESS",
        help = "Render without a terminal at a fixed step of 1/fps"
    )]
    pub headless: bool,

    #[arg(
        long = "width",
        default_value_t = 640,
        help_heading = "HEADLESS",
        help = "Canvas width in pixels (min 1 max 16384)"
    )]
    pub width: u32,

    #[arg(
        long = "height",
        default_value_t = 360,
        help_heading = "HEADLESS",
        help = "Canvas height in pixels (min 1 max 16384)"
    )]
    pub height: u32,

    #[arg(
        long = "dump-ppm",
        help_heading = "HEADLESS",
        help = "Write the final frame as a binary PPM image"
    )]
    pub dump_ppm: Option<PathBuf>,

    #[arg(
        short = 'c',
        long = "color",
        default_value = "green",
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "leader-color",
        help_heading = "APPEARANCE",
        help = "Override the head color (#rrggbb or r,g,b)"
    )]
    pub leader_color: Option<Rgb>,

    #[arg(
        long = "trail-color",
        help_heading = "APPEARANCE",
        help = "Override the trail color (#rrggbb or r,g,b)"
    )]
    pub trail_color: Option<Rgb>,

    #[arg(
        long = "background",
        default_value = "0,0,0",
        help_heading = "APPEARANCE",
        help = "Background color (#rrggbb or r,g,b)"
    )]
    pub background: Rgb,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit (TERM=...256color), else 16-color"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "pixel-scale",
        default_value_t = 1,
        help_heading = "APPEARANCE",
        help = "Canvas pixels per terminal cell column (min 1 max 8)"
    )]
    pub pixel_scale: u32,

    #[arg(
        long = "font",
        help_heading = "FONT",
        help = "TrueType/OpenType font file (default: built-in 8x8 bitmap font)"
    )]
    pub font: Option<PathBuf>,

    #[arg(
        long = "font-size",
        help_heading = "FONT",
        help = "Glyph size in pixels (min 1 max 512; default 8 in a terminal, 18 headless)"
    )]
    pub font_size: Option<f32>,

    #[arg(
        long = "stretch",
        default_value_t = 1.25,
        help_heading = "FONT",
        help = "Vertical glyph stretch (min 0.1 max 8)"
    )]
    pub stretch: f32,

    #[arg(
        long = "line-height",
        default_value_t = 1.1,
        help_heading = "FONT",
        help = "Line height as a multiple of the font size (min 0.1 max 16)"
    )]
    pub line_height: f32,

    #[arg(
        short = 'b',
        long = "bold",
        help_heading = "FONT",
        help = "Thicken every glyph by one pixel"
    )]
    pub bold: bool,

    #[arg(
        long = "leader-boldness",
        default_value_t = 2,
        help_heading = "FONT",
        help = "Extra 1px copies drawn around the head glyph (min 0 max 16)"
    )]
    pub leader_boldness: u32,

    #[arg(
        long = "charset",
        default_value = "canon",
        help_heading = "CHARSET",
        help = "Charset preset (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "chars",
        help_heading = "CHARSET",
        help = "Extra hex code point ranges: LOW,HIGH[,LOW,HIGH...] (e.g. 30,39)"
    )]
    pub chars: Option<String>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "spacing",
        help_heading = "STREAMS",
        help = "Pixels between columns (min 1 max 4096; default 5 in a terminal, 11 headless)"
    )]
    pub spacing: Option<u32>,

    #[arg(
        short = 'S',
        long = "speed",
        help_heading = "STREAMS",
        help = "Head speed range in px/s: LOW,HIGH (min 0 max 100000; default scales with font size)"
    )]
    pub speed: Option<RangeArg<f32>>,

    #[arg(
        long = "length",
        default_value = "5,70",
        help_heading = "STREAMS",
        help = "Trail length range in cells: LOW,HIGH (min 1 max 100000)"
    )]
    pub length: RangeArg<u32>,

    #[arg(
        long = "dormancy",
        default_value = "0,1000",
        help_heading = "STREAMS",
        help = "Frames a column waits before its first streak: LOW,HIGH"
    )]
    pub dormancy: RangeArg<u32>,

    #[arg(
        long = "flicker-pct",
        default_value_t = 4.0,
        help_heading = "STREAMS",
        help = "Trail character re-roll chance per frame in percent (min 0 max 100)"
    )]
    pub flicker_pct: f32,

    #[arg(
        long = "fixed-speed",
        help_heading = "STREAMS",
        help = "Keep every streak at its starting speed"
    )]
    pub fixed_speed: bool,

    #[arg(
        long = "cascade-rate",
        default_value_t = 0.25,
        help_heading = "EFFECTS",
        help = "Highlight cascades spawned per second (min 0 max 1000)"
    )]
    pub cascade_rate: f32,

    #[arg(
        long = "ripple-rate",
        default_value_t = 0.25,
        help_heading = "EFFECTS",
        help = "Ripples spawned per second (min 0 max 1000)"
    )]
    pub ripple_rate: f32,

    #[arg(
        long = "no-cascades",
        help_heading = "EFFECTS",
        help = "Disable highlight cascades"
    )]
    pub no_cascades: bool,

    #[arg(long = "no-ripples", help_heading = "EFFECTS", help = "Disable ripples")]
    pub no_ripples: bool,

    #[arg(long = "no-haze", help_heading = "EFFECTS", help = "Disable the haze overlay")]
    pub no_haze: bool,

    #[arg(long = "no-grid", help_heading = "EFFECTS", help = "Disable the CRT grid overlay")]
    pub no_grid: bool,

    #[arg(
        long = "adaptive-fps",
        default_value_t = 45.0,
        help_heading = "PERFORMANCE",
        help = "Shed ripples, then cascades, when mean FPS drops below this (0 disables)"
    )]
    pub adaptive_fps: f32,

    #[arg(
        long = "quantize",
        default_value_t = 16,
        help_heading = "PERFORMANCE",
        help = "Color quantization step for the glyph cache (min 1 max 255)"
    )]
    pub quantize: u8,

    #[arg(
        long = "perf-stats",
        help_heading = "PERFORMANCE",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "help-detail",
        help_heading = "HELP",
        help = "Show detailed help for all parameters and exit"
    )]
    pub help_detail: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color themes and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

fn require_range<T>(name: &str, v: T, min: T, max: T) -> anyhow::Result<T>
where
    T: PartialOrd + Display + Copy,
{
    if v < min || v > max {
        bail!("failed to apply {} {} (min {} max {})", name, v, min, max);
    }
    Ok(v)
}

fn require_finite_range(name: &str, v: f32, min: f32, max: f32) -> anyhow::Result<f32> {
    ensure!(
        v.is_finite(),
        "failed to apply {} {} (must be a finite number)",
        name,
        v
    );
    require_range(name, v, min, max)
}

impl Args {
    pub fn pixel_scale(&self) -> anyhow::Result<u32> {
        require_range("pixel scale", self.pixel_scale, 1, 8)
    }

    pub fn headless_size(&self) -> anyhow::Result<(u32, u32)> {
        Ok((
            require_range("width", self.width, 1, 16_384)?,
            require_range("height", self.height, 1, 16_384)?,
        ))
    }

    /// `None` runs until stopped. Headless runs fall back to
    /// [`HEADLESS_DURATION_S`].
    pub fn duration_secs(&self) -> anyhow::Result<Option<f64>> {
        match self.duration {
            Some(s) if !s.is_finite() => {
                bail!("failed to apply duration {} (must be a finite number)", s)
            }
            Some(s) if s > 0.0 => Ok(Some(require_range("duration", s, 0.1, 86_400.0)?)),
            _ if self.headless => Ok(Some(HEADLESS_DURATION_S)),
            _ => Ok(None),
        }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size.unwrap_or(if self.headless {
            RainConfig::default().font.size
        } else {
            TERMINAL_FONT_SIZE
        })
    }

    /// Checks every option and assembles the simulation settings for a
    /// canvas of `width`x`height` pixels.
    pub fn build_config(&self, width: u32, height: u32) -> anyhow::Result<RainConfig> {
        let defaults = RainConfig::default();
        let mut cfg = RainConfig {
            width,
            height,
            seed: self.seed,
            background: self.background,
            ..defaults.clone()
        };

        cfg.target_fps = require_finite_range("fps", self.fps as f32, 1.0, 240.0)?;
        cfg.adaptive_threshold_fps =
            require_finite_range("adaptive fps", self.adaptive_fps, 0.0, 1000.0)?;
        cfg.quantization_step = require_range("quantize", self.quantize, 1, 255)?;

        cfg.effects.cascades = !self.no_cascades;
        cfg.effects.ripples = !self.no_ripples;
        cfg.effects.haze = !self.no_haze;
        cfg.effects.grid = !self.no_grid;

        let size = require_finite_range("font size", self.font_size(), 1.0, 512.0)?;
        cfg.font.size = size;
        cfg.font.stretch = require_finite_range("stretch", self.stretch, 0.1, 8.0)?;
        cfg.font.line_height_multiplier =
            require_finite_range("line height", self.line_height, 0.1, 16.0)?;
        cfg.font.bold = self.bold;
        cfg.font.leader_extra_boldness =
            require_range("leader boldness", self.leader_boldness, 0, 16)?;

        let col = &mut cfg.column;
        col.spacing = match self.spacing {
            Some(s) => require_range("spacing", s, 1, 4096)?,
            None if self.headless => defaults.column.spacing,
            None => TERMINAL_SPACING,
        };
        col.speed_range = match self.speed {
            Some(r) => {
                require_finite_range("speed", r.low, 0.0, 100_000.0)?;
                require_finite_range("speed", r.high, 0.0, 100_000.0)?;
                r.into()
            }
            None => {
                let k = size / defaults.font.size;
                Span::new(
                    defaults.column.speed_range.low * k,
                    defaults.column.speed_range.high * k,
                )
            }
        };
        ensure!(self.length.low >= 1, "failed to apply length (min 1)");
        col.length_range = self.length.into();
        col.dormancy_range = self.dormancy.into();
        col.flicker_chance =
            require_finite_range("flicker pct", self.flicker_pct, 0.0, 100.0)? / 100.0;
        col.variable_speed = !self.fixed_speed;

        let scheme = parse_color_scheme(&self.color).map_err(anyhow::Error::msg)?;
        let colors = stream_colors(scheme);
        col.leader_color = self.leader_color.unwrap_or(colors.leader);
        col.second_color = colors.second;
        col.trail_color = self.trail_color.unwrap_or(colors.trail);
        cfg.haze.color = colors.haze;

        let charset = charset_from_str(&self.charset).map_err(anyhow::Error::msg)?;
        let ranges = match self.chars.as_deref() {
            Some(s) => parse_user_ranges(s)
                .map_err(anyhow::Error::msg)
                .context("failed to apply --chars")?,
            None => Vec::new(),
        };
        cfg.column.alphabet = build_chars(charset, &ranges);

        cfg.cascade.rate_per_second =
            require_finite_range("cascade rate", self.cascade_rate, 0.0, 1000.0)?;
        cfg.ripple.rate_per_second =
            require_finite_range("ripple rate", self.ripple_rate, 0.0, 1000.0)?;

        cfg.validate()?;
        Ok(cfg)
    }
}

fn print_value_table(title: &str, note: &str, rows: &[(&str, &str)]) {
    if color_enabled_stdout() {
        println!("\x1b[1;36m{}\x1b[0m", title);
        println!("\x1b[2m{}\x1b[0m", note);
    } else {
        println!("{}", title);
        println!("{}", note);
    }
    println!();
    println!("VALUE        DESCRIPTION");
    for (value, desc) in rows {
        println!("{:<12} {}", value, desc);
    }
}

pub fn print_list_charsets() {
    print_value_table(
        "AVAILABLE CHARSET PRESETS:",
        "NOTE: Use only the VALUE (left side) with --charset.",
        PRESETS,
    );
}

pub fn print_list_colors() {
    print_value_table(
        "AVAILABLE COLOR THEMES:",
        "NOTE: Use only the VALUE (left side) with --color.",
        SCHEMES,
    );
}

pub fn print_help_detail() {
    let block = format!(
        "{}\n\nUSAGE:\n  glyphfall [OPTIONS]\n\nGENERAL:\n  -s, --screensaver\n      Screensaver mode (exit on any keypress).\n      Example: glyphfall -s\n\n  --duration <seconds>\n      Stop after N seconds (min 0.1 max 86400). Headless runs default to 10.\n      Example: glyphfall --duration 10\n\n  --seed <number>\n      Reproducible run.\n      Example: glyphfall --seed 42\n\n  --log-file <path>\n      Write logs to a file; GLYPHFALL_LOG sets the filter (default info).\n      Example: GLYPHFALL_LOG=debug glyphfall --log-file rain.log\n\nHEADLESS:\n  --headless --width <px> --height <px>\n      Simulate without a terminal and print statistics.\n      Example: glyphfall --headless --width 1280 --height 720 --duration 5\n\n  --dump-ppm <path>\n      Save the last frame as a PPM image.\n      Example: glyphfall --headless --dump-ppm frame.ppm\n\nAPPEARANCE:\n  -c, --color <name>\n      Set theme (see --list-colors).\n      Example: glyphfall --color fire\n\n  --leader-color, --trail-color, --background <color>\n      Override colors with #rrggbb or r,g,b.\n      Example: glyphfall --leader-color 255,240,200\n\n  --colormode <0|16|8|24>\n      Force color mode; otherwise auto-detected from COLORTERM/TERM.\n      Example: glyphfall --colormode 8\n\n  --pixel-scale <number>\n      Canvas pixels per terminal column (min 1 max 8).\n      Example: glyphfall --pixel-scale 2 --font-size 16\n\nFONT:\n  --font <path>\n      Rasterize glyphs from a TrueType/OpenType file.\n      Example: glyphfall --font /usr/share/fonts/TTF/DejaVuSansMono.ttf\n\n  --font-size, --stretch, --line-height, -b/--bold, --leader-boldness\n      Glyph geometry.\n      Example: glyphfall --font-size 10 --stretch 1.5\n\nCHARSET:\n  --charset <name>\n      Charset preset (see --list-charsets).\n      Example: glyphfall --charset binary\n\n  --chars <hex ranges>\n      Extra code point ranges, in pairs.\n      Example: glyphfall --chars 3b1,3c9\n\nSTREAMS:\n  --spacing <px>, -S/--speed <low,high>, --length <low,high>, --dormancy <low,high>\n      Column layout and streak sampling.\n      Example: glyphfall --speed 20,200 --length 10,40\n\n  --flicker-pct <number>, --fixed-speed\n      Character instability and speed perturbation.\n      Example: glyphfall --flicker-pct 8 --fixed-speed\n\nEFFECTS:\n  --cascade-rate, --ripple-rate <per second>\n      Spawn rates of the spatial effects.\n      Example: glyphfall --cascade-rate 1 --ripple-rate 0.5\n\n  --no-cascades, --no-ripples, --no-haze, --no-grid\n      Turn effects off.\n      Example: glyphfall --no-grid\n\nPERFORMANCE:\n  -f, --fps <number>\n      Target FPS (min 1 max 240).\n      Example: glyphfall --fps 30\n\n  --adaptive-fps <number>\n      Mean FPS below which ripples, then cascades, are shed (0 disables).\n      Example: glyphfall --adaptive-fps 0\n\n  --quantize <step>\n      Color quantization step of the glyph cache.\n      Example: glyphfall --quantize 8\n\n  --perf-stats\n      Print performance statistics summary on exit.\n      Example: glyphfall --duration 10 --perf-stats\n\nHELP:\n  --check-bitcolor, --help, --help-detail, --list-charsets, --list-colors, -v/--version, -i/--info\n",
        DEFAULT_PARAMS_USAGE
    );
    print_maybe_colored(&block);
    println!();
    print_list_charsets();
    println!();
    print_list_colors();
}
