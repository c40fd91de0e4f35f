// Copyright (c) 2026 rezky_nightky

mod cli;
mod frame;
mod present;
mod terminal;

use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use glyphfall::{BitmapFont, FrameStats, GlyphSource, RainConfig, Simulation, TrueTypeFont};

use crate::cli::{
    color_enabled_stdout, default_params_usage_for_help, print_help_detail, print_list_charsets,
    print_list_colors, Args,
};
use crate::frame::Frame;
use crate::present::{canvas_size, color_mode_from_arg, detect_color_mode_auto, present, ColorMode};
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn parse_args() -> Args {
    let mut cmd = Args::command()
        .styles(clap_styles())
        .before_help(default_params_usage_for_help())
        .help_template(if color_enabled_stdout() {
            HELP_TEMPLATE_COLOR
        } else {
            HELP_TEMPLATE_PLAIN
        });
    cmd.build();
    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

/// Logs go to `--log-file` when given, to stderr in headless mode, and
/// nowhere otherwise since the alternate screen owns the terminal.
fn init_logging(args: &Args) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_env("GLYPHFALL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None if args.headless => builder.with_writer(std::io::stderr).init(),
        None => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}

/// Flag raised by SIGINT/SIGTERM/SIGHUP (or Ctrl-C on Windows) and checked
/// between frames.
fn install_stop_flag() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));

    #[cfg(unix)]
    {
        use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
        for sig in [SIGINT, SIGTERM, SIGHUP] {
            if let Err(e) = signal_hook::flag::register(sig, Arc::clone(&stop)) {
                warn!(signal = sig, error = %e, "failed to install signal handler");
            }
        }
    }

    #[cfg(windows)]
    {
        let flag = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
            warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }

    stop
}

fn load_glyphs(args: &Args, config: &RainConfig) -> anyhow::Result<Box<dyn GlyphSource>> {
    let (size, stretch) = (config.font.size, config.font.stretch);
    Ok(match &args.font {
        Some(path) => Box::new(
            TrueTypeFont::load(path, size, stretch)
                .with_context(|| format!("failed to load font {}", path.display()))?,
        ),
        None => Box::new(BitmapFont::new(size, stretch)),
    })
}

#[derive(Default)]
struct PerfStats {
    frames: u64,
    drawn_frames: u64,
    work_sum_s: f64,
    work_max_s: f32,
    overshoot_frames: u64,
}

impl PerfStats {
    fn record(&mut self, work_s: f32, drew: bool, period_s: f32) {
        self.frames = self.frames.saturating_add(1);
        if drew {
            self.drawn_frames = self.drawn_frames.saturating_add(1);
        }
        self.work_sum_s += work_s as f64;
        self.work_max_s = self.work_max_s.max(work_s);
        if work_s > period_s {
            self.overshoot_frames = self.overshoot_frames.saturating_add(1);
        }
    }

    fn print(&self, elapsed_s: f64, target_fps: f64, sim: &FrameStats) {
        let elapsed_s = elapsed_s.max(0.000_001);
        let frames = self.frames.max(1) as f64;
        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", target_fps);
        println!("  avg_fps: {:.3}", self.frames as f64 / elapsed_s);
        println!("  frames: {}", self.frames);
        println!(
            "  drawn_frames: {} ({:.1}%)",
            self.drawn_frames,
            self.drawn_frames as f64 / frames * 100.0
        );
        println!("  avg_work_ms: {:.3}", self.work_sum_s / frames * 1000.0);
        println!("  max_work_ms: {:.3}", self.work_max_s as f64 * 1000.0);
        println!(
            "  overshoot_frames: {} ({:.1}%)",
            self.overshoot_frames,
            self.overshoot_frames as f64 / frames * 100.0
        );
        println!("  cells_drawn: {}", sim.cells_drawn);
        println!("  peak_cascades: {}", sim.peak_cascades);
        println!("  peak_ripples: {}", sim.peak_ripples);
        println!("  tint_cache_entries: {}", sim.tint_cache_entries);
        println!("  degrade_events: {}", sim.degrade_events);
    }
}

fn run_headless(args: &Args, stop: &AtomicBool) -> anyhow::Result<()> {
    let (width, height) = args.headless_size()?;
    let config = args.build_config(width, height)?;
    let glyphs = load_glyphs(args, &config)?;
    let mut sim = Simulation::initialize(config, glyphs.as_ref())
        .context("failed to initialize the simulation")?;
    let mut canvas = sim.new_canvas();

    let duration_s = args.duration_secs()?.unwrap_or(cli::HEADLESS_DURATION_S);
    let dt = 1.0 / args.fps;
    let total_frames = (duration_s * args.fps).ceil() as u64;
    info!(width, height, total_frames, "headless run");

    let start = Instant::now();
    let mut perf = PerfStats::default();
    for _ in 0..total_frames {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let work_start = Instant::now();
        sim.step(dt as f32, &mut canvas);
        perf.record(work_start.elapsed().as_secs_f32(), true, dt as f32);
    }

    if let Some(path) = &args.dump_ppm {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        canvas
            .write_ppm(BufWriter::new(file))
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote final frame");
    }

    let stats = sim.shutdown();
    perf.print(start.elapsed().as_secs_f64(), args.fps, &stats);
    Ok(())
}

fn terminal_config(args: &Args, cols: u16, rows: u16) -> anyhow::Result<RainConfig> {
    let (width, height) = canvas_size(cols, rows, args.pixel_scale()?);
    args.build_config(width, height)
}

fn run_terminal(args: &Args, mode: ColorMode, stop: &AtomicBool) -> anyhow::Result<()> {
    let scale = args.pixel_scale()?;
    let duration_s = args.duration_secs()?;
    // validated once up front so a bad option fails before raw mode
    let startup = args.build_config(1, 1)?;
    let glyphs = load_glyphs(args, &startup)?;

    let mut term = Terminal::new().context("failed to set up the terminal")?;
    let (cols, rows) = term.size()?;
    let mut sim = Simulation::initialize(terminal_config(args, cols, rows)?, glyphs.as_ref())
        .context("failed to initialize the simulation")?;
    let mut canvas = sim.new_canvas();
    let mut frame = Frame::new(cols, rows);

    let start_time = Instant::now();
    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));
    let target_period = Duration::from_secs_f64(1.0 / args.fps);
    let period_s = target_period.as_secs_f32().max(0.000_001);
    let mut next_frame = Instant::now();
    let mut last_step = Instant::now();
    let mut perf = PerfStats::default();
    let mut totals = FrameStats::default();
    let mut raining = true;

    while raining {
        if stop.load(Ordering::Relaxed) || end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        let quit = args.screensaver
                            || matches!(k.code, KeyCode::Esc | KeyCode::Char('q'))
                            || (k.code == KeyCode::Char('c')
                                && k.modifiers.contains(KeyModifiers::CONTROL));
                        if quit {
                            raining = false;
                        }
                    }
                    _ => {}
                }
            }

            if !raining || pending_resize.is_some() || stop.load(Ordering::Relaxed) {
                break;
            }
            let now = Instant::now();
            if now >= next_frame {
                break;
            }
            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !raining {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            let next = sim
                .reinitialize(terminal_config(args, nw, nh)?, glyphs.as_ref())
                .context("failed to reinitialize the simulation")?;
            let old = std::mem::replace(&mut sim, next).shutdown();
            totals = merge_stats(totals, old);
            canvas = sim.new_canvas();
            frame = Frame::new(nw, nh);
            info!(cols = nw, rows = nh, "terminal resized");
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last_step).as_secs_f32();
        last_step = now;

        let work_start = Instant::now();
        sim.step(elapsed, &mut canvas);
        present(&canvas, &mut frame, mode, scale);
        let drew = frame.has_changes();
        if drew {
            term.draw(&mut frame)?;
        }
        perf.record(work_start.elapsed().as_secs_f32(), drew, period_s);

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    let stats = merge_stats(totals, sim.shutdown());
    drop(term);
    if args.perf_stats {
        perf.print(start_time.elapsed().as_secs_f64(), args.fps, &stats);
    }
    Ok(())
}

/// Combines the counters of simulations replaced on resize.
fn merge_stats(a: FrameStats, b: FrameStats) -> FrameStats {
    FrameStats {
        frames: a.frames + b.frames,
        cells_drawn: a.cells_drawn + b.cells_drawn,
        peak_cascades: a.peak_cascades.max(b.peak_cascades),
        peak_ripples: a.peak_ripples.max(b.peak_ripples),
        tint_cache_entries: a.tint_cache_entries.max(b.tint_cache_entries),
        degrade_events: a.degrade_events + b.degrade_events,
    }
}

fn print_bitcolor_check(args: &Args) -> anyhow::Result<()> {
    let colorterm = env::var("COLORTERM").unwrap_or_default();
    let term = env::var("TERM").unwrap_or_default();
    let or_unset = |v: &str| if v.is_empty() { "(unset)".to_string() } else { v.to_string() };

    println!("BITCOLOR CHECK:");
    println!("  COLORTERM: {}", or_unset(&colorterm));
    println!("  TERM: {}", or_unset(&term));
    println!("  auto_detected: {}", detect_color_mode_auto().label());
    let effective = color_mode_from_arg(args.colormode)?;
    if args.colormode.is_some() {
        println!("  forced: {}", effective.label());
    }
    println!("  effective: {}", effective.label());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    let args = parse_args();

    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }
    if args.list_colors {
        print_list_colors();
        return Ok(());
    }
    if args.help_detail {
        print_help_detail();
        return Ok(());
    }
    if args.check_bitcolor {
        return print_bitcolor_check(&args);
    }
    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", env!("GLYPHFALL_BUILD"));
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    init_logging(&args)?;
    let stop = install_stop_flag();

    if args.headless {
        run_headless(&args, &stop)
    } else {
        let mode = color_mode_from_arg(args.colormode)?;
        run_terminal(&args, mode, &stop)
    }
}
