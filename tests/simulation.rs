// Copyright (c) 2026 rezky_nightky

use glyphfall::{BitmapFont, Canvas, RainConfig, Simulation, Span};
use pretty_assertions::assert_eq;

const DT: f32 = 1.0 / 60.0;

fn busy_config(seed: u64) -> RainConfig {
    let mut cfg = RainConfig {
        width: 200,
        height: 120,
        seed: Some(seed),
        ..RainConfig::default()
    };
    cfg.column.dormancy_range = Span::new(0, 0);
    cfg.column.speed_range = Span::new(200.0, 300.0);
    cfg
}

fn start(cfg: &RainConfig) -> Simulation {
    let font = BitmapFont::new(cfg.font.size, cfg.font.stretch);
    Simulation::initialize(cfg.clone(), &font).expect("valid config")
}

fn run(sim: &mut Simulation, canvas: &mut Canvas, frames: usize) -> usize {
    (0..frames).map(|_| sim.step(DT, canvas)).sum()
}

#[test]
fn same_seed_renders_the_same_frames() {
    let cfg = busy_config(42);
    let (mut a, mut b) = (start(&cfg), start(&cfg));
    let (mut ca, mut cb) = (a.new_canvas(), b.new_canvas());
    for _ in 0..90 {
        a.step(DT, &mut ca);
        b.step(DT, &mut cb);
    }
    assert!(ca.pixels == cb.pixels);
    assert_eq!(a.shutdown(), b.shutdown());
}

#[test]
fn streams_light_up_the_canvas() {
    let mut cfg = busy_config(1);
    cfg.effects.haze = false;
    cfg.effects.grid = false;
    let mut sim = start(&cfg);
    let mut canvas = sim.new_canvas();

    let drawn = run(&mut sim, &mut canvas, 60);
    assert!(drawn > 0);
    let brightest = canvas
        .pixels
        .iter()
        .map(|p| p.luminance_sum())
        .max()
        .unwrap_or(0);
    assert!(brightest > 500, "brightest pixel sum {brightest}");

    let stats = sim.shutdown();
    assert_eq!(stats.frames, 60);
    assert_eq!(stats.cells_drawn, drawn as u64);
    assert!(stats.tint_cache_entries > 0);
}

#[test]
fn busy_effects_spawn_and_respect_column_invariants() {
    let mut cfg = busy_config(9);
    cfg.cascade.rate_per_second = 200.0;
    cfg.ripple.rate_per_second = 200.0;
    let mut sim = start(&cfg);
    let mut canvas = sim.new_canvas();

    for _ in 0..240 {
        sim.step(DT, &mut canvas);
        for column in sim.columns() {
            if let Some(pos) = column.cascade_pos() {
                assert!(pos >= 0.0 && pos < column.trail_length() as f32);
            }
            if column.dormant() == 0 {
                assert!(column.trail_length() > 0);
            }
        }
        for cascade in sim.cascades().active() {
            assert!(cascade.radius < cfg.cascade.max_radius);
        }
    }

    let stats = sim.shutdown();
    assert!(stats.peak_cascades > 0);
    assert!(stats.peak_ripples > 0);
    assert_eq!(stats.degrade_events, 0);
}

#[test]
fn disabled_effects_never_spawn() {
    let mut cfg = busy_config(3);
    cfg.effects.cascades = false;
    cfg.effects.ripples = false;
    cfg.cascade.rate_per_second = 500.0;
    cfg.ripple.rate_per_second = 500.0;
    let mut sim = start(&cfg);
    let mut canvas = sim.new_canvas();
    run(&mut sim, &mut canvas, 30);

    let stats = sim.shutdown();
    assert_eq!(stats.peak_cascades, 0);
    assert_eq!(stats.peak_ripples, 0);
}

#[test]
fn final_frame_dumps_as_ppm() {
    let cfg = busy_config(5);
    let mut sim = start(&cfg);
    let mut canvas = sim.new_canvas();
    run(&mut sim, &mut canvas, 10);

    let mut out = Vec::new();
    canvas.write_ppm(&mut out).unwrap();
    let header = b"P6\n200 120\n255\n";
    assert!(out.starts_with(header));
    assert_eq!(out.len(), header.len() + 200 * 120 * 3);
}

#[test]
fn sub_pixel_font_initializes_and_draws_nothing() {
    let mut cfg = busy_config(8);
    cfg.font.size = 1e-30;
    let mut sim = start(&cfg);
    assert!(sim.columns().iter().all(|c| c.num_chars() == 0));

    let mut canvas = sim.new_canvas();
    assert_eq!(run(&mut sim, &mut canvas, 5), 0);
    assert_eq!(sim.shutdown().cells_drawn, 0);
}
