// Copyright (c) 2026 rezky_nightky

use rand::rngs::StdRng;
use rand::Rng;

use crate::color::Rgb;
use crate::config::{RainConfig, RippleTuning};

/// One expanding, angularly distorted tint ring.
#[derive(Clone, Debug, PartialEq)]
pub struct Ripple {
    pub origin_x: f32,
    pub origin_y: f32,
    pub radius: f32,
    pub age: f32,
    pub phase: f32,
    pub target_color: Rgb,
}

impl Ripple {
    pub fn new(origin_x: f32, origin_y: f32, target_color: Rgb) -> Self {
        Self {
            origin_x,
            origin_y,
            radius: 0.0,
            age: 0.0,
            phase: 0.0,
            target_color,
        }
    }

    /// Lifetime envelope: cubic ease-in while fading in, cubic ease-out
    /// afterwards. 0 at birth and at the end of the lifetime.
    pub fn lifecycle_fade(&self, tuning: &RippleTuning) -> f32 {
        let fade_in = tuning.fade_in_s();
        if self.age < fade_in {
            let p = (self.age / fade_in).clamp(0.0, 1.0);
            p * p * p
        } else {
            let progress = if tuning.fade_out_s > 0.0 {
                (self.age - fade_in) / tuning.fade_out_s
            } else {
                1.0
            };
            let p = 1.0 - progress.clamp(0.0, 1.0);
            p * p * p
        }
    }

    /// Blend weight toward `target_color` for the cell at (`x`, `y`), or
    /// `None` when the cell lies outside the distorted ring.
    pub fn influence(&self, x: f32, y: f32, tuning: &RippleTuning) -> Option<f32> {
        let amp = tuning.distortion_amplitude;
        let reach = self.radius + amp;
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        if dx.abs() > reach || dy.abs() > reach {
            return None;
        }

        let angle = dy.atan2(dx);
        let distorted =
            self.radius + (angle * tuning.distortion_frequency + self.phase).sin() * amp;
        let dist_sq = dx * dx + dy * dy;
        if distorted <= 0.0 || dist_sq >= distorted * distorted {
            return None;
        }

        let proximity = 1.0 - dist_sq.sqrt() / distorted;
        Some((proximity * self.lifecycle_fade(tuning)).clamp(0.0, 1.0))
    }
}

/// Spawns ripples at random canvas points and ages them out.
#[derive(Debug, Default)]
pub struct RippleManager {
    ripples: Vec<Ripple>,
    peak: usize,
}

impl RippleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[Ripple] {
        &self.ripples
    }

    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn spawn_at(&mut self, x: f32, y: f32, config: &RainConfig) {
        let target = config
            .column
            .leader_color
            .boosted(config.ripple.brightness_boost);
        self.ripples.push(Ripple::new(x, y, target));
        self.peak = self.peak.max(self.ripples.len());
    }

    pub fn update(&mut self, dt: f32, config: &RainConfig, rng: &mut StdRng) {
        let tuning = &config.ripple;
        if rng.random::<f32>() < tuning.rate_per_second * dt {
            let x = rng.random_range(0..=config.width) as f32;
            let y = rng.random_range(0..=config.height) as f32;
            self.spawn_at(x, y, config);
        }

        let lifetime = tuning.lifetime_s();
        self.ripples.retain_mut(|r| {
            r.age += dt;
            r.radius += tuning.radius_speed * dt;
            r.phase = r.age * tuning.distortion_speed;
            !(r.age > lifetime || r.radius > tuning.max_radius)
        });
    }

    pub fn clear(&mut self) {
        self.ripples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn ripple_at_age(age: f32) -> Ripple {
        Ripple {
            age,
            ..Ripple::new(0.0, 0.0, Rgb::WHITE)
        }
    }

    #[test]
    fn fade_is_zero_at_both_ends() {
        let t = RippleTuning::default();
        assert_eq!(ripple_at_age(0.0).lifecycle_fade(&t), 0.0);
        assert_eq!(ripple_at_age(t.lifetime_s()).lifecycle_fade(&t), 0.0);
        assert_eq!(ripple_at_age(t.fade_in_s()).lifecycle_fade(&t), 1.0);
    }

    #[test]
    fn fade_out_branch_at_six_seconds() {
        let t = RippleTuning::default();
        let fade = ripple_at_age(6.0).lifecycle_fade(&t);
        let p: f32 = 1.0 - 0.8;
        assert!((fade - p * p * p).abs() < 1e-5, "{fade}");
    }

    #[test]
    fn influence_positive_inside_ring_mid_life() {
        let t = RippleTuning {
            distortion_amplitude: 0.0,
            ..RippleTuning::default()
        };
        let r = Ripple {
            radius: 100.0,
            ..ripple_at_age(3.0)
        };
        let w = r.influence(10.0, 0.0, &t).unwrap();
        assert!(w > 0.0 && w <= 1.0);
        assert_eq!(r.influence(150.0, 0.0, &t), None);
        assert_eq!(r.influence(0.0, 500.0, &t), None);
    }

    #[test]
    fn non_positive_distorted_radius_has_no_effect() {
        let t = RippleTuning {
            distortion_amplitude: 80.0,
            distortion_frequency: 0.0,
            ..RippleTuning::default()
        };
        // sin(phase) = -1, so the ring collapses to 10 - 80 < 0
        let r = Ripple {
            radius: 10.0,
            phase: -std::f32::consts::FRAC_PI_2,
            ..ripple_at_age(3.0)
        };
        assert_eq!(r.influence(1.0, 1.0, &t), None);
    }

    #[test]
    fn ripples_expire_by_age_and_radius() {
        let mut cfg = RainConfig::default();
        cfg.ripple.rate_per_second = 0.0;
        let mut rng = StdRng::seed_from_u64(7);
        let mut mgr = RippleManager::new();
        mgr.spawn_at(10.0, 10.0, &cfg);

        mgr.update(6.0, &cfg, &mut rng);
        assert_eq!(mgr.active().len(), 0, "radius 720 exceeds 700");

        cfg.ripple.max_radius = 10_000.0;
        mgr.spawn_at(10.0, 10.0, &cfg);
        mgr.update(6.0, &cfg, &mut rng);
        assert_eq!(mgr.active().len(), 1);
        assert_eq!(mgr.active()[0].phase, 6.0);
        mgr.update(1.0, &cfg, &mut rng);
        assert_eq!(mgr.active().len(), 1, "age 7.0 is not past the lifetime");
        mgr.update(0.5, &cfg, &mut rng);
        assert!(mgr.active().is_empty());
        assert_eq!(mgr.peak(), 1);
    }

    #[test]
    fn certain_spawn_lands_on_canvas() {
        let mut cfg = RainConfig::default();
        cfg.width = 50;
        cfg.height = 40;
        cfg.ripple.rate_per_second = 1000.0;
        let mut rng = StdRng::seed_from_u64(1);
        let mut mgr = RippleManager::new();
        for _ in 0..20 {
            mgr.update(0.01, &cfg, &mut rng);
        }
        assert_eq!(mgr.active().len(), 20);
        for r in mgr.active() {
            assert!((0.0..=50.0).contains(&r.origin_x));
            assert!((0.0..=40.0).contains(&r.origin_y));
            assert_eq!(r.target_color, Rgb::WHITE);
        }
    }
}
