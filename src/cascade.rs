// Copyright (c) 2026 rezky_nightky

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::column::Column;
use crate::config::RainConfig;

/// Squared distance from (`px`, `py`) to the vertical segment at `seg_x`
/// spanning `y1..=y2` (in either order).
pub fn distance_sq_to_vertical_segment(px: f32, py: f32, seg_x: f32, y1: f32, y2: f32) -> f32 {
    let (lo, hi) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
    let qy = py.clamp(lo, hi);
    let dx = px - seg_x;
    let dy = py - qy;
    dx * dx + dy * dy
}

/// An expanding circle that lights up every trail it touches, once.
#[derive(Clone, Debug)]
pub struct HighlightCascade {
    pub origin_x: f32,
    pub origin_y: f32,
    pub dark: bool,
    pub radius: f32,
    triggered: HashSet<usize>,
}

impl HighlightCascade {
    pub fn new(origin_x: f32, origin_y: f32, dark: bool) -> Self {
        Self {
            origin_x,
            origin_y,
            dark,
            radius: 0.0,
            triggered: HashSet::new(),
        }
    }

    /// Indices of the columns this cascade has already reached.
    pub fn triggered(&self) -> &HashSet<usize> {
        &self.triggered
    }

    /// Grows by `dt` and offers an overlay to every newly reached column.
    /// Returns how many columns accepted.
    fn sweep(&mut self, dt: f32, columns: &mut [Column], config: &RainConfig) -> usize {
        self.radius += config.cascade.radius_speed * dt;
        let r_sq = self.radius * self.radius;

        let mut accepted = 0;
        for (idx, column) in columns.iter_mut().enumerate() {
            if (self.origin_x - column.x() as f32).abs() > self.radius {
                continue;
            }
            if self.triggered.contains(&idx) || column.dormant() > 0 || column.trail_length() <= 1 {
                continue;
            }
            let leader = column.leader_pos() as i64;
            if leader < 0 || leader >= column.num_chars() as i64 {
                continue;
            }

            let lh = column.line_height();
            let top = (leader - column.trail_length() as i64 + 1) as f32 * lh;
            let bottom = leader as f32 * lh;
            let d_sq = distance_sq_to_vertical_segment(
                self.origin_x,
                self.origin_y,
                column.x() as f32,
                top,
                bottom,
            );
            if d_sq <= r_sq {
                if column.begin_cascade(self.origin_y, self.dark, config) {
                    accepted += 1;
                }
                // a refusal still counts as reached
                self.triggered.insert(idx);
            }
        }
        accepted
    }
}

#[derive(Debug, Default)]
pub struct HighlightCascadeManager {
    cascades: Vec<HighlightCascade>,
    peak: usize,
}

impl HighlightCascadeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[HighlightCascade] {
        &self.cascades
    }

    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn push(&mut self, cascade: HighlightCascade) {
        self.cascades.push(cascade);
        self.peak = self.peak.max(self.cascades.len());
    }

    /// Starts a cascade at the head of a random on-screen, awake column.
    /// Returns false when no column qualifies.
    pub fn spawn(&mut self, columns: &[Column], config: &RainConfig, rng: &mut StdRng) -> bool {
        let eligible: Vec<&Column> = columns
            .iter()
            .filter(|c| {
                c.dormant() == 0 && c.leader_pos() > 0.0 && c.leader_pos() < c.num_chars() as f32
            })
            .collect();
        let Some(start) = eligible.choose(rng) else {
            return false;
        };
        let origin_x = start.x() as f32;
        let origin_y = start.leader_pos() * start.line_height();
        let dark = rng.random::<f32>() < config.cascade.dark_chance;
        self.push(HighlightCascade::new(origin_x, origin_y, dark));
        true
    }

    /// Per-frame step: maybe spawn, grow every cascade, trigger columns, and
    /// drop cascades that reached their maximum radius.
    pub fn update(
        &mut self,
        dt: f32,
        columns: &mut [Column],
        config: &RainConfig,
        rng: &mut StdRng,
    ) -> usize {
        if rng.random::<f32>() < config.cascade.rate_per_second * dt {
            self.spawn(columns, config, rng);
        }

        let mut accepted = 0;
        for cascade in &mut self.cascades {
            accepted += cascade.sweep(dt, columns, config);
        }
        let max = config.cascade.max_radius;
        self.cascades.retain(|c| c.radius < max);
        accepted
    }

    pub fn clear(&mut self) {
        self.cascades.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Span;
    use rand::SeedableRng;

    fn scenario_config() -> RainConfig {
        let mut cfg = RainConfig {
            width: 800,
            height: 600,
            ..RainConfig::default()
        };
        cfg.font.size = 20.0;
        cfg.font.line_height_multiplier = 1.0;
        cfg.column.dormancy_range = Span::new(0, 0);
        cfg.column.length_range = Span::new(40, 40);
        cfg.cascade.rate_per_second = 0.0;
        cfg
    }

    fn on_screen_column(x: u32, cfg: &RainConfig, rng: &mut StdRng) -> Column {
        let mut column = Column::new(x, cfg, 12, rng);
        column.place_head(20.0, 40, cfg);
        column
    }

    #[test]
    fn segment_distance_uses_closest_point() {
        assert_eq!(distance_sq_to_vertical_segment(3.0, 5.0, 0.0, 0.0, 10.0), 9.0);
        assert_eq!(distance_sq_to_vertical_segment(0.0, 14.0, 0.0, 10.0, 0.0), 16.0);
        assert_eq!(distance_sq_to_vertical_segment(3.0, -4.0, 0.0, 0.0, 10.0), 25.0);
    }

    #[test]
    fn radius_reaches_max_after_one_second_and_is_removed() {
        let cfg = scenario_config();
        let mut rng = StdRng::seed_from_u64(2);
        let mut mgr = HighlightCascadeManager::new();
        mgr.push(HighlightCascade::new(0.0, 100.0, false));
        let mut columns: Vec<Column> = Vec::new();

        mgr.cascades[0].sweep(1.0, &mut columns, &cfg);
        assert_eq!(mgr.active()[0].radius, 500.0);

        mgr.cascades[0].radius = 0.0;
        mgr.update(1.0, &mut columns, &cfg, &mut rng);
        assert!(mgr.active().is_empty());
        assert_eq!(mgr.peak(), 1);
    }

    #[test]
    fn spawn_picks_only_visible_awake_heads() {
        let cfg = scenario_config();
        let mut rng = StdRng::seed_from_u64(4);
        let mut mgr = HighlightCascadeManager::new();

        // every head starts above the canvas
        let hidden: Vec<Column> = (0..4).map(|i| Column::new(i * 11, &cfg, 12, &mut rng)).collect();
        assert!(hidden.iter().all(|c| c.leader_pos() < 0.0));
        assert!(!mgr.spawn(&hidden, &cfg, &mut rng));

        let visible = vec![on_screen_column(33, &cfg, &mut rng)];
        assert!(mgr.spawn(&visible, &cfg, &mut rng));
        let c = &mgr.active()[0];
        assert_eq!(c.origin_x, 33.0);
        assert_eq!(c.origin_y, visible[0].leader_pos() * 20.0);
    }

    #[test]
    fn a_cascade_triggers_each_column_once() {
        let cfg = scenario_config();
        let mut rng = StdRng::seed_from_u64(6);
        let mut columns: Vec<Column> = (0..5)
            .map(|i| on_screen_column(i * 11, &cfg, &mut rng))
            .collect();

        let mut cascade = HighlightCascade::new(0.0, 400.0, false);
        let mut total = 0;
        for _ in 0..20 {
            total += cascade.sweep(0.05, &mut columns, &cfg);
        }
        assert!(cascade.triggered().len() <= columns.len());
        assert!(total <= cascade.triggered().len());
        assert!(cascade.triggered().contains(&0));
        assert!(columns[0].cascade_pos().is_some());

        // reached columns are skipped even once their overlay is gone
        let reached = cascade.triggered().clone();
        for &idx in &reached {
            columns[idx].place_head(20.0, 40, &cfg);
        }
        assert_eq!(cascade.sweep(0.0, &mut columns, &cfg), 0);
        for &idx in &reached {
            assert_eq!(columns[idx].cascade_pos(), None);
        }

        // a fresh cascade still accepts them
        let mut fresh = HighlightCascade::new(0.0, 400.0, false);
        assert!(fresh.sweep(0.05, &mut columns, &cfg) > 0);
        assert!(columns[0].cascade_pos().is_some());
    }
}
