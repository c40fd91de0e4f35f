// Copyright (c) 2026 rezky_nightky

use std::collections::VecDeque;

use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QualityChange {
    RipplesDisabled,
    CascadesDisabled,
}

/// Rolling-mean FPS watchdog. Sheds ripples first, then cascades, and never
/// turns either back on.
#[derive(Clone, Debug)]
pub struct AdaptiveQualityController {
    window: VecDeque<f32>,
    threshold: f32,
    ripples: bool,
    cascades: bool,
    degrade_events: u32,
}

impl AdaptiveQualityController {
    pub fn new(
        target_fps: f32,
        window: usize,
        threshold: f32,
        ripples: bool,
        cascades: bool,
    ) -> Self {
        let window = window.max(1);
        Self {
            window: std::iter::repeat(target_fps).take(window).collect(),
            threshold,
            ripples,
            cascades,
            degrade_events: 0,
        }
    }

    pub fn ripples_enabled(&self) -> bool {
        self.ripples
    }

    pub fn cascades_enabled(&self) -> bool {
        self.cascades
    }

    pub fn degrade_events(&self) -> u32 {
        self.degrade_events
    }

    pub fn mean_fps(&self) -> f32 {
        self.window.iter().sum::<f32>() / self.window.len().max(1) as f32
    }

    /// Feeds one instantaneous FPS sample. Non-positive samples are ignored.
    pub fn observe(&mut self, fps: f32) -> Option<QualityChange> {
        if !fps.is_finite() || fps <= 0.0 {
            return None;
        }
        self.window.pop_front();
        self.window.push_back(fps);

        let mean = self.mean_fps();
        if self.threshold <= 0.0 || mean >= self.threshold {
            return None;
        }

        let change = if self.ripples {
            self.ripples = false;
            QualityChange::RipplesDisabled
        } else if self.cascades {
            self.cascades = false;
            QualityChange::CascadesDisabled
        } else {
            return None;
        };
        self.degrade_events += 1;
        match change {
            QualityChange::RipplesDisabled => {
                info!(mean_fps = mean, "performance low, disabling ripples")
            }
            QualityChange::CascadesDisabled => {
                info!(mean_fps = mean, "performance low, disabling cascades")
            }
        }
        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ripples_go_before_cascades_and_stay_off() {
        let mut q = AdaptiveQualityController::new(60.0, 4, 45.0, true, true);
        assert_eq!(q.observe(50.0), None);
        assert_eq!(q.observe(10.0), None, "mean 45 is not below 45");
        assert_eq!(q.observe(10.0), Some(QualityChange::RipplesDisabled));
        assert!(!q.ripples_enabled() && q.cascades_enabled());
        assert_eq!(q.observe(10.0), Some(QualityChange::CascadesDisabled));
        assert_eq!(q.observe(10.0), None);

        for _ in 0..10 {
            q.observe(120.0);
        }
        assert!(!q.ripples_enabled() && !q.cascades_enabled());
        assert_eq!(q.degrade_events(), 2);
    }

    #[test]
    fn ignores_non_positive_samples() {
        let mut q = AdaptiveQualityController::new(60.0, 2, 45.0, true, true);
        assert_eq!(q.observe(0.0), None);
        assert_eq!(q.observe(-5.0), None);
        assert_eq!(q.observe(f32::NAN), None);
        assert_eq!(q.mean_fps(), 60.0);
    }

    #[test]
    fn zero_threshold_never_degrades() {
        let mut q = AdaptiveQualityController::new(60.0, 2, 0.0, true, true);
        for _ in 0..5 {
            assert_eq!(q.observe(1.0), None);
        }
        assert!(q.ripples_enabled());
    }

    #[test]
    fn already_disabled_ripples_skip_to_cascades() {
        let mut q = AdaptiveQualityController::new(60.0, 1, 45.0, false, true);
        assert_eq!(q.observe(5.0), Some(QualityChange::CascadesDisabled));
    }
}
