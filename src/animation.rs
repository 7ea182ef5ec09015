//! Radius ramp for the bar-selection size encoding.
//!
//! A ramp is a plain stepper; whoever owns the frame callback calls
//! [`FrameScheduler::on_frame`] once per display frame.

use crate::config::AnimationConfig;
use crate::paint::{MapPainter, PaintUpdate};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct RadiusRamp {
    pub count_key: String,
    pub bar_value: f64,
    pub start: f64,
    pub end: f64,
    pub steps: u32,
    next_step: u32,
}

impl RadiusRamp {
    pub fn new(count_key: impl Into<String>, bar_value: f64, config: &AnimationConfig) -> Self {
        Self {
            count_key: count_key.into(),
            bar_value,
            start: config.start_radius,
            end: config.end_radius_scale,
            steps: config.steps,
            next_step: 0,
        }
    }

    /// Linear scale at `step` of `0..=steps`.
    pub fn scale_at(&self, step: u32) -> f64 {
        if self.steps == 0 {
            return self.end;
        }
        let t = f64::from(step.min(self.steps)) / f64::from(self.steps);
        self.start + t * (self.end - self.start)
    }

    pub fn is_finished(&self) -> bool {
        self.next_step > self.steps
    }

    /// Paint update for the next step, `None` once the ramp has run out.
    pub fn advance(&mut self, painter: &MapPainter) -> Option<PaintUpdate> {
        if self.is_finished() {
            return None;
        }
        let scale = self.scale_at(self.next_step);
        self.next_step += 1;
        Some(painter.scaled_radius(&self.count_key, self.bar_value, scale))
    }
}

/// Pending ramps, advanced together on each frame.
///
/// Starting a ramp never cancels one already running.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    ramps: Vec<RadiusRamp>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.ramps.len()
    }

    /// Applies step 0 right away and queues the rest for later frames.
    pub fn start(&mut self, mut ramp: RadiusRamp, painter: &MapPainter) -> Option<PaintUpdate> {
        let first = ramp.advance(painter);
        if !ramp.is_finished() {
            debug!(count_key = %ramp.count_key, bar_value = ramp.bar_value, "Radius ramp started");
            self.ramps.push(ramp);
        }
        first
    }

    pub fn on_frame(&mut self, painter: &MapPainter) -> Vec<PaintUpdate> {
        let updates = self.ramps.iter_mut().filter_map(|r| r.advance(painter)).collect();
        self.ramps.retain(|r| !r.is_finished());
        updates
    }

    pub fn cancel_all(&mut self) {
        self.ramps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;

    fn painter() -> MapPainter {
        MapPainter::new(MapConfig::default(), "name")
    }

    #[test]
    fn scale_ramps_linearly() {
        let ramp = RadiusRamp::new("A_count", 10.0, &AnimationConfig::default());
        assert_eq!(ramp.scale_at(0), 6.0);
        assert_eq!(ramp.scale_at(15), 53.0);
        assert_eq!(ramp.scale_at(30), 100.0);
        assert_eq!(ramp.scale_at(99), 100.0);
    }

    #[test]
    fn ramp_emits_one_update_per_step() {
        let painter = painter();
        let config = AnimationConfig {
            steps: 4,
            start_radius: 0.0,
            end_radius_scale: 8.0,
        };
        let mut scheduler = FrameScheduler::new();
        let first = scheduler.start(RadiusRamp::new("A_count", 2.0, &config), &painter).unwrap();
        assert_eq!(first.value[3][2], serde_json::json!(0.0));

        let mut frames = Vec::new();
        loop {
            let updates = scheduler.on_frame(&painter);
            if updates.is_empty() {
                break;
            }
            frames.extend(updates);
        }
        assert_eq!(frames.len(), 4);
        assert_eq!(frames.last().unwrap().value[3][2], serde_json::json!(8.0));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn overlapping_ramps_both_run() {
        let painter = painter();
        let config = AnimationConfig {
            steps: 2,
            ..AnimationConfig::default()
        };
        let mut scheduler = FrameScheduler::new();
        scheduler.start(RadiusRamp::new("A_count", 1.0, &config), &painter);
        scheduler.on_frame(&painter);
        scheduler.start(RadiusRamp::new("B_count", 1.0, &config), &painter);

        assert_eq!(scheduler.on_frame(&painter).len(), 2);
        assert_eq!(scheduler.on_frame(&painter).len(), 1);
        assert!(scheduler.on_frame(&painter).is_empty());
    }

    #[test]
    fn cancel_all_drops_pending_ramps() {
        let painter = painter();
        let mut scheduler = FrameScheduler::new();
        scheduler.start(RadiusRamp::new("A_count", 1.0, &AnimationConfig::default()), &painter);
        assert_eq!(scheduler.pending(), 1);
        scheduler.cancel_all();
        assert!(scheduler.on_frame(&painter).is_empty());
    }

    #[test]
    fn zero_step_ramp_jumps_to_end() {
        let painter = painter();
        let config = AnimationConfig {
            steps: 0,
            ..AnimationConfig::default()
        };
        let mut scheduler = FrameScheduler::new();
        let only = scheduler.start(RadiusRamp::new("A_count", 1.0, &config), &painter).unwrap();
        assert_eq!(only.value[3][2], serde_json::json!(100.0));
        assert_eq!(scheduler.pending(), 0);
    }
}
