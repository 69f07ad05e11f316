//! Frame-driven volume ramps
//!
//! Fades are plain data advanced from the host's per-frame update. A ramp
//! targets a track key rather than a handle, so the scheduler never holds
//! references into the controller. At most one ramp per target is active:
//! starting a new ramp on a key replaces the old one.

use crate::config::TrackKey;
use crate::volume::clamp01;
use std::time::Duration;

/// What happens to the target handle when a ramp finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RampCompletion {
    /// Leave the handle playing at the final volume
    #[default]
    None,
    /// Stop the handle
    Stop,
}

/// Linear volume interpolation over a fixed duration
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeRamp {
    target: TrackKey,
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
    on_complete: RampCompletion,
}

impl VolumeRamp {
    /// Create a ramp from `from` to `to`; both ends are clamped to `[0, 1]`.
    pub fn new(target: impl Into<TrackKey>, from: f32, to: f32, duration: Duration) -> Self {
        VolumeRamp {
            target: target.into(),
            from: clamp01(from),
            to: clamp01(to),
            duration,
            elapsed: Duration::ZERO,
            on_complete: RampCompletion::None,
        }
    }

    /// Set the completion action
    pub fn then(mut self, on_complete: RampCompletion) -> Self {
        self.on_complete = on_complete;
        self
    }

    /// Track key this ramp drives
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Start value
    pub fn from(&self) -> f32 {
        self.from
    }

    /// End value
    pub fn to(&self) -> f32 {
        self.to
    }

    /// Total duration
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Completion action
    pub fn on_complete(&self) -> RampCompletion {
        self.on_complete
    }

    /// Returns true once the full duration has elapsed
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Interpolated value at the current position
    pub fn value(&self) -> f32 {
        if self.is_finished() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * t.clamp(0.0, 1.0)
    }

    /// Advance by `delta` and return the new value
    pub fn advance(&mut self, delta: Duration) -> f32 {
        self.elapsed = self.elapsed.saturating_add(delta).min(self.duration);
        self.value()
    }
}

/// Result of advancing one ramp by one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RampStep {
    /// Track key the value applies to
    pub target: TrackKey,
    /// Volume for this frame
    pub value: f32,
    /// Set on the ramp's last step
    pub finished: bool,
    /// Completion action, meaningful when `finished`
    pub on_complete: RampCompletion,
}

/// Active ramps, at most one per target
#[derive(Debug, Clone, Default)]
pub struct RampScheduler {
    ramps: Vec<VolumeRamp>,
}

impl RampScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a ramp, replacing any ramp on the same target
    pub fn start(&mut self, ramp: VolumeRamp) {
        self.cancel(ramp.target());
        self.ramps.push(ramp);
    }

    /// Drop the ramp on `target`, returning whether one existed
    pub fn cancel(&mut self, target: &str) -> bool {
        let before = self.ramps.len();
        self.ramps.retain(|r| r.target != target);
        self.ramps.len() != before
    }

    /// Whether `target` has an active ramp
    pub fn is_active(&self, target: &str) -> bool {
        self.ramps.iter().any(|r| r.target == target)
    }

    /// Active ramp on `target`, if any
    pub fn get(&self, target: &str) -> Option<&VolumeRamp> {
        self.ramps.iter().find(|r| r.target == target)
    }

    /// Number of active ramps
    pub fn len(&self) -> usize {
        self.ramps.len()
    }

    /// Whether no ramps are active
    pub fn is_empty(&self) -> bool {
        self.ramps.is_empty()
    }

    /// Advance every ramp by `delta`; finished ramps are removed.
    pub fn advance(&mut self, delta: Duration) -> Vec<RampStep> {
        let mut steps = Vec::with_capacity(self.ramps.len());
        for ramp in &mut self.ramps {
            let value = ramp.advance(delta);
            steps.push(RampStep {
                target: ramp.target.clone(),
                value,
                finished: ramp.is_finished(),
                on_complete: ramp.on_complete,
            });
        }
        self.ramps.retain(|r| !r.is_finished());
        steps
    }
}
