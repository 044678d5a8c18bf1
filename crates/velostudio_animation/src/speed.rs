// SPDX-License-Identifier: MIT OR Apache-2.0
//! Speed controls and time remapping.
//!
//! A speed control is a time-bounded rule for how fast the source clock
//! advances relative to wall time. Every enabled control whose window
//! contains the global time contributes a multiplier; contributions compose
//! multiplicatively in registration order on top of the session's global
//! speed. Integration is forward-only: factors clamp at zero (freeze).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::easing::Easing;
use crate::keyframe::TIME_EPSILON;

/// Unique identifier for a speed control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeedControlId(pub Uuid);

impl SpeedControlId {
    /// Create a new random speed-control ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SpeedControlId {
    fn default() -> Self {
        Self::new()
    }
}

/// A named speed preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedPreset {
    /// Display name
    pub name: &'static str,
    /// Speed multiplier
    pub speed: f64,
}

/// Common playback speed presets
pub const SPEED_PRESETS: [SpeedPreset; 7] = [
    SpeedPreset { name: "Freeze Frame", speed: 0.0 },
    SpeedPreset { name: "Slow Motion 25%", speed: 0.25 },
    SpeedPreset { name: "Slow Motion 50%", speed: 0.5 },
    SpeedPreset { name: "Normal Speed", speed: 1.0 },
    SpeedPreset { name: "Fast Motion 2x", speed: 2.0 },
    SpeedPreset { name: "Fast Motion 4x", speed: 4.0 },
    SpeedPreset { name: "Time Lapse 10x", speed: 10.0 },
];

/// A scalar speed keyframe at an absolute global time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedKeyframe {
    /// Global time in seconds
    pub time: f64,
    /// Speed multiplier at this time
    pub speed: f64,
}

/// How a control's multiplier varies across its window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpeedProfile {
    /// Fixed multiplier across the whole window
    Constant {
        /// Speed multiplier
        speed: f64,
    },
    /// Linear ramp between two multipliers
    Ramp {
        /// Multiplier at the window start
        start_speed: f64,
        /// Multiplier at the window end
        end_speed: f64,
    },
    /// Ramp with eased progress
    Curve {
        /// Multiplier at the window start
        start_speed: f64,
        /// Multiplier at the window end
        end_speed: f64,
        /// Easing applied to window progress before the lerp
        easing: Easing,
    },
    /// Piecewise-linear curve through scalar keyframes
    Keyframed {
        /// Speed keyframes at absolute global times, kept sorted
        keyframes: Vec<SpeedKeyframe>,
    },
}

/// A time-bounded speed rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedControl {
    /// Unique control ID
    pub id: SpeedControlId,
    /// Control name
    pub name: String,
    /// Window start (seconds, global clock)
    pub start_time: f64,
    /// Window end; equal to `start_time` for an instantaneous step
    pub end_time: f64,
    /// Multiplier profile
    pub profile: SpeedProfile,
    /// Whether the control contributes to [`SpeedRemap::speed_at`]
    pub enabled: bool,
}

impl SpeedControl {
    /// Create a control over `[start_time, end_time)`.
    ///
    /// An `end_time` before `start_time` is clamped up to `start_time`;
    /// keyframed profiles are sorted by time.
    pub fn new(name: impl Into<String>, start_time: f64, end_time: f64, mut profile: SpeedProfile) -> Self {
        if let SpeedProfile::Keyframed { keyframes } = &mut profile {
            keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        }
        Self {
            id: SpeedControlId::new(),
            name: name.into(),
            start_time,
            end_time: end_time.max(start_time),
            profile,
            enabled: true,
        }
    }

    /// Whether this control contributes at `global_time`.
    ///
    /// The window is half-open `[start, end)`; a zero-length window is
    /// active exactly at its start.
    pub fn is_active_at(&self, global_time: f64) -> bool {
        if !self.enabled {
            return false;
        }
        if self.span() <= TIME_EPSILON {
            (global_time - self.start_time).abs() <= TIME_EPSILON
        } else {
            global_time >= self.start_time && global_time < self.end_time
        }
    }

    /// The control's multiplier at `global_time`, clamped at zero.
    ///
    /// A zero-length window steps straight to its end value.
    pub fn multiplier_at(&self, global_time: f64) -> f64 {
        let progress = if self.span() <= TIME_EPSILON {
            1.0
        } else {
            ((global_time - self.start_time) / self.span()).clamp(0.0, 1.0)
        };

        let speed = match &self.profile {
            SpeedProfile::Constant { speed } => *speed,
            SpeedProfile::Ramp { start_speed, end_speed } => {
                start_speed + (end_speed - start_speed) * progress
            }
            SpeedProfile::Curve { start_speed, end_speed, easing } => {
                start_speed + (end_speed - start_speed) * easing.evaluate(progress)
            }
            SpeedProfile::Keyframed { keyframes } => keyframed_speed(keyframes, global_time),
        };
        speed.max(0.0)
    }

    /// Insert a speed keyframe into a keyframed profile, replacing any
    /// keyframe within [`TIME_EPSILON`]. Returns false for other profiles.
    pub fn add_speed_keyframe(&mut self, keyframe: SpeedKeyframe) -> bool {
        let SpeedProfile::Keyframed { keyframes } = &mut self.profile else {
            return false;
        };
        let at = keyframes.partition_point(|k| k.time < keyframe.time - TIME_EPSILON);
        let coincident = keyframes
            .get(at)
            .is_some_and(|existing| (existing.time - keyframe.time).abs() <= TIME_EPSILON);
        if coincident {
            keyframes[at] = keyframe;
        } else {
            keyframes.insert(at, keyframe);
        }
        true
    }

    fn span(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Bracket-and-interpolate over sorted speed keyframes, the scalar
/// specialization of track evaluation: clamp outside the range, step across
/// degenerate pairs. An empty list is neutral (1.0).
fn keyframed_speed(keyframes: &[SpeedKeyframe], time: f64) -> f64 {
    if keyframes.is_empty() {
        return 1.0;
    }
    let idx = keyframes.partition_point(|k| k.time <= time);
    if idx == 0 {
        return keyframes[0].speed;
    }
    if idx == keyframes.len() {
        return keyframes[idx - 1].speed;
    }
    let a = keyframes[idx - 1];
    let b = keyframes[idx];
    let span = b.time - a.time;
    if span <= TIME_EPSILON {
        return b.speed;
    }
    let t = (time - a.time) / span;
    a.speed + (b.speed - a.speed) * t
}

/// Ordered registry of speed controls plus the wall-to-source integrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeedRemap {
    // Registration order is semantic: contributions multiply in this order,
    // so removal must not reorder (shift_remove below).
    controls: IndexMap<SpeedControlId, SpeedControl>,
}

impl SpeedRemap {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a control at the end of the composition order.
    pub fn add_control(&mut self, control: SpeedControl) -> SpeedControlId {
        let id = control.id;
        tracing::debug!(control = %control.name, start = control.start_time, end = control.end_time, "adding speed control");
        self.controls.insert(id, control);
        id
    }

    /// Remove a control. Unknown ids are a no-op returning `None`.
    pub fn remove_control(&mut self, id: SpeedControlId) -> Option<SpeedControl> {
        self.controls.shift_remove(&id)
    }

    /// Get a control by id
    pub fn control(&self, id: SpeedControlId) -> Option<&SpeedControl> {
        self.controls.get(&id)
    }

    /// Get a mutable control by id
    pub fn control_mut(&mut self, id: SpeedControlId) -> Option<&mut SpeedControl> {
        self.controls.get_mut(&id)
    }

    /// All controls in registration order
    pub fn controls(&self) -> impl Iterator<Item = &SpeedControl> {
        self.controls.values()
    }

    /// Number of registered controls
    pub fn control_count(&self) -> usize {
        self.controls.len()
    }

    /// Instantaneous speed multiplier at `global_time`.
    ///
    /// Starts from `global_speed` and multiplies in every active control in
    /// registration order. Never negative.
    pub fn speed_at(&self, global_time: f64, global_speed: f64) -> f64 {
        let mut speed = global_speed.max(0.0);
        for control in self.controls.values() {
            if control.is_active_at(global_time) {
                speed *= control.multiplier_at(global_time);
            }
        }
        speed
    }

    /// One integration step: advance the source clock by the wall-time delta
    /// scaled by the speed at `global_time`.
    ///
    /// Returns a candidate time only; looping and clamping against track
    /// bounds belong to the caller's playback clock.
    pub fn advance(&self, source_time: f64, wall_delta: f64, global_time: f64, global_speed: f64) -> f64 {
        source_time + wall_delta * self.speed_at(global_time, global_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;

    #[test]
    fn test_ramp_midpoint() {
        let mut remap = SpeedRemap::new();
        remap.add_control(SpeedControl::new(
            "ramp",
            0.0,
            10.0,
            SpeedProfile::Ramp { start_speed: 1.0, end_speed: 3.0 },
        ));
        assert_eq!(remap.speed_at(5.0, 1.0), 2.0);
        assert_eq!(remap.speed_at(0.0, 1.0), 1.0);
        // Half-open window: the end time is outside
        assert_eq!(remap.speed_at(10.0, 1.0), 1.0);
    }

    #[test]
    fn test_overlapping_controls_compose_multiplicatively() {
        let mut remap = SpeedRemap::new();
        remap.add_control(SpeedControl::new("double", 0.0, 10.0, SpeedProfile::Constant { speed: 2.0 }));
        remap.add_control(SpeedControl::new("triple", 0.0, 10.0, SpeedProfile::Constant { speed: 3.0 }));
        assert_eq!(remap.speed_at(5.0, 1.0), 6.0);
        // Global speed multiplies on top
        assert_eq!(remap.speed_at(5.0, 0.5), 3.0);
    }

    #[test]
    fn test_disabled_and_out_of_window_controls_are_ignored() {
        let mut remap = SpeedRemap::new();
        let id = remap.add_control(SpeedControl::new("x", 2.0, 4.0, SpeedProfile::Constant { speed: 5.0 }));
        assert_eq!(remap.speed_at(1.0, 1.0), 1.0);
        assert_eq!(remap.speed_at(3.0, 1.0), 5.0);
        remap.control_mut(id).unwrap().enabled = false;
        assert_eq!(remap.speed_at(3.0, 1.0), 1.0);
    }

    #[test]
    fn test_curve_profile_uses_easing() {
        let mut remap = SpeedRemap::new();
        remap.add_control(SpeedControl::new(
            "eased",
            0.0,
            10.0,
            SpeedProfile::Curve { start_speed: 0.0, end_speed: 4.0, easing: Easing::ease_in() },
        ));
        // ease-in(0.5) = 0.25
        assert_eq!(remap.speed_at(5.0, 1.0), 1.0);
    }

    #[test]
    fn test_keyframed_profile_brackets_and_clamps() {
        let control = SpeedControl::new(
            "kf",
            0.0,
            10.0,
            SpeedProfile::Keyframed {
                keyframes: vec![
                    SpeedKeyframe { time: 6.0, speed: 3.0 },
                    SpeedKeyframe { time: 2.0, speed: 1.0 },
                ],
            },
        );
        // Constructor sorts
        assert_eq!(control.multiplier_at(2.0), 1.0);
        assert_eq!(control.multiplier_at(4.0), 2.0);
        assert_eq!(control.multiplier_at(6.0), 3.0);
        // Clamped outside the keyframe range
        assert_eq!(control.multiplier_at(0.0), 1.0);
        assert_eq!(control.multiplier_at(9.0), 3.0);
    }

    #[test]
    fn test_empty_keyframed_profile_is_neutral() {
        let control = SpeedControl::new("kf", 0.0, 10.0, SpeedProfile::Keyframed { keyframes: vec![] });
        assert_eq!(control.multiplier_at(5.0), 1.0);
    }

    #[test]
    fn test_add_speed_keyframe_sorts_and_replaces() {
        let mut control = SpeedControl::new("kf", 0.0, 10.0, SpeedProfile::Keyframed { keyframes: vec![] });
        assert!(control.add_speed_keyframe(SpeedKeyframe { time: 5.0, speed: 2.0 }));
        assert!(control.add_speed_keyframe(SpeedKeyframe { time: 1.0, speed: 1.0 }));
        assert!(control.add_speed_keyframe(SpeedKeyframe { time: 5.0, speed: 4.0 }));
        let SpeedProfile::Keyframed { keyframes } = &control.profile else {
            panic!("profile changed");
        };
        assert_eq!(keyframes.len(), 2);
        assert_eq!(keyframes[1].speed, 4.0);

        let mut constant = SpeedControl::new("c", 0.0, 1.0, SpeedProfile::Constant { speed: 1.0 });
        assert!(!constant.add_speed_keyframe(SpeedKeyframe { time: 0.5, speed: 2.0 }));
    }

    #[test]
    fn test_zero_length_control_steps_instantaneously() {
        let mut remap = SpeedRemap::new();
        remap.add_control(SpeedControl::new(
            "step",
            5.0,
            5.0,
            SpeedProfile::Ramp { start_speed: 1.0, end_speed: 0.25 },
        ));
        // Active only at its own instant, contributing the end speed
        assert_eq!(remap.speed_at(5.0, 1.0), 0.25);
        assert_eq!(remap.speed_at(4.999, 1.0), 1.0);
        assert_eq!(remap.speed_at(5.001, 1.0), 1.0);
    }

    #[test]
    fn test_negative_speeds_clamp_to_freeze() {
        let mut remap = SpeedRemap::new();
        remap.add_control(SpeedControl::new("bad", 0.0, 10.0, SpeedProfile::Constant { speed: -2.0 }));
        assert_eq!(remap.speed_at(5.0, 1.0), 0.0);
        assert_eq!(remap.speed_at(5.0, -1.0), 0.0);
    }

    #[test]
    fn test_advance_is_step_size_independent() {
        let mut remap = SpeedRemap::new();
        remap.add_control(SpeedControl::new("slow", 0.0, 100.0, SpeedProfile::Constant { speed: 0.5 }));

        // Many small steps vs few large steps over the same wall time
        let mut fine = 0.0;
        for _ in 0..1000 {
            fine = remap.advance(fine, 0.01, 50.0, 1.0);
        }
        let mut coarse = 0.0;
        for _ in 0..10 {
            coarse = remap.advance(coarse, 1.0, 50.0, 1.0);
        }
        assert!((fine - 5.0).abs() < 1e-6);
        assert!((coarse - 5.0).abs() < 1e-6);
        assert!((fine - coarse).abs() < 1e-6);
    }

    #[test]
    fn test_speed_presets_span_freeze_to_timelapse() {
        assert_eq!(SPEED_PRESETS[0].speed, 0.0);
        assert!(SPEED_PRESETS.iter().any(|p| p.speed == 1.0));
        assert!(SPEED_PRESETS.windows(2).all(|w| w[0].speed < w[1].speed));
    }

    #[test]
    fn test_removal_preserves_registration_order() {
        let mut remap = SpeedRemap::new();
        let a = remap.add_control(SpeedControl::new("a", 0.0, 1.0, SpeedProfile::Constant { speed: 2.0 }));
        remap.add_control(SpeedControl::new("b", 0.0, 1.0, SpeedProfile::Constant { speed: 3.0 }));
        remap.add_control(SpeedControl::new("c", 0.0, 1.0, SpeedProfile::Constant { speed: 4.0 }));
        remap.remove_control(a);
        let names: Vec<&str> = remap.controls().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert!(remap.remove_control(a).is_none());
    }
}
