// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation tracks: sorted keyframe storage and point-in-time evaluation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::binding::TrackBinding;
use crate::easing::EasingKind;
use crate::keyframe::{
    InterpolationMode, Keyframe, KeyframeId, KeyframeUpdate, PropertyMap, PropertyValue,
    TIME_EPSILON,
};

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// A track owning a time-ordered list of keyframes for one property bundle.
///
/// The keyframe list is only reachable through the track's own operations,
/// which keep it sorted by time with unique times (within
/// [`TIME_EPSILON`]). Queries never mutate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationTrack {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Target element and clock domain
    pub binding: TrackBinding,
    /// Whether the track contributes values when the session is evaluated
    pub enabled: bool,
    keyframes: Vec<Keyframe>,
}

impl AnimationTrack {
    /// Create a new empty track
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            binding: TrackBinding::default(),
            enabled: true,
            keyframes: Vec::new(),
        }
    }

    /// Set the binding
    pub fn with_binding(mut self, binding: TrackBinding) -> Self {
        self.binding = binding;
        self
    }

    /// Insert a keyframe, keeping the list sorted.
    ///
    /// A keyframe already present within [`TIME_EPSILON`] of the new time is
    /// replaced (last write wins). Returns the inserted keyframe's id.
    pub fn add_keyframe(&mut self, keyframe: Keyframe) -> KeyframeId {
        let id = keyframe.id;
        let at = self
            .keyframes
            .partition_point(|k| k.time < keyframe.time - TIME_EPSILON);
        let coincident = self
            .keyframes
            .get(at)
            .is_some_and(|existing| (existing.time - keyframe.time).abs() <= TIME_EPSILON);
        if coincident {
            tracing::trace!(track = %self.name, time = keyframe.time, "replacing coincident keyframe");
            self.keyframes[at] = keyframe;
        } else {
            self.keyframes.insert(at, keyframe);
        }
        id
    }

    /// Remove a keyframe by id. Unknown ids are a no-op returning `None`.
    pub fn remove_keyframe(&mut self, id: KeyframeId) -> Option<Keyframe> {
        let idx = self.keyframes.iter().position(|k| k.id == id)?;
        Some(self.keyframes.remove(idx))
    }

    /// Merge a partial update into a keyframe, re-sorting if its time
    /// changed. Returns false for unknown ids.
    pub fn update_keyframe(&mut self, id: KeyframeId, update: KeyframeUpdate) -> bool {
        let Some(idx) = self.keyframes.iter().position(|k| k.id == id) else {
            return false;
        };
        let retimed = update.time.is_some();
        let kf = &mut self.keyframes[idx];
        if let Some(time) = update.time {
            kf.time = time;
        }
        if let Some(properties) = update.properties {
            kf.properties = properties;
        }
        if let Some(easing) = update.easing {
            kf.easing = easing;
        }
        if let Some(interpolation) = update.interpolation {
            kf.interpolation = interpolation;
        }
        if retimed {
            self.sort_keyframes();
        }
        true
    }

    /// Clone a keyframe to a new time with a fresh id.
    pub fn duplicate_keyframe(&mut self, id: KeyframeId, new_time: f64) -> Option<KeyframeId> {
        let mut copy = self.keyframe(id)?.clone();
        copy.id = KeyframeId::new();
        copy.time = new_time;
        Some(self.add_keyframe(copy))
    }

    /// Resolve the track's property values at a point in time.
    ///
    /// Empty tracks yield an empty map; queries outside the keyframe range
    /// clamp to the boundary keyframe; a single keyframe holds everywhere.
    /// Between two keyframes the earlier keyframe's easing and interpolation
    /// mode shape the segment. Pure: `O(log n)` and no mutation.
    pub fn value_at(&self, time: f64) -> PropertyMap {
        if self.keyframes.is_empty() {
            return PropertyMap::new();
        }

        let idx = self.keyframes.partition_point(|k| k.time <= time);
        if idx == 0 {
            return self.keyframes[0].properties.clone();
        }
        if idx == self.keyframes.len() {
            return self.keyframes[idx - 1].properties.clone();
        }

        let a = &self.keyframes[idx - 1];
        let b = &self.keyframes[idx];

        // Exact hits return the anchor untouched: easing curves that do not
        // pass through 0 at progress 0 (Spring) must not perturb anchors.
        if (time - a.time).abs() <= TIME_EPSILON {
            return a.properties.clone();
        }

        let span = b.time - a.time;
        if span <= TIME_EPSILON {
            // Degenerate pair steps straight to the later keyframe
            return b.properties.clone();
        }

        let eased = a.easing.evaluate((time - a.time) / span);
        let mut values = PropertyMap::with_capacity(a.properties.len());
        for (name, value) in &a.properties {
            let resolved = match b.properties.get(name) {
                Some(target) => value
                    .interpolate(target, eased, a.interpolation)
                    .unwrap_or_else(|| value.clone()),
                None => value.clone(),
            };
            values.insert(name.clone(), resolved);
        }
        values
    }

    /// Get the keyframe whose time matches within [`TIME_EPSILON`], if any.
    pub fn keyframe_at(&self, time: f64) -> Option<&Keyframe> {
        let at = self.keyframes.partition_point(|k| k.time < time - TIME_EPSILON);
        self.keyframes
            .get(at)
            .filter(|k| (k.time - time).abs() <= TIME_EPSILON)
    }

    /// Get a keyframe by id
    pub fn keyframe(&self, id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.id == id)
    }

    /// Get the keyframe nearest to a time
    pub fn nearest_keyframe(&self, time: f64) -> Option<&Keyframe> {
        self.keyframes
            .iter()
            .min_by(|a, b| (a.time - time).abs().total_cmp(&(b.time - time).abs()))
    }

    /// Keyframes within the inclusive time range
    pub fn keyframes_in_range(&self, start: f64, end: f64) -> impl Iterator<Item = &Keyframe> {
        self.keyframes
            .iter()
            .filter(move |k| k.time >= start && k.time <= end)
    }

    /// All keyframes, sorted by time
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Number of keyframes
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Time of the last keyframe (0 when empty)
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Shift every keyframe by a time delta, clamping at zero.
    pub fn offset_time(&mut self, delta: f64) {
        for kf in &mut self.keyframes {
            kf.time = (kf.time + delta).max(0.0);
        }
        self.sort_keyframes();
    }

    /// Scale every keyframe time by a positive factor. Non-positive factors
    /// are a no-op.
    pub fn scale_time(&mut self, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        for kf in &mut self.keyframes {
            kf.time *= factor;
        }
    }

    /// Drop interior keyframes whose scalar properties all sit within
    /// `tolerance` of the straight line between their neighbors.
    ///
    /// Keyframes carrying non-scalar properties or non-linear shaping are
    /// never dropped, nor are the first and last. Returns the number
    /// removed.
    pub fn optimize(&mut self, tolerance: f64) -> usize {
        if self.keyframes.len() < 3 {
            return 0;
        }
        let mut doomed = Vec::new();
        for idx in 1..self.keyframes.len() - 1 {
            let prev = &self.keyframes[idx - 1];
            let kf = &self.keyframes[idx];
            let next = &self.keyframes[idx + 1];
            if kf.easing.kind != EasingKind::Linear
                || prev.easing.kind != EasingKind::Linear
                || kf.interpolation != InterpolationMode::Linear
                || prev.interpolation != InterpolationMode::Linear
            {
                continue;
            }
            let span = next.time - prev.time;
            if span <= TIME_EPSILON {
                continue;
            }
            let t = (kf.time - prev.time) / span;
            let collinear = kf.properties.iter().all(|(name, value)| {
                let (Some(v), Some(a), Some(b)) = (
                    value.as_number(),
                    prev.properties.get(name).and_then(PropertyValue::as_number),
                    next.properties.get(name).and_then(PropertyValue::as_number),
                ) else {
                    return false;
                };
                (a + (b - a) * t - v).abs() <= tolerance
            });
            if collinear {
                doomed.push(kf.id);
            }
        }
        let before = self.keyframes.len();
        self.keyframes.retain(|k| !doomed.contains(&k.id));
        before - self.keyframes.len()
    }

    fn sort_keyframes(&mut self) {
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
}
