// SPDX-License-Identifier: MIT OR Apache-2.0
//! The animation session: explicit owner of tracks, speed controls, and the
//! global speed.
//!
//! All state lives in the session value passed by the caller; the engine has
//! no globals. Queries (`values_at`, `speed_at`, `advance`, `tick`) take
//! `&self` and are pure, so the borrow checker is the mutation guard: a
//! query can never observe a half-applied edit, and read-only access may be
//! shared across threads during a render pass.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use velostudio_timebase::Timebase;

use crate::binding::TimeDomain;
use crate::keyframe::{Keyframe, KeyframeId, PropertyMap};
use crate::speed::{SpeedControl, SpeedControlId, SpeedRemap};
use crate::track::{AnimationTrack, TrackId};

/// Version tag written into exported animation documents
const DOCUMENT_VERSION: u32 = 1;

/// Error produced when decoding an animation document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The JSON was malformed or did not match the data model
    #[error("malformed animation document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document was written by an incompatible engine version
    #[error("unsupported animation document version {0}")]
    UnsupportedVersion(u32),
}

/// Playback clock state supplied by the host each tick.
///
/// Consumed, never owned or mutated: the engine reads `current_time` and
/// `is_playing`; the loop fields exist so hosts can wrap the candidate time
/// returned by [`Session::tick`], which this engine deliberately does not do.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackClock {
    /// Global project time in seconds
    pub current_time: f64,
    /// Whether playback is running
    pub is_playing: bool,
    /// Whether the host loops playback
    pub looping: bool,
    /// Loop region start
    pub loop_start: f64,
    /// Loop region end
    pub loop_end: f64,
}

/// Keyframes copied out of a session, ready to paste
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyframeClipboard {
    keyframes: Vec<Keyframe>,
}

impl KeyframeClipboard {
    /// Whether anything was copied
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Number of copied keyframes
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }
}

/// An animation session: tracks, speed controls, global speed, timebase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    tracks: IndexMap<TrackId, AnimationTrack>,
    remap: SpeedRemap,
    /// Scalar multiplier applied on top of all speed controls
    pub global_speed: f64,
    /// Project timebase
    pub timebase: Timebase,
}

impl Session {
    /// Create an empty session
    pub fn new(timebase: Timebase) -> Self {
        Self {
            tracks: IndexMap::new(),
            remap: SpeedRemap::new(),
            global_speed: 1.0,
            timebase,
        }
    }

    /// Add a track
    pub fn add_track(&mut self, track: AnimationTrack) -> TrackId {
        let id = track.id;
        tracing::debug!(track = %track.name, "adding track");
        self.tracks.insert(id, track);
        id
    }

    /// Remove a track. Unknown ids are a no-op returning `None`.
    pub fn remove_track(&mut self, id: TrackId) -> Option<AnimationTrack> {
        let removed = self.tracks.swap_remove(&id);
        if let Some(track) = &removed {
            tracing::debug!(track = %track.name, "removed track");
        }
        removed
    }

    /// Get a track
    pub fn track(&self, id: TrackId) -> Option<&AnimationTrack> {
        self.tracks.get(&id)
    }

    /// Get a mutable track
    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut AnimationTrack> {
        self.tracks.get_mut(&id)
    }

    /// All tracks
    pub fn tracks(&self) -> impl Iterator<Item = &AnimationTrack> {
        self.tracks.values()
    }

    /// Number of tracks
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Time of the last keyframe across all tracks
    pub fn content_duration(&self) -> f64 {
        self.tracks.values().map(AnimationTrack::duration).fold(0.0, f64::max)
    }

    /// Register a speed control
    pub fn add_speed_control(&mut self, control: SpeedControl) -> SpeedControlId {
        self.remap.add_control(control)
    }

    /// Remove a speed control. Unknown ids are a no-op returning `None`.
    pub fn remove_speed_control(&mut self, id: SpeedControlId) -> Option<SpeedControl> {
        self.remap.remove_control(id)
    }

    /// The speed-control registry
    pub fn remap(&self) -> &SpeedRemap {
        &self.remap
    }

    /// The mutable speed-control registry
    pub fn remap_mut(&mut self) -> &mut SpeedRemap {
        &mut self.remap
    }

    /// Instantaneous speed multiplier at the global time
    pub fn speed_at(&self, global_time: f64) -> f64 {
        self.remap.speed_at(global_time, self.global_speed)
    }

    /// One integration step; see [`SpeedRemap::advance`]
    pub fn advance(&self, source_time: f64, wall_delta: f64, global_time: f64) -> f64 {
        self.remap.advance(source_time, wall_delta, global_time, self.global_speed)
    }

    /// Per-frame entry point: advance the source clock unless the host
    /// clock is paused. Returns a candidate time; looping and clamping stay
    /// with the caller.
    pub fn tick(&self, clock: &PlaybackClock, source_time: f64, wall_delta: f64) -> f64 {
        if !clock.is_playing {
            return source_time;
        }
        self.advance(source_time, wall_delta, clock.current_time)
    }

    /// Resolve every enabled track at the time its binding selects:
    /// source-bound tracks sample `source_time`, global-bound tracks sample
    /// `global_time`.
    pub fn values_at(&self, source_time: f64, global_time: f64) -> IndexMap<TrackId, PropertyMap> {
        let mut values = IndexMap::with_capacity(self.tracks.len());
        for track in self.tracks.values() {
            if !track.enabled {
                continue;
            }
            let time = match track.binding.time_domain {
                TimeDomain::Source => source_time,
                TimeDomain::Global => global_time,
            };
            values.insert(track.id, track.value_at(time));
        }
        values
    }

    /// Copy keyframes by id, searching every track.
    pub fn copy_keyframes(&self, ids: &[KeyframeId]) -> KeyframeClipboard {
        let keyframes = self
            .tracks
            .values()
            .flat_map(|track| track.keyframes().iter())
            .filter(|kf| ids.contains(&kf.id))
            .cloned()
            .collect();
        KeyframeClipboard { keyframes }
    }

    /// Paste copied keyframes into a track, shifting them so the earliest
    /// lands on `at`. Pasted keyframes get fresh ids; replace-on-insert
    /// applies. Returns the number pasted (0 for an unknown track).
    pub fn paste_keyframes(&mut self, track_id: TrackId, at: f64, clipboard: &KeyframeClipboard) -> usize {
        if clipboard.is_empty() {
            return 0;
        }
        let Some(track) = self.tracks.get_mut(&track_id) else {
            return 0;
        };
        let earliest = clipboard
            .keyframes
            .iter()
            .map(|kf| kf.time)
            .fold(f64::INFINITY, f64::min);
        let offset = at - earliest;
        for source in &clipboard.keyframes {
            let mut copy = source.clone();
            copy.id = KeyframeId::new();
            copy.time = (source.time + offset).max(0.0);
            track.add_keyframe(copy);
        }
        clipboard.len()
    }

    /// Serialize the session as a versioned JSON animation document.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        #[derive(Serialize)]
        struct Document<'a> {
            version: u32,
            session: &'a Session,
        }
        Ok(serde_json::to_string_pretty(&Document {
            version: DOCUMENT_VERSION,
            session: self,
        })?)
    }

    /// Decode a JSON animation document produced by [`Session::to_json`].
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        #[derive(Deserialize)]
        struct Document {
            version: u32,
            session: Session,
        }
        let document: Document = serde_json::from_str(text)?;
        if document.version != DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion(document.version));
        }
        Ok(document.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{ElementId, TrackBinding};
    use crate::keyframe::PropertyValue;
    use crate::speed::SpeedProfile;

    fn session() -> Session {
        Session::new(Timebase::new(30.0, false).unwrap())
    }

    fn scalar_track(name: &str, points: &[(f64, f64)]) -> AnimationTrack {
        let mut track = AnimationTrack::new(name);
        for &(time, value) in points {
            track.add_keyframe(Keyframe::single(time, "x", PropertyValue::Number(value)));
        }
        track
    }

    #[test]
    fn test_track_crud() {
        let mut session = session();
        let id = session.add_track(scalar_track("a", &[(0.0, 0.0), (4.0, 8.0)]));
        assert_eq!(session.track_count(), 1);
        assert_eq!(session.content_duration(), 4.0);
        assert!(session.track(id).is_some());
        assert!(session.remove_track(id).is_some());
        assert!(session.remove_track(id).is_none());
        assert_eq!(session.track_count(), 0);
    }

    #[test]
    fn test_values_at_follows_time_domain() {
        let mut session = session();
        let element = ElementId(uuid::Uuid::new_v4());
        let source_id = session.add_track(
            scalar_track("motion", &[(0.0, 0.0), (10.0, 100.0)]).with_binding(TrackBinding::element(element)),
        );
        let mut overlay = scalar_track("overlay", &[(0.0, 0.0), (10.0, 100.0)]);
        overlay.binding = TrackBinding::element(element).global_time();
        let overlay_id = session.add_track(overlay);

        // Source clock lags the global clock under slow motion
        let values = session.values_at(2.0, 6.0);
        assert_eq!(values[&source_id]["x"].as_number(), Some(20.0));
        assert_eq!(values[&overlay_id]["x"].as_number(), Some(60.0));
        assert_eq!(session.track(overlay_id).unwrap().binding.element, Some(element));
    }

    #[test]
    fn test_disabled_tracks_are_skipped() {
        let mut session = session();
        let id = session.add_track(scalar_track("a", &[(0.0, 1.0)]));
        session.track_mut(id).unwrap().enabled = false;
        assert!(session.values_at(0.0, 0.0).is_empty());
    }

    #[test]
    fn test_speed_and_advance_use_global_speed() {
        let mut session = session();
        session.add_speed_control(SpeedControl::new(
            "ramp",
            0.0,
            10.0,
            SpeedProfile::Ramp { start_speed: 1.0, end_speed: 3.0 },
        ));
        assert_eq!(session.speed_at(5.0), 2.0);
        session.global_speed = 0.5;
        assert_eq!(session.speed_at(5.0), 1.0);
        assert_eq!(session.advance(1.0, 0.1, 5.0), 1.1);
    }

    #[test]
    fn test_tick_respects_paused_clock() {
        let mut session = session();
        let id = session.add_speed_control(SpeedControl::new("x2", 0.0, 10.0, SpeedProfile::Constant { speed: 2.0 }));
        let mut clock = PlaybackClock { current_time: 5.0, ..PlaybackClock::default() };
        assert_eq!(session.tick(&clock, 1.0, 0.1), 1.0);
        clock.is_playing = true;
        assert_eq!(session.tick(&clock, 1.0, 0.1), 1.2);

        // Disabling the control through the registry restores real time
        session.remap_mut().control_mut(id).unwrap().enabled = false;
        assert_eq!(session.tick(&clock, 1.0, 0.1), 1.1);
        assert!(session.remove_speed_control(id).is_some());
        assert!(session.remove_speed_control(id).is_none());
    }

    #[test]
    fn test_copy_paste_shifts_to_target_time() {
        let mut session = session();
        let from = session.add_track(scalar_track("from", &[(2.0, 10.0), (4.0, 30.0)]));
        let to = session.add_track(AnimationTrack::new("to"));

        let ids: Vec<KeyframeId> = session.track(from).unwrap().keyframes().iter().map(|k| k.id).collect();
        let clipboard = session.copy_keyframes(&ids);
        assert_eq!(clipboard.len(), 2);

        assert_eq!(session.paste_keyframes(to, 10.0, &clipboard), 2);
        let target = session.track(to).unwrap();
        let times: Vec<f64> = target.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![10.0, 12.0]);
        // Fresh identities
        assert!(target.keyframes().iter().all(|k| !ids.contains(&k.id)));

        assert_eq!(session.paste_keyframes(TrackId::new(), 0.0, &clipboard), 0);
    }

    #[test]
    fn test_json_document_round_trip() {
        let mut session = session();
        session.add_track(scalar_track("a", &[(0.0, 0.0), (1.0, 1.0)]));
        session.add_speed_control(SpeedControl::new("c", 0.0, 1.0, SpeedProfile::Constant { speed: 2.0 }));
        session.global_speed = 1.5;

        let text = session.to_json().unwrap();
        let loaded = Session::from_json(&text).unwrap();
        assert_eq!(loaded.track_count(), 1);
        assert_eq!(loaded.remap().control_count(), 1);
        assert_eq!(loaded.global_speed, 1.5);
        assert_eq!(loaded.speed_at(0.5), 3.0);
    }

    #[test]
    fn test_json_document_rejects_future_versions() {
        let text = session().to_json().unwrap().replace("\"version\": 1", "\"version\": 99");
        assert!(matches!(Session::from_json(&text), Err(DocumentError::UnsupportedVersion(99))));
    }

    #[test]
    fn test_ron_round_trip() {
        let mut session = session();
        session.add_track(scalar_track("a", &[(0.0, 0.0)]));
        let text = ron::to_string(&session).unwrap();
        let loaded: Session = ron::from_str(&text).unwrap();
        assert_eq!(loaded.track_count(), 1);
    }
}
