// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe animation and time-remapping engine for VeloStudio.
//!
//! This crate provides the time-domain core of the studio:
//! - Easing curve catalogue (linear, quadratic, bounce, spring, bezier, ...)
//! - Keyframe tracks with sorted storage and point-in-time evaluation
//! - Speed controls and wall-to-source time integration
//! - A session object owning tracks, controls, and the global speed
//!
//! ## Architecture
//!
//! The engine is a pure function of time. A host playback loop owns the
//! clock and calls [`Session::tick`] each frame to advance the source time,
//! then [`Session::values_at`] to resolve property values for rendering.
//! Rendering, undo logging, and persistence live outside this crate; the
//! data model derives `serde` so hosts can serialize it verbatim.
//!
//! ## Concurrency
//!
//! Single-threaded and cooperative. Queries take `&self` and allocate only
//! their results, so tracks and controls are effectively immutable during a
//! render pass and may be read from multiple threads as long as no writer
//! holds `&mut` — which the borrow checker enforces.

pub mod binding;
pub mod easing;
pub mod keyframe;
pub mod session;
pub mod speed;
pub mod track;

pub use binding::{ElementId, TimeDomain, TrackBinding};
pub use easing::{Easing, EasingKind};
pub use keyframe::{
    InterpolationMode, Keyframe, KeyframeId, KeyframeUpdate, PropertyMap, PropertyValue,
    TIME_EPSILON,
};
pub use session::{DocumentError, KeyframeClipboard, PlaybackClock, Session};
pub use speed::{
    SpeedControl, SpeedControlId, SpeedKeyframe, SpeedPreset, SpeedProfile, SpeedRemap,
    SPEED_PRESETS,
};
pub use track::{AnimationTrack, TrackId};
