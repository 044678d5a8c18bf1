// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame-rate aware time arithmetic for VeloStudio.
//!
//! This crate provides the timebase shared by the animation and playback
//! layers:
//! - Conversions between continuous time, frame index, and SMPTE timecode
//! - Drop-frame timecode for the 29.97/59.94 family
//! - Timecode formatting and parsing in four display formats
//! - A catalogue of broadcast frame-rate presets
//!
//! ## Architecture
//!
//! A [`Timebase`] is an immutable value validated at construction; every
//! conversion is a pure function of it. Nothing here performs I/O.

pub mod rate;
pub mod timecode;

pub use rate::{FrameRatePreset, Timebase, TimebaseError, VideoStandard, FRAME_RATE_PRESETS};
pub use timecode::{Timecode, TimecodeFormat, TimecodeParseError};
