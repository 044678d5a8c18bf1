// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame-rate configuration and frame/time conversions.

use serde::{Deserialize, Serialize};

/// Error produced when constructing an invalid [`Timebase`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimebaseError {
    /// Frame rate was zero, negative, or not finite
    #[error("frame rate must be finite and positive, got {0}")]
    InvalidFrameRate(f64),

    /// Drop-frame was requested for a rate outside the 29.97/59.94 family
    #[error("drop-frame timecode is not defined for {0} fps")]
    InvalidDropFrameRate(f64),
}

/// Broadcast standard a frame rate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoStandard {
    /// Cinema rates (23.976, 24)
    Film,
    /// NTSC rates (29.97, 30, 59.94)
    Ntsc,
    /// PAL rates (25, 50)
    Pal,
    /// Web/high-speed rates (60, 120, 240)
    Web,
}

/// A named frame-rate preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRatePreset {
    /// Frames per second
    pub fps: f64,
    /// Display name
    pub name: &'static str,
    /// Broadcast standard
    pub standard: VideoStandard,
    /// Whether timecode at this rate uses drop-frame numbering
    pub drop_frame: bool,
}

/// Common project frame rates
pub const FRAME_RATE_PRESETS: [FrameRatePreset; 10] = [
    FrameRatePreset { fps: 23.976, name: "23.976 fps (Film)", standard: VideoStandard::Film, drop_frame: false },
    FrameRatePreset { fps: 24.0, name: "24 fps (Cinema)", standard: VideoStandard::Film, drop_frame: false },
    FrameRatePreset { fps: 25.0, name: "25 fps (PAL)", standard: VideoStandard::Pal, drop_frame: false },
    FrameRatePreset { fps: 29.97, name: "29.97 fps (NTSC)", standard: VideoStandard::Ntsc, drop_frame: true },
    FrameRatePreset { fps: 30.0, name: "30 fps", standard: VideoStandard::Ntsc, drop_frame: false },
    FrameRatePreset { fps: 50.0, name: "50 fps (PAL)", standard: VideoStandard::Pal, drop_frame: false },
    FrameRatePreset { fps: 59.94, name: "59.94 fps (NTSC)", standard: VideoStandard::Ntsc, drop_frame: true },
    FrameRatePreset { fps: 60.0, name: "60 fps", standard: VideoStandard::Web, drop_frame: false },
    FrameRatePreset { fps: 120.0, name: "120 fps (High Speed)", standard: VideoStandard::Web, drop_frame: false },
    FrameRatePreset { fps: 240.0, name: "240 fps (Ultra High Speed)", standard: VideoStandard::Web, drop_frame: false },
];

/// Frame-rate aware conversions between seconds and frame indices.
///
/// Validated at construction; conversions themselves never fail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timebase {
    fps: f64,
    drop_frame: bool,
}

impl Timebase {
    /// Create a timebase.
    ///
    /// `fps` must be finite and positive. `drop_frame` is only accepted for
    /// rates in the 29.97/59.94 family (nominal rate divisible by 30, true
    /// rate slightly below it).
    pub fn new(fps: f64, drop_frame: bool) -> Result<Self, TimebaseError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(TimebaseError::InvalidFrameRate(fps));
        }
        if drop_frame {
            let nominal = fps.round();
            if nominal % 30.0 != 0.0 || fps >= nominal {
                return Err(TimebaseError::InvalidDropFrameRate(fps));
            }
        }
        Ok(Self { fps, drop_frame })
    }

    /// Create a timebase from a preset.
    pub fn from_preset(preset: &FrameRatePreset) -> Self {
        // Presets are validated by construction
        Self {
            fps: preset.fps,
            drop_frame: preset.drop_frame,
        }
    }

    /// Frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Whether timecode uses drop-frame numbering.
    pub fn is_drop_frame(&self) -> bool {
        self.drop_frame
    }

    /// Nominal (integer) frame rate used for timecode display, at least 1.
    pub fn nominal_rate(&self) -> i64 {
        self.fps.round().max(1.0) as i64
    }

    /// Convert a frame index to seconds.
    pub fn frame_to_time(&self, frame: i64) -> f64 {
        frame as f64 / self.fps
    }

    /// Convert seconds to the nearest frame index.
    ///
    /// Rounds half away from zero: at 30 fps, 0.05 s (exactly 1.5 frames)
    /// maps to frame 2.
    pub fn time_to_frame(&self, seconds: f64) -> i64 {
        (seconds * self.fps).round() as i64
    }

    /// Round a time to the nearest frame boundary.
    pub fn snap_to_frame(&self, seconds: f64) -> f64 {
        (seconds * self.fps).round() / self.fps
    }
}
