// SPDX-License-Identifier: MIT OR Apache-2.0
//! SMPTE timecode formatting and parsing.
//!
//! Drop-frame numbering follows the SMPTE 12M convention: at a nominal rate
//! of 30 (or 60) the first 2 (or 4) frame numbers of every minute are
//! skipped, except in minutes divisible by ten. The skipped numbers exist
//! only in the display sequence; the underlying frame count is continuous.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rate::Timebase;

/// Display format for a time value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimecodeFormat {
    /// `HH:MM:SS:FF` (`HH:MM:SS;FF` when drop-frame)
    #[default]
    Smpte,
    /// Integer frame count
    Frames,
    /// Seconds with millisecond precision, `s` suffix
    Seconds,
    /// Integer milliseconds, `ms` suffix
    Milliseconds,
}

/// Decomposed SMPTE timecode fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timecode {
    /// Hours
    pub hours: i64,
    /// Minutes (0-59)
    pub minutes: i64,
    /// Seconds (0-59)
    pub seconds: i64,
    /// Frame number within the second (0..nominal rate)
    pub frames: i64,
    /// Whether the fields use drop-frame numbering
    pub drop_frame: bool,
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.drop_frame { ';' } else { ':' };
        write!(
            f,
            "{:02}:{:02}:{:02}{}{:02}",
            self.hours, self.minutes, self.seconds, sep, self.frames
        )
    }
}

/// Error produced when parsing a timecode string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimecodeParseError {
    /// Input was empty or whitespace
    #[error("empty timecode")]
    Empty,

    /// A component was not a number, or the field count was wrong
    #[error("malformed timecode: {0:?}")]
    Malformed(String),

    /// A component exceeded its valid range
    #[error("timecode component out of range: {0:?}")]
    OutOfRange(String),

    /// The frame number does not exist in the drop-frame display sequence
    #[error("frame {frames:02} is dropped at minute {minutes:02}")]
    DroppedFrame {
        /// Minute field of the offending timecode
        minutes: i64,
        /// Frame field of the offending timecode
        frames: i64,
    },
}

impl Timebase {
    /// Frame numbers skipped per minute in drop-frame display (0 otherwise).
    fn dropped_per_minute(&self) -> i64 {
        if self.is_drop_frame() {
            self.nominal_rate() / 15
        } else {
            0
        }
    }

    /// Timecode fields for an exact frame index.
    pub fn timecode_for_frame(&self, frame: i64) -> Timecode {
        let nominal = self.nominal_rate();
        let mut display = frame.max(0);

        if self.is_drop_frame() {
            let dropped = self.dropped_per_minute();
            let per_minute = nominal * 60 - dropped;
            let per_ten_minutes = per_minute * 10 + dropped;

            let tens = display / per_ten_minutes;
            let rem = display % per_ten_minutes;
            display += dropped * 9 * tens;
            if rem > dropped {
                display += dropped * ((rem - dropped) / per_minute);
            }
        }

        let total_seconds = display / nominal;
        Timecode {
            hours: total_seconds / 3600,
            minutes: (total_seconds / 60) % 60,
            seconds: total_seconds % 60,
            frames: display % nominal,
            drop_frame: self.is_drop_frame(),
        }
    }

    /// Frame index for decomposed timecode fields.
    ///
    /// Returns an error if a field is out of range or, under drop-frame
    /// numbering, names a skipped frame number.
    pub fn frame_for_timecode(&self, tc: &Timecode) -> Result<i64, TimecodeParseError> {
        let nominal = self.nominal_rate();
        if tc.hours < 0 || !(0..60).contains(&tc.minutes) || !(0..60).contains(&tc.seconds) {
            return Err(TimecodeParseError::OutOfRange(tc.to_string()));
        }
        if !(0..nominal).contains(&tc.frames) {
            return Err(TimecodeParseError::OutOfRange(tc.to_string()));
        }

        let dropped = self.dropped_per_minute();
        if dropped > 0 && tc.seconds == 0 && tc.minutes % 10 != 0 && tc.frames < dropped {
            return Err(TimecodeParseError::DroppedFrame {
                minutes: tc.minutes,
                frames: tc.frames,
            });
        }

        let total_minutes = tc.hours * 60 + tc.minutes;
        let display = (total_minutes * 60 + tc.seconds) * nominal + tc.frames;
        Ok(display - dropped * (total_minutes - total_minutes / 10))
    }

    /// Format a time in seconds per the requested display format.
    pub fn format_timecode(&self, seconds: f64, format: TimecodeFormat) -> String {
        match format {
            TimecodeFormat::Smpte => self.timecode_for_frame(self.time_to_frame(seconds)).to_string(),
            TimecodeFormat::Frames => self.time_to_frame(seconds).to_string(),
            TimecodeFormat::Seconds => format!("{seconds:.3}s"),
            TimecodeFormat::Milliseconds => format!("{}ms", (seconds * 1000.0).round() as i64),
        }
    }

    /// Parse a timecode string in any of the [`TimecodeFormat`] shapes.
    ///
    /// SMPTE fields accept either `:` or `;` before the frame field; the
    /// numbering (drop-frame or not) always comes from this timebase.
    pub fn parse_timecode(&self, text: &str) -> Result<f64, TimecodeParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TimecodeParseError::Empty);
        }

        if let Some(ms) = text.strip_suffix("ms") {
            let ms: f64 = ms
                .trim()
                .parse()
                .map_err(|_| TimecodeParseError::Malformed(text.to_string()))?;
            return Ok(ms / 1000.0);
        }
        if let Some(secs) = text.strip_suffix('s') {
            return secs
                .trim()
                .parse()
                .map_err(|_| TimecodeParseError::Malformed(text.to_string()));
        }

        if text.contains(':') || text.contains(';') {
            let fields: Vec<i64> = text
                .split([':', ';'])
                .map(|part| {
                    part.parse()
                        .map_err(|_| TimecodeParseError::Malformed(text.to_string()))
                })
                .collect::<Result<_, _>>()?;
            let &[hours, minutes, seconds, frames] = fields.as_slice() else {
                return Err(TimecodeParseError::Malformed(text.to_string()));
            };
            let tc = Timecode {
                hours,
                minutes,
                seconds,
                frames,
                drop_frame: self.is_drop_frame(),
            };
            return Ok(self.frame_to_time(self.frame_for_timecode(&tc)?));
        }

        let frame: i64 = text
            .parse()
            .map_err(|_| TimecodeParseError::Malformed(text.to_string()))?;
        Ok(self.frame_to_time(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::Timebase;

    fn ntsc_df() -> Timebase {
        Timebase::new(29.97, true).unwrap()
    }

    #[test]
    fn test_non_drop_frame_display() {
        let tb = Timebase::new(30.0, false).unwrap();
        assert_eq!(tb.timecode_for_frame(0).to_string(), "00:00:00:00");
        assert_eq!(tb.timecode_for_frame(29).to_string(), "00:00:00:29");
        assert_eq!(tb.timecode_for_frame(30).to_string(), "00:00:01:00");
        assert_eq!(tb.timecode_for_frame(30 * 3600).to_string(), "01:00:00:00");
    }

    #[test]
    fn test_drop_frame_skips_minute_boundary() {
        let tb = ntsc_df();
        // Last frame of minute zero, then the skip to ;02
        assert_eq!(tb.timecode_for_frame(1799).to_string(), "00:00:59;29");
        assert_eq!(tb.timecode_for_frame(1800).to_string(), "00:01:00;02");
        assert_eq!(tb.timecode_for_frame(1801).to_string(), "00:01:00;03");
    }

    #[test]
    fn test_drop_frame_tenth_minute_does_not_skip() {
        let tb = ntsc_df();
        // 17982 frames = exactly ten minutes of 29.97
        assert_eq!(tb.timecode_for_frame(17982).to_string(), "00:10:00;00");
        assert_eq!(tb.timecode_for_frame(17983).to_string(), "00:10:00;01");
        // Minute 11 drops again
        assert_eq!(tb.timecode_for_frame(17982 + 1800).to_string(), "00:11:00;02");
    }

    #[test]
    fn test_drop_frame_59_94() {
        let tb = Timebase::new(59.94, true).unwrap();
        assert_eq!(tb.timecode_for_frame(3600).to_string(), "00:01:00;04");
        assert_eq!(tb.timecode_for_frame(3599).to_string(), "00:00:59;59");
    }

    #[test]
    fn test_timecode_frame_round_trip() {
        for (fps, drop) in [(24.0, false), (29.97, true), (30.0, false), (59.94, true)] {
            let tb = Timebase::new(fps, drop).unwrap();
            for frame in [0, 1, 1799, 1800, 17981, 17982, 107_892, 1_078_920] {
                let tc = tb.timecode_for_frame(frame);
                assert_eq!(tb.frame_for_timecode(&tc).unwrap(), frame, "{fps} fps frame {frame}");
            }
        }
    }

    #[test]
    fn test_parse_rejects_dropped_frame_numbers() {
        let tb = ntsc_df();
        assert!(matches!(
            tb.parse_timecode("00:01:00;00"),
            Err(TimecodeParseError::DroppedFrame { minutes: 1, frames: 0 })
        ));
        assert!(matches!(
            tb.parse_timecode("00:01:00;01"),
            Err(TimecodeParseError::DroppedFrame { minutes: 1, frames: 1 })
        ));
        // Tenth minutes keep all frame numbers
        assert!(tb.parse_timecode("00:10:00;00").is_ok());
    }

    #[test]
    fn test_parse_all_formats() {
        let tb = Timebase::new(30.0, false).unwrap();
        assert_eq!(tb.parse_timecode("90").unwrap(), 3.0);
        assert_eq!(tb.parse_timecode("1.500s").unwrap(), 1.5);
        assert_eq!(tb.parse_timecode("1500ms").unwrap(), 1.5);
        assert_eq!(tb.parse_timecode("00:00:02:00").unwrap(), 2.0);
        assert!(matches!(tb.parse_timecode(""), Err(TimecodeParseError::Empty)));
        assert!(matches!(tb.parse_timecode("00:02:00"), Err(TimecodeParseError::Malformed(_))));
        assert!(matches!(tb.parse_timecode("00:00:02:30"), Err(TimecodeParseError::OutOfRange(_))));
        assert!(matches!(tb.parse_timecode("abc"), Err(TimecodeParseError::Malformed(_))));
    }

    #[test]
    fn test_format_timecode_formats() {
        let tb = Timebase::new(30.0, false).unwrap();
        assert_eq!(tb.format_timecode(2.5, TimecodeFormat::Smpte), "00:00:02:15");
        assert_eq!(tb.format_timecode(2.5, TimecodeFormat::Frames), "75");
        assert_eq!(tb.format_timecode(2.5, TimecodeFormat::Seconds), "2.500s");
        assert_eq!(tb.format_timecode(2.5, TimecodeFormat::Milliseconds), "2500ms");
    }

    #[test]
    fn test_format_parse_round_trip_drop_frame() {
        let tb = ntsc_df();
        let formatted = tb.format_timecode(60.06006006006006, TimecodeFormat::Smpte);
        assert_eq!(formatted, "00:01:00;02");
        let parsed = tb.parse_timecode(&formatted).unwrap();
        assert_eq!(tb.time_to_frame(parsed), 1800);
    }
}
