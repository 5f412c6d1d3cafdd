//! SMPTE style `HH:MM:SS:FF` timecodes.

use serde::Serialize;
use std::fmt;

/// Non-drop-frame timecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timecode {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
}

impl Timecode {
    /// Convert a position in seconds.
    ///
    /// The frame field is the fractional second scaled by `fps` and rounded
    /// half to even. A result equal to `fps` carries into the seconds.
    /// Hours wrap at 24 and negative times clamp to zero.
    ///
    /// ```
    /// use ed5_common::Timecode;
    ///
    /// assert_eq!(Timecode::from_seconds(90.5, 30).to_string(), "00:01:30:15");
    /// ```
    pub fn from_seconds(t: f64, fps: u32) -> Self {
        let t = if t.is_finite() { t.max(0.0) } else { 0.0 };
        let mut whole = t.floor() as u64;
        let mut frames = ((t - t.floor()) * fps as f64).round_ties_even() as u64;
        if fps > 0 && frames >= fps as u64 {
            whole += frames / fps as u64;
            frames %= fps as u64;
        }

        Self {
            hours: ((whole / 3600) % 24) as u32,
            minutes: ((whole / 60) % 60) as u32,
            seconds: (whole % 60) as u32,
            frames: frames as u32,
        }
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

/// Position in seconds as a whole frame count, rounded half to even.
pub fn frames_at(t: f64, fps: u32) -> i64 {
    (t * fps as f64).round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seconds() {
        assert_eq!(Timecode::from_seconds(0.0, 25).to_string(), "00:00:00:00");
        assert_eq!(Timecode::from_seconds(90.5, 30).to_string(), "00:01:30:15");
        assert_eq!(Timecode::from_seconds(3723.04, 25).to_string(), "01:02:03:01");
    }

    #[test]
    fn test_frame_carry() {
        // 0.99 * 25 = 24.75 -> 25 frames, one full second
        assert_eq!(Timecode::from_seconds(1.99, 25).to_string(), "00:00:02:00");
    }

    #[test]
    fn test_half_frame_rounds_to_even() {
        // 0.1 * 25 = 2.5
        assert_eq!(Timecode::from_seconds(0.1, 25).frames, 2);
        assert_eq!(frames_at(0.5, 25), 12);
        assert_eq!(frames_at(0.5, 30), 15);
    }

    #[test]
    fn test_hours_wrap() {
        assert_eq!(Timecode::from_seconds(86_401.0, 25).to_string(), "00:00:01:00");
    }

    #[test]
    fn test_negative_clamps() {
        assert_eq!(Timecode::from_seconds(-3.0, 25).to_string(), "00:00:00:00");
    }
}
