//! Mounting-angle calibration.
//!
//! The device can be mounted at any angle. Zeroing stores the negation of
//! the current reading so that the mounting angle reads as level from then
//! on.
//!
//! # Usage
//!
//! ```
//! use samatal::core::types::PitchRoll;
//! use samatal::sensors::calibration::CalibrationState;
//!
//! let mut calibration = CalibrationState::new();
//! calibration.zero_at(PitchRoll::new(4.0, -2.5));
//!
//! let level = calibration.apply(PitchRoll::new(4.0, -2.5));
//! assert_eq!(level, PitchRoll::new(0.0, 0.0));
//! ```

use crate::core::types::{CalibrationOffset, PitchRoll};

/// Holds the pitch/roll offsets for the process lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalibrationState {
    offset: CalibrationOffset,
}

impl CalibrationState {
    /// Start uncalibrated (zero offsets).
    pub fn new() -> Self {
        Self::default()
    }

    /// Current offsets.
    pub fn offset(&self) -> CalibrationOffset {
        self.offset
    }

    /// Whether any offset has been set.
    pub fn is_calibrated(&self) -> bool {
        self.offset != CalibrationOffset::default()
    }

    /// Make `raw` (an uncorrected reading) the new zero.
    pub fn zero_at(&mut self, raw: PitchRoll) -> CalibrationOffset {
        self.offset = CalibrationOffset {
            pitch_offset_deg: -raw.pitch_deg,
            roll_offset_deg: -raw.roll_deg,
        };
        log::info!(
            "Calibration offsets set: pitch {:+.2}°, roll {:+.2}°",
            self.offset.pitch_offset_deg,
            self.offset.roll_offset_deg
        );
        self.offset
    }

    /// Add the offsets to an uncorrected reading.
    #[inline]
    pub fn apply(&self, raw: PitchRoll) -> PitchRoll {
        PitchRoll {
            pitch_deg: raw.pitch_deg + self.offset.pitch_offset_deg,
            roll_deg: raw.roll_deg + self.offset.roll_offset_deg,
        }
    }

    /// Back to zero offsets. Only ever done on request.
    pub fn reset(&mut self) {
        self.offset = CalibrationOffset::default();
    }
}
