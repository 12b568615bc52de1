//! Core data types shared by the pipeline stages.

use serde::{Deserialize, Serialize};

/// Number of accelerometer axes.
pub const AXES: usize = 3;

/// Index of pitch in an inclinometer value vector.
pub const PITCH_INDEX: usize = 0;
/// Index of roll in an inclinometer value vector.
pub const ROLL_INDEX: usize = 1;

/// A measurement stamped with the sensor clock.
///
/// Timestamps are nanoseconds on the sensor's own monotonic clock. They are
/// only comparable to other timestamps from the same sensor, never to wall
/// clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<T> {
    /// Sensor clock timestamp (ns)
    pub timestamp_ns: i64,
    /// Measured values
    pub values: T,
}

impl<T> Sample<T> {
    /// Create a new sample.
    #[inline]
    pub fn new(timestamp_ns: i64, values: T) -> Self {
        Self {
            timestamp_ns,
            values,
        }
    }

    /// Map the values while preserving the timestamp.
    #[inline]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Sample<U> {
        Sample {
            timestamp_ns: self.timestamp_ns,
            values: f(self.values),
        }
    }
}

/// Accelerometer sample, x/y/z in m/s².
pub type AccelSample = Sample<[f32; AXES]>;

/// Device rotation as reported by the host.
///
/// Landscape does not say which side faces down; that is learned from
/// live accelerometer data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceRotation {
    #[default]
    Portrait,
    Landscape,
}

/// Resolved orientation of the device frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationMode {
    /// Upright, screen facing the user
    Portrait,
    /// Rotated onto its left edge
    LandscapeLeftDown,
    /// Rotated onto its right edge
    LandscapeRightDown,
}

/// Axis sign, either +1 or -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSign {
    Positive,
    Negative,
}

impl AxisSign {
    /// Apply the sign to a value.
    #[inline]
    pub fn apply(self, value: f32) -> f32 {
        match self {
            AxisSign::Positive => value,
            AxisSign::Negative => -value,
        }
    }
}

/// Remapping of raw sensor axes onto logical device axes.
///
/// Output axis `i` is `signs[i] * raw[indices[i]]`. The indices always
/// form a permutation of {0, 1, 2}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMapping {
    indices: [usize; AXES],
    signs: [AxisSign; AXES],
}

impl AxisMapping {
    /// Create a mapping, or `None` if `indices` is not a permutation.
    pub fn new(indices: [usize; AXES], signs: [AxisSign; AXES]) -> Option<Self> {
        let mut seen = [false; AXES];
        for &i in &indices {
            if i >= AXES || seen[i] {
                return None;
            }
            seen[i] = true;
        }
        Some(Self { indices, signs })
    }

    /// Portrait: axes unchanged, z reflected.
    pub const fn portrait() -> Self {
        Self {
            indices: [0, 1, 2],
            signs: [AxisSign::Positive, AxisSign::Positive, AxisSign::Negative],
        }
    }

    /// Landscape, left side down: x and y swapped.
    pub const fn landscape_left_down() -> Self {
        Self {
            indices: [1, 0, 2],
            signs: [AxisSign::Negative, AxisSign::Positive, AxisSign::Negative],
        }
    }

    /// Landscape, right side down: x and y swapped, mirrored.
    pub const fn landscape_right_down() -> Self {
        Self {
            indices: [1, 0, 2],
            signs: [AxisSign::Positive, AxisSign::Negative, AxisSign::Negative],
        }
    }

    /// Source index for each output axis.
    pub fn indices(&self) -> [usize; AXES] {
        self.indices
    }

    /// Sign applied to each output axis.
    pub fn signs(&self) -> [AxisSign; AXES] {
        self.signs
    }

    /// Remap a raw vector.
    #[inline]
    pub fn apply(&self, raw: [f32; AXES]) -> [f32; AXES] {
        [
            self.signs[0].apply(raw[self.indices[0]]),
            self.signs[1].apply(raw[self.indices[1]]),
            self.signs[2].apply(raw[self.indices[2]]),
        ]
    }

    /// Raw vector that [`apply`](Self::apply) maps onto `mapped`.
    pub fn invert(&self, mapped: [f32; AXES]) -> [f32; AXES] {
        let mut raw = [0.0f32; AXES];
        for axis in 0..AXES {
            raw[self.indices[axis]] = self.signs[axis].apply(mapped[axis]);
        }
        raw
    }
}

impl Default for AxisMapping {
    fn default() -> Self {
        Self::portrait()
    }
}

/// Pitch and roll in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PitchRoll {
    /// Forward/backward tilt (degrees)
    pub pitch_deg: f64,
    /// Side-to-side tilt (degrees)
    pub roll_deg: f64,
}

impl PitchRoll {
    /// Create a new reading.
    pub fn new(pitch_deg: f64, roll_deg: f64) -> Self {
        Self {
            pitch_deg,
            roll_deg,
        }
    }

    /// Value vector delivered to inclinometer listeners: `[pitch, roll]`.
    pub fn to_values(self) -> [f32; 2] {
        let mut values = [0.0f32; 2];
        values[PITCH_INDEX] = self.pitch_deg as f32;
        values[ROLL_INDEX] = self.roll_deg as f32;
        values
    }

    /// Parse a listener value vector back into a reading.
    pub fn from_values(values: &[f32]) -> Option<Self> {
        if values.len() != 2 {
            return None;
        }
        Some(Self::new(
            values[PITCH_INDEX] as f64,
            values[ROLL_INDEX] as f64,
        ))
    }
}

/// Pitch/roll correction added to every computed reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationOffset {
    /// Added to computed pitch (degrees)
    pub pitch_offset_deg: f64,
    /// Added to computed roll (degrees)
    pub roll_offset_deg: f64,
}
