//! Core foundation layer.
//!
//! No internal dependencies; the sensor stages build on it.
//!
//! # Contents
//!
//! - [`types`]: Samples, axis mappings, pitch/roll and calibration offsets
//! - [`math`]: Degree wrapping and trig helpers
//! - [`clock`]: Injectable monotonic clocks

pub mod clock;
pub mod math;
pub mod types;
