//! Sensor processing layer.
//!
//! Three chained stages, each a [`listener::Sensor`] that is itself a
//! listener of the stage below it:
//!
//! - [`accelerometer`]: raw chip-frame samples from the host
//! - [`orientation`]: axis remapping for the current device rotation
//! - [`inclinometer`]: filtered, calibrated, rate-limited pitch and roll
//!
//! Building blocks:
//!
//! - [`listener`]: listener registry and the `Sensor` trait
//! - [`filter`]: time-windowed moving average
//! - [`calibration`]: "zero here" offsets

pub mod accelerometer;
pub mod calibration;
pub mod filter;
pub mod inclinometer;
pub mod listener;
pub mod orientation;
