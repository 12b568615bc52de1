//! Samatal - accelerometer inclinometer for leveling vehicle-mounted devices
//!
//! Turns raw tri-axis accelerometer samples into a steady pitch/roll
//! reading, whatever the mounting angle and whether the device sits in
//! portrait or landscape.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  service: InclinometerService (wiring)        │
//! └──────────────────────────────────────────────┘
//!                       │
//! ┌──────────────────────────────────────────────┐
//! │  sensors: accelerometer → orientation →       │
//! │           inclinometer (filter, calibration)  │
//! └──────────────────────────────────────────────┘
//!                       │
//! ┌──────────────────────────────────────────────┐
//! │  core: types, math, clock                     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - `mock`: simulated accelerometer backend (enabled by default)

pub mod config;
pub mod core;
pub mod devices;
pub mod error;
pub mod sensors;
pub mod service;

// Re-export commonly used types
pub use config::AppConfig;
pub use crate::core::types::{CalibrationOffset, DeviceRotation, OrientationMode, PitchRoll};
pub use error::{Error, Result};
pub use sensors::accelerometer::AccelerometerBackend;
pub use sensors::inclinometer::InclinometerConfig;
pub use sensors::listener::{FnListener, ListenerHandle, SensorListener};
pub use service::{InclinometerService, SensorKind};
