//! Accelerometer backends
//!
//! - `mock`: simulated accelerometer (feature `mock`)

#[cfg(feature = "mock")]
pub mod mock;
