//! Mock accelerometer for hardware-free runs and tests.
//!
//! Produces the chip-frame reading a real device would report for a given
//! vehicle attitude and device rotation, plus Gaussian noise.
//!
//! ## Frames
//!
//! In the device frame a level, upright device reads gravity along +y.
//! For pitch `P` and roll `R` (both within ±90°) the device-frame vector is
//! proportional to `(-tan R, 1, tan P)`, scaled to 1 g. The chip-frame
//! reading is that vector pushed back through the orientation mapping for
//! the configured rotation.

mod noise;

pub use noise::AxisNoise;

use crate::config::SimulationConfig;
use crate::core::types::{AxisMapping, DeviceRotation, AXES};
use crate::error::{Error, Result};
use crate::sensors::accelerometer::AccelerometerBackend;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Standard gravity (m/s²)
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Device-frame gravity reading for a vehicle attitude.
///
/// Pitch and roll must lie strictly within ±90°.
pub fn gravity_vector(pitch_deg: f64, roll_deg: f64) -> Result<[f32; AXES]> {
    if pitch_deg.abs() >= 90.0 || roll_deg.abs() >= 90.0 {
        return Err(Error::InvalidParameter(format!(
            "attitude out of range: pitch {} roll {}",
            pitch_deg, roll_deg
        )));
    }
    let x = -roll_deg.to_radians().tan();
    let y = 1.0;
    let z = pitch_deg.to_radians().tan();
    let scale = STANDARD_GRAVITY as f64 / (x * x + y * y + z * z).sqrt();
    Ok([(x * scale) as f32, (y * scale) as f32, (z * scale) as f32])
}

/// Mapping the real device would need for a rotation/side combination.
fn mapping_for(rotation: DeviceRotation, right_down: bool) -> AxisMapping {
    match rotation {
        DeviceRotation::Portrait => AxisMapping::portrait(),
        DeviceRotation::Landscape if right_down => AxisMapping::landscape_right_down(),
        DeviceRotation::Landscape => AxisMapping::landscape_left_down(),
    }
}

struct MockState {
    noise: AxisNoise,
    device_frame: [f32; AXES],
    mapping: AxisMapping,
}

/// Simulated accelerometer backend.
pub struct MockAccelerometer {
    running: AtomicBool,
    state: Mutex<MockState>,
}

impl MockAccelerometer {
    /// Create from simulation config.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let device_frame = gravity_vector(config.pitch_deg, config.roll_deg)?;
        Ok(Self {
            running: AtomicBool::new(false),
            state: Mutex::new(MockState {
                noise: AxisNoise::new(config.random_seed, config.noise_stddev)?,
                device_frame,
                mapping: mapping_for(config.rotation, config.landscape_right_down),
            }),
        })
    }

    /// Whether the pipeline has asked for data.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Change the simulated vehicle attitude.
    pub fn set_attitude(&self, pitch_deg: f64, roll_deg: f64) -> Result<()> {
        let device_frame = gravity_vector(pitch_deg, roll_deg)?;
        self.state.lock().device_frame = device_frame;
        Ok(())
    }

    /// Physically rotate the simulated device.
    pub fn set_rotation(&self, rotation: DeviceRotation, right_down: bool) {
        self.state.lock().mapping = mapping_for(rotation, right_down);
    }

    /// Next chip-frame reading.
    pub fn sample(&self) -> [f32; AXES] {
        let mut state = self.state.lock();
        let raw = state.mapping.invert(state.device_frame);
        state.noise.apply(raw)
    }
}

impl AccelerometerBackend for MockAccelerometer {
    fn start(&self) {
        log::info!("Mock accelerometer: started");
        self.running.store(true, Ordering::Relaxed);
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::Relaxed) {
            log::info!("Mock accelerometer: stopped");
        }
    }
}
