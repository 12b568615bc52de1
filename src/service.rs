//! Composition root for the sensor pipeline.
//!
//! Builds the three stages once and wires them:
//!
//! ```text
//! host ─► Accelerometer ─► OrientedAccelerometer ─► Inclinometer ─► UI listeners
//! ```
//!
//! Collaborators share the service by `Arc` instead of reaching for global
//! singletons. Subscribing to any stage cascades enablement down to the
//! hardware backend; removing the last subscriber cascades the stop.

use crate::core::clock::{Clock, MonotonicClock};
use crate::core::types::{CalibrationOffset, DeviceRotation, PitchRoll};
use crate::error::Result;
use crate::sensors::accelerometer::{Accelerometer, AccelerometerBackend};
use crate::sensors::inclinometer::{Inclinometer, InclinometerConfig};
use crate::sensors::listener::{ListenerHandle, Sensor};
use crate::sensors::orientation::{OrientationCorrector, OrientedAccelerometer};
use std::fmt;
use std::sync::Arc;

/// Pipeline stage a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Raw chip-frame `[x, y, z]` (m/s²)
    Accelerometer,
    /// Device-frame `[x, y, z]` (m/s²)
    OrientedAccelerometer,
    /// `[pitch, roll]` (degrees)
    Inclinometer,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorKind::Accelerometer => Accelerometer::NAME,
            SensorKind::OrientedAccelerometer => OrientedAccelerometer::NAME,
            SensorKind::Inclinometer => Inclinometer::NAME,
        };
        f.write_str(name)
    }
}

/// The process-wide inclinometer pipeline.
pub struct InclinometerService {
    accelerometer: Arc<Accelerometer>,
    oriented: Arc<OrientedAccelerometer>,
    inclinometer: Arc<Inclinometer>,
}

impl InclinometerService {
    /// Build the pipeline on top of a hardware backend.
    pub fn new(
        backend: Arc<dyn AccelerometerBackend>,
        config: InclinometerConfig,
        rotation: DeviceRotation,
    ) -> Self {
        Self::with_clock(backend, config, rotation, Arc::new(MonotonicClock::new()))
    }

    /// Build the pipeline with an explicit rate-limit clock.
    pub fn with_clock(
        backend: Arc<dyn AccelerometerBackend>,
        config: InclinometerConfig,
        rotation: DeviceRotation,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let accelerometer = Arc::new(Accelerometer::new(backend));
        let oriented = OrientedAccelerometer::new(Arc::clone(&accelerometer));
        let inclinometer = Inclinometer::with_clock(Arc::clone(&oriented), config, clock);

        oriented.set_orientation(rotation);
        log::info!(
            "Inclinometer pipeline ready ({:?}, window {} ms, output every >{} ms)",
            rotation,
            config.expiration_ns / 1_000_000,
            config.notify_interval_ms
        );

        Self {
            accelerometer,
            oriented,
            inclinometer,
        }
    }

    /// Subscribe `listener` to a stage.
    pub fn register_listener(&self, kind: SensorKind, listener: ListenerHandle) {
        log::debug!("Registering listener on {}", kind);
        self.sensor(kind).register_listener(listener);
    }

    /// Unsubscribe `listener` from a stage. Unknown listeners are logged.
    pub fn unregister_listener(&self, kind: SensorKind, listener: &ListenerHandle) {
        log::debug!("Unregistering listener from {}", kind);
        self.sensor(kind).unregister_listener(listener);
    }

    /// Number of listeners subscribed to a stage, including pipeline stages.
    pub fn listener_count(&self, kind: SensorKind) -> usize {
        self.sensor(kind).registry().len()
    }

    /// Make the current reading the new zero.
    pub fn update_offsets(&self) -> Result<CalibrationOffset> {
        self.inclinometer.update_offsets()
    }

    /// Restore zero offsets.
    pub fn reset_offsets(&self) {
        self.inclinometer.reset_offsets();
    }

    /// Current calibration offsets.
    pub fn calibration(&self) -> CalibrationOffset {
        self.inclinometer.calibration()
    }

    /// Last computed reading, including rate-limited ones.
    pub fn latest_reading(&self) -> Option<PitchRoll> {
        self.inclinometer.latest()
    }

    /// Host detected a device rotation.
    pub fn set_orientation(&self, rotation: DeviceRotation) {
        self.oriented.set_orientation(rotation);
    }

    /// Orientation state of the corrector.
    pub fn orientation(&self) -> OrientationCorrector {
        self.oriented.corrector()
    }

    /// Hardware sample entry point.
    pub fn on_sensor_changed(&self, timestamp_ns: i64, values: &[f32]) {
        self.accelerometer.on_sensor_changed(timestamp_ns, values);
    }

    /// Hardware accuracy entry point.
    pub fn on_accuracy_changed(&self, accuracy: i32) {
        self.accelerometer.on_accuracy_changed(accuracy);
    }

    /// Tear the pipeline down, top stage first, and stop the hardware.
    pub fn destroy(&self) {
        log::info!("Destroying inclinometer pipeline");
        self.inclinometer.destroy();
        self.oriented.destroy();
        self.accelerometer.destroy();
    }

    fn sensor(&self, kind: SensorKind) -> &dyn Sensor {
        match kind {
            SensorKind::Accelerometer => self.accelerometer.as_ref(),
            SensorKind::OrientedAccelerometer => self.oriented.as_ref(),
            SensorKind::Inclinometer => self.inclinometer.as_ref(),
        }
    }
}
