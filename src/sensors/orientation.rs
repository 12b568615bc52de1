//! Orientation-corrected accelerometer.
//!
//! The accelerometer chip reports in its own frame, which depends on how the
//! device is rotated. [`OrientationCorrector`] remaps and reflects the raw
//! axes into the logical device frame:
//!
//! | Rotation             | Indices   | Signs      |
//! |----------------------|-----------|------------|
//! | Portrait             | (0, 1, 2) | (+, +, -)  |
//! | Landscape, left down | (1, 0, 2) | (-, +, -)  |
//! | Landscape, right down| (1, 0, 2) | (+, -, -)  |
//!
//! Rotation metadata only says "landscape". Which edge faces down is learned
//! from the sign of the raw x axis on the first sample after the change.
//!
//! [`OrientedAccelerometer`] is the pipeline stage wrapping the corrector.
//! Every orientation change is announced downstream on the accuracy channel
//! so consumers drop samples averaged in the old frame.
//!
//! # Frame gate
//!
//! Correction and fan-out of a sample run under a shared read guard; the
//! mapping swap and the frame-change notice run under the write guard. A
//! sample corrected in the old frame is therefore fully delivered before
//! downstream clears, and never lands in the new frame's window. Listeners
//! must not call `set_orientation` from inside a data callback.

use super::accelerometer::Accelerometer;
use super::listener::{ListenerHandle, ListenerRegistry, Sensor, SensorListener};
use crate::core::types::{AxisMapping, DeviceRotation, OrientationMode, AXES};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};

/// Accuracy code announced downstream when the frame changes.
pub const FRAME_CHANGED: i32 = 0;

/// Axis remapping state machine.
#[derive(Debug, Clone, Copy)]
pub struct OrientationCorrector {
    rotation: DeviceRotation,
    mapping: AxisMapping,
    resolved: bool,
}

impl OrientationCorrector {
    /// Start in portrait.
    pub fn new() -> Self {
        Self {
            rotation: DeviceRotation::Portrait,
            mapping: AxisMapping::portrait(),
            resolved: true,
        }
    }

    /// Reconfigure for a new device rotation.
    ///
    /// Landscape installs a provisional left-down mapping and leaves the
    /// corrector unresolved until the next sample.
    pub fn set_orientation(&mut self, rotation: DeviceRotation) {
        self.rotation = rotation;
        match rotation {
            DeviceRotation::Portrait => {
                log::debug!("Setting orientation to portrait");
                self.mapping = AxisMapping::portrait();
                self.resolved = true;
            }
            DeviceRotation::Landscape => {
                log::debug!("Setting orientation to landscape (side unresolved)");
                self.mapping = AxisMapping::landscape_left_down();
                self.resolved = false;
            }
        }
    }

    /// Correct a raw sample, resolving the landscape side first if needed.
    pub fn correct(&mut self, raw: [f32; AXES]) -> [f32; AXES] {
        if !self.resolved {
            self.resolve_landscape(raw[0]);
        }
        self.mapping.apply(raw)
    }

    fn resolve_landscape(&mut self, raw_x: f32) {
        if raw_x < 0.0 {
            log::debug!("Landscape resolved: right side down (raw x = {})", raw_x);
            self.mapping = AxisMapping::landscape_right_down();
        } else {
            log::debug!("Landscape resolved: left side down (raw x = {})", raw_x);
            self.mapping = AxisMapping::landscape_left_down();
        }
        self.resolved = true;
    }

    /// Last rotation reported by the host.
    pub fn rotation(&self) -> DeviceRotation {
        self.rotation
    }

    /// Mapping currently applied.
    pub fn mapping(&self) -> AxisMapping {
        self.mapping
    }

    /// Whether the frame is fully known.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Resolved orientation, `None` while the landscape side is unknown.
    pub fn orientation(&self) -> Option<OrientationMode> {
        if !self.resolved {
            return None;
        }
        Some(match self.rotation {
            DeviceRotation::Portrait => OrientationMode::Portrait,
            DeviceRotation::Landscape if self.mapping == AxisMapping::landscape_right_down() => {
                OrientationMode::LandscapeRightDown
            }
            DeviceRotation::Landscape => OrientationMode::LandscapeLeftDown,
        })
    }
}

impl Default for OrientationCorrector {
    fn default() -> Self {
        Self::new()
    }
}

/// Pipeline stage: raw accelerometer in, device-frame accelerometer out.
pub struct OrientedAccelerometer {
    registry: ListenerRegistry,
    corrector: Mutex<OrientationCorrector>,
    frame: RwLock<()>,
    upstream: Arc<Accelerometer>,
    this: Weak<OrientedAccelerometer>,
}

impl OrientedAccelerometer {
    /// Sensor name used in logs and errors.
    pub const NAME: &'static str = "oriented-accelerometer";

    /// Create the stage on top of the raw accelerometer.
    pub fn new(upstream: Arc<Accelerometer>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            registry: ListenerRegistry::new(Self::NAME),
            corrector: Mutex::new(OrientationCorrector::new()),
            frame: RwLock::new(()),
            upstream,
            this: this.clone(),
        })
    }

    /// Host detected a device rotation.
    ///
    /// Always announces a frame change downstream, even when the rotation
    /// is unchanged. Waits for in-flight samples of the old frame to finish
    /// delivery first.
    pub fn set_orientation(&self, rotation: DeviceRotation) {
        let _frame = self.frame.write();
        self.corrector.lock().set_orientation(rotation);
        self.registry.notify_accuracy_changed(FRAME_CHANGED);
    }

    /// Copy of the corrector state.
    pub fn corrector(&self) -> OrientationCorrector {
        *self.corrector.lock()
    }

    /// Drop all listeners and detach from the raw accelerometer.
    pub fn destroy(&self) {
        if self.registry.clear() > 0 {
            self.disable();
        }
    }

    fn handle(&self) -> Option<ListenerHandle> {
        self.this.upgrade().map(|me| me as ListenerHandle)
    }
}

impl SensorListener for OrientedAccelerometer {
    fn on_data_received(&self, timestamp_ns: i64, values: &[f32]) {
        let Ok(raw) = <[f32; AXES]>::try_from(values) else {
            log::error!(
                "{}: expected {} values, got {}; sample dropped",
                Self::NAME,
                AXES,
                values.len()
            );
            return;
        };

        let _frame = self.frame.read();
        let corrected = self.corrector.lock().correct(raw);
        self.registry.notify_data_received(timestamp_ns, &corrected);
    }

    /// Raw accuracy changes are not part of the frame; nothing to do.
    fn on_accuracy_changed(&self, _accuracy: i32) {}
}

impl Sensor for OrientedAccelerometer {
    fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    fn enable(&self) {
        if let Some(me) = self.handle() {
            self.upstream.register_listener(me);
        }
    }

    fn disable(&self) {
        if let Some(me) = self.handle() {
            self.upstream.unregister_listener(&me);
        }
    }
}
