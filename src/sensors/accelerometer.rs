//! Raw accelerometer stage.
//!
//! First stage of the pipeline. The host delivers hardware events through
//! [`Accelerometer::on_sensor_changed`]; they fan out unchanged as
//! `[x, y, z]` in m/s². The hardware is only running while someone listens.

use super::listener::{ListenerRegistry, Sensor};
use std::sync::Arc;

/// Hardware hook for the physical accelerometer.
pub trait AccelerometerBackend: Send + Sync {
    /// Start delivering samples to the pipeline.
    fn start(&self);

    /// Stop delivering samples.
    fn stop(&self);
}

/// Raw accelerometer sensor.
pub struct Accelerometer {
    registry: ListenerRegistry,
    backend: Arc<dyn AccelerometerBackend>,
}

impl Accelerometer {
    /// Sensor name used in logs and errors.
    pub const NAME: &'static str = "accelerometer";

    pub fn new(backend: Arc<dyn AccelerometerBackend>) -> Self {
        Self {
            registry: ListenerRegistry::new(Self::NAME),
            backend,
        }
    }

    /// Hardware delivered a new sample.
    pub fn on_sensor_changed(&self, timestamp_ns: i64, values: &[f32]) {
        log::trace!("{}: {:?} @ {}", Self::NAME, values, timestamp_ns);
        self.registry.notify_data_received(timestamp_ns, values);
    }

    /// Hardware reported an accuracy change.
    pub fn on_accuracy_changed(&self, accuracy: i32) {
        self.registry.notify_accuracy_changed(accuracy);
    }

    /// Drop all listeners and stop the hardware.
    pub fn destroy(&self) {
        let dropped = self.registry.clear();
        log::debug!("{}: destroyed ({} listeners dropped)", Self::NAME, dropped);
        self.backend.stop();
    }
}

impl Sensor for Accelerometer {
    fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    fn enable(&self) {
        self.backend.start();
    }

    fn disable(&self) {
        self.backend.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::listener::{FnListener, ListenerHandle};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeBackend {
        running: AtomicBool,
        starts: AtomicUsize,
        stops: AtomicUsize,
    }

    impl AccelerometerBackend for FakeBackend {
        fn start(&self) {
            self.running.store(true, Ordering::Relaxed);
            self.starts.fetch_add(1, Ordering::Relaxed);
        }

        fn stop(&self) {
            self.running.store(false, Ordering::Relaxed);
            self.stops.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_backend_follows_listeners() {
        let backend = Arc::new(FakeBackend::default());
        let accel = Accelerometer::new(backend.clone());
        let listener: ListenerHandle = FnListener::handle(|_, _: &[f32]| {});

        assert!(!backend.running.load(Ordering::Relaxed));
        accel.register_listener(listener.clone());
        assert!(backend.running.load(Ordering::Relaxed));
        accel.unregister_listener(&listener);
        assert!(!backend.running.load(Ordering::Relaxed));
        assert_eq!(backend.starts.load(Ordering::Relaxed), 1);
        assert_eq!(backend.stops.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_samples_pass_through_unchanged() {
        let accel = Accelerometer::new(Arc::new(FakeBackend::default()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        accel.register_listener(FnListener::handle(move |ts, values: &[f32]| {
            sink.lock().push((ts, values.to_vec()));
        }));

        accel.on_sensor_changed(99, &[0.5, -0.5, 9.7]);

        assert_eq!(*seen.lock(), vec![(99, vec![0.5, -0.5, 9.7])]);
    }

    #[test]
    fn test_destroy_clears_and_stops() {
        let backend = Arc::new(FakeBackend::default());
        let accel = Accelerometer::new(backend.clone());
        accel.register_listener(FnListener::handle(|_, _: &[f32]| {}));

        accel.destroy();

        assert!(accel.registry().is_empty());
        assert!(!backend.running.load(Ordering::Relaxed));
    }
}
