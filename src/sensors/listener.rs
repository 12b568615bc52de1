//! Listener registration and fan-out.
//!
//! Every pipeline stage owns a [`ListenerRegistry`]. The [`Sensor`] trait
//! ties a registry to the stage's enable/disable hooks: the stage is enabled
//! when its first listener arrives and disabled when its last one leaves.
//!
//! # Reentrancy
//!
//! Callbacks run synchronously on the delivering thread. Listeners must not
//! register or unregister on the sensor that is calling them; the registry
//! delivers to a snapshot, so such a change only applies from the next
//! notification onward.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Callback interface for sensor consumers.
///
/// The meaning of `values` depends on the sensor: x/y/z (m/s²) for the
/// accelerometer layers, `[pitch, roll]` (degrees) for the inclinometer.
pub trait SensorListener: Send + Sync {
    /// New data from the sensor.
    fn on_data_received(&self, timestamp_ns: i64, values: &[f32]);

    /// Accuracy changed. The oriented accelerometer uses this channel to
    /// signal a frame change.
    fn on_accuracy_changed(&self, accuracy: i32);
}

/// Shared listener reference. Identity is the `Arc` allocation.
pub type ListenerHandle = Arc<dyn SensorListener>;

/// Whether two handles point at the same listener.
#[inline]
pub fn same_listener(a: &ListenerHandle, b: &ListenerHandle) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Data-only listener built from a closure.
pub struct FnListener<F> {
    on_data: F,
}

impl<F> FnListener<F>
where
    F: Fn(i64, &[f32]) + Send + Sync + 'static,
{
    /// Wrap a closure into a listener handle.
    pub fn handle(on_data: F) -> ListenerHandle {
        Arc::new(Self { on_data })
    }
}

impl<F> SensorListener for FnListener<F>
where
    F: Fn(i64, &[f32]) + Send + Sync,
{
    fn on_data_received(&self, timestamp_ns: i64, values: &[f32]) {
        (self.on_data)(timestamp_ns, values);
    }

    fn on_accuracy_changed(&self, _accuracy: i32) {}
}

/// Ordered list of listeners for one sensor.
pub struct ListenerRegistry {
    sensor: &'static str,
    listeners: Mutex<Vec<ListenerHandle>>,
}

impl ListenerRegistry {
    /// Create an empty registry for the named sensor.
    pub fn new(sensor: &'static str) -> Self {
        Self {
            sensor,
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Name of the owning sensor.
    pub fn sensor(&self) -> &'static str {
        self.sensor
    }

    /// Append a listener. Returns `true` on the 0 → 1 transition.
    ///
    /// Duplicates are allowed; each registration needs its own unregister.
    pub fn register(&self, listener: ListenerHandle) -> bool {
        let mut listeners = self.listeners.lock();
        let first = listeners.is_empty();
        listeners.push(listener);
        first
    }

    /// Remove the first registration of `listener`.
    ///
    /// Returns `Ok(true)` on the 1 → 0 transition, or
    /// [`Error::ListenerNotRegistered`] if the listener was not found.
    pub fn unregister(&self, listener: &ListenerHandle) -> Result<bool> {
        let mut listeners = self.listeners.lock();
        let position = listeners
            .iter()
            .position(|l| same_listener(l, listener))
            .ok_or(Error::ListenerNotRegistered(self.sensor))?;
        listeners.remove(position);
        Ok(listeners.is_empty())
    }

    /// Deliver data to every listener in registration order.
    pub fn notify_data_received(&self, timestamp_ns: i64, values: &[f32]) {
        for listener in self.snapshot() {
            listener.on_data_received(timestamp_ns, values);
        }
    }

    /// Deliver an accuracy change to every listener in registration order.
    pub fn notify_accuracy_changed(&self, accuracy: i32) {
        for listener in self.snapshot() {
            listener.on_accuracy_changed(accuracy);
        }
    }

    /// Drop every registration without running any disable hook.
    ///
    /// Returns how many registrations were dropped.
    pub fn clear(&self) -> usize {
        let mut listeners = self.listeners.lock();
        let count = listeners.len();
        listeners.clear();
        count
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Whether `listener` has at least one registration.
    pub fn contains(&self, listener: &ListenerHandle) -> bool {
        self.listeners
            .lock()
            .iter()
            .any(|l| same_listener(l, listener))
    }

    fn snapshot(&self) -> Vec<ListenerHandle> {
        self.listeners.lock().clone()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("sensor", &self.sensor)
            .field("listeners", &self.len())
            .finish()
    }
}

/// A pipeline stage that listeners subscribe to.
///
/// Implementors supply the registry and the enable/disable hooks; the
/// provided methods run the hooks exactly once per 0 → 1 and 1 → 0
/// transition. Hooks run outside the registry lock.
pub trait Sensor: Send + Sync {
    /// The stage's listeners.
    fn registry(&self) -> &ListenerRegistry;

    /// Start upstream data flow.
    fn enable(&self);

    /// Stop upstream data flow.
    fn disable(&self);

    /// Subscribe a listener, enabling the stage for the first one.
    fn register_listener(&self, listener: ListenerHandle) {
        if self.registry().register(listener) {
            log::debug!("{}: first listener, enabling", self.registry().sensor());
            self.enable();
        }
    }

    /// Unsubscribe a listener, disabling the stage after the last one.
    ///
    /// Unknown listeners are logged and otherwise ignored.
    fn unregister_listener(&self, listener: &ListenerHandle) {
        match self.registry().unregister(listener) {
            Ok(true) => {
                log::debug!("{}: last listener gone, disabling", self.registry().sensor());
                self.disable();
            }
            Ok(false) => {}
            Err(e) => log::error!("Failed to unregister listener: {}", e),
        }
    }
}
