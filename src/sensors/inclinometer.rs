//! Inclinometer: pitch and roll from device-frame acceleration.
//!
//! # Pipeline
//!
//! ```text
//! corrected accel ─► moving average ─► atan2 ─► wrap ─► auto-zero ─► offsets ─► rate limit ─► listeners
//! ```
//!
//! # Angles
//!
//! ```text
//! pitch = 90 - atan2(y, z)        (degrees, wrapped into [-180, 180])
//! roll  = atan2(y, x) - 90        (degrees, wrapped into [-180, 180])
//! ```
//!
//! Roll is forced to exactly zero when both averaged x and y are below the
//! auto-zero threshold. The comparison is signed: large negative x or y also
//! trigger it.
//!
//! # Output rate
//!
//! Listeners are notified at most once per `notify_interval_ms` of host
//! time; readings in between are dropped, not queued.

use super::calibration::CalibrationState;
use super::filter::MovingAverageFilter;
use super::listener::{ListenerHandle, ListenerRegistry, Sensor, SensorListener};
use super::orientation::OrientedAccelerometer;
use crate::config::AppConfig;
use crate::core::clock::{Clock, MonotonicClock};
use crate::core::math::{atan2_deg, wrap_degrees};
use crate::core::types::{AccelSample, CalibrationOffset, PitchRoll, Sample, AXES};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Default minimum time between notifications (≈ 3 Hz).
pub const DEFAULT_NOTIFY_INTERVAL_MS: u64 = 333;

/// Default roll auto-zero threshold (m/s²).
pub const DEFAULT_ROLL_ZERO_THRESHOLD: f64 = 0.25;

/// Inclinometer tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InclinometerConfig {
    /// Moving-average window (sensor-clock ns)
    pub expiration_ns: i64,
    /// Minimum host time between notifications (ms)
    pub notify_interval_ms: u64,
    /// Roll is zeroed when averaged x and y are both below this (m/s²)
    pub roll_zero_threshold: f64,
}

impl Default for InclinometerConfig {
    fn default() -> Self {
        Self {
            expiration_ns: super::filter::DEFAULT_EXPIRATION_NS,
            notify_interval_ms: DEFAULT_NOTIFY_INTERVAL_MS,
            roll_zero_threshold: DEFAULT_ROLL_ZERO_THRESHOLD,
        }
    }
}

impl From<&AppConfig> for InclinometerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            expiration_ns: i64::try_from(config.filter.expiration_ms)
                .unwrap_or(i64::MAX)
                .saturating_mul(1_000_000),
            notify_interval_ms: config.inclinometer.notify_interval_ms,
            roll_zero_threshold: config.inclinometer.roll_zero_threshold,
        }
    }
}

/// Pitch in degrees from averaged y and z.
pub fn compute_pitch(y: f64, z: f64) -> f64 {
    let raw = 90.0 - atan2_deg(y, z);
    let pitch = wrap_degrees(raw);
    if pitch != raw {
        log::trace!("Pitch wrapped: {:.1} -> {:.1}", raw, pitch);
    }
    pitch
}

/// Roll in degrees from averaged x and y.
///
/// Both axes below `zero_threshold` (signed) force an exact zero.
pub fn compute_roll(x: f64, y: f64, zero_threshold: f64) -> f64 {
    let raw = atan2_deg(y, x) - 90.0;
    let roll = wrap_degrees(raw);
    if roll != raw {
        log::trace!("Roll wrapped: {:.1} -> {:.1}", raw, roll);
    }

    // Signed comparison, not on magnitudes
    if x < zero_threshold && y < zero_threshold {
        log::trace!("Roll auto-zero: x = {:.3}, y = {:.3}", x, y);
        return 0.0;
    }
    roll
}

/// Gate that opens at most once per interval.
pub struct NotifyRateLimiter {
    min_interval_ms: u64,
    last_notify_ms: Option<u64>,
    clock: Arc<dyn Clock>,
}

impl NotifyRateLimiter {
    pub fn new(min_interval_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            min_interval_ms,
            last_notify_ms: None,
            clock,
        }
    }

    /// Whether a notification may go out now. Opening the gate consumes it.
    ///
    /// The first call always opens.
    pub fn try_acquire(&mut self) -> bool {
        let now = self.clock.now_ms();
        let open = match self.last_notify_ms {
            None => true,
            Some(last) => now.saturating_sub(last) > self.min_interval_ms,
        };
        if open {
            self.last_notify_ms = Some(now);
        }
        open
    }

    /// Minimum interval between notifications (ms).
    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }
}

/// Filter, trigonometry, calibration and rate limiting.
///
/// Pure state: the owning stage handles locking and fan-out.
pub struct InclinometerEngine {
    filter: MovingAverageFilter<AXES>,
    calibration: CalibrationState,
    limiter: NotifyRateLimiter,
    roll_zero_threshold: f64,
    latest: Option<PitchRoll>,
}

impl InclinometerEngine {
    pub fn new(config: InclinometerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            filter: MovingAverageFilter::new(config.expiration_ns),
            calibration: CalibrationState::new(),
            limiter: NotifyRateLimiter::new(config.notify_interval_ms, clock),
            roll_zero_threshold: config.roll_zero_threshold,
            latest: None,
        }
    }

    /// Feed a device-frame sample.
    ///
    /// Returns the calibrated reading when it should be sent to listeners,
    /// `None` when the rate limiter drops it.
    pub fn process(&mut self, sample: AccelSample) -> Option<PitchRoll> {
        self.filter.add(sample);
        self.filter.remove_expired();

        let raw = self.uncalibrated()?;
        let reading = self.calibration.apply(raw);
        self.latest = Some(reading);

        if self.limiter.try_acquire() {
            log::trace!("Notifying listeners: {:?}", reading);
            Some(reading)
        } else {
            log::trace!("Rate limiting inclinometer data");
            None
        }
    }

    /// Reading from the current window without offsets.
    pub fn uncalibrated(&self) -> Option<PitchRoll> {
        let avg = self.filter.average()?;
        let (x, y, z) = (avg[0] as f64, avg[1] as f64, avg[2] as f64);
        Some(PitchRoll::new(
            compute_pitch(y, z),
            compute_roll(x, y, self.roll_zero_threshold),
        ))
    }

    /// Make the current window's reading the new zero.
    pub fn update_offsets(&mut self) -> Result<CalibrationOffset> {
        let raw = self
            .uncalibrated()
            .ok_or(Error::NoData("no accelerometer samples to calibrate against"))?;
        Ok(self.calibration.zero_at(raw))
    }

    /// Restore zero offsets.
    pub fn reset_offsets(&mut self) {
        self.calibration.reset();
    }

    /// Frame changed upstream: drop the window.
    pub fn clear(&mut self) {
        self.filter.clear();
        self.latest = None;
    }

    pub fn calibration(&self) -> CalibrationOffset {
        self.calibration.offset()
    }

    /// Last computed reading, whether or not it was sent.
    pub fn latest(&self) -> Option<PitchRoll> {
        self.latest
    }

    /// Samples currently in the window.
    pub fn window_len(&self) -> usize {
        self.filter.len()
    }
}

/// Pipeline stage: oriented accelerometer in, `[pitch, roll]` out.
pub struct Inclinometer {
    registry: ListenerRegistry,
    engine: Mutex<InclinometerEngine>,
    upstream: Arc<OrientedAccelerometer>,
    this: Weak<Inclinometer>,
}

impl Inclinometer {
    /// Sensor name used in logs and errors.
    pub const NAME: &'static str = "inclinometer";

    /// Create the stage with the host's monotonic clock.
    pub fn new(upstream: Arc<OrientedAccelerometer>, config: InclinometerConfig) -> Arc<Self> {
        Self::with_clock(upstream, config, Arc::new(MonotonicClock::new()))
    }

    /// Create the stage with an explicit rate-limit clock.
    pub fn with_clock(
        upstream: Arc<OrientedAccelerometer>,
        config: InclinometerConfig,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            registry: ListenerRegistry::new(Self::NAME),
            engine: Mutex::new(InclinometerEngine::new(config, clock)),
            upstream,
            this: this.clone(),
        })
    }

    /// Zero the reading at the current orientation.
    pub fn update_offsets(&self) -> Result<CalibrationOffset> {
        self.engine.lock().update_offsets()
    }

    /// Restore zero offsets.
    pub fn reset_offsets(&self) {
        self.engine.lock().reset_offsets();
    }

    /// Current offsets.
    pub fn calibration(&self) -> CalibrationOffset {
        self.engine.lock().calibration()
    }

    /// Last computed reading, including rate-limited ones.
    pub fn latest(&self) -> Option<PitchRoll> {
        self.engine.lock().latest()
    }

    /// Drop all listeners and detach from the oriented accelerometer.
    pub fn destroy(&self) {
        if self.registry.clear() > 0 {
            self.disable();
        }
    }

    fn handle(&self) -> Option<ListenerHandle> {
        self.this.upgrade().map(|me| me as ListenerHandle)
    }
}

impl SensorListener for Inclinometer {
    fn on_data_received(&self, timestamp_ns: i64, values: &[f32]) {
        let Ok(accel) = <[f32; AXES]>::try_from(values) else {
            log::error!(
                "{}: expected {} values, got {}; sample dropped",
                Self::NAME,
                AXES,
                values.len()
            );
            return;
        };

        // Engine lock released before fan-out
        let reading = self.engine.lock().process(Sample::new(timestamp_ns, accel));
        if let Some(reading) = reading {
            self.registry
                .notify_data_received(timestamp_ns, &reading.to_values());
        }
    }

    /// Upstream frame changed: samples from the old frame are meaningless.
    fn on_accuracy_changed(&self, _accuracy: i32) {
        log::debug!("{}: frame changed, clearing filter", Self::NAME);
        self.engine.lock().clear();
    }
}

impl Sensor for Inclinometer {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use approx::assert_relative_eq;

    const MS: i64 = 1_000_000;
    const G: f32 = 9.80665;

    fn engine(clock: &Arc<ManualClock>) -> InclinometerEngine {
        InclinometerEngine::new(InclinometerConfig::default(), clock.clone())
    }

    #[test]
    fn test_config_from_app_config() {
        let mut app = AppConfig::default();
        app.filter.expiration_ms = 250;
        assert_eq!(InclinometerConfig::from(&app).expiration_ns, 250 * MS);

        // Unvalidated values saturate instead of overflowing
        app.filter.expiration_ms = u64::MAX;
        assert_eq!(InclinometerConfig::from(&app).expiration_ns, i64::MAX);
        app.filter.expiration_ms = 10_000_000_000_000;
        assert_eq!(InclinometerConfig::from(&app).expiration_ns, i64::MAX);
    }

    #[test]
    fn test_pitch_level_device() {
        // Flat on its back in the device frame: gravity along +z
        assert_relative_eq!(compute_pitch(0.0, G as f64), 90.0, epsilon = 1e-9);
        // Standing upright: gravity along +y
        assert_relative_eq!(compute_pitch(G as f64, 0.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pitch_wraps_into_range() {
        // 90 - atan2(-1, -1) = 90 + 135 = 225 -> -135
        assert_relative_eq!(compute_pitch(-1.0, -1.0), -135.0, epsilon = 1e-9);
        for (y, z) in [(-3.0, -0.1), (0.5, -9.0), (-9.0, 0.5), (0.0, -1.0)] {
            let pitch = compute_pitch(y, z);
            assert!((-180.0..=180.0).contains(&pitch), "pitch {}", pitch);
        }
    }

    #[test]
    fn test_roll_wraps_into_range() {
        // atan2(-1, -1) - 90 = -135 - 90 = -225 -> 135
        assert_relative_eq!(compute_roll(-1.0, -1.0, -10.0), 135.0, epsilon = 1e-9);
        for (x, y) in [(3.0, -0.1), (-0.5, 9.0), (9.0, 0.5), (-1.0, 0.0)] {
            let roll = compute_roll(x, y, DEFAULT_ROLL_ZERO_THRESHOLD);
            assert!((-180.0..=180.0).contains(&roll), "roll {}", roll);
        }
    }

    #[test]
    fn test_roll_upright_and_tilted() {
        assert_relative_eq!(compute_roll(0.0, G as f64, 0.25), 0.0, epsilon = 1e-9);
        // Tilted 45° to the side
        assert_relative_eq!(compute_roll(-1.0, 1.0, 0.25), 45.0, epsilon = 1e-9);
        assert_relative_eq!(compute_roll(1.0, 1.0, 0.25), -45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_roll_auto_zero_near_vertical() {
        // atan2(0.1, 0.1) - 90 = -45, but both axes are below the threshold
        assert_eq!(compute_roll(0.1, 0.1, 0.25), 0.0);
    }

    #[test]
    fn test_roll_auto_zero_is_signed_comparison() {
        // Large negative axes also trip the signed threshold. Kept as-is;
        // an |x|, |y| comparison would leave this at -135.
        assert_eq!(compute_roll(-5.0, -5.0, 0.25), 0.0);
        // One axis above the threshold keeps the computed roll
        assert_relative_eq!(compute_roll(-5.0, 5.0, 0.25), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_process_averages_before_trig() {
        let clock = Arc::new(ManualClock::new(0));
        let mut engine = engine(&clock);

        engine.process(Sample::new(0, [0.0, 0.0, G]));
        let reading = engine.process(Sample::new(10 * MS, [0.0, 2.0 * G, G]));
        // Second call rate limited, but latest is still computed
        assert!(reading.is_none());

        let latest = engine.latest().unwrap();
        // avg = (0, G, G): pitch = 90 - 45
        assert_relative_eq!(latest.pitch_deg, 45.0, epsilon = 1e-4);
        assert_eq!(engine.window_len(), 2);
    }

    #[test]
    fn test_rate_limit_drops_then_releases() {
        let clock = Arc::new(ManualClock::new(1_000));
        let mut engine = engine(&clock);

        assert!(engine.process(Sample::new(0, [0.0, G, 0.0])).is_some());
        clock.advance_ms(10);
        assert!(engine.process(Sample::new(10 * MS, [0.0, G, 0.0])).is_none());
        clock.advance_ms(330);
        assert!(engine.process(Sample::new(340 * MS, [0.0, G, 0.0])).is_some());
    }

    #[test]
    fn test_rate_limit_boundary_is_exclusive() {
        let clock = Arc::new(ManualClock::new(0));
        let mut limiter = NotifyRateLimiter::new(333, clock.clone());

        assert!(limiter.try_acquire());
        clock.advance_ms(333);
        assert!(!limiter.try_acquire());
        clock.advance_ms(1);
        assert!(limiter.try_acquire());
    }

    #[test]
    fn test_update_offsets_zeroes_current_reading() {
        let clock = Arc::new(ManualClock::new(0));
        let mut engine = engine(&clock);
        let tilted = [1.2, 8.9, 3.1];
        engine.process(Sample::new(0, tilted));

        engine.update_offsets().unwrap();

        clock.advance_ms(400);
        let reading = engine.process(Sample::new(20 * MS, tilted)).unwrap();
        assert_relative_eq!(reading.pitch_deg, 0.0, epsilon = 1e-9);
        assert_relative_eq!(reading.roll_deg, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_update_offsets_ignores_previous_offsets() {
        let clock = Arc::new(ManualClock::new(0));
        let mut engine = engine(&clock);
        engine.process(Sample::new(0, [1.0, 9.0, 2.0]));

        let first = engine.update_offsets().unwrap();
        let second = engine.update_offsets().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_update_offsets_without_data() {
        let clock = Arc::new(ManualClock::new(0));
        let mut engine = engine(&clock);
        assert!(matches!(engine.update_offsets(), Err(Error::NoData(_))));
        assert_eq!(engine.calibration(), CalibrationOffset::default());
    }

    #[test]
    fn test_clear_drops_window() {
        let clock = Arc::new(ManualClock::new(0));
        let mut engine = engine(&clock);
        engine.process(Sample::new(0, [0.0, G, 0.0]));

        engine.clear();

        assert_eq!(engine.window_len(), 0);
        assert!(engine.latest().is_none());
        assert!(engine.uncalibrated().is_none());
    }
}
