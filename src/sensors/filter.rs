//! Time-windowed moving-average filter.
//!
//! Keeps every sample that arrived within `expiration_ns` of the newest one
//! and averages them elementwise. Expiry is measured on the sensor clock:
//! "now" is the newest sample's timestamp, since sensor timestamps are not
//! comparable to host time.
//!
//! # Usage
//!
//! ```
//! use samatal::core::types::Sample;
//! use samatal::sensors::filter::MovingAverageFilter;
//!
//! let mut filter = MovingAverageFilter::<3>::default();
//! filter.add(Sample::new(0, [0.0, 0.0, 9.8]));
//! filter.add(Sample::new(100_000_000, [0.2, 0.0, 9.6]));
//! filter.remove_expired();
//!
//! let avg = filter.average().unwrap();
//! assert!((avg[0] - 0.1).abs() < 1e-6);
//! ```

use crate::core::types::Sample;
use std::collections::VecDeque;

/// Nanoseconds per second.
pub const SEC_TO_NS: i64 = 1_000_000_000;

/// Default sample lifetime: half a second of sensor time.
pub const DEFAULT_EXPIRATION_NS: i64 = SEC_TO_NS / 2;

/// Moving average over samples of `N` values.
///
/// All samples in one filter share the same length by construction.
#[derive(Debug, Clone)]
pub struct MovingAverageFilter<const N: usize> {
    window: VecDeque<Sample<[f32; N]>>,
    expiration_ns: i64,
}

impl<const N: usize> MovingAverageFilter<N> {
    /// Create a filter whose samples expire after `expiration_ns`.
    pub fn new(expiration_ns: i64) -> Self {
        Self {
            window: VecDeque::new(),
            expiration_ns: expiration_ns.max(0),
        }
    }

    /// Sample lifetime (ns).
    pub fn expiration_ns(&self) -> i64 {
        self.expiration_ns
    }

    /// Append a sample. Timestamps must arrive non-decreasing.
    pub fn add(&mut self, sample: Sample<[f32; N]>) {
        self.window.push_back(sample);
        log::trace!("Filter window size = {}", self.window.len());
    }

    /// Drop samples older than `newest - expiration_ns`.
    ///
    /// The newest sample always survives. Call after every [`add`](Self::add).
    pub fn remove_expired(&mut self) {
        let Some(newest) = self.window.back() else {
            return;
        };
        let cutoff = newest.timestamp_ns.saturating_sub(self.expiration_ns);

        let before = self.window.len();
        self.window.retain(|s| s.timestamp_ns >= cutoff);
        let removed = before - self.window.len();
        if removed > 0 {
            log::trace!(
                "Expired {} samples older than {} (window size = {})",
                removed,
                cutoff,
                self.window.len()
            );
        }
    }

    /// Elementwise mean of the retained samples, `None` if the window is empty.
    pub fn average(&self) -> Option<[f32; N]> {
        if self.window.is_empty() {
            return None;
        }

        // Accumulate in f64 so long windows don't lose precision
        let mut sums = [0.0f64; N];
        for sample in &self.window {
            for (sum, &value) in sums.iter_mut().zip(sample.values.iter()) {
                *sum += value as f64;
            }
        }

        let count = self.window.len() as f64;
        let mut averages = [0.0f32; N];
        for (avg, sum) in averages.iter_mut().zip(sums.iter()) {
            *avg = (sum / count) as f32;
        }
        Some(averages)
    }

    /// Empty the window.
    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Timestamp of the newest sample.
    pub fn newest_timestamp_ns(&self) -> Option<i64> {
        self.window.back().map(|s| s.timestamp_ns)
    }

    /// Iterate over retained samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &Sample<[f32; N]>> {
        self.window.iter()
    }
}

impl<const N: usize> Default for MovingAverageFilter<N> {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRATION_NS)
    }
}
