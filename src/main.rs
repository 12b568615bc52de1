//! Samatal - inclinometer demo host
//!
//! Runs the full pipeline against the simulated accelerometer and logs the
//! pitch/roll readings the UI would receive.
//!
//! # Usage
//!
//! ```bash
//! samatal --config samatal.toml --duration-secs 20 --calibrate-after-secs 5
//! samatal --rotate-after-secs 8 --right-side-down
//! ```

use clap::Parser;
use samatal::config::AppConfig;
use samatal::devices::mock::MockAccelerometer;
use samatal::error::{Error, Result};
use samatal::{
    DeviceRotation, FnListener, InclinometerConfig, InclinometerService, PitchRoll, SensorKind,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "samatal")]
#[command(about = "Accelerometer inclinometer running on a simulated sensor")]
struct Args {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How long to run
    #[arg(short, long, default_value_t = 10.0)]
    duration_secs: f64,

    /// Zero the reading at this point in the run
    #[arg(long)]
    calibrate_after_secs: Option<f64>,

    /// Rotate the device into landscape at this point in the run
    #[arg(long)]
    rotate_after_secs: Option<f64>,

    /// Landscape rotation puts the right edge down instead of the left
    #[arg(long)]
    right_side_down: bool,
}

/// One-shot action scheduled at a point in the run.
struct Scheduled {
    at: Option<Duration>,
}

impl Scheduled {
    /// Negative or non-finite times never fire.
    fn new(secs: Option<f64>) -> Self {
        Self {
            at: secs.and_then(|s| Duration::try_from_secs_f64(s).ok()),
        }
    }

    /// True exactly once, the first time `elapsed` reaches the deadline.
    fn due(&mut self, elapsed: Duration) -> bool {
        match self.at {
            Some(at) if elapsed >= at => {
                self.at = None;
                true
            }
            _ => false,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("Samatal v{} starting...", env!("CARGO_PKG_VERSION"));
    match &args.config {
        Some(path) => log::info!("Using config: {}", path.display()),
        None => log::info!("Using default configuration"),
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mock = Arc::new(MockAccelerometer::new(&config.simulation)?);
    let service = InclinometerService::new(
        mock.clone(),
        InclinometerConfig::from(&config),
        config.simulation.rotation,
    );

    let display = FnListener::handle(|_, values: &[f32]| {
        if let Some(reading) = PitchRoll::from_values(values) {
            log::info!(
                "pitch {:+6.1}°   roll {:+6.1}°",
                reading.pitch_deg,
                reading.roll_deg
            );
        }
    });
    service.register_listener(SensorKind::Inclinometer, display.clone());

    // rate_hz is bounded by AppConfig::validate
    let period = Duration::from_secs_f64(1.0 / config.simulation.rate_hz);
    let run_for =
        Duration::try_from_secs_f64(args.duration_secs.max(0.0)).unwrap_or(Duration::MAX);
    let mut calibrate = Scheduled::new(args.calibrate_after_secs);
    let mut rotate = Scheduled::new(args.rotate_after_secs);

    // The mock's sensor clock starts with the run
    let start = Instant::now();
    let mut samples: u64 = 0;

    while running.load(Ordering::Relaxed) && start.elapsed() < run_for {
        let elapsed = start.elapsed();

        if rotate.due(elapsed) {
            log::info!(
                "Rotating device to landscape ({} side down)",
                if args.right_side_down { "right" } else { "left" }
            );
            mock.set_rotation(DeviceRotation::Landscape, args.right_side_down);
            service.set_orientation(DeviceRotation::Landscape);
        }

        if calibrate.due(elapsed) {
            match service.update_offsets() {
                Ok(offset) => log::info!(
                    "Zeroed: pitch offset {:+.2}°, roll offset {:+.2}°",
                    offset.pitch_offset_deg,
                    offset.roll_offset_deg
                ),
                Err(e) => log::warn!("Calibration skipped: {}", e),
            }
        }

        if mock.is_running() {
            let timestamp_ns = elapsed.as_nanos() as i64;
            service.on_sensor_changed(timestamp_ns, &mock.sample());
            samples += 1;
        }

        std::thread::sleep(period);
    }

    log::info!("Shutting down after {} samples...", samples);
    service.unregister_listener(SensorKind::Inclinometer, &display);
    service.destroy();

    if let Some(reading) = service.latest_reading() {
        log::info!(
            "Last reading: pitch {:+.1}°, roll {:+.1}°",
            reading.pitch_deg,
            reading.roll_deg
        );
    }
    log::info!("Samatal stopped");
    Ok(())
}
