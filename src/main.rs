use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use vio_recorder::capture::clock::{ElapsedClock, MonotonicClock};
use vio_recorder::sim::{SyntheticImu, SyntheticTracker};
use vio_recorder::{RecorderConfig, RunSession};

/// Records a synthetic capture session to disk.
#[derive(Parser, Debug)]
#[command(name = "vio-recorder", version)]
struct Args {
    /// JSON recorder config; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Parent directory for run folders (overrides config)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Recording length in seconds; Ctrl+C stops early
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Tracking update rate driving the tick loop
    #[arg(long, default_value_t = 60)]
    tick_hz: u32,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    #[arg(long, default_value_t = 200)]
    gyro_hz: u32,

    #[arg(long, default_value_t = 100)]
    accel_hz: u32,
}

/// Tracker frames are stamped slightly before they reach the tick loop.
const TRACKER_LATENCY_NS: i64 = 3_000_000;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RecorderConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RecorderConfig::default(),
    };
    if let Some(output) = args.output.clone() {
        config.output_root = output;
    }

    let clock = ElapsedClock::new();
    let mut session = RunSession::new(config, Box::new(clock.clone()));
    session.start().context("failed to start recording")?;

    let producer = session
        .inertial_producer()
        .context("no active run after start")?;

    // Sensor callbacks
    let cancel = CancellationToken::new();
    let imu_cancel = cancel.clone();
    let imu_clock = clock.clone();
    let (gyro_hz, accel_hz) = (args.gyro_hz, args.accel_hz);
    let imu_task = tokio::spawn(async move {
        let mut imu = SyntheticImu::new(gyro_hz, accel_hz, imu_clock.now_ns());
        let mut cadence = tokio::time::interval(Duration::from_millis(5));
        loop {
            tokio::select! {
                _ = imu_cancel.cancelled() => break,
                _ = cadence.tick() => {
                    for (channel, values, t_ns) in imu.events_until(imu_clock.now_ns()) {
                        producer.on_inertial_event(channel, values, t_ns);
                    }
                }
            }
        }
    });

    // Update loop
    let mut tracker = SyntheticTracker::new(args.width, args.height);
    let mut cadence = tokio::time::interval(Duration::from_nanos(1_000_000_000 / u64::from(args.tick_hz.max(1))));
    cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let deadline = tokio::time::sleep(Duration::from_secs_f64(args.duration.max(0.0)));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(deadline);
    tokio::pin!(ctrl_c);

    tracing::info!("Recording for {:.1}s. Press Ctrl+C to stop.", args.duration);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                break;
            }
            _ = cadence.tick() => {
                let mut update = tracker.update_at(clock.now_ns() - TRACKER_LATENCY_NS);
                session.on_tick(&mut update);
            }
        }
    }

    cancel.cancel();
    if let Err(e) = imu_task.await {
        tracing::warn!("IMU task ended abnormally: {}", e);
    }

    let stats = session.stop().context("failed to stop recording")?;
    if let (Some((path, _)), Some(stats)) = (session.last_run(), stats) {
        println!("Run: {}", path.display());
        println!(
            "frames={} imu={} images={} dropped={} write_errors={}",
            stats.frames, stats.samples, stats.images_written, stats.dropped, stats.write_errors
        );
    }

    Ok(())
}
