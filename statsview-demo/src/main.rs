use std::env;
use std::io::{self, Write};
use std::process;
use std::time::Duration;

use rand::Rng;
use statsview::{Aggregation, BucketBoundaries, Measure, Stats, StatsRecorder, Unit, View};
use statsview_exporter_push::PushExporterBuilder;
use tracing::{error, info};

const SAMPLE_COUNT: usize = 100;

/// Upper bound (exclusive) on generated latency values, in milliseconds.
const MAX_LATENCY_MS: f64 = 5000.0;

// Latency in buckets:
// [>=0ms, >=100ms, >=200ms, >=400ms, >=1s, >=2s, >=4s]
const LATENCY_BOUNDARIES: [f64; 7] = [0.0, 100.0, 200.0, 400.0, 1000.0, 2000.0, 4000.0];

/// How long to wait for the final flush acknowledgment before giving up:
/// 10 seconds past the default export interval.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(70);

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9091/";

fn task_latency() -> Measure {
    Measure::new("task_latency", "The task latency in milliseconds", Unit::Milliseconds)
}

fn latency_view() -> View {
    let bounds = BucketBoundaries::new(&LATENCY_BOUNDARIES).expect("latency bounds are valid");

    View::new(
        "task_latency_distribution",
        "The distribution of the task latencies.",
        task_latency(),
        Aggregation::Distribution(bounds),
    )
}

/// Records `SAMPLE_COUNT` fake latency values between 0 and 5 seconds,
/// printing one line per sample.
fn record_latencies<R, W>(
    recorder: &StatsRecorder,
    latency: &Measure,
    rng: &mut R,
    out: &mut W,
) -> io::Result<()>
where
    R: Rng,
    W: Write,
{
    for i in 0..SAMPLE_COUNT {
        let ms = (MAX_LATENCY_MS * rng.random::<f64>()).floor();
        writeln!(out, "Latency {}: {}", i, ms as u64)?;
        recorder.measure_map().put(latency, ms).record();
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Register the view before anything records; the context rejects late
    // registration instead of dropping earlier samples.
    let stats = Stats::new();
    stats.register_view(latency_view()).expect("failed to register latency view");

    let endpoint = env::var("STATSVIEW_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    let mut builder =
        PushExporterBuilder::new().endpoint(&endpoint).expect("failed to parse push endpoint");
    if let Ok(username) = env::var("STATSVIEW_USERNAME") {
        builder = builder.credentials(username, env::var("STATSVIEW_PASSWORD").ok());
    }

    let exporter = builder.install(stats.clone()).expect("failed to install push exporter");
    info!(%endpoint, "push exporter installed");

    let latency = task_latency();
    let recorder = stats.recorder();
    let mut rng = rand::rng();
    record_latencies(&recorder, &latency, &mut rng, &mut io::stdout())
        .expect("failed to write to stdout");

    println!(
        "Waiting up to {} seconds for all records to be flushed before shutdown.",
        FLUSH_TIMEOUT.as_secs()
    );

    if let Err(e) = exporter.flush(FLUSH_TIMEOUT).await {
        error!("final flush failed: {}", e);
        process::exit(1);
    }

    info!("all records flushed");
}
