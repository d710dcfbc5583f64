//! bcachestatd - bcache statistics collector daemon.
//!
//! Samples `/sys/fs/bcache` on a fixed interval and writes every sample to
//! stdout, either in the collectd exec plugin protocol or as JSON lines.
//! Logs go to stderr.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(not(target_os = "linux"))]
use bcachestat::collector::MockFs;
#[cfg(target_os = "linux")]
use bcachestat::collector::RealFs;
use bcachestat::collector::{BcacheCollector, CycleReport, DEFAULT_SYSFS_PATH, FileSystem};
use bcachestat::config::Config;
use bcachestat::sink::{JsonLinesSink, MetricSink, PutvalSink};

/// Output format of the sample stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// collectd exec plugin `PUTVAL` lines.
    Putval,
    /// One JSON object per line.
    Json,
}

/// bcache statistics collector daemon.
#[derive(Parser)]
#[command(
    name = "bcachestatd",
    about = "bcache statistics collector daemon",
    version
)]
struct Args {
    /// Collection interval in seconds.
    #[arg(
        short,
        long,
        default_value = "10",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    interval: u64,

    /// Path to the bcache sysfs root (for testing/mocking).
    #[arg(long, default_value = DEFAULT_SYSFS_PATH)]
    sysfs_path: PathBuf,

    /// Plugin configuration file with collectd-style `Key Value` lines.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Putval)]
    format: Format,

    /// Host name reported with every sample.
    #[arg(long)]
    hostname: Option<String>,

    /// Run a single collection cycle and exit.
    #[arg(long)]
    once: bool,

    /// Log every emitted sample (same as `Verbose true` in the config file).
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(quiet: bool) {
    let level = if quiet { Level::ERROR } else { Level::INFO };

    let mut filter = EnvFilter::from_default_env();
    for target in ["bcachestatd", "bcachestat"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Determines the host name reported with samples.
fn resolve_hostname(explicit: Option<String>) -> String {
    if let Some(name) = explicit {
        return name;
    }
    if let Ok(name) = std::fs::read_to_string("/proc/sys/kernel/hostname") {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

fn load_config(path: Option<&Path>, verbose_flag: bool) -> Result<Config, String> {
    let mut config = match path {
        Some(path) => {
            Config::load(path).map_err(|e| format!("config {}: {}", path.display(), e))?
        }
        None => Config::default(),
    };
    config.verbose |= verbose_flag;
    Ok(config)
}

fn describe_report(report: &CycleReport) -> String {
    format!(
        "{} cache sets, {} devices, {} samples, {} failed, {:.2}ms",
        report.cache_sets,
        report.devices,
        report.samples,
        report.failed_metrics,
        report.elapsed.as_secs_f64() * 1000.0
    )
}

fn run<F: FileSystem>(
    collector: &BcacheCollector<F>,
    sink: &mut dyn MetricSink,
    interval: Duration,
    once: bool,
) {
    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let mut cycle_count: u64 = 0;
    info!("Starting collection loop");

    while running.load(Ordering::SeqCst) {
        let report = collector.collect_cycle(sink);
        cycle_count += 1;
        debug!("Cycle #{}: {}", cycle_count, describe_report(&report));
        if report.sink_errors > 0 {
            error!(
                "Cycle #{}: {} samples could not be written",
                cycle_count, report.sink_errors
            );
        }

        if once {
            break;
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!("Shutdown complete after {} cycles", cycle_count);
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.quiet);

    let config = match load_config(args.config.as_deref(), args.verbose) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let hostname = resolve_hostname(args.hostname);

    info!("bcachestatd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, sysfs={}, format={:?}, host={}, verbose={}",
        args.interval,
        args.sysfs_path.display(),
        args.format,
        hostname,
        config.verbose
    );

    #[cfg(target_os = "linux")]
    let collector = BcacheCollector::new(RealFs::new(), &args.sysfs_path, &config);
    #[cfg(not(target_os = "linux"))]
    let collector = BcacheCollector::new(MockFs::new(), &args.sysfs_path, &config);

    let stdout = io::stdout().lock();
    let mut sink: Box<dyn MetricSink> = match args.format {
        Format::Putval => Box::new(PutvalSink::new(stdout, hostname, args.interval)),
        Format::Json => Box::new(JsonLinesSink::new(stdout, hostname)),
    };

    run(
        &collector,
        sink.as_mut(),
        Duration::from_secs(args.interval),
        args.once,
    );
    drop(sink);

    if let Err(e) = io::stdout().flush() {
        error!("Failed to flush stdout: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
