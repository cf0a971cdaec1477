//! iocstatd - host health poller.
//!
//! Polls network protocol counters, NFS client statistics and host resource
//! usage from /proc at a fixed interval, the way an IOC health record layer
//! would, and reports each scan as a log line or a JSON line on stdout.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use iocstat_core::collector::{Availability, FileSystem};
#[cfg(target_os = "linux")]
use iocstat_core::collector::RealFs;
#[cfg(not(target_os = "linux"))]
use iocstat_core::collector::mock::MockFs;
use iocstat_core::device::{OK, StatsDevice};
use iocstat_core::model::{HostSnapshot, NfsStatInfo};

/// Host health poller.
#[derive(Parser)]
#[command(name = "iocstatd", about = "Host health statistics poller", version)]
struct Args {
    /// Poll interval in seconds.
    #[arg(short, long, default_value = "10")]
    interval: u64,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Stop after this many polls. Runs until interrupted when omitted.
    #[arg(short, long)]
    count: Option<u64>,

    /// Print one JSON object per poll on stdout.
    #[arg(long)]
    json: bool,

    /// Re-copy NFS hostnames and mountpoints every N polls (0 = first poll only).
    #[arg(long, default_value = "1")]
    resolve_every: u64,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["iocstatd", "iocstat_core"] {
        match format!("{}={}", target, level).parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("invalid log directive for {}: {}", target, e),
        }
    }

    // Logs go to stderr so JSON lines on stdout stay machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Whether poll number `poll` (zero-based) should copy NFS identity strings.
fn should_resolve(poll: u64, resolve_every: u64) -> bool {
    match resolve_every {
        0 => poll == 0,
        n => poll.is_multiple_of(n),
    }
}

/// Describes the contents of a snapshot for logging.
fn describe_snapshot(snapshot: &HostSnapshot) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(net) = &snapshot.net {
        if net.available {
            parts.push(format!(
                "tcp in={} out={} err={} retrans={}",
                net.tcp_received, net.tcp_sent, net.tcp_errors, net.tcp_retransmits
            ));
            parts.push(format!("ip in={} err={}", net.ip_received, net.ip_errors));
        } else {
            parts.push("net n/a".to_string());
        }
    }
    if let Some(nfs) = &snapshot.nfs {
        match nfs.mounts.first() {
            Some(first) => parts.push(format!(
                "{} nfs mounts (rpc calls={} retries={})",
                nfs.num_mounts, first.rpc_requests, first.rpc_retries
            )),
            None => parts.push("0 nfs mounts".to_string()),
        }
    }
    if let Some(mem) = &snapshot.memory {
        parts.push(format!(
            "mem {}/{}",
            format_size(mem.bytes_alloc),
            format_size(mem.bytes_total)
        ));
    }
    if let Some(load) = &snapshot.load {
        parts.push(format!(
            "cpu {:.1}% ({} cpus) self {:.1}%",
            load.cpu_load, load.num_cpus, load.process_load
        ));
    }
    if let Some(fds) = &snapshot.fds {
        match fds.max {
            Some(max) => parts.push(format!("fds {}/{}", fds.used, max)),
            None => parts.push(format!("fds {}", fds.used)),
        }
    }
    if let Some(errors) = &snapshot.if_errors {
        parts.push(format!(
            "if errors in={} out={}",
            errors.in_errors, errors.out_errors
        ));
    }

    parts.join(", ")
}

/// Formats bytes as human-readable size string.
fn format_size(bytes: u64) -> String {
    const GB: u64 = 1024 * 1024 * 1024;
    const MB: u64 = 1024 * 1024;
    const KB: u64 = 1024;

    if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}K", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

fn describe_availability(name: &str, availability: Availability) {
    match availability {
        Availability::Enabled => info!("{}: enabled", name),
        Availability::Disabled => info!("{}: disabled (not supported on this host)", name),
    }
}

fn run<F: FileSystem + Clone>(mut device: StatsDevice<F>, args: &Args) {
    if device.init_all() != OK {
        warn!("Some accessors failed to initialize; they will report errors");
    }
    let (net, nfs) = device.availability();
    describe_availability("Network statistics", net);
    describe_availability("NFS statistics", nfs);

    let interval = Duration::from_secs(args.interval);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let mut previous_nfs: Option<NfsStatInfo> = None;
    let mut poll: u64 = 0;

    info!("Starting poll loop");

    while running.load(Ordering::SeqCst) {
        let resolve = should_resolve(poll, args.resolve_every);
        let snapshot = device.snapshot(previous_nfs.as_ref(), resolve);
        poll += 1;

        if args.json {
            match serde_json::to_string(&snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => error!("Failed to serialize snapshot: {}", e),
            }
        } else {
            info!("Poll #{}: {}", poll, describe_snapshot(&snapshot));
        }
        debug!(resolve, "poll complete");

        if snapshot.nfs.is_some() {
            previous_nfs = snapshot.nfs;
        }

        if args.count.is_some_and(|count| poll >= count) {
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

    info!("Shutdown complete after {} polls", poll);
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("iocstatd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, proc={}, resolve_every={}",
        args.interval, args.proc_path, args.resolve_every
    );

    #[cfg(target_os = "linux")]
    let device = StatsDevice::new(RealFs::new(), &args.proc_path);
    #[cfg(not(target_os = "linux"))]
    let device = StatsDevice::new(MockFs::new(), &args.proc_path);

    run(device, &args);
}
