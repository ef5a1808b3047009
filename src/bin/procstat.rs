//! procstat - print system and process statistics read from /proc.
//!
//! A small front end over the `procstat` library: one subcommand per group
//! of statistics, human-readable tables by default and JSON with `--json`.

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use procstat::collector::{Collector, RealFs};
use procstat::config::CollectorConfig;
use procstat::error::ProcessError;
use procstat::fmt::{
    FmtStyle, format_bytes, format_cpu_seconds, format_duration, format_percent, format_timestamp,
    truncate,
};
use procstat::model::{
    AttrValue, ConnectionKind, CpuTimes, NetConnection, ProcessAttr, ProcessAttrs, SwapMemory,
    User, VirtualMemory,
};

/// System and process statistics from the /proc filesystem.
#[derive(Parser)]
#[command(name = "procstat", about = "System and process statistics from /proc", version)]
struct Args {
    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Path to /proc filesystem.
    #[arg(long, env = "PROCSTAT_PROC_PATH", default_value = "/proc", global = true)]
    proc_path: String,

    /// Path to the utmp session file.
    #[arg(long, default_value = "/var/run/utmp", global = true)]
    utmp_path: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is warnings only.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// CPU, memory, swap, boot time and logged-in users.
    Summary {
        /// Seconds to sample CPU utilization over.
        #[arg(long, default_value = "0.5")]
        interval: f64,
    },
    /// Process table.
    Ps {
        /// Comma-separated attributes to show.
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "ppid,name,status,memory_info,cpu_times,num_threads"
        )]
        attrs: Vec<ProcessAttr>,
        /// Sort order.
        #[arg(long, value_enum, default_value_t = SortKey::Pid)]
        sort: SortKey,
        /// Show at most this many processes.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Details of one process.
    Info {
        pid: u32,
    },
    /// Socket connections.
    Net {
        /// inet, inet4, inet6, tcp, tcp4, tcp6, udp, udp4 or udp6.
        #[arg(long, default_value = "inet")]
        kind: ConnectionKind,
    },
    /// Mounted filesystems and block device counters.
    Disks {
        /// Include virtual filesystems.
        #[arg(long)]
        all: bool,
    },
    /// Print a line of utilization figures every interval until Ctrl-C.
    Monitor {
        /// Refresh interval in seconds.
        #[arg(short, long, default_value = "1")]
        interval: f64,
        /// Stop after this many lines.
        #[arg(short = 'n', long)]
        count: Option<u64>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortKey {
    Pid,
    Name,
    Rss,
    Cpu,
}

impl SortKey {
    fn required_attr(self) -> Option<ProcessAttr> {
        match self {
            SortKey::Pid => None,
            SortKey::Name => Some(ProcessAttr::Name),
            SortKey::Rss => Some(ProcessAttr::MemoryInfo),
            SortKey::Cpu => Some(ProcessAttr::CpuTimes),
        }
    }
}

type CliResult = Result<(), Box<dyn Error>>;

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    match format!("procstat={}", level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("invalid log directive: {}", e),
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = CollectorConfig::default()
        .with_proc_path(args.proc_path.trim_end_matches('/'))
        .with_utmp_path(&args.utmp_path);
    debug!(
        proc = %config.proc_path,
        utmp = %config.utmp_path,
        clock_ticks = config.clock_ticks,
        "collector configured"
    );
    let collector = Collector::with_config(RealFs::new(), config);

    let result = match args.command {
        Command::Summary { interval } => summary(&collector, seconds(interval), args.json),
        Command::Ps { attrs, sort, limit } => ps(&collector, attrs, sort, limit, args.json),
        Command::Info { pid } => process_info(&collector, pid, args.json),
        Command::Net { kind } => net(&collector, kind, args.json),
        Command::Disks { all } => disks(&collector, all, args.json),
        Command::Monitor { interval, count } => monitor(&collector, seconds(interval), count),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_else(|_| {
        warn!(value, "invalid interval, using 1s");
        Duration::from_secs(1)
    })
}

fn print_json(value: &impl Serialize) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Summary {
    cpu_percent: f64,
    cpu_times: CpuTimes,
    logical_cpus: usize,
    physical_cpus: usize,
    virtual_memory: VirtualMemory,
    swap_memory: SwapMemory,
    boot_time: f64,
    users: Vec<User>,
}

fn summary(collector: &Collector<RealFs>, interval: Duration, as_json: bool) -> CliResult {
    let summary = Summary {
        cpu_percent: collector.cpu_percent(Some(interval)),
        cpu_times: collector.cpu_times(),
        logical_cpus: collector.cpu_count(true),
        physical_cpus: collector.cpu_count(false),
        virtual_memory: collector.virtual_memory(),
        swap_memory: collector.swap_memory(),
        boot_time: collector.boot_time(),
        users: collector.users(),
    };
    if as_json {
        return print_json(&summary);
    }

    let uptime = Local::now().timestamp() - summary.boot_time as i64;
    println!(
        "boot:    {} (up {})",
        format_timestamp(summary.boot_time),
        format_duration(uptime, FmtStyle::Detail)
    );
    println!(
        "cpu:     {} busy, {} logical / {} physical",
        format_percent(summary.cpu_percent),
        summary.logical_cpus,
        summary.physical_cpus
    );
    let t = &summary.cpu_times;
    println!(
        "         user {:.2}s  system {:.2}s  idle {:.2}s  interrupt {:.2}s",
        t.user, t.system, t.idle, t.interrupt
    );
    let mem = &summary.virtual_memory;
    println!(
        "memory:  {} used of {} ({}), {} available",
        format_bytes(mem.used, FmtStyle::Detail),
        format_bytes(mem.total, FmtStyle::Detail),
        format_percent(mem.percent),
        format_bytes(mem.available, FmtStyle::Detail)
    );
    let swap = &summary.swap_memory;
    println!(
        "swap:    {} used of {} ({}), in {} / out {}",
        format_bytes(swap.used, FmtStyle::Detail),
        format_bytes(swap.total, FmtStyle::Detail),
        format_percent(swap.percent),
        format_bytes(swap.sin, FmtStyle::Detail),
        format_bytes(swap.sout, FmtStyle::Detail)
    );
    for user in &summary.users {
        println!(
            "user:    {:<12} {:<8} {:<20} {}",
            user.name,
            user.terminal,
            user.host,
            format_timestamp(user.started)
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ps
// ---------------------------------------------------------------------------

fn ps(
    collector: &Collector<RealFs>,
    mut attrs: Vec<ProcessAttr>,
    sort: SortKey,
    limit: Option<usize>,
    as_json: bool,
) -> CliResult {
    attrs.retain(|attr| *attr != ProcessAttr::Pid);
    if let Some(attr) = sort.required_attr()
        && !attrs.contains(&attr)
    {
        attrs.push(attr);
    }
    attrs.sort_unstable();
    attrs.dedup();

    let mut requested = attrs.clone();
    requested.push(ProcessAttr::Pid);

    let started = Instant::now();
    let mut rows: Vec<ProcessAttrs> = collector
        .process_iter(&requested)?
        .map(|entry| entry.attrs)
        .collect();
    debug!(
        processes = rows.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "process table collected"
    );

    sort_rows(&mut rows, sort);
    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    if as_json {
        return print_json(&rows);
    }

    let mut header = format!("{:>7}", "PID");
    for attr in &attrs {
        header.push(' ');
        header.push_str(&pad(column_header(*attr), column_width(*attr), *attr));
    }
    println!("{}", header.trim_end());

    for row in &rows {
        let mut line = match row.get(ProcessAttr::Pid) {
            Some(AttrValue::Pid(pid)) => format!("{:>7}", pid),
            _ => format!("{:>7}", "?"),
        };
        for attr in &attrs {
            let cell = row.get(*attr).map(format_attr).unwrap_or_default();
            line.push(' ');
            line.push_str(&pad(
                &truncate(&cell, column_width(*attr)),
                column_width(*attr),
                *attr,
            ));
        }
        println!("{}", line.trim_end());
    }
    Ok(())
}

fn sort_rows(rows: &mut [ProcessAttrs], sort: SortKey) {
    match sort {
        SortKey::Pid => {}
        SortKey::Name => rows.sort_by(|a, b| a.name().cmp(&b.name())),
        SortKey::Rss => rows.sort_by_key(|r| std::cmp::Reverse(r.memory_info().map(|m| m.rss))),
        SortKey::Cpu => rows.sort_by(|a, b| {
            let total = |r: &ProcessAttrs| r.cpu_times().map(|t| t.user + t.system).unwrap_or(0.0);
            total(b).total_cmp(&total(a))
        }),
    }
}

fn column_header(attr: ProcessAttr) -> &'static str {
    match attr {
        ProcessAttr::Pid => "PID",
        ProcessAttr::Name => "NAME",
        ProcessAttr::Exe => "EXE",
        ProcessAttr::Cmdline => "COMMAND",
        ProcessAttr::Status => "STATUS",
        ProcessAttr::Ppid => "PPID",
        ProcessAttr::CreateTime => "STARTED",
        ProcessAttr::MemoryInfo => "RSS",
        ProcessAttr::CpuTimes => "TIME",
        ProcessAttr::NumThreads => "THR",
    }
}

fn column_width(attr: ProcessAttr) -> usize {
    match attr {
        ProcessAttr::Pid | ProcessAttr::Ppid => 7,
        ProcessAttr::Name => 16,
        ProcessAttr::Exe => 32,
        ProcessAttr::Cmdline => 60,
        ProcessAttr::Status => 12,
        ProcessAttr::CreateTime => 19,
        ProcessAttr::MemoryInfo => 8,
        ProcessAttr::CpuTimes => 10,
        ProcessAttr::NumThreads => 4,
    }
}

fn pad(cell: &str, width: usize, attr: ProcessAttr) -> String {
    match attr {
        ProcessAttr::Ppid
        | ProcessAttr::MemoryInfo
        | ProcessAttr::CpuTimes
        | ProcessAttr::NumThreads => format!("{:>width$}", cell, width = width),
        _ => format!("{:<width$}", cell, width = width),
    }
}

fn format_attr(value: &AttrValue) -> String {
    match value {
        AttrValue::Pid(v) | AttrValue::Ppid(v) | AttrValue::NumThreads(v) => v.to_string(),
        AttrValue::Name(s) | AttrValue::Exe(s) => s.clone(),
        AttrValue::Cmdline(args) => args.join(" "),
        AttrValue::Status(status) => status.to_string(),
        AttrValue::CreateTime(t) => format_timestamp(*t),
        AttrValue::MemoryInfo(m) => format_bytes(m.rss, FmtStyle::Compact),
        AttrValue::CpuTimes(t) => format_cpu_seconds(t.user + t.system),
    }
}

// ---------------------------------------------------------------------------
// info
// ---------------------------------------------------------------------------

/// Maps `AccessDenied` to `None` so that one unreadable field does not hide
/// the rest.
fn readable<T>(result: Result<T, ProcessError>) -> Result<Option<T>, ProcessError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ProcessError::AccessDenied { pid }) => {
            debug!(pid, "field not readable");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn process_info(collector: &Collector<RealFs>, pid: u32, as_json: bool) -> CliResult {
    let process = collector.process(pid);

    let name = readable(process.name())?;
    let exe = readable(process.exe())?;
    let cmdline = readable(process.cmdline())?;
    let status = readable(process.status())?;
    let ppid = readable(process.ppid())?;
    let create_time = readable(process.create_time())?;
    let memory = readable(process.memory_info())?;
    let cpu = readable(process.cpu_times())?;
    let threads = readable(process.num_threads())?;
    let open_files = readable(process.open_files())?;
    let children: Vec<u32> = process
        .children(false)?
        .iter()
        .map(|child| child.pid())
        .collect();

    if as_json {
        return print_json(&json!({
            "pid": pid,
            "name": name,
            "exe": exe,
            "cmdline": cmdline,
            "status": status,
            "ppid": ppid,
            "create_time": create_time,
            "memory_info": memory,
            "cpu_times": cpu,
            "num_threads": threads,
            "open_files": open_files,
            "children": children,
        }));
    }

    let unknown = || "?".to_string();
    println!("pid:       {}", pid);
    println!("name:      {}", name.unwrap_or_else(unknown));
    println!("exe:       {}", exe.unwrap_or_else(unknown));
    println!(
        "cmdline:   {}",
        cmdline.map(|args| args.join(" ")).unwrap_or_else(unknown)
    );
    println!(
        "status:    {}",
        status.map(|s| s.to_string()).unwrap_or_else(unknown)
    );
    println!("ppid:      {}", ppid.map(|p| p.to_string()).unwrap_or_else(unknown));
    println!(
        "started:   {}",
        create_time.map(format_timestamp).unwrap_or_else(unknown)
    );
    if let Some(m) = memory {
        println!(
            "memory:    rss {}, vms {}",
            format_bytes(m.rss, FmtStyle::Detail),
            format_bytes(m.vms, FmtStyle::Detail)
        );
    }
    if let Some(t) = cpu {
        println!(
            "cpu:       user {:.2}s, system {:.2}s (children {:.2}s / {:.2}s)",
            t.user, t.system, t.children_user, t.children_system
        );
    }
    println!(
        "threads:   {}",
        threads.map(|n| n.to_string()).unwrap_or_else(unknown)
    );
    match open_files {
        Some(files) => {
            for file in files {
                println!("open file: {:>4} {}", file.fd, file.path);
            }
        }
        None => println!("open file: ?"),
    }
    if !children.is_empty() {
        let pids: Vec<String> = children.iter().map(u32::to_string).collect();
        println!("children:  {}", pids.join(" "));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// net
// ---------------------------------------------------------------------------

fn net(collector: &Collector<RealFs>, kind: ConnectionKind, as_json: bool) -> CliResult {
    let connections = collector.net_connections(kind);
    let counters = collector.net_io_counters_pernic();
    if as_json {
        return print_json(&json!({
            "connections": connections,
            "interfaces": counters,
        }));
    }

    println!(
        "{:<10} {:<11} {:<46} {:<46} STATUS",
        "FAMILY", "TYPE", "LOCAL", "REMOTE"
    );
    for conn in &connections {
        print_connection(conn);
    }

    println!();
    println!(
        "{:<12} {:>10} {:>10} {:>12} {:>12} {:>8} {:>8}",
        "IFACE", "SENT", "RECV", "PKTS SENT", "PKTS RECV", "ERRIN", "ERROUT"
    );
    for (name, io) in &counters {
        println!(
            "{:<12} {:>10} {:>10} {:>12} {:>12} {:>8} {:>8}",
            name,
            format_bytes(io.bytes_sent, FmtStyle::Compact),
            format_bytes(io.bytes_recv, FmtStyle::Compact),
            io.packets_sent,
            io.packets_recv,
            io.errin,
            io.errout
        );
    }
    Ok(())
}

fn print_connection(conn: &NetConnection) {
    let family = serde_json::to_value(conn.family)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let kind = serde_json::to_value(conn.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let remote = conn
        .raddr
        .as_ref()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<10} {:<11} {:<46} {:<46} {}",
        family,
        kind,
        conn.laddr.to_string(),
        remote,
        conn.status
    );
}

// ---------------------------------------------------------------------------
// disks
// ---------------------------------------------------------------------------

fn disks(collector: &Collector<RealFs>, all: bool, as_json: bool) -> CliResult {
    let partitions = collector.disk_partitions(all);
    let usage: Vec<_> = partitions
        .iter()
        .map(|p| collector.disk_usage(&p.mountpoint))
        .collect();
    let io = collector.disk_io_counters_perdisk();

    if as_json {
        let mounts: Vec<_> = partitions
            .iter()
            .zip(&usage)
            .map(|(partition, usage)| json!({ "partition": partition, "usage": usage }))
            .collect();
        return print_json(&json!({ "mounts": mounts, "io": io }));
    }

    println!(
        "{:<20} {:<24} {:<8} {:>9} {:>9} {:>9} {:>6}",
        "DEVICE", "MOUNT", "TYPE", "SIZE", "USED", "FREE", "USE%"
    );
    for (partition, usage) in partitions.iter().zip(&usage) {
        println!(
            "{:<20} {:<24} {:<8} {:>9} {:>9} {:>9} {:>6}",
            truncate(&partition.device, 20),
            truncate(&partition.mountpoint, 24),
            partition.fstype,
            format_bytes(usage.total, FmtStyle::Compact),
            format_bytes(usage.used, FmtStyle::Compact),
            format_bytes(usage.free, FmtStyle::Compact),
            format_percent(usage.percent)
        );
    }

    println!();
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10}",
        "DISK", "READS", "WRITES", "READ", "WRITTEN"
    );
    for (name, counters) in &io {
        println!(
            "{:<12} {:>10} {:>10} {:>10} {:>10}",
            name,
            counters.read_count,
            counters.write_count,
            format_bytes(counters.read_bytes, FmtStyle::Compact),
            format_bytes(counters.write_bytes, FmtStyle::Compact)
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// monitor
// ---------------------------------------------------------------------------

fn monitor(collector: &Collector<RealFs>, interval: Duration, count: Option<u64>) -> CliResult {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    // Prime the CPU sample so the first line reports this interval.
    collector.cpu_percent(None);
    let mut last_disk = collector.disk_io_counters();
    let mut last_net = collector.net_io_counters();
    let mut last_at = Instant::now();

    println!(
        "{:<8} {:>6} {:>6} {:>6} {:>10} {:>10} {:>10} {:>10}",
        "TIME", "CPU%", "MEM%", "SWAP%", "DISK R/s", "DISK W/s", "NET TX/s", "NET RX/s"
    );

    let mut lines = 0u64;
    while running.load(Ordering::SeqCst) && count.is_none_or(|n| lines < n) {
        let deadline = last_at + interval;
        while running.load(Ordering::SeqCst) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(100).min(deadline.saturating_duration_since(Instant::now())));
        }
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let disk = collector.disk_io_counters();
        let net = collector.net_io_counters();
        let now = Instant::now();
        let elapsed = now.duration_since(last_at).as_secs_f64().max(f64::EPSILON);
        let rate = |current: u64, previous: u64| {
            (current.saturating_sub(previous) as f64 / elapsed) as u64
        };

        println!(
            "{:<8} {:>6.1} {:>6.1} {:>6.1} {:>10} {:>10} {:>10} {:>10}",
            Local::now().format("%H:%M:%S"),
            collector.cpu_percent(None),
            collector.virtual_memory().percent,
            collector.swap_memory().percent,
            format_bytes(rate(disk.read_bytes, last_disk.read_bytes), FmtStyle::Compact),
            format_bytes(rate(disk.write_bytes, last_disk.write_bytes), FmtStyle::Compact),
            format_bytes(rate(net.bytes_sent, last_net.bytes_sent), FmtStyle::Compact),
            format_bytes(rate(net.bytes_recv, last_net.bytes_recv), FmtStyle::Compact),
        );

        last_disk = disk;
        last_net = net;
        last_at = now;
        lines += 1;
    }
    Ok(())
}
