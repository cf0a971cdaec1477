//! Parsers for the single-purpose `/proc` files behind the resource accessors.
//!
//! These are pure functions over file contents, easily tested with string
//! inputs. The table-driven netstat and NFS formats live in their own modules.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for super::CollectError {
    fn from(e: ParseError) -> Self {
        super::CollectError::Parse(e.message)
    }
}

// ============ Memory Parser ============

/// Parsed data from `/proc/meminfo`, in kilobytes.
#[derive(Debug, Clone, Default)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
    /// Absent on kernels older than 3.14.
    pub mem_available: Option<u64>,
    pub buffers: u64,
    pub cached: u64,
}

/// Parses `/proc/meminfo` content.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut info = MemInfo::default();
    let mut saw_total = false;

    let parse_kb = |line: &str| -> u64 {
        line.split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    };

    for line in content.lines() {
        if line.starts_with("MemTotal:") {
            info.mem_total = parse_kb(line);
            saw_total = true;
        } else if line.starts_with("MemFree:") {
            info.mem_free = parse_kb(line);
        } else if line.starts_with("MemAvailable:") {
            info.mem_available = Some(parse_kb(line));
        } else if line.starts_with("Buffers:") {
            info.buffers = parse_kb(line);
        } else if line.starts_with("Cached:") {
            info.cached = parse_kb(line);
        }
    }

    if !saw_total {
        return Err(ParseError::new("missing MemTotal in meminfo"));
    }

    Ok(info)
}

// ============ CPU Parsers ============

/// Aggregate CPU times from `/proc/stat`, in jiffies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Sum of all accounted states.
    pub fn total(&self) -> u64 {
        self.user
            .saturating_add(self.nice)
            .saturating_add(self.system)
            .saturating_add(self.idle)
            .saturating_add(self.iowait)
            .saturating_add(self.irq)
            .saturating_add(self.softirq)
            .saturating_add(self.steal)
    }

    /// Time spent not doing work.
    pub fn idle_total(&self) -> u64 {
        self.idle.saturating_add(self.iowait)
    }
}

/// CPU section of `/proc/stat`.
#[derive(Debug, Clone, Default)]
pub struct CpuStat {
    /// The aggregate `cpu` line.
    pub total: CpuTimes,
    /// Number of `cpuN` lines.
    pub num_cpus: u32,
}

/// Parses the CPU lines of `/proc/stat`.
pub fn parse_cpu_stat(content: &str) -> Result<CpuStat, ParseError> {
    let mut stat = CpuStat::default();
    let mut saw_aggregate = false;

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(label) = parts.first() else {
            continue;
        };

        if *label == "cpu" {
            let get_val =
                |idx: usize| -> u64 { parts.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };
            stat.total = CpuTimes {
                user: get_val(1),
                nice: get_val(2),
                system: get_val(3),
                idle: get_val(4),
                iowait: get_val(5),
                irq: get_val(6),
                softirq: get_val(7),
                steal: get_val(8),
            };
            saw_aggregate = true;
        } else if label
            .strip_prefix("cpu")
            .is_some_and(|id| id.parse::<u32>().is_ok())
        {
            stat.num_cpus += 1;
        }
    }

    if !saw_aggregate {
        return Err(ParseError::new("missing aggregate cpu line in stat"));
    }

    Ok(stat)
}

/// CPU time consumed by a process, in jiffies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcTimes {
    pub utime: u64,
    pub stime: u64,
}

impl ProcTimes {
    /// User plus system time.
    pub fn total(&self) -> u64 {
        self.utime.saturating_add(self.stime)
    }
}

/// Parses `utime` and `stime` out of `/proc/[pid]/stat`.
///
/// The comm field can contain spaces and parentheses, so fields are counted
/// from the last `)`.
pub fn parse_proc_times(content: &str) -> Result<ProcTimes, ParseError> {
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' in stat"))?;

    // state is field 0 after the comm; utime and stime are 11 and 12.
    let fields: Vec<&str> = content[close_paren + 1..].split_whitespace().collect();
    let parse_field = |idx: usize, name: &str| -> Result<u64, ParseError> {
        fields
            .get(idx)
            .ok_or_else(|| ParseError::new(format!("missing field {}", name)))?
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {}", name)))
    };

    Ok(ProcTimes {
        utime: parse_field(11, "utime")?,
        stime: parse_field(12, "stime")?,
    })
}

// ============ Limits Parser ============

/// Extracts the soft `Max open files` limit from `/proc/[pid]/limits`.
///
/// Returns `None` if the row is missing or the limit is `unlimited`.
pub fn parse_max_open_files(content: &str) -> Option<u64> {
    let line = content.lines().find(|l| l.starts_with("Max open files"))?;
    line["Max open files".len()..]
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
}

// ============ Network Device Stats Parser ============

/// Error counters for one interface from `/proc/net/dev`.
#[derive(Debug, Clone, Default)]
pub struct NetDevErrors {
    pub interface: String,
    pub rx_errs: u64,
    pub tx_errs: u64,
}

/// Parses `/proc/net/dev` content.
///
/// Format:
/// Inter-|   Receive                                                |  Transmit
///  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
///    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
pub fn parse_net_dev(content: &str) -> Result<Vec<NetDevErrors>, ParseError> {
    let mut devices = Vec::new();

    for line in content.lines() {
        if line.contains('|') || line.trim().is_empty() {
            continue;
        }

        let Some((interface, rest)) = line.split_once(':') else {
            continue;
        };

        let values: Vec<&str> = rest.split_whitespace().collect();
        if values.len() < 16 {
            continue;
        }

        let get_val =
            |idx: usize| -> u64 { values.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        devices.push(NetDevErrors {
            interface: interface.trim().to_string(),
            rx_errs: get_val(2),
            tx_errs: get_val(10),
        });
    }

    Ok(devices)
}
