//! Host-wide resource usage records.

use serde::{Deserialize, Serialize};

/// Memory usage.
///
/// Source: `/proc/meminfo`
///
/// Values are in bytes. The block counters describe an allocator pool and
/// have no Linux counterpart.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct MemUsage {
    /// Total usable RAM.
    /// Source: `MemTotal`
    pub bytes_total: u64,

    /// Memory available for new allocations.
    /// Source: `MemAvailable`, or `MemFree + Buffers + Cached` on old kernels
    pub bytes_free: u64,

    /// `bytes_total - bytes_free`.
    pub bytes_alloc: u64,

    pub blocks_free: Option<u64>,
    pub blocks_alloc: Option<u64>,
    pub max_block_size_free: Option<u64>,
}

/// CPU load.
///
/// Source: `/proc/stat` and `/proc/self/stat`
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct LoadInfo {
    /// Number of CPUs listed in `/proc/stat`.
    pub num_cpus: u32,

    /// Busy share of all CPUs since the previous sample, in percent.
    pub cpu_load: f64,

    /// Share of all CPU time spent in this process since the previous
    /// sample, in percent.
    pub process_load: f64,
}

/// File descriptor usage of this process.
///
/// Source: `/proc/self/fd` and `/proc/self/limits`
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct FdUsage {
    /// Open descriptors.
    pub used: u64,

    /// Soft `Max open files` limit; `None` when unlimited or unreadable.
    pub max: Option<u64>,
}

/// Network interface errors summed over all non-loopback interfaces.
///
/// Source: `/proc/net/dev`
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct IfErrors {
    /// Receive errors.
    pub in_errors: u64,

    /// Transmit errors.
    pub out_errors: u64,
}
