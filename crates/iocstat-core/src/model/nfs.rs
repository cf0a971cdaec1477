//! NFS mount statistics.

use serde::{Deserialize, Serialize};

/// Capacity of the mountpoint field, including the terminator slot.
pub const MOUNT_MAX: usize = 128;

/// Capacity of the hostname/IP field, including the terminator slot.
pub const NFS_IP_MAX: usize = 32;

/// Statistics for one monitored NFS mount.
///
/// Identity comes from `/proc/net/nfsfs/servers` and `/proc/mounts` at init;
/// counters come from `/proc/net/rpc/nfs` at every poll.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct NfsMountStat {
    /// Mountpoint path, at most `MOUNT_MAX - 1` bytes.
    /// Only refreshed when the caller asks to resolve mounts.
    pub mount: String,

    /// Server hostname, at most `NFS_IP_MAX - 1` bytes.
    /// Only refreshed when the caller asks to resolve mounts.
    pub ip: String,

    /// NFS protocol version from the server list (`v3` -> 3).
    pub version: u32,

    /// Server port from the server list.
    pub port: u32,

    /// Owner uid. Unknown on Linux.
    pub uid: Option<u64>,

    /// Owner gid. Unknown on Linux.
    pub gid: Option<u64>,

    /// Live NFS nodes. Unknown on Linux.
    pub live_nodes: Option<u64>,

    /// RPC calls issued by the NFS client since boot.
    /// Client-wide: every mount reports the same value.
    pub rpc_requests: u64,

    /// RPC retransmissions since boot. Client-wide like `rpc_requests`.
    pub rpc_retries: u64,

    /// RPC errors. Unknown on Linux.
    pub rpc_errors: Option<u64>,

    /// RPC timeouts. Unknown on Linux.
    pub rpc_timeouts: Option<u64>,

    /// Retry period in milliseconds. Unknown on Linux.
    pub retry_period_ms: Option<u64>,
}

/// Output record for the NFS accessor.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct NfsStatInfo {
    /// Number of monitored mounts; equals `mounts.len()`.
    pub num_mounts: usize,
    pub mounts: Vec<NfsMountStat>,
}
