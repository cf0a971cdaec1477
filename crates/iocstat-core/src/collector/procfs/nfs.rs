//! NFS client statistics.
//!
//! Mount identity is discovered once at init from two files:
//!
//! - `/proc/net/nfsfs/servers`: `<vN> <server-id> <port> <use> <hostname>`
//!   rows after a header line
//! - `/proc/mounts`: `<device> <mountpoint> <fstype> ...`, filtered to
//!   `nfs`/`nfs4`
//!
//! The two lists share no key. The Nth server row is paired with the Nth NFS
//! mount by position, so identities are only right when both files enumerate
//! mounts in the same order.
//!
//! Live counters come from `/proc/net/rpc/nfs`, whose `rpc` line carries the
//! client-wide call and retransmission totals. Every monitored mount reports
//! those same totals.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::parser::ParseError;
use super::{Availability, CollectError};
use crate::collector::traits::FileSystem;
use crate::model::{MOUNT_MAX, NFS_IP_MAX, NfsMountStat, NfsStatInfo};
use crate::util::{truncate_bounded, unescape_octal};

/// Maximum number of monitored mounts.
pub const MAX_NFS_MOUNTS: usize = 8;

/// Capacity of a cached hostname, including the terminator slot.
pub const HOSTNAME_MAX: usize = 255;

/// Capacity of a cached mountpoint, including the terminator slot.
pub const MOUNTPOINT_MAX: usize = 255;

/// One row of `/proc/net/nfsfs/servers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfsServer {
    pub version: u32,
    pub port: u32,
    pub use_count: u32,
    pub hostname: String,
}

/// Cached identity of a monitored mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfsMountRecord {
    pub hostname: String,
    pub mountpoint: String,
    pub version: u32,
    pub port: u32,
    pub use_count: u32,
}

/// Client-wide RPC totals from the `rpc` line of `/proc/net/rpc/nfs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RpcClientStats {
    pub calls: u64,
    pub retransmissions: u64,
    /// Third field of the line; not surfaced in [`NfsMountStat`].
    pub bad_transmissions: Option<u64>,
}

/// Parses `/proc/net/nfsfs/servers`, keeping at most [`MAX_NFS_MOUNTS`] rows.
///
/// The first line is a column header. Blank lines are skipped. A row with
/// fewer than five fields or without a `vN` version token is an error; port
/// and use count read their leading decimal digits and default to 0.
pub fn parse_nfs_servers(content: &str) -> Result<Vec<NfsServer>, ParseError> {
    let mut servers = Vec::new();

    for line in content.lines().skip(1) {
        if servers.len() == MAX_NFS_MOUNTS {
            break;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if parts.len() < 5 {
            return Err(ParseError::new(format!(
                "not enough fields in server row: expected 5, got {}",
                parts.len()
            )));
        }

        let version = parts[0]
            .strip_prefix('v')
            .map(|rest| {
                rest.chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>()
            })
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| ParseError::new(format!("invalid version token {:?}", parts[0])))?;
        let port = leading_u32(parts[2]);
        let use_count = leading_u32(parts[3]);

        servers.push(NfsServer {
            version,
            port,
            use_count,
            hostname: truncate_bounded(parts[4], HOSTNAME_MAX - 1),
        });
    }

    Ok(servers)
}

/// Reads the leading decimal digits of `token`, or 0 if there are none.
///
/// The kernel prints the port column in hex (`4e50` for 20048), so only the
/// leading digits are meaningful.
fn leading_u32(token: &str) -> u32 {
    token
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |acc, b| {
            acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        })
}

/// Extracts NFS mountpoints from a mount table, in file order, keeping at
/// most [`MAX_NFS_MOUNTS`].
///
/// Only rows whose filesystem type is exactly `nfs` or `nfs4` are kept.
pub fn parse_nfs_mountpoints(content: &str) -> Vec<String> {
    let mut mountpoints = Vec::new();

    for line in content.lines() {
        if mountpoints.len() == MAX_NFS_MOUNTS {
            break;
        }

        let mut parts = line.split_whitespace();
        let _device = parts.next();
        let (Some(mountpoint), Some(fstype)) = (parts.next(), parts.next()) else {
            continue;
        };
        if fstype != "nfs" && fstype != "nfs4" {
            continue;
        }

        mountpoints.push(truncate_bounded(
            &unescape_octal(mountpoint),
            MOUNTPOINT_MAX - 1,
        ));
    }

    mountpoints
}

/// Parses the `rpc` line of `/proc/net/rpc/nfs`.
///
/// Missing numeric fields read as zero; a missing `rpc` line is an error.
pub fn parse_rpc_client(content: &str) -> Result<RpcClientStats, ParseError> {
    let line = content
        .lines()
        .find(|line| line.split_whitespace().next() == Some("rpc"))
        .ok_or_else(|| ParseError::new("missing rpc line"))?;

    let fields: Vec<&str> = line.split_whitespace().skip(1).collect();
    let get_val = |idx: usize| -> Option<u64> { fields.get(idx).and_then(|s| s.parse().ok()) };

    Ok(RpcClientStats {
        calls: get_val(0).unwrap_or(0),
        retransmissions: get_val(1).unwrap_or(0),
        bad_transmissions: get_val(2),
    })
}

/// Pairs servers and mountpoints by position.
///
/// The result has `min(servers, mountpoints, MAX_NFS_MOUNTS)` entries.
pub fn correlate(servers: &[NfsServer], mountpoints: &[String]) -> Vec<NfsMountRecord> {
    servers
        .iter()
        .zip(mountpoints)
        .take(MAX_NFS_MOUNTS)
        .map(|(server, mountpoint)| NfsMountRecord {
            hostname: server.hostname.clone(),
            mountpoint: mountpoint.clone(),
            version: server.version,
            port: server.port,
            use_count: server.use_count,
        })
        .collect()
}

/// NFS-stat engine: caches mount identity at init, merges RPC totals per poll.
pub struct NfsStatEngine<F: FileSystem> {
    fs: F,
    rpc_path: PathBuf,
    servers_path: PathBuf,
    mounts_path: PathBuf,
    mounts: Vec<NfsMountRecord>,
    enabled: bool,
}

impl<F: FileSystem> NfsStatEngine<F> {
    /// Creates a new engine.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: &str) -> Self {
        Self {
            fs,
            rpc_path: PathBuf::from(format!("{}/net/rpc/nfs", proc_path)),
            servers_path: PathBuf::from(format!("{}/net/nfsfs/servers", proc_path)),
            mounts_path: PathBuf::from(format!("{}/mounts", proc_path)),
            mounts: Vec::new(),
            enabled: false,
        }
    }

    /// Discovers the monitored mounts.
    ///
    /// A host without NFS client support is reported as disabled, not as an
    /// error. The server list is optional; the mount table is not.
    pub fn init(&mut self) -> Result<Availability, CollectError> {
        if self.enabled {
            debug!("NFS stats already initialized");
            return Ok(Availability::Enabled);
        }

        if !self.fs.exists(&self.rpc_path) {
            info!(path = %self.rpc_path.display(), "no NFS client support; NFS stats disabled");
            return Ok(Availability::Disabled);
        }

        let servers = match self.fs.read_to_string(&self.servers_path) {
            Ok(content) => parse_nfs_servers(&content)?,
            Err(e) => {
                debug!(path = %self.servers_path.display(), error = %e, "no NFS server list, monitoring no mounts");
                Vec::new()
            }
        };

        let content = self.fs.read_to_string(&self.mounts_path)?;
        let mountpoints = parse_nfs_mountpoints(&content);

        if servers.len() != mountpoints.len() {
            warn!(
                servers = servers.len(),
                mounts = mountpoints.len(),
                "NFS server list and mount table disagree; pairing by position"
            );
        }

        self.mounts = correlate(&servers, &mountpoints);
        self.enabled = true;
        info!(mounts = self.mounts.len(), "NFS stats enabled");
        Ok(Availability::Enabled)
    }

    /// Whether `init` found NFS client support.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Mounts discovered at init.
    pub fn mounts(&self) -> &[NfsMountRecord] {
        &self.mounts
    }

    /// Refreshes `out` with the current RPC totals.
    ///
    /// Hostname and mountpoint are copied only when `resolve_mounts` is set;
    /// otherwise the strings already in `out` are kept.
    pub fn sample(&self, out: &mut NfsStatInfo, resolve_mounts: bool) -> Result<(), CollectError> {
        if !self.enabled {
            out.mounts.clear();
            out.num_mounts = 0;
            return Ok(());
        }

        let content = self.fs.read_to_string(&self.rpc_path)?;
        let rpc = parse_rpc_client(&content)?;

        out.mounts
            .resize_with(self.mounts.len(), NfsMountStat::default);

        for (stat, record) in out.mounts.iter_mut().zip(&self.mounts) {
            stat.version = record.version;
            stat.port = record.port;
            stat.uid = None;
            stat.gid = None;
            stat.live_nodes = None;
            stat.rpc_errors = None;
            stat.rpc_timeouts = None;
            stat.retry_period_ms = None;

            stat.rpc_requests = rpc.calls;
            stat.rpc_retries = rpc.retransmissions;

            if resolve_mounts {
                stat.ip = truncate_bounded(&record.hostname, NFS_IP_MAX - 1);
                stat.mount = truncate_bounded(&record.mountpoint, MOUNT_MAX - 1);
            }
        }

        out.num_mounts = self.mounts.len();
        Ok(())
    }
}
