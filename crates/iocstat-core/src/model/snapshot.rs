//! One poll of every accessor.

use serde::{Deserialize, Serialize};

use super::net::NetStatSample;
use super::nfs::NfsStatInfo;
use super::system::{FdUsage, IfErrors, LoadInfo, MemUsage};

/// Everything gathered in one scan cycle.
///
/// A `None` block means that accessor failed on this poll; disabled
/// subsystems still produce a block with their "unavailable" contents.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct HostSnapshot {
    /// Unix timestamp (seconds since epoch) when this snapshot was taken.
    pub timestamp: i64,
    pub net: Option<NetStatSample>,
    pub nfs: Option<NfsStatInfo>,
    pub memory: Option<MemUsage>,
    pub load: Option<LoadInfo>,
    pub fds: Option<FdUsage>,
    pub if_errors: Option<IfErrors>,
}
