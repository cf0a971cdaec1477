//! Engines for Linux `/proc` statistics.
//!
//! Each engine has an init phase that runs once and discovers what the host
//! provides, and a sample phase that re-reads the files on every poll.

pub mod netstat;
pub mod nfs;
pub mod parser;
pub mod system;

pub use crate::collector::error::CollectError;
pub use netstat::{NetCounter, NetSection, NetStatEngine, NetStatSchema};
pub use nfs::{MAX_NFS_MOUNTS, NfsMountRecord, NfsStatEngine, RpcClientStats};
pub use system::SystemCollector;

/// Outcome of an engine's init phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// The subsystem is present and will be sampled.
    Enabled,
    /// The subsystem is absent on this host; samples report empty data.
    Disabled,
}
