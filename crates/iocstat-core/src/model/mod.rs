//! Records filled by the engines and handed to device support.
//!
//! - [`net`]: protocol counters from `/proc/net/netstat`
//! - [`nfs`]: NFS mount identity and RPC client counters
//! - [`system`]: memory, CPU load, file descriptors, interface errors
//! - [`snapshot`]: one poll of every accessor, for the daemon
//!
//! Counters that a data source cannot provide are `None`, never a fake zero.

mod net;
mod nfs;
mod snapshot;
mod system;

pub use net::NetStatSample;
pub use nfs::{MOUNT_MAX, NFS_IP_MAX, NfsMountStat, NfsStatInfo};
pub use snapshot::HostSnapshot;
pub use system::{FdUsage, IfErrors, LoadInfo, MemUsage};
