//! Host statistics collection from the Linux `/proc` filesystem.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        StatsDevice                            │
//! │  ┌───────────────┐ ┌───────────────┐ ┌─────────────────────┐  │
//! │  │ NetStatEngine │ │ NfsStatEngine │ │  SystemCollector    │  │
//! │  │ /proc/net/    │ │ /proc/net/rpc │ │  meminfo, stat,     │  │
//! │  │   netstat     │ │ nfsfs, mounts │ │  self/fd, net/dev   │  │
//! │  └───────┬───────┘ └───────┬───────┘ └──────────┬──────────┘  │
//! │          └─────────────────┼────────────────────┘             │
//! │                     ┌──────▼──────┐                           │
//! │                     │  FileSystem │ (trait)                   │
//! │                     └──────┬──────┘                           │
//! └────────────────────────────┼──────────────────────────────────┘
//!                     ┌────────┴────────┐
//!              ┌──────▼──────┐   ┌──────▼──────┐
//!              │   RealFs    │   │   MockFs    │
//!              └─────────────┘   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use iocstat_core::collector::{Availability, MockFs, NetStatEngine};
//!
//! let mut engine = NetStatEngine::new(MockFs::typical_system(), "/proc");
//! assert_eq!(engine.init().unwrap(), Availability::Enabled);
//! let sample = engine.sample().unwrap();
//! assert_eq!(sample.tcp_errors, 10);
//! ```

mod error;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use error::CollectError;
pub use mock::MockFs;
pub use procfs::{Availability, NetStatEngine, NfsStatEngine, SystemCollector};
pub use traits::{FileSystem, RealFs};
