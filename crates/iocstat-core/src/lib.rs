//! iocstat-core — host telemetry engines for IOC health records.
//!
//! Provides:
//! - `collector` — `/proc` engines (network counters, NFS client, resources)
//! - `device` — `0`/`-1` accessor facade polled by the record layer
//! - `model` — serializable records filled by the accessors
//! - `util` — text helpers (bounded copies, octal unescaping)

pub mod collector;
pub mod device;
pub mod model;
pub mod util;
