//! Device-support accessors.
//!
//! The record-processing layer that polls these accessors expects each one to
//! return `0` on success (including "not supported on this host") and `-1` on
//! failure, and to fill a caller-owned record. `StatsDevice` adapts the
//! engines to that contract and logs every failure.

use chrono::Utc;
use tracing::{error, warn};

use crate::collector::{
    Availability, CollectError, FileSystem, NetStatEngine, NfsStatEngine, SystemCollector,
};
use crate::model::{FdUsage, HostSnapshot, IfErrors, LoadInfo, MemUsage, NetStatSample, NfsStatInfo};

/// Return code for success.
pub const OK: i32 = 0;

/// Return code for failure.
pub const ERROR: i32 = -1;

/// Reduces an engine result to the `0`/`-1` convention, logging failures.
fn status<T>(accessor: &str, result: Result<T, CollectError>) -> i32 {
    match result {
        Ok(_) => OK,
        Err(e) => {
            error!(accessor, error = %e, "statistics accessor failed");
            ERROR
        }
    }
}

/// All host statistics accessors, owned by one poller.
pub struct StatsDevice<F: FileSystem + Clone> {
    net: NetStatEngine<F>,
    nfs: NfsStatEngine<F>,
    system: SystemCollector<F>,
}

impl<F: FileSystem + Clone> StatsDevice<F> {
    /// Creates the accessors without touching the filesystem.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: &str) -> Self {
        Self {
            net: NetStatEngine::new(fs.clone(), proc_path),
            nfs: NfsStatEngine::new(fs.clone(), proc_path),
            system: SystemCollector::new(fs, proc_path),
        }
    }

    pub fn init_ip_stat(&mut self) -> i32 {
        status("init_ip_stat", self.net.init())
    }

    /// Fills `out` with the current protocol counters.
    ///
    /// On failure `out` is reset to the unavailable sample so stale counters
    /// are never mistaken for fresh ones.
    pub fn get_ip_stat(&self, out: &mut NetStatSample) -> i32 {
        match self.net.sample() {
            Ok(sample) => {
                *out = sample;
                OK
            }
            Err(e) => {
                *out = NetStatSample::unavailable();
                status::<()>("get_ip_stat", Err(e))
            }
        }
    }

    pub fn init_nfs_stat(&mut self) -> i32 {
        status("init_nfs_stat", self.nfs.init())
    }

    /// Refreshes `out` with NFS counters; identity strings are copied only
    /// when `resolve_mounts` is set.
    ///
    /// On failure the RPC counters in `out` are zeroed, like the network
    /// record, while mount identity is kept for the next successful poll.
    pub fn get_nfs_stat(&self, out: &mut NfsStatInfo, resolve_mounts: bool) -> i32 {
        let result = self.nfs.sample(out, resolve_mounts);
        if result.is_err() {
            for mount in &mut out.mounts {
                mount.rpc_requests = 0;
                mount.rpc_retries = 0;
            }
        }
        status("get_nfs_stat", result)
    }

    pub fn init_mem_usage(&mut self) -> i32 {
        self.system.init_mem_usage();
        OK
    }

    pub fn get_mem_usage(&self, out: &mut MemUsage) -> i32 {
        status(
            "get_mem_usage",
            self.system.collect_mem_usage().map(|mem| *out = mem),
        )
    }

    pub fn init_cpu_usage(&mut self) -> i32 {
        status("init_cpu_usage", self.system.init_cpu_usage())
    }

    pub fn get_cpu_usage(&mut self, out: &mut LoadInfo) -> i32 {
        status(
            "get_cpu_usage",
            self.system.collect_cpu_usage().map(|load| *out = load),
        )
    }

    pub fn init_fd_usage(&mut self) -> i32 {
        self.system.init_fd_usage();
        OK
    }

    pub fn get_fd_usage(&self, out: &mut FdUsage) -> i32 {
        status(
            "get_fd_usage",
            self.system.collect_fd_usage().map(|fds| *out = fds),
        )
    }

    pub fn init_if_errors(&mut self) -> i32 {
        self.system.init_if_errors();
        OK
    }

    pub fn get_if_errors(&self, out: &mut IfErrors) -> i32 {
        status(
            "get_if_errors",
            self.system.collect_if_errors().map(|errors| *out = errors),
        )
    }

    /// Runs every init accessor. Returns `-1` if any of them failed.
    pub fn init_all(&mut self) -> i32 {
        let codes = [
            self.init_ip_stat(),
            self.init_nfs_stat(),
            self.init_mem_usage(),
            self.init_cpu_usage(),
            self.init_fd_usage(),
            self.init_if_errors(),
        ];
        if codes.contains(&ERROR) { ERROR } else { OK }
    }

    /// Whether the network and NFS engines found their subsystems.
    pub fn availability(&self) -> (Availability, Availability) {
        let of = |enabled: bool| {
            if enabled {
                Availability::Enabled
            } else {
                Availability::Disabled
            }
        };
        (of(self.net.is_enabled()), of(self.nfs.is_enabled()))
    }

    /// Polls every accessor once.
    ///
    /// `previous_nfs` carries the NFS record of the last poll so that
    /// identity strings survive polls made without `resolve_mounts`.
    pub fn snapshot(
        &mut self,
        previous_nfs: Option<&NfsStatInfo>,
        resolve_mounts: bool,
    ) -> HostSnapshot {
        let timestamp = Utc::now().timestamp();

        let mut net = NetStatSample::default();
        let net = (self.get_ip_stat(&mut net) == OK).then_some(net);

        let mut nfs = previous_nfs.cloned().unwrap_or_default();
        let nfs = (self.get_nfs_stat(&mut nfs, resolve_mounts) == OK).then_some(nfs);

        let mut memory = MemUsage::default();
        let memory = (self.get_mem_usage(&mut memory) == OK).then_some(memory);

        let mut load = LoadInfo::default();
        let load = (self.get_cpu_usage(&mut load) == OK).then_some(load);

        let mut fds = FdUsage::default();
        let fds = (self.get_fd_usage(&mut fds) == OK).then_some(fds);

        let mut if_errors = IfErrors::default();
        let if_errors = (self.get_if_errors(&mut if_errors) == OK).then_some(if_errors);

        if net.is_none() && nfs.is_none() {
            warn!("network and NFS accessors both failed this poll");
        }

        HostSnapshot {
            timestamp,
            net,
            nfs,
            memory,
            load,
            fds,
            if_errors,
        }
    }
}
