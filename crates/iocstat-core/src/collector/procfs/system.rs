//! Host resource accessors: memory, CPU load, file descriptors and
//! interface errors.

use std::path::Path;

use tracing::{debug, info};

use super::parser::{
    CpuTimes, ProcTimes, parse_cpu_stat, parse_max_open_files, parse_meminfo, parse_net_dev,
    parse_proc_times,
};
use super::{Availability, CollectError};
use crate::collector::traits::FileSystem;
use crate::model::{FdUsage, IfErrors, LoadInfo, MemUsage};

/// CPU counters remembered between polls.
#[derive(Debug, Clone, Copy)]
struct CpuBaseline {
    system: CpuTimes,
    process: ProcTimes,
}

/// Collects host-wide resource usage from `/proc/`.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    proc_path: String,
    cpu_baseline: Option<CpuBaseline>,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            cpu_baseline: None,
        }
    }

    fn path(&self, rel: &str) -> String {
        format!("{}/{}", self.proc_path, rel)
    }

    fn probe(&self, rel: &str, what: &str) -> Availability {
        let path = self.path(rel);
        if self.fs.exists(Path::new(&path)) {
            Availability::Enabled
        } else {
            info!(path = %path, "{} not available", what);
            Availability::Disabled
        }
    }

    /// Checks that `/proc/meminfo` is present.
    pub fn init_mem_usage(&self) -> Availability {
        self.probe("meminfo", "memory usage")
    }

    /// Collects memory usage from `/proc/meminfo`.
    pub fn collect_mem_usage(&self) -> Result<MemUsage, CollectError> {
        let content = self.fs.read_to_string(Path::new(&self.path("meminfo")))?;
        let info = parse_meminfo(&content)?;

        let total = info.mem_total.saturating_mul(1024);
        let free_kb = info
            .mem_available
            .unwrap_or_else(|| {
                info.mem_free
                    .saturating_add(info.buffers)
                    .saturating_add(info.cached)
            });
        let free = free_kb.saturating_mul(1024).min(total);

        Ok(MemUsage {
            bytes_total: total,
            bytes_free: free,
            bytes_alloc: total - free,
            blocks_free: None,
            blocks_alloc: None,
            max_block_size_free: None,
        })
    }

    /// Takes the CPU baseline the first load sample is measured against.
    pub fn init_cpu_usage(&mut self) -> Result<Availability, CollectError> {
        if !self.fs.exists(Path::new(&self.path("stat"))) {
            info!("cpu usage not available");
            return Ok(Availability::Disabled);
        }
        let (_, baseline) = self.read_cpu()?;
        self.cpu_baseline = Some(baseline);
        Ok(Availability::Enabled)
    }

    /// Collects CPU load since the previous call.
    ///
    /// Without a baseline the percentages are zero and this sample becomes
    /// the baseline.
    pub fn collect_cpu_usage(&mut self) -> Result<LoadInfo, CollectError> {
        let (num_cpus, current) = self.read_cpu()?;

        let mut load = LoadInfo {
            num_cpus,
            ..Default::default()
        };

        if let Some(prev) = self.cpu_baseline {
            let total = current.system.total().saturating_sub(prev.system.total());
            if total > 0 {
                let idle = current
                    .system
                    .idle_total()
                    .saturating_sub(prev.system.idle_total());
                let process = current
                    .process
                    .total()
                    .saturating_sub(prev.process.total());

                load.cpu_load = 100.0 * total.saturating_sub(idle) as f64 / total as f64;
                load.process_load = (100.0 * process as f64 / total as f64).min(100.0);
            } else {
                debug!("no CPU time elapsed since previous sample");
            }
        }

        self.cpu_baseline = Some(current);
        Ok(load)
    }

    fn read_cpu(&self) -> Result<(u32, CpuBaseline), CollectError> {
        let stat = parse_cpu_stat(&self.fs.read_to_string(Path::new(&self.path("stat")))?)?;
        let process =
            parse_proc_times(&self.fs.read_to_string(Path::new(&self.path("self/stat")))?)?;
        Ok((
            stat.num_cpus,
            CpuBaseline {
                system: stat.total,
                process,
            },
        ))
    }

    /// Checks that `/proc/self/fd` is listable.
    pub fn init_fd_usage(&self) -> Availability {
        self.probe("self/fd", "fd usage")
    }

    /// Counts open descriptors and reads the soft limit.
    pub fn collect_fd_usage(&self) -> Result<FdUsage, CollectError> {
        let used = self.fs.read_dir(Path::new(&self.path("self/fd")))?.len() as u64;
        let max = self
            .fs
            .read_to_string(Path::new(&self.path("self/limits")))
            .ok()
            .and_then(|content| parse_max_open_files(&content));

        Ok(FdUsage { used, max })
    }

    /// Checks that `/proc/net/dev` is present.
    pub fn init_if_errors(&self) -> Availability {
        self.probe("net/dev", "interface errors")
    }

    /// Sums receive/transmit errors over all interfaces except loopback.
    pub fn collect_if_errors(&self) -> Result<IfErrors, CollectError> {
        let content = self.fs.read_to_string(Path::new(&self.path("net/dev")))?;
        let devices = parse_net_dev(&content)?;

        Ok(devices
            .iter()
            .filter(|dev| dev.interface != "lo")
            .fold(IfErrors::default(), |acc, dev| IfErrors {
                in_errors: acc.in_errors.saturating_add(dev.rx_errs),
                out_errors: acc.out_errors.saturating_add(dev.tx_errs),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_collect_mem_usage() {
        let collector = SystemCollector::new(MockFs::typical_system(), "/proc");
        assert_eq!(collector.init_mem_usage(), Availability::Enabled);

        let mem = collector.collect_mem_usage().unwrap();
        assert_eq!(mem.bytes_total, 16384000 * 1024);
        assert_eq!(mem.bytes_free, 12000000 * 1024);
        assert_eq!(mem.bytes_alloc, (16384000 - 12000000) * 1024);
        assert_eq!(mem.blocks_free, None);
    }

    #[test]
    fn test_collect_mem_usage_without_mem_available() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/meminfo",
            "MemTotal: 1000 kB\nMemFree: 100 kB\nBuffers: 50 kB\nCached: 250 kB\n",
        );
        let collector = SystemCollector::new(fs, "/proc");

        let mem = collector.collect_mem_usage().unwrap();
        assert_eq!(mem.bytes_free, 400 * 1024);
        assert_eq!(mem.bytes_alloc, 600 * 1024);
    }

    #[test]
    fn test_collect_mem_usage_saturates_huge_counters() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/meminfo",
            "MemTotal: 1000 kB\nMemFree: 18446744073709551615 kB\nBuffers: 50 kB\nCached: 250 kB\n",
        );
        let collector = SystemCollector::new(fs, "/proc");

        let mem = collector.collect_mem_usage().unwrap();
        assert_eq!(mem.bytes_free, 1000 * 1024);
        assert_eq!(mem.bytes_alloc, 0);
    }

    #[test]
    fn test_cpu_usage_saturates_huge_process_times() {
        let mut collector = SystemCollector::new(MockFs::typical_system(), "/proc");
        collector.fs.add_file(
            "/proc/self/stat",
            "4242 (iocstatd) S 1 4242 4242 0 -1 4194304 100 0 0 0 18446744073709551615 18446744073709551615 0 0 20 0 4 0 500 100000000 2000",
        );
        assert_eq!(collector.init_cpu_usage().unwrap(), Availability::Enabled);

        collector.fs.add_file(
            "/proc/stat",
            "cpu  10150 500 3050 80750 1050 200 100 0 0 0\ncpu0 0 0 0 0\n",
        );
        let load = collector.collect_cpu_usage().unwrap();
        assert_eq!(load.process_load, 0.0);
        assert!((load.cpu_load - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_mem_usage_missing() {
        let collector = SystemCollector::new(MockFs::new(), "/proc");
        assert_eq!(collector.init_mem_usage(), Availability::Disabled);
        assert!(collector.collect_mem_usage().is_err());
    }

    #[test]
    fn test_cpu_usage_delta() {
        let mut collector = SystemCollector::new(MockFs::typical_system(), "/proc");
        assert_eq!(collector.init_cpu_usage().unwrap(), Availability::Enabled);

        // 1000 jiffies elapse: 750 idle, 50 iowait, 200 busy; process uses 100.
        collector.fs.add_file(
            "/proc/stat",
            "cpu  10150 500 3050 80750 1050 200 100 0 0 0\ncpu0 0 0 0 0\ncpu1 0 0 0 0\ncpu2 0 0 0 0\ncpu3 0 0 0 0\n",
        );
        collector.fs.add_file(
            "/proc/self/stat",
            "4242 (iocstatd) S 1 4242 4242 0 -1 4194304 100 0 0 0 260 90 0 0 20 0 4 0 500 100000000 2000",
        );

        let load = collector.collect_cpu_usage().unwrap();
        assert_eq!(load.num_cpus, 4);
        assert!((load.cpu_load - 20.0).abs() < 1e-9);
        assert!((load.process_load - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_cpu_usage_first_sample_without_baseline() {
        let mut collector = SystemCollector::new(MockFs::typical_system(), "/proc");

        let first = collector.collect_cpu_usage().unwrap();
        assert_eq!(first.cpu_load, 0.0);
        assert_eq!(first.process_load, 0.0);

        // Nothing changed, so no time elapsed.
        let second = collector.collect_cpu_usage().unwrap();
        assert_eq!(second.cpu_load, 0.0);
    }

    #[test]
    fn test_cpu_usage_missing() {
        let mut collector = SystemCollector::new(MockFs::new(), "/proc");
        assert_eq!(collector.init_cpu_usage().unwrap(), Availability::Disabled);
        assert!(collector.collect_cpu_usage().is_err());
    }

    #[test]
    fn test_collect_fd_usage() {
        let collector = SystemCollector::new(MockFs::typical_system(), "/proc");
        assert_eq!(collector.init_fd_usage(), Availability::Enabled);

        let fds = collector.collect_fd_usage().unwrap();
        assert_eq!(fds.used, 12);
        assert_eq!(fds.max, Some(1024));
    }

    #[test]
    fn test_collect_fd_usage_without_limits() {
        let mut fs = MockFs::new();
        fs.add_fds("/proc", 3);
        let collector = SystemCollector::new(fs, "/proc");

        let fds = collector.collect_fd_usage().unwrap();
        assert_eq!(fds.used, 3);
        assert_eq!(fds.max, None);
    }

    #[test]
    fn test_collect_if_errors_skips_loopback() {
        let collector = SystemCollector::new(MockFs::typical_system(), "/proc");
        assert_eq!(collector.init_if_errors(), Availability::Enabled);

        let errors = collector.collect_if_errors().unwrap();
        assert_eq!(errors.in_errors, 1 + 5);
        assert_eq!(errors.out_errors, 3 + 2);
    }
}
