//! Network protocol counters from `/proc/net/netstat`.
//!
//! The file is a sequence of header/value line pairs:
//!
//! ```text
//! TcpExt: SyncookiesSent TcpTimeouts TcpInErrs ...
//! TcpExt: 0 7 3 ...
//! IpExt: InNoRoutes IpInReceives ...
//! IpExt: 0 1000 ...
//! ```
//!
//! Column order differs between kernels, so `init` maps each known counter
//! name to its column once, and every `sample` reads values positionally
//! through that map.

use std::io;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::{Availability, CollectError};
use crate::collector::traits::FileSystem;
use crate::model::NetStatSample;

/// A header/value line pair in `/proc/net/netstat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetSection {
    IpExt,
    TcpExt,
}

impl NetSection {
    pub const ALL: [NetSection; 2] = [NetSection::IpExt, NetSection::TcpExt];

    /// Exact line prefix, including the trailing space.
    pub fn prefix(self) -> &'static str {
        match self {
            NetSection::IpExt => "IpExt: ",
            NetSection::TcpExt => "TcpExt: ",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NetSection::IpExt => "IpExt",
            NetSection::TcpExt => "TcpExt",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Returns the (header, values) lines of this section, if present.
    ///
    /// The first line carrying the prefix is the header; the second one holds
    /// the values.
    fn lines(self, content: &str) -> (Option<&str>, Option<&str>) {
        let mut matching = content
            .lines()
            .filter_map(|line| line.strip_prefix(self.prefix()));
        (matching.next(), matching.next())
    }
}

/// The closed set of counters the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetCounter {
    IpInReceives,
    IpOutTransmits,
    IpInUnknownProtos,
    IpReasmTimeout,
    UdpInDatagrams,
    UdpInErrors,
    UdpOutDatagrams,
    TcpRetransSegs,
    TcpInSegs,
    TcpOutSegs,
    TcpTimeouts,
    TcpInErrs,
}

impl NetCounter {
    pub const COUNT: usize = 12;

    pub const ALL: [NetCounter; Self::COUNT] = [
        NetCounter::IpInReceives,
        NetCounter::IpOutTransmits,
        NetCounter::IpInUnknownProtos,
        NetCounter::IpReasmTimeout,
        NetCounter::UdpInDatagrams,
        NetCounter::UdpInErrors,
        NetCounter::UdpOutDatagrams,
        NetCounter::TcpRetransSegs,
        NetCounter::TcpInSegs,
        NetCounter::TcpOutSegs,
        NetCounter::TcpTimeouts,
        NetCounter::TcpInErrs,
    ];

    /// Header token naming this counter.
    pub fn name(self) -> &'static str {
        match self {
            NetCounter::IpInReceives => "IpInReceives",
            NetCounter::IpOutTransmits => "IpOutTransmits",
            NetCounter::IpInUnknownProtos => "IpInUnknownProtos",
            NetCounter::IpReasmTimeout => "IpReasmTimeout",
            NetCounter::UdpInDatagrams => "UdpInDatagrams",
            NetCounter::UdpInErrors => "UdpInErrors",
            NetCounter::UdpOutDatagrams => "UdpOutDatagrams",
            NetCounter::TcpRetransSegs => "TcpRetransSegs",
            NetCounter::TcpInSegs => "TcpInSegs",
            NetCounter::TcpOutSegs => "TcpOutSegs",
            NetCounter::TcpTimeouts => "TcpTimeouts",
            NetCounter::TcpInErrs => "TcpInErrs",
        }
    }

    /// Section whose header may carry this counter.
    ///
    /// UDP counters are not published in `/proc/net/netstat`.
    pub fn section(self) -> Option<NetSection> {
        match self {
            NetCounter::IpInReceives
            | NetCounter::IpOutTransmits
            | NetCounter::IpInUnknownProtos
            | NetCounter::IpReasmTimeout => Some(NetSection::IpExt),
            NetCounter::UdpInDatagrams | NetCounter::UdpInErrors | NetCounter::UdpOutDatagrams => {
                None
            }
            NetCounter::TcpRetransSegs
            | NetCounter::TcpInSegs
            | NetCounter::TcpOutSegs
            | NetCounter::TcpTimeouts
            | NetCounter::TcpInErrs => Some(NetSection::TcpExt),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Column offsets of the known counters, discovered from the header lines.
///
/// Offsets are zero-based positions among the tokens after the prefix.
/// A counter whose name never appears stays unresolved and reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetStatSchema {
    offsets: [Option<usize>; NetCounter::COUNT],
    sections: [bool; 2],
}

impl NetStatSchema {
    /// Builds the schema from the header lines found in `content`.
    pub fn resolve(content: &str) -> Self {
        let mut schema = Self::default();

        for section in NetSection::ALL {
            let (Some(header), _) = section.lines(content) else {
                continue;
            };
            schema.sections[section.index()] = true;

            for (index, token) in header.split_whitespace().enumerate() {
                for counter in NetCounter::ALL {
                    // First occurrence wins if a kernel ever repeats a name.
                    if counter.section() == Some(section)
                        && counter.name() == token
                        && schema.offsets[counter.index()].is_none()
                    {
                        schema.offsets[counter.index()] = Some(index);
                    }
                }
            }
        }

        schema
    }

    /// Column of `counter`, if its name was found in the header.
    pub fn offset(&self, counter: NetCounter) -> Option<usize> {
        self.offsets[counter.index()]
    }

    /// Whether the header line of `section` was present.
    pub fn has_section(&self, section: NetSection) -> bool {
        self.sections[section.index()]
    }

    /// True when neither header line was found.
    pub fn is_empty(&self) -> bool {
        !self.sections.iter().any(|present| *present)
    }

    /// Number of counters with a resolved offset.
    pub fn resolved_count(&self) -> usize {
        self.offsets.iter().filter(|o| o.is_some()).count()
    }

    /// Reads every resolved counter from the value lines in `content`.
    ///
    /// Unresolved counters, and tokens missing or unparsable in the value
    /// line, contribute zero. A section that was present when the schema was
    /// built but has no value line now is an error.
    pub fn extract(&self, content: &str) -> Result<NetStatSample, CollectError> {
        let mut raw = [0u64; NetCounter::COUNT];

        for section in NetSection::ALL {
            if !self.has_section(section) {
                continue;
            }
            let (_, Some(values)) = section.lines(content) else {
                return Err(CollectError::MissingSection(section.name()));
            };
            let values: Vec<&str> = values.split_whitespace().collect();

            for counter in NetCounter::ALL {
                if counter.section() != Some(section) {
                    continue;
                }
                raw[counter.index()] = self
                    .offset(counter)
                    .and_then(|offset| values.get(offset))
                    .and_then(|token| token.parse().ok())
                    .unwrap_or(0);
            }
        }

        let get = |counter: NetCounter| raw[counter.index()];

        Ok(NetStatSample {
            available: true,
            ip_received: get(NetCounter::IpInReceives),
            ip_sent: get(NetCounter::IpOutTransmits),
            ip_errors: get(NetCounter::IpInUnknownProtos)
                .saturating_add(get(NetCounter::IpReasmTimeout)),
            udp_received: None,
            udp_sent: None,
            udp_errors: None,
            tcp_received: get(NetCounter::TcpInSegs),
            tcp_sent: get(NetCounter::TcpOutSegs),
            tcp_errors: get(NetCounter::TcpTimeouts).saturating_add(get(NetCounter::TcpInErrs)),
            tcp_retransmits: get(NetCounter::TcpRetransSegs),
        })
    }
}

/// Network-stat engine: resolves the schema once, then samples positionally.
pub struct NetStatEngine<F: FileSystem> {
    fs: F,
    path: PathBuf,
    schema: Option<NetStatSchema>,
}

impl<F: FileSystem> NetStatEngine<F> {
    /// Creates a new engine.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: &str) -> Self {
        Self {
            fs,
            path: PathBuf::from(format!("{}/net/netstat", proc_path)),
            schema: None,
        }
    }

    /// Discovers the column layout.
    ///
    /// A missing file, or one without any known section, disables the engine
    /// without failing. Calling `init` again once enabled is a no-op.
    pub fn init(&mut self) -> Result<Availability, CollectError> {
        if self.schema.is_some() {
            debug!("network stats already initialized");
            return Ok(Availability::Enabled);
        }

        let content = match self.fs.read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "unable to open netstat; networking stats will be disabled");
                return Ok(Availability::Disabled);
            }
            Err(e) => return Err(e.into()),
        };

        let schema = NetStatSchema::resolve(&content);
        if schema.is_empty() {
            warn!(path = %self.path.display(), "no TcpExt/IpExt header found; networking stats will be disabled");
            return Ok(Availability::Disabled);
        }

        for counter in NetCounter::ALL {
            if let Some(section) = counter.section()
                && schema.has_section(section)
                && schema.offset(counter).is_none()
            {
                debug!(counter = counter.name(), section = section.name(), "counter not in header, reporting zero");
            }
        }

        info!(resolved = schema.resolved_count(), "network stats enabled");
        self.schema = Some(schema);
        Ok(Availability::Enabled)
    }

    /// Whether `init` resolved a schema.
    pub fn is_enabled(&self) -> bool {
        self.schema.is_some()
    }

    /// Resolved schema, if enabled.
    pub fn schema(&self) -> Option<&NetStatSchema> {
        self.schema.as_ref()
    }

    /// Re-reads the file and extracts current counter values.
    ///
    /// A disabled engine returns [`NetStatSample::unavailable`].
    pub fn sample(&self) -> Result<NetStatSample, CollectError> {
        let Some(schema) = &self.schema else {
            return Ok(NetStatSample::unavailable());
        };

        let content = self.fs.read_to_string(&self.path)?;
        schema.extract(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    const NETSTAT: &str = "/proc/net/netstat";

    #[test]
    fn test_resolve_offsets() {
        let content = "\
TcpExt: SyncookiesSent TcpTimeouts TcpInErrs
TcpExt: 0 7 3
";
        let schema = NetStatSchema::resolve(content);

        assert_eq!(schema.offset(NetCounter::TcpTimeouts), Some(1));
        assert_eq!(schema.offset(NetCounter::TcpInErrs), Some(2));
        assert_eq!(schema.offset(NetCounter::TcpInSegs), None);
        assert!(schema.has_section(NetSection::TcpExt));
        assert!(!schema.has_section(NetSection::IpExt));

        let sample = schema.extract(content).unwrap();
        assert_eq!(sample.tcp_errors, 10);
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let schema = NetStatSchema::resolve("TcpExt: tcptimeouts TCPTimeouts\nTcpExt: 1 2\n");
        assert_eq!(schema.offset(NetCounter::TcpTimeouts), None);
        assert_eq!(schema.resolved_count(), 0);
    }

    #[test]
    fn test_resolve_requires_exact_prefix() {
        // No space after the colon, and a prefix that only starts the same.
        let schema = NetStatSchema::resolve("TcpExt:TcpTimeouts\nTcpExtra: TcpTimeouts\n");
        assert!(schema.is_empty());
    }

    #[test]
    fn test_counter_only_resolves_in_its_section() {
        // A TCP name under IpExt does not count.
        let schema = NetStatSchema::resolve("IpExt: TcpInErrs IpInReceives\nIpExt: 5 6\n");
        assert_eq!(schema.offset(NetCounter::TcpInErrs), None);
        assert_eq!(schema.offset(NetCounter::IpInReceives), Some(1));
    }

    #[test]
    fn test_udp_counters_never_resolve() {
        let schema =
            NetStatSchema::resolve("TcpExt: UdpInDatagrams\nTcpExt: 9\nIpExt: UdpInErrors\nIpExt: 9\n");
        assert_eq!(schema.offset(NetCounter::UdpInDatagrams), None);
        assert_eq!(schema.offset(NetCounter::UdpInErrors), None);

        let sample = schema
            .extract("TcpExt: UdpInDatagrams\nTcpExt: 9\nIpExt: UdpInErrors\nIpExt: 9\n")
            .unwrap();
        assert_eq!(sample.udp_received, None);
        assert_eq!(sample.udp_sent, None);
        assert_eq!(sample.udp_errors, None);
    }

    #[test]
    fn test_extract_aggregates() {
        let content = "\
TcpExt: TcpRetransSegs TcpInSegs TcpOutSegs TcpTimeouts TcpInErrs
TcpExt: 11 1000 900 4 6
IpExt: IpInReceives IpOutTransmits IpInUnknownProtos IpReasmTimeout
IpExt: 5000 4000 2 3
";
        let sample = NetStatSchema::resolve(content).extract(content).unwrap();

        assert!(sample.available);
        assert_eq!(sample.ip_received, 5000);
        assert_eq!(sample.ip_sent, 4000);
        assert_eq!(sample.ip_errors, 5);
        assert_eq!(sample.tcp_received, 1000);
        assert_eq!(sample.tcp_sent, 900);
        assert_eq!(sample.tcp_errors, 10);
        assert_eq!(sample.tcp_retransmits, 11);
    }

    #[test]
    fn test_extract_missing_header_name_reads_zero() {
        let content = "\
TcpExt: TcpInSegs TcpInErrs
TcpExt: 1000 6
";
        let sample = NetStatSchema::resolve(content).extract(content).unwrap();

        assert_eq!(sample.tcp_received, 1000);
        assert_eq!(sample.tcp_errors, 6);
        assert_eq!(sample.tcp_retransmits, 0);
    }

    #[test]
    fn test_extract_truncated_value_line() {
        let header = "TcpExt: TcpInSegs TcpOutSegs TcpInErrs\n";
        let schema = NetStatSchema::resolve(header);

        let sample = schema
            .extract("TcpExt: TcpInSegs TcpOutSegs TcpInErrs\nTcpExt: 10 x\n")
            .unwrap();
        assert_eq!(sample.tcp_received, 10);
        assert_eq!(sample.tcp_sent, 0);
        assert_eq!(sample.tcp_errors, 0);
    }

    #[test]
    fn test_extract_missing_value_line() {
        let header = "TcpExt: TcpInSegs\n";
        let schema = NetStatSchema::resolve(header);

        let err = schema.extract(header).unwrap_err();
        assert!(matches!(err, CollectError::MissingSection("TcpExt")));
    }

    #[test]
    fn test_engine_typical_system() {
        let fs = MockFs::typical_system();
        let mut engine = NetStatEngine::new(fs, "/proc");

        assert_eq!(engine.init().unwrap(), Availability::Enabled);
        let schema = engine.schema().unwrap();
        assert_eq!(schema.offset(NetCounter::TcpTimeouts), Some(1));
        assert_eq!(schema.offset(NetCounter::TcpInErrs), Some(2));

        let sample = engine.sample().unwrap();
        assert_eq!(sample.tcp_errors, 10);
        assert_eq!(sample.tcp_received, 500000);
        assert_eq!(sample.tcp_sent, 450000);
        assert_eq!(sample.tcp_retransmits, 1000);
        assert_eq!(sample.ip_received, 1000000);
        assert_eq!(sample.ip_errors, 7);
    }

    #[test]
    fn test_engine_sample_is_idempotent() {
        let mut engine = NetStatEngine::new(MockFs::typical_system(), "/proc");
        engine.init().unwrap();

        let first = engine.sample().unwrap();
        let second = engine.sample().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_engine_init_is_idempotent() {
        let mut engine = NetStatEngine::new(MockFs::typical_system(), "/proc");
        engine.init().unwrap();
        let schema = engine.schema().cloned();

        assert_eq!(engine.init().unwrap(), Availability::Enabled);
        assert_eq!(engine.schema().cloned(), schema);
    }

    #[test]
    fn test_engine_sees_counter_updates() {
        let mut fs = MockFs::new();
        fs.add_file(NETSTAT, "TcpExt: TcpInSegs\nTcpExt: 1\n");
        let mut engine = NetStatEngine::new(fs, "/proc");
        engine.init().unwrap();
        assert_eq!(engine.sample().unwrap().tcp_received, 1);

        engine.fs.add_file(NETSTAT, "TcpExt: TcpInSegs\nTcpExt: 42\n");
        assert_eq!(engine.sample().unwrap().tcp_received, 42);
    }

    #[test]
    fn test_engine_missing_file_disables() {
        let mut engine = NetStatEngine::new(MockFs::new(), "/proc");

        assert_eq!(engine.init().unwrap(), Availability::Disabled);
        assert!(!engine.is_enabled());

        let sample = engine.sample().unwrap();
        assert_eq!(sample, NetStatSample::unavailable());
        assert!(!sample.available);
    }

    #[test]
    fn test_engine_unreadable_file_fails_init() {
        let mut fs = MockFs::new();
        fs.deny(NETSTAT);
        let mut engine = NetStatEngine::new(fs, "/proc");

        assert!(matches!(engine.init(), Err(CollectError::Io(_))));
        assert!(!engine.is_enabled());
    }

    #[test]
    fn test_engine_empty_file_disables() {
        let mut fs = MockFs::new();
        fs.add_file(NETSTAT, "");
        let mut engine = NetStatEngine::new(fs, "/proc");

        assert_eq!(engine.init().unwrap(), Availability::Disabled);
        assert_eq!(engine.sample().unwrap(), NetStatSample::unavailable());
    }

    #[test]
    fn test_engine_file_vanishes_after_init() {
        let mut engine = NetStatEngine::new(MockFs::typical_system(), "/proc");
        engine.init().unwrap();

        engine.fs.remove_file(NETSTAT);
        assert!(matches!(engine.sample(), Err(CollectError::Io(_))));
    }

    #[test]
    fn test_engine_section_vanishes_after_init() {
        let mut engine = NetStatEngine::new(MockFs::typical_system(), "/proc");
        engine.init().unwrap();

        engine.fs.add_file(NETSTAT, "IpExt: IpInReceives\nIpExt: 5\n");
        assert!(matches!(
            engine.sample(),
            Err(CollectError::MissingSection("TcpExt"))
        ));
    }
}
