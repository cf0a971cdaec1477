//! Network protocol counters.

use serde::{Deserialize, Serialize};

/// Protocol counters for one poll.
///
/// Source: `/proc/net/netstat` (`IpExt` and `TcpExt` sections)
///
/// All values are cumulative since boot. Rates are left to the caller.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct NetStatSample {
    /// Whether the engine was enabled when this sample was taken.
    /// A disabled engine yields zeros with `available = false`.
    pub available: bool,

    /// Packets received on the IP layer.
    /// Source: `IpInReceives`
    pub ip_received: u64,

    /// Packets transmitted on the IP layer.
    /// Source: `IpOutTransmits`
    pub ip_sent: u64,

    /// Packets lost to IP-layer errors.
    /// Source: `IpInUnknownProtos` + `IpReasmTimeout`
    pub ip_errors: u64,

    /// UDP datagrams received. Not provided by this data source.
    pub udp_received: Option<u64>,

    /// UDP datagrams sent. Not provided by this data source.
    pub udp_sent: Option<u64>,

    /// UDP datagrams lost to errors. Not provided by this data source.
    pub udp_errors: Option<u64>,

    /// TCP segments received.
    /// Source: `TcpInSegs`
    pub tcp_received: u64,

    /// TCP segments sent.
    /// Source: `TcpOutSegs`
    pub tcp_sent: u64,

    /// TCP segments lost.
    /// Source: `TcpTimeouts` + `TcpInErrs`
    pub tcp_errors: u64,

    /// TCP segments retransmitted.
    /// Source: `TcpRetransSegs`
    pub tcp_retransmits: u64,
}

impl NetStatSample {
    /// Sample reported while networking stats are disabled.
    pub fn unavailable() -> Self {
        Self::default()
    }
}
