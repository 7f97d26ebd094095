//! The capability seam to the external control runtime.
//!
//! The probing core never talks to a radio itself: traffic generation,
//! packet capture and link statistics are remote calls the runtime
//! executes on the target node. The traits in this module are the whole
//! surface the core consumes; everything behind them (transport, remote
//! execution, clock distribution) is the runtime's business.
//!
//! Scheduled operations take an **absolute** execution timestamp so that
//! several nodes can act at the same instant. This only works when the
//! testbed clocks are synchronized (PTP or equivalent), a precondition
//! the core cannot verify.

use crate::{
    defaults::{
        BACKLOGGED_PACKET_COUNT, DEFAULT_DST_ADDR, DEFAULT_PAYLOAD_SIZE, DEFAULT_PHY_RATE,
        DEFAULT_SRC_ADDR, SNIFF_DURATION,
    },
    node::NodeId,
    rate::TxRate,
};
use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, SystemTime},
};
use thiserror::Error;

/// Errors surfaced by the runtime when the core invokes a capability.
#[derive(Debug, Error)]
pub enum UpiError {
    /// the runtime refused a timed operation, typically because the
    /// requested execution point already lies in its past
    #[error("scheduling rejected: {reason}")]
    Scheduling { reason: String },

    /// the remote call itself failed on the target node
    #[error("remote call failed: {reason}")]
    Remote { reason: String },
}

/// Experiment group tag.
///
/// Every probe invocation draws a fresh one and passes it to the
/// scheduled calls; the runtime echoes it back in traffic callbacks so
/// deliveries can be told apart from stale ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// a generator for monotonically increasing **unique** [`GroupId`]
#[derive(Debug, Clone, Default)]
pub struct GroupIdGenerator(Arc<AtomicU64>);

impl GroupIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> GroupId {
        GroupId(self.0.fetch_add(1, Ordering::SeqCst))
    }
}

/// Opaque handle to a scheduled remote operation.
///
/// There is no cancellation: once scheduled, an operation either runs and
/// reports, or its results never arrive and the waiting probe times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(u64);

impl ScheduleHandle {
    pub const fn new(handle: u64) -> Self {
        Self(handle)
    }
}

/// Callback invoked by the runtime once a scheduled traffic generation on
/// one node has produced its measured transmit rate (bits per second).
///
/// The reporting node is an explicit parameter: implementations must not
/// rely on any ambient "current peer" state, deliveries may interleave.
pub type TrafficCallback = Arc<dyn Fn(GroupId, NodeId, f64) + Send + Sync>;

/// Report delivered by a scheduled capture once its window closed.
#[derive(Debug, Clone)]
pub struct SniffReport {
    /// capture completion time on the sniffing node
    pub time: SystemTime,
    /// node the capture ran on
    pub peer: NodeId,
    /// matching frames seen; `None` when the capture saw nothing at all
    pub packets: Option<u64>,
}

/// Callback invoked by the runtime with the outcome of a scheduled
/// capture.
pub type SniffCallback = Arc<dyn Fn(SniffReport) + Send + Sync>;

/// Parameters of a layer-2 traffic generation run.
#[derive(Debug, Clone)]
pub struct TrafficSpec {
    /// monitor device to inject on
    pub device: String,
    /// channel to tune before generating, when the caller pins one
    pub channel: Option<u8>,
    /// number of frames to send
    pub packet_count: u32,
    /// inter-frame gap; `None` means backlogged, send as fast as the
    /// device accepts
    pub interval: Option<Duration>,
    /// PHY rate to transmit at
    pub phy_rate: TxRate,
    /// IP payload size in bytes
    pub payload_size: u32,
    /// destination address stamped on the frames
    pub dst_addr: String,
    /// source address stamped on the frames
    pub src_addr: String,
}

impl TrafficSpec {
    /// a backlogged run: saturate the medium and let the runtime report
    /// the rate that was actually achieved
    pub fn backlogged(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            channel: None,
            packet_count: BACKLOGGED_PACKET_COUNT,
            interval: None,
            phy_rate: DEFAULT_PHY_RATE,
            payload_size: DEFAULT_PAYLOAD_SIZE,
            dst_addr: DEFAULT_DST_ADDR.to_string(),
            src_addr: DEFAULT_SRC_ADDR.to_string(),
        }
    }

    /// a paced run: `packet_count` frames, one every `interval`
    pub fn paced(device: impl Into<String>, packet_count: u32, interval: Duration) -> Self {
        Self {
            packet_count,
            interval: Some(interval),
            ..Self::backlogged(device)
        }
    }

    pub fn set_channel(mut self, channel: Option<u8>) -> Self {
        self.channel = channel;
        self
    }
}

/// Parameters of a layer-2 capture.
#[derive(Debug, Clone)]
pub struct SniffSpec {
    /// monitor device to capture on
    pub device: String,
    /// channel to tune before capturing, when the caller pins one
    pub channel: Option<u8>,
    /// capture window length
    pub duration: Duration,
    /// count only frames with this destination address
    pub dst_addr: String,
    /// count only frames with this source address
    pub src_addr: String,
}

impl SniffSpec {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            channel: None,
            duration: SNIFF_DURATION,
            dst_addr: DEFAULT_DST_ADDR.to_string(),
            src_addr: DEFAULT_SRC_ADDR.to_string(),
        }
    }

    pub fn set_channel(mut self, channel: Option<u8>) -> Self {
        self.channel = channel;
        self
    }

    pub fn set_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Remote traffic-generation capability.
pub trait TrafficGen {
    /// run a generation immediately, blocking until it completes, and
    /// return the measured transmit rate in bits per second
    fn run_blocking_traffic(&self, node: NodeId, spec: &TrafficSpec) -> Result<f64, UpiError>;

    /// schedule a generation on `node` at the absolute instant
    /// `execute_at`; when a callback is given, the runtime invokes it
    /// once this node's measured rate is available
    fn schedule_traffic(
        &self,
        node: NodeId,
        spec: &TrafficSpec,
        execute_at: SystemTime,
        group: GroupId,
        callback: Option<TrafficCallback>,
    ) -> Result<ScheduleHandle, UpiError>;
}

/// Remote packet-capture capability.
pub trait Sniffer {
    /// schedule a capture on `node` at the absolute instant `execute_at`;
    /// the runtime invokes the callback once the capture window closed
    fn schedule_sniff(
        &self,
        node: NodeId,
        spec: &SniffSpec,
        execute_at: SystemTime,
        callback: SniffCallback,
    ) -> Result<ScheduleHandle, UpiError>;
}

/// Remote link-statistics capability.
pub trait LinkStats {
    /// per-station inactivity times of the devices currently associated
    /// with `node`'s interface `iface`, keyed by station MAC address
    fn inactivity_times(
        &self,
        node: NodeId,
        iface: &str,
    ) -> Result<HashMap<String, Duration>, UpiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_ids_are_unique_and_increasing() {
        let generator = GroupIdGenerator::new();

        let a = generator.next_id();
        let b = generator.next_id();
        assert!(a < b);

        // clones share the counter
        let c = generator.clone().next_id();
        assert!(b < c);
    }

    #[test]
    fn backlogged_spec_defaults() {
        let spec = TrafficSpec::backlogged("mon0");

        assert_eq!(spec.device, "mon0");
        assert_eq!(spec.packet_count, BACKLOGGED_PACKET_COUNT);
        assert!(spec.interval.is_none());
        assert_eq!(spec.phy_rate, DEFAULT_PHY_RATE);
    }

    #[test]
    fn paced_spec_overrides() {
        let spec = TrafficSpec::paced("mon0", 255, Duration::from_millis(10));

        assert_eq!(spec.packet_count, 255);
        assert_eq!(spec.interval, Some(Duration::from_millis(10)));
    }
}
