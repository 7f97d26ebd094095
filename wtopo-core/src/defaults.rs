use crate::{Ratio, TxRate};
use std::time::Duration;

/// Default carrier-sensing threshold (TAU)
///
/// Two nodes are considered within carrier-sensing range when concurrent
/// operation degrades either node's throughput below this fraction of its
/// solo rate.
///
/// ```
/// # use wtopo_core::defaults::*;
/// assert_eq!(DEFAULT_TAU.to_string(), "0.9");
/// ```
pub const DEFAULT_TAU: Ratio = Ratio::from_percent(90);

/// Default minimum packet delivery ratio (MINPDR)
///
/// Two nodes are considered within communication range when at least this
/// fraction of the probe frames is received.
pub const DEFAULT_MIN_PDR: Ratio = Ratio::from_percent(90);

/// Pause between the two single-flow baseline phases, leaving the medium
/// time to drain between measurements.
pub const SETTLE_INTERVAL: Duration = Duration::from_secs(1);

/// How far in the future the simultaneous generation of the
/// carrier-sensing probe is scheduled on both nodes.
///
/// The offset must cover the round-trip to the slower of the two nodes,
/// or the runtime will reject the timestamp as already past.
pub const PARALLEL_TX_OFFSET: Duration = Duration::from_secs(3);

/// How far in the future the capture of the communication-range probe is
/// scheduled on the receiving node.
pub const SNIFF_OFFSET: Duration = Duration::from_secs(2);

/// How far in the future the probed sender of the communication-range
/// probe starts transmitting. Strictly after [`SNIFF_OFFSET`] so the
/// capture is already running when the first frame goes out.
pub const PROBE_TX_OFFSET: Duration = Duration::from_secs(3);

/// Capture window of the communication-range probe.
pub const SNIFF_DURATION: Duration = Duration::from_secs(5);

/// How long a probe waits for its asynchronously delivered results before
/// giving up with an unresolved verdict.
///
/// An order of magnitude above the longest scheduled phase: when this
/// expires the callback is lost, not late.
pub const RESULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of frames of a backlogged generation run.
pub const BACKLOGGED_PACKET_COUNT: u32 = 1_000;

/// Number of frames sent by the communication-range probe; the delivery
/// ratio is computed against this.
pub const PROBE_PACKET_COUNT: u32 = 255;

/// Inter-frame gap of the communication-range probe transmission.
pub const PROBE_PACKET_INTERVAL: Duration = Duration::from_millis(10);

/// IP payload size of generated frames, in bytes.
pub const DEFAULT_PAYLOAD_SIZE: u32 = 1_350;

/// Default PHY rate for generated traffic
///
/// ```
/// # use wtopo_core::defaults::*;
/// assert_eq!(DEFAULT_PHY_RATE.to_string(), "12mbps");
/// ```
pub const DEFAULT_PHY_RATE: TxRate = TxRate::from_mbps(12);

/// Destination address stamped on probe frames, so captures can filter
/// for them.
pub const DEFAULT_DST_ADDR: &str = "1.1.1.1";

/// Source address stamped on probe frames.
pub const DEFAULT_SRC_ADDR: &str = "2.2.2.2";
