//! The per-pair experiment protocols.
//!
//! Both probes follow the same outline: drive a handful of remote calls
//! in a strict temporal order, register a callback for the asynchronously
//! delivered measurement, then block (bounded by
//! [`ProbeTiming::result_timeout`]) until the verdict resolves.
//! All probe state lives for a single invocation; nothing is shared
//! between pairs.

mod carrier_sense;
mod comm_range;

pub use self::{carrier_sense::CarrierSenseProbe, comm_range::CommRangeProbe};

use crate::{
    defaults::{
        PARALLEL_TX_OFFSET, PROBE_TX_OFFSET, RESULT_TIMEOUT, SETTLE_INTERVAL, SNIFF_DURATION,
        SNIFF_OFFSET,
    },
    node::NodeId,
};
use std::time::Duration;

/// Radio setup shared by every probe of one estimation sweep.
#[derive(Debug, Clone)]
pub struct ProbeSetup {
    /// monitor device the generated traffic and the captures run on
    pub device: String,
    /// channel to tune, when the caller pins one
    pub channel: Option<u8>,
}

impl ProbeSetup {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            channel: None,
        }
    }

    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = Some(channel);
        self
    }
}

/// Timing knobs of the probe protocols.
///
/// The defaults in [`crate::defaults`] suit a real testbed; tests shrink
/// them to keep runs fast.
#[derive(Debug, Clone, Copy)]
pub struct ProbeTiming {
    /// pause after each single-flow baseline phase
    pub settle_interval: Duration,
    /// scheduling offset for the simultaneous generation
    pub parallel_tx_offset: Duration,
    /// scheduling offset for the capture
    pub sniff_offset: Duration,
    /// scheduling offset for the probed sender
    pub probe_tx_offset: Duration,
    /// capture window length
    pub sniff_duration: Duration,
    /// upper bound on waiting for asynchronously delivered results
    pub result_timeout: Duration,
}

impl Default for ProbeTiming {
    fn default() -> Self {
        Self {
            settle_interval: SETTLE_INTERVAL,
            parallel_tx_offset: PARALLEL_TX_OFFSET,
            sniff_offset: SNIFF_OFFSET,
            probe_tx_offset: PROBE_TX_OFFSET,
            sniff_duration: SNIFF_DURATION,
            result_timeout: RESULT_TIMEOUT,
        }
    }
}

/// Outcome of probing one node pair.
///
/// `verdict` is `None` when the experiment could not be brought to a
/// conclusion: a failed baseline, a rejected schedule, or results that
/// never arrived. Callers must tolerate the absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub node1: NodeId,
    pub node2: NodeId,
    pub verdict: Option<bool>,
}

impl ProbeResult {
    pub(crate) fn unresolved(node1: NodeId, node2: NodeId) -> Self {
        Self {
            node1,
            node2,
            verdict: None,
        }
    }
}
