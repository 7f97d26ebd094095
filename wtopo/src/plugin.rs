use log::{debug, info};
use wtopo_core::{
    estimate_nodes_in_carrier_sensing_range, estimate_nodes_in_communication_range,
    upi::{Sniffer, TrafficGen},
    NodeId, ProbeResult, ProbeSetup, ProbeTiming, Ratio,
};
use std::fmt;

/// Why a node left the testbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    /// clean disconnect
    Disconnected,
    /// the runtime stopped hearing from the node
    Lost,
}

impl fmt::Display for LeaveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => "disconnected".fmt(f),
            Self::Lost => "lost".fmt(f),
        }
    }
}

/// Node lifecycle notifications delivered by the control runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    Joined { node: NodeId },
    Left { node: NodeId, reason: LeaveReason },
}

/// The topology-probing control application.
///
/// Keeps track of the currently attached nodes (in attach order, which is
/// also the order pairwise sweeps enumerate them in) and fronts the
/// probing operations over the runtime capabilities `R`.
pub struct TopologyApp<R> {
    runtime: R,
    nodes: Vec<NodeId>,
    timing: ProbeTiming,
}

impl<R> TopologyApp<R> {
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            nodes: Vec::new(),
            timing: ProbeTiming::default(),
        }
    }

    /// override the probe timings, e.g. for a slow testbed
    pub fn with_timing(mut self, timing: ProbeTiming) -> Self {
        self.timing = timing;
        self
    }

    /// the currently attached nodes, in attach order
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// process a node lifecycle notification
    ///
    /// Joining twice or leaving unseen is harmless; the registry stays
    /// duplicate-free.
    pub fn handle_event(&mut self, event: NodeEvent) {
        match event {
            NodeEvent::Joined { node } => {
                if self.nodes.contains(&node) {
                    debug!("node {node} is already attached");
                } else {
                    info!("added new node: {node}");
                    self.nodes.push(node);
                }
            }
            NodeEvent::Left { node, reason } => {
                if self.nodes.contains(&node) {
                    self.nodes.retain(|attached| *attached != node);
                    info!("node {node} removed: {reason}");
                } else {
                    debug!("unknown node {node} left ({reason})");
                }
            }
        }
    }
}

impl<R: TrafficGen> TopologyApp<R> {
    /// operation `estimate_nodes_in_carrier_sensing_range`
    pub fn estimate_carrier_sensing_range(
        &self,
        nodes: &[NodeId],
        setup: ProbeSetup,
        tau: Ratio,
    ) -> Vec<ProbeResult> {
        estimate_nodes_in_carrier_sensing_range(&self.runtime, nodes, setup, self.timing, tau)
    }
}

impl<R: TrafficGen + Sniffer> TopologyApp<R> {
    /// operation `estimate_nodes_in_communication_range`
    pub fn estimate_communication_range(
        &self,
        nodes: &[NodeId],
        setup: ProbeSetup,
        min_pdr: Ratio,
    ) -> Vec<ProbeResult> {
        estimate_nodes_in_communication_range(&self.runtime, nodes, setup, self.timing, min_pdr)
    }
}
