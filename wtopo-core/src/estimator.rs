use crate::{
    node::NodeId,
    pairs,
    probe::{CarrierSenseProbe, CommRangeProbe, ProbeResult, ProbeSetup, ProbeTiming},
    ratio::Ratio,
    upi::{Sniffer, TrafficGen},
};
use log::{debug, error};

/// Probe every unordered pair of `nodes` for carrier sensing.
///
/// Pairs run strictly one after another, never concurrently (two
/// experiments on the same medium would corrupt each other), so the
/// sweep latency grows with C(N, 2). The result follows the pair
/// enumeration order. With fewer than two nodes the error is logged and the result is
/// empty; probe-level failures surface as unresolved verdicts, never as
/// errors.
pub fn estimate_nodes_in_carrier_sensing_range(
    traffic: &impl TrafficGen,
    nodes: &[NodeId],
    setup: ProbeSetup,
    timing: ProbeTiming,
    tau: Ratio,
) -> Vec<ProbeResult> {
    debug!("estimating carrier-sensing range for nodes: {nodes:?}");

    let pairs = match pairs::node_pairs(nodes) {
        Ok(pairs) => pairs,
        Err(err) => {
            error!("carrier-sensing estimation aborted: {err}");
            return Vec::new();
        }
    };

    let probe = CarrierSenseProbe::new(setup, timing, tau);
    pairs
        .into_iter()
        .map(|(&node1, &node2)| probe.run(traffic, node1, node2))
        .collect()
}

/// Probe every unordered pair of `nodes` for communication range.
///
/// Same sweep contract as
/// [`estimate_nodes_in_carrier_sensing_range`]: sequential pairs,
/// enumeration order, empty result plus a logged error for fewer than two
/// nodes.
pub fn estimate_nodes_in_communication_range(
    runtime: &(impl TrafficGen + Sniffer),
    nodes: &[NodeId],
    setup: ProbeSetup,
    timing: ProbeTiming,
    min_pdr: Ratio,
) -> Vec<ProbeResult> {
    debug!("estimating communication range for nodes: {nodes:?}");

    let pairs = match pairs::node_pairs(nodes) {
        Ok(pairs) => pairs,
        Err(err) => {
            error!("communication-range estimation aborted: {err}");
            return Vec::new();
        }
    };

    let probe = CommRangeProbe::new(setup, timing, min_pdr);
    pairs
        .into_iter()
        .map(|(&node1, &node2)| probe.run(runtime, node1, node2))
        .collect()
}
