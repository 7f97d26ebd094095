/*!
# Wireless topology probing primitives

Measures pairwise radio relationships between remote wireless testbed
nodes: whether two nodes are within **carrier-sensing range** (their
concurrent transmissions throttle each other) and whether they are within
**communication range** (one node's frames reliably reach the other).

The crate does not drive radios itself. It sequences remote traffic
generation and packet capture (consumed through the capability traits in
[`upi`]) into timed per-pair experiments, collects the asynchronously
delivered measurements, and reduces them to one threshold verdict per
pair. See [`estimate_nodes_in_carrier_sensing_range`] and
[`estimate_nodes_in_communication_range`] for the sweep entry points.
*/

pub mod defaults;
pub mod probe;
pub mod upi;

mod cell;
mod collector;
mod estimator;
mod node;
mod pairs;
mod ratio;
mod rate;

pub use self::{
    cell::{ResultCell, WaitTimeout},
    collector::RateCollector,
    estimator::{estimate_nodes_in_carrier_sensing_range, estimate_nodes_in_communication_range},
    node::NodeId,
    pairs::{index_pairs, node_pairs, InsufficientNodes},
    probe::{CarrierSenseProbe, CommRangeProbe, ProbeResult, ProbeSetup, ProbeTiming},
    ratio::{Ratio, RatioOutOfRange},
    rate::TxRate,
};
