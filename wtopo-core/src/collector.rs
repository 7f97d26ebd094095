use crate::{cell::ResultCell, node::NodeId, ratio::Ratio};
use log::{info, warn};
use std::{collections::HashMap, sync::Mutex};

/// Accumulates per-node relative rates for one carrier-sensing probe
/// invocation.
///
/// The collector is created with the baseline (solo) rate of every
/// participating node. As the runtime delivers the simultaneous-phase
/// rates, [`RateCollector::record`] stores each node's relative rate
/// (`parallel / baseline`); the moment the last missing node reports, the
/// verdict cell resolves: the nodes are within carrier-sensing range when
/// the worst relative rate is at or below the threshold.
///
/// Deliveries keyed by a node without a baseline, and repeated deliveries
/// for the same node, are ignored.
pub struct RateCollector {
    threshold: Ratio,
    baselines: HashMap<NodeId, f64>,
    relatives: Mutex<HashMap<NodeId, f64>>,
    verdict: ResultCell<bool>,
}

impl RateCollector {
    pub fn new(baselines: HashMap<NodeId, f64>, threshold: Ratio) -> Self {
        Self {
            threshold,
            baselines,
            relatives: Mutex::new(HashMap::new()),
            verdict: ResultCell::new(),
        }
    }

    /// record one node's simultaneous-phase transmit rate
    pub fn record(&self, peer: NodeId, parallel_rate: f64) {
        let Some(baseline) = self.baselines.get(&peer).copied() else {
            warn!("ignoring rate report from unexpected node {peer}");
            return;
        };

        let mut relatives = self
            .relatives
            .lock()
            .expect("Under no condition we expect the mutex to be poisoned");

        if relatives.contains_key(&peer) {
            warn!("ignoring duplicate rate report from node {peer}");
            return;
        }

        let relative = if baseline > 0.0 {
            parallel_rate / baseline
        } else {
            // a node that could not transmit at all solo cannot tell us
            // anything better than "fully degraded"
            warn!("node {peer} has a zero baseline rate");
            0.0
        };
        info!("relative rate compared to single flow for {peer} is {relative:.2}");

        relatives.insert(peer, relative);

        if relatives.len() == self.baselines.len() {
            let worst = relatives.values().copied().fold(f64::INFINITY, f64::min);
            self.verdict.resolve(worst <= self.threshold.into_f64());
        }
    }

    /// whether every participating node has reported
    pub fn is_complete(&self) -> bool {
        let relatives = self
            .relatives
            .lock()
            .expect("Under no condition we expect the mutex to be poisoned");

        relatives.len() == self.baselines.len()
    }

    /// the verdict slot; resolves exactly when the last node reports
    pub fn verdict(&self) -> &ResultCell<bool> {
        &self.verdict
    }
}
