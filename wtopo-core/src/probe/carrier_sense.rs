use crate::{
    collector::RateCollector,
    node::NodeId,
    probe::{ProbeResult, ProbeSetup, ProbeTiming},
    ratio::Ratio,
    upi::{GroupIdGenerator, TrafficCallback, TrafficGen, TrafficSpec},
};
use log::{debug, error, info};
use std::{collections::HashMap, sync::Arc, thread, time::SystemTime};

/// Carrier-sensing range probe.
///
/// Compares each node's solo backlogged transmit rate against the rate it
/// achieves while the other node transmits at the same time. If either
/// node keeps at most `tau` of its solo rate, the two nodes defer to
/// each other: they are within carrier-sensing range.
///
/// One `CarrierSenseProbe` is reused across the pairs of a sweep; all
/// per-experiment state is created afresh in [`CarrierSenseProbe::run`].
pub struct CarrierSenseProbe {
    setup: ProbeSetup,
    timing: ProbeTiming,
    tau: Ratio,
    group_ids: GroupIdGenerator,
}

impl CarrierSenseProbe {
    pub fn new(setup: ProbeSetup, timing: ProbeTiming, tau: Ratio) -> Self {
        Self {
            setup,
            timing,
            tau,
            group_ids: GroupIdGenerator::new(),
        }
    }

    pub fn tau(&self) -> Ratio {
        self.tau
    }

    /// run the full three-phase experiment between two nodes
    ///
    /// Phases, in strict order:
    /// 1. solo backlogged run at `node1`, then at `node2`: the baselines;
    /// 2. backlogged runs scheduled on both nodes at the same future
    ///    instant;
    /// 3. bounded wait until both simultaneous rates arrived and the
    ///    verdict resolved.
    pub fn run(&self, traffic: &impl TrafficGen, node1: NodeId, node2: NodeId) -> ProbeResult {
        info!("testing carrier-sensing range between {node1} and {node2}");

        let spec = TrafficSpec::backlogged(&self.setup.device).set_channel(self.setup.channel);

        let mut baselines = HashMap::new();
        for node in [node1, node2] {
            debug!("single flow at {node}");
            match traffic.run_blocking_traffic(node, &spec) {
                Ok(rate) => baselines.insert(node, rate),
                Err(err) => {
                    error!("baseline measurement at {node} failed: {err}");
                    return ProbeResult::unresolved(node1, node2);
                }
            };
            thread::sleep(self.timing.settle_interval);
        }
        info!("single flow rates: {baselines:?}");

        let collector = Arc::new(RateCollector::new(baselines, self.tau));
        let callback: TrafficCallback = {
            let collector = Arc::clone(&collector);
            Arc::new(move |group, peer, rate| {
                debug!("group {group}: received rate report from {peer}: {rate}");
                collector.record(peer, rate);
            })
        };

        debug!("two flows at the same time at {node1} and {node2}");
        let group = self.group_ids.next_id();
        let execute_at = SystemTime::now() + self.timing.parallel_tx_offset;
        for node in [node1, node2] {
            let scheduled =
                traffic.schedule_traffic(node, &spec, execute_at, group, Some(callback.clone()));
            if let Err(err) = scheduled {
                // e.g. the runtime saw `execute_at` in its past; the wait
                // below still gives a late report the chance to land
                error!("scheduling the simultaneous flow at {node} failed: {err}");
            }
        }

        match collector.verdict().wait(self.timing.result_timeout) {
            Ok(verdict) => {
                info!("carrier-sensing verdict for ({node1}, {node2}): {verdict}");
                ProbeResult {
                    node1,
                    node2,
                    verdict: Some(verdict),
                }
            }
            Err(timeout) => {
                error!("no carrier-sensing verdict for ({node1}, {node2}): {timeout}");
                ProbeResult::unresolved(node1, node2)
            }
        }
    }
}
