use crate::{
    cell::ResultCell,
    defaults::{PROBE_PACKET_COUNT, PROBE_PACKET_INTERVAL},
    node::NodeId,
    probe::{ProbeResult, ProbeSetup, ProbeTiming},
    ratio::Ratio,
    upi::{GroupIdGenerator, Sniffer, SniffCallback, SniffSpec, TrafficGen, TrafficSpec},
};
use log::{debug, error, info};
use std::{sync::Arc, time::SystemTime};

/// Communication-range probe.
///
/// Has `node2` transmit a fixed number of paced probe frames while
/// `node1` captures; the pair is within communication range when the
/// packet delivery ratio reaches the threshold.
pub struct CommRangeProbe {
    setup: ProbeSetup,
    timing: ProbeTiming,
    min_pdr: Ratio,
    group_ids: GroupIdGenerator,
}

impl CommRangeProbe {
    pub fn new(setup: ProbeSetup, timing: ProbeTiming, min_pdr: Ratio) -> Self {
        Self {
            setup,
            timing,
            min_pdr,
            group_ids: GroupIdGenerator::new(),
        }
    }

    pub fn min_pdr(&self) -> Ratio {
        self.min_pdr
    }

    /// run the experiment: capture at `node1`, transmit at `node2`
    ///
    /// The capture is scheduled slightly before the transmission so the
    /// window is already open when the first frame goes out; both use
    /// absolute timestamps against the synchronized testbed clock.
    pub fn run(
        &self,
        runtime: &(impl TrafficGen + Sniffer),
        node1: NodeId,
        node2: NodeId,
    ) -> ProbeResult {
        info!("testing communication range between {node1} and {node2}");

        let received = Arc::new(ResultCell::new());
        let callback: SniffCallback = {
            let received = Arc::clone(&received);
            Arc::new(move |report| {
                debug!(
                    "capture report from {peer}: {packets:?}",
                    peer = report.peer,
                    packets = report.packets,
                );
                // a capture that saw nothing is an explicit zero
                received.resolve(report.packets.unwrap_or(0));
            })
        };

        let sniff_spec = SniffSpec::new(&self.setup.device)
            .set_channel(self.setup.channel)
            .set_duration(self.timing.sniff_duration);
        let sniff_at = SystemTime::now() + self.timing.sniff_offset;
        debug!("sniff probe traffic at {node1}");
        if let Err(err) = runtime.schedule_sniff(node1, &sniff_spec, sniff_at, callback) {
            error!("scheduling the capture at {node1} failed: {err}");
        }

        let traffic_spec =
            TrafficSpec::paced(&self.setup.device, PROBE_PACKET_COUNT, PROBE_PACKET_INTERVAL)
                .set_channel(self.setup.channel);
        let send_at = SystemTime::now() + self.timing.probe_tx_offset;
        debug!("generate probe traffic at {node2}");
        let group = self.group_ids.next_id();
        if let Err(err) = runtime.schedule_traffic(node2, &traffic_spec, send_at, group, None) {
            error!("scheduling the probe transmission at {node2} failed: {err}");
        }

        match received.wait(self.timing.result_timeout) {
            Ok(count) => {
                let pdr = Ratio::clamped(count as f64 / f64::from(traffic_spec.packet_count));
                let verdict = pdr >= self.min_pdr;
                info!(
                    "PDR between {node2} and {node1} is {pdr:.2} (threshold {threshold})",
                    pdr = pdr.into_f64(),
                    threshold = self.min_pdr,
                );
                ProbeResult {
                    node1,
                    node2,
                    verdict: Some(verdict),
                }
            }
            Err(timeout) => {
                error!("no capture report for ({node1}, {node2}): {timeout}");
                ProbeResult::unresolved(node1, node2)
            }
        }
    }
}
