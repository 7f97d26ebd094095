//! Sweep a simulated testbed: nodes on a line, carrier sensing and
//! reception decided by distance.
//!
//! Run with:
//!   cargo run --example testbed -p wtopo -- --nodes 4

use anyhow::Result;
use clap::Parser;
use rand::Rng as _;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
    thread,
    time::{Duration, SystemTime},
};
use wtopo::{
    dispatch, NodeEvent, NodeId, Operation, ProbeTiming, Request, Response, TopologyApp,
};
use wtopo_core::upi::{
    GroupId, LinkStats, ScheduleHandle, SniffCallback, SniffReport, SniffSpec, Sniffer,
    TrafficCallback, TrafficGen, TrafficSpec, UpiError,
};

#[derive(Parser)]
struct Args {
    /// number of simulated nodes
    #[arg(long, default_value_t = 3)]
    nodes: u64,

    /// spacing between neighboring nodes, in meters
    #[arg(long, default_value_t = 120.0)]
    spacing: f64,

    /// radius within which two transmitters sense each other, in meters
    #[arg(long, default_value_t = 200.0)]
    cs_range: f64,

    /// radius within which frames are reliably received, in meters
    #[arg(long, default_value_t = 150.0)]
    comm_range: f64,

    /// monitor device name passed down to the (simulated) nodes
    #[arg(long, default_value = "mon0")]
    device: String,
}

const SOLO_RATE: f64 = 10_000_000.0;

/// An in-process stand-in for the remote testbed: distance decides
/// whether concurrent transmitters throttle each other and how many
/// probe frames survive the path.
struct SimulatedTestbed {
    positions: HashMap<NodeId, f64>,
    cs_range: f64,
    comm_range: f64,

    pending_group: Mutex<HashMap<GroupId, NodeId>>,
    pending_sniff: Mutex<Option<(NodeId, SniffCallback)>>,
    handles: AtomicU64,
}

impl SimulatedTestbed {
    fn on_a_line(count: u64, spacing: f64, cs_range: f64, comm_range: f64) -> Self {
        let positions = (0..count)
            .map(|i| (NodeId::new(i + 1), i as f64 * spacing))
            .collect();

        Self {
            positions,
            cs_range,
            comm_range,
            pending_group: Mutex::new(HashMap::new()),
            pending_sniff: Mutex::new(None),
            handles: AtomicU64::new(0),
        }
    }

    fn nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.positions.keys().copied().collect();
        nodes.sort();
        nodes
    }

    fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        (self.positions[&a] - self.positions[&b]).abs()
    }

    fn next_handle(&self) -> ScheduleHandle {
        ScheduleHandle::new(self.handles.fetch_add(1, Ordering::SeqCst))
    }

    /// the rate one node achieves while the other transmits too
    fn parallel_rate(&self, node: NodeId, partner: NodeId) -> f64 {
        let mut rng = rand::thread_rng();
        if self.distance(node, partner) <= self.cs_range {
            // deferring to each other: roughly half the medium each
            SOLO_RATE * rng.gen_range(0.40..0.60)
        } else {
            // out of sensing range: barely affected
            SOLO_RATE * rng.gen_range(0.95..1.0)
        }
    }

    /// frames (out of `sent`) surviving the path between two nodes
    fn delivered(&self, sniffer: NodeId, sender: NodeId, sent: u32) -> u64 {
        let mut rng = rand::thread_rng();
        let loss = if self.distance(sniffer, sender) <= self.comm_range {
            rng.gen_range(0.0..0.03)
        } else {
            rng.gen_range(0.5..0.9)
        };
        (f64::from(sent) * (1.0 - loss)).round() as u64
    }
}

impl TrafficGen for SimulatedTestbed {
    fn run_blocking_traffic(&self, _node: NodeId, _spec: &TrafficSpec) -> Result<f64, UpiError> {
        let mut rng = rand::thread_rng();
        Ok(SOLO_RATE * rng.gen_range(0.98..1.02))
    }

    fn schedule_traffic(
        &self,
        node: NodeId,
        spec: &TrafficSpec,
        _execute_at: SystemTime,
        group: GroupId,
        callback: Option<TrafficCallback>,
    ) -> Result<ScheduleHandle, UpiError> {
        match callback {
            Some(callback) => {
                // simultaneous leg of a carrier-sensing experiment: both
                // rates are computable once the group partner is known
                let partner = self.pending_group.lock().unwrap().remove(&group);
                match partner {
                    Some(partner) => {
                        let rate1 = self.parallel_rate(partner, node);
                        let rate2 = self.parallel_rate(node, partner);
                        thread::spawn(move || {
                            thread::sleep(Duration::from_millis(20));
                            callback(group, partner, rate1);
                            callback(group, node, rate2);
                        });
                    }
                    None => {
                        self.pending_group.lock().unwrap().insert(group, node);
                    }
                }
            }
            None => {
                // paced probe transmission towards a waiting capture
                if let Some((sniffer, callback)) = self.pending_sniff.lock().unwrap().take() {
                    let packets = self.delivered(sniffer, node, spec.packet_count);
                    thread::spawn(move || {
                        thread::sleep(Duration::from_millis(20));
                        callback(SniffReport {
                            time: SystemTime::now(),
                            peer: sniffer,
                            packets: (packets > 0).then_some(packets),
                        });
                    });
                }
            }
        }

        Ok(self.next_handle())
    }
}

impl Sniffer for SimulatedTestbed {
    fn schedule_sniff(
        &self,
        node: NodeId,
        _spec: &SniffSpec,
        _execute_at: SystemTime,
        callback: SniffCallback,
    ) -> Result<ScheduleHandle, UpiError> {
        *self.pending_sniff.lock().unwrap() = Some((node, callback));
        Ok(self.next_handle())
    }
}

impl LinkStats for SimulatedTestbed {
    fn inactivity_times(
        &self,
        node: NodeId,
        _iface: &str,
    ) -> Result<HashMap<String, Duration>, UpiError> {
        // one imaginary station, associated with the first node
        let mut stats = HashMap::new();
        if node == NodeId::new(1) {
            stats.insert("02:00:00:00:00:01".to_string(), Duration::from_secs(1));
        }
        Ok(stats)
    }
}

fn print_triples(label: &str, response: &Response) {
    println!("{label}:");
    let Response::Triples(triples) = response else {
        return;
    };
    for triple in triples {
        let verdict = match triple.verdict {
            Some(true) => "yes",
            Some(false) => "no",
            None => "unresolved",
        };
        println!("  ({}, {}) -> {verdict}", triple.node1, triple.node2);
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let testbed = SimulatedTestbed::on_a_line(
        args.nodes,
        args.spacing,
        args.cs_range,
        args.comm_range,
    );
    let nodes = testbed.nodes();

    // short timings: the simulation delivers in milliseconds
    let timing = ProbeTiming {
        settle_interval: Duration::from_millis(10),
        parallel_tx_offset: Duration::from_millis(30),
        sniff_offset: Duration::from_millis(20),
        probe_tx_offset: Duration::from_millis(30),
        sniff_duration: Duration::from_millis(50),
        result_timeout: Duration::from_secs(5),
    };

    let mut app = TopologyApp::new(testbed).with_timing(timing);
    for node in nodes {
        app.handle_event(NodeEvent::Joined { node });
    }

    let request = Request {
        iface: args.device.clone(),
        ..Request::default()
    };

    let response = dispatch(&app, Operation::EstimateCarrierSensingRange, &request)?;
    print_triples("carrier-sensing range", &response);

    let response = dispatch(&app, Operation::EstimateCommunicationRange, &request)?;
    print_triples("communication range", &response);

    let lookup = Request {
        station: Some("02:00:00:00:00:01".to_string()),
        ..request
    };
    let Response::ServingAp(serving) = dispatch(&app, Operation::FindServingAp, &lookup)? else {
        unreachable!()
    };
    match serving {
        Some(node) => println!("station 02:00:00:00:00:01 is served by node {node}"),
        None => println!("station 02:00:00:00:00:01 is not associated"),
    }

    Ok(())
}
