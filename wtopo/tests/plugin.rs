//! Full plugin runs: dispatching the registered operations against a
//! small simulated testbed runtime.

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
    dispatch, LeaveReason, NodeEvent, NodeId, Operation, ProbeTiming, Request, Response,
    TopologyApp,
};
use wtopo_core::upi::{
    GroupId, LinkStats, ScheduleHandle, SniffCallback, SniffReport, SniffSpec, Sniffer,
    TrafficCallback, TrafficGen, TrafficSpec, UpiError,
};

const NODE_A: NodeId = NodeId::new(1);
const NODE_B: NodeId = NodeId::new(2);
const NODE_C: NodeId = NodeId::new(3);

const STATION: &str = "00:11:22:33:44:55";

const BASELINE_RATE: f64 = 10.0;

/// unordered pair key
fn edge(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a < b { (a, b) } else { (b, a) }
}

/// A scripted testbed: per-pair simultaneous rates and capture counts,
/// per-node station inactivity. Callbacks are delivered from background
/// threads, like a real runtime's transport would.
struct FakeTestbed {
    /// simultaneous-phase rates per unordered pair
    parallel_rates: HashMap<(NodeId, NodeId), (f64, f64)>,
    /// captured frame count per unordered pair
    captured: HashMap<(NodeId, NodeId), u64>,
    /// station → inactivity, per node
    inactivity: HashMap<NodeId, HashMap<String, Duration>>,

    /// traffic callbacks waiting for their group partner
    pending_groups: Mutex<HashMap<GroupId, (NodeId, TrafficCallback)>>,
    /// capture waiting for its sender
    pending_sniff: Mutex<Option<(NodeId, SniffCallback)>>,
    handles: AtomicU64,
}

impl FakeTestbed {
    fn new() -> Self {
        let parallel_rates = HashMap::from([
            // (A, B): A drops to 0.8 of its solo rate, within range
            (edge(NODE_A, NODE_B), (8.0, 9.5)),
            // (A, C): both keep >0.9 of their solo rate, out of range
            (edge(NODE_A, NODE_C), (9.5, 9.6)),
            // (B, C): B collapses, within range
            (edge(NODE_B, NODE_C), (5.0, 10.0)),
        ]);
        let captured = HashMap::from([
            (edge(NODE_A, NODE_B), 230),
            (edge(NODE_A, NODE_C), 200),
            (edge(NODE_B, NODE_C), 255),
        ]);
        let inactivity = HashMap::from([
            (NODE_A, HashMap::from([(STATION.to_string(), Duration::from_secs(5))])),
            (NODE_B, HashMap::from([(STATION.to_string(), Duration::from_secs(2))])),
            (NODE_C, HashMap::new()),
        ]);

        Self {
            parallel_rates,
            captured,
            inactivity,
            pending_groups: Mutex::new(HashMap::new()),
            pending_sniff: Mutex::new(None),
            handles: AtomicU64::new(0),
        }
    }

    fn next_handle(&self) -> ScheduleHandle {
        ScheduleHandle::new(self.handles.fetch_add(1, Ordering::SeqCst))
    }

    /// both members of a group are scheduled: deliver their rates
    fn run_group(&self, group: GroupId, first: NodeId, second: NodeId, callback: TrafficCallback) {
        let (rate1, rate2) = self.parallel_rates[&edge(first, second)];
        let (rate1, rate2) = if first < second {
            (rate1, rate2)
        } else {
            (rate2, rate1)
        };

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            callback(group, first, rate1);
            callback(group, second, rate2);
        });
    }
}

impl TrafficGen for FakeTestbed {
    fn run_blocking_traffic(&self, _node: NodeId, _spec: &TrafficSpec) -> Result<f64, UpiError> {
        Ok(BASELINE_RATE)
    }

    fn schedule_traffic(
        &self,
        node: NodeId,
        _spec: &TrafficSpec,
        _execute_at: SystemTime,
        group: GroupId,
        callback: Option<TrafficCallback>,
    ) -> Result<ScheduleHandle, UpiError> {
        match callback {
            // carrier-sensing leg: wait for the group partner
            Some(callback) => {
                let mut pending = self.pending_groups.lock().unwrap();
                match pending.remove(&group) {
                    Some((partner, partner_callback)) => {
                        drop(pending);
                        self.run_group(group, partner, node, partner_callback);
                    }
                    None => {
                        pending.insert(group, (node, callback));
                    }
                }
            }
            // communication-range sender: trigger the waiting capture
            None => {
                let pending = self.pending_sniff.lock().unwrap().take();
                if let Some((sniffer, callback)) = pending {
                    let count = self.captured[&edge(sniffer, node)];
                    thread::spawn(move || {
                        thread::sleep(Duration::from_millis(5));
                        callback(SniffReport {
                            time: SystemTime::now(),
                            peer: sniffer,
                            packets: (count > 0).then_some(count),
                        });
                    });
                }
            }
        }

        Ok(self.next_handle())
    }
}

impl Sniffer for FakeTestbed {
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

impl LinkStats for FakeTestbed {
    fn inactivity_times(
        &self,
        node: NodeId,
        _iface: &str,
    ) -> Result<HashMap<String, Duration>, UpiError> {
        Ok(self.inactivity.get(&node).cloned().unwrap_or_default())
    }
}

fn fast_timing() -> ProbeTiming {
    ProbeTiming {
        settle_interval: Duration::ZERO,
        parallel_tx_offset: Duration::from_millis(5),
        sniff_offset: Duration::from_millis(5),
        probe_tx_offset: Duration::from_millis(5),
        sniff_duration: Duration::from_millis(20),
        result_timeout: Duration::from_secs(2),
    }
}

fn attached_app() -> TopologyApp<FakeTestbed> {
    let mut app = TopologyApp::new(FakeTestbed::new()).with_timing(fast_timing());
    for node in [NODE_A, NODE_B, NODE_C] {
        app.handle_event(NodeEvent::Joined { node });
    }
    app
}

fn request() -> Request {
    Request {
        iface: "mon0".to_string(),
        ..Request::default()
    }
}

#[test]
fn carrier_sensing_sweep_covers_every_pair_in_order() {
    let app = attached_app();
    let operation: Operation = "estimate_nodes_in_carrier_sensing_range".parse().unwrap();

    let Ok(Response::Triples(triples)) = dispatch(&app, operation, &request()) else {
        panic!("expecting a triple list");
    };

    let summary: Vec<_> = triples
        .iter()
        .map(|triple| (triple.node1, triple.node2, triple.verdict))
        .collect();
    assert_eq!(
        summary,
        vec![
            (NODE_A, NODE_B, Some(true)),
            (NODE_A, NODE_C, Some(false)),
            (NODE_B, NODE_C, Some(true)),
        ]
    );
}

#[test]
fn communication_sweep_covers_every_pair_in_order() {
    let app = attached_app();
    let operation: Operation = "estimate_nodes_in_communication_range".parse().unwrap();

    let Ok(Response::Triples(triples)) = dispatch(&app, operation, &request()) else {
        panic!("expecting a triple list");
    };

    let summary: Vec<_> = triples
        .iter()
        .map(|triple| (triple.node1, triple.node2, triple.verdict))
        .collect();
    assert_eq!(
        summary,
        vec![
            (NODE_A, NODE_B, Some(true)),
            (NODE_A, NODE_C, Some(false)),
            (NODE_B, NODE_C, Some(true)),
        ]
    );
}

#[test]
fn too_few_nodes_yield_an_empty_sweep() {
    let app = attached_app();

    let mut single = request();
    single.nodes = Some(vec![NODE_A]);

    let response = dispatch(&app, Operation::EstimateCarrierSensingRange, &single).unwrap();
    assert_eq!(response, Response::Triples(Vec::new()));

    let mut empty = request();
    empty.nodes = Some(Vec::new());

    let response = dispatch(&app, Operation::EstimateCommunicationRange, &empty).unwrap();
    assert_eq!(response, Response::Triples(Vec::new()));
}

#[test]
fn explicit_node_set_overrides_the_registry() {
    let app = attached_app();

    let mut pair_only = request();
    pair_only.nodes = Some(vec![NODE_A, NODE_C]);

    let Ok(Response::Triples(triples)) =
        dispatch(&app, Operation::EstimateCarrierSensingRange, &pair_only)
    else {
        panic!("expecting a triple list");
    };

    assert_eq!(triples.len(), 1);
    assert_eq!(triples[0].node1, NODE_A);
    assert_eq!(triples[0].node2, NODE_C);
    assert_eq!(triples[0].verdict, Some(false));
}

#[test]
fn detached_nodes_drop_out_of_the_sweep() {
    let mut app = attached_app();
    app.handle_event(NodeEvent::Left {
        node: NODE_C,
        reason: LeaveReason::Lost,
    });

    let Ok(Response::Triples(triples)) =
        dispatch(&app, Operation::EstimateCarrierSensingRange, &request())
    else {
        panic!("expecting a triple list");
    };

    assert_eq!(triples.len(), 1);
    assert_eq!((triples[0].node1, triples[0].node2), (NODE_A, NODE_B));
}

#[test]
fn serving_ap_is_the_least_idle_one() {
    let app = attached_app();

    let mut lookup = request();
    lookup.station = Some(STATION.to_string());

    let response = dispatch(&app, Operation::FindServingAp, &lookup).unwrap();
    assert_eq!(response, Response::ServingAp(Some(NODE_B)));
}

#[test]
fn serving_ap_for_an_unknown_station_is_none() {
    let app = attached_app();

    let mut lookup = request();
    lookup.station = Some("66:77:88:99:aa:bb".to_string());

    let response = dispatch(&app, Operation::FindServingAp, &lookup).unwrap();
    assert_eq!(response, Response::ServingAp(None));
}

#[test]
fn malformed_requests_fail_the_dispatch() {
    let app = attached_app();

    // no interface
    let error = dispatch(&app, Operation::EstimateCarrierSensingRange, &Request::default());
    assert!(error.is_err());

    // serving-AP lookup without a station
    let error = dispatch(&app, Operation::FindServingAp, &request());
    assert!(error.is_err());
}
