/*!
# Wireless topology plugin

The control-application surface over [`wtopo_core`]: a node registry fed
by the runtime's attach/detach notifications, the probing operations
registered under the names the controller dispatches on, and the
serving-AP lookup.

```
use wtopo::{NodeEvent, NodeId, Operation, Request, Response, TopologyApp};

# use std::collections::HashMap;
# use std::time::{Duration, SystemTime};
# use wtopo_core::upi::*;
# struct Noop;
# impl TrafficGen for Noop {
#     fn run_blocking_traffic(&self, _: NodeId, _: &TrafficSpec) -> Result<f64, UpiError> {
#         Err(UpiError::Remote { reason: "noop".into() })
#     }
#     fn schedule_traffic(
#         &self,
#         _: NodeId,
#         _: &TrafficSpec,
#         _: SystemTime,
#         _: GroupId,
#         _: Option<TrafficCallback>,
#     ) -> Result<ScheduleHandle, UpiError> {
#         Err(UpiError::Scheduling { reason: "noop".into() })
#     }
# }
# impl Sniffer for Noop {
#     fn schedule_sniff(
#         &self,
#         _: NodeId,
#         _: &SniffSpec,
#         _: SystemTime,
#         _: SniffCallback,
#     ) -> Result<ScheduleHandle, UpiError> {
#         Err(UpiError::Scheduling { reason: "noop".into() })
#     }
# }
# impl LinkStats for Noop {
#     fn inactivity_times(&self, _: NodeId, _: &str) -> Result<HashMap<String, Duration>, UpiError> {
#         Ok(HashMap::new())
#     }
# }
let mut app = TopologyApp::new(Noop);
app.handle_event(NodeEvent::Joined { node: NodeId::new(1) });

// a single node is not enough for a pairwise sweep: empty result
let operation: Operation = "estimate_nodes_in_carrier_sensing_range".parse().unwrap();
let request = Request { iface: "mon0".to_string(), ..Request::default() };
let response = wtopo::dispatch(&app, operation, &request).unwrap();
assert_eq!(response, Response::Triples(Vec::new()));
```
*/

mod ops;
mod plugin;
mod serving_ap;

pub use self::{
    ops::{dispatch, Operation, Request, Response, UnknownOperation},
    plugin::{LeaveReason, NodeEvent, TopologyApp},
};

// convenient re-export of the `wtopo_core` objects the plugin surface
// hands back and forth
pub use wtopo_core::{NodeId, ProbeResult, ProbeSetup, ProbeTiming, Ratio, TxRate};
