use crate::plugin::TopologyApp;
use anyhow::{bail, ensure, Result};
use log::debug;
use std::{fmt, str::FromStr};
use thiserror::Error;
use wtopo_core::{
    defaults::{DEFAULT_MIN_PDR, DEFAULT_TAU},
    upi::{LinkStats, Sniffer, TrafficGen},
    NodeId, ProbeResult, ProbeSetup, Ratio,
};

/// The operations the controller can invoke on this plugin.
///
/// The controller selects operations by their registered name, not by
/// direct reference; parsing the name is that registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    EstimateCarrierSensingRange,
    EstimateCommunicationRange,
    FindServingAp,
}

impl Operation {
    pub const fn name(self) -> &'static str {
        match self {
            Self::EstimateCarrierSensingRange => "estimate_nodes_in_carrier_sensing_range",
            Self::EstimateCommunicationRange => "estimate_nodes_in_communication_range",
            Self::FindServingAp => "find_serving_ap",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

/// The controller asked for an operation this plugin does not register.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "estimate_nodes_in_carrier_sensing_range" => Ok(Self::EstimateCarrierSensingRange),
            "estimate_nodes_in_communication_range" => Ok(Self::EstimateCommunicationRange),
            "find_serving_ap" => Ok(Self::FindServingAp),
            unknown => Err(UnknownOperation(unknown.to_string())),
        }
    }
}

/// A controller request against one of the registered operations.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// explicit node set; the currently attached nodes when absent
    pub nodes: Option<Vec<NodeId>>,
    /// monitor device / interface the experiment runs on
    pub iface: String,
    /// channel to pin, when the controller cares
    pub channel: Option<u8>,
    /// TAU or MINPDR depending on the operation; the registered default
    /// when absent
    pub threshold: Option<Ratio>,
    /// station MAC address, for the serving-AP lookup
    pub station: Option<String>,
}

/// Reply to a dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// one `(node1, node2, verdict)` triple per unordered pair
    Triples(Vec<ProbeResult>),
    /// the AP currently serving the requested station, if any
    ServingAp(Option<NodeId>),
}

/// Execute `operation` against `app`.
///
/// An under-populated node set yields an empty triple list (with the
/// error logged below), it does not fail the dispatch. Malformed
/// requests do: an empty interface, or a serving-AP lookup without a
/// station.
pub fn dispatch<R>(
    app: &TopologyApp<R>,
    operation: Operation,
    request: &Request,
) -> Result<Response>
where
    R: TrafficGen + Sniffer + LinkStats,
{
    debug!("dispatching {operation}");
    ensure!(
        !request.iface.is_empty(),
        "{operation} needs an interface to run on"
    );

    let nodes = match &request.nodes {
        Some(nodes) => nodes.as_slice(),
        None => app.nodes(),
    };

    let mut setup = ProbeSetup::new(&request.iface);
    if let Some(channel) = request.channel {
        setup = setup.with_channel(channel);
    }

    match operation {
        Operation::EstimateCarrierSensingRange => {
            let tau = request.threshold.unwrap_or(DEFAULT_TAU);
            Ok(Response::Triples(
                app.estimate_carrier_sensing_range(nodes, setup, tau),
            ))
        }
        Operation::EstimateCommunicationRange => {
            let min_pdr = request.threshold.unwrap_or(DEFAULT_MIN_PDR);
            Ok(Response::Triples(
                app.estimate_communication_range(nodes, setup, min_pdr),
            ))
        }
        Operation::FindServingAp => {
            let Some(station) = &request.station else {
                bail!("find_serving_ap needs a station MAC address");
            };
            Ok(Response::ServingAp(
                app.find_serving_ap(station, &request.iface)?,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_resolve_by_name() {
        for operation in [
            Operation::EstimateCarrierSensingRange,
            Operation::EstimateCommunicationRange,
            Operation::FindServingAp,
        ] {
            assert_eq!(operation.name().parse::<Operation>().unwrap(), operation);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!("estimate_nodes_in_reception_range".parse::<Operation>().is_err());
        assert!("".parse::<Operation>().is_err());
    }
}
