use crate::plugin::TopologyApp;
use anyhow::{Context as _, Result};
use log::{debug, error, info};
use wtopo_core::{upi::LinkStats, NodeId};

impl<R: LinkStats> TopologyApp<R> {
    /// operation `find_serving_ap`
    ///
    /// Asks every attached AP for the inactivity times of its associated
    /// stations and attributes `station` to the AP that saw it most
    /// recently. A station associated with no AP at all resolves to
    /// `None`.
    pub fn find_serving_ap(&self, station: &str, iface: &str) -> Result<Option<NodeId>> {
        let mut candidates = Vec::new();

        for &node in self.nodes() {
            let stats = self
                .runtime()
                .inactivity_times(node, iface)
                .inspect_err(|err| error!("inactivity query at {node} failed: {err}"))
                .with_context(|| format!("querying station inactivity at node {node}"))?;

            if let Some(idle) = stats.get(station) {
                debug!("station {station} seen at {node}, idle for {idle:?}");
                candidates.push((node, *idle));
            }
        }

        let serving = candidates
            .into_iter()
            .min_by_key(|(_, idle)| *idle)
            .map(|(node, _)| node);

        match serving {
            Some(node) => info!("station {station} is served by {node}"),
            None => info!("station {station} is not associated with any attached node"),
        }

        Ok(serving)
    }
}
