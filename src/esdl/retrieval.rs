// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for retrieving assets, connections and declarations from an
//! [`EnergySystem`].

use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::units::QuantityRegistry;
use crate::Error;

use super::iterators::{Assets, Connections, Neighbors};
use super::{Asset, Carrier, EnergySystem, Kpi, Port, PortDirection, TimeSeriesProfile};

/// Asset and connection retrieval.
impl EnergySystem {
    /// Returns the asset with the given `asset_id`, if it exists.
    pub fn asset(&self, asset_id: &str) -> Result<&Asset, Error> {
        self.asset_indices
            .get(asset_id)
            .map(|i| &self.graph[*i])
            .ok_or_else(|| Error::asset_not_found(format!("Asset with id {asset_id} not found.")))
    }

    /// Returns a mutable reference to the asset with the given `asset_id`, if
    /// it exists.
    pub fn asset_mut(&mut self, asset_id: &str) -> Result<&mut Asset, Error> {
        self.asset_indices
            .get(asset_id)
            .map(|i| &mut self.graph[*i])
            .ok_or_else(|| Error::asset_not_found(format!("Asset with id {asset_id} not found.")))
    }

    /// Returns an iterator over the assets in the energy system, in document
    /// order.
    pub fn assets(&self) -> Assets {
        Assets {
            iter: self.graph.raw_nodes().iter(),
        }
    }

    /// Returns an iterator over the connections in the energy system.
    pub fn connections(&self) -> Connections {
        Connections {
            graph: &self.graph,
            iter: self.graph.raw_edges().iter(),
        }
    }

    /// Returns an iterator over the assets that feed into the asset with the
    /// given `asset_id`.
    ///
    /// Returns an error if the given `asset_id` does not exist.
    pub fn predecessors(&self, asset_id: &str) -> Result<Neighbors, Error> {
        self.neighbors(asset_id, Direction::Incoming)
    }

    /// Returns an iterator over the assets that the asset with the given
    /// `asset_id` feeds into.
    ///
    /// Returns an error if the given `asset_id` does not exist.
    pub fn successors(&self, asset_id: &str) -> Result<Neighbors, Error> {
        self.neighbors(asset_id, Direction::Outgoing)
    }

    fn neighbors(&self, asset_id: &str, direction: Direction) -> Result<Neighbors, Error> {
        self.asset_indices
            .get(asset_id)
            .map(|&index| Neighbors {
                graph: &self.graph,
                iter: self.graph.neighbors_directed(index, direction),
            })
            .ok_or_else(|| Error::asset_not_found(format!("Asset with id {asset_id} not found.")))
    }

    /// Returns the carrier flowing through a port of an asset.
    ///
    /// Ports without a carrier of their own take the carrier of the first
    /// connected port that has one.
    pub fn port_carrier(&self, asset: &Asset, port: &Port) -> Option<&Carrier> {
        if let Some(carrier_id) = &port.carrier {
            return self.carrier(carrier_id);
        }

        let index = *self.asset_indices.get(&asset.id)?;
        let direction = match port.direction {
            PortDirection::In => Direction::Incoming,
            PortDirection::Out => Direction::Outgoing,
        };
        self.graph
            .edges_directed(index, direction)
            .find_map(|edge| {
                let connection = edge.weight();
                let (own_port, other_port, other) = match port.direction {
                    PortDirection::In => (&connection.to_port, &connection.from_port, edge.source()),
                    PortDirection::Out => (&connection.from_port, &connection.to_port, edge.target()),
                };
                if *own_port != port.id {
                    return None;
                }
                self.graph[other]
                    .ports
                    .iter()
                    .find(|p| p.id == *other_port)?
                    .carrier
                    .as_deref()
                    .and_then(|c| self.carrier(c))
            })
    }
}

/// Declaration retrieval.
impl EnergySystem {
    /// Returns an iterator over the carriers of the energy system.
    pub fn carriers(&self) -> std::slice::Iter<'_, Carrier> {
        self.carriers.iter()
    }

    /// Returns the carrier with the given id, if it exists.
    pub fn carrier(&self, carrier_id: &str) -> Option<&Carrier> {
        self.carriers.iter().find(|c| c.id == carrier_id)
    }

    /// Returns the units declared in the document.
    pub fn quantities(&self) -> &QuantityRegistry {
        &self.quantities
    }

    /// Returns the double KPIs of the energy system.
    pub fn kpis(&self) -> &[Kpi] {
        &self.kpis
    }

    /// Returns all time series profiles in the document.
    pub fn time_series(&self) -> &[TimeSeriesProfile] {
        &self.time_series
    }
}
