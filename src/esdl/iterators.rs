// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Iterators over assets and connections in an `EnergySystem`.

use petgraph::graph::DiGraph;

use super::{Asset, Connection};

/// An iterator over the assets in an `EnergySystem`.
pub struct Assets<'a> {
    pub(crate) iter: std::slice::Iter<'a, petgraph::graph::Node<Asset>>,
}

impl<'a> Iterator for Assets<'a> {
    type Item = &'a Asset;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|n| &n.weight)
    }
}

/// An iterator over the connections in an `EnergySystem`, as
/// `(source, destination, connection)` triples.
pub struct Connections<'a> {
    pub(crate) graph: &'a DiGraph<Asset, Connection>,
    pub(crate) iter: std::slice::Iter<'a, petgraph::graph::Edge<Connection>>,
}

impl<'a> Iterator for Connections<'a> {
    type Item = (&'a Asset, &'a Asset, &'a Connection);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .next()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()], &e.weight))
    }
}

/// An iterator over the neighbors of an asset in an `EnergySystem`.
pub struct Neighbors<'a> {
    pub(crate) graph: &'a DiGraph<Asset, Connection>,
    pub(crate) iter: petgraph::graph::Neighbors<'a, Connection>,
}

impl<'a> Iterator for Neighbors<'a> {
    type Item = &'a Asset;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|i| &self.graph[i])
    }
}
