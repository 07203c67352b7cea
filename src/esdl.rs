// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! An in-memory ESDL energy system: the assets as nodes of a directed graph,
//! connected from out-ports to in-ports, together with the carriers, units,
//! KPIs and time series of the document.

mod model;
mod reader;
mod retrieval;
mod writer;
mod xml;

pub mod iterators;

pub use model::{
    Asset, AssetSubtype, Carrier, CarrierClass, Connection, CostInformation, GenericProfile, Kpi,
    Port, PortDirection, Range, RangedConstraint, SingleValue, StorageAttributes,
    TimeSeriesProfile,
};

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::units::QuantityRegistry;

/// `Asset`s stored in the `DiGraph` can be addressed with `NodeIndex`es.
///
/// `NodeIndexMap` stores the corresponding `NodeIndex` for any asset id.
pub(crate) type NodeIndexMap = HashMap<String, NodeIndex>;

/// An ESDL energy system.
///
/// Instances are created from the text of a document with
/// [`from_esdl_str`][EnergySystem::from_esdl_str], and can be written back
/// with [`to_esdl_string`][EnergySystem::to_esdl_string], which includes any
/// changes made to the assets in the meantime.
#[derive(Debug)]
pub struct EnergySystem {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    header_modified: bool,

    graph: DiGraph<Asset, Connection>,
    asset_indices: NodeIndexMap,
    carriers: Vec<Carrier>,
    quantities: QuantityRegistry,
    kpis: Vec<Kpi>,
    time_series: Vec<TimeSeriesProfile>,

    document: xml::Element,
}

impl EnergySystem {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Marks the energy system as containing optimizer results: the
    /// description gets a note appended and the version is bumped by one.
    pub fn mark_results_included(&mut self) {
        let description = self.description.take().unwrap_or_default();
        self.description = Some(format!("{description}\nIncluding Opera results"));

        let version = match self.version.as_deref().map(|v| v.trim().parse::<f64>()) {
            Some(Ok(version)) => version,
            Some(Err(_)) => {
                tracing::warn!(
                    "Energy system version {:?} is not a number, restarting at 0.",
                    self.version
                );
                0.0
            }
            None => 0.0,
        };
        self.version = Some(format_version(version + 1.0));
        self.header_modified = true;
    }
}

/// Formats a version number the way ESDL tools do, with at least one
/// decimal.
fn format_version(version: f64) -> String {
    if version.fract() == 0.0 && version.abs() < 1E15 {
        format!("{version:.1}")
    } else {
        format!("{version}")
    }
}
