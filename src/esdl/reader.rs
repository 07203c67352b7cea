// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for creating [`EnergySystem`] instances from ESDL documents.

use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::asset_category::{AssetState, EsdlClass, PowerPlantFuel, WindTurbineType};
use crate::units::{QuantityAndUnit, QuantityDescriptor, QuantityRegistry};
use crate::Error;

use super::xml::{self, Element};
use super::{
    Asset, AssetSubtype, Carrier, CarrierClass, Connection, CostInformation, EnergySystem,
    GenericProfile, Kpi, NodeIndexMap, Port, PortDirection, Range, RangedConstraint, SingleValue,
    StorageAttributes, TimeSeriesProfile,
};

/// `EnergySystem` instantiation.
impl EnergySystem {
    /// Loads an energy system from the text of an ESDL document.
    ///
    /// Returns an error if the document is not well-formed XML, if it is not
    /// an ESDL energy system, or if any attribute the adapter reads has an
    /// invalid value.
    pub fn from_esdl_str(text: &str) -> Result<Self, Error> {
        let document = xml::parse_document(text)?;
        if !document.name.ends_with("EnergySystem") {
            return Err(Error::document_error(format!(
                "Expected an EnergySystem document, found <{}>.",
                document.name
            )));
        }

        let mut quantities = QuantityRegistry::default();
        let mut kpis = Vec::new();
        let mut time_series = Vec::new();
        collect_declarations(&document, &mut quantities, &mut kpis, &mut time_series)?;

        let (graph, asset_indices) = Self::create_graph(&document)?;
        let carriers = read_carriers(&document)?;

        let mut es = Self {
            id: document.attr("id").map(str::to_string),
            name: document.attr("name").map(str::to_string),
            description: document.attr("description").map(str::to_string),
            version: document.attr("version").map(str::to_string),
            header_modified: false,
            graph,
            asset_indices,
            carriers,
            quantities,
            kpis,
            time_series,
            document,
        };
        es.add_connections();

        tracing::debug!(
            "Loaded energy system {:?} with {} assets, {} connections and {} carriers.",
            es.name,
            es.graph.node_count(),
            es.graph.edge_count(),
            es.carriers.len()
        );
        Ok(es)
    }

    fn create_graph(
        document: &Element,
    ) -> Result<(DiGraph<Asset, Connection>, NodeIndexMap), Error> {
        let mut assets = Vec::new();
        collect_assets(document, &mut assets)?;

        let mut graph = DiGraph::new();
        let mut indices = NodeIndexMap::new();
        for asset in assets {
            if indices.contains_key(&asset.id) {
                return Err(Error::document_error(format!(
                    "Duplicate asset ID found: {}",
                    asset.id
                )));
            }
            let id = asset.id.clone();
            let idx = graph.add_node(asset);
            indices.insert(id, idx);
        }
        Ok((graph, indices))
    }

    fn add_connections(&mut self) {
        let mut port_owners: HashMap<&str, (NodeIndex, PortDirection)> = HashMap::new();
        for idx in self.graph.node_indices() {
            for port in &self.graph[idx].ports {
                port_owners.insert(&port.id, (idx, port.direction));
            }
        }

        let mut edges = Vec::new();
        for source_idx in self.graph.node_indices() {
            let source = &self.graph[source_idx];
            for port in source.ports.iter().filter(|p| p.direction == PortDirection::Out) {
                for target_port in &port.connected_to {
                    match port_owners.get(target_port.as_str()) {
                        Some((target_idx, PortDirection::In)) => edges.push((
                            source_idx,
                            *target_idx,
                            Connection {
                                from_port: port.id.clone(),
                                to_port: target_port.clone(),
                            },
                        )),
                        Some((_, PortDirection::Out)) => tracing::warn!(
                            "Port {} of {} is connected to out-port {}, ignoring.",
                            port.id,
                            source.name,
                            target_port
                        ),
                        None => tracing::warn!(
                            "Port {} of {} is connected to unknown port {}, ignoring.",
                            port.id,
                            source.name,
                            target_port
                        ),
                    }
                }
            }
        }

        for (source, target, connection) in edges {
            self.graph.add_edge(source, target, connection);
        }
    }
}

/// Walks the whole document for the declarations that can appear anywhere:
/// quantity-and-unit types, double KPIs and time series profiles.
fn collect_declarations(
    element: &Element,
    quantities: &mut QuantityRegistry,
    kpis: &mut Vec<Kpi>,
    time_series: &mut Vec<TimeSeriesProfile>,
) -> Result<(), Error> {
    match element.xsi_type() {
        Some("QuantityAndUnitType") if element.attr("id").is_some() => {
            quantities.register(read_descriptor(element)?);
        }
        Some("DoubleKPI") => kpis.push(Kpi {
            id: element.attr("id").map(str::to_string),
            name: element.attr("name").unwrap_or_default().to_string(),
            value: double_or(element, "value", 0.0)?,
            unit: read_unit(element, "quantityAndUnit")?,
        }),
        Some("TimeSeriesProfile") => time_series.push(read_time_series(element)?),
        _ => {}
    }
    for child in &element.children {
        collect_declarations(child, quantities, kpis, time_series)?;
    }
    Ok(())
}

fn collect_assets(element: &Element, assets: &mut Vec<Asset>) -> Result<(), Error> {
    if element.name == "asset" {
        let class = element.xsi_type().unwrap_or_default();
        match EsdlClass::from_str(class) {
            Ok(class) => {
                assets.push(read_asset(element, class)?);
                return Ok(());
            }
            Err(_) => tracing::debug!(
                "Skipping asset {} of unsupported type {class}.",
                element.attr("name").or(element.attr("id")).unwrap_or_default()
            ),
        }
    }
    // areas and buildings contain assets
    for child in &element.children {
        collect_assets(child, assets)?;
    }
    Ok(())
}

fn read_asset(element: &Element, class: EsdlClass) -> Result<Asset, Error> {
    let id = required(element, "id")?.to_string();
    let name = element.attr("name").unwrap_or(&id).to_string();

    let state = literal_or(element, "state", AssetState::Enabled)?;
    let power = if class.has_power_attribute() {
        Some(double_or(element, "power", 0.0)?)
    } else {
        None
    };
    let efficiency = if class.has_efficiency_attribute() {
        optional_double(element, "efficiency")?
    } else {
        None
    };
    let storage = if class.is_a(EsdlClass::Storage) {
        Some(StorageAttributes {
            capacity: double_or(element, "capacity", 0.0)?,
            max_charge_rate: double_or(element, "maxChargeRate", 0.0)?,
            max_discharge_rate: double_or(element, "maxDischargeRate", 0.0)?,
            charge_efficiency: optional_double(element, "chargeEfficiency")?,
            discharge_efficiency: optional_double(element, "dischargeEfficiency")?,
            self_discharge_rate: double_or(element, "selfDischargeRate", 0.0)?,
        })
    } else {
        None
    };

    let ports = element
        .children_named("port")
        .map(read_port)
        .collect::<Result<Vec<_>, _>>()?;

    let mut constraints = Vec::new();
    for constraint in element.children_named("constraint") {
        if constraint.xsi_type() == Some("RangedConstraint") {
            constraints.push(read_ranged_constraint(constraint)?);
        } else {
            tracing::debug!(
                "Ignoring {} constraint of {name}.",
                constraint.xsi_type().unwrap_or("untyped")
            );
        }
    }

    let cost_information = match element.child("costInformation") {
        Some(ci) => Some(CostInformation {
            investment_costs: optional_profile(ci, "investmentCosts")?,
            fixed_operational_and_maintenance_costs: optional_profile(
                ci,
                "fixedOperationalAndMaintenanceCosts",
            )?,
            variable_operational_and_maintenance_costs: optional_profile(
                ci,
                "variableOperationalAndMaintenanceCosts",
            )?,
            marginal_costs: optional_profile(ci, "marginalCosts")?,
        }),
        None => None,
    };

    Ok(Asset {
        subtype: read_subtype(element, class, &name),
        id,
        name,
        class,
        state,
        power,
        efficiency,
        storage,
        ports,
        constraints,
        cost_information,
        power_modified: false,
        constraints_cleared: false,
    })
}

/// Reads the attributes that select the Opera equivalent of an asset.
///
/// Unknown literals are reported and treated as unset.
fn read_subtype(element: &Element, class: EsdlClass, name: &str) -> AssetSubtype {
    match class {
        EsdlClass::WindTurbine | EsdlClass::WindPark => AssetSubtype::WindTurbine(
            lenient_literal(element, "type", name).unwrap_or(WindTurbineType::NotSet),
        ),
        EsdlClass::GasConversion => {
            AssetSubtype::GasConversion(lenient_literal(element, "type", name))
        }
        EsdlClass::PowerPlant => AssetSubtype::PowerPlant(
            lenient_literal(element, "fuel", name).unwrap_or(PowerPlantFuel::NotSet),
        ),
        EsdlClass::MobilityDemand => AssetSubtype::MobilityDemand {
            fuel_type: lenient_literal(element, "fuelType", name),
            vehicle_types: element
                .attr("type")
                .unwrap_or_default()
                .split_whitespace()
                .filter_map(|v| match v.parse() {
                    Ok(v) => Some(v),
                    Err(e) => {
                        tracing::warn!("Ignoring vehicle type of {name}: {e}");
                        None
                    }
                })
                .collect(),
        },
        _ => AssetSubtype::None,
    }
}

fn read_port(element: &Element) -> Result<Port, Error> {
    let direction = match element.xsi_type() {
        Some("InPort") => PortDirection::In,
        Some("OutPort") => PortDirection::Out,
        other => {
            return Err(Error::document_error(format!(
                "Unknown port type {:?} for port {:?}.",
                other,
                element.attr("id")
            )))
        }
    };
    Ok(Port {
        id: required(element, "id")?.to_string(),
        name: element.attr("name").map(str::to_string),
        direction,
        carrier: element.attr("carrier").map(str::to_string),
        connected_to: element
            .attr("connectedTo")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect(),
        profiles: element
            .children_named("profile")
            .map(read_profile)
            .collect::<Result<Vec<_>, _>>()?,
    })
}

fn read_ranged_constraint(element: &Element) -> Result<RangedConstraint, Error> {
    let range = element.child("range");
    Ok(RangedConstraint {
        id: element.attr("id").map(str::to_string),
        name: element.attr("name").map(str::to_string),
        attribute_reference: element
            .attr("attributeReference")
            .unwrap_or_default()
            .to_string(),
        range: match range {
            Some(range) => Range {
                min: double_or(range, "minValue", 0.0)?,
                max: double_or(range, "maxValue", 0.0)?,
                unit: read_unit(range, "profileQuantityAndUnit")?,
            },
            None => Range {
                min: 0.0,
                max: 0.0,
                unit: None,
            },
        },
    })
}

fn read_carriers(document: &Element) -> Result<Vec<Carrier>, Error> {
    let Some(carriers) = document
        .child("energySystemInformation")
        .and_then(|esi| esi.child("carriers"))
    else {
        return Ok(Vec::new());
    };

    carriers
        .children_named("carrier")
        .map(|element| -> Result<Carrier, Error> {
            let id = required(element, "id")?.to_string();
            let class = element.xsi_type().unwrap_or_default();
            let class = class.parse().unwrap_or_else(|_| {
                tracing::warn!("Unknown carrier type {class} for carrier {id}.");
                CarrierClass::EnergyCarrier
            });
            Ok(Carrier {
                name: element.attr("name").unwrap_or(&id).to_string(),
                id,
                class,
                cost: optional_profile(element, "cost")?,
            })
        })
        .collect()
}

fn optional_profile(parent: &Element, name: &str) -> Result<Option<GenericProfile>, Error> {
    parent.child(name).map(read_profile).transpose()
}

fn read_profile(element: &Element) -> Result<GenericProfile, Error> {
    let id = element.attr("id").map(str::to_string);
    let name = element.attr("name").map(str::to_string);
    match element.xsi_type() {
        Some("SingleValue") => Ok(GenericProfile::SingleValue(SingleValue {
            id,
            name,
            value: double_or(element, "value", 0.0)?,
            unit: read_unit(element, "profileQuantityAndUnit")?,
        })),
        Some("TimeSeriesProfile") => Ok(GenericProfile::TimeSeries(read_time_series(element)?)),
        other => Ok(GenericProfile::Other {
            class: other.unwrap_or("GenericProfile").to_string(),
            id,
            name,
        }),
    }
}

fn read_time_series(element: &Element) -> Result<TimeSeriesProfile, Error> {
    let values = element
        .attr("values")
        .unwrap_or_default()
        .split_whitespace()
        .map(|v| parse_double(v, "values"))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TimeSeriesProfile {
        id: element.attr("id").map(str::to_string),
        name: element.attr("name").map(str::to_string),
        start: parse_date_time(required(element, "startDateTime")?)?,
        values,
        unit: read_unit(element, "profileQuantityAndUnit")?,
    })
}

/// Parses an ESDL date, keeping the local time when it has an offset.
fn parse_date_time(value: &str) -> Result<NaiveDateTime, Error> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| Error::document_error(format!("Invalid date {value}: {e}")))
}

fn read_unit(parent: &Element, name: &str) -> Result<Option<QuantityAndUnit>, Error> {
    let Some(element) = parent.child(name) else {
        return Ok(None);
    };
    match element.xsi_type() {
        Some("QuantityAndUnitReference") => Ok(Some(QuantityAndUnit::Reference(
            required(element, "reference")?.to_string(),
        ))),
        _ => Ok(Some(QuantityAndUnit::Type(read_descriptor(element)?))),
    }
}

fn read_descriptor(element: &Element) -> Result<QuantityDescriptor, Error> {
    let defaults = QuantityDescriptor::default();
    Ok(QuantityDescriptor {
        id: Cow::Owned(element.attr("id").unwrap_or_default().to_string()),
        description: Cow::Owned(element.attr("description").unwrap_or_default().to_string()),
        physical_quantity: literal_or(element, "physicalQuantity", defaults.physical_quantity)?,
        unit: literal_or(element, "unit", defaults.unit)?,
        multiplier: literal_or(element, "multiplier", defaults.multiplier)?,
        per_unit: literal_or(element, "perUnit", defaults.per_unit)?,
        per_multiplier: literal_or(element, "perMultiplier", defaults.per_multiplier)?,
        per_time_unit: literal_or(element, "perTimeUnit", defaults.per_time_unit)?,
    })
}

fn required<'a>(element: &'a Element, key: &str) -> Result<&'a str, Error> {
    element.attr(key).ok_or_else(|| {
        Error::document_error(format!(
            "Missing attribute {key} on <{} id={:?}>.",
            element.name,
            element.attr("id")
        ))
    })
}

fn parse_double(value: &str, key: &str) -> Result<f64, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::document_error(format!("Invalid number for {key}: {value}")))
}

fn optional_double(element: &Element, key: &str) -> Result<Option<f64>, Error> {
    element.attr(key).map(|v| parse_double(v, key)).transpose()
}

fn double_or(element: &Element, key: &str, default: f64) -> Result<f64, Error> {
    Ok(optional_double(element, key)?.unwrap_or(default))
}

fn literal_or<T>(element: &Element, key: &str, default: T) -> Result<T, Error>
where
    T: FromStr<Err = Error>,
{
    element.attr(key).map_or(Ok(default), str::parse)
}

fn lenient_literal<T>(element: &Element, key: &str, asset_name: &str) -> Option<T>
where
    T: FromStr<Err = Error>,
{
    match element.attr(key)?.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {key} of {asset_name}: {e}");
            None
        }
    }
}
