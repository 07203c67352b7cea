// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Conversion between ESDL quantity descriptors.
//!
//! A [`QuantityDescriptor`] describes a physical measurement as a base unit
//! with a multiplier, and optionally a "per" unit with its own multiplier and
//! a "per" time unit, e.g. M€/GW/yr.  [`convert`] rescales a value between two
//! descriptors of the same physical quantity.  Apart from rescaling, only
//! Joule <-> Watt-hour and Celsius <-> Kelvin are supported.

mod literals;
pub use literals::{Multiplier, PhysicalQuantity, TimeUnit, Unit};

use std::borrow::Cow;
use std::collections::HashMap;

use crate::Error;

/// A concrete description of the unit of a physical quantity.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantityDescriptor {
    pub id: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub physical_quantity: PhysicalQuantity,
    pub unit: Unit,
    pub multiplier: Multiplier,
    pub per_unit: Unit,
    pub per_multiplier: Multiplier,
    pub per_time_unit: TimeUnit,
}

impl Default for QuantityDescriptor {
    fn default() -> Self {
        Self {
            id: Cow::Borrowed(""),
            description: Cow::Borrowed(""),
            physical_quantity: PhysicalQuantity::Undefined,
            unit: Unit::None,
            multiplier: Multiplier::None,
            per_unit: Unit::None,
            per_multiplier: Multiplier::None,
            per_time_unit: TimeUnit::None,
        }
    }
}

/// The unit of a value as found in a document: either a descriptor, or a
/// reference to a descriptor that is declared elsewhere in the document.
#[derive(Clone, Debug, PartialEq)]
pub enum QuantityAndUnit {
    Type(QuantityDescriptor),
    Reference(String),
}

/// The descriptors declared in a document, by id.
#[derive(Clone, Debug, Default)]
pub struct QuantityRegistry {
    descriptors: HashMap<String, QuantityDescriptor>,
}

impl QuantityRegistry {
    /// Adds a descriptor that references can point to.  Descriptors without an
    /// id can't be referenced and are ignored.
    pub fn register(&mut self, descriptor: QuantityDescriptor) {
        if !descriptor.id.is_empty() {
            self.descriptors
                .insert(descriptor.id.to_string(), descriptor);
        }
    }

    /// Returns the descriptor with the given id, if it was registered.
    pub fn get(&self, id: &str) -> Option<&QuantityDescriptor> {
        self.descriptors.get(id)
    }

    /// Resolves a reference to the descriptor it points to.
    pub fn resolve<'a>(
        &'a self,
        quantity: &'a QuantityAndUnit,
    ) -> Result<&'a QuantityDescriptor, Error> {
        match quantity {
            QuantityAndUnit::Type(descriptor) => Ok(descriptor),
            QuantityAndUnit::Reference(id) => self.get(id).ok_or_else(|| {
                Error::unit_error(format!("Unresolvable QuantityAndUnit reference: {id}"))
            }),
        }
    }

    /// Converts `value` from the `source` unit to the `target` unit, after
    /// resolving references.
    ///
    /// Fails if either unit is missing.
    pub fn convert(
        &self,
        value: f64,
        source: Option<&QuantityAndUnit>,
        target: Option<&QuantityAndUnit>,
    ) -> Result<f64, Error> {
        let (Some(source), Some(target)) = (source, target) else {
            return Err(Error::unit_error(format!(
                "Missing unit in unit conversion: source: {:?}, target: {:?}",
                source.map(|s| self.describe(s)),
                target.map(|t| self.describe(t)),
            )));
        };
        convert(value, self.resolve(source)?, self.resolve(target)?)
    }

    /// Converts `value` from the `source` unit to a known `target`
    /// descriptor.
    pub fn convert_to(
        &self,
        value: f64,
        source: Option<&QuantityAndUnit>,
        target: &QuantityDescriptor,
    ) -> Result<f64, Error> {
        let Some(source) = source else {
            return Err(Error::unit_error(format!(
                "Missing source unit in unit conversion to {}",
                target.description
            )));
        };
        convert(value, self.resolve(source)?, target)
    }

    fn describe(&self, quantity: &QuantityAndUnit) -> String {
        match quantity {
            QuantityAndUnit::Type(d) => d.to_string(),
            QuantityAndUnit::Reference(id) => format!("reference to {id}"),
        }
    }
}

impl std::fmt::Display for QuantityDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{} {}",
            self.physical_quantity, self.multiplier, self.unit
        )?;
        if self.per_unit != Unit::None || self.per_multiplier != Multiplier::None {
            write!(f, " / {} {}", self.per_multiplier, self.per_unit)?;
        }
        if self.per_time_unit != TimeUnit::None {
            write!(f, " / {}", self.per_time_unit)?;
        }
        write!(f, "]")
    }
}

/// Converts `value` from the `source` unit to the `target` unit.
///
/// The multipliers are applied first, then the base unit and the "per" unit
/// are converted independently of each other, both with the same
/// base-unit table.
pub fn convert(
    value: f64,
    source: &QuantityDescriptor,
    target: &QuantityDescriptor,
) -> Result<f64, Error> {
    if !same_physical_quantity(source, target) {
        return Err(Error::unit_error(format!(
            "Physical quantity mismatch: source={source}, target={target}"
        )));
    }
    let scaled = multiplier_factor(source, target) * value;
    let value = convert_unit(scaled, source.unit, target.unit)?;
    convert_unit(value, source.per_unit, target.per_unit)
}

/// Returns true if values can be converted between the two descriptors.
///
/// The physical quantities and "per" time units must be equal, and both the
/// base units and the "per" units must either be equal or convertible.
pub fn same_physical_quantity(source: &QuantityDescriptor, target: &QuantityDescriptor) -> bool {
    source.physical_quantity == target.physical_quantity
        && source.per_time_unit == target.per_time_unit
        && convertible(source.unit, target.unit)
        && convertible(source.per_unit, target.per_unit)
}

/// Returns true if a value in the `source` unit can be expressed in the
/// `target` unit.
pub fn convertible(source: Unit, target: Unit) -> bool {
    convert_unit(0.0, source, target).is_ok()
}

fn multiplier_factor(source: &QuantityDescriptor, target: &QuantityDescriptor) -> f64 {
    source.multiplier.factor() / target.multiplier.factor() * target.per_multiplier.factor()
        / source.per_multiplier.factor()
}

fn convert_unit(value: f64, source: Unit, target: Unit) -> Result<f64, Error> {
    if source == target {
        return Ok(value);
    }
    match (source, target) {
        (Unit::WattHour, Unit::Joule) => Ok(value * 3600.0),
        (Unit::Joule, Unit::WattHour) => Ok(value * (1.0 / 3600.0)),
        (Unit::DegreesCelsius, Unit::Kelvin) => Ok(value + 273.15),
        (Unit::Kelvin, Unit::DegreesCelsius) => Ok(value - 273.15),
        _ => Err(Error::unit_error(format!(
            "Cannot convert {source} into {target}"
        ))),
    }
}

/// Power in W.
pub const POWER_IN_W: QuantityDescriptor = QuantityDescriptor {
    id: Cow::Borrowed("POWER_in_W"),
    description: Cow::Borrowed("Power in WATT"),
    physical_quantity: PhysicalQuantity::Power,
    unit: Unit::Watt,
    multiplier: Multiplier::None,
    per_unit: Unit::None,
    per_multiplier: Multiplier::None,
    per_time_unit: TimeUnit::None,
};

/// Power in MW.
pub const POWER_IN_MW: QuantityDescriptor = QuantityDescriptor {
    id: Cow::Borrowed("POWER_in_MW"),
    description: Cow::Borrowed("Power in MW"),
    multiplier: Multiplier::Mega,
    ..POWER_IN_W
};

/// Power in GW, the unit of Opera capacities.
pub const POWER_IN_GW: QuantityDescriptor = QuantityDescriptor {
    id: Cow::Borrowed("POWER_in_GW"),
    description: Cow::Borrowed("Power in GW"),
    multiplier: Multiplier::Giga,
    ..POWER_IN_W
};

/// Energy in J.
pub const ENERGY_IN_J: QuantityDescriptor = QuantityDescriptor {
    id: Cow::Borrowed("ENERGY_in_J"),
    description: Cow::Borrowed("Energy in J"),
    physical_quantity: PhysicalQuantity::Energy,
    unit: Unit::Joule,
    multiplier: Multiplier::None,
    per_unit: Unit::None,
    per_multiplier: Multiplier::None,
    per_time_unit: TimeUnit::None,
};

/// Energy in PJ, the unit of Opera activities.
pub const ENERGY_IN_PJ: QuantityDescriptor = QuantityDescriptor {
    id: Cow::Borrowed("ENERGY_in_PJ"),
    description: Cow::Borrowed("Energy in PJ"),
    multiplier: Multiplier::Peta,
    ..ENERGY_IN_J
};

/// Energy in MWh.
pub const ENERGY_IN_MWH: QuantityDescriptor = QuantityDescriptor {
    id: Cow::Borrowed("ENERGY_in_MWh"),
    description: Cow::Borrowed("Energy in MWh"),
    unit: Unit::WattHour,
    multiplier: Multiplier::Mega,
    ..ENERGY_IN_J
};

/// Cost in M€.
pub const COST_IN_MEUR: QuantityDescriptor = QuantityDescriptor {
    id: Cow::Borrowed("COST_in_MEUR"),
    description: Cow::Borrowed("Cost in MEur"),
    physical_quantity: PhysicalQuantity::Cost,
    unit: Unit::Euro,
    multiplier: Multiplier::Mega,
    per_unit: Unit::None,
    per_multiplier: Multiplier::None,
    per_time_unit: TimeUnit::None,
};

/// Cost in €/MWh, used for marginal costs and electricity prices.
pub const COST_IN_EUR_PER_MWH: QuantityDescriptor = QuantityDescriptor {
    id: Cow::Borrowed("COST_in_EURperMWH"),
    description: Cow::Borrowed("Cost in €/MWh"),
    multiplier: Multiplier::None,
    per_unit: Unit::WattHour,
    per_multiplier: Multiplier::Mega,
    ..COST_IN_MEUR
};

/// Cost in €/GJ, used for carrier prices.
pub const COST_IN_EUR_PER_GJ: QuantityDescriptor = QuantityDescriptor {
    id: Cow::Borrowed("COST_in_EURperGJ"),
    description: Cow::Borrowed("Cost in €/GJ"),
    multiplier: Multiplier::None,
    per_unit: Unit::Joule,
    per_multiplier: Multiplier::Giga,
    ..COST_IN_MEUR
};

/// Cost in M€/GW, the unit of Opera investment costs (CAPEX).
pub const COST_IN_MEUR_PER_GW: QuantityDescriptor = QuantityDescriptor {
    id: Cow::Borrowed("COST_in_MEURperGW"),
    description: Cow::Borrowed("Cost in M€/GW"),
    per_unit: Unit::Watt,
    per_multiplier: Multiplier::Giga,
    ..COST_IN_MEUR
};

/// Cost in M€/GW/yr, the unit of Opera fixed operational costs (OPEX).
pub const COST_IN_MEUR_PER_GW_PER_YEAR: QuantityDescriptor = QuantityDescriptor {
    id: Cow::Borrowed("COST_in_MEURperGWperYear"),
    description: Cow::Borrowed("Cost in M€/GW/yr"),
    per_time_unit: TimeUnit::Year,
    ..COST_IN_MEUR_PER_GW
};

/// Cost in M€/PJ, the unit of Opera variable costs.
pub const COST_IN_MEUR_PER_PJ: QuantityDescriptor = QuantityDescriptor {
    id: Cow::Borrowed("COST_in_MEURperPJ"),
    description: Cow::Borrowed("Cost in M€/PJ"),
    per_unit: Unit::Joule,
    per_multiplier: Multiplier::Giga,
    ..COST_IN_MEUR
};
