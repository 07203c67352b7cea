// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The subset of the ESDL entities that the adapter reads.

use chrono::NaiveDateTime;

use crate::asset_category::{
    AssetCategory, AssetState, EsdlClass, GasConversionType, MobilityFuelType, PowerPlantFuel,
    VehicleType, WindTurbineType,
};
use crate::units::QuantityAndUnit;
use crate::Error;

/// The direction of a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortDirection {
    In,
    Out,
}

/// A port of an asset.
#[derive(Clone, Debug, PartialEq)]
pub struct Port {
    pub id: String,
    pub name: Option<String>,
    pub direction: PortDirection,
    /// The id of the carrier flowing through the port.
    pub carrier: Option<String>,
    /// The ids of the ports this port is connected to.
    pub connected_to: Vec<String>,
    pub profiles: Vec<GenericProfile>,
}

/// A single value with an optional unit.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleValue {
    pub id: Option<String>,
    pub name: Option<String>,
    pub value: f64,
    pub unit: Option<QuantityAndUnit>,
}

/// A series of hourly values.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeriesProfile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub start: NaiveDateTime,
    pub values: Vec<f64>,
    pub unit: Option<QuantityAndUnit>,
}

/// A profile attached to a port, a cost or a carrier.
#[derive(Clone, Debug, PartialEq)]
pub enum GenericProfile {
    SingleValue(SingleValue),
    TimeSeries(TimeSeriesProfile),
    /// A profile kind the adapter doesn't read, e.g. a database profile.
    Other {
        class: String,
        id: Option<String>,
        name: Option<String>,
    },
}

impl GenericProfile {
    /// Returns the ESDL class name of the profile.
    pub fn class_name(&self) -> &str {
        match self {
            GenericProfile::SingleValue(_) => "SingleValue",
            GenericProfile::TimeSeries(_) => "TimeSeriesProfile",
            GenericProfile::Other { class, .. } => class,
        }
    }

    /// Returns the name of the profile, or its id if it has no name.
    pub fn label(&self) -> &str {
        let (id, name) = match self {
            GenericProfile::SingleValue(p) => (&p.id, &p.name),
            GenericProfile::TimeSeries(p) => (&p.id, &p.name),
            GenericProfile::Other { id, name, .. } => (id, name),
        };
        name.as_deref().or(id.as_deref()).unwrap_or("<unnamed>")
    }

    /// Returns the single value, if this is a `SingleValue` profile.
    pub fn as_single_value(&self) -> Option<&SingleValue> {
        match self {
            GenericProfile::SingleValue(sv) => Some(sv),
            _ => None,
        }
    }
}

/// A range of allowed values.
#[derive(Clone, Debug, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub unit: Option<QuantityAndUnit>,
}

/// A constraint that limits an attribute of an asset to a range.
#[derive(Clone, Debug, PartialEq)]
pub struct RangedConstraint {
    pub id: Option<String>,
    pub name: Option<String>,
    /// The name of the constrained attribute, e.g. `power`.
    pub attribute_reference: String,
    pub range: Range,
}

/// The cost profiles of an asset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CostInformation {
    pub investment_costs: Option<GenericProfile>,
    pub fixed_operational_and_maintenance_costs: Option<GenericProfile>,
    pub variable_operational_and_maintenance_costs: Option<GenericProfile>,
    pub marginal_costs: Option<GenericProfile>,
}

/// Attributes of storage assets, in the units of the document: J, W and J/s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StorageAttributes {
    pub capacity: f64,
    pub max_charge_rate: f64,
    pub max_discharge_rate: f64,
    pub charge_efficiency: Option<f64>,
    pub discharge_efficiency: Option<f64>,
    pub self_discharge_rate: f64,
}

/// Class-specific attributes that decide the Opera equivalent of an asset.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AssetSubtype {
    #[default]
    None,
    WindTurbine(WindTurbineType),
    GasConversion(Option<GasConversionType>),
    PowerPlant(PowerPlantFuel),
    MobilityDemand {
        fuel_type: Option<MobilityFuelType>,
        vehicle_types: Vec<VehicleType>,
    },
}

/// An energy asset.
#[derive(Clone, Debug, PartialEq)]
pub struct Asset {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) class: EsdlClass,
    pub(crate) state: AssetState,
    /// Power in W, for classes that have the attribute.
    pub(crate) power: Option<f64>,
    pub(crate) efficiency: Option<f64>,
    pub(crate) subtype: AssetSubtype,
    pub(crate) storage: Option<StorageAttributes>,
    pub(crate) ports: Vec<Port>,
    pub(crate) constraints: Vec<RangedConstraint>,
    pub(crate) cost_information: Option<CostInformation>,
    pub(crate) power_modified: bool,
    pub(crate) constraints_cleared: bool,
}

impl Asset {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> EsdlClass {
        self.class
    }

    /// Returns the category of the asset.
    pub fn category(&self) -> Option<AssetCategory> {
        self.class.category()
    }

    pub fn state(&self) -> AssetState {
        self.state
    }

    /// Returns the power of the asset in W, if its class has a `power`
    /// attribute.
    pub fn power(&self) -> Option<f64> {
        self.power
    }

    /// Returns the efficiency of the asset, if its class has an `efficiency`
    /// attribute and the document sets it.
    pub fn efficiency(&self) -> Option<f64> {
        self.efficiency
    }

    pub fn subtype(&self) -> &AssetSubtype {
        &self.subtype
    }

    /// Returns the storage attributes, for storage assets.
    pub fn storage(&self) -> Option<&StorageAttributes> {
        self.storage.as_ref()
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn constraints(&self) -> &[RangedConstraint] {
        &self.constraints
    }

    pub fn cost_information(&self) -> Option<&CostInformation> {
        self.cost_information.as_ref()
    }

    /// Sets the power of the asset, in W.
    ///
    /// Returns an error if the class of the asset has no `power` attribute.
    pub fn set_power(&mut self, power: f64) -> Result<(), Error> {
        if !self.class.has_power_attribute() {
            return Err(Error::internal(format!(
                "Asset {} of class {} has no power attribute.",
                self.name, self.class
            )));
        }
        self.power = Some(power);
        self.power_modified = true;
        Ok(())
    }

    /// Removes all constraints of the asset.
    pub fn clear_constraints(&mut self) {
        self.constraints.clear();
        self.constraints_cleared = true;
    }
}

esdl_literals! {
    /// The ESDL carrier classes.
    pub enum CarrierClass {
        EnergyCarrier => "EnergyCarrier",
        Commodity => "Commodity",
        ElectricityCommodity => "ElectricityCommodity",
        GasCommodity => "GasCommodity",
        HeatCommodity => "HeatCommodity",
        WaterCommodity => "WaterCommodity",
    }
}

/// An energy carrier.
#[derive(Clone, Debug, PartialEq)]
pub struct Carrier {
    pub id: String,
    pub name: String,
    pub class: CarrierClass,
    pub cost: Option<GenericProfile>,
}

/// A KPI with a floating point value.
#[derive(Clone, Debug, PartialEq)]
pub struct Kpi {
    pub id: Option<String>,
    pub name: String,
    pub value: f64,
    pub unit: Option<QuantityAndUnit>,
}

/// A connection from an out-port of one asset to an in-port of another.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub from_port: String,
    pub to_port: String,
}
