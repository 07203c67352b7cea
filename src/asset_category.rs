// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `EsdlClass` enum, which enumerates the ESDL asset
//! classes that the adapter understands, and the `AssetCategory` enum, which
//! represents the category of an asset.

use std::fmt::Display;

/// Represents the category of an asset: the ESDL class directly below
/// `EnergyAsset` in the asset's class hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    Producer,
    Consumer,
    Storage,
    Transport,
    Conversion,
}

impl Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetCategory::Producer => write!(f, "Producer"),
            AssetCategory::Consumer => write!(f, "Consumer"),
            AssetCategory::Storage => write!(f, "Storage"),
            AssetCategory::Transport => write!(f, "Transport"),
            AssetCategory::Conversion => write!(f, "Conversion"),
        }
    }
}

esdl_literals! {
    /// The ESDL asset classes known to the adapter, including the abstract
    /// ones that make up their class hierarchy.
    pub enum EsdlClass {
        EnergyAsset => "EnergyAsset",
        Producer => "Producer",
        Consumer => "Consumer",
        Storage => "Storage",
        Conversion => "Conversion",
        Transport => "Transport",
        AbstractBasicConversion => "AbstractBasicConversion",

        GenericProducer => "GenericProducer",
        WindTurbine => "WindTurbine",
        WindPark => "WindPark",
        PVPanel => "PVPanel",
        PVPark => "PVPark",
        PVInstallation => "PVInstallation",
        Import => "Import",
        GeothermalSource => "GeothermalSource",
        ResidualHeatSource => "ResidualHeatSource",
        SolarCollector => "SolarCollector",

        GenericConsumer => "GenericConsumer",
        EnergyDemand => "EnergyDemand",
        ElectricityDemand => "ElectricityDemand",
        HeatingDemand => "HeatingDemand",
        CoolingDemand => "CoolingDemand",
        MobilityDemand => "MobilityDemand",
        Export => "Export",
        Losses => "Losses",

        Battery => "Battery",
        HeatStorage => "HeatStorage",
        GasStorage => "GasStorage",
        PumpedHydroPower => "PumpedHydroPower",

        GenericConversion => "GenericConversion",
        Electrolyzer => "Electrolyzer",
        GasConversion => "GasConversion",
        PowerPlant => "PowerPlant",
        HeatPump => "HeatPump",
        GasHeater => "GasHeater",
        FuelCell => "FuelCell",
        CHP => "CHP",
        ElectricBoiler => "ElectricBoiler",

        Pipe => "Pipe",
        ElectricityCable => "ElectricityCable",
        Joint => "Joint",
        Bus => "Bus",
        Valve => "Valve",
        Pump => "Pump",
        Transformer => "Transformer",
    }
}

impl EsdlClass {
    /// Returns the direct supertype of the class, or `None` for
    /// `EnergyAsset`.
    pub fn supertype(self) -> Option<EsdlClass> {
        use EsdlClass::*;

        match self {
            EnergyAsset => None,
            Producer | Consumer | Storage | Conversion | Transport => Some(EnergyAsset),
            AbstractBasicConversion | GenericConversion => Some(Conversion),

            GenericProducer | WindTurbine | PVPanel | Import | GeothermalSource
            | ResidualHeatSource | SolarCollector => Some(Producer),
            WindPark => Some(WindTurbine),
            PVPark | PVInstallation => Some(PVPanel),

            GenericConsumer | EnergyDemand | MobilityDemand | Export | Losses => Some(Consumer),
            ElectricityDemand | HeatingDemand | CoolingDemand => Some(EnergyDemand),

            Battery | HeatStorage | GasStorage | PumpedHydroPower => Some(Storage),

            Electrolyzer | GasConversion | PowerPlant | HeatPump | GasHeater | FuelCell | CHP
            | ElectricBoiler => Some(AbstractBasicConversion),

            Pipe | ElectricityCable | Joint | Bus | Valve | Pump | Transformer => Some(Transport),
        }
    }

    /// Returns an iterator over the class and all its supertypes, from the
    /// most specific to `EnergyAsset`.
    pub fn lineage(self) -> impl Iterator<Item = EsdlClass> {
        std::iter::successors(Some(self), |c| c.supertype())
    }

    /// Returns true if the class is `class` or one of its subclasses.
    pub fn is_a(self, class: EsdlClass) -> bool {
        self.lineage().any(|c| c == class)
    }

    /// Returns the category of the class: the class directly below
    /// `EnergyAsset` in its lineage.
    ///
    /// Returns `None` for `EnergyAsset` itself.
    pub fn category(self) -> Option<AssetCategory> {
        let below_base = self
            .lineage()
            .take_while(|c| *c != EsdlClass::EnergyAsset)
            .last()?;
        match below_base {
            EsdlClass::Producer => Some(AssetCategory::Producer),
            EsdlClass::Consumer => Some(AssetCategory::Consumer),
            EsdlClass::Storage => Some(AssetCategory::Storage),
            EsdlClass::Transport => Some(AssetCategory::Transport),
            EsdlClass::Conversion => Some(AssetCategory::Conversion),
            _ => None,
        }
    }

    /// Returns true if assets of this class carry a `power` attribute.
    pub fn has_power_attribute(self) -> bool {
        matches!(
            self.category(),
            Some(AssetCategory::Producer | AssetCategory::Consumer | AssetCategory::Conversion)
        )
    }

    /// Returns true if assets of this class carry an `efficiency` attribute.
    pub fn has_efficiency_attribute(self) -> bool {
        self.is_a(EsdlClass::AbstractBasicConversion)
    }

    /// Returns true if assets of this class are not represented in Opera.
    pub fn is_ignored(self) -> bool {
        self.is_a(EsdlClass::Transport) || self == EsdlClass::Export
    }
}

esdl_literals! {
    /// Whether an asset takes part in the energy system.
    pub enum AssetState {
        Enabled => "ENABLED",
        Disabled => "DISABLED",
        Optional => "OPTIONAL",
    }
}

esdl_literals! {
    /// The placement of a wind turbine.
    pub enum WindTurbineType {
        NotSet => "NOT_SET",
        WindOnLand => "WIND_ON_LAND",
        WindAtSea => "WIND_AT_SEA",
        WindOnCoast => "WIND_ON_COAST",
    }
}

esdl_literals! {
    /// The process of a gas conversion.
    pub enum GasConversionType {
        Smr => "SMR",
        Atr => "ATR",
    }
}

esdl_literals! {
    /// The fuel of a power plant.
    pub enum PowerPlantFuel {
        NotSet => "NOT_SET",
        Coal => "COAL",
        NaturalGas => "NATURAL_GAS",
        Biomass => "BIOMASS",
        Uranium => "URANIUM",
        Oil => "OIL",
        Hydrogen => "HYDROGEN",
    }
}

esdl_literals! {
    /// The fuel of a mobility demand.
    pub enum MobilityFuelType {
        Electricity => "ELECTRICITY",
        Hydrogen => "HYDROGEN",
        Gasoline => "GASOLINE",
        Diesel => "DIESEL",
        Lng => "LNG",
        Cng => "CNG",
        Biofuel => "BIOFUEL",
    }
}

esdl_literals! {
    /// A kind of vehicle served by a mobility demand.
    pub enum VehicleType {
        Car => "CAR",
        Van => "VAN",
        Truck => "TRUCK",
        Bus => "BUS",
        Tractor => "TRACTOR",
        Ship => "SHIP",
        Train => "TRAIN",
        Plane => "PLANE",
    }
}
