// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The Opera options that ESDL assets are modelled after.

use crate::asset_category::{
    EsdlClass, GasConversionType, MobilityFuelType, PowerPlantFuel, VehicleType, WindTurbineType,
};
use crate::esdl::{Asset, AssetSubtype};

/// Returns the name of the reference option in the Opera database for an
/// asset, or `None` if there is no equivalent.
///
/// `out_carrier` is the name of the carrier set on the last out-port of the
/// asset, which decides the equivalent of imports.  Carriers a port only
/// takes from the port it is connected to don't count.
pub(crate) fn find_opera_equivalent(
    asset: &Asset,
    out_carrier: Option<&str>,
) -> Option<&'static str> {
    let equivalent = match asset.class() {
        EsdlClass::Electrolyzer => Some("H2 Large-scale electrolyser"),
        EsdlClass::MobilityDemand => mobility_equivalent(asset.subtype()),
        EsdlClass::GasConversion => match asset.subtype() {
            AssetSubtype::GasConversion(Some(GasConversionType::Atr)) => None,
            _ => Some("H2 uit SMR met CCS plus"),
        },
        EsdlClass::WindTurbine | EsdlClass::WindPark => match asset.subtype() {
            AssetSubtype::WindTurbine(WindTurbineType::WindOnLand) => Some("Wind op Land band 1"),
            AssetSubtype::WindTurbine(WindTurbineType::WindAtSea) => Some("Wind op Zee band 1"),
            other => {
                tracing::warn!(
                    "Unmapped type {:?} for {}, mapping to Wind op Zee for Opera equivalent.",
                    other,
                    asset.name()
                );
                Some("Wind op Zee band 1")
            }
        },
        EsdlClass::PVPanel | EsdlClass::PVPark | EsdlClass::PVInstallation => {
            Some("Solar-PV Residential")
        }
        EsdlClass::Import => out_carrier.and_then(import_equivalent),
        EsdlClass::Export => Some("H2 domestic to export"),
        EsdlClass::PowerPlant => match asset.subtype() {
            AssetSubtype::PowerPlant(PowerPlantFuel::Uranium) => {
                Some("REF Kernenergie  IBO 7500u 2017")
            }
            _ => None,
        },
        EsdlClass::EnergyAsset
        | EsdlClass::Producer
        | EsdlClass::Consumer
        | EsdlClass::Storage
        | EsdlClass::Conversion
        | EsdlClass::Transport
        | EsdlClass::AbstractBasicConversion
        | EsdlClass::GenericProducer
        | EsdlClass::GeothermalSource
        | EsdlClass::ResidualHeatSource
        | EsdlClass::SolarCollector
        | EsdlClass::GenericConsumer
        | EsdlClass::EnergyDemand
        | EsdlClass::ElectricityDemand
        | EsdlClass::HeatingDemand
        | EsdlClass::CoolingDemand
        | EsdlClass::Losses
        | EsdlClass::Battery
        | EsdlClass::HeatStorage
        | EsdlClass::GasStorage
        | EsdlClass::PumpedHydroPower
        | EsdlClass::GenericConversion
        | EsdlClass::HeatPump
        | EsdlClass::GasHeater
        | EsdlClass::FuelCell
        | EsdlClass::CHP
        | EsdlClass::ElectricBoiler
        | EsdlClass::Pipe
        | EsdlClass::ElectricityCable
        | EsdlClass::Joint
        | EsdlClass::Bus
        | EsdlClass::Valve
        | EsdlClass::Pump
        | EsdlClass::Transformer => None,
    };

    if equivalent.is_none() {
        tracing::warn!(
            "Cannot map {} of type {} to an Opera equivalent.",
            asset.name(),
            asset.class()
        );
    }
    equivalent
}

fn mobility_equivalent(subtype: &AssetSubtype) -> Option<&'static str> {
    let AssetSubtype::MobilityDemand {
        fuel_type,
        vehicle_types,
    } = subtype
    else {
        return None;
    };
    if *fuel_type != Some(MobilityFuelType::Hydrogen) {
        return Some("REF Finale vraag verkeer th");
    }
    if vehicle_types.contains(&VehicleType::Car) {
        // the leading space is part of the option name
        Some(" H2 auto")
    } else if vehicle_types.contains(&VehicleType::Van) {
        Some("H2 van")
    } else if vehicle_types.contains(&VehicleType::Truck) {
        Some("H2 truck with energy consumption reduction")
    } else {
        None
    }
}

fn import_equivalent(carrier: &str) -> Option<&'static str> {
    let carrier = carrier.to_lowercase();
    if carrier.starts_with("elec") {
        Some("REF E import Flexnet")
    } else if ["h2", "waterstof", "hydrogen"]
        .iter()
        .any(|p| carrier.starts_with(p))
    {
        Some("Import H2 to H2 domestic")
    } else if ["aardgas", "natural gas"].iter().any(|p| carrier.starts_with(p)) {
        Some("REF Gaswinning en -import")
    } else {
        None
    }
}
