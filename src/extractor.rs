// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Extraction of flat, unit-normalized records from an [`EnergySystem`].
//!
//! Every numeric value is converted to the unit Opera expects: power in GW,
//! energy in PJ and costs per GW or PJ.  A value that can't be converted
//! aborts the extraction with a `UnitError`, everything else the extractor
//! doesn't understand is reported through `tracing` and left empty.

mod equivalent;
mod records;

pub use records::{AssetRecord, CarrierRecord, HourlyPrice, KpiRecord, StorageRecord};

use chrono::TimeDelta;

use crate::asset_category::AssetState;
use crate::esdl::{
    Asset, CarrierClass, EnergySystem, GenericProfile, PortDirection, Range, StorageAttributes,
};
use crate::units::{
    self, QuantityAndUnit, QuantityDescriptor, QuantityRegistry, COST_IN_EUR_PER_GJ,
    COST_IN_EUR_PER_MWH, COST_IN_MEUR_PER_GW, COST_IN_MEUR_PER_GW_PER_YEAR, COST_IN_MEUR_PER_PJ,
    ENERGY_IN_J, ENERGY_IN_PJ, POWER_IN_GW, POWER_IN_W,
};
use crate::Error;

/// An energy system together with the records extracted from it.
///
/// The energy system is kept so that optimizer results can be merged back
/// into it later.
#[derive(Debug)]
pub struct ParsedSystem {
    pub energy_system: EnergySystem,
    pub assets: Vec<AssetRecord>,
    pub carriers: Vec<CarrierRecord>,
}

/// Loads an ESDL document and extracts its asset and carrier records.
pub fn parse(text: &str) -> Result<ParsedSystem, Error> {
    tracing::debug!(
        "Target units: power in {}, energy in {}, costs in {}, {}, {} and {}.",
        POWER_IN_GW.description,
        ENERGY_IN_PJ.description,
        COST_IN_MEUR_PER_GW.description,
        COST_IN_MEUR_PER_GW_PER_YEAR.description,
        COST_IN_MEUR_PER_PJ.description,
        COST_IN_EUR_PER_MWH.description
    );

    let energy_system = EnergySystem::from_esdl_str(text)?;
    let assets = extract_assets(&energy_system)?;
    let carriers = extract_carriers(&energy_system)?;

    tracing::info!(
        "Extracted {} assets and {} carriers from energy system {:?}.",
        assets.len(),
        carriers.len(),
        energy_system.name().unwrap_or_default()
    );
    Ok(ParsedSystem {
        energy_system,
        assets,
        carriers,
    })
}

/// Extracts a record for every enabled asset that Opera can represent.
pub fn extract_assets(es: &EnergySystem) -> Result<Vec<AssetRecord>, Error> {
    let mut records = Vec::new();
    for asset in es.assets() {
        if asset.class().is_ignored() || asset.state() == AssetState::Disabled {
            tracing::debug!(
                "Ignoring {} asset {} ({}).",
                asset.state(),
                asset.name(),
                asset.class()
            );
            continue;
        }
        match extract_asset(es, asset) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(err) => {
                tracing::error!(
                    "Error parsing input: asset {} not configured correctly: {err}",
                    asset.name()
                );
                return Err(err);
            }
        }
    }
    Ok(records)
}

fn extract_asset(es: &EnergySystem, asset: &Asset) -> Result<Option<AssetRecord>, Error> {
    let Some(category) = asset.category() else {
        tracing::warn!(
            "Asset {} has no category below {}, ignoring.",
            asset.name(),
            asset.class()
        );
        return Ok(None);
    };
    let quantities = es.quantities();
    tracing::debug!("Converting {}.", asset.name());

    let mut power_range = match find_range(asset, "power") {
        Some(range) => Some(convert_range(quantities, asset, range, &POWER_IN_GW)?),
        None => None,
    };
    // the capacity range of storage replaces the power range, in PJ
    if let Some(range) = find_range(asset, "capacity") {
        power_range = Some(convert_range(quantities, asset, range, &ENERGY_IN_PJ)?);
    }

    let power = match asset.power() {
        Some(power) if power != 0.0 => Some(units::convert(power, &POWER_IN_W, &POWER_IN_GW)?),
        _ => None,
    };

    let mut carrier_in = Vec::new();
    let mut carrier_out = Vec::new();
    for port in asset.ports() {
        if let Some(carrier) = es.port_carrier(asset, port) {
            match port.direction {
                PortDirection::In => carrier_in.push(carrier.name.clone()),
                PortDirection::Out => carrier_out.push(carrier.name.clone()),
            }
        }
    }
    let out_carrier = asset
        .ports()
        .iter()
        .rev()
        .find(|port| port.direction == PortDirection::Out)
        .and_then(|port| port.carrier.as_deref())
        .and_then(|id| es.carrier(id))
        .map(|carrier| carrier.name.as_str());
    let (profiles_in, profiles_out) = extract_port_profiles(quantities, asset)?;

    let storage = match asset.storage() {
        Some(attributes) => Some(extract_storage(attributes)?),
        None => None,
    };

    let costs = asset.cost_information();
    let cost = |profile: Option<&GenericProfile>, target: &QuantityDescriptor| match profile {
        Some(profile) => extract_cost(quantities, asset, profile, target),
        None => Ok(None),
    };

    Ok(Some(AssetRecord {
        category,
        id: asset.id().to_string(),
        esdl_type: asset.class(),
        name: asset.name().to_string(),
        power_min: power_range.map(|(min, _)| min),
        power_max: power_range.map(|(_, max)| max),
        power,
        // unset reads as 1.0; an efficiency of 0 gets the same energy use output effect
        efficiency: asset.efficiency().unwrap_or(1.0),
        investment_cost: cost(
            costs.and_then(|c| c.investment_costs.as_ref()),
            &COST_IN_MEUR_PER_GW,
        )?,
        fixed_om_cost: cost(
            costs.and_then(|c| c.fixed_operational_and_maintenance_costs.as_ref()),
            &COST_IN_MEUR_PER_GW_PER_YEAR,
        )?,
        variable_om_cost: cost(
            costs.and_then(|c| c.variable_operational_and_maintenance_costs.as_ref()),
            &COST_IN_MEUR_PER_PJ,
        )?,
        marginal_cost: cost(
            costs.and_then(|c| c.marginal_costs.as_ref()),
            &COST_IN_EUR_PER_MWH,
        )?,
        opera_equivalent: equivalent::find_opera_equivalent(asset, out_carrier),
        carrier_in,
        carrier_out,
        profiles_in,
        profiles_out,
        storage,
    }))
}

/// Returns the range of the first ranged constraint on `attribute`.
fn find_range<'a>(asset: &'a Asset, attribute: &str) -> Option<&'a Range> {
    asset
        .constraints()
        .iter()
        .find(|c| c.attribute_reference.eq_ignore_ascii_case(attribute))
        .map(|c| &c.range)
}

fn convert_range(
    quantities: &QuantityRegistry,
    asset: &Asset,
    range: &Range,
    target: &QuantityDescriptor,
) -> Result<(f64, f64), Error> {
    let default_unit = QuantityAndUnit::Type(POWER_IN_W);
    let unit = match &range.unit {
        Some(unit) => unit,
        None => {
            tracing::warn!(
                "No unit specified for constraint of asset {}, assuming {}.",
                asset.name(),
                POWER_IN_W.description
            );
            &default_unit
        }
    };
    Ok((
        quantities.convert_to(range.min, Some(unit), target)?,
        quantities.convert_to(range.max, Some(unit), target)?,
    ))
}

fn extract_cost(
    quantities: &QuantityRegistry,
    asset: &Asset,
    profile: &GenericProfile,
    target: &QuantityDescriptor,
) -> Result<Option<f64>, Error> {
    let Some(single_value) = profile.as_single_value() else {
        tracing::warn!(
            "Cannot convert {} profile {} of {} to a single value.",
            profile.class_name(),
            profile.label(),
            asset.name()
        );
        return Ok(None);
    };
    quantities
        .convert_to(single_value.value, single_value.unit.as_ref(), target)
        .map(Some)
}

/// Returns the first single value profile of every in-port and out-port, in
/// PJ.
fn extract_port_profiles(
    quantities: &QuantityRegistry,
    asset: &Asset,
) -> Result<(Vec<f64>, Vec<f64>), Error> {
    let mut profiles_in = Vec::new();
    let mut profiles_out = Vec::new();
    for port in asset.ports() {
        let Some(profile) = port.profiles.first() else {
            continue;
        };
        match profile.as_single_value() {
            Some(sv) => {
                let value = quantities.convert_to(sv.value, sv.unit.as_ref(), &ENERGY_IN_PJ)?;
                match port.direction {
                    PortDirection::In => profiles_in.push(value),
                    PortDirection::Out => profiles_out.push(value),
                }
            }
            None => tracing::warn!(
                "Unsupported profile type {} on port {} of {}, ignoring.",
                profile.class_name(),
                port.id,
                asset.name()
            ),
        }
        if port.profiles.len() > 1 {
            tracing::warn!(
                "Port {} of {} has {} profiles, only the first one is used.",
                port.id,
                asset.name(),
                port.profiles.len()
            );
        }
    }
    Ok((profiles_in, profiles_out))
}

fn extract_storage(attributes: &StorageAttributes) -> Result<StorageRecord, Error> {
    let hours = |rate: f64| {
        if rate != 0.0 {
            Some(attributes.capacity / (rate * 3600.0))
        } else {
            None
        }
    };
    let load_time = hours(attributes.max_charge_rate);
    let unload_time = hours(attributes.max_discharge_rate);

    Ok(StorageRecord {
        capacity: units::convert(attributes.capacity, &ENERGY_IN_J, &ENERGY_IN_PJ)?,
        charge_efficiency: attributes.charge_efficiency,
        discharge_efficiency: attributes.discharge_efficiency,
        slow_load_time: load_time,
        fast_load_time: load_time,
        slow_unload_time: unload_time,
        fast_unload_time: unload_time,
        losses_per_hour: units::convert(
            attributes.self_discharge_rate * 3600.0,
            &ENERGY_IN_J,
            &ENERGY_IN_PJ,
        )?,
    })
}

/// Extracts a record for every carrier, with its price converted to €/MWh
/// for electricity and €/GJ for other carriers.
pub fn extract_carriers(es: &EnergySystem) -> Result<Vec<CarrierRecord>, Error> {
    let mut records = Vec::new();
    for carrier in es.carriers() {
        let mut record = CarrierRecord {
            name: carrier.name.clone(),
            id: carrier.id.clone(),
            cost: None,
            unit: None,
        };
        match carrier.cost.as_ref().map(|c| (c, c.as_single_value())) {
            Some((_, Some(price))) => {
                record.cost = Some(price.value);
                if let Some(unit) = &price.unit {
                    let target = if carrier.class == CarrierClass::ElectricityCommodity {
                        &COST_IN_EUR_PER_MWH
                    } else {
                        &COST_IN_EUR_PER_GJ
                    };
                    record.cost = Some(es.quantities().convert_to(price.value, Some(unit), target)?);
                    record.unit = Some(target.description.to_string());
                }
                tracing::debug!(
                    "Carrier {} has cost {:?} {}.",
                    record.name,
                    record.cost,
                    record.unit.as_deref().unwrap_or("(no unit)")
                );
            }
            Some((profile, None)) => tracing::warn!(
                "Cannot convert {} profile {} of carrier {} to a single value.",
                profile.class_name(),
                profile.label(),
                carrier.name
            ),
            None => {}
        }
        records.push(record);
    }
    Ok(records)
}

/// Extracts the demand KPIs, in PJ.
///
/// Only KPIs with a described unit are demands; heat ("Warmte") is left out.
pub fn extract_kpis(es: &EnergySystem) -> Result<Vec<KpiRecord>, Error> {
    let quantities = es.quantities();
    let mut records = Vec::new();
    for kpi in es.kpis() {
        let Some(unit) = &kpi.unit else {
            continue;
        };
        let unit = quantities.resolve(unit)?;
        if unit.description.is_empty() || unit.description == "Warmte" {
            continue;
        }
        records.push(KpiRecord {
            name: kpi.name.clone(),
            id: kpi.id.clone(),
            demand: units::convert(kpi.value, unit, &ENERGY_IN_PJ)?,
            unit: ENERGY_IN_PJ.description.to_string(),
            carrier: unit.description.to_string(),
        });
    }
    Ok(records)
}

/// Extracts hourly prices from all time series profiles of the energy
/// system.
///
/// The values of profiles with a unit are taken to be in €/MWh and converted
/// to €/GJ.  Each value belongs to the hour that ends one hour later than
/// the previous one, starting one hour after the start of the profile.
pub fn extract_hourly_prices(es: &EnergySystem) -> Vec<HourlyPrice> {
    let mut prices = Vec::new();
    for profile in es.time_series() {
        let mut date_time = profile.start;
        for (hour, value) in (1..).zip(&profile.values) {
            date_time += TimeDelta::hours(1);
            let (price, unit) = match profile.unit {
                Some(_) => (value / 3.6, Some(COST_IN_EUR_PER_GJ.description.to_string())),
                None => (*value, None),
            };
            prices.push(HourlyPrice {
                date: date_time.date(),
                time: date_time.time(),
                hour,
                price,
                unit,
            });
        }
    }
    prices
}
