// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The storage expansion: every storage asset becomes three Opera options,
//! the storage itself, a charger that feeds it and a discharger it feeds.

use crate::extractor::{AssetRecord, StorageRecord};
use crate::store::{
    CapacityRangeRow, CarrierAllocationRow, CostRow, FlowRow, OperaStore, OperaTables, OptionRow,
    StorageParametersRow, TechnicalParametersRow, VariantRow,
};
use crate::Error;

use super::options::GW_YEAR_IN_PJ;
use super::{opera_carrier_name, ImportedOption, OperaImporter};

const STORAGE_LIFETIME: i64 = 10;
const AVAILABILITY_FACTOR: f64 = 0.99;

/// The part a storage option plays for its asset.
#[derive(Clone, Copy, Debug, PartialEq)]
enum StorageRole {
    Storage,
    Charger,
    Discharger,
}

impl StorageRole {
    const ALL: [StorageRole; 3] = [
        StorageRole::Storage,
        StorageRole::Charger,
        StorageRole::Discharger,
    ];

    fn option_name(&self, asset_name: &str) -> String {
        match self {
            StorageRole::Storage => asset_name.to_string(),
            StorageRole::Charger => format!("{asset_name}_charger"),
            StorageRole::Discharger => format!("{asset_name}_discharger"),
        }
    }

    fn option_row(&self, name: String, sector: &str) -> OptionRow {
        let (unit_of_capacity, cap_to_act) = match self {
            StorageRole::Storage => ("PJ", 1.0),
            StorageRole::Charger | StorageRole::Discharger => ("GW", GW_YEAR_IN_PJ),
        };
        OptionRow {
            nr: None,
            name,
            sector: Some(sector.to_string()),
            unit_of_capacity: Some(unit_of_capacity.to_string()),
            activity_unit: Some("PJ".to_string()),
            cap_to_act: Some(cap_to_act),
            charge_option: Some(*self == StorageRole::Charger),
            discharge_option: Some(*self == StorageRole::Discharger),
            stock_option: Some(*self == StorageRole::Storage),
            lifetime: Some(STORAGE_LIFETIME),
            target_substance: Some("CO2".to_string()),
            connector_point: (*self == StorageRole::Charger).then_some(true),
            ..Default::default()
        }
    }

    /// +1 for taking in the carrier, -1 for giving it out.
    fn effect(&self) -> f64 {
        match self {
            StorageRole::Charger => 1.0,
            StorageRole::Storage | StorageRole::Discharger => -1.0,
        }
    }

    fn efficiency(&self, asset: &AssetRecord) -> f64 {
        let storage = asset.storage.as_ref();
        let efficiency = match self {
            StorageRole::Charger => storage.and_then(|s| s.charge_efficiency),
            StorageRole::Storage => Some(asset.efficiency),
            StorageRole::Discharger => storage.and_then(|s| s.discharge_efficiency),
        };
        efficiency.filter(|e| e.is_finite()).unwrap_or(1.0)
    }

    fn parameters(&self, nr: i64, year: i64, storage: &StorageRecord) -> StorageParametersRow {
        let (losses_per_hour, slow_load_time, fast_load_time) = match self {
            StorageRole::Charger => (None, storage.slow_load_time, storage.fast_load_time),
            StorageRole::Storage => (Some(storage.losses_per_hour), None, None),
            StorageRole::Discharger => (None, storage.slow_unload_time, storage.fast_unload_time),
        };
        StorageParametersRow {
            nr,
            construction_year: year,
            losses_per_hour,
            slow_load_time,
            fast_load_time,
        }
    }
}

/// A storage option of an asset and its number in Opera.
struct StorageOption {
    role: StorageRole,
    name: String,
    nr: i64,
}

impl OperaImporter {
    /// Adds the three options of a storage asset and all rows that belong to
    /// them.
    ///
    /// If the options are already in Opera, their numbers are reused and only
    /// the missing rows are added.  Only some of the options being present is
    /// an error.
    pub(super) fn add_storage<S>(
        &self,
        asset: &AssetRecord,
        store: &mut S,
    ) -> Result<Vec<ImportedOption>, Error>
    where
        S: OperaStore + ?Sized,
    {
        let (options, added) = self.storage_options(asset, store)?;
        let [storage, charger, discharger] = &options;

        let mut carriers = asset.carrier_in.iter();
        let carrier = carriers.next().map(|c| opera_carrier_name(c));
        if carriers.next().is_some() {
            tracing::warn!(
                "Storage {} has more than one input carrier, using {}.",
                asset.name,
                carrier.as_deref().unwrap_or_default()
            );
        }
        let storage_record = asset.storage.clone().unwrap_or_else(|| {
            tracing::warn!("Storage {} has no storage attributes.", asset.name);
            StorageRecord::default()
        });
        let year = self.config.year;

        for option in &options {
            if store.variant_exists(option.nr)? {
                tracing::info!("Option {}/{} already has variants.", option.nr, option.name);
            } else {
                store.insert_variant(&VariantRow::new(option.nr))?;
            }
        }

        for (from, to, remark) in [
            (charger, storage, "Storage: Charger -> storage"),
            (storage, discharger, "Storage: Storage -> Discharger"),
        ] {
            if store.flow_exists(from.nr)? {
                tracing::info!("Flow {}->{} is already in Opera.", from.name, to.name);
            } else {
                tracing::debug!("Adding flow {}->{}.", from.name, to.name);
                store.insert_flow(&FlowRow {
                    carrier: carrier.clone(),
                    from: from.nr,
                    to: to.nr,
                    remark: remark.to_string(),
                })?;
            }
        }

        for option in &options {
            if store.carrier_allocation_exists(option.nr)? {
                tracing::info!("Effect of {} is already in Opera.", option.name);
            } else {
                store.insert_carrier_allocation(&CarrierAllocationRow {
                    nr: option.nr,
                    carrier: carrier.clone(),
                    variant: 1,
                    construction_year: year,
                    year,
                    effect: option.role.effect(),
                })?;
            }

            if store.technical_parameters_exist(option.nr)? {
                tracing::info!("Efficiency of {} is already in Opera.", option.name);
            } else {
                store.insert_technical_parameters(&TechnicalParametersRow {
                    nr: option.nr,
                    year,
                    availability_factor: AVAILABILITY_FACTOR,
                    efficiency: option.role.efficiency(asset),
                })?;
            }

            if store.storage_parameters_exist(option.nr)? {
                tracing::info!("Storage parameters of {} are already in Opera.", option.name);
            } else {
                store.insert_storage_parameters(&option.role.parameters(
                    option.nr,
                    year,
                    &storage_record,
                ))?;
            }
        }

        // only the storage itself has costs and a capacity range
        if store.cost_exists(storage.nr, year)? {
            tracing::info!("Option {}/{} already has costs.", storage.nr, storage.name);
        } else {
            store.insert_cost(&CostRow {
                investment: Some(asset.investment_cost.unwrap_or(0.0)),
                fixed_operational: Some(asset.fixed_om_cost.unwrap_or(0.0)),
                variable: Some(asset.variable_om_cost.unwrap_or(0.0)),
                ..CostRow::new(storage.nr, year)
            })?;
        }

        let category = storage.nr.to_string();
        let scenario = &self.config.scenario;
        if store.capacity_range_exists(&category, year, scenario)? {
            tracing::info!(
                "Option {}/{} already has a capacity range for {scenario}.",
                storage.nr,
                storage.name
            );
        } else {
            let finite_or_zero = |v: Option<f64>| v.filter(|v| v.is_finite()).unwrap_or(0.0);
            store.insert_capacity_range(&CapacityRangeRow {
                max_total_capacity: Some(finite_or_zero(asset.power_max)),
                min_total_capacity: finite_or_zero(asset.power_min),
                ..CapacityRangeRow::new(category, year, scenario.as_str())
            })?;
        }

        Ok(options
            .into_iter()
            .map(|option| ImportedOption {
                asset_id: asset.id.clone(),
                name: option.name,
                nr: option.nr,
                added,
            })
            .collect())
    }

    /// Returns the storage, charger and discharger options of an asset, in
    /// that order, adding them if none of them exist.
    fn storage_options<S>(
        &self,
        asset: &AssetRecord,
        store: &mut S,
    ) -> Result<([StorageOption; 3], bool), Error>
    where
        S: OperaStore + ?Sized,
    {
        let names = StorageRole::ALL.map(|role| role.option_name(&asset.name));
        let mut existing = Vec::with_capacity(3);
        for name in &names {
            existing.push(store.find_option(name)?.and_then(|o| o.nr));
        }

        let (numbers, added) = match existing.as_slice() {
            [Some(storage), Some(charger), Some(discharger)] => {
                tracing::info!("Storage options of {} are already in Opera.", asset.name);
                ([*storage, *charger, *discharger], false)
            }
            [None, None, None] => {
                let mut numbers = [0; 3];
                for (nr, (role, name)) in numbers
                    .iter_mut()
                    .zip(StorageRole::ALL.iter().zip(&names))
                {
                    *nr = store.insert_option(
                        &role.option_row(name.clone(), &self.config.default_sector),
                    )?;
                }
                tracing::debug!(
                    "Added storage options {}/{}, {}/{} and {}/{}.",
                    numbers[0],
                    names[0],
                    numbers[1],
                    names[1],
                    numbers[2],
                    names[2]
                );
                (numbers, true)
            }
            _ => {
                return Err(Error::store_error(format!(
                    "Only some of the options {} are in Opera.",
                    names.join(", ")
                )))
            }
        };

        let [storage, charger, discharger] = names;
        Ok((
            [
                StorageOption {
                    role: StorageRole::Storage,
                    name: storage,
                    nr: numbers[0],
                },
                StorageOption {
                    role: StorageRole::Charger,
                    name: charger,
                    nr: numbers[1],
                },
                StorageOption {
                    role: StorageRole::Discharger,
                    name: discharger,
                    nr: numbers[2],
                },
            ],
            added,
        ))
    }
}
