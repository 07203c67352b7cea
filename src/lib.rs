// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# Opera ESDL Adapter

This is a library for importing an energy system described in ESDL into the
options database of the Opera optimizer, and for writing the capacities Opera
chooses back into the energy system.

## Parsing

An ESDL document is loaded with [`parse`], which returns a [`ParsedSystem`]:
the [`EnergySystem`] itself, with its assets as the nodes of a directed graph
connected from out-ports to in-ports, together with flat [`AssetRecord`]s and
[`CarrierRecord`]s.

All values in the records are converted to the units Opera expects, using the
[`units`] module: power in GW, energy in PJ, and costs per GW or PJ.  Values
whose unit can't be converted abort the parse with a
[`UnitError`][ErrorKind::UnitError].  Anything else the adapter doesn't
understand, like assets without an Opera equivalent or ports with several
profiles, is reported through `tracing` and left empty.

## Importing

The [`OperaImporter`] adds the records to any [`OperaStore`]:
[`SqliteStore`] for Opera database files, or [`MemoryStore`].  It creates
the energy carriers, the activities of consumers, an option for every asset
and the rows that describe the options.  Options for assets with an Opera
equivalent are cloned from the equivalent option.  Every storage asset is
expanded into three options: the storage itself, a charger and a
discharger.

Imports are idempotent: a row is only inserted if it isn't in the store yet,
so running an import twice leaves the store unchanged the second time.

## Merging results

After Opera has run, [`read_capacity_results`] reads the capacities from its
output directory and [`merge_capacities`] writes them to the power attributes
of the assets.  The updated energy system can then be written with
[`to_esdl_string`][EnergySystem::to_esdl_string].
*/

#[macro_use]
mod literals;

mod asset_category;
pub use asset_category::{
    AssetCategory, AssetState, EsdlClass, GasConversionType, MobilityFuelType, PowerPlantFuel,
    VehicleType, WindTurbineType,
};

mod config;
pub use config::ImportConfig;

mod error;
pub use error::{Error, ErrorKind};

pub mod esdl;
pub use esdl::EnergySystem;

mod extractor;
pub use extractor::{
    extract_assets, extract_carriers, extract_hourly_prices, extract_kpis, parse, AssetRecord,
    CarrierRecord, HourlyPrice, KpiRecord, ParsedSystem, StorageRecord,
};

mod importer;
pub use importer::{
    activity_name, copy_clean_database, opera_carrier_name, ImportReport, ImportedOption,
    OperaImporter,
};

mod results;
pub use results::{merge_capacities, read_capacity_results, CapacityResult, MergeReport};

pub mod store;
pub use store::{MemoryStore, OperaStore, SqliteStore};

pub mod units;

#[cfg(test)]
mod test_utils;
