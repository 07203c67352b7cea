// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The relational importer, which adds extracted asset and carrier records to
//! an Opera options database.
//!
//! The import runs in four phases, each committed before the next one
//! starts:
//!
//! 1. energy carriers,
//! 2. activities of consumers,
//! 3. options, with the storage expansion for storage assets,
//! 4. the tables that depend on the options of non-storage assets.
//!
//! Every row is only inserted if the table doesn't have it yet, so an import
//! can be repeated on a partially populated store.  Existing rows are never
//! updated.

mod activities;
mod carriers;
mod dependents;
mod options;
mod storage;

use std::path::Path;

use crate::extractor::{AssetRecord, CarrierRecord};
use crate::store::OperaStore;
use crate::{Error, ImportConfig};

/// Returns the name of the Opera energy carrier for an ESDL carrier.
pub fn opera_carrier_name(carrier: &str) -> String {
    format!("MMvIB_{carrier}")
}

/// Returns the name of the Opera activity of a consumer asset.
pub fn activity_name(asset_name: &str) -> String {
    format!("Activity_{asset_name}")
}

/// Copies the clean template database over the working database, so that a
/// run starts from a known state.
pub fn copy_clean_database(template: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<(), Error> {
    let (template, target) = (template.as_ref(), target.as_ref());
    std::fs::copy(template, target).map_err(|e| {
        Error::store_error(format!(
            "Unable to copy {} to {}: {e}",
            template.display(),
            target.display()
        ))
    })?;
    tracing::info!(
        "Copied clean Opera database {} to {}.",
        template.display(),
        target.display()
    );
    Ok(())
}

/// An option of the Opera database that belongs to an imported asset.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedOption {
    pub asset_id: String,
    pub name: String,
    pub nr: i64,
    /// False if the option was already in the database.
    pub added: bool,
}

/// What an import added to the database.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportReport {
    pub carriers_added: usize,
    pub activities_added: usize,
    /// The options of all imported assets, three for every storage asset.
    pub options: Vec<ImportedOption>,
}

impl ImportReport {
    /// Returns the number of the option with the given name.
    pub fn option_nr(&self, name: &str) -> Option<i64> {
        self.options.iter().find(|o| o.name == name).map(|o| o.nr)
    }
}

/// Imports records into an Opera database.
#[derive(Clone, Debug, Default)]
pub struct OperaImporter {
    config: ImportConfig,
}

impl OperaImporter {
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Imports the records into `store`.
    ///
    /// A store error abandons the rest of the import, the phases that were
    /// already committed stay in the store.
    pub fn import<S>(
        &self,
        assets: &[AssetRecord],
        carriers: &[CarrierRecord],
        store: &mut S,
    ) -> Result<ImportReport, Error>
    where
        S: OperaStore + ?Sized,
    {
        tracing::info!(
            "Importing {} assets and {} carriers for year {} and scenario {}.",
            assets.len(),
            carriers.len(),
            self.config.year,
            self.config.scenario
        );

        let mut report = ImportReport::default();
        run_phase("energy carriers", store, |store| {
            report.carriers_added = self.add_carriers(carriers, store)?;
            Ok(())
        })?;
        run_phase("activities", store, |store| {
            report.activities_added = self.add_activities(assets, store)?;
            Ok(())
        })?;
        run_phase("options", store, |store| {
            report.options = self.add_options(assets, store)?;
            Ok(())
        })?;
        run_phase("option details", store, |store| {
            self.add_dependents(assets, &report.options, store)
        })?;

        tracing::info!(
            "Import done: {} carriers, {} activities and {} of {} options added.",
            report.carriers_added,
            report.activities_added,
            report.options.iter().filter(|o| o.added).count(),
            report.options.len()
        );
        Ok(report)
    }
}

fn run_phase<S, F>(name: &str, store: &mut S, phase: F) -> Result<(), Error>
where
    S: OperaStore + ?Sized,
    F: FnOnce(&mut S) -> Result<(), Error>,
{
    tracing::debug!("Adding {name} to Opera.");
    let result = phase(&mut *store).and_then(|()| store.commit());
    if let Err(e) = &result {
        tracing::error!("Import abandoned while adding {name}: {e}");
    }
    result
}
