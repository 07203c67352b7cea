// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Adding options for assets to Opera.

use crate::asset_category::AssetCategory;
use crate::extractor::AssetRecord;
use crate::store::{OperaStore, OperaTables, OptionRow};
use crate::Error;

use super::{ImportedOption, OperaImporter};

/// Capacity in GW to activity in PJ: the energy of one GW in a year.
pub(super) const GW_YEAR_IN_PJ: f64 = 31.536;

impl OperaImporter {
    /// Adds an option for every asset that doesn't have one yet, and the
    /// storage options of storage assets.  Returns the options of all
    /// assets.
    pub(super) fn add_options<S>(
        &self,
        assets: &[AssetRecord],
        store: &mut S,
    ) -> Result<Vec<ImportedOption>, Error>
    where
        S: OperaStore + ?Sized,
    {
        let mut options = Vec::new();
        for asset in assets {
            if asset.category == AssetCategory::Storage {
                options.extend(self.add_storage(asset, store)?);
                continue;
            }

            let option = match store.find_option(&asset.name)? {
                Some(OptionRow { nr: Some(nr), .. }) => {
                    tracing::info!("Option {nr}/{} is already in Opera.", asset.name);
                    ImportedOption {
                        asset_id: asset.id.clone(),
                        name: asset.name.clone(),
                        nr,
                        added: false,
                    }
                }
                Some(OptionRow { nr: None, .. }) => {
                    return Err(Error::store_error(format!(
                        "Option {} has no number.",
                        asset.name
                    )))
                }
                None => self.add_option(asset, store)?,
            };
            options.push(option);
        }
        Ok(options)
    }

    fn add_option<S>(&self, asset: &AssetRecord, store: &mut S) -> Result<ImportedOption, Error>
    where
        S: OperaStore + ?Sized,
    {
        let reference = match asset.opera_equivalent {
            Some(equivalent) => {
                let reference = store.find_option(equivalent)?;
                if reference.is_none() {
                    tracing::warn!(
                        "Opera equivalent {equivalent} of {} is not in Opera.",
                        asset.name
                    );
                }
                reference
            }
            None => None,
        };
        let template = reference.unwrap_or_else(|| {
            tracing::warn!(
                "No Opera equivalent for {}, creating a new option.",
                asset.name
            );
            OptionRow::placeholder()
        });

        let (unit_of_capacity, cap_to_act) = if asset.category == AssetCategory::Consumer {
            ("PJ", 1.0)
        } else {
            ("GW", GW_YEAR_IN_PJ)
        };
        let option = OptionRow {
            nr: None,
            name: asset.name.clone(),
            sector: Some(self.config.default_sector.clone()),
            unit_of_capacity: Some(unit_of_capacity.to_string()),
            activity_unit: Some("PJ".to_string()),
            cap_to_act: Some(cap_to_act),
            unlimited_option: Some(true),
            unlimited_capacity: Some(true),
            ..template
        };

        let nr = store.insert_option(&option)?;
        tracing::debug!("Added option {nr}/{}.", asset.name);
        Ok(ImportedOption {
            asset_id: asset.id.clone(),
            name: asset.name.clone(),
            nr,
            added: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::asset_category::{AssetCategory, EsdlClass};
    use crate::extractor::AssetRecord;
    use crate::importer::tests::asset_record;
    use crate::importer::OperaImporter;
    use crate::store::{MemoryStore, OperaTables, OptionRow, Record};
    use crate::Error;

    #[test]
    fn test_options() -> Result<(), Error> {
        let mut store = MemoryStore::new();
        let reference = store.insert_option(&OptionRow {
            name: "Solar-PV Residential".to_string(),
            sector: Some("Gebouwde omgeving".to_string()),
            unit_of_capacity: Some("MW".to_string()),
            target_substance: Some("CO2".to_string()),
            lifetime: Some(20),
            extra: Record::new().with("Subsector", "Zon"),
            ..Default::default()
        })?;

        let assets = [
            AssetRecord {
                opera_equivalent: Some("Solar-PV Residential"),
                ..asset_record(AssetCategory::Producer, EsdlClass::PVPark, "Solar1")
            },
            asset_record(AssetCategory::Consumer, EsdlClass::GenericConsumer, "Demand1"),
        ];
        let importer = OperaImporter::default();
        let options = importer.add_options(&assets, &mut store)?;
        assert_eq!(options.len(), 2);
        assert!(options.iter().all(|o| o.added && o.nr != reference));

        // cloned from the reference option
        let solar = store
            .find_option("Solar1")?
            .ok_or(Error::internal("no option"))?;
        assert_eq!(solar.nr, Some(options[0].nr));
        assert_eq!(solar.sector.as_deref(), Some("Energie"));
        assert_eq!(solar.unit_of_capacity.as_deref(), Some("GW"));
        assert_eq!(solar.cap_to_act, Some(31.536));
        assert_eq!(solar.lifetime, Some(20));
        assert_eq!(solar.extra, Record::new().with("Subsector", "Zon"));

        // created from the placeholder
        let demand = store
            .find_option("Demand1")?
            .ok_or(Error::internal("no option"))?;
        assert_eq!(demand.unit_of_capacity.as_deref(), Some("PJ"));
        assert_eq!(demand.activity_unit.as_deref(), Some("PJ"));
        assert_eq!(demand.cap_to_act, Some(1.0));
        assert_eq!(demand.unlimited_option, Some(true));
        assert_eq!(demand.unlimited_capacity, Some(true));
        assert_eq!(demand.target_substance.as_deref(), Some("CO2"));
        assert_eq!(demand.lifetime, None);

        let again = importer.add_options(&assets, &mut store)?;
        assert!(again.iter().all(|o| !o.added));
        assert_eq!(
            again.iter().map(|o| o.nr).collect::<Vec<_>>(),
            options.iter().map(|o| o.nr).collect::<Vec<_>>()
        );

        Ok(())
    }
}
