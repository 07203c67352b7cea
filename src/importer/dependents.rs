// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Adding the rows that describe the options of non-storage assets.
//!
//! When an asset has an Opera equivalent, its rows are cloned from the rows
//! of the equivalent option, otherwise they are created with defaults.

use crate::asset_category::AssetCategory;
use crate::extractor::AssetRecord;
use crate::store::{
    CapacityRangeRow, CostRow, EnergyUseRow, OperaStore, OperaTables, OptionActivityRow,
    VariantRow,
};
use crate::Error;

use super::{activity_name, opera_carrier_name, ImportedOption, OperaImporter};

impl OperaImporter {
    /// Adds the variants, costs, energy use, capacity ranges and activities
    /// of the options of all non-storage assets.
    pub(super) fn add_dependents<S>(
        &self,
        assets: &[AssetRecord],
        options: &[ImportedOption],
        store: &mut S,
    ) -> Result<(), Error>
    where
        S: OperaStore + ?Sized,
    {
        for asset in assets {
            if asset.category == AssetCategory::Storage {
                continue;
            }
            let nr = options
                .iter()
                .find(|o| o.asset_id == asset.id && o.name == asset.name)
                .map(|o| o.nr)
                .ok_or_else(|| {
                    Error::store_error(format!("Option {} is not in Opera.", asset.name))
                })?;
            let reference = match asset.opera_equivalent {
                Some(equivalent) => store.find_option(equivalent)?.and_then(|o| o.nr),
                None => None,
            };
            tracing::debug!("Adding details of option {nr}/{}.", asset.name);

            self.add_variants(asset, nr, reference, store)?;
            self.add_costs(asset, nr, reference, store)?;
            self.add_energy_use(asset, nr, store)?;
            self.add_capacity_range(asset, nr, reference, store)?;
            if asset.category == AssetCategory::Consumer {
                self.add_option_activity(asset, nr, store)?;
            }
        }
        Ok(())
    }

    fn add_variants<S>(
        &self,
        asset: &AssetRecord,
        nr: i64,
        reference: Option<i64>,
        store: &mut S,
    ) -> Result<(), Error>
    where
        S: OperaStore + ?Sized,
    {
        if store.variant_exists(nr)? {
            tracing::info!("Option {nr}/{} already has variants.", asset.name);
            return Ok(());
        }

        let mut variants = match reference {
            Some(reference) => store.find_variants(reference)?,
            None => Vec::new(),
        };
        if variants.is_empty() {
            variants.push(VariantRow::new(nr));
        }
        for variant in variants {
            store.insert_variant(&VariantRow { nr, ..variant })?;
        }
        Ok(())
    }

    fn add_costs<S>(
        &self,
        asset: &AssetRecord,
        nr: i64,
        reference: Option<i64>,
        store: &mut S,
    ) -> Result<(), Error>
    where
        S: OperaStore + ?Sized,
    {
        let year = self.config.year;
        let cost = |c: Option<f64>| c.filter(|c| c.is_finite()).unwrap_or(0.0);
        let (investment, fixed_operational, variable) = (
            cost(asset.investment_cost),
            cost(asset.fixed_om_cost),
            cost(asset.variable_om_cost),
        );

        if investment == 0.0 && fixed_operational == 0.0 && variable == 0.0 {
            tracing::info!(
                "All costs of {nr}/{} are empty, not adding them to Opera.",
                asset.name
            );
            return Ok(());
        }
        if store.cost_exists(nr, year)? {
            tracing::info!("Option {nr}/{} already has costs.", asset.name);
            return Ok(());
        }

        let mut costs = match reference {
            Some(reference) => store.find_costs(reference, year)?,
            None => Vec::new(),
        };
        if costs.is_empty() {
            costs.push(CostRow::new(nr, year));
        }
        for row in costs {
            store.insert_cost(&CostRow {
                nr,
                investment: Some(investment),
                fixed_operational: Some(fixed_operational),
                variable: Some(variable),
                ..row
            })?;
        }
        Ok(())
    }

    /// Adds the carriers an option uses, with an effect of 1 for inputs and
    /// the negated efficiency for outputs.
    fn add_energy_use<S>(&self, asset: &AssetRecord, nr: i64, store: &mut S) -> Result<(), Error>
    where
        S: OperaStore + ?Sized,
    {
        let output_effect = if asset.efficiency == 0.0 || asset.efficiency.is_nan() {
            "-1".to_string()
        } else {
            (-asset.efficiency).to_string()
        };
        let carriers = asset
            .carrier_in
            .iter()
            .map(|c| (c, "1".to_string()))
            .chain(asset.carrier_out.iter().map(|c| (c, output_effect.clone())));

        let year = self.config.year;
        for (carrier, effect) in carriers {
            let carrier = opera_carrier_name(carrier);
            if store.energy_use_exists(nr, year, &carrier)? {
                tracing::info!(
                    "Energy use of {carrier} by {nr}/{} is already in Opera.",
                    asset.name
                );
                continue;
            }
            store.insert_energy_use(&EnergyUseRow {
                nr,
                carrier,
                variant: 1,
                year,
                effect,
            })?;
        }
        Ok(())
    }

    fn add_capacity_range<S>(
        &self,
        asset: &AssetRecord,
        nr: i64,
        reference: Option<i64>,
        store: &mut S,
    ) -> Result<(), Error>
    where
        S: OperaStore + ?Sized,
    {
        let (year, scenario) = (self.config.year, self.config.scenario.as_str());
        let category = nr.to_string();
        if store.capacity_range_exists(&category, year, scenario)? {
            tracing::info!(
                "Option {nr}/{} already has a capacity range for {scenario}.",
                asset.name
            );
            return Ok(());
        }

        let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
        let references = match reference {
            Some(reference) => store.find_capacity_ranges(&reference.to_string(), year, scenario)?,
            None => Vec::new(),
        };

        if references.is_empty() {
            store.insert_capacity_range(&CapacityRangeRow {
                max_total_capacity: Some(finite(asset.power_max).unwrap_or(0.0)),
                min_total_capacity: finite(asset.power_min).unwrap_or(0.0),
                ..CapacityRangeRow::new(category, year, scenario)
            })?;
            return Ok(());
        }

        tracing::debug!(
            "Using the capacity range of option {} for {nr}/{}.",
            reference.unwrap_or_default(),
            asset.name
        );
        for row in references {
            store.insert_capacity_range(&CapacityRangeRow {
                category: category.clone(),
                // no upper limit without a maximum
                max_total_capacity: finite(asset.power_max),
                min_total_capacity: finite(asset.power_min).unwrap_or(0.0),
                min_activity_year: 0.0,
                max_activity_year: 0.0,
                activity_at_least_baseline: Some(false),
                ..row
            })?;
        }
        Ok(())
    }

    fn add_option_activity<S>(
        &self,
        asset: &AssetRecord,
        nr: i64,
        store: &mut S,
    ) -> Result<(), Error>
    where
        S: OperaStore + ?Sized,
    {
        let activity = activity_name(&asset.name);
        if store.option_activity_exists(nr, &activity)? {
            tracing::info!("Option {nr}/{} is already linked to {activity}.", asset.name);
            return Ok(());
        }
        store.insert_option_activity(&OptionActivityRow { nr, activity })
    }
}

#[cfg(test)]
mod tests {
    use crate::asset_category::{AssetCategory, EsdlClass};
    use crate::extractor::AssetRecord;
    use crate::importer::tests::asset_record;
    use crate::importer::OperaImporter;
    use crate::store::{table, ColumnValue, MemoryStore, OperaStore, OperaTables, OptionRow, Record};
    use crate::Error;

    fn import(assets: &[AssetRecord], store: &mut MemoryStore) -> Result<Vec<i64>, Error> {
        let importer = OperaImporter::default();
        let options = importer.add_options(assets, store)?;
        importer.add_dependents(assets, &options, store)?;
        Ok(options.iter().map(|o| o.nr).collect())
    }

    fn reference_option(store: &mut MemoryStore) -> Result<i64, Error> {
        let nr = store.insert_option(&OptionRow {
            name: "H2 Large-scale electrolyser".to_string(),
            ..Default::default()
        })?;
        store.insert(
            table::VARIANTS,
            &Record::new()
                .with("Nr", nr)
                .with("Variant", 3)
                .with("Beschikbaar", false)
                .with("Omschrijving", "PEM"),
        )?;
        store.insert(
            table::COSTS,
            &Record::new()
                .with("Nr", nr)
                .with("Variant", 3)
                .with("Jaar", 2030)
                .with("Investeringskosten", 700.0)
                .with("Brandstofkosten", 4.0),
        )?;
        store.insert(
            table::CAPACITY_RANGES,
            &Record::new()
                .with("Categorie", nr.to_string())
                .with("Jaar", 2030)
                .with("Scenario", "MMvIB")
                .with("Max aantal", 12.0)
                .with("Max totale capaciteit", 8.0)
                .with("Min totale capaciteit", 1.0)
                .with("Max Activiteit Jaar", 9.0),
        )?;
        Ok(nr)
    }

    #[test]
    fn test_rows_cloned_from_reference() -> Result<(), Error> {
        let mut store = MemoryStore::new();
        reference_option(&mut store)?;
        let assets = [AssetRecord {
            efficiency: 0.7,
            investment_cost: Some(500.0),
            power_min: Some(0.2),
            carrier_in: vec!["Electricity".to_string()],
            carrier_out: vec!["Hydrogen".to_string()],
            opera_equivalent: Some("H2 Large-scale electrolyser"),
            ..asset_record(AssetCategory::Conversion, EsdlClass::Electrolyzer, "Electrolyzer1")
        }];
        let nr = import(&assets, &mut store)?[0];

        let variants = store.find_variants(nr)?;
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].variant, 3);
        assert!(!variants[0].available);
        assert_eq!(variants[0].extra, Record::new().with("Omschrijving", "PEM"));

        let costs = store.find_costs(nr, 2030)?;
        assert_eq!(costs.len(), 1);
        assert_eq!(costs[0].variant, 3);
        assert_eq!(costs[0].investment, Some(500.0));
        assert_eq!(costs[0].fixed_operational, Some(0.0));
        assert_eq!(costs[0].extra, Record::new().with("Brandstofkosten", 4.0));

        let ranges = store.find_capacity_ranges(&nr.to_string(), 2030, "MMvIB")?;
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].max_total_capacity, None);
        assert_eq!(ranges[0].min_total_capacity, 0.2);
        assert_eq!(ranges[0].max_activity_year, 0.0);
        assert_eq!(ranges[0].activity_at_least_baseline, Some(false));
        assert_eq!(ranges[0].extra.get("Max aantal"), Some(&ColumnValue::Real(12.0)));

        let effects = store
            .select(table::ENERGY_USE, &[("Nr", nr.into())])?
            .iter()
            .map(|r| {
                (
                    r.get("Energiedrager").cloned().unwrap_or(ColumnValue::Null),
                    r.get("Effect").cloned().unwrap_or(ColumnValue::Null),
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(
            effects,
            vec![
                (ColumnValue::from("MMvIB_Electricity"), ColumnValue::from("1")),
                (ColumnValue::from("MMvIB_Hydrogen"), ColumnValue::from("-0.7")),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_rows_without_reference() -> Result<(), Error> {
        let mut store = MemoryStore::new();
        let assets = [
            AssetRecord {
                power_max: Some(5.0),
                carrier_out: vec!["Electricity".to_string()],
                ..asset_record(AssetCategory::Producer, EsdlClass::WindPark, "Wind1")
            },
            AssetRecord {
                variable_om_cost: Some(2.0),
                carrier_in: vec!["Heat".to_string()],
                ..asset_record(AssetCategory::Consumer, EsdlClass::HeatingDemand, "Heat1")
            },
        ];
        let numbers = import(&assets, &mut store)?;

        // no costs at all: no cost row
        assert!(store.find_costs(numbers[0], 2030)?.is_empty());
        let costs = store.find_costs(numbers[1], 2030)?;
        assert_eq!(costs.len(), 1);
        assert_eq!(costs[0].variable, Some(2.0));
        assert_eq!(costs[0].investment, Some(0.0));

        let variants = store.find_variants(numbers[0])?;
        assert_eq!(variants.len(), 1);
        assert!(variants[0].available);

        let ranges = store.find_capacity_ranges(&numbers[0].to_string(), 2030, "MMvIB")?;
        assert_eq!(ranges[0].max_total_capacity, Some(5.0));
        assert_eq!(ranges[0].min_total_capacity, 0.0);
        assert_eq!(ranges[0].activity_at_least_baseline, None);
        assert_eq!(ranges[0].extra.get("Max kosten"), Some(&ColumnValue::Real(0.0)));

        assert!(store.option_activity_exists(numbers[1], "Activity_Heat1")?);
        assert!(!store.option_activity_exists(numbers[0], "Activity_Wind1")?);
        assert_eq!(store.rows(table::ENERGY_USE).len(), 2);

        // repeated imports add nothing
        let counts = |store: &MemoryStore| {
            [
                table::VARIANTS,
                table::COSTS,
                table::ENERGY_USE,
                table::CAPACITY_RANGES,
                table::OPTION_ACTIVITIES,
            ]
            .map(|t| store.rows(t).len())
        };
        let before = counts(&store);
        import(&assets, &mut store)?;
        assert_eq!(counts(&store), before);

        Ok(())
    }

    #[test]
    fn test_output_effect_of_zero_efficiency() -> Result<(), Error> {
        let mut store = MemoryStore::new();
        let assets = [
            AssetRecord {
                efficiency: 0.0,
                carrier_out: vec!["Hydrogen".to_string()],
                ..asset_record(AssetCategory::Producer, EsdlClass::Import, "Import1")
            },
            // an unset efficiency
            AssetRecord {
                efficiency: 1.0,
                carrier_out: vec!["Hydrogen".to_string()],
                ..asset_record(AssetCategory::Producer, EsdlClass::Import, "Import2")
            },
        ];
        for nr in import(&assets, &mut store)? {
            let rows = store.select(table::ENERGY_USE, &[("Nr", nr.into())])?;
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].get("Effect"), Some(&ColumnValue::from("-1")));
        }

        Ok(())
    }
}
