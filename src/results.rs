// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Reading the capacities Opera has chosen, and merging them back into the
//! energy system they were computed for.

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::esdl::EnergySystem;
use crate::extractor::AssetRecord;
use crate::units::{self, POWER_IN_GW, POWER_IN_W};
use crate::Error;

const CAPACITY_FILE: &str = "Capacity.csv";
const UNIT_OF_CAPACITY_FILE: &str = "UoCapacity.csv";

/// A row of `Capacity.csv`.  Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct CapacityRow {
    #[serde(rename = "Option")]
    option: String,
    #[serde(rename = "View year")]
    view_year: i64,
    #[serde(rename = "Capacity")]
    capacity: f64,
}

/// A row of `UoCapacity.csv`.
#[derive(Debug, Deserialize)]
struct UnitOfCapacityRow {
    #[serde(rename = "Option")]
    option: String,
    #[serde(rename = "UoCapacity")]
    unit: String,
}

/// The capacity of an Opera option in the latest year Opera reports on.
#[derive(Clone, Debug, PartialEq)]
pub struct CapacityResult {
    /// The option label, `"<nr> <name>"`.
    pub label: String,
    pub nr: Option<i64>,
    pub name: String,
    pub view_year: i64,
    /// The sum of the capacities of all variants and construction years.
    pub capacity: f64,
    pub unit: String,
}

/// Reads the capacity results from the `Capacity.csv` and `UoCapacity.csv`
/// files in `dir`.
///
/// Both files are Latin-1 encoded.  Options without a unit of capacity are
/// skipped.  When an option has rows for several view years, only the rows
/// of the latest year are summed.
pub fn read_capacity_results(dir: impl AsRef<Path>) -> Result<Vec<CapacityResult>, Error> {
    let dir = dir.as_ref();
    tracing::debug!("Reading Opera results from {}.", dir.display());

    let units = read_latin1_csv::<UnitOfCapacityRow>(&dir.join(UNIT_OF_CAPACITY_FILE))?
        .into_iter()
        .map(|row| (row.option, row.unit))
        .collect::<HashMap<_, _>>();

    let mut results: Vec<CapacityResult> = Vec::new();
    let mut indices: HashMap<String, usize> = HashMap::new();
    for row in read_latin1_csv::<CapacityRow>(&dir.join(CAPACITY_FILE))? {
        let Some(unit) = units.get(&row.option) else {
            tracing::warn!("No unit of capacity for option {}, ignoring it.", row.option);
            continue;
        };

        if let Some(&index) = indices.get(&row.option) {
            let result = &mut results[index];
            if row.view_year > result.view_year {
                result.view_year = row.view_year;
                result.capacity = row.capacity;
            } else if row.view_year == result.view_year {
                result.capacity += row.capacity;
            }
            continue;
        }

        let (nr, name) = row.option.split_once(' ').unwrap_or((row.option.as_str(), ""));
        let result = CapacityResult {
            nr: nr.parse().ok(),
            name: name.to_string(),
            label: row.option.clone(),
            view_year: row.view_year,
            capacity: row.capacity,
            unit: unit.clone(),
        };
        indices.insert(row.option, results.len());
        results.push(result);
    }

    tracing::info!("Read {} capacity results from {}.", results.len(), dir.display());
    Ok(results)
}

fn read_latin1_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, Error> {
    let bytes = std::fs::read(path).map_err(|e| {
        Error::results_error(format!("Unable to read {}: {e}", path.display()))
    })?;
    // every Latin-1 byte is the code point of the same value
    let text = bytes.iter().map(|&b| char::from(b)).collect::<String>();

    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| Error::results_error(format!("Invalid {}: {e}", path.display())))
}

/// The outcome of merging capacity results into an energy system, by asset
/// name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeReport {
    pub updated: Vec<String>,
    /// Results that were matched but could not be applied.
    pub skipped: Vec<String>,
    /// Results without a matching asset.
    pub unmatched: Vec<String>,
}

/// Writes the capacities chosen by Opera to the power attributes of the
/// assets they were computed for, and marks the energy system as including
/// Opera results.
///
/// Results are matched to the records of the import by name, and applied to
/// every asset with that name.  Only capacities in GW are applied.  The range
/// constraints of an asset are removed when its record had both a non-zero
/// minimum and maximum, as Opera has settled on a value within them.
pub fn merge_capacities(
    es: &mut EnergySystem,
    assets: &[AssetRecord],
    results: &[CapacityResult],
) -> Result<MergeReport, Error> {
    es.mark_results_included();

    let mut report = MergeReport::default();
    for result in results {
        // names aren't unique in ESDL, every asset with the name gets the capacity
        let records = assets
            .iter()
            .filter(|a| a.name == result.name)
            .collect::<Vec<_>>();
        if records.is_empty() {
            tracing::warn!("No asset named {:?} for Opera option {}.", result.name, result.label);
            report.unmatched.push(result.name.clone());
            continue;
        }
        if result.unit != "GW" {
            tracing::info!(
                "Ignoring {} as its unit {} is not GW, which is incompatible with the power attribute.",
                result.name,
                result.unit
            );
            report.skipped.push(result.name.clone());
            continue;
        }

        let power = units::convert(result.capacity, &POWER_IN_GW, &POWER_IN_W)?;
        for record in records {
            let asset = es.asset_mut(&record.id)?;
            let Some(old_power) = asset.power() else {
                tracing::error!(
                    "Asset {} ({}) has no power attribute to write the capacity to.",
                    record.name,
                    record.id
                );
                report.skipped.push(result.name.clone());
                continue;
            };

            let old_power = units::convert(old_power, &POWER_IN_W, &POWER_IN_GW)?;
            match (record.power_min, record.power_max) {
                // a zero bound counts as no bound
                (Some(min), Some(max))
                    if min != 0.0 && max != 0.0 && !min.is_nan() && !max.is_nan() =>
                {
                    tracing::debug!(
                        "Capacity of {}: {} GW in range [{min:.2}-{max:.2}], was {old_power} GW.",
                        record.name,
                        result.capacity
                    );
                    asset.clear_constraints();
                }
                _ => tracing::debug!(
                    "Capacity of {}: {} GW, was {old_power} GW.",
                    record.name,
                    result.capacity
                ),
            }
            asset.set_power(power)?;
            report.updated.push(result.name.clone());
        }
    }

    tracing::info!(
        "Merged Opera results: {} updated, {} skipped and {} unmatched.",
        report.updated.len(),
        report.skipped.len(),
        report.unmatched.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_assets;
    use crate::test_utils::{EsdlBuilder, TestAsset};
    use crate::ErrorKind;
    use float_cmp::assert_approx_eq;

    fn write_results(dir: &Path, capacity: &[u8], units: &[u8]) -> Result<(), Error> {
        let write = |name: &str, content: &[u8]| {
            std::fs::write(dir.join(name), content).map_err(|e| Error::internal(e.to_string()))
        };
        write(CAPACITY_FILE, capacity)?;
        write(UNIT_OF_CAPACITY_FILE, units)
    }

    fn result(name: &str, capacity: f64, unit: &str) -> CapacityResult {
        CapacityResult {
            label: format!("1 {name}"),
            nr: Some(1),
            name: name.to_string(),
            view_year: 2030,
            capacity,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn test_read_capacity_results() -> Result<(), Error> {
        let dir = tempfile::tempdir().map_err(|e| Error::internal(e.to_string()))?;
        write_results(
            dir.path(),
            b"Regions,Option,Variant,Construction year,View year,Capacity\n\
              NL,12 Wind1,1,2030,2030,1.5\n\
              NL,12 Wind1,1,2030,2050,2.0\n\
              NL,12 Wind1,2,2040,2050,0.5\n\
              NL,14 Warmtenet Zuid\xe9,1,2030,2050,3.0\n\
              NL,15 Orphan,1,2030,2050,1.0\n",
            b"Option,UoCapacity\n12 Wind1,GW\n14 Warmtenet Zuid\xe9,PJ\n",
        )?;
        let results = read_capacity_results(dir.path())?;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].nr, Some(12));
        assert_eq!(results[0].name, "Wind1");
        assert_eq!(results[0].view_year, 2050);
        assert_approx_eq!(f64, results[0].capacity, 2.5);
        assert_eq!(results[0].unit, "GW");

        assert_eq!(results[1].label, "14 Warmtenet Zuidé");
        assert_eq!(results[1].name, "Warmtenet Zuidé");
        assert_eq!(results[1].unit, "PJ");

        Ok(())
    }

    #[test]
    fn test_unreadable_results() -> Result<(), Error> {
        let dir = tempfile::tempdir().map_err(|e| Error::internal(e.to_string()))?;
        assert!(read_capacity_results(dir.path())
            .is_err_and(|e| e.kind() == ErrorKind::ResultsError));

        write_results(
            dir.path(),
            b"Option,View year,Capacity\n12 Wind1,2050,lots\n",
            b"Option,UoCapacity\n12 Wind1,GW\n",
        )?;
        assert!(read_capacity_results(dir.path())
            .is_err_and(|e| e.kind() == ErrorKind::ResultsError));

        Ok(())
    }

    #[test]
    fn test_merge_capacities() -> Result<(), Error> {
        let mut es = EsdlBuilder::new()
            .description("Base")
            .version("1")
            .asset(TestAsset::new("WindPark", "wp", "Wind1").power(1.0E9).power_range(1.0, 4.0))
            .asset(TestAsset::new("PVPark", "pv", "Solar1").power(2.0E9).power_range(0.0, 3.0))
            .asset(
                TestAsset::new("WindTurbine", "wt", "Wind2").power(3.0E6).child(
                    r#"<constraint xsi:type="esdl:RangedConstraint" id="rc" attributeReference="efficiency">
                         <range xsi:type="esdl:Range" minValue="0.1" maxValue="0.5"/>
                       </constraint>"#,
                ),
            )
            .asset(TestAsset::new("WindTurbine", "wt3", "Wind3").power(4.0E6))
            .build()?;
        let assets = extract_assets(&es)?;

        let report = merge_capacities(
            &mut es,
            &assets,
            &[
                result("Wind1", 2.5, "GW"),
                result("Solar1", 1.0, "GW"),
                result("Wind2", 0.5, "GW"),
                result("Wind3", 1.0, "PJ"),
                result("Ghost", 1.0, "GW"),
            ],
        )?;
        assert_eq!(report.updated, vec!["Wind1", "Solar1", "Wind2"]);
        assert_eq!(report.skipped, vec!["Wind3"]);
        assert_eq!(report.unmatched, vec!["Ghost"]);

        // both bounds: the constraints are solved
        let wind = es.asset("wp")?;
        assert_approx_eq!(f64, wind.power().unwrap_or_default(), 2.5E9);
        assert!(wind.constraints().is_empty());

        // a lower bound of zero: the constraints stay
        let solar = es.asset("pv")?;
        assert_approx_eq!(f64, solar.power().unwrap_or_default(), 1.0E9);
        assert_eq!(solar.constraints().len(), 1);

        // no power range: the constraints stay
        let turbine = es.asset("wt")?;
        assert_approx_eq!(f64, turbine.power().unwrap_or_default(), 5.0E8);
        assert_eq!(turbine.constraints().len(), 1);

        // not in GW: untouched
        assert_eq!(es.asset("wt3")?.power(), Some(4.0E6));

        assert_eq!(es.description(), Some("Base\nIncluding Opera results"));
        assert_eq!(es.version(), Some("2.0"));

        Ok(())
    }

    #[test]
    fn test_merge_capacities_into_assets_sharing_a_name() -> Result<(), Error> {
        let mut es = EsdlBuilder::new()
            .asset(TestAsset::new("WindPark", "wp1", "Wind").power(1.0E9))
            .asset(TestAsset::new("WindPark", "wp2", "Wind").power(1.0E9))
            .build()?;
        let assets = extract_assets(&es)?;

        let report = merge_capacities(&mut es, &assets, &[result("Wind", 3.0, "GW")])?;
        assert_eq!(report.updated, vec!["Wind", "Wind"]);
        assert_approx_eq!(f64, es.asset("wp1")?.power().unwrap_or_default(), 3.0E9);
        assert_approx_eq!(f64, es.asset("wp2")?.power().unwrap_or_default(), 3.0E9);

        Ok(())
    }
}
