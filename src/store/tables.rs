// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Typed rows of the Opera tables the importer writes to.
//!
//! Rows that the importer clones from reference options keep all columns it
//! doesn't know about in an `extra` record, so a clone carries every column
//! of the reference row.

use super::{ColumnValue, OperaStore, Record};
use crate::Error;

/// Names of the Opera tables.
pub mod table {
    pub const CARRIERS: &str = "Energiedragers";
    pub const CARRIER_PRICES: &str = "EconomieNationaal(Energiedrager,Jaar,Scenario)";
    pub const ACTIVITIES: &str = "Activiteiten";
    pub const ACTIVITY_BASELINES: &str = "ActiviteitBaseline(activiteit,scenario,jaar)";
    pub const OPTIONS: &str = "Opties";
    pub const VARIANTS: &str = "Beschikbare varianten";
    pub const COSTS: &str = "Kosten(Optie,Variant,Jaar)";
    pub const ENERGY_USE: &str = "Energiegebruik(Optie,Energiedrager,Variant,Jaar)";
    pub const CAPACITY_RANGES: &str = "CatJaarScen(categorie,jaar,scenario)";
    pub const OPTION_ACTIVITIES: &str = "OptieActiviteit(Optie,Activiteit)";
    pub const FLOWS: &str = "OpgelegdeToegestaneFlows";
    pub const CARRIER_ALLOCATIONS: &str = "EnergieDragerAlloc(Optie,Energiedrager,Var,ConstrJaar,Jaar)";
    pub const TECHNICAL_PARAMETERS: &str = "TechnischeParameters(Optie,Jaar)";
    pub const STORAGE_PARAMETERS: &str = "OpslagOpties(Optie,ConstrJr)";
}

fn take_text(record: &mut Record, column: &str) -> Option<String> {
    match record.remove(column)? {
        ColumnValue::Text(v) => Some(v),
        ColumnValue::Null => None,
        other => Some(other.to_string()),
    }
}

fn take_i64(record: &mut Record, column: &str) -> Option<i64> {
    record.remove(column).and_then(|v| v.as_i64())
}

fn take_f64(record: &mut Record, column: &str) -> Option<f64> {
    record.remove(column).and_then(|v| v.as_f64())
}

fn take_bool(record: &mut Record, column: &str) -> Option<bool> {
    record.remove(column).and_then(|v| v.as_bool())
}

fn set_some(record: &mut Record, column: &str, value: Option<impl Into<ColumnValue>>) {
    if let Some(value) = value {
        record.set(column, value);
    }
}

fn append(mut record: Record, extra: &Record) -> Record {
    for (column, value) in extra.columns() {
        if record.get(column).is_none() {
            record.set(column, value.clone());
        }
    }
    record
}

/// A row of `Energiedragers`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CarrierRow {
    pub name: String,
    pub unit: String,
    pub demand_is_supply: bool,
    pub generic: bool,
    pub base_carrier: bool,
    pub electricity: bool,
    pub heat: bool,
}

impl CarrierRow {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("Energiedrager", self.name.as_str())
            .with("Eenheid", self.unit.as_str())
            .with("VraagIsAanbod", self.demand_is_supply)
            .with("Generiek", self.generic)
            .with("Basisenergiedrager", self.base_carrier)
            .with("Elektriciteit", self.electricity)
            .with("Warmte", self.heat)
    }
}

/// A national carrier price for a year and scenario.
#[derive(Clone, Debug, PartialEq)]
pub struct CarrierPriceRow {
    pub carrier: String,
    pub year: i64,
    pub scenario: String,
    pub price: f64,
}

impl CarrierPriceRow {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("Energiedrager", self.carrier.as_str())
            .with("Jaar", self.year)
            .with("Scenario", self.scenario.as_str())
            .with("Nationale prijs", self.price)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActivityRow {
    pub name: String,
    pub unit: String,
}

impl ActivityRow {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("Activiteit", self.name.as_str())
            .with("Eenheid", self.unit.as_str())
    }
}

/// The baseline volume of an activity, in PJ.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityBaselineRow {
    pub activity: String,
    pub scenario: String,
    pub year: i64,
    pub value: f64,
}

impl ActivityBaselineRow {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("Activiteit", self.activity.as_str())
            .with("Scenario", self.scenario.as_str())
            .with("Jaar", self.year)
            .with("Waarde", self.value)
    }
}

/// A row of `Opties`.  Fields that are `None` are left out of the row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionRow {
    /// Assigned by the store on insert.
    pub nr: Option<i64>,
    pub name: String,
    pub sector: Option<String>,
    pub unit_of_capacity: Option<String>,
    pub activity_unit: Option<String>,
    pub cap_to_act: Option<f64>,
    pub unlimited_option: Option<bool>,
    pub unlimited_capacity: Option<bool>,
    pub target_substance: Option<String>,
    pub charge_option: Option<bool>,
    pub discharge_option: Option<bool>,
    pub stock_option: Option<bool>,
    pub lifetime: Option<i64>,
    pub connector_point: Option<bool>,
    pub extra: Record,
}

impl OptionRow {
    /// Template for options without a reference option.
    pub fn placeholder() -> Self {
        Self {
            target_substance: Some("CO2".to_string()),
            ..Default::default()
        }
    }

    pub fn from_record(mut record: Record) -> Self {
        Self {
            nr: take_i64(&mut record, "Nr"),
            name: take_text(&mut record, "Naam optie").unwrap_or_default(),
            sector: take_text(&mut record, "Sector"),
            unit_of_capacity: take_text(&mut record, "Unit of Capacity"),
            activity_unit: take_text(&mut record, "Eenheid activiteit"),
            cap_to_act: take_f64(&mut record, "Cap2Act"),
            unlimited_option: take_bool(&mut record, "Optie onbeperkt"),
            unlimited_capacity: take_bool(&mut record, "Capaciteit onbeperkt"),
            target_substance: take_text(&mut record, "Doelstof"),
            charge_option: take_bool(&mut record, "LaadOpslagOptie"),
            discharge_option: take_bool(&mut record, "OntlaadOpslagOptie"),
            stock_option: take_bool(&mut record, "VoorraadOpslagOptie"),
            lifetime: take_i64(&mut record, "Levensduur"),
            connector_point: take_bool(&mut record, "ConnectorPointOption"),
            extra: record,
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        set_some(&mut record, "Nr", self.nr);
        record.set("Naam optie", self.name.as_str());
        set_some(&mut record, "Unit of Capacity", self.unit_of_capacity.as_deref());
        set_some(&mut record, "Eenheid activiteit", self.activity_unit.as_deref());
        set_some(&mut record, "Cap2Act", self.cap_to_act);
        set_some(&mut record, "Sector", self.sector.as_deref());
        set_some(&mut record, "Optie onbeperkt", self.unlimited_option);
        set_some(&mut record, "Capaciteit onbeperkt", self.unlimited_capacity);
        set_some(&mut record, "LaadOpslagOptie", self.charge_option);
        set_some(&mut record, "OntlaadOpslagOptie", self.discharge_option);
        set_some(&mut record, "VoorraadOpslagOptie", self.stock_option);
        set_some(&mut record, "ConnectorPointOption", self.connector_point);
        set_some(&mut record, "Levensduur", self.lifetime);
        set_some(&mut record, "Doelstof", self.target_substance.as_deref());
        append(record, &self.extra)
    }
}

/// A row of `Beschikbare varianten`.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantRow {
    pub nr: i64,
    pub variant: i64,
    pub available: bool,
    pub extra: Record,
}

impl VariantRow {
    pub fn new(nr: i64) -> Self {
        Self {
            nr,
            variant: 1,
            available: true,
            extra: Record::new(),
        }
    }

    pub fn from_record(mut record: Record) -> Self {
        Self {
            nr: take_i64(&mut record, "Nr").unwrap_or_default(),
            variant: take_i64(&mut record, "Variant").unwrap_or(1),
            available: take_bool(&mut record, "Beschikbaar").unwrap_or(true),
            extra: record,
        }
    }

    pub fn to_record(&self) -> Record {
        let record = Record::new()
            .with("Nr", self.nr)
            .with("Variant", self.variant)
            .with("Beschikbaar", self.available);
        append(record, &self.extra)
    }
}

/// The costs of an option variant in a year.
#[derive(Clone, Debug, PartialEq)]
pub struct CostRow {
    pub nr: i64,
    pub variant: i64,
    pub year: i64,
    /// M€/GW
    pub investment: Option<f64>,
    /// M€/GW/yr
    pub fixed_operational: Option<f64>,
    /// M€/PJ
    pub variable: Option<f64>,
    pub extra: Record,
}

impl CostRow {
    pub fn new(nr: i64, year: i64) -> Self {
        Self {
            nr,
            variant: 1,
            year,
            investment: None,
            fixed_operational: None,
            variable: None,
            extra: Record::new(),
        }
    }

    pub fn from_record(mut record: Record) -> Self {
        Self {
            nr: take_i64(&mut record, "Nr").unwrap_or_default(),
            variant: take_i64(&mut record, "Variant").unwrap_or(1),
            year: take_i64(&mut record, "Jaar").unwrap_or_default(),
            investment: take_f64(&mut record, "Investeringskosten"),
            fixed_operational: take_f64(&mut record, "Overig operationeel kosten/baten"),
            variable: take_f64(&mut record, "Variabele kosten"),
            extra: record,
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new()
            .with("Nr", self.nr)
            .with("Variant", self.variant)
            .with("Jaar", self.year);
        set_some(&mut record, "Investeringskosten", self.investment);
        set_some(&mut record, "Overig operationeel kosten/baten", self.fixed_operational);
        set_some(&mut record, "Variabele kosten", self.variable);
        append(record, &self.extra)
    }
}

/// The carrier input or output of an option.
///
/// The effect is stored as text, `"1"` for inputs and the negated efficiency
/// for outputs.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyUseRow {
    pub nr: i64,
    pub carrier: String,
    pub variant: i64,
    pub year: i64,
    pub effect: String,
}

impl EnergyUseRow {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("Nr", self.nr)
            .with("Energiedrager", self.carrier.as_str())
            .with("Variant", self.variant)
            .with("Jaar", self.year)
            .with("Effect", self.effect.as_str())
    }
}

/// The capacity and activity range of an option category in a year and
/// scenario.
///
/// A `max_total_capacity` of `None` is stored as NULL, meaning unbounded.
#[derive(Clone, Debug, PartialEq)]
pub struct CapacityRangeRow {
    pub category: String,
    pub year: i64,
    pub scenario: String,
    pub max_total_capacity: Option<f64>,
    pub min_total_capacity: f64,
    pub min_activity_year: f64,
    pub max_activity_year: f64,
    pub activity_at_least_baseline: Option<bool>,
    pub extra: Record,
}

impl CapacityRangeRow {
    /// A range without limits on counts and costs.
    pub fn new(category: impl Into<String>, year: i64, scenario: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            year,
            scenario: scenario.into(),
            max_total_capacity: Some(0.0),
            min_total_capacity: 0.0,
            min_activity_year: 0.0,
            max_activity_year: 0.0,
            activity_at_least_baseline: None,
            extra: Record::new()
                .with("Max aantal", 0.0)
                .with("Max kosten", 0.0)
                .with("Min aantal", 0.0)
                .with("Min kosten", 0.0),
        }
    }

    pub fn from_record(mut record: Record) -> Self {
        Self {
            category: take_text(&mut record, "Categorie").unwrap_or_default(),
            year: take_i64(&mut record, "Jaar").unwrap_or_default(),
            scenario: take_text(&mut record, "Scenario").unwrap_or_default(),
            max_total_capacity: take_f64(&mut record, "Max totale capaciteit"),
            min_total_capacity: take_f64(&mut record, "Min totale capaciteit").unwrap_or_default(),
            min_activity_year: take_f64(&mut record, "Min Activiteit Jaar").unwrap_or_default(),
            max_activity_year: take_f64(&mut record, "Max Activiteit Jaar").unwrap_or_default(),
            activity_at_least_baseline: take_bool(&mut record, "ActiviteitMinimaalGelijkBaseline"),
            extra: record,
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new()
            .with("Categorie", self.category.as_str())
            .with("Jaar", self.year)
            .with("Scenario", self.scenario.as_str());
        record = append(record, &self.extra);
        record.set("Max totale capaciteit", self.max_total_capacity);
        record.set("Min totale capaciteit", self.min_total_capacity);
        record.set("Min Activiteit Jaar", self.min_activity_year);
        record.set("Max Activiteit Jaar", self.max_activity_year);
        set_some(
            &mut record,
            "ActiviteitMinimaalGelijkBaseline",
            self.activity_at_least_baseline,
        );
        record
    }
}

/// Links a consumer option to its activity.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionActivityRow {
    pub nr: i64,
    pub activity: String,
}

impl OptionActivityRow {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("Optie", self.nr)
            .with("Activiteit", self.activity.as_str())
            .with("Match", true)
    }
}

/// An imposed flow of a carrier from one option to another.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowRow {
    pub carrier: Option<String>,
    pub from: i64,
    pub to: i64,
    pub remark: String,
}

impl FlowRow {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("Energiedrager", self.carrier.as_deref())
            .with("OptieVan", self.from)
            .with("OptieNaar", self.to)
            .with("Match", true)
            .with("Opmerking", self.remark.as_str())
    }
}

/// The carrier a storage option takes in (`effect` 1) or gives out
/// (`effect` -1).
#[derive(Clone, Debug, PartialEq)]
pub struct CarrierAllocationRow {
    pub nr: i64,
    pub carrier: Option<String>,
    pub variant: i64,
    pub construction_year: i64,
    pub year: i64,
    pub effect: f64,
}

impl CarrierAllocationRow {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("Nr", self.nr)
            .with("Energiedrager", self.carrier.as_deref())
            .with("Variant", self.variant)
            .with("ConstructieJaar", self.construction_year)
            .with("Jaar", self.year)
            .with("Effect", self.effect)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TechnicalParametersRow {
    pub nr: i64,
    pub year: i64,
    pub availability_factor: f64,
    pub efficiency: f64,
}

impl TechnicalParametersRow {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("Nr", self.nr)
            .with("Jaar", self.year)
            .with("AvailabilityFactor", self.availability_factor)
            .with("Rendement", self.efficiency)
    }
}

/// Storage parameters of a storage option.  `None` values are stored as
/// NULL.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageParametersRow {
    pub nr: i64,
    pub construction_year: i64,
    /// PJ per hour
    pub losses_per_hour: Option<f64>,
    /// Hours
    pub slow_load_time: Option<f64>,
    pub fast_load_time: Option<f64>,
}

impl StorageParametersRow {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("Nr", self.nr)
            .with("ConstructieJaar", self.construction_year)
            .with("VerliesPerUur", self.losses_per_hour)
            .with("SlowLoadTime", self.slow_load_time)
            .with("FastLoadTime", self.fast_load_time)
    }
}

/// Typed access to the Opera tables, for every [`OperaStore`].
pub trait OperaTables: OperaStore {
    fn carrier_exists(&self, name: &str) -> Result<bool, Error> {
        self.exists(table::CARRIERS, &[("Energiedrager", name.into())])
    }

    fn insert_carrier(&mut self, row: &CarrierRow) -> Result<(), Error> {
        self.insert(table::CARRIERS, &row.to_record()).map(|_| ())
    }

    fn insert_carrier_price(&mut self, row: &CarrierPriceRow) -> Result<(), Error> {
        self.insert(table::CARRIER_PRICES, &row.to_record()).map(|_| ())
    }

    fn activity_exists(&self, name: &str) -> Result<bool, Error> {
        self.exists(table::ACTIVITIES, &[("Activiteit", name.into())])
    }

    fn insert_activity(&mut self, row: &ActivityRow) -> Result<(), Error> {
        self.insert(table::ACTIVITIES, &row.to_record()).map(|_| ())
    }

    fn activity_baseline_exists(
        &self,
        activity: &str,
        scenario: &str,
        year: i64,
    ) -> Result<bool, Error> {
        self.exists(
            table::ACTIVITY_BASELINES,
            &[
                ("Activiteit", activity.into()),
                ("Scenario", scenario.into()),
                ("Jaar", year.into()),
            ],
        )
    }

    fn insert_activity_baseline(&mut self, row: &ActivityBaselineRow) -> Result<(), Error> {
        self.insert(table::ACTIVITY_BASELINES, &row.to_record())
            .map(|_| ())
    }

    /// Returns the option with the given name.
    fn find_option(&self, name: &str) -> Result<Option<OptionRow>, Error> {
        Ok(self
            .select(table::OPTIONS, &[("Naam optie", name.into())])?
            .into_iter()
            .next()
            .map(OptionRow::from_record))
    }

    /// Inserts an option without a number and returns the number the store
    /// assigned to it.
    fn insert_option(&mut self, row: &OptionRow) -> Result<i64, Error> {
        let mut record = row.to_record();
        record.remove("Nr");
        self.insert(table::OPTIONS, &record)
    }

    fn find_variants(&self, nr: i64) -> Result<Vec<VariantRow>, Error> {
        Ok(self
            .select(table::VARIANTS, &[("Nr", nr.into())])?
            .into_iter()
            .map(VariantRow::from_record)
            .collect())
    }

    fn variant_exists(&self, nr: i64) -> Result<bool, Error> {
        self.exists(table::VARIANTS, &[("Nr", nr.into())])
    }

    fn insert_variant(&mut self, row: &VariantRow) -> Result<(), Error> {
        self.insert(table::VARIANTS, &row.to_record()).map(|_| ())
    }

    fn find_costs(&self, nr: i64, year: i64) -> Result<Vec<CostRow>, Error> {
        Ok(self
            .select(table::COSTS, &[("Nr", nr.into()), ("Jaar", year.into())])?
            .into_iter()
            .map(CostRow::from_record)
            .collect())
    }

    fn cost_exists(&self, nr: i64, year: i64) -> Result<bool, Error> {
        self.exists(table::COSTS, &[("Nr", nr.into()), ("Jaar", year.into())])
    }

    fn insert_cost(&mut self, row: &CostRow) -> Result<(), Error> {
        self.insert(table::COSTS, &row.to_record()).map(|_| ())
    }

    fn energy_use_exists(&self, nr: i64, year: i64, carrier: &str) -> Result<bool, Error> {
        self.exists(
            table::ENERGY_USE,
            &[
                ("Nr", nr.into()),
                ("Jaar", year.into()),
                ("Energiedrager", carrier.into()),
            ],
        )
    }

    fn insert_energy_use(&mut self, row: &EnergyUseRow) -> Result<(), Error> {
        self.insert(table::ENERGY_USE, &row.to_record()).map(|_| ())
    }

    fn find_capacity_ranges(
        &self,
        category: &str,
        year: i64,
        scenario: &str,
    ) -> Result<Vec<CapacityRangeRow>, Error> {
        Ok(self
            .select(
                table::CAPACITY_RANGES,
                &[
                    ("Categorie", category.into()),
                    ("Jaar", year.into()),
                    ("Scenario", scenario.into()),
                ],
            )?
            .into_iter()
            .map(CapacityRangeRow::from_record)
            .collect())
    }

    fn capacity_range_exists(
        &self,
        category: &str,
        year: i64,
        scenario: &str,
    ) -> Result<bool, Error> {
        Ok(!self.find_capacity_ranges(category, year, scenario)?.is_empty())
    }

    fn insert_capacity_range(&mut self, row: &CapacityRangeRow) -> Result<(), Error> {
        self.insert(table::CAPACITY_RANGES, &row.to_record())
            .map(|_| ())
    }

    fn option_activity_exists(&self, nr: i64, activity: &str) -> Result<bool, Error> {
        self.exists(
            table::OPTION_ACTIVITIES,
            &[("Optie", nr.into()), ("Activiteit", activity.into())],
        )
    }

    fn insert_option_activity(&mut self, row: &OptionActivityRow) -> Result<(), Error> {
        self.insert(table::OPTION_ACTIVITIES, &row.to_record())
            .map(|_| ())
    }

    fn flow_exists(&self, from: i64) -> Result<bool, Error> {
        self.exists(table::FLOWS, &[("OptieVan", from.into())])
    }

    fn insert_flow(&mut self, row: &FlowRow) -> Result<(), Error> {
        self.insert(table::FLOWS, &row.to_record()).map(|_| ())
    }

    fn carrier_allocation_exists(&self, nr: i64) -> Result<bool, Error> {
        self.exists(table::CARRIER_ALLOCATIONS, &[("Nr", nr.into())])
    }

    fn insert_carrier_allocation(&mut self, row: &CarrierAllocationRow) -> Result<(), Error> {
        self.insert(table::CARRIER_ALLOCATIONS, &row.to_record())
            .map(|_| ())
    }

    fn technical_parameters_exist(&self, nr: i64) -> Result<bool, Error> {
        self.exists(table::TECHNICAL_PARAMETERS, &[("Nr", nr.into())])
    }

    fn insert_technical_parameters(&mut self, row: &TechnicalParametersRow) -> Result<(), Error> {
        self.insert(table::TECHNICAL_PARAMETERS, &row.to_record())
            .map(|_| ())
    }

    fn storage_parameters_exist(&self, nr: i64) -> Result<bool, Error> {
        self.exists(table::STORAGE_PARAMETERS, &[("Nr", nr.into())])
    }

    fn insert_storage_parameters(&mut self, row: &StorageParametersRow) -> Result<(), Error> {
        self.insert(table::STORAGE_PARAMETERS, &row.to_record())
            .map(|_| ())
    }
}

impl<T: OperaStore + ?Sized> OperaTables for T {}
