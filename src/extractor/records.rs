// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The flat, unit-normalized records extracted from an energy system.

use chrono::{NaiveDate, NaiveTime};

use crate::asset_category::{AssetCategory, EsdlClass};

/// Storage attributes of an asset, in Opera units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StorageRecord {
    /// Capacity in PJ.
    pub capacity: f64,
    pub charge_efficiency: Option<f64>,
    pub discharge_efficiency: Option<f64>,
    /// Load and unload times in hours.  `None` when the corresponding rate is
    /// zero.
    pub slow_load_time: Option<f64>,
    pub fast_load_time: Option<f64>,
    pub slow_unload_time: Option<f64>,
    pub fast_unload_time: Option<f64>,
    /// Self-discharge losses per hour, in PJ.
    pub losses_per_hour: f64,
}

/// One asset of the energy system, with all values in Opera units.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetRecord {
    pub category: AssetCategory,
    pub id: String,
    pub esdl_type: EsdlClass,
    pub name: String,

    /// The range of the power constraint in GW, or of the capacity
    /// constraint in PJ when the asset has one.
    pub power_min: Option<f64>,
    pub power_max: Option<f64>,
    /// Nameplate power in GW.
    pub power: Option<f64>,
    pub efficiency: f64,

    /// Investment costs in M€/GW.
    pub investment_cost: Option<f64>,
    /// Fixed operational and maintenance costs in M€/GW/yr.
    pub fixed_om_cost: Option<f64>,
    /// Variable operational and maintenance costs in M€/PJ.
    pub variable_om_cost: Option<f64>,
    /// Marginal costs in €/MWh.
    pub marginal_cost: Option<f64>,

    /// Carrier names of the in-ports and out-ports.
    pub carrier_in: Vec<String>,
    pub carrier_out: Vec<String>,
    /// The first single value profile of every in-port and out-port, in PJ.
    pub profiles_in: Vec<f64>,
    pub profiles_out: Vec<f64>,

    pub storage: Option<StorageRecord>,

    /// The name of the Opera option this asset is modelled after.
    pub opera_equivalent: Option<&'static str>,
}

impl AssetRecord {
    /// Returns the in-carriers as a comma separated list.
    pub fn carrier_in_joined(&self) -> String {
        self.carrier_in.join(", ")
    }

    /// Returns the out-carriers as a comma separated list.
    pub fn carrier_out_joined(&self) -> String {
        self.carrier_out.join(", ")
    }

    /// Returns the sum of the in-port profiles in PJ, if there are any.
    pub fn demand(&self) -> Option<f64> {
        if self.profiles_in.is_empty() {
            None
        } else {
            Some(self.profiles_in.iter().sum())
        }
    }
}

/// A carrier of the energy system, with its price.
#[derive(Clone, Debug, PartialEq)]
pub struct CarrierRecord {
    pub name: String,
    pub id: String,
    /// The price, in €/MWh for electricity and €/GJ otherwise.  Prices
    /// without a unit are taken as they are.
    pub cost: Option<f64>,
    /// Description of the unit of `cost`, when it was converted.
    pub unit: Option<String>,
}

/// A demand KPI, in PJ.
#[derive(Clone, Debug, PartialEq)]
pub struct KpiRecord {
    pub name: String,
    pub id: Option<String>,
    pub demand: f64,
    pub unit: String,
    /// The description of the KPI's unit, which names the carrier.
    pub carrier: String,
}

/// One hour of a price time series.
#[derive(Clone, Debug, PartialEq)]
pub struct HourlyPrice {
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Hours since the start of the series, starting at 1.
    pub hour: u32,
    pub price: f64,
    pub unit: Option<String>,
}
