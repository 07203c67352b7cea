// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Adding energy carriers to Opera.

use crate::extractor::CarrierRecord;
use crate::store::{CarrierPriceRow, CarrierRow, OperaStore, OperaTables};
use crate::Error;

use super::{opera_carrier_name, OperaImporter};

/// The flags and the national price of an Opera carrier that has no price of
/// its own, guessed from its name.
struct CarrierDefaults {
    demand_is_supply: bool,
    generic: bool,
    base_carrier: bool,
    electricity: bool,
    heat: bool,
    price: f64,
}

impl CarrierDefaults {
    const NONE: Self = Self {
        demand_is_supply: false,
        generic: false,
        base_carrier: false,
        electricity: false,
        heat: false,
        price: 0.0,
    };

    fn for_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        let starts_with_any = |prefixes: &[&str]| prefixes.iter().any(|p| name.starts_with(p));

        if starts_with_any(&["ele"]) {
            // €/MWh
            Some(Self {
                demand_is_supply: true,
                generic: true,
                base_carrier: true,
                electricity: true,
                price: 10.11,
                ..Self::NONE
            })
        } else if starts_with_any(&["hydrogen", "waterstof", "h2"]) {
            // €/GJ
            Some(Self {
                demand_is_supply: true,
                generic: true,
                price: 8.34,
                ..Self::NONE
            })
        } else if starts_with_any(&["aardgas", "natural", "fossil gas", "gas"]) {
            Some(Self {
                base_carrier: true,
                price: 6.8,
                ..Self::NONE
            })
        } else if starts_with_any(&["heat", "warmte"]) {
            Some(Self {
                demand_is_supply: true,
                generic: true,
                heat: true,
                ..Self::NONE
            })
        } else {
            None
        }
    }
}

impl OperaImporter {
    /// Adds the carriers that are not in `Energiedragers` yet, together with
    /// their national price.  Returns the number of carriers added.
    pub(super) fn add_carriers<S>(
        &self,
        carriers: &[CarrierRecord],
        store: &mut S,
    ) -> Result<usize, Error>
    where
        S: OperaStore + ?Sized,
    {
        let mut added = 0;
        for carrier in carriers {
            let name = opera_carrier_name(&carrier.name);
            if store.carrier_exists(&name)? {
                tracing::info!("Energy carrier {name} is already in Opera.");
                continue;
            }

            let defaults = match carrier.cost.filter(|c| c.is_finite()) {
                Some(price) => {
                    tracing::info!(
                        "Using ESDL-defined energy carrier cost of {price} {} for {name}.",
                        carrier.unit.as_deref().unwrap_or("(no unit)")
                    );
                    CarrierDefaults {
                        price,
                        ..CarrierDefaults::NONE
                    }
                }
                None => CarrierDefaults::for_name(&carrier.name).unwrap_or_else(|| {
                    tracing::warn!(
                        "No defaults for energy carrier {name}, adding it without a price."
                    );
                    CarrierDefaults::NONE
                }),
            };

            tracing::debug!("Adding energy carrier {name}.");
            store.insert_carrier(&CarrierRow {
                name: name.clone(),
                unit: "PJ".to_string(),
                demand_is_supply: defaults.demand_is_supply,
                generic: defaults.generic,
                base_carrier: defaults.base_carrier,
                electricity: defaults.electricity,
                heat: defaults.heat,
            })?;
            added += 1;

            if defaults.price != 0.0 {
                store.insert_carrier_price(&CarrierPriceRow {
                    carrier: name,
                    year: self.config.year,
                    scenario: self.config.scenario.clone(),
                    price: defaults.price,
                })?;
            } else {
                tracing::warn!("Energy carrier {name} has no national price.");
            }
        }
        Ok(added)
    }
}
