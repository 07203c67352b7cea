// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Adding the activities of consumer assets to Opera.

use crate::asset_category::AssetCategory;
use crate::extractor::AssetRecord;
use crate::store::{ActivityBaselineRow, ActivityRow, OperaStore, OperaTables};
use crate::Error;

use super::{activity_name, OperaImporter};

impl OperaImporter {
    /// Adds an activity and its baseline volume for every consumer.  Returns
    /// the number of activities added.
    pub(super) fn add_activities<S>(
        &self,
        assets: &[AssetRecord],
        store: &mut S,
    ) -> Result<usize, Error>
    where
        S: OperaStore + ?Sized,
    {
        let mut added = 0;
        for asset in assets.iter().filter(|a| a.category == AssetCategory::Consumer) {
            let activity = activity_name(&asset.name);
            if store.activity_exists(&activity)? {
                tracing::info!("Activity {activity} is already in Opera.");
            } else {
                tracing::debug!("Adding activity {activity}.");
                store.insert_activity(&ActivityRow {
                    name: activity.clone(),
                    unit: "PJ".to_string(),
                })?;
                added += 1;
            }

            let (scenario, year) = (&self.config.scenario, self.config.year);
            if store.activity_baseline_exists(&activity, scenario, year)? {
                tracing::info!(
                    "Activity {activity} already has a baseline for {scenario} in {year}."
                );
            } else {
                let demand = asset.demand().unwrap_or_else(|| {
                    tracing::warn!("No demand profile for {}, using a baseline of 0.", asset.name);
                    0.0
                });
                store.insert_activity_baseline(&ActivityBaselineRow {
                    activity,
                    scenario: scenario.clone(),
                    year,
                    value: demand,
                })?;
            }
        }
        Ok(added)
    }
}
