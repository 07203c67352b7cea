// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the configuration options for the `OperaImporter`.

/// Configuration options for the `OperaImporter`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportConfig {
    /// The year that costs, baselines and capacity ranges are recorded for.
    pub year: i64,

    /// The Opera scenario that baselines and capacity ranges belong to.
    pub scenario: String,

    /// The sector that newly created options are filed under.  It should be a
    /// sector that is otherwise unused in the Opera database.
    pub default_sector: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            year: 2030,
            scenario: String::from("MMvIB"),
            default_sector: String::from("Energie"),
        }
    }
}
