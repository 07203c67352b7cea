// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Serializing an [`EnergySystem`] back into an ESDL document.

use std::collections::HashMap;

use crate::Error;

use super::xml::{self, Element};
use super::{Asset, EnergySystem};

impl EnergySystem {
    /// Writes the energy system as an ESDL document.
    ///
    /// The document is the one the energy system was loaded from, with the
    /// header and the modified assets updated. Everything else is written as
    /// it was read.
    pub fn to_esdl_string(&self) -> Result<String, Error> {
        let mut document = self.document.clone();

        if self.header_modified {
            if let Some(description) = &self.description {
                document.set_attr("description", description.as_str());
            }
            if let Some(version) = &self.version {
                document.set_attr("version", version.as_str());
            }
        }

        let modified: HashMap<&str, &Asset> = self
            .assets()
            .filter(|a| a.power_modified || a.constraints_cleared)
            .map(|a| (a.id.as_str(), a))
            .collect();
        if !modified.is_empty() {
            update_assets(&mut document, &modified);
        }

        xml::write_document(&document)
    }
}

fn update_assets(element: &mut Element, modified: &HashMap<&str, &Asset>) {
    if element.name == "asset" {
        if let Some(asset) = element.attr("id").and_then(|id| modified.get(id)) {
            if asset.power_modified {
                if let Some(power) = asset.power {
                    element.set_attr("power", format!("{power:?}"));
                }
            }
            if asset.constraints_cleared {
                element.remove_children("constraint");
            }
        }
    }
    for child in &mut element.children {
        update_assets(child, modified);
    }
}
