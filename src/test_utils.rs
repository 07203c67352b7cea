// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains features
//! that are shared by the tests of all modules.
//!
//! - the `EsdlBuilder` and `TestAsset` types, which can declaratively build
//!   ESDL documents for use in tests.
//! - `opera_database`, which creates an empty Opera database in a temporary
//!   directory.

use std::path::PathBuf;

use crate::esdl::EnergySystem;
use crate::Error;

/// Unit of a profile or range in PJ.
pub(crate) const PJ: &str = r#"<profileQuantityAndUnit xsi:type="esdl:QuantityAndUnitType" physicalQuantity="ENERGY" multiplier="PETA" unit="JOULE"/>"#;

/// Unit of a profile or range in GW.
pub(crate) const GW: &str = r#"<profileQuantityAndUnit xsi:type="esdl:QuantityAndUnitType" physicalQuantity="POWER" multiplier="GIGA" unit="WATT"/>"#;

struct TestPort {
    in_port: bool,
    id: String,
    carrier: Option<String>,
    connected_to: Vec<String>,
    profiles: Vec<String>,
}

impl TestPort {
    fn to_esdl(&self) -> String {
        let mut xml = format!(
            r#"<port xsi:type="esdl:{}" id="{}""#,
            if self.in_port { "InPort" } else { "OutPort" },
            self.id
        );
        if let Some(carrier) = &self.carrier {
            xml.push_str(&format!(r#" carrier="{carrier}""#));
        }
        if !self.connected_to.is_empty() {
            xml.push_str(&format!(r#" connectedTo="{}""#, self.connected_to.join(" ")));
        }
        if self.profiles.is_empty() {
            xml.push_str("/>");
        } else {
            xml.push('>');
            xml.push_str(&self.profiles.concat());
            xml.push_str("</port>");
        }
        xml
    }
}

/// An asset added to the `EsdlBuilder`.
pub(crate) struct TestAsset {
    class: String,
    id: String,
    attributes: Vec<(String, String)>,
    children: Vec<String>,
    ports: Vec<TestPort>,
    costs: Vec<String>,
}

impl TestAsset {
    /// Creates an asset of the given ESDL class.
    pub(crate) fn new(class: &str, id: &str, name: &str) -> Self {
        Self {
            class: class.to_string(),
            id: id.to_string(),
            attributes: vec![("name".to_string(), name.to_string())],
            children: Vec::new(),
            ports: Vec::new(),
            costs: Vec::new(),
        }
    }

    pub(crate) fn attr(mut self, key: &str, value: &str) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds a child element, given as XML.
    pub(crate) fn child(mut self, xml: &str) -> Self {
        self.children.push(xml.to_string());
        self
    }

    /// Sets the power attribute, in W.
    pub(crate) fn power(self, power: f64) -> Self {
        let power = format!("{power:?}");
        self.attr("power", &power)
    }

    /// Adds a ranged power constraint in GW.
    pub(crate) fn power_range(self, min: f64, max: f64) -> Self {
        let constraint = format!(
            r#"<constraint xsi:type="esdl:RangedConstraint" id="{}_power" attributeReference="power">
                 <range xsi:type="esdl:Range" minValue="{min:?}" maxValue="{max:?}">{GW}</range>
               </constraint>"#,
            self.id
        );
        self.child(&constraint)
    }

    pub(crate) fn in_port(self, id: &str, carrier: Option<&str>, connected_to: &[&str]) -> Self {
        self.port(true, id, carrier, connected_to)
    }

    pub(crate) fn out_port(self, id: &str, carrier: Option<&str>, connected_to: &[&str]) -> Self {
        self.port(false, id, carrier, connected_to)
    }

    fn port(mut self, in_port: bool, id: &str, carrier: Option<&str>, connected_to: &[&str]) -> Self {
        self.ports.push(TestPort {
            in_port,
            id: id.to_string(),
            carrier: carrier.map(str::to_string),
            connected_to: connected_to.iter().map(|c| c.to_string()).collect(),
            profiles: Vec::new(),
        });
        self
    }

    /// Adds a single value profile with the given unit to the last port.
    pub(crate) fn profile_value(self, value: f64, unit: &str) -> Self {
        let profile = format!(
            r#"<profile xsi:type="esdl:SingleValue" id="{}_{}" value="{value:?}">{unit}</profile>"#,
            self.ports.last().map(|p| p.id.as_str()).unwrap_or_default(),
            self.ports.last().map_or(0, |p| p.profiles.len()),
        );
        self.profile_xml(&profile)
    }

    /// Adds a profile, given as XML, to the last port.
    pub(crate) fn profile_xml(mut self, xml: &str) -> Self {
        if let Some(port) = self.ports.last_mut() {
            port.profiles.push(xml.to_string());
        }
        self
    }

    /// Adds a cost with an inline unit, given as the attributes of a
    /// `QuantityAndUnitType`.
    pub(crate) fn cost(self, kind: &str, value: f64, unit_attributes: &str) -> Self {
        let unit = format!(
            r#"<profileQuantityAndUnit xsi:type="esdl:QuantityAndUnitType" {unit_attributes}/>"#
        );
        self.cost_with_unit(kind, value, &unit)
    }

    /// Adds a cost with a reference to a declared unit.
    pub(crate) fn cost_reference(self, kind: &str, value: f64, reference: &str) -> Self {
        let unit = format!(
            r#"<profileQuantityAndUnit xsi:type="esdl:QuantityAndUnitReference" reference="{reference}"/>"#
        );
        self.cost_with_unit(kind, value, &unit)
    }

    fn cost_with_unit(mut self, kind: &str, value: f64, unit: &str) -> Self {
        self.costs.push(format!(
            r#"<{kind} xsi:type="esdl:SingleValue" id="{}_{kind}" value="{value:?}">{unit}</{kind}>"#,
            self.id
        ));
        self
    }

    fn to_esdl(&self) -> String {
        let mut xml = format!(r#"<asset xsi:type="esdl:{}" id="{}""#, self.class, self.id);
        for (key, value) in &self.attributes {
            xml.push_str(&format!(r#" {key}="{value}""#));
        }
        xml.push('>');
        for port in &self.ports {
            xml.push_str(&port.to_esdl());
        }
        xml.push_str(&self.children.concat());
        if !self.costs.is_empty() {
            xml.push_str(&format!(
                r#"<costInformation xsi:type="esdl:CostInformation" id="{}_ci">{}</costInformation>"#,
                self.id,
                self.costs.concat()
            ));
        }
        xml.push_str("</asset>");
        xml
    }
}

/// A builder for ESDL documents with a single area, for use in tests.
#[derive(Default)]
pub(crate) struct EsdlBuilder {
    description: Option<String>,
    version: Option<String>,
    quantities: Vec<String>,
    carriers: Vec<String>,
    kpis: Vec<String>,
    assets: Vec<TestAsset>,
}

impl EsdlBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub(crate) fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Declares a quantity and unit, given as the attributes of a
    /// `QuantityAndUnitType`.
    pub(crate) fn quantity(mut self, attributes: &str) -> Self {
        self.quantities.push(format!(
            r#"<quantityAndUnit xsi:type="esdl:QuantityAndUnitType" {attributes}/>"#
        ));
        self
    }

    pub(crate) fn carrier(mut self, id: &str, name: &str, class: &str) -> Self {
        self.carriers.push(format!(
            r#"<carrier xsi:type="esdl:{class}" id="{id}" name="{name}"/>"#
        ));
        self
    }

    pub(crate) fn carrier_with_cost(
        mut self,
        id: &str,
        name: &str,
        class: &str,
        value: f64,
        unit_attributes: &str,
    ) -> Self {
        self.carriers.push(format!(
            r#"<carrier xsi:type="esdl:{class}" id="{id}" name="{name}">
                 <cost xsi:type="esdl:SingleValue" id="{id}_cost" value="{value:?}">
                   <profileQuantityAndUnit xsi:type="esdl:QuantityAndUnitType" {unit_attributes}/>
                 </cost>
               </carrier>"#
        ));
        self
    }

    /// Adds a KPI, given as XML, to the area.
    pub(crate) fn kpi(mut self, xml: &str) -> Self {
        self.kpis.push(xml.to_string());
        self
    }

    pub(crate) fn asset(mut self, asset: TestAsset) -> Self {
        self.assets.push(asset);
        self
    }

    /// Returns the text of the document.
    pub(crate) fn to_esdl(&self) -> String {
        let mut header = String::new();
        if let Some(description) = &self.description {
            header.push_str(&format!(r#" description="{description}""#));
        }
        if let Some(version) = &self.version {
            header.push_str(&format!(r#" version="{version}""#));
        }

        let assets = self.assets.iter().map(TestAsset::to_esdl).collect::<String>();
        format!(
            r#"<?xml version='1.0' encoding='UTF-8'?>
<esdl:EnergySystem xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:esdl="http://www.tno.nl/esdl" id="es" name="Test"{header}>
  <energySystemInformation xsi:type="esdl:EnergySystemInformation" id="esi">
    <carriers xsi:type="esdl:Carriers" id="cs">{}</carriers>
    <quantityAndUnits xsi:type="esdl:QuantityAndUnits" id="qaus">{}</quantityAndUnits>
  </energySystemInformation>
  <instance xsi:type="esdl:Instance" id="inst">
    <area xsi:type="esdl:Area" id="area">{assets}<KPIs xsi:type="esdl:KPIs" id="kpis">{}</KPIs></area>
  </instance>
</esdl:EnergySystem>"#,
            self.carriers.concat(),
            self.quantities.concat(),
            self.kpis.concat(),
        )
    }

    /// Parses the document into an `EnergySystem`.
    pub(crate) fn build(&self) -> Result<EnergySystem, Error> {
        EnergySystem::from_esdl_str(&self.to_esdl())
    }
}

const OPERA_TABLES: &str = r#"
CREATE TABLE [Energiedragers] (
    [Energiedrager] TEXT, [Eenheid] TEXT, [VraagIsAanbod] BOOLEAN, [Generiek] BOOLEAN,
    [Basisenergiedrager] BOOLEAN, [Elektriciteit] BOOLEAN, [Warmte] BOOLEAN);
CREATE TABLE [EconomieNationaal(Energiedrager,Jaar,Scenario)] (
    [Energiedrager] TEXT, [Jaar] INTEGER, [Scenario] TEXT, [Nationale prijs] REAL);
CREATE TABLE [Activiteiten] ([Activiteit] TEXT, [Eenheid] TEXT);
CREATE TABLE [ActiviteitBaseline(activiteit,scenario,jaar)] (
    [Activiteit] TEXT, [Scenario] TEXT, [Jaar] INTEGER, [Waarde] REAL);
CREATE TABLE [Opties] (
    [Nr] INTEGER PRIMARY KEY AUTOINCREMENT, [Naam optie] TEXT, [Sector] TEXT, [Subsector] TEXT,
    [Unit of Capacity] TEXT, [Eenheid activiteit] TEXT, [Cap2Act] REAL,
    [Optie onbeperkt] BOOLEAN, [Capaciteit onbeperkt] BOOLEAN, [Doelstof] TEXT,
    [LaadOpslagOptie] BOOLEAN, [OntlaadOpslagOptie] BOOLEAN, [VoorraadOpslagOptie] BOOLEAN,
    [Levensduur] INTEGER, [ConnectorPointOption] BOOLEAN);
CREATE TABLE [Beschikbare varianten] (
    [Nr] INTEGER, [Variant] INTEGER, [Beschikbaar] BOOLEAN, [Omschrijving] TEXT);
CREATE TABLE [Kosten(Optie,Variant,Jaar)] (
    [Nr] INTEGER, [Variant] INTEGER, [Jaar] INTEGER, [Investeringskosten] REAL,
    [Overig operationeel kosten/baten] REAL, [Variabele kosten] REAL, [Brandstofkosten] REAL);
CREATE TABLE [Energiegebruik(Optie,Energiedrager,Variant,Jaar)] (
    [Nr] INTEGER, [Energiedrager] TEXT, [Variant] INTEGER, [Jaar] INTEGER, [Effect] TEXT);
CREATE TABLE [CatJaarScen(categorie,jaar,scenario)] (
    [Categorie] TEXT, [Jaar] INTEGER, [Scenario] TEXT, [Max aantal] REAL, [Max kosten] REAL,
    [Min aantal] REAL, [Min kosten] REAL, [Max totale capaciteit] REAL,
    [Min totale capaciteit] REAL, [Min Activiteit Jaar] REAL, [Max Activiteit Jaar] REAL,
    [ActiviteitMinimaalGelijkBaseline] BOOLEAN);
CREATE TABLE [OptieActiviteit(Optie,Activiteit)] (
    [Optie] INTEGER, [Activiteit] TEXT, [Match] BOOLEAN);
CREATE TABLE [OpgelegdeToegestaneFlows] (
    [Energiedrager] TEXT, [OptieVan] INTEGER, [OptieNaar] INTEGER, [Match] BOOLEAN,
    [Opmerking] TEXT);
CREATE TABLE [EnergieDragerAlloc(Optie,Energiedrager,Var,ConstrJaar,Jaar)] (
    [Nr] INTEGER, [Energiedrager] TEXT, [Variant] INTEGER, [ConstructieJaar] INTEGER,
    [Jaar] INTEGER, [Effect] REAL);
CREATE TABLE [TechnischeParameters(Optie,Jaar)] (
    [Nr] INTEGER, [Jaar] INTEGER, [AvailabilityFactor] REAL, [Rendement] REAL);
CREATE TABLE [OpslagOpties(Optie,ConstrJr)] (
    [Nr] INTEGER, [ConstructieJaar] INTEGER, [VerliesPerUur] REAL, [SlowLoadTime] REAL,
    [FastLoadTime] REAL);
"#;

/// Creates an Opera database with empty tables in a temporary directory.
///
/// The database is deleted when the returned directory is dropped.
pub(crate) fn opera_database() -> Result<(tempfile::TempDir, PathBuf), Error> {
    let dir = tempfile::tempdir().map_err(|e| Error::internal(e.to_string()))?;
    let path = dir.path().join("OperaTemplate.db");
    let connection = rusqlite::Connection::open(&path)?;
    connection.execute_batch(OPERA_TABLES)?;
    connection.close().map_err(|(_, e)| Error::from(e))?;
    Ok((dir, path))
}
