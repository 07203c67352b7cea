// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The ESDL enumerations that make up a quantity descriptor.

esdl_literals! {
    /// The physical quantity a descriptor measures.
    pub enum PhysicalQuantity {
        Undefined => "UNDEFINED",
        Energy => "ENERGY",
        Power => "POWER",
        PowerReactive => "POWER_REACTIVE",
        Cost => "COST",
        Time => "TIME",
        Temperature => "TEMPERATURE",
        Pressure => "PRESSURE",
        Emission => "EMISSION",
        StateOfCharge => "STATE_OF_CHARGE",
        Distance => "DISTANCE",
        Volume => "VOLUME",
        Flow => "FLOW",
        Coefficient => "COEFFICIENT",
        Irradiance => "IRRADIANCE",
        Speed => "SPEED",
        Weight => "WEIGHT",
        Voltage => "VOLTAGE",
        Current => "CURRENT",
    }
}

esdl_literals! {
    /// A base unit.
    pub enum Unit {
        None => "NONE",
        Joule => "JOULE",
        WattHour => "WATTHOUR",
        WattSecond => "WATTSECOND",
        Watt => "WATT",
        VoltAmpere => "VOLT_AMPERE",
        VoltAmpereReactive => "VOLT_AMPERE_REACTIVE",
        Volt => "VOLT",
        Ampere => "AMPERE",
        Euro => "EURO",
        Dollar => "DOLLAR",
        Gram => "GRAM",
        Second => "SECOND",
        Minute => "MINUTE",
        Hour => "HOUR",
        Day => "DAY",
        Week => "WEEK",
        Month => "MONTH",
        Year => "YEAR",
        Metre => "METRE",
        SquareMetre => "SQUARE_METRE",
        CubicMetre => "CUBIC_METRE",
        Litre => "LITRE",
        DegreesCelsius => "DEGREES_CELSIUS",
        Kelvin => "KELVIN",
        Percent => "PERCENT",
        Bar => "BAR",
        Pascal => "PASCAL",
    }
}

esdl_literals! {
    /// A power-of-ten scale applied to a unit.
    pub enum Multiplier {
        None => "NONE",
        Atto => "ATTO",
        Femto => "FEMTO",
        Pico => "PICO",
        Nano => "NANO",
        Micro => "MICRO",
        Milli => "MILLI",
        Centi => "CENTI",
        Deci => "DECI",
        Deka => "DEKA",
        Hecto => "HECTO",
        Kilo => "KILO",
        Mega => "MEGA",
        Giga => "GIGA",
        Tera => "TERA",
        /// Misspelled alias of `TERA` that ESDL keeps for compatibility.
        Terra => "TERRA",
        Peta => "PETA",
        Exa => "EXA",
    }
}

esdl_literals! {
    /// The time unit of a rate, as in "per year".
    pub enum TimeUnit {
        None => "NONE",
        Second => "SECOND",
        Minute => "MINUTE",
        Quarter => "QUARTER",
        Hour => "HOUR",
        Day => "DAY",
        Week => "WEEK",
        Month => "MONTH",
        Year => "YEAR",
    }
}

/// Scale factors indexed by the position of the multiplier literal.
///
/// The table has one more entry than there are literals and maps `TERRA` to
/// 1e15 instead of 1e12. Both are kept so that converted values stay
/// identical to those of existing Opera databases.
pub(crate) const MULTIPLIER_FACTORS: [f64; 19] = [
    1.0, 1E-18, 1E-15, 1E-12, 1E-9, 1E-6, 1E-3, 1E-2, 1E-1, 1E1, 1E2, 1E3, 1E6, 1E9, 1E12, 1E15,
    1E15, 1E18, 1E21,
];

impl Multiplier {
    /// Returns the power-of-ten factor of the multiplier.
    pub fn factor(self) -> f64 {
        MULTIPLIER_FACTORS[self as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_multiplier_factors() {
        assert_eq!(Multiplier::None.factor(), 1.0);
        assert_eq!(Multiplier::Atto.factor(), 1E-18);
        assert_eq!(Multiplier::Kilo.factor(), 1E3);
        assert_eq!(Multiplier::Mega.factor(), 1E6);
        assert_eq!(Multiplier::Giga.factor(), 1E9);
        assert_eq!(Multiplier::Tera.factor(), 1E12);
        assert_eq!(Multiplier::Terra.factor(), 1E15);
        assert_eq!(Multiplier::Peta.factor(), 1E15);
        assert_eq!(Multiplier::Exa.factor(), 1E18);

        // every literal has a factor, and the scaled literals never decrease
        let scaled = Multiplier::ALL
            .iter()
            .skip(1)
            .map(|m| m.factor())
            .collect::<Vec<_>>();
        assert_eq!(scaled.len(), Multiplier::ALL.len() - 1);
        assert!(scaled.windows(2).all(|w| w[0] <= w[1]));
        assert!(MULTIPLIER_FACTORS[1..].windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(MULTIPLIER_FACTORS[18], 1E21);
    }

    #[test]
    fn test_literals() {
        assert_eq!("GIGA".parse::<Multiplier>(), Ok(Multiplier::Giga));
        assert_eq!("WATTHOUR".parse::<Unit>(), Ok(Unit::WattHour));
        assert_eq!(TimeUnit::Year.to_string(), "YEAR");
        assert_eq!(PhysicalQuantity::Cost.literal(), "COST");
        assert!("GIGAWATT"
            .parse::<Unit>()
            .is_err_and(|e| e.kind() == ErrorKind::DocumentError
                && e.to_string() == "DocumentError: Unknown Unit literal: GIGAWATT"));
    }
}
