//! # Unit Normalization
//!
//! Lab sheets record quantities in whatever unit the operator had at hand
//! (`mg`, `µl`, `°C`, `sccm`, ...). Every numeric field is converted into the
//! canonical unit of its [`Dimension`] at mapping time so that sums and
//! ratios downstream never mix scales.
//!
//! | Dimension | Canonical unit |
//! |-----------|----------------|
//! | Mass | g |
//! | Volume | ml |
//! | Density | g/ml |
//! | Molar mass | g/mol |
//! | Molar concentration | mol/l |
//! | Temperature | K |
//! | Time | s |
//! | Pressure | Pa |
//! | Flow rate | ml/min |
//! | Length | m |
//! | Angle | degree |
//! | Power | W |
//! | Dimensionless | 1 |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical dimension of a quantity column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Mass, canonical gram
    Mass,
    /// Volume, canonical millilitre
    Volume,
    /// Density, canonical g/ml
    Density,
    /// Molar mass, canonical g/mol
    MolarMass,
    /// Molar concentration, canonical mol/l
    MolarConcentration,
    /// Temperature, canonical kelvin
    Temperature,
    /// Time, canonical second
    Time,
    /// Pressure, canonical pascal
    Pressure,
    /// Volumetric flow rate, canonical ml/min
    FlowRate,
    /// Length, canonical metre
    Length,
    /// Plane angle, canonical degree
    Angle,
    /// Power, canonical watt
    Power,
    /// Plain numbers (ratios, counts)
    Dimensionless,
}

impl Dimension {
    /// Symbol of the canonical unit for this dimension
    pub fn canonical_symbol(&self) -> &'static str {
        match self {
            Dimension::Mass => "g",
            Dimension::Volume => "ml",
            Dimension::Density => "g/ml",
            Dimension::MolarMass => "g/mol",
            Dimension::MolarConcentration => "mol/l",
            Dimension::Temperature => "K",
            Dimension::Time => "s",
            Dimension::Pressure => "Pa",
            Dimension::FlowRate => "ml/min",
            Dimension::Length => "m",
            Dimension::Angle => "degree",
            Dimension::Power => "W",
            Dimension::Dimensionless => "1",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Mass => "mass",
            Dimension::Volume => "volume",
            Dimension::Density => "density",
            Dimension::MolarMass => "molar mass",
            Dimension::MolarConcentration => "molar concentration",
            Dimension::Temperature => "temperature",
            Dimension::Time => "time",
            Dimension::Pressure => "pressure",
            Dimension::FlowRate => "flow rate",
            Dimension::Length => "length",
            Dimension::Angle => "angle",
            Dimension::Power => "power",
            Dimension::Dimensionless => "dimensionless",
        };
        f.write_str(name)
    }
}

/// A recognised unit symbol with its affine conversion to the canonical unit
///
/// `canonical = value * factor + offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    /// Symbol as written in templates
    pub symbol: &'static str,
    /// Dimension the unit measures
    pub dimension: Dimension,
    /// Multiplicative factor to the canonical unit
    pub factor: f64,
    /// Additive offset applied after scaling (temperatures only)
    pub offset: f64,
}

macro_rules! unit {
    ($symbol:expr, $dim:ident, $factor:expr) => {
        Unit {
            symbol: $symbol,
            dimension: Dimension::$dim,
            factor: $factor,
            offset: 0.0,
        }
    };
    ($symbol:expr, $dim:ident, $factor:expr, $offset:expr) => {
        Unit {
            symbol: $symbol,
            dimension: Dimension::$dim,
            factor: $factor,
            offset: $offset,
        }
    };
}

const UNITS: &[Unit] = &[
    unit!("kg", Mass, 1e3),
    unit!("g", Mass, 1.0),
    unit!("mg", Mass, 1e-3),
    unit!("ug", Mass, 1e-6),
    unit!("µg", Mass, 1e-6),
    unit!("l", Volume, 1e3),
    unit!("ml", Volume, 1.0),
    unit!("ul", Volume, 1e-3),
    unit!("µl", Volume, 1e-3),
    unit!("cm3", Volume, 1.0),
    unit!("g/ml", Density, 1.0),
    unit!("g/cm3", Density, 1.0),
    unit!("kg/l", Density, 1.0),
    unit!("g/l", Density, 1e-3),
    unit!("kg/m3", Density, 1e-3),
    unit!("g/mol", MolarMass, 1.0),
    unit!("kg/mol", MolarMass, 1e3),
    unit!("mol/l", MolarConcentration, 1.0),
    unit!("m", MolarConcentration, 1.0),
    unit!("mmol/l", MolarConcentration, 1e-3),
    unit!("mm", Length, 1e-3),
    unit!("k", Temperature, 1.0),
    unit!("kelvin", Temperature, 1.0),
    unit!("°c", Temperature, 1.0, 273.15),
    unit!("degc", Temperature, 1.0, 273.15),
    unit!("celsius", Temperature, 1.0, 273.15),
    unit!("s", Time, 1.0),
    unit!("min", Time, 60.0),
    unit!("h", Time, 3600.0),
    unit!("pa", Pressure, 1.0),
    unit!("hpa", Pressure, 1e2),
    unit!("mbar", Pressure, 1e2),
    unit!("bar", Pressure, 1e5),
    unit!("torr", Pressure, 133.322_368_421),
    unit!("ml/min", FlowRate, 1.0),
    unit!("sccm", FlowRate, 1.0),
    unit!("l/min", FlowRate, 1e3),
    unit!("ul/min", FlowRate, 1e-3),
    unit!("µl/min", FlowRate, 1e-3),
    unit!("um", Length, 1e-6),
    unit!("µm", Length, 1e-6),
    unit!("nm", Length, 1e-9),
    unit!("cm", Length, 1e-2),
    unit!("meter", Length, 1.0),
    unit!("degree", Angle, 1.0),
    unit!("deg", Angle, 1.0),
    unit!("°", Angle, 1.0),
    unit!("w", Power, 1.0),
    unit!("kw", Power, 1e3),
    unit!("mw", Power, 1e-3),
    unit!("%", Dimensionless, 1e-2),
    unit!("1", Dimensionless, 1.0),
];

impl Unit {
    /// Look up a unit symbol (case-insensitive, surrounding whitespace ignored).
    ///
    /// `M` is read as molar; the metre must be spelled `meter` since the
    /// lowercase lookup cannot tell the two apart.
    pub fn parse(symbol: &str) -> Option<Unit> {
        let normalized = symbol.trim().to_lowercase().replace(' ', "");
        UNITS.iter().find(|u| u.symbol == normalized).copied()
    }

    /// Convert a value in this unit to the canonical unit of its dimension
    pub fn to_canonical(&self, value: f64) -> f64 {
        value * self.factor + self.offset
    }

    /// Convert a canonical value back into this unit
    pub fn from_canonical(&self, value: f64) -> f64 {
        (value - self.offset) / self.factor
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

/// Split a text cell such as `"5 mg"` or `"12.5ml"` into its number and unit.
///
/// Returns `None` when the leading part is not a number. The unit part is
/// `None` when the text holds only a number.
pub fn split_value_and_unit(text: &str) -> Option<(f64, Option<&str>)> {
    let text = text.trim();
    let split_at = text
        .char_indices()
        .find(|(i, c)| {
            !(c.is_ascii_digit()
                || *c == '.'
                || *c == '-'
                || *c == '+'
                || ((*c == 'e' || *c == 'E') && is_exponent(text, *i)))
        })
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    let (number, rest) = text.split_at(split_at);
    let value: f64 = number.trim().parse().ok()?;
    let rest = rest.trim();
    Some((value, if rest.is_empty() { None } else { Some(rest) }))
}

// An 'e' is part of the number only when digits surround it ("1e-3"), not
// when it starts a unit symbol following a number.
fn is_exponent(text: &str, index: usize) -> bool {
    let bytes = text.as_bytes();
    let prev_digit = index > 0 && bytes[index - 1].is_ascii_digit();
    let next = bytes.get(index + 1).copied();
    let next_ok = match next {
        Some(b'-') | Some(b'+') => bytes.get(index + 2).is_some_and(|b| b.is_ascii_digit()),
        Some(b) => b.is_ascii_digit(),
        None => false,
    };
    prev_digit && next_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milligram_to_gram() {
        let mg = Unit::parse("mg").unwrap();
        assert_eq!(mg.dimension, Dimension::Mass);
        assert!((mg.to_canonical(500.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_celsius_offset() {
        let c = Unit::parse("°C").unwrap();
        assert_eq!(c.dimension, Dimension::Temperature);
        assert!((c.to_canonical(25.0) - 298.15).abs() < 1e-9);
        assert!((c.from_canonical(298.15) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_unit() {
        assert!(Unit::parse("furlong").is_none());
    }

    #[test]
    fn test_split_value_and_unit() {
        assert_eq!(split_value_and_unit("5 mg"), Some((5.0, Some("mg"))));
        assert_eq!(split_value_and_unit("12.5ml"), Some((12.5, Some("ml"))));
        assert_eq!(split_value_and_unit("1e-3 g"), Some((1e-3, Some("g"))));
        assert_eq!(split_value_and_unit("42"), Some((42.0, None)));
        assert_eq!(split_value_and_unit("ten"), None);
    }
}
