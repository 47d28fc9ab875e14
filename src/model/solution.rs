use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use super::traits::{HasComponents, HasTotals, Identified, ResolvedValue};

/// Role of a component in a solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentRole {
    /// Dissolving medium
    Solvent,
    /// Dissolved substance
    Solute,
}

impl ComponentRole {
    /// Parse the canonical spelling produced by the field mapper
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Solvent" => Some(ComponentRole::Solvent),
            "Solute" => Some(ComponentRole::Solute),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentRole::Solvent => f.write_str("Solvent"),
            ComponentRole::Solute => f.write_str("Solute"),
        }
    }
}

/// Where a component of a solution comes from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ComponentOrigin {
    /// Listed directly in the solution's rows
    Owned,
    /// Share of a referenced solution's composition
    Contributed {
        /// Referenced solution
        from: String,
        /// Share of the referenced solution that was used
        proportion: f64,
    },
}

/// A chemical entity in a solution; quantities are in canonical units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// Chemical name or identifier
    pub name: String,
    /// Solvent or solute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<ComponentRole>,
    /// Mass in g
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    /// Volume in ml
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Density in g/ml
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    /// Molar mass in g/mol
    #[serde(skip_serializing_if = "Option::is_none")]
    pub molar_mass: Option<f64>,
    /// Molar concentration in mol/l
    pub molar_concentration: ResolvedValue,
    /// Owned or contributed
    pub origin: ComponentOrigin,
}

impl Component {
    /// Owned component without quantities
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
            mass: None,
            volume: None,
            density: None,
            molar_mass: None,
            molar_concentration: ResolvedValue::default(),
            origin: ComponentOrigin::Owned,
        }
    }

    /// Mass, or volume times density
    pub fn effective_mass(&self) -> Option<f64> {
        self.mass
            .or_else(|| Some(self.volume? * self.density?))
    }

    /// Volume, or mass over density
    pub fn effective_volume(&self) -> Option<f64> {
        self.volume.or_else(|| {
            let density = self.density.filter(|d| *d != 0.0)?;
            Some(self.mass? / density)
        })
    }

    /// Amount of substance in mol
    pub fn amount_of_substance(&self) -> Option<f64> {
        let molar_mass = self.molar_mass.filter(|m| *m != 0.0)?;
        Some(self.effective_mass()? / molar_mass)
    }

    /// Whether two components name the same chemical
    pub fn same_chemical(&self, other: &Component) -> bool {
        self.name.trim().eq_ignore_ascii_case(other.name.trim())
    }
}

/// Use of another solution inside a solution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionReference {
    /// Identifier of the referenced solution
    pub target: String,
    /// Volume taken in ml
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_volume: Option<f64>,
    /// Mass taken in g
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_mass: Option<f64>,
    /// Share of the referenced solution's total that was used
    pub proportion: f64,
    /// Referenced total mass times the proportion, in g
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributed_mass: Option<f64>,
    /// Referenced total volume times the proportion, in ml
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributed_volume: Option<f64>,
}

impl SolutionReference {
    /// Reference taking `proportion` of `target`
    pub fn new(target: &Solution, proportion: f64) -> Self {
        Self {
            target: target.id.clone(),
            used_volume: None,
            used_mass: None,
            proportion,
            contributed_mass: target.total_mass.value().map(|m| m * proportion),
            contributed_volume: target.total_volume.value().map(|v| v * proportion),
        }
    }
}

/// A prepared precursor solution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// Solution identifier
    pub id: String,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-text notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Preparation date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepared: Option<NaiveDateTime>,
    /// Components listed in the solution's own rows
    pub components: Vec<Component>,
    /// Other solutions used in this one
    pub references: Vec<SolutionReference>,
    /// Components brought in by references
    pub contributed: Vec<Component>,
    /// Total mass in g
    pub total_mass: ResolvedValue,
    /// Total volume in ml
    pub total_volume: ResolvedValue,
}

impl Solution {
    /// Empty solution
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            prepared: None,
            components: Vec::new(),
            references: Vec::new(),
            contributed: Vec::new(),
            total_mass: ResolvedValue::default(),
            total_volume: ResolvedValue::default(),
        }
    }
}

impl Identified for Solution {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl HasComponents for Solution {
    fn components(&self) -> Vec<&Component> {
        self.components.iter().chain(self.contributed.iter()).collect()
    }
}

impl HasTotals for Solution {
    fn totals(&self) -> Vec<(&'static str, &ResolvedValue)> {
        vec![("mass", &self.total_mass), ("volume", &self.total_volume)]
    }
}
