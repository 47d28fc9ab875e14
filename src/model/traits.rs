use serde::Serialize;

use super::solution::{Component, ComponentRole};

/// A calculated quantity that a user-supplied measurement may override
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResolvedValue {
    /// Value derived from the record's contributions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated: Option<f64>,
    /// Value recorded by the operator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured: Option<f64>,
}

impl ResolvedValue {
    /// Value with only a measurement
    pub fn measured(value: Option<f64>) -> Self {
        Self {
            calculated: None,
            measured: value,
        }
    }

    /// Exposed value: the measurement when present, otherwise the calculation
    pub fn value(&self) -> Option<f64> {
        self.measured.or(self.calculated)
    }

    /// True when a measurement overrides the calculation
    pub fn is_overridden(&self) -> bool {
        self.measured.is_some()
    }
}

/// Records addressable by an identifier
pub trait Identified {
    /// Identifier unique among records of the same kind in one pass
    fn id(&self) -> &str;

    /// Display name, when one was given
    fn name(&self) -> Option<&str> {
        None
    }
}

/// Records composed of chemical components
pub trait HasComponents {
    /// Owned components followed by components contributed by references
    fn components(&self) -> Vec<&Component>;

    /// Components with the solvent role
    fn solvents(&self) -> Vec<&Component> {
        self.components()
            .into_iter()
            .filter(|c| c.role == Some(ComponentRole::Solvent))
            .collect()
    }

    /// Components with the solute role
    fn solutes(&self) -> Vec<&Component> {
        self.components()
            .into_iter()
            .filter(|c| c.role == Some(ComponentRole::Solute))
            .collect()
    }
}

/// Records exposing totals with calculated-versus-measured resolution
pub trait HasTotals {
    /// Named totals of the record
    fn totals(&self) -> Vec<(&'static str, &ResolvedValue)>;

    /// Exposed value of one total
    fn total(&self, name: &str) -> Option<f64> {
        self.totals()
            .into_iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| v.value())
    }
}
