//! # Derived-Quantity Calculator
//!
//! Quantities that follow from assembled records:
//!
//! - component effective mass/volume and molar concentration
//! - solution totals, reference proportions and contributed components
//! - growth-run duration from its steps
//! - EPIC process time
//!
//! Calculations never overwrite measured values; a [`ResolvedValue`] keeps
//! both and exposes the measurement when present. Missing optional inputs
//! leave a quantity unset rather than failing.
//!
//! [`ResolvedValue`]: crate::model::ResolvedValue

pub mod epic;
pub mod growth;
pub mod solution;
