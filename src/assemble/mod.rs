//! # Record Assembler
//!
//! Groups typed rows into records and resolves references between them.
//!
//! - **Solutions**: rows grouped by solution ID; reference rows pull a
//!   proportion of an earlier solution into the current one
//! - **Growth**: substrates, then growth runs referencing them, then steps
//!   attached to their run
//! - **Instrument**: sources and mass-flow controllers keyed by EPIC loop
//! - **EPIC logs**: one channel per logged column
//!
//! References only resolve against records finished earlier in the same
//! pass, so a file is processed top to bottom without a second sweep.
//! Forward references and unknown identifiers fail with a
//! [`ReferenceError`] naming the offending cell.

pub mod epic;
mod error;
mod grouping;
pub mod growth;
pub mod instrument;
mod registry;
pub mod solution;

#[cfg(test)]
mod tests;

pub use epic::assemble_epic;
pub use error::{AssemblyError, ReferenceError};
pub use grouping::{group_rows, record_attribute, Group};
pub use growth::{assemble_growth, GrowthWorkbook};
pub use instrument::assemble_instrument;
pub use registry::Registry;
pub use solution::{assemble_solutions, merge_duplicates};
