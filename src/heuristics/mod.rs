//! Text-level rules shared by the extractor and the reconciler: date
//! recognition, budget-table header detection, and phase-name matching.

pub mod budget_table;
pub mod dates;
pub mod phase_match;

pub use budget_table::*;
pub use dates::*;
pub use phase_match::*;
