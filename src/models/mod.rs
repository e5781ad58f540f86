pub mod extraction;
pub mod phase;
pub mod placeholder;

pub use extraction::*;
pub use phase::*;
pub use placeholder::*;
