pub mod stage0_extract;
pub mod stage1_substitute;
pub mod stage2_reconcile;
pub mod stage3_render;

pub use stage0_extract::*;
pub use stage1_substitute::*;
pub use stage2_reconcile::*;
pub use stage3_render::*;
