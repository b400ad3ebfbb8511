//! Clients composing transaction bundles from chain state
pub mod base;
pub mod sve;
pub mod yi;

pub use base::BaseClient;
pub use sve::*;
pub use yi::*;
