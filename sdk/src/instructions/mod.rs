/// Instruction builders for the SVE wrapper and the programs it composes with
pub mod builder;
pub mod locked_voter;
pub mod sve;
pub mod token;
pub mod yi;

pub use builder::*;
pub use locked_voter::*;
pub use sve::*;
pub use token::*;
pub use yi::*;
