pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::*;
pub use traits::*;
pub use types::*;
