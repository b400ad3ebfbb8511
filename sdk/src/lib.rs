/// SVE SDK
///
/// Builds unsigned transaction bundles for the SVE vote-escrow wrapper:
/// - Address derivation for wrappers, escrows and Yi tokens
/// - Associated token account resolution
/// - Instruction encoding for the wrapper, Yi and locked voter programs
/// - Wrapper creation, locking and minting flows
pub mod client;
pub mod config;
pub mod core;
pub mod instructions;
pub mod prelude;
pub mod protocol;
pub mod testing;
pub mod transaction;

pub use client::*;
pub use config::*;
pub use crate::core::*;
pub use protocol::*;
pub use transaction::TransactionEnvelope;
