//! Instruction bundles handed back to callers for signing and submission

use std::sync::Arc;

use solana_sdk::{
    instruction::Instruction,
    message::Message,
    signature::{Keypair, Signer},
};

use crate::prelude::*;

/// An ordered list of instructions plus the extra keypairs that must sign.
///
/// The fee payer / wallet is not part of the signer set; only keys created
/// while building (new mints) are. Order is significant and preserved by
/// [`TransactionEnvelope::combine`].
#[derive(Clone, Default)]
pub struct TransactionEnvelope {
    pub instructions: Vec<Instruction>,
    pub signers: Vec<Arc<Keypair>>,
}

impl TransactionEnvelope {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            signers: Vec::new(),
        }
    }

    /// Build from optional instructions, skipping the absent ones
    pub fn from_optional(instructions: impl IntoIterator<Item = Option<Instruction>>) -> Self {
        Self::new(instructions.into_iter().flatten().collect())
    }

    pub fn with_signers(mut self, signers: impl IntoIterator<Item = Arc<Keypair>>) -> Self {
        for signer in signers {
            self.add_signer(signer);
        }
        self
    }

    /// Add a signer unless one with the same pubkey is already present
    pub fn add_signer(&mut self, signer: Arc<Keypair>) {
        let pubkey = signer.pubkey();
        if !self.signers.iter().any(|s| s.pubkey() == pubkey) {
            self.signers.push(signer);
        }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Append `other` after `self`
    pub fn combine(mut self, other: TransactionEnvelope) -> Self {
        self.instructions.extend(other.instructions);
        for signer in other.signers {
            self.add_signer(signer);
        }
        self
    }

    /// Concatenate any number of envelopes in order
    pub fn combine_all(envelopes: impl IntoIterator<Item = TransactionEnvelope>) -> Self {
        envelopes
            .into_iter()
            .fold(TransactionEnvelope::default(), TransactionEnvelope::combine)
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn signer_pubkeys(&self) -> Vec<Pubkey> {
        self.signers.iter().map(|s| s.pubkey()).collect()
    }

    /// Unsigned message with `payer` as fee payer
    pub fn to_message(&self, payer: &Pubkey) -> Message {
        Message::new(&self.instructions, Some(payer))
    }
}

impl std::fmt::Debug for TransactionEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionEnvelope")
            .field("instructions", &self.instructions)
            .field("signers", &self.signer_pubkeys())
            .finish()
    }
}
