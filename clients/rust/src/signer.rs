//! Signing capability.
//!
//! A wallet may not expose a key until it is connected, so `public_key`
//! is optional and every mutation checks it at call time.

use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};

use crate::errors::StoreError;

#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Key of the signing identity, if it is available yet.
    fn public_key(&self) -> Option<Pubkey>;

    /// Sign `transaction` using its current recent blockhash.
    async fn sign(&self, transaction: Transaction) -> Result<Transaction, StoreError>;
}

#[async_trait]
impl TransactionSigner for Keypair {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.pubkey())
    }

    async fn sign(&self, mut transaction: Transaction) -> Result<Transaction, StoreError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_sign(&[self], blockhash)
            .map_err(|e| StoreError::SignerError(e.to_string()))?;
        Ok(transaction)
    }
}
