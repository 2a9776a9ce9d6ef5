use async_trait::async_trait;
use record_store_client::{StoreError, TransactionSigner};
use solana_sdk::{pubkey::Pubkey, transaction::Transaction};

/// A wallet that has not been connected yet: no key, refuses to sign.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisconnectedSigner;

#[async_trait]
impl TransactionSigner for DisconnectedSigner {
    fn public_key(&self) -> Option<Pubkey> {
        None
    }

    async fn sign(&self, _transaction: Transaction) -> Result<Transaction, StoreError> {
        Err(StoreError::MissingSignerKey)
    }
}
