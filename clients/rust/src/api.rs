//! Public API trait for record stores.

use async_trait::async_trait;
use record_store_core::RecordLayout;
use solana_sdk::pubkey::Pubkey;

use crate::{
    errors::StoreError,
    store::{Mutation, RecordLocator, StoredRecord},
};

/// Operations exposed to applications. Records go in and come out decoded;
/// raw account bytes never cross this boundary.
#[async_trait]
pub trait RecordApi<R: RecordLayout>: Send + Sync {
    /// Read one record. `Ok(None)` when no account exists at the location.
    ///
    /// The by-index form needs a primed index cursor.
    async fn fetch_one(&self, locator: RecordLocator) -> Result<Option<StoredRecord<R>>, StoreError>;

    /// Read every record of `owner` in index order, stopping at the first
    /// absent index. Primes the index cursor.
    async fn fetch_all(&self, owner: &Pubkey) -> Result<Vec<StoredRecord<R>>, StoreError>;

    /// Allocate the next record account of the signer and write `record` into it.
    async fn create(&self, record: R) -> Result<Mutation<R>, StoreError>;

    /// Overwrite the mutable fields of the record at `address`.
    async fn update(&self, address: Pubkey, update: R::Update) -> Result<Mutation<R>, StoreError>;

    /// Close the record account at `address`.
    async fn remove(&self, address: Pubkey) -> Result<Mutation<R>, StoreError>;
}
