//! Record store: seed-addressed records owned by one signer.
//!
//! Records of an owner live at `"<NAMESPACE>__<index>"` seed addresses with
//! indices 0, 1, 2, ... in creation order. The store keeps an [`IndexCursor`]
//! with the next free index of the signer; it is primed by
//! [`RecordApi::fetch_all`] on the signer's own key and must be primed before
//! [`RecordApi::create`]. Listing another owner leaves it untouched.

use std::{fmt, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use record_store_core::{derive_address, RecordLayout};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::Signature,
    system_instruction,
};
use tokio::sync::RwLock;

use crate::{
    api::RecordApi,
    config::StoreConfig,
    connection::LedgerConnection,
    cursor::IndexCursor,
    errors::StoreError,
    signer::TransactionSigner,
    transaction::{Confirmation, TransactionSubmitter},
};

/// Where to look for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLocator {
    Address(Pubkey),
    Index { owner: Pubkey, index: u64 },
}

/// A decoded record together with the account it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord<R> {
    pub address: Pubkey,
    pub data: R,
}

/// Result of a create, update or remove.
///
/// `record` is the state read back after submission: the new record after a
/// create or update, `None` after a successful remove.
#[derive(Debug, Clone)]
pub struct Mutation<R> {
    pub signature: Signature,
    pub confirmation: Confirmation,
    pub address: Pubkey,
    pub record: Option<StoredRecord<R>>,
}

impl<R> Mutation<R> {
    /// Turn a failed confirmation into an error.
    pub fn confirmed(self) -> Result<Self, StoreError> {
        match &self.confirmation {
            Confirmation::Failed(failure) if failure.is_account_collision() => {
                Err(StoreError::AccountCollision {
                    address: self.address,
                })
            }
            Confirmation::Failed(failure) => Err(StoreError::transaction_failed(
                self.signature,
                failure.messages.clone(),
            )),
            Confirmation::Confirmed | Confirmation::NotAwaited => Ok(self),
        }
    }
}

pub struct RecordStore<R: RecordLayout> {
    connection: Arc<dyn LedgerConnection>,
    signer: Arc<dyn TransactionSigner>,
    submitter: TransactionSubmitter,
    config: StoreConfig,
    cursor: IndexCursor,
    /// Owner whose enumeration last primed `cursor`.
    cursor_owner: RwLock<Option<Pubkey>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: RecordLayout> fmt::Debug for RecordStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("program_id", &self.config.program_id)
            .field("namespace", &R::NAMESPACE.as_str())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl<R: RecordLayout> RecordStore<R> {
    pub fn new(
        connection: Arc<dyn LedgerConnection>,
        signer: Arc<dyn TransactionSigner>,
        config: StoreConfig,
    ) -> Self {
        let submitter = TransactionSubmitter::new(connection.clone(), config.await_confirmation);
        Self {
            connection,
            signer,
            submitter,
            config,
            cursor: IndexCursor::new(),
            cursor_owner: RwLock::new(None),
            _record: PhantomData,
        }
    }

    pub fn cursor(&self) -> &IndexCursor {
        &self.cursor
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Address of record `index` of `owner`.
    pub fn address_of(&self, owner: &Pubkey, index: u64) -> Result<Pubkey, StoreError> {
        Ok(R::NAMESPACE.address(owner, &self.config.program_id, index)?)
    }

    fn owner(&self) -> Result<Pubkey, StoreError> {
        self.signer.public_key().ok_or(StoreError::MissingSignerKey)
    }

    /// Next free index of the signer, if an enumeration of the signer primed it.
    async fn next_index(&self, owner: &Pubkey) -> Result<u64, StoreError> {
        let index = self.cursor.require_known()?;
        if self.cursor_owner.read().await.as_ref() != Some(owner) {
            return Err(StoreError::SequenceNotInitialized);
        }
        Ok(index)
    }

    async fn fetch_at(&self, address: Pubkey) -> Result<Option<StoredRecord<R>>, StoreError> {
        let bytes = self.connection.account_bytes(&address).await?;
        Self::decode_at(address, bytes)
    }

    fn decode_at(address: Pubkey, bytes: Option<Vec<u8>>) -> Result<Option<StoredRecord<R>>, StoreError> {
        match bytes {
            Some(bytes) => Ok(Some(StoredRecord {
                address,
                data: R::decode(&bytes)?,
            })),
            None => Ok(None),
        }
    }

    /// Read indices from 0 until the first absent one. With `advance`, the
    /// live cursor follows the scan.
    async fn scan(&self, owner: &Pubkey, advance: bool) -> Result<Vec<StoredRecord<R>>, StoreError> {
        let mut records = Vec::new();
        let mut index = 0u64;
        if advance {
            self.cursor.set(index);
        }

        loop {
            let address = self.address_of(owner, index)?;
            tracing::debug!(%owner, index, %address, "Reading record");
            match self.fetch_at(address).await? {
                Some(record) => {
                    records.push(record);
                    index += 1;
                    if advance {
                        self.cursor.set(index);
                    }
                }
                None => break,
            }
        }

        Ok(records)
    }

    fn record_instruction(&self, owner: Pubkey, address: Pubkey, data: Vec<u8>) -> Instruction {
        Instruction::new_with_bytes(
            self.config.program_id,
            &data,
            vec![AccountMeta::new(owner, true), AccountMeta::new(address, false)],
        )
    }
}

#[async_trait]
impl<R: RecordLayout> RecordApi<R> for RecordStore<R> {
    async fn fetch_one(&self, locator: RecordLocator) -> Result<Option<StoredRecord<R>>, StoreError> {
        let address = match locator {
            RecordLocator::Address(address) => address,
            RecordLocator::Index { owner, index } => {
                self.cursor.require_known()?;
                self.address_of(&owner, index)?
            }
        };
        self.fetch_at(address).await
    }

    async fn fetch_all(&self, owner: &Pubkey) -> Result<Vec<StoredRecord<R>>, StoreError> {
        if self.signer.public_key().as_ref() != Some(owner) {
            let records = self.scan(owner, false).await?;
            tracing::debug!(%owner, count = records.len(), "Fetched records of another owner");
            return Ok(records);
        }

        let previous = self.cursor.live_value();
        let _frozen = self.cursor.freeze_guard();

        match self.scan(owner, true).await {
            Ok(records) => {
                self.cursor.set(records.len() as u64);
                *self.cursor_owner.write().await = Some(*owner);
                tracing::debug!(%owner, count = records.len(), "Fetched all records");
                Ok(records)
            }
            Err(e) => {
                self.cursor.restore(previous);
                Err(e)
            }
        }
    }

    async fn create(&self, record: R) -> Result<Mutation<R>, StoreError> {
        let owner = self.owner()?;
        let index = self.next_index(&owner).await?;

        let seed = R::NAMESPACE.seed(index);
        let address = derive_address(&owner, &self.config.program_id, &seed)?;
        let payload = record.create_payload()?;

        let rent = self.connection.minimum_balance_for(R::ACCOUNT_WIDTH).await?;
        let lamports = rent.saturating_add(self.config.initial_lamports);

        let instructions = [
            system_instruction::create_account_with_seed(
                &owner,
                &address,
                &owner,
                &seed,
                lamports,
                R::ACCOUNT_WIDTH as u64,
                &self.config.program_id,
            ),
            self.record_instruction(owner, address, payload),
        ];

        let submission = self.submitter.submit(&instructions, self.signer.as_ref()).await?;

        // Whoever wrote it, an occupied index is no longer free.
        let bytes = self.connection.account_bytes(&address).await?;
        if bytes.is_some() {
            self.cursor.increment();
        }
        let stored = Self::decode_at(address, bytes)?;

        tracing::info!(
            %address,
            index,
            signature = %submission.signature,
            created = stored.is_some(),
            "Create submitted"
        );

        Ok(Mutation {
            signature: submission.signature,
            confirmation: submission.confirmation,
            address,
            record: stored,
        })
    }

    async fn update(&self, address: Pubkey, update: R::Update) -> Result<Mutation<R>, StoreError> {
        let owner = self.owner()?;
        let payload = R::update_payload(&update)?;

        let instruction = self.record_instruction(owner, address, payload);
        let submission = self.submitter.submit(&[instruction], self.signer.as_ref()).await?;
        let stored = self.fetch_at(address).await?;

        tracing::info!(%address, signature = %submission.signature, "Update submitted");

        Ok(Mutation {
            signature: submission.signature,
            confirmation: submission.confirmation,
            address,
            record: stored,
        })
    }

    async fn remove(&self, address: Pubkey) -> Result<Mutation<R>, StoreError> {
        let owner = self.owner()?;
        let payload = R::remove_payload()?;

        let instruction = self.record_instruction(owner, address, payload);
        let submission = self.submitter.submit(&[instruction], self.signer.as_ref()).await?;
        let stored = self.fetch_at(address).await?;
        if stored.is_none() && !submission.confirmation.is_failed() {
            self.cursor.decrement();
        }

        tracing::info!(
            %address,
            signature = %submission.signature,
            removed = stored.is_none(),
            "Remove submitted"
        );

        Ok(Mutation {
            signature: submission.signature,
            confirmation: submission.confirmation,
            address,
            record: stored,
        })
    }
}
