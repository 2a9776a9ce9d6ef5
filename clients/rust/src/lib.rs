//! Record Store Client
//!
//! A Rust client for fixed-width records kept in seed-addressed Solana accounts.
//!
//! # Features
//!
//! - **Clean API**: `RecordApi` exposes fetch, enumerate, create, update and remove
//! - **Index Cursor**: next-free-index tracking with snapshot reads during enumeration
//! - **Explicit Confirmation**: failed transactions come back as values with causes from the logs
//! - **Rate Limiting**: Built-in token bucket rate limiting for RPC requests
//! - **Retry Logic**: Automatic retry with exponential backoff for transient failures
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use record_store_client::{RecordApi, RecordStore, RpcLedgerConnection, StoreConfig};
//! use record_store_core::Dodo;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StoreConfig::new("https://api.devnet.solana.com", program_id);
//!     let connection = Arc::new(RpcLedgerConnection::new(&config));
//!     let store: RecordStore<Dodo> = RecordStore::new(connection, Arc::new(keypair), config);
//!
//!     let dodos = store.fetch_all(&owner).await?;
//!     println!("{} dodos, next index {:?}", dodos.len(), store.cursor().value());
//!
//!     store.create(Dodo::new("Hello dodo", "🔥 m", now)).await?.confirmed()?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod connection;
pub mod cursor;
pub mod errors;
pub mod rpc;
pub mod signer;
pub mod store;
pub mod transaction;

pub use api::RecordApi;
pub use config::{ConfigError, RateLimitConfig, RetryConfig, StoreConfig, StoreConfigBuilder};
pub use connection::{LedgerConnection, RpcLedgerConnection};
pub use cursor::{FreezeGuard, IndexCursor};
pub use errors::{ErrorCategory, StoreError, StoreResult};
pub use signer::TransactionSigner;
pub use store::{Mutation, RecordLocator, RecordStore, StoredRecord};
pub use transaction::{
    extract_log_errors, Confirmation, Submission, TransactionFailure, TransactionSubmitter,
};
