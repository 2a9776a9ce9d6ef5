//! Error types for the record store client.
//!
//! Provides rich error types with retry hints and categorization
//! for better error handling and observability.

use record_store_core::{AddressError, CodecError};
use solana_client::{
    client_error::ClientErrorKind,
    rpc_request::{RpcError, RpcResponseErrorData},
};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Main error type for record store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    // Network Errors
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Connection timeout")]
    ConnectionTimeout,

    // Transaction Errors
    #[error("Confirmation timeout after {timeout_ms}ms")]
    ConfirmationTimeout { timeout_ms: u64 },

    /// The node refused the transaction before executing it.
    #[error("Transaction rejected: {reason}")]
    TransactionRejected { reason: String, logs: Vec<String> },

    #[error("Transaction {signature} failed: {}", messages.join("; "))]
    TransactionFailed { signature: String, messages: Vec<String> },

    #[error("Account {address} is already in use")]
    AccountCollision { address: Pubkey },

    // Sequencing Errors
    #[error("Record index is unknown, fetch all records before creating one")]
    SequenceNotInitialized,

    // Signer Errors
    #[error("The signer does not have a public key")]
    MissingSignerKey,

    #[error("Signer error: {0}")]
    SignerError(String),

    // Codec Errors
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    // Configuration Errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // Input Validation Errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Internal Errors
    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    /// Check if this error is retryable.
    ///
    /// Retryable errors are transient network or rate limiting issues that
    /// may succeed on retry. An RPC error that reports a transaction error
    /// is final. `MissingSignerKey` is left to the caller, who can retry once
    /// the wallet is connected.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Rpc(err) => !matches!(
                err.kind(),
                ClientErrorKind::TransactionError(_)
                    | ClientErrorKind::RpcError(RpcError::RpcResponseError {
                        data: RpcResponseErrorData::SendTransactionPreflightFailure(_),
                        ..
                    })
            ),
            StoreError::RateLimited { .. }
            | StoreError::ConnectionTimeout
            | StoreError::ConfirmationTimeout { .. } => true,
            _ => false,
        }
    }

    /// Get a retry hint in milliseconds, if available.
    pub fn retry_hint_ms(&self) -> Option<u64> {
        match self {
            StoreError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            StoreError::ConnectionTimeout => Some(1000),
            StoreError::ConfirmationTimeout { .. } => Some(2000),
            _ => None,
        }
    }

    /// Categorize the error for logging.
    pub fn category(&self) -> ErrorCategory {
        match self {
            StoreError::Rpc(_) | StoreError::RateLimited { .. } | StoreError::ConnectionTimeout => {
                ErrorCategory::Network
            }

            StoreError::ConfirmationTimeout { .. }
            | StoreError::TransactionRejected { .. }
            | StoreError::TransactionFailed { .. }
            | StoreError::AccountCollision { .. } => ErrorCategory::Transaction,

            StoreError::SequenceNotInitialized => ErrorCategory::Sequence,

            StoreError::MissingSignerKey | StoreError::SignerError(_) => ErrorCategory::Signer,

            StoreError::Codec(_) | StoreError::Address(_) => ErrorCategory::Codec,

            StoreError::InvalidConfig { .. } => ErrorCategory::Config,

            StoreError::InvalidInput(_) => ErrorCategory::Validation,

            StoreError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Create a transaction failed error from extracted log messages.
    pub fn transaction_failed(signature: impl ToString, messages: Vec<String>) -> Self {
        StoreError::TransactionFailed {
            signature: signature.to_string(),
            messages,
        }
    }
}

/// Error category for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (RPC, rate limiting, timeouts)
    Network,
    /// Transaction-related errors (rejection, confirmation, collisions)
    Transaction,
    /// Record index not primed
    Sequence,
    /// Signer not ready or refused to sign
    Signer,
    /// Malformed record bytes or seeds
    Codec,
    /// Configuration errors
    Config,
    /// Input validation errors
    Validation,
    /// Internal errors (unexpected failures)
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Transaction => write!(f, "transaction"),
            ErrorCategory::Sequence => write!(f, "sequence"),
            ErrorCategory::Signer => write!(f, "signer"),
            ErrorCategory::Codec => write!(f, "codec"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Internal => write!(f, "internal"),
        }
    }
}

/// Result type alias for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;
