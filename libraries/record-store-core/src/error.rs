//! Error types

use solana_program::pubkey::PubkeyError;
use thiserror::Error;

/// Errors raised while turning records into account bytes and back.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum CodecError {
    /// A value could not be written into its declared field width
    #[error("Cannot encode field `{field}`: {reason}")]
    Encoding { field: &'static str, reason: String },
    /// Account or instruction bytes do not match the schema
    #[error("Cannot decode field `{field}`: {reason}")]
    Decoding { field: &'static str, reason: String },
}

impl CodecError {
    pub fn encoding(field: &'static str, reason: impl Into<String>) -> Self {
        CodecError::Encoding {
            field,
            reason: reason.into(),
        }
    }

    pub fn decoding(field: &'static str, reason: impl Into<String>) -> Self {
        CodecError::Decoding {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised by seeded address derivation.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AddressError {
    #[error("Seed `{seed}` is {len} bytes, the maximum is {max}")]
    SeedTooLong { seed: String, len: usize, max: usize },
    #[error("Address derivation failed: {0}")]
    Derivation(#[from] PubkeyError),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
