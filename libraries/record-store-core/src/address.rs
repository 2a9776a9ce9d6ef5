//! Seeded account addresses.
//!
//! Record accounts live at `create_with_seed(owner, "<NAMESPACE>__<index>", program_id)`,
//! so any client can recompute them offline.

use solana_program::pubkey::{Pubkey, MAX_SEED_LEN};

use crate::error::AddressError;

/// Derive the account address for `seed` under `owner` and `program_id`.
pub fn derive_address(owner: &Pubkey, program_id: &Pubkey, seed: &str) -> Result<Pubkey, AddressError> {
    if seed.len() > MAX_SEED_LEN {
        return Err(AddressError::SeedTooLong {
            seed: seed.to_string(),
            len: seed.len(),
            max: MAX_SEED_LEN,
        });
    }
    Ok(Pubkey::create_with_seed(owner, seed, program_id)?)
}

/// Seed string for the record at `index`.
pub fn seed_for(namespace: &str, index: u64) -> String {
    format!("{}__{}", namespace, index)
}

/// Seed namespace of one record type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeedNamespace(&'static str);

impl SeedNamespace {
    pub const fn new(namespace: &'static str) -> Self {
        Self(namespace)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn seed(&self, index: u64) -> String {
        seed_for(self.0, index)
    }

    pub fn address(&self, owner: &Pubkey, program_id: &Pubkey, index: u64) -> Result<Pubkey, AddressError> {
        derive_address(owner, program_id, &self.seed(index))
    }
}
