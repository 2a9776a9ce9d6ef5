use crate::{
    address::SeedNamespace,
    codec::{self, FieldValues, Schema},
    error::CodecResult,
};

/// A record type that lives in fixed-width, seed-addressed accounts.
///
/// Implementors describe the account layout and how to build the
/// create/update/remove instruction payloads the owning program expects.
pub trait RecordLayout: Sized + Clone + Send + Sync + 'static {
    /// Mutable subset of the record sent by an update.
    type Update: Send + Sync;

    /// Seed namespace used for `"<NAMESPACE>__<index>"` addresses.
    const NAMESPACE: SeedNamespace;

    /// Full account layout, as stored on-chain.
    const ACCOUNT_SCHEMA: Schema;

    /// Account size requested when allocating a new record.
    const ACCOUNT_WIDTH: usize = Self::ACCOUNT_SCHEMA.width();

    fn from_fields(fields: &FieldValues) -> CodecResult<Self>;

    fn create_payload(&self) -> CodecResult<Vec<u8>>;

    fn update_payload(update: &Self::Update) -> CodecResult<Vec<u8>>;

    fn remove_payload() -> CodecResult<Vec<u8>>;

    /// Decode raw account bytes.
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let fields = codec::decode(&Self::ACCOUNT_SCHEMA, bytes)?;
        Self::from_fields(&fields)
    }
}
