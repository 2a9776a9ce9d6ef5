//! The `Dodo` to-do record and its account layout.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use solana_program::pubkey::Pubkey;

use crate::{
    address::SeedNamespace,
    codec::{Field, FieldType, FieldValues, Schema},
    error::{CodecError, CodecResult},
    instruction::DodoInstruction,
    record::RecordLayout,
};

pub const DODO_SEED: SeedNamespace = SeedNamespace::new("DODO");

pub const TITLE_CHARS: usize = 31;
pub const TAGLINE_CHARS: usize = 6;

pub const FIELD_TITLE: &str = "title";
pub const FIELD_TAGLINE: &str = "tagline";
pub const FIELD_STATE: &str = "state";
pub const FIELD_CREATE_TIME: &str = "create_time";
pub const FIELD_UPDATE_TIME: &str = "update_time";
pub const FIELD_CREATOR: &str = "creator";

/// On-chain account layout (197 bytes).
pub const DODO_ACCOUNT_SCHEMA: Schema = Schema::new(&[
    Field::new(FIELD_TITLE, FieldType::Chars(TITLE_CHARS)),
    Field::new(FIELD_TAGLINE, FieldType::Chars(TAGLINE_CHARS)),
    Field::new(FIELD_STATE, FieldType::U8),
    Field::new(FIELD_CREATE_TIME, FieldType::U64),
    Field::new(FIELD_UPDATE_TIME, FieldType::U64),
    Field::new(FIELD_CREATOR, FieldType::Bytes(32)),
]);

/// CREATE body: the account layout minus `creator`, which the program takes
/// from the signing account.
pub const DODO_CREATE_SCHEMA: Schema = Schema::new(&[
    Field::new(FIELD_TITLE, FieldType::Chars(TITLE_CHARS)),
    Field::new(FIELD_TAGLINE, FieldType::Chars(TAGLINE_CHARS)),
    Field::new(FIELD_STATE, FieldType::U8),
    Field::new(FIELD_CREATE_TIME, FieldType::U64),
    Field::new(FIELD_UPDATE_TIME, FieldType::U64),
]);

/// UPDATE body.
pub const DODO_UPDATE_SCHEMA: Schema = Schema::new(&[
    Field::new(FIELD_STATE, FieldType::U8),
    Field::new(FIELD_UPDATE_TIME, FieldType::U64),
]);

pub const DODO_SIZE: usize = DODO_ACCOUNT_SCHEMA.width();

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum DodoState {
    #[default]
    Todo = 0,
    InProgress = 1,
    Completed = 2,
}

impl DodoState {
    pub fn from_field(field: &'static str, value: u64) -> CodecResult<Self> {
        DodoState::from_u64(value)
            .ok_or_else(|| CodecError::decoding(field, format!("unknown dodo state {}", value)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dodo {
    pub title: String,
    pub tagline: String,
    pub state: DodoState,
    pub create_time: u64,
    pub update_time: u64,
    /// Filled in by the program on create; ignored when sending a new record.
    pub creator: Pubkey,
}

impl Dodo {
    /// A fresh `Todo` record stamped at `now` (unix seconds).
    pub fn new(title: impl Into<String>, tagline: impl Into<String>, now: u64) -> Self {
        Self {
            title: title.into(),
            tagline: tagline.into(),
            state: DodoState::Todo,
            create_time: now,
            update_time: now,
            creator: Pubkey::default(),
        }
    }

    pub fn to_fields(&self) -> FieldValues {
        FieldValues::new()
            .with(FIELD_TITLE, self.title.as_str())
            .with(FIELD_TAGLINE, self.tagline.as_str())
            .with(FIELD_STATE, self.state as u8)
            .with(FIELD_CREATE_TIME, self.create_time)
            .with(FIELD_UPDATE_TIME, self.update_time)
            .with(FIELD_CREATOR, self.creator.to_bytes())
    }
}

/// Mutable fields of a [`Dodo`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DodoUpdate {
    pub state: DodoState,
    pub update_time: u64,
}

pub(crate) fn required_text(fields: &FieldValues, name: &'static str) -> CodecResult<String> {
    fields
        .text(name)
        .map(str::to_string)
        .ok_or_else(|| CodecError::decoding(name, "missing text field"))
}

pub(crate) fn required_uint(fields: &FieldValues, name: &'static str) -> CodecResult<u64> {
    fields
        .uint(name)
        .ok_or_else(|| CodecError::decoding(name, "missing integer field"))
}

impl RecordLayout for Dodo {
    type Update = DodoUpdate;

    const NAMESPACE: SeedNamespace = DODO_SEED;
    const ACCOUNT_SCHEMA: Schema = DODO_ACCOUNT_SCHEMA;

    fn from_fields(fields: &FieldValues) -> CodecResult<Self> {
        let creator = fields
            .bytes(FIELD_CREATOR)
            .and_then(|b| <[u8; 32]>::try_from(b).ok())
            .map(Pubkey::new_from_array)
            .ok_or_else(|| CodecError::decoding(FIELD_CREATOR, "expected 32 bytes"))?;

        Ok(Self {
            title: required_text(fields, FIELD_TITLE)?,
            tagline: required_text(fields, FIELD_TAGLINE)?,
            state: DodoState::from_field(FIELD_STATE, required_uint(fields, FIELD_STATE)?)?,
            create_time: required_uint(fields, FIELD_CREATE_TIME)?,
            update_time: required_uint(fields, FIELD_UPDATE_TIME)?,
            creator,
        })
    }

    fn create_payload(&self) -> CodecResult<Vec<u8>> {
        DodoInstruction::Create {
            title: self.title.clone(),
            tagline: self.tagline.clone(),
            state: self.state,
            create_time: self.create_time,
            update_time: self.update_time,
        }
        .pack()
    }

    fn update_payload(update: &DodoUpdate) -> CodecResult<Vec<u8>> {
        DodoInstruction::Update {
            state: update.state,
            update_time: update.update_time,
        }
        .pack()
    }

    fn remove_payload() -> CodecResult<Vec<u8>> {
        DodoInstruction::Remove.pack()
    }
}
