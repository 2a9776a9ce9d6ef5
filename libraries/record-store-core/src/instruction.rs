use crate::{
    codec::{self, FieldValues},
    dodo::{
        required_text, required_uint, DodoState, DODO_CREATE_SCHEMA, DODO_UPDATE_SCHEMA,
        FIELD_CREATE_TIME, FIELD_STATE, FIELD_TAGLINE, FIELD_TITLE, FIELD_UPDATE_TIME,
    },
    error::{CodecError, CodecResult},
};

// Instruction Discriminators
pub const DODO_INSTRUCTION_CREATE: u8 = 0;
pub const DODO_INSTRUCTION_UPDATE: u8 = 1;
pub const DODO_INSTRUCTION_REMOVE: u8 = 2;

/// Instruction data understood by the dodo program.
///
/// Wire format: one tag byte followed by the tag's body.
/// Accounts: `[owner (signer, writable), dodo account (writable)]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DodoInstruction {
    /// 0. Write the initial record into a freshly allocated account
    Create {
        title: String,
        tagline: String,
        state: DodoState,
        create_time: u64,
        update_time: u64,
    },
    /// 1. Change state and bump the update time
    Update { state: DodoState, update_time: u64 },
    /// 2. Close the account, returning its lamports to the owner
    Remove,
}

impl DodoInstruction {
    pub fn tag(&self) -> u8 {
        match self {
            DodoInstruction::Create { .. } => DODO_INSTRUCTION_CREATE,
            DodoInstruction::Update { .. } => DODO_INSTRUCTION_UPDATE,
            DodoInstruction::Remove => DODO_INSTRUCTION_REMOVE,
        }
    }

    pub fn pack(&self) -> CodecResult<Vec<u8>> {
        match self {
            DodoInstruction::Create {
                title,
                tagline,
                state,
                create_time,
                update_time,
            } => {
                let body = FieldValues::new()
                    .with(FIELD_TITLE, title.as_str())
                    .with(FIELD_TAGLINE, tagline.as_str())
                    .with(FIELD_STATE, *state as u8)
                    .with(FIELD_CREATE_TIME, *create_time)
                    .with(FIELD_UPDATE_TIME, *update_time);
                codec::tag_and_encode(self.tag(), Some((&DODO_CREATE_SCHEMA, &body)))
            }
            DodoInstruction::Update { state, update_time } => {
                let body = FieldValues::new()
                    .with(FIELD_STATE, *state as u8)
                    .with(FIELD_UPDATE_TIME, *update_time);
                codec::tag_and_encode(self.tag(), Some((&DODO_UPDATE_SCHEMA, &body)))
            }
            DodoInstruction::Remove => codec::tag_and_encode(self.tag(), None),
        }
    }

    pub fn unpack(data: &[u8]) -> CodecResult<Self> {
        let (&tag, rest) = data
            .split_first()
            .ok_or_else(|| CodecError::decoding("tag", "empty instruction data"))?;

        Ok(match tag {
            DODO_INSTRUCTION_CREATE => {
                let fields = codec::decode(&DODO_CREATE_SCHEMA, rest)?;
                DodoInstruction::Create {
                    title: required_text(&fields, FIELD_TITLE)?,
                    tagline: required_text(&fields, FIELD_TAGLINE)?,
                    state: DodoState::from_field(FIELD_STATE, required_uint(&fields, FIELD_STATE)?)?,
                    create_time: required_uint(&fields, FIELD_CREATE_TIME)?,
                    update_time: required_uint(&fields, FIELD_UPDATE_TIME)?,
                }
            }
            DODO_INSTRUCTION_UPDATE => {
                let fields = codec::decode(&DODO_UPDATE_SCHEMA, rest)?;
                DodoInstruction::Update {
                    state: DodoState::from_field(FIELD_STATE, required_uint(&fields, FIELD_STATE)?)?,
                    update_time: required_uint(&fields, FIELD_UPDATE_TIME)?,
                }
            }
            DODO_INSTRUCTION_REMOVE => DodoInstruction::Remove,
            other => {
                return Err(CodecError::decoding(
                    "tag",
                    format!("unknown instruction tag {}", other),
                ))
            }
        })
    }
}
