pub mod address;
pub mod codec;
pub mod dodo;
pub mod error;
pub mod instruction;
pub mod record;

pub use address::{derive_address, seed_for, SeedNamespace};
pub use codec::{decode, encode, fixed_size_char_array, tag_and_encode, Field, FieldType, FieldValue, FieldValues, Schema};
pub use dodo::{Dodo, DodoState, DodoUpdate};
pub use error::{AddressError, CodecError, CodecResult};
pub use instruction::DodoInstruction;
pub use record::RecordLayout;
