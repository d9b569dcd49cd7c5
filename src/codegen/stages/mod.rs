//! The stages of the default pipeline

mod add_validators;
mod create_storage_conversions;
mod fix_optional_alias_references;
mod validate_type_references;

pub use add_validators::{add_validators, ADD_VALIDATORS};
pub use create_storage_conversions::{create_storage_conversions, CREATE_STORAGE_CONVERSIONS};
pub use fix_optional_alias_references::{
    fix_optional_alias_references, FIX_OPTIONAL_ALIAS_REFERENCES,
};
pub use validate_type_references::{validate_type_references, VALIDATE_TYPE_REFERENCES};
