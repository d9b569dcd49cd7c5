//! Runtime support consumed by generated code
//!
//! Generated validators call [`find_resource_references`] and
//! [`validate_resource_references`], and dispatch through [`Validator`] and
//! [`OverrideRegistry`]. [`Value`] gives generated conversions something to
//! run against outside of compiled code.

mod references;
mod resource_reference;
mod validation;
mod value;

pub use references::{find_resource_references, validate_resource_references, FindResourceReferences};
pub use resource_reference::ResourceReference;
pub use validation::{
    dispatch_create, dispatch_delete, dispatch_update, run_validations, OverrideRegistry, UpdateValidation, Validation, ValidationError,
    ValidationErrors, ValidationResult, Validator, ValidatorOverrides,
};
pub use value::Value;
