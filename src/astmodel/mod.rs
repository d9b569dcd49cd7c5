//! The type model
//!
//! Named definitions ([`Types`]), the shapes they describe ([`Type`]), and
//! the procedures later pipeline stages attach to them.

pub mod conversion;
mod definitions;
mod function;
mod type_name;
mod types;
pub mod validators;
mod visitor;

pub use definitions::{TypeDefinition, Types};
pub use function::Function;
pub use type_name::{
    compare_versions, resource_reference_type_name, PackageReference, TypeName, GENRUNTIME_PATH,
};
pub use types::{ObjectType, PrimitiveKind, PropertyDefinition, Type};
pub use validators::{
    ValidationFunction, ValidationKind, ValidationRule, ValidatorBuilder, ValidatorImplementation,
    WebhookRegistration,
};
pub use visitor::TypeVisitor;
