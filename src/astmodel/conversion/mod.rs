//! Conversion synthesis between versions of a type
//!
//! [`ConversionFactories`] decides how a single value is copied between two
//! shapes. [`PropertyAssignmentFunction`] applies it to every property two
//! object types share. The [`eval`] interpreter runs the result.

mod endpoint;
pub mod eval;
mod factories;
mod property_assignment;

pub use endpoint::StorageConversionEndpoint;
pub use eval::{apply_conversion, Evaluator};
pub use factories::{ConversionFactories, ConversionFactory, TypeConversion};
pub use property_assignment::{
    ConversionDirection, PropertyAssignment, PropertyAssignmentFunction, RECEIVER,
};
