// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # crdgen
//!
//! A type-model pipeline that turns cloud resource schemas into typed
//! resource definitions, storage conversions between API versions, and
//! admission validators.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crdgen::{generate, GeneratorConfig, Types};
//!
//! let types = Types::from_yaml(&std::fs::read_to_string("model.yaml")?)?;
//! let config = GeneratorConfig::from_file("crdgen.yaml".as_ref())?;
//! for (package, code) in generate(types, &config)? {
//!     std::fs::write(format!("{}.rs", package), code)?;
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Types ──► validateTypeReferences
//!       ──► fixOptionalAliasReferences
//!       ──► createStorageConversions   (ConversionFactories)
//!       ──► addValidators              (ValidatorBuilder)
//!       ──► render ──► Rust source per package
//! ```
//!
//! Generated code depends on [`genruntime`] for reference checking and
//! validator dispatch.

// Model
pub mod ast;
pub mod astmodel;
pub mod config;
pub mod error;
pub mod util;

// Operations
pub mod codegen;
pub mod format;
pub mod render;

// Support library for generated code
pub mod genruntime;

// Re-exports
pub use astmodel::conversion::{
    apply_conversion, ConversionDirection, ConversionFactories, Evaluator,
    PropertyAssignmentFunction, StorageConversionEndpoint, TypeConversion,
};
pub use astmodel::{
    Function, ObjectType, PackageReference, PrimitiveKind, PropertyDefinition, Type,
    TypeDefinition, TypeName, TypeVisitor, Types, ValidationKind, ValidatorBuilder,
    ValidatorImplementation,
};
pub use codegen::{generate, Pipeline, PipelineStage};
pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use format::{format_rust, FormatError};
pub use render::{render_all, render_package};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
