//! Runtime side of admission validation
//!
//! Generated resources implement [`Validator`]. Each generated dispatch
//! method gathers the generated rules for its phase, asks the
//! [`OverrideRegistry`] whether hand-written rules exist for the concrete
//! type, and runs the combined list through [`run_validations`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// A single rule violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid resource reference {reference}: {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("{rule}: {message}")]
    Rule { rule: String, message: String },
}

impl ValidationError {
    pub fn rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Rule {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// Every violation found by one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok` when empty
    pub fn into_result(self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        Self { errors: vec![err] }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "[{}]", messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

pub type ValidationResult = Result<(), ValidationErrors>;

/// A create or delete rule
pub type Validation<T> = fn(&T) -> ValidationResult;

/// An update rule; the second argument is the previous version
pub type UpdateValidation<T> = fn(&T, &T) -> ValidationResult;

/// Run every rule result and merge all failures, in order
pub fn run_validations<I>(results: I) -> ValidationResult
where
    I: IntoIterator<Item = ValidationResult>,
{
    let mut errors = Vec::new();
    for result in results {
        if let Err(errs) = result {
            errors.extend(errs.errors);
        }
    }
    ValidationErrors::new(errors).into_result()
}

/// Run the generated create rules plus any registered for `T` by hand
pub fn dispatch_create<T: 'static>(
    this: &T,
    mut validations: Vec<Validation<T>>,
    overrides: &OverrideRegistry,
) -> ValidationResult {
    if let Some(runtime_validator) = overrides.lookup::<T>() {
        validations.extend(runtime_validator.create_validations());
    }
    run_validations(validations.iter().map(|validation| validation(this)))
}

/// Run the generated update rules plus any registered for `T` by hand
pub fn dispatch_update<T: 'static>(
    this: &T,
    old: &T,
    mut validations: Vec<UpdateValidation<T>>,
    overrides: &OverrideRegistry,
) -> ValidationResult {
    if let Some(runtime_validator) = overrides.lookup::<T>() {
        validations.extend(runtime_validator.update_validations());
    }
    run_validations(validations.iter().map(|validation| validation(this, old)))
}

/// Run the generated delete rules plus any registered for `T` by hand
pub fn dispatch_delete<T: 'static>(
    this: &T,
    mut validations: Vec<Validation<T>>,
    overrides: &OverrideRegistry,
) -> ValidationResult {
    if let Some(runtime_validator) = overrides.lookup::<T>() {
        validations.extend(runtime_validator.delete_validations());
    }
    run_validations(validations.iter().map(|validation| validation(this)))
}

/// Generated admission validation for a resource
pub trait Validator: Sized + 'static {
    fn validate_create(&self, overrides: &OverrideRegistry) -> ValidationResult;
    fn validate_update(&self, old: &Self, overrides: &OverrideRegistry) -> ValidationResult;
    fn validate_delete(&self, overrides: &OverrideRegistry) -> ValidationResult;
}

/// Hand-written rules a resource contributes on top of the generated ones
pub trait ValidatorOverrides<T>: Send + Sync + 'static {
    fn create_validations(&self) -> Vec<Validation<T>> {
        Vec::new()
    }

    fn update_validations(&self) -> Vec<UpdateValidation<T>> {
        Vec::new()
    }

    fn delete_validations(&self) -> Vec<Validation<T>> {
        Vec::new()
    }
}

/// Hand-written overrides, keyed by the concrete resource type
#[derive(Default)]
pub struct OverrideRegistry {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl OverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register overrides for `T`, replacing any earlier registration
    pub fn register<T: 'static>(&mut self, overrides: impl ValidatorOverrides<T>) {
        let boxed: Box<dyn ValidatorOverrides<T>> = Box::new(overrides);
        self.entries.insert(TypeId::of::<T>(), Box::new(boxed));
    }

    /// Overrides for `T`, if the type has any
    pub fn lookup<T: 'static>(&self) -> Option<&dyn ValidatorOverrides<T>> {
        self.entries
            .get(&TypeId::of::<T>())?
            .downcast_ref::<Box<dyn ValidatorOverrides<T>>>()
            .map(|b| &**b)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for OverrideRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
