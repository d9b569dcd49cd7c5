//! Generated procedures attached to type definitions

use super::conversion::PropertyAssignmentFunction;
use super::validators::ValidationFunction;
use serde::{Deserialize, Serialize};

/// A method generated for a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Function {
    PropertyAssignment(PropertyAssignmentFunction),
    Validation(ValidationFunction),
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Function::PropertyAssignment(f) => f.name(),
            Function::Validation(f) => f.name(),
        }
    }

    pub fn as_property_assignment(&self) -> Option<&PropertyAssignmentFunction> {
        match self {
            Function::PropertyAssignment(f) => Some(f),
            Function::Validation(_) => None,
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationFunction> {
        match self {
            Function::Validation(f) => Some(f),
            Function::PropertyAssignment(_) => None,
        }
    }
}

impl From<PropertyAssignmentFunction> for Function {
    fn from(f: PropertyAssignmentFunction) -> Self {
        Function::PropertyAssignment(f)
    }
}

impl From<ValidationFunction> for Function {
    fn from(f: ValidationFunction) -> Self {
        Function::Validation(f)
    }
}
