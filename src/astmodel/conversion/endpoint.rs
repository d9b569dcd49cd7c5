//! One side of a storage conversion

use crate::ast::KnownLocals;
use crate::astmodel::Type;
use crate::util::{singularize, to_snake_case};
use std::fmt;

/// The reader or writer side of a conversion.
///
/// Carries the type being converted plus the name of the property it came
/// from; the name seeds readable local variables in generated code.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConversionEndpoint {
    name: String,
    ty: Type,
}

impl StorageConversionEndpoint {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Same endpoint looking at a nested type, such as an array element
    pub fn with_type(&self, ty: Type) -> Self {
        Self {
            name: self.name.clone(),
            ty,
        }
    }

    /// A local for one element: `tags` -> `tag`
    pub fn create_singular_local(&self, locals: &mut KnownLocals) -> String {
        locals.create_local(&self.base())
    }

    /// A local for a whole collection: `tags` + `list` -> `tag_list`
    pub fn create_plural_local(&self, suffix: &str, locals: &mut KnownLocals) -> String {
        locals.create_local(&format!("{}_{}", self.base(), to_snake_case(suffix)))
    }

    fn base(&self) -> String {
        let base = to_snake_case(&singularize(&self.name));
        if base.is_empty() {
            "item".to_string()
        } else {
            base
        }
    }
}

impl fmt::Display for StorageConversionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ty)
    }
}
