//! Named type definitions and the collection that owns them

use super::{Function, Type, TypeName, ValidatorImplementation};
use crate::error::{aggregate, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A named type, plus whatever generated procedures have been attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: TypeName,

    #[serde(rename = "type")]
    pub ty: Type,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Top-level resources get validators and storage conversions
    #[serde(default)]
    pub resource: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Function>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<ValidatorImplementation>,
}

impl TypeDefinition {
    pub fn new(name: TypeName, ty: Type) -> Self {
        Self {
            name,
            ty,
            description: None,
            resource: false,
            functions: Vec::new(),
            validator: None,
        }
    }

    pub fn as_resource(mut self) -> Self {
        self.resource = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Same definition with a new shape; attached procedures are kept
    pub fn with_type(&self, ty: Type) -> Self {
        Self {
            ty,
            ..self.clone()
        }
    }

    /// Attach a function, replacing any earlier one of the same name
    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.retain(|f| f.name() != function.name());
        self.functions.push(function);
        self
    }

    pub fn with_validator(mut self, validator: ValidatorImplementation) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name() == name)
    }
}

/// All known type definitions, keyed and iterated by name.
///
/// Iteration order is the `TypeName` ordering, so anything derived from a
/// walk over `Types` is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TypeDefinition>", into = "Vec<TypeDefinition>")]
pub struct Types {
    definitions: BTreeMap<TypeName, TypeDefinition>,
}

impl Types {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = TypeDefinition>) -> Result<Self> {
        let mut types = Self::new();
        for def in definitions {
            types.add(def)?;
        }
        Ok(types)
    }

    /// Add a definition; a second definition under the same name is an error
    pub fn add(&mut self, definition: TypeDefinition) -> Result<()> {
        if self.definitions.contains_key(&definition.name) {
            return Err(Error::DuplicateDefinition(definition.name));
        }
        self.definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn add_or_replace(&mut self, definition: TypeDefinition) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    pub fn get(&self, name: &TypeName) -> Option<&TypeDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.definitions.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &TypeName> {
        self.definitions.keys()
    }

    pub fn resources(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.iter().filter(|d| d.resource)
    }

    /// Look up the definition for a name that must exist
    pub fn lookup(&self, name: &TypeName) -> Result<&TypeDefinition> {
        self.get(name)
            .ok_or_else(|| Error::MissingDefinition(name.clone()))
    }

    /// Follow `Name` aliases until a non-name type is reached.
    ///
    /// Names in external packages are returned unresolved. A cycle of
    /// aliases that never reaches a concrete type is an error.
    pub fn resolve<'a>(&'a self, ty: &'a Type) -> Result<&'a Type> {
        let mut current = ty;
        let mut seen = HashSet::new();
        while let Type::Name(name) = current {
            if !name.package.is_local() {
                break;
            }
            if !seen.insert(name) {
                return Err(Error::Other(format!("alias cycle through {}", name)));
            }
            current = &self.lookup(name)?.ty;
        }
        Ok(current)
    }

    /// Every definition whose type mentions a name missing from this collection
    pub fn validate_references(&self) -> Result<()> {
        let mut errs = Vec::new();
        for def in self.iter() {
            for reference in def.ty.references() {
                if reference.package.is_local() && !self.contains(reference) {
                    errs.push(Error::DanglingReference {
                        from: def.name.clone(),
                        to: reference.clone(),
                    });
                }
            }
        }
        aggregate(errs)
    }

    /// Parse a YAML list of definitions
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Load a YAML model file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_norway::to_string(self)?)
    }

    /// Stable content hash of the whole model
    pub fn hash(&self) -> Result<String> {
        use sha2::{Digest, Sha256};
        let content = serde_json::to_string(self)?;
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        Ok(format!("sha256:{}", hex::encode(&hasher.finalize()[..8])))
    }
}

impl TryFrom<Vec<TypeDefinition>> for Types {
    type Error = String;

    fn try_from(definitions: Vec<TypeDefinition>) -> std::result::Result<Self, Self::Error> {
        Types::from_definitions(definitions).map_err(|e| e.to_string())
    }
}

impl From<Types> for Vec<TypeDefinition> {
    fn from(types: Types) -> Self {
        types.definitions.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a Types {
    type Item = &'a TypeDefinition;
    type IntoIter = std::collections::btree_map::Values<'a, TypeName, TypeDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.values()
    }
}
