//! Type variants of the model
//!
//! Every value here is immutable in spirit: the `with_*` helpers return new
//! values and leave the receiver untouched.

use super::TypeName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in scalar kinds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    Int,
    Float,
    #[serde(rename = "uint32")]
    UInt32,
    #[serde(rename = "uint64")]
    UInt64,
    Bool,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 6] = [
        PrimitiveKind::String,
        PrimitiveKind::Int,
        PrimitiveKind::Float,
        PrimitiveKind::UInt32,
        PrimitiveKind::UInt64,
        PrimitiveKind::Bool,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::UInt32 => "uint32",
            PrimitiveKind::UInt64 => "uint64",
            PrimitiveKind::Bool => "bool",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type in the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TypeRepr", into = "TypeRepr")]
pub enum Type {
    Primitive(PrimitiveKind),
    Object(ObjectType),
    Optional(Box<Type>),
    Array(Box<Type>),
    Map { key: Box<Type>, value: Box<Type> },
    Name(TypeName),
}

impl Type {
    pub fn optional(element: Type) -> Self {
        Type::Optional(Box::new(element))
    }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn string() -> Self {
        Type::Primitive(PrimitiveKind::String)
    }

    pub fn int() -> Self {
        Type::Primitive(PrimitiveKind::Int)
    }

    pub fn bool() -> Self {
        Type::Primitive(PrimitiveKind::Bool)
    }

    /// Primitive kind of this type, looking through one optional layer
    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(kind) => Some(*kind),
            Type::Optional(inner) => match inner.as_ref() {
                Type::Primitive(kind) => Some(*kind),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Type::Optional(_))
    }

    pub fn as_optional(&self) -> Option<&Type> {
        match self {
            Type::Optional(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<(&Type, &Type)> {
        match self {
            Type::Map { key, value } => Some((key, value)),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Type::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&TypeName> {
        match self {
            Type::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Every type name this type mentions, in declaration order
    pub fn references(&self) -> Vec<&TypeName> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a TypeName>) {
        match self {
            Type::Primitive(_) => {}
            Type::Object(object) => {
                for prop in object.properties() {
                    prop.property_type.collect_references(out);
                }
            }
            Type::Optional(inner) | Type::Array(inner) => inner.collect_references(out),
            Type::Map { key, value } => {
                key.collect_references(out);
                value.collect_references(out);
            }
            Type::Name(name) => out.push(name),
        }
    }
}

/// Serialized form of [`Type`]. Wrapping variants are maps so that YAML
/// never needs two tags on one node.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TypeRepr {
    Primitive(PrimitiveKind),
    Object(ObjectType),
    Optional { element: Box<Type> },
    Array { element: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    Name(TypeName),
}

impl From<TypeRepr> for Type {
    fn from(repr: TypeRepr) -> Self {
        match repr {
            TypeRepr::Primitive(kind) => Type::Primitive(kind),
            TypeRepr::Object(object) => Type::Object(object),
            TypeRepr::Optional { element } => Type::Optional(element),
            TypeRepr::Array { element } => Type::Array(element),
            TypeRepr::Map { key, value } => Type::Map { key, value },
            TypeRepr::Name(name) => Type::Name(name),
        }
    }
}

impl From<Type> for TypeRepr {
    fn from(ty: Type) -> Self {
        match ty {
            Type::Primitive(kind) => TypeRepr::Primitive(kind),
            Type::Object(object) => TypeRepr::Object(object),
            Type::Optional(element) => TypeRepr::Optional { element },
            Type::Array(element) => TypeRepr::Array { element },
            Type::Map { key, value } => TypeRepr::Map { key, value },
            Type::Name(name) => TypeRepr::Name(name),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => write!(f, "{}", kind),
            Type::Object(object) => write!(f, "object({} properties)", object.len()),
            Type::Optional(inner) => write!(f, "*{}", inner),
            Type::Array(element) => write!(f, "[]{}", element),
            Type::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Type::Name(name) => write!(f, "{}", name),
        }
    }
}

/// A single property on an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub property_type: Type,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyDefinition {
    /// Non-required property with the type used as declared
    pub fn new(name: impl Into<String>, property_type: Type) -> Self {
        Self {
            name: name.into(),
            property_type,
            required: false,
            description: None,
        }
    }

    /// Required property with the type used as declared
    pub fn required(name: impl Into<String>, property_type: Type) -> Self {
        Self {
            required: true,
            ..Self::new(name, property_type)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_type(&self, property_type: Type) -> Self {
        Self {
            property_type,
            ..self.clone()
        }
    }

    /// Required copy of this property, stripping one optional layer from the type
    pub fn make_required(&self) -> Self {
        let property_type = match &self.property_type {
            Type::Optional(inner) => inner.as_ref().clone(),
            other => other.clone(),
        };
        Self {
            property_type,
            required: true,
            ..self.clone()
        }
    }
}

/// An object: an ordered set of uniquely named properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ObjectRepr")]
pub struct ObjectType {
    #[serde(default)]
    properties: Vec<PropertyDefinition>,
}

#[derive(Deserialize)]
struct ObjectRepr {
    #[serde(default)]
    properties: Vec<PropertyDefinition>,
}

impl TryFrom<ObjectRepr> for ObjectType {
    type Error = String;

    fn try_from(repr: ObjectRepr) -> Result<Self, Self::Error> {
        let mut seen = std::collections::HashSet::new();
        for property in &repr.properties {
            if !seen.insert(property.name.as_str()) {
                return Err(format!("duplicate property {:?} in object", property.name));
            }
        }
        Ok(Self {
            properties: repr.properties,
        })
    }
}

impl ObjectType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an object from properties; a later property replaces an
    /// earlier one with the same name.
    pub fn from_properties(properties: impl IntoIterator<Item = PropertyDefinition>) -> Self {
        Self::new().with_properties(properties)
    }

    pub fn properties(&self) -> &[PropertyDefinition] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Copy of this object with the property added or replaced in place
    pub fn with_property(&self, property: PropertyDefinition) -> Self {
        let mut properties = self.properties.clone();
        match properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => properties.push(property),
        }
        Self { properties }
    }

    pub fn with_properties(&self, properties: impl IntoIterator<Item = PropertyDefinition>) -> Self {
        properties
            .into_iter()
            .fold(self.clone(), |acc, p| acc.with_property(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_primitive_looks_through_optional() {
        assert_eq!(Type::string().as_primitive(), Some(PrimitiveKind::String));
        assert_eq!(
            Type::optional(Type::int()).as_primitive(),
            Some(PrimitiveKind::Int)
        );
        assert_eq!(Type::array(Type::int()).as_primitive(), None);
        assert_eq!(
            Type::optional(Type::optional(Type::int())).as_primitive(),
            None
        );
    }

    #[test]
    fn test_nested_wrappers_survive_yaml() {
        let ty = Type::optional(Type::array(Type::optional(Type::string())));
        let yaml = serde_norway::to_string(&ty).unwrap();
        let parsed: Type = serde_norway::from_str(&yaml).unwrap();
        assert_eq!(parsed, ty);
    }

    #[test]
    fn test_duplicate_property_names_rejected_on_load() {
        let object = ObjectType::from_properties([
            PropertyDefinition::new("first_prop", Type::string()),
            PropertyDefinition::new("second_prop", Type::int()),
        ]);
        let yaml = serde_norway::to_string(&object).unwrap();
        assert!(serde_norway::from_str::<ObjectType>(&yaml).is_ok());

        let duplicated = yaml.replace("second_prop", "first_prop");
        let err = serde_norway::from_str::<ObjectType>(&duplicated).unwrap_err();
        assert!(err.to_string().contains("duplicate property \"first_prop\""));
    }

    #[test]
    fn test_as_array_does_not_look_through_optional() {
        assert!(Type::array(Type::int()).as_array().is_some());
        assert!(Type::optional(Type::array(Type::int())).as_array().is_none());
    }

    #[test]
    fn test_object_property_names_are_unique() {
        let object = ObjectType::from_properties([
            PropertyDefinition::new("name", Type::string()),
            PropertyDefinition::new("count", Type::int()),
            PropertyDefinition::required("name", Type::bool()),
        ]);

        assert_eq!(object.len(), 2);
        let name = object.property("name").unwrap();
        assert_eq!(name.property_type, Type::bool());
        assert!(name.required);
        assert_eq!(object.properties()[0].name, "name");
    }

    #[test]
    fn test_make_required_strips_optional() {
        let prop = PropertyDefinition::new("tags", Type::optional(Type::string()));
        let required = prop.make_required();
        assert!(required.required);
        assert_eq!(required.property_type, Type::string());
        // original untouched
        assert!(!prop.required);
    }

    #[test]
    fn test_references_in_declaration_order() {
        let a = TypeName::local("g", "v1", "A");
        let b = TypeName::local("g", "v1", "B");
        let ty = Type::Object(ObjectType::from_properties([
            PropertyDefinition::new("a", Type::optional(Type::Name(a.clone()))),
            PropertyDefinition::new("b", Type::map(Type::string(), Type::Name(b.clone()))),
        ]));
        assert_eq!(ty.references(), vec![&a, &b]);
    }

    #[test]
    fn test_display() {
        let ty = Type::map(Type::string(), Type::array(Type::optional(Type::int())));
        assert_eq!(ty.to_string(), "map[string][]*int");
    }
}
