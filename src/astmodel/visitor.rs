//! Recursive rewriting of types
//!
//! A [`TypeVisitor`] rebuilds a type bottom-up. Each variant has an optional
//! hook; without one the visitor recurses into the children and reassembles
//! the parent. Hooks receive the visitor itself so they can fall back to the
//! structural default for the parts they don't care about.
//!
//! `Name` variants are leaves: the visitor never follows them into the
//! [`Types`] collection. Callers that need the aliased type look it up
//! themselves, which keeps visits local and lets them terminate on
//! mutually recursive definitions.

use super::{ObjectType, PrimitiveKind, Type, TypeDefinition, TypeName, Types};
use crate::error::{aggregate, Result};

type Hook<'a, T, C> = Box<dyn Fn(&TypeVisitor<'a, C>, &T, &C) -> Result<Type> + 'a>;
type MapHook<'a, C> = Box<dyn Fn(&TypeVisitor<'a, C>, &Type, &Type, &C) -> Result<Type> + 'a>;

/// Rewrites types, with per-variant overrides
pub struct TypeVisitor<'a, C = ()> {
    primitive: Option<Hook<'a, PrimitiveKind, C>>,
    object: Option<Hook<'a, ObjectType, C>>,
    optional: Option<Hook<'a, Type, C>>,
    array: Option<Hook<'a, Type, C>>,
    map: Option<MapHook<'a, C>>,
    name: Option<Hook<'a, TypeName, C>>,
}

impl<C> Default for TypeVisitor<'_, C> {
    fn default() -> Self {
        Self {
            primitive: None,
            object: None,
            optional: None,
            array: None,
            map: None,
            name: None,
        }
    }
}

impl<'a, C> TypeVisitor<'a, C> {
    /// Identity visitor; override variants with the `on_*` builders
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_primitive(
        mut self,
        f: impl Fn(&TypeVisitor<'a, C>, &PrimitiveKind, &C) -> Result<Type> + 'a,
    ) -> Self {
        self.primitive = Some(Box::new(f));
        self
    }

    pub fn on_object(
        mut self,
        f: impl Fn(&TypeVisitor<'a, C>, &ObjectType, &C) -> Result<Type> + 'a,
    ) -> Self {
        self.object = Some(Box::new(f));
        self
    }

    /// Hook receives the element type of the optional
    pub fn on_optional(
        mut self,
        f: impl Fn(&TypeVisitor<'a, C>, &Type, &C) -> Result<Type> + 'a,
    ) -> Self {
        self.optional = Some(Box::new(f));
        self
    }

    /// Hook receives the element type of the array
    pub fn on_array(
        mut self,
        f: impl Fn(&TypeVisitor<'a, C>, &Type, &C) -> Result<Type> + 'a,
    ) -> Self {
        self.array = Some(Box::new(f));
        self
    }

    pub fn on_map(
        mut self,
        f: impl Fn(&TypeVisitor<'a, C>, &Type, &Type, &C) -> Result<Type> + 'a,
    ) -> Self {
        self.map = Some(Box::new(f));
        self
    }

    pub fn on_name(
        mut self,
        f: impl Fn(&TypeVisitor<'a, C>, &TypeName, &C) -> Result<Type> + 'a,
    ) -> Self {
        self.name = Some(Box::new(f));
        self
    }

    /// Visit a type, dispatching to the hook for its variant
    pub fn visit(&self, ty: &Type, ctx: &C) -> Result<Type> {
        match ty {
            Type::Primitive(kind) => match &self.primitive {
                Some(f) => f(self, kind, ctx),
                None => Ok(Type::Primitive(*kind)),
            },
            Type::Object(object) => match &self.object {
                Some(f) => f(self, object, ctx),
                None => self.visit_object_default(object, ctx),
            },
            Type::Optional(element) => match &self.optional {
                Some(f) => f(self, element, ctx),
                None => self.visit_optional_default(element, ctx),
            },
            Type::Array(element) => match &self.array {
                Some(f) => f(self, element, ctx),
                None => self.visit_array_default(element, ctx),
            },
            Type::Map { key, value } => match &self.map {
                Some(f) => f(self, key, value, ctx),
                None => self.visit_map_default(key, value, ctx),
            },
            Type::Name(name) => match &self.name {
                Some(f) => f(self, name, ctx),
                None => Ok(Type::Name(name.clone())),
            },
        }
    }

    /// Visit every property type and rebuild the object
    pub fn visit_object_default(&self, object: &ObjectType, ctx: &C) -> Result<Type> {
        let mut properties = Vec::with_capacity(object.len());
        for prop in object.properties() {
            let visited = self.visit(&prop.property_type, ctx)?;
            properties.push(prop.with_type(visited));
        }
        Ok(Type::Object(ObjectType::from_properties(properties)))
    }

    pub fn visit_optional_default(&self, element: &Type, ctx: &C) -> Result<Type> {
        Ok(Type::optional(self.visit(element, ctx)?))
    }

    pub fn visit_array_default(&self, element: &Type, ctx: &C) -> Result<Type> {
        Ok(Type::array(self.visit(element, ctx)?))
    }

    pub fn visit_map_default(&self, key: &Type, value: &Type, ctx: &C) -> Result<Type> {
        Ok(Type::map(self.visit(key, ctx)?, self.visit(value, ctx)?))
    }

    /// Visit the type of a definition, keeping its attachments
    pub fn visit_definition(&self, definition: &TypeDefinition, ctx: &C) -> Result<TypeDefinition> {
        let ty = self.visit(&definition.ty, ctx)?;
        Ok(definition.with_type(ty))
    }

    /// Visit every definition, collecting one error per failing definition
    pub fn visit_types(&self, types: &Types, ctx: &C) -> Result<Types> {
        let mut result = Types::new();
        let mut errs = Vec::new();
        for def in types {
            match self.visit_definition(def, ctx) {
                Ok(visited) => result.add_or_replace(visited),
                Err(e) => errs.push(e),
            }
        }
        aggregate(errs)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astmodel::PropertyDefinition;
    use crate::error::Error;

    fn sample() -> Type {
        Type::Object(ObjectType::from_properties([
            PropertyDefinition::required("name", Type::string()),
            PropertyDefinition::new("tags", Type::optional(Type::map(Type::string(), Type::int()))),
            PropertyDefinition::new("items", Type::array(Type::int())),
        ]))
    }

    #[test]
    fn test_identity_visit_preserves_shape() {
        let visitor: TypeVisitor = TypeVisitor::new();
        let ty = sample();
        assert_eq!(visitor.visit(&ty, &()).unwrap(), ty);
    }

    #[test]
    fn test_primitive_hook_applies_everywhere() {
        let visitor: TypeVisitor = TypeVisitor::new().on_primitive(|_, kind, _| {
            Ok(match kind {
                PrimitiveKind::Int => Type::Primitive(PrimitiveKind::UInt64),
                other => Type::Primitive(*other),
            })
        });
        let visited = visitor.visit(&sample(), &()).unwrap();
        let object = visited.as_object().unwrap();
        assert_eq!(
            object.property("items").unwrap().property_type,
            Type::array(Type::Primitive(PrimitiveKind::UInt64))
        );
        assert_eq!(
            object.property("tags").unwrap().property_type,
            Type::optional(Type::map(
                Type::string(),
                Type::Primitive(PrimitiveKind::UInt64)
            ))
        );
    }

    #[test]
    fn test_names_are_not_followed() {
        let target = TypeName::local("g", "v1", "Self");
        let visitor: TypeVisitor = TypeVisitor::new();
        let ty = Type::array(Type::Name(target.clone()));
        // no Types collection involved; a self reference cannot loop
        assert_eq!(visitor.visit(&ty, &()).unwrap(), ty);
    }

    #[test]
    fn test_context_is_passed_through() {
        let visitor: TypeVisitor<String> = TypeVisitor::new().on_name(|_, name, suffix| {
            Ok(Type::Name(TypeName::new(
                name.package.clone(),
                format!("{}{}", name.name, suffix),
            )))
        });
        let ty = Type::optional(Type::Name(TypeName::local("g", "v1", "Thing")));
        let visited = visitor.visit(&ty, &"Spec".to_string()).unwrap();
        assert_eq!(
            visited,
            Type::optional(Type::Name(TypeName::local("g", "v1", "ThingSpec")))
        );
    }

    #[test]
    fn test_visit_types_aggregates_errors() {
        let types = Types::from_definitions([
            TypeDefinition::new(TypeName::local("g", "v1", "A"), Type::string()),
            TypeDefinition::new(TypeName::local("g", "v1", "B"), Type::int()),
            TypeDefinition::new(TypeName::local("g", "v1", "C"), Type::bool()),
        ])
        .unwrap();
        let visitor: TypeVisitor = TypeVisitor::new().on_primitive(|_, kind, _| match kind {
            PrimitiveKind::Bool => Ok(Type::bool()),
            other => Err(Error::Other(format!("unsupported {}", other))),
        });

        let err = visitor.visit_types(&types, &()).unwrap_err();
        assert_eq!(err.failure_count(), 2);
    }
}
