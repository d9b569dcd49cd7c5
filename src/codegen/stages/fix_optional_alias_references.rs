//! Makes optional references to array and map aliases required
//!
//! Containers already have a natural empty state, so an optional layer on
//! top of one is redundant and has no conversion. This can't be handled
//! when the optional type itself is built because it needs the alias
//! resolved first.

use crate::astmodel::{ObjectType, PropertyDefinition, Type, TypeName, TypeVisitor, Types};
use crate::codegen::PipelineStage;
use crate::error::{aggregate, Result};
use tracing::debug;

pub const FIX_OPTIONAL_ALIAS_REFERENCES: &str = "fixOptionalAliasReferences";

pub fn fix_optional_alias_references() -> PipelineStage {
    PipelineStage::new(
        FIX_OPTIONAL_ALIAS_REFERENCES,
        "Makes optional references to array and map aliases required",
        |types| {
            let visitor: TypeVisitor<'_, Types> =
                TypeVisitor::new().on_object(|this, object, types| {
                    let fixed = fix_optional_alias_properties(types, object)?;
                    this.visit_object_default(&fixed, types)
                });
            visitor.visit_types(&types, &types)
        },
    )
}

fn fix_optional_alias_properties(types: &Types, object: &ObjectType) -> Result<ObjectType> {
    let mut properties = Vec::with_capacity(object.len());
    let mut errs = Vec::new();
    for prop in object.properties() {
        match fix_property(types, prop) {
            Ok(fixed) => properties.push(fixed),
            Err(e) => errs.push(e),
        }
    }
    aggregate(errs)?;
    Ok(ObjectType::from_properties(properties))
}

fn fix_property(types: &Types, prop: &PropertyDefinition) -> Result<PropertyDefinition> {
    let name = match &prop.property_type {
        Type::Optional(element) => match element.as_ref() {
            Type::Name(name) => name,
            _ => return Ok(prop.clone()),
        },
        Type::Name(name) if !prop.required => name,
        _ => return Ok(prop.clone()),
    };

    if !is_alias_to_container(types, name)? {
        return Ok(prop.clone());
    }

    debug!(property = %prop.name, alias = %name, "making container alias property required");
    Ok(PropertyDefinition {
        property_type: Type::Name(name.clone()),
        required: true,
        ..prop.clone()
    })
}

fn is_alias_to_container(types: &Types, name: &TypeName) -> Result<bool> {
    // external names can't be looked up
    if !name.package.is_local() {
        return Ok(false);
    }
    let aliased = Type::Name(name.clone());
    Ok(matches!(
        types.resolve(&aliased)?,
        Type::Array(_) | Type::Map { .. }
    ))
}
