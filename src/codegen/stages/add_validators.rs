//! Attaches an admission validator to every resource
//!
//! Resources that can reach a `ResourceReference` get a rule checking each
//! reference on create and update. Every resource gets an implementation,
//! even one without rules, so hand-written overrides are always consulted.

use crate::astmodel::{
    resource_reference_type_name, Type, TypeDefinition, TypeName, Types, ValidationFunction,
    ValidationKind, ValidatorBuilder,
};
use crate::codegen::PipelineStage;
use crate::error::{aggregate, Result};
use std::collections::HashSet;
use tracing::debug;

pub const ADD_VALIDATORS: &str = "addValidators";

pub fn add_validators(group_suffix: String) -> PipelineStage {
    PipelineStage::new(
        ADD_VALIDATORS,
        "Adds admission validators to resources",
        move |types| {
            let mut result = types.clone();
            let mut errs = Vec::new();
            for def in types.resources() {
                match with_validator(def, &types, &group_suffix) {
                    Ok(updated) => result.add_or_replace(updated),
                    Err(e) => errs.push(e),
                }
            }
            aggregate(errs)?;
            Ok(result)
        },
    )
}

fn with_validator(def: &TypeDefinition, types: &Types, group_suffix: &str) -> Result<TypeDefinition> {
    let mut builder = ValidatorBuilder::new(def.name.clone());
    let mut updated = def.clone();

    if reaches_resource_reference(types, &def.ty)? {
        let validation =
            ValidationFunction::validate_resource_references(def.name.clone(), spec_field(types, def)?);
        builder.add_validation(ValidationKind::Create, validation.clone());
        builder.add_validation(ValidationKind::Update, validation.clone());
        updated = updated.with_function(validation.into());
    }

    let validator = builder.to_implementation(group_suffix)?;
    debug!(
        resource = %def.name,
        rules = validator.rule_count(),
        webhook = %validator.webhook().path,
        "attached validator"
    );
    Ok(updated.with_validator(validator))
}

/// Whether any `ResourceReference` is reachable from `ty`, following local
/// names through their definitions
fn reaches_resource_reference(types: &Types, ty: &Type) -> Result<bool> {
    let target = resource_reference_type_name();
    let mut pending: Vec<TypeName> = ty.references().into_iter().cloned().collect();
    let mut seen = HashSet::new();
    while let Some(name) = pending.pop() {
        if name == target {
            return Ok(true);
        }
        if !name.package.is_local() || !seen.insert(name.clone()) {
            continue;
        }
        pending.extend(types.lookup(&name)?.ty.references().into_iter().cloned());
    }
    Ok(false)
}

/// References are looked for under the resource's spec when it has one
fn spec_field(types: &Types, def: &TypeDefinition) -> Result<Option<String>> {
    Ok(types
        .resolve(&def.ty)?
        .as_object()
        .and_then(|object| {
            object
                .properties()
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case("spec"))
        })
        .map(|p| p.name.clone()))
}
