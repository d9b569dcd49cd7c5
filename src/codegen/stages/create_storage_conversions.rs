//! Conversions between each resource version and the newest version of the
//! same resource

use crate::astmodel::conversion::{
    ConversionDirection, ConversionFactories, PropertyAssignmentFunction,
};
use crate::astmodel::{compare_versions, TypeDefinition, TypeName, Types};
use crate::codegen::PipelineStage;
use crate::error::{aggregate, Result};
use tracing::debug;

pub const CREATE_STORAGE_CONVERSIONS: &str = "createStorageConversions";

pub fn create_storage_conversions(factories: ConversionFactories) -> PipelineStage {
    PipelineStage::new(
        CREATE_STORAGE_CONVERSIONS,
        "Creates property assignment functions between resource versions",
        move |types| {
            let mut result = types.clone();
            let mut errs = Vec::new();
            for def in types.resources() {
                let Some(hub) = hub_for(&types, &def.name) else {
                    continue;
                };
                if hub.name == def.name {
                    continue;
                }

                match conversions_with(def, hub, &types, &factories) {
                    Ok(updated) => {
                        debug!(resource = %def.name, hub = %hub.name, "attached storage conversions");
                        result.add_or_replace(updated);
                    }
                    Err(e) => errs.push(e),
                }
            }
            aggregate(errs)?;
            Ok(result)
        },
    )
}

/// Newest version of the resource `name` is a version of
fn hub_for<'a>(types: &'a Types, name: &TypeName) -> Option<&'a TypeDefinition> {
    types
        .resources()
        .filter(|candidate| candidate.name.is_version_of(name))
        .max_by(|a, b| {
            compare_versions(
                a.name.version().unwrap_or_default(),
                b.name.version().unwrap_or_default(),
            )
        })
}

fn conversions_with(
    def: &TypeDefinition,
    hub: &TypeDefinition,
    types: &Types,
    factories: &ConversionFactories,
) -> Result<TypeDefinition> {
    let mut updated = def.clone();
    let mut errs = Vec::new();
    for direction in [ConversionDirection::To, ConversionDirection::From] {
        match PropertyAssignmentFunction::new(def, hub, direction, types, factories) {
            Ok(function) => updated = updated.with_function(function.into()),
            Err(e) => errs.push(e),
        }
    }
    aggregate(errs)?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astmodel::{ObjectType, PropertyDefinition, Type};
    use crate::error::Error;

    fn person(version: &str, properties: Vec<PropertyDefinition>) -> TypeDefinition {
        TypeDefinition::new(
            TypeName::local("microsoft.people", version, "Person"),
            Type::Object(ObjectType::from_properties(properties)),
        )
        .as_resource()
    }

    fn stage() -> crate::codegen::PipelineStage {
        create_storage_conversions(ConversionFactories::standard())
    }

    #[test]
    fn test_older_versions_convert_to_newest() {
        let types = Types::from_definitions([
            person(
                "v1alpha1api20200101",
                vec![PropertyDefinition::new("age", Type::optional(Type::int()))],
            ),
            person(
                "v1alpha1api20210101",
                vec![PropertyDefinition::required("age", Type::int())],
            ),
            person(
                "v1alpha1api20190101",
                vec![PropertyDefinition::required("age", Type::int())],
            ),
        ])
        .unwrap();

        let result = stage().run(types).unwrap();
        let hub = result
            .get(&TypeName::local("microsoft.people", "v1alpha1api20210101", "Person"))
            .unwrap();
        assert!(hub.functions.is_empty());

        for version in ["v1alpha1api20200101", "v1alpha1api20190101"] {
            let def = result
                .get(&TypeName::local("microsoft.people", version, "Person"))
                .unwrap();
            let names: Vec<&str> = def.functions.iter().map(|f| f.name()).collect();
            assert_eq!(
                names,
                vec!["assign_properties_to_person", "assign_properties_from_person"]
            );
        }
    }

    #[test]
    fn test_rerun_does_not_duplicate() {
        let types = Types::from_definitions([
            person("v1", vec![PropertyDefinition::required("age", Type::int())]),
            person("v2", vec![PropertyDefinition::required("age", Type::int())]),
        ])
        .unwrap();
        let once = stage().run(types).unwrap();
        let twice = stage().run(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_failures_from_every_resource_are_reported() {
        let thing = |version: &str, ty: Type| {
            TypeDefinition::new(
                TypeName::local("microsoft.things", version, "Thing"),
                Type::Object(ObjectType::from_properties([PropertyDefinition::required("x", ty)])),
            )
            .as_resource()
        };
        let types = Types::from_definitions([
            person("v1", vec![PropertyDefinition::required("age", Type::string())]),
            person("v2", vec![PropertyDefinition::required("age", Type::int())]),
            thing("v1", Type::bool()),
            thing("v2", Type::string()),
        ])
        .unwrap();

        let err = stage().run(types).unwrap_err();
        // each resource fails in both directions
        assert_eq!(err.failure_count(), 4);
        let Error::Aggregate(agg) = &err else {
            panic!("expected an aggregate, got {:?}", err);
        };
        assert!(agg.errors().iter().all(|e| matches!(e, Error::Synthesis { .. })));
    }
}
