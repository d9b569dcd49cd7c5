//! End-to-end pipeline runs over small resource models

use crdgen::astmodel::resource_reference_type_name;
use crdgen::codegen::stages;
use crdgen::genruntime::Value;
use crdgen::{
    ConversionDirection, Error, Function, GeneratorConfig, ObjectType, Pipeline,
    PropertyDefinition, Type, TypeDefinition, TypeName, Types, ValidationKind,
};
use pretty_assertions::assert_eq;

const GROUP: &str = "microsoft.people";

fn name(version: &str, n: &str) -> TypeName {
    TypeName::local(GROUP, version, n)
}

fn object(properties: Vec<PropertyDefinition>) -> Type {
    Type::Object(ObjectType::from_properties(properties))
}

/// Two versions of `Person`; the older one reaches its tags through an alias
fn people() -> Types {
    Types::from_definitions([
        TypeDefinition::new(
            name("v1", "Person"),
            object(vec![
                PropertyDefinition::new("nickname", Type::optional(Type::string())),
                PropertyDefinition::new("tags", Type::optional(Type::Name(name("v1", "TagList")))),
                PropertyDefinition::new("age", Type::optional(Type::int())),
                PropertyDefinition::new(
                    "employer",
                    Type::optional(Type::Name(resource_reference_type_name())),
                ),
            ]),
        )
        .as_resource(),
        TypeDefinition::new(name("v1", "TagList"), Type::array(Type::string())),
        TypeDefinition::new(
            name("v2", "Person"),
            object(vec![
                PropertyDefinition::required("nickname", Type::string()),
                PropertyDefinition::required("tags", Type::array(Type::string())),
                PropertyDefinition::required("age", Type::int()),
                PropertyDefinition::new("email", Type::optional(Type::string())),
            ]),
        )
        .as_resource(),
    ])
    .unwrap()
}

fn run(types: Types) -> crdgen::Result<Types> {
    Pipeline::default_pipeline(&GeneratorConfig::default())?.run(types)
}

fn assignment(types: &Types, version: &str, function: &str) -> crdgen::PropertyAssignmentFunction {
    types
        .lookup(&name(version, "Person"))
        .unwrap()
        .function(function)
        .and_then(Function::as_property_assignment)
        .cloned()
        .unwrap()
}

#[test]
fn test_default_pipeline_attaches_everything() {
    let types = run(people()).unwrap();

    let v1 = types.lookup(&name("v1", "Person")).unwrap();
    let names: Vec<&str> = v1.functions.iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        vec![
            "assign_properties_to_person",
            "assign_properties_from_person",
            "validate_resource_references",
        ]
    );

    // the alias property was made required by the fix-up stage
    let tags = v1.ty.as_object().unwrap().property("tags").unwrap();
    assert!(tags.required);
    assert_eq!(tags.property_type, Type::Name(name("v1", "TagList")));

    // the hub converts to nothing but still validates
    let v2 = types.lookup(&name("v2", "Person")).unwrap();
    assert!(v2.functions.is_empty());
    let validator = v2.validator.as_ref().unwrap();
    assert_eq!(validator.rule_count(), 0);

    let validator = v1.validator.as_ref().unwrap();
    assert_eq!(validator.validations(ValidationKind::Create).len(), 1);
    assert_eq!(validator.validations(ValidationKind::Update).len(), 1);
    assert!(validator.validations(ValidationKind::Delete).is_empty());
}

#[test]
fn test_assign_to_newer_version() {
    let types = run(people()).unwrap();
    let to = assignment(&types, "v1", "assign_properties_to_person");
    assert_eq!(to.direction(), ConversionDirection::To);
    // employer and email exist on only one side
    let converted: Vec<&str> = to.assignments().iter().map(|a| a.property.as_str()).collect();
    assert_eq!(converted, vec!["nickname", "tags", "age"]);

    let older = Value::object([
        ("nickname", Value::Null),
        ("tags", Value::Array(vec![Value::from("a"), Value::from("b")])),
        ("age", Value::Int(41)),
    ]);
    let newer = to.apply(older, Value::Null).unwrap();
    assert_eq!(
        newer,
        Value::object([
            ("nickname", Value::from("")),
            ("tags", Value::Array(vec![Value::from("a"), Value::from("b")])),
            ("age", Value::Int(41)),
        ])
    );
}

#[test]
fn test_assign_from_newer_version() {
    let types = run(people()).unwrap();
    let from = assignment(&types, "v1", "assign_properties_from_person");
    assert_eq!(from.parameter(), "source");

    let newer = Value::object([
        ("nickname", Value::from("bob")),
        ("tags", Value::Array(Vec::new())),
        ("age", Value::Int(0)),
        ("email", Value::from("bob@example.com")),
    ]);
    let older = from.apply(Value::Null, newer).unwrap();
    assert_eq!(
        older,
        Value::object([
            ("nickname", Value::from("bob")),
            ("tags", Value::Array(Vec::new())),
            ("age", Value::Int(0)),
        ])
    );
}

#[test]
fn test_fix_optional_alias_references_is_idempotent() {
    let stage = stages::fix_optional_alias_references();
    let once = stage.run(people()).unwrap();
    let twice = stage.run(once.clone()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_whole_pipeline_is_repeatable() {
    let first = run(people()).unwrap();
    let second = run(people()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.hash().unwrap(), second.hash().unwrap());
}

#[test]
fn test_dangling_reference_halts_before_later_stages() {
    let mut types = people();
    types.add_or_replace(
        TypeDefinition::new(
            name("v1", "Person"),
            object(vec![PropertyDefinition::new(
                "address",
                Type::Name(name("v1", "Address")),
            )]),
        )
        .as_resource(),
    );

    let err = run(types).unwrap_err();
    let Error::Stage { stage, source } = &err else {
        panic!("expected a stage failure, got {:?}", err);
    };
    assert_eq!(stage, stages::VALIDATE_TYPE_REFERENCES);
    assert!(matches!(source.as_ref(), Error::DanglingReference { .. }));
}

#[test]
fn test_conversion_failures_are_aggregated() {
    let types = Types::from_definitions([
        TypeDefinition::new(
            name("v1", "Person"),
            object(vec![
                PropertyDefinition::required("age", Type::string()),
                PropertyDefinition::required("height", Type::bool()),
            ]),
        )
        .as_resource(),
        TypeDefinition::new(
            name("v2", "Person"),
            object(vec![
                PropertyDefinition::required("age", Type::int()),
                PropertyDefinition::required("height", Type::int()),
            ]),
        )
        .as_resource(),
    ])
    .unwrap();

    let err = run(types).unwrap_err();
    assert!(matches!(&err, Error::Stage { stage, .. } if stage == stages::CREATE_STORAGE_CONVERSIONS));
    // two properties, two directions
    assert_eq!(err.failure_count(), 4);
}

#[test]
fn test_skipped_stages_leave_model_untouched() {
    let mut config = GeneratorConfig::default();
    config.pipeline.skip_stages = vec![stages::CREATE_STORAGE_CONVERSIONS.to_string()];
    config.validators.enabled = false;

    let types = Pipeline::default_pipeline(&config).unwrap().run(people()).unwrap();
    assert!(types.iter().all(|def| def.functions.is_empty() && def.validator.is_none()));
}

#[test]
fn test_model_with_functions_survives_yaml() {
    let types = run(people()).unwrap();
    let parsed = Types::from_yaml(&types.to_yaml().unwrap()).unwrap();
    assert_eq!(parsed, types);
}

/// Both versions of `Person` carry an optional owner reference
fn owned_people() -> Types {
    let owner = || {
        PropertyDefinition::new(
            "owner",
            Type::optional(Type::Name(resource_reference_type_name())),
        )
    };
    Types::from_definitions([
        TypeDefinition::new(
            name("v1", "Person"),
            object(vec![
                PropertyDefinition::new("nickname", Type::optional(Type::string())),
                owner(),
            ]),
        )
        .as_resource(),
        TypeDefinition::new(
            name("v2", "Person"),
            object(vec![
                PropertyDefinition::required("nickname", Type::string()),
                owner(),
            ]),
        )
        .as_resource(),
    ])
    .unwrap()
}

#[test]
fn test_reference_in_both_versions_is_copied() {
    let types = run(owned_people()).unwrap();
    let to = assignment(&types, "v1", "assign_properties_to_person");
    let converted: Vec<&str> = to.assignments().iter().map(|a| a.property.as_str()).collect();
    assert_eq!(converted, vec!["nickname", "owner"]);

    let owner = Value::object([
        ("group", Value::from("microsoft.resources.infra.azure.com")),
        ("kind", Value::from("ResourceGroup")),
        ("namespace", Value::from("default")),
        ("name", Value::from("myrg")),
    ]);
    let older = Value::object([("nickname", Value::from("al")), ("owner", owner.clone())]);
    let newer = to.apply(older, Value::Null).unwrap();
    assert_eq!(
        newer,
        Value::object([("nickname", Value::from("al")), ("owner", owner)])
    );

    // absence carries over in both directions
    let from = assignment(&types, "v1", "assign_properties_from_person");
    let newer = Value::object([("nickname", Value::from("al")), ("owner", Value::Null)]);
    let older = from.apply(Value::Null, newer).unwrap();
    assert_eq!(
        older,
        Value::object([("nickname", Value::from("al")), ("owner", Value::Null)])
    );

    // both versions validate their reference
    for version in ["v1", "v2"] {
        let validator = types.lookup(&name(version, "Person")).unwrap().validator.clone().unwrap();
        assert_eq!(validator.validations(ValidationKind::Create).len(), 1);
    }
}
