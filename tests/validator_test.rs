//! Admission validation, driven the way generated resources drive it

use crdgen::astmodel::ValidationFunction;
use crdgen::genruntime::{
    self, FindResourceReferences, OverrideRegistry, ResourceReference, UpdateValidation,
    Validation, ValidationError, ValidationResult, Validator, ValidatorOverrides,
};
use crdgen::{TypeName, ValidationKind, ValidatorBuilder};
use pretty_assertions::assert_eq;

struct VirtualNetworkSpec {
    resource_group: ResourceReference,
    ddos_plan: Option<ResourceReference>,
}

impl FindResourceReferences for VirtualNetworkSpec {
    fn find_resource_references(&self, refs: &mut Vec<ResourceReference>) {
        self.resource_group.find_resource_references(refs);
        self.ddos_plan.find_resource_references(refs);
    }
}

struct VirtualNetwork {
    spec: VirtualNetworkSpec,
    location: String,
    address_space: Vec<String>,
}

// Mirrors the shape of rendered validator code
impl VirtualNetwork {
    pub fn validate_resource_references(&self) -> ValidationResult {
        let refs = genruntime::find_resource_references(&self.spec);
        genruntime::validate_resource_references(&refs)
    }

    pub fn validate_location(&self) -> ValidationResult {
        if self.location.is_empty() {
            return Err(ValidationError::rule("location", "a location is required").into());
        }
        Ok(())
    }

    fn create_validations(&self) -> Vec<Validation<Self>> {
        let references: Validation<Self> = Self::validate_resource_references;
        let location: Validation<Self> = Self::validate_location;
        vec![references, location]
    }

    fn update_validations(&self) -> Vec<UpdateValidation<Self>> {
        let references: UpdateValidation<Self> =
            |this: &Self, _old: &Self| this.validate_resource_references();
        let location: UpdateValidation<Self> = |this: &Self, _old: &Self| this.validate_location();
        vec![references, location]
    }

    fn delete_validations(&self) -> Vec<Validation<Self>> {
        vec![]
    }
}

impl Validator for VirtualNetwork {
    fn validate_create(&self, overrides: &OverrideRegistry) -> ValidationResult {
        genruntime::dispatch_create(self, self.create_validations(), overrides)
    }

    fn validate_update(&self, old: &Self, overrides: &OverrideRegistry) -> ValidationResult {
        genruntime::dispatch_update(self, old, self.update_validations(), overrides)
    }

    fn validate_delete(&self, overrides: &OverrideRegistry) -> ValidationResult {
        genruntime::dispatch_delete(self, self.delete_validations(), overrides)
    }
}

struct HandWritten;

impl ValidatorOverrides<VirtualNetwork> for HandWritten {
    fn create_validations(&self) -> Vec<Validation<VirtualNetwork>> {
        let non_empty: Validation<VirtualNetwork> = |vnet| {
            if vnet.address_space.is_empty() {
                Err(ValidationError::rule("address_space", "at least one prefix is required").into())
            } else {
                Ok(())
            }
        };
        vec![non_empty]
    }

    fn update_validations(&self) -> Vec<UpdateValidation<VirtualNetwork>> {
        let no_shrink: UpdateValidation<VirtualNetwork> = |new, old| {
            if new.address_space.len() < old.address_space.len() {
                Err(ValidationError::rule("address_space", "prefixes cannot be removed").into())
            } else {
                Ok(())
            }
        };
        vec![no_shrink]
    }
}

fn valid() -> VirtualNetwork {
    VirtualNetwork {
        spec: VirtualNetworkSpec {
            resource_group: ResourceReference::structured(
                "microsoft.resources.infra.azure.com",
                "ResourceGroup",
                "default",
                "rg",
            ),
            ddos_plan: None,
        },
        location: "westus".into(),
        address_space: vec!["10.0.0.0/16".into()],
    }
}

fn broken() -> VirtualNetwork {
    VirtualNetwork {
        spec: VirtualNetworkSpec {
            resource_group: ResourceReference::default(),
            ddos_plan: Some(ResourceReference {
                arm_id: "/subscriptions/x".into(),
                ..ResourceReference::structured("g", "K", "ns", "n")
            }),
        },
        location: String::new(),
        address_space: Vec::new(),
    }
}

#[test]
fn test_valid_resource_passes_every_phase() {
    let mut overrides = OverrideRegistry::new();
    overrides.register::<VirtualNetwork>(HandWritten);
    let vnet = valid();
    assert!(vnet.validate_create(&overrides).is_ok());
    assert!(vnet.validate_update(&valid(), &overrides).is_ok());
    assert!(vnet.validate_delete(&overrides).is_ok());
}

#[test]
fn test_generated_and_override_failures_are_all_reported() {
    let mut overrides = OverrideRegistry::new();
    overrides.register::<VirtualNetwork>(HandWritten);

    let errs = broken().validate_create(&overrides).unwrap_err();
    assert_eq!(errs.len(), 4);
    // generated rules run first, in order
    assert!(matches!(errs.errors()[0], ValidationError::InvalidReference { .. }));
    assert!(matches!(errs.errors()[1], ValidationError::InvalidReference { .. }));
    assert_eq!(errs.errors()[2].to_string(), "location: a location is required");
    assert_eq!(
        errs.errors()[3].to_string(),
        "address_space: at least one prefix is required"
    );
}

#[test]
fn test_without_overrides_only_generated_rules_run() {
    let errs = broken().validate_create(&OverrideRegistry::new()).unwrap_err();
    assert_eq!(errs.len(), 3);
}

#[test]
fn test_each_generated_rule_reports_its_own_failure() {
    let mut vnet = valid();
    vnet.location.clear();
    vnet.spec.resource_group = ResourceReference::default();

    let errs = vnet.validate_update(&valid(), &OverrideRegistry::new()).unwrap_err();
    assert_eq!(errs.len(), 2);
    assert!(matches!(errs.errors()[0], ValidationError::InvalidReference { .. }));
    assert_eq!(errs.errors()[1].to_string(), "location: a location is required");
}

#[test]
fn test_update_sees_old_version() {
    let mut overrides = OverrideRegistry::new();
    overrides.register::<VirtualNetwork>(HandWritten);

    let mut shrunk = valid();
    shrunk.address_space.clear();
    let errs = shrunk.validate_update(&valid(), &overrides).unwrap_err();
    assert_eq!(errs.to_string(), "[address_space: prefixes cannot be removed]");
}

#[test]
fn test_delete_with_no_rules_succeeds() {
    assert!(broken().validate_delete(&OverrideRegistry::new()).is_ok());
}

#[test]
#[should_panic(expected = "cannot add validation")]
fn test_builder_rejects_foreign_rules() {
    let owner = TypeName::local("microsoft.network", "v20201101", "VirtualNetwork");
    let other = TypeName::local("microsoft.network", "v20201101", "Subnet");
    let mut builder = ValidatorBuilder::new(owner);
    builder.add_validation(
        ValidationKind::Create,
        ValidationFunction::validate_resource_references(other, None),
    );
}

#[test]
fn test_builder_webhook_naming() {
    let owner = TypeName::local("microsoft.network", "v20201101", "VirtualNetwork");
    let mut builder = ValidatorBuilder::new(owner.clone());
    builder.add_validation(
        ValidationKind::Create,
        ValidationFunction::validate_resource_references(owner, Some("spec".into())),
    );
    let implementation = builder.to_implementation(".infra.azure.com").unwrap();
    let webhook = implementation.webhook();
    assert_eq!(
        webhook.path,
        "/validate-microsoft-network-infra-azure-com-v20201101-virtualnetwork"
    );
    assert_eq!(
        webhook.name,
        "validate.v20201101.virtualnetworks.microsoft.network.infra.azure.com"
    );
    assert_eq!(implementation.rule_count(), 1);
}
