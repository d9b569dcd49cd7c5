//! Admission validator synthesis
//!
//! A [`ValidatorBuilder`] collects the rules registered for one resource and
//! produces a [`ValidatorImplementation`]: the create/update/delete dispatch
//! methods, the per-phase rule lists, and the webhook registration.

use super::TypeName;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// When a validation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    Create,
    Update,
    Delete,
}

impl ValidationKind {
    pub const ALL: [ValidationKind; 3] = [
        ValidationKind::Create,
        ValidationKind::Update,
        ValidationKind::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationKind::Create => "create",
            ValidationKind::Update => "update",
            ValidationKind::Delete => "delete",
        }
    }

    /// Dispatch method on the `Validator` trait
    pub fn dispatch_method(&self) -> String {
        format!("validate_{}", self.as_str())
    }

    /// Method returning the generated rules for this phase
    pub fn rules_method(&self) -> String {
        format!("{}_validations", self.as_str())
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a validation function checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationRule {
    /// Every `ResourceReference` reachable from `field` (or the whole
    /// resource when absent) must be well formed
    ResourceReferences {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },
}

/// A single named rule, a method on the resource it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFunction {
    name: String,
    owner: TypeName,
    /// Whether the rule needs the previous version of the resource
    #[serde(default)]
    takes_old: bool,
    #[serde(flatten)]
    rule: ValidationRule,
}

impl ValidationFunction {
    pub fn new(name: impl Into<String>, owner: TypeName, rule: ValidationRule) -> Self {
        Self {
            name: name.into(),
            owner,
            takes_old: false,
            rule,
        }
    }

    /// Rule checking all resource references under `field`
    pub fn validate_resource_references(owner: TypeName, field: Option<String>) -> Self {
        Self::new(
            "validate_resource_references",
            owner,
            ValidationRule::ResourceReferences { field },
        )
    }

    pub fn taking_old(mut self) -> Self {
        self.takes_old = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &TypeName {
        &self.owner
    }

    pub fn takes_old(&self) -> bool {
        self.takes_old
    }

    pub fn rule(&self) -> &ValidationRule {
        &self.rule
    }
}

/// Collects the rules for one resource
#[derive(Debug, Clone)]
pub struct ValidatorBuilder {
    resource: TypeName,
    create: Vec<ValidationFunction>,
    update: Vec<ValidationFunction>,
    delete: Vec<ValidationFunction>,
}

impl ValidatorBuilder {
    pub fn new(resource: TypeName) -> Self {
        Self {
            resource,
            create: Vec::new(),
            update: Vec::new(),
            delete: Vec::new(),
        }
    }

    pub fn resource(&self) -> &TypeName {
        &self.resource
    }

    /// Register a rule for a phase.
    ///
    /// # Panics
    ///
    /// Panics if the rule belongs to a type other than the one this builder
    /// was created for.
    pub fn add_validation(&mut self, kind: ValidationKind, function: ValidationFunction) {
        if function.owner != self.resource {
            panic!(
                "cannot add validation {} for {} to the validator of {}",
                function.name, function.owner, self.resource
            );
        }
        match kind {
            ValidationKind::Create => self.create.push(function),
            ValidationKind::Update => self.update.push(function),
            ValidationKind::Delete => self.delete.push(function),
        }
    }

    /// Build the implementation; `group_suffix` is appended to the API group
    /// to form the Kubernetes group (e.g. `.infra.azure.com`).
    pub fn to_implementation(&self, group_suffix: &str) -> Result<ValidatorImplementation> {
        let (group, version) = self.resource.package.as_local().ok_or_else(|| {
            Error::Other(format!(
                "expected resource name {} to be in a local package",
                self.resource
            ))
        })?;

        let group = format!("{}{}", group, group_suffix).to_lowercase();
        let singular = self.resource.name().to_lowercase();
        let plural = self.resource.plural().name().to_lowercase();

        let webhook = WebhookRegistration {
            path: format!("/validate-{}-{}-{}", group.replace('.', "-"), version, singular),
            name: format!("validate.{}.{}.{}", version, plural, group),
            group,
            resource: plural,
            version: version.to_string(),
        };

        Ok(ValidatorImplementation {
            resource: self.resource.clone(),
            create: self.create.clone(),
            update: self.update.clone(),
            delete: self.delete.clone(),
            webhook,
        })
    }
}

/// Where the admission webhook for a resource is served
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRegistration {
    pub path: String,
    pub name: String,
    pub group: String,
    pub resource: String,
    pub version: String,
}

impl WebhookRegistration {
    /// Kubebuilder marker registering the webhook
    pub fn annotation(&self) -> String {
        format!(
            "+kubebuilder:webhook:path={},mutating=false,sideEffects=None,\
             matchPolicy=Exact,failurePolicy=fail,groups={},resources={},\
             verbs=create;update,versions={},name={},admissionReviewVersions=v1beta1",
            self.path, self.group, self.resource, self.version, self.name
        )
    }
}

/// The generated `Validator` implementation of one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorImplementation {
    resource: TypeName,
    #[serde(default)]
    create: Vec<ValidationFunction>,
    #[serde(default)]
    update: Vec<ValidationFunction>,
    #[serde(default)]
    delete: Vec<ValidationFunction>,
    webhook: WebhookRegistration,
}

impl ValidatorImplementation {
    pub fn resource(&self) -> &TypeName {
        &self.resource
    }

    /// Rules for a phase, in registration order
    pub fn validations(&self, kind: ValidationKind) -> &[ValidationFunction] {
        match kind {
            ValidationKind::Create => &self.create,
            ValidationKind::Update => &self.update,
            ValidationKind::Delete => &self.delete,
        }
    }

    pub fn rule_count(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }

    pub fn webhook(&self) -> &WebhookRegistration {
        &self.webhook
    }

    pub fn webhook_annotation(&self) -> String {
        self.webhook.annotation()
    }

    /// Methods the implementation defines, dispatchers first
    pub fn method_names(&self) -> Vec<String> {
        ValidationKind::ALL
            .iter()
            .map(ValidationKind::dispatch_method)
            .chain(ValidationKind::ALL.iter().map(ValidationKind::rules_method))
            .collect()
    }
}
