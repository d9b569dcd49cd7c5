//! Cross-resource references

use super::ValidationError;
use serde::{Deserialize, Serialize};

/// A pointer from one resource's spec to another resource.
///
/// Exactly one form must be used: either a direct ARM identifier, or all
/// four of group, kind, namespace and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReference {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arm_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl ResourceReference {
    pub fn external(arm_id: impl Into<String>) -> Self {
        Self {
            arm_id: arm_id.into(),
            ..Self::default()
        }
    }

    pub fn structured(
        group: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    fn has_external_id(&self) -> bool {
        !self.arm_id.is_empty()
    }

    fn has_all_structured_fields(&self) -> bool {
        !self.group.is_empty()
            && !self.kind.is_empty()
            && !self.namespace.is_empty()
            && !self.name.is_empty()
    }

    /// Well-formed reference by ARM identifier only
    pub fn is_external_reference(&self) -> bool {
        self.has_external_id() && !self.has_all_structured_fields()
    }

    /// Well-formed in-cluster reference with all four fields and no ARM identifier
    pub fn is_structured_reference(&self) -> bool {
        !self.has_external_id() && self.has_all_structured_fields()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.has_external_id(), self.has_all_structured_fields()) {
            (true, false) | (false, true) => Ok(()),
            (true, true) => Err(ValidationError::InvalidReference {
                reference: self.to_string(),
                reason: "the armId and group/kind/namespace/name forms are mutually exclusive"
                    .into(),
            }),
            (false, false) => Err(ValidationError::InvalidReference {
                reference: self.to_string(),
                reason: "either armId or all of group, kind, namespace and name must be set"
                    .into(),
            }),
        }
    }
}

impl std::fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_external_id() && !self.has_all_structured_fields() {
            return write!(f, "{}", self.arm_id);
        }
        write!(
            f,
            "Group={}, Kind={}, {}/{}",
            self.group, self.kind, self.namespace, self.name
        )?;
        if self.has_external_id() {
            write!(f, " (armId={})", self.arm_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ARM_ID: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg/providers/microsoft.compute/VirtualMachine/myvm";

    fn valid_external() -> ResourceReference {
        ResourceReference::external(ARM_ID)
    }

    fn valid_structured() -> ResourceReference {
        ResourceReference::structured(
            "microsoft.resources.infra.azure.com",
            "ResourceGroup",
            "default",
            "myrg",
        )
    }

    fn both_specified() -> ResourceReference {
        ResourceReference {
            arm_id: "oops".into(),
            ..valid_structured()
        }
    }

    fn incomplete_structured() -> ResourceReference {
        ResourceReference {
            kind: String::new(),
            ..valid_structured()
        }
    }

    #[rstest]
    #[case::external_is_valid(valid_external(), false)]
    #[case::structured_is_valid(valid_structured(), false)]
    #[case::both_forms_is_invalid(both_specified(), true)]
    #[case::neither_form_is_invalid(ResourceReference::default(), true)]
    #[case::incomplete_structured_is_invalid(incomplete_structured(), true)]
    fn test_validate(#[case] reference: ResourceReference, #[case] err_expected: bool) {
        assert_eq!(reference.validate().is_err(), err_expected);
    }

    #[rstest]
    #[case::external(valid_external(), true, false)]
    #[case::structured(valid_structured(), false, true)]
    #[case::both(both_specified(), false, false)]
    #[case::neither(ResourceReference::default(), false, false)]
    #[case::incomplete(incomplete_structured(), false, false)]
    fn test_classifiers(
        #[case] reference: ResourceReference,
        #[case] external: bool,
        #[case] structured: bool,
    ) {
        assert_eq!(reference.is_external_reference(), external);
        assert_eq!(reference.is_structured_reference(), structured);
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_string(&valid_external()).unwrap();
        assert_eq!(json, format!("{{\"armId\":\"{}\"}}", ARM_ID));
    }
}
