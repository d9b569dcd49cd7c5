//! Discovery and validation of resource references inside a value

use super::{run_validations, ResourceReference, ValidationResult};
use std::collections::{BTreeMap, HashMap};

/// Values that may hold [`ResourceReference`]s somewhere inside them.
///
/// Generated spec types implement this by delegating to each field.
pub trait FindResourceReferences {
    fn find_resource_references(&self, refs: &mut Vec<ResourceReference>);
}

impl FindResourceReferences for ResourceReference {
    fn find_resource_references(&self, refs: &mut Vec<ResourceReference>) {
        refs.push(self.clone());
    }
}

impl<T: FindResourceReferences> FindResourceReferences for Option<T> {
    fn find_resource_references(&self, refs: &mut Vec<ResourceReference>) {
        if let Some(inner) = self {
            inner.find_resource_references(refs);
        }
    }
}

impl<T: FindResourceReferences> FindResourceReferences for Vec<T> {
    fn find_resource_references(&self, refs: &mut Vec<ResourceReference>) {
        for item in self {
            item.find_resource_references(refs);
        }
    }
}

impl<K, T: FindResourceReferences> FindResourceReferences for BTreeMap<K, T> {
    fn find_resource_references(&self, refs: &mut Vec<ResourceReference>) {
        for item in self.values() {
            item.find_resource_references(refs);
        }
    }
}

impl<K, T: FindResourceReferences, S> FindResourceReferences for HashMap<K, T, S> {
    fn find_resource_references(&self, refs: &mut Vec<ResourceReference>) {
        for item in self.values() {
            item.find_resource_references(refs);
        }
    }
}

macro_rules! no_references {
    ($($t:ty),*) => {
        $(
            impl FindResourceReferences for $t {
                fn find_resource_references(&self, _refs: &mut Vec<ResourceReference>) {}
            }
        )*
    };
}

no_references!(String, bool, i32, i64, u32, u64, f32, f64);

/// Every reference reachable from `value`, in field order
pub fn find_resource_references<T: FindResourceReferences + ?Sized>(
    value: &T,
) -> Vec<ResourceReference> {
    let mut refs = Vec::new();
    value.find_resource_references(&mut refs);
    refs
}

/// Validate each reference, reporting one entry per invalid reference
pub fn validate_resource_references(refs: &[ResourceReference]) -> ValidationResult {
    run_validations(refs.iter().map(|r| r.validate().map_err(Into::into)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SubnetSpec {
        network: ResourceReference,
        route_table: Option<ResourceReference>,
        peers: Vec<ResourceReference>,
        name: String,
    }

    impl FindResourceReferences for SubnetSpec {
        fn find_resource_references(&self, refs: &mut Vec<ResourceReference>) {
            self.network.find_resource_references(refs);
            self.route_table.find_resource_references(refs);
            self.peers.find_resource_references(refs);
            self.name.find_resource_references(refs);
        }
    }

    #[test]
    fn test_finds_references_in_field_order() {
        let spec = SubnetSpec {
            network: ResourceReference::external("/net"),
            route_table: None,
            peers: vec![
                ResourceReference::external("/peer1"),
                ResourceReference::default(),
            ],
            name: "subnet".into(),
        };

        let refs = find_resource_references(&spec);
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].arm_id, "/net");
        assert_eq!(refs[1].arm_id, "/peer1");
    }

    #[test]
    fn test_validate_reports_each_invalid_reference() {
        let refs = vec![
            ResourceReference::default(),
            ResourceReference::external("/ok"),
            ResourceReference {
                arm_id: "/both".into(),
                ..ResourceReference::structured("g", "k", "ns", "n")
            },
        ];
        let errs = validate_resource_references(&refs).unwrap_err();
        assert_eq!(errs.len(), 2);
    }
}
