//! Qualified type names and the packages they live in

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// Package holding the runtime support types generated code depends on
pub const GENRUNTIME_PATH: &str = "genruntime";

/// Where a type lives.
///
/// Local packages are produced by this generator (one per API group and
/// version). External packages are runtime libraries the generated code
/// imports; their types are never resolved by pipeline stages.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PackageReference {
    Local { group: String, version: String },
    External { path: String },
}

impl PackageReference {
    pub fn local(group: impl Into<String>, version: impl Into<String>) -> Self {
        PackageReference::Local {
            group: group.into(),
            version: version.into(),
        }
    }

    pub fn external(path: impl Into<String>) -> Self {
        PackageReference::External { path: path.into() }
    }

    pub fn genruntime() -> Self {
        Self::external(GENRUNTIME_PATH)
    }

    /// Returns `(group, version)` for local packages
    pub fn as_local(&self) -> Option<(&str, &str)> {
        match self {
            PackageReference::Local { group, version } => Some((group, version)),
            PackageReference::External { .. } => None,
        }
    }

    pub fn is_local(&self) -> bool {
        self.as_local().is_some()
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageReference::Local { group, version } => write!(f, "{}/{}", group, version),
            PackageReference::External { path } => write!(f, "{}", path),
        }
    }
}

/// A qualified type identifier: package plus local name.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TypeName {
    pub package: PackageReference,
    pub name: String,
}

impl TypeName {
    pub fn new(package: PackageReference, name: impl Into<String>) -> Self {
        Self {
            package,
            name: name.into(),
        }
    }

    /// Shorthand for a type in a local package
    pub fn local(group: &str, version: &str, name: &str) -> Self {
        Self::new(PackageReference::local(group, version), name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> Option<&str> {
        self.package.as_local().map(|(g, _)| g)
    }

    pub fn version(&self) -> Option<&str> {
        self.package.as_local().map(|(_, v)| v)
    }

    /// Same local name in another package
    pub fn in_package(&self, package: PackageReference) -> Self {
        Self::new(package, self.name.clone())
    }

    /// Pluralized name, used for resource paths
    pub fn plural(&self) -> Self {
        Self::new(self.package.clone(), crate::util::pluralize(&self.name))
    }

    /// True when both names denote the same resource at different versions
    pub fn is_version_of(&self, other: &TypeName) -> bool {
        self.name == other.name && self.group().is_some() && self.group() == other.group()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.name)
    }
}

/// The runtime type denoting a cross-resource reference
pub fn resource_reference_type_name() -> TypeName {
    TypeName::new(PackageReference::genruntime(), "ResourceReference")
}

fn api_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{4})-?(\d{2})-?(\d{2})").expect("valid regex"))
}

/// Compare two API versions.
///
/// Versions that embed an API date (`v1alpha1api20200501`, `2020-05-01`)
/// order by that date first; ties and undated versions fall back to a
/// plain string comparison.
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    let date = |v: &str| {
        api_date_pattern()
            .captures(v)
            .map(|c| format!("{}{}{}", &c[1], &c[2], &c[3]))
    };

    match (date(left), date(right)) {
        (Some(l), Some(r)) => l.cmp(&r).then_with(|| left.cmp(right)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => left.cmp(right),
    }
}
