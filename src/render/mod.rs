//! Code rendering
//!
//! Turns the functions and validators attached to a [`Types`] set into Rust
//! source, one module per local package. Output depends only on the model,
//! so rendering the same set twice yields identical text.

mod rust;

pub use rust::render_package;

use crate::astmodel::{PackageReference, Types};
use crate::config::RenderConfig;
use crate::error::Result;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Render every package that has something to emit, keyed by package
pub fn render_all(
    types: &Types,
    config: &RenderConfig,
) -> Result<BTreeMap<PackageReference, String>> {
    let packages: BTreeSet<&PackageReference> = types
        .iter()
        .filter(|def| !def.functions.is_empty() || def.validator.is_some())
        .map(|def| &def.name.package)
        .filter(|package| package.is_local())
        .collect();

    let mut rendered = BTreeMap::new();
    for package in packages {
        let code = render_package(types, package, config)?;
        debug!(package = %package, bytes = code.len(), "Rendered package");
        rendered.insert(package.clone(), code);
    }
    Ok(rendered)
}

/// Module identifier for a group or version: `2020-11-01` -> `v2020_11_01`
pub fn module_name(segment: &str) -> String {
    let mut name: String = segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, 'v');
    }
    name
}
