//! Code generation pipeline
//!
//! A [`Pipeline`] runs named [`PipelineStage`]s over a [`crate::astmodel::Types`]
//! collection. Each stage sees the complete output of the stage before it.

mod pipeline;
pub mod stages;

pub use pipeline::{Pipeline, PipelineStage};

use crate::astmodel::{PackageReference, Types};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::render::render_all;
use std::collections::BTreeMap;

/// Run the configured pipeline, then render every package with output
pub fn generate(
    types: Types,
    config: &GeneratorConfig,
) -> Result<BTreeMap<PackageReference, String>> {
    let types = Pipeline::default_pipeline(config)?.run(types)?;
    render_all(&types, &config.render)
}
