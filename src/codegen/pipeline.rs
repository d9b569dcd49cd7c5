//! Staged transformation of a type model

use super::stages;
use crate::astmodel::conversion::ConversionFactories;
use crate::astmodel::Types;
use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use std::fmt;
use std::time::Instant;
use tracing::{info, warn};

type StageAction = Box<dyn Fn(Types) -> Result<Types>>;

/// One named transformation of the whole model.
///
/// The id and description are for diagnostics only.
pub struct PipelineStage {
    id: &'static str,
    description: &'static str,
    action: StageAction,
}

impl PipelineStage {
    pub fn new(
        id: &'static str,
        description: &'static str,
        action: impl Fn(Types) -> Result<Types> + 'static,
    ) -> Self {
        Self {
            id,
            description,
            action: Box::new(action),
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn run(&self, types: Types) -> Result<Types> {
        (self.action)(types)
    }
}

impl fmt::Debug for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineStage")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish()
    }
}

/// An ordered list of stages, each fed the output of the one before
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<PipelineStage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: PipelineStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Every stage, in execution order, without applying any configuration
    pub fn all_stages(config: &GeneratorConfig) -> Self {
        Self::new()
            .with_stage(stages::validate_type_references())
            .with_stage(stages::fix_optional_alias_references())
            .with_stage(stages::create_storage_conversions(
                ConversionFactories::standard(),
            ))
            .with_stage(stages::add_validators(
                config.validators.group_suffix.clone(),
            ))
    }

    /// The standard pipeline with the configured stages removed.
    ///
    /// Naming a stage in `pipeline.skip_stages` that doesn't exist is an
    /// error.
    pub fn default_pipeline(config: &GeneratorConfig) -> Result<Self> {
        let all = Self::all_stages(config);
        let known = all.stage_ids();

        let unknown: Vec<&str> = config
            .pipeline
            .skip_stages
            .iter()
            .map(String::as_str)
            .filter(|id| !known.iter().any(|k| k == id))
            .collect();
        if !unknown.is_empty() {
            return Err(Error::Config(format!(
                "unknown pipeline stages: {} (known: {})",
                unknown.join(", "),
                known.join(", ")
            )));
        }

        let mut pipeline = Self::new();
        for stage in all.stages {
            let disabled = match stage.id {
                stages::CREATE_STORAGE_CONVERSIONS => !config.conversions.enabled,
                stages::ADD_VALIDATORS => !config.validators.enabled,
                _ => false,
            };
            if disabled || config.skips(stage.id) {
                warn!(stage = stage.id, "skipping stage");
                continue;
            }
            pipeline = pipeline.with_stage(stage);
        }
        Ok(pipeline)
    }

    pub fn stage_ids(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.id).collect()
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order.
    ///
    /// Stops at the first stage that fails; its error lists every failure
    /// within that stage.
    pub fn run(&self, types: Types) -> Result<Types> {
        let total = self.stages.len();
        let mut types = types;
        for (i, stage) in self.stages.iter().enumerate() {
            info!(
                stage = stage.id,
                step = i + 1,
                total,
                types = types.len(),
                "{}",
                stage.description
            );
            let started = Instant::now();
            types = stage.run(types).map_err(|e| Error::Stage {
                stage: stage.id.to_string(),
                source: Box::new(e),
            })?;
            info!(
                stage = stage.id,
                types = types.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "stage finished"
            );
        }
        Ok(types)
    }
}
