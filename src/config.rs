//! Generator configuration
//!
//! Loaded from a YAML file. Every section and field has a default, so an
//! empty document is a valid configuration.

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Group suffix appended to API groups to form Kubernetes groups
pub const DEFAULT_GROUP_SUFFIX: &str = ".infra.azure.com";

/// Top-level generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratorConfig {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub conversions: ConversionConfig,

    #[serde(default)]
    pub validators: ValidatorConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

fn default_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            pipeline: PipelineConfig::default(),
            conversions: ConversionConfig::default(),
            validators: ValidatorConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Pipeline settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PipelineConfig {
    /// Ids of stages to leave out (e.g. `createStorageConversions`)
    #[serde(default)]
    pub skip_stages: Vec<String>,
}

/// Storage conversion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConversionConfig {
    /// Attach property assignment functions between versions
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Admission validator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidatorConfig {
    /// Attach validators to resources
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Appended to each API group to form the webhook group
    #[serde(default = "default_group_suffix")]
    pub group_suffix: String,
}

fn default_group_suffix() -> String {
    DEFAULT_GROUP_SUFFIX.to_string()
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            group_suffix: default_group_suffix(),
        }
    }
}

/// Rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderConfig {
    /// Emit a header naming the generator and the model hash
    #[serde(default = "default_true")]
    pub provenance: bool,

    /// Emit doc comments on generated items
    #[serde(default = "default_true")]
    pub comments: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            provenance: true,
            comments: true,
        }
    }
}

impl GeneratorConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // an empty document deserializes as unit, not as a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: GeneratorConfig = serde_norway::from_str(yaml)?;
        if config.version != 1 {
            return Err(Error::Config(format!(
                "unsupported config version: {}",
                config.version
            )));
        }
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// JSON schema describing the configuration file
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(GeneratorConfig);
        Ok(serde_json::to_string_pretty(&schema)?)
    }

    /// Whether a stage id is listed in `pipeline.skip_stages`
    pub fn skips(&self, stage: &str) -> bool {
        self.pipeline.skip_stages.iter().any(|s| s == stage)
    }
}
