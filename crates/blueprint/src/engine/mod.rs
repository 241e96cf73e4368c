//! Provisioning engine seam.
//!
//! The composition layer never talks to a cloud API. It hands each stack to a
//! [`ProvisioningEngine`], in dependency order, and the engine decides what
//! "apply" means: writing templates to disk, submitting a change set, or
//! recording calls in a test.

mod synth;

pub use synth::{SynthEngine, MANIFEST_FILE};

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::blueprint::DeploymentUnit;
use crate::monitoring::MonitoringStack;

/// Errors raised while handing stacks to an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Stack {stack} was rejected: {message}")]
    Rejected { stack: String, message: String },

    #[error("Stack {stack} depends on {missing}, which has not been applied")]
    UnappliedDependency { stack: String, missing: String },
}

/// Serialization format of synthesized stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Render `value` in this format.
    ///
    /// # Errors
    /// Returns an error if the value cannot be serialized.
    pub fn render(self, value: &Value) -> Result<String, EngineError> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(value)?),
            Self::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown output format '{other}' (expected json or yaml)")),
        }
    }
}

/// A stack ready to be applied.
#[derive(Debug, Clone, PartialEq)]
pub enum StackArtifact {
    Monitoring(MonitoringStack),
    Cluster(DeploymentUnit),
}

impl StackArtifact {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Monitoring(stack) => &stack.id,
            Self::Cluster(unit) => unit.id(),
        }
    }

    /// Stacks whose outputs this one consumes.
    #[must_use]
    pub fn depends_on(&self) -> Vec<String> {
        match self {
            Self::Monitoring(_) => Vec::new(),
            Self::Cluster(unit) => unit.dependencies(),
        }
    }

    /// Template document handed to the engine.
    ///
    /// # Errors
    /// Returns an error if a payload fails to serialize.
    pub fn to_value(&self) -> Result<Value, EngineError> {
        let value = match self {
            Self::Monitoring(stack) => {
                let outputs = Map::from_iter([(
                    stack.outputs.prometheus_endpoint.attribute.clone(),
                    serde_json::to_value(&stack.outputs.prometheus_endpoint)?,
                )]);
                json!({
                    "Description": "Managed Prometheus and Grafana workspaces",
                    "Metadata": {
                        "Account": stack.account,
                        "Region": stack.region,
                        "VpcLookup": stack.vpc,
                    },
                    "Resources": stack.resources,
                    "Outputs": outputs,
                })
            }
            Self::Cluster(unit) => json!({
                "Description": format!("EKS blueprint {}", unit.id()),
                "DependsOn": unit.dependencies(),
                "Blueprint": unit,
            }),
        };
        Ok(value)
    }
}

/// Result of applying one stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub stack_id: String,
    pub depends_on: Vec<String>,
    /// File written for the stack, if the engine writes files.
    pub artifact: Option<PathBuf>,
}

/// Something that turns declared stacks into real (or recorded) infrastructure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Apply one stack. Stacks arrive in dependency order.
    async fn apply(&self, stack: &StackArtifact) -> Result<ApplyReport, EngineError>;

    /// Called once after every stack was applied.
    async fn finalize(&self, reports: &[ApplyReport]) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeployConfig, Profile};

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("YML".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("toml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Yaml.to_string(), "yaml");
    }

    #[test]
    fn test_monitoring_template_document() {
        let config = DeployConfig::new("111111111111", "us-east-1", Profile::Dev).unwrap();
        let artifact = StackArtifact::Monitoring(MonitoringStack::provision(&config));
        assert_eq!(artifact.id(), "MonitoringStack");
        assert!(artifact.depends_on().is_empty());

        let value = artifact.to_value().unwrap();
        assert_eq!(value["Resources"]["AmpLogGroup"]["Type"], "AWS::Logs::LogGroup");
        assert_eq!(
            value["Outputs"]["PrometheusEndpoint"]["Export"]["Name"],
            "MonitoringStack:PrometheusEndpoint"
        );
        assert_eq!(value["Metadata"]["Region"], "us-east-1");
    }

    #[test]
    fn test_render_yaml() {
        let rendered = OutputFormat::Yaml.render(&json!({ "a": 1 })).unwrap();
        assert_eq!(rendered.trim(), "a: 1");
    }
}
