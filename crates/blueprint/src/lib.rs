//! EKS cluster composition.
//!
//! This crate declares an Amazon EKS deployment as two stacks:
//!
//! - **Monitoring** - managed Prometheus and Grafana workspaces, independent
//!   of the cluster lifecycle
//! - **Cluster** - an EKS blueprint with a capacity strategy and an ordered
//!   list of add-ons, ending with a GitOps bootstrapper
//!
//! Nothing here calls a cloud API. Stacks are handed to a
//! [`ProvisioningEngine`], such as [`SynthEngine`] which writes templates
//! to disk.
//!
//! # Example
//!
//! ```ignore
//! use eks_blueprint::{App, DeployConfig, OutputFormat, SynthEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DeployConfig::from_env()?;
//!     let app = App::synth(&config)?;
//!     app.deploy(&SynthEngine::new("cdk.out", OutputFormat::Json)).await?;
//!     Ok(())
//! }
//! ```

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod addons;
pub mod app;
pub mod aws;
pub mod blueprint;
pub mod capacity;
pub mod config;
pub mod engine;
pub mod error;
pub mod monitoring;
pub mod ordering;
pub mod profile;
pub mod template;

pub use addons::{AddOn, AddOnKind, AddOnTier};
pub use app::App;
pub use blueprint::{BlueprintBuilder, DeploymentUnit, EksBlueprint};
pub use capacity::{CapacityStrategy, ClusterProvider};
pub use config::{DeployConfig, Profile};
pub use engine::{
    ApplyReport, EngineError, OutputFormat, ProvisioningEngine, StackArtifact, SynthEngine,
};
pub use error::{BlueprintError, Result};
pub use monitoring::MonitoringStack;
pub use ordering::OrderingMode;
