//! Top-level composition of both stacks.
//!
//! The monitoring stack is declared first so its Prometheus endpoint can be
//! embedded in the cluster's managed Prometheus add-on. The cluster unit
//! records the import, which makes the monitoring stack an explicit
//! dependency when stacks are applied.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::aws::ControlPlaneLogType;
use crate::blueprint::{DeploymentUnit, EksBlueprint};
use crate::config::DeployConfig;
use crate::engine::{ApplyReport, EngineError, ProvisioningEngine, StackArtifact};
use crate::error::Result;
use crate::monitoring::MonitoringStack;
use crate::ordering::OrderingMode;
use crate::profile;

/// The composed application: monitoring stack plus cluster deployment unit.
#[derive(Debug, Clone)]
pub struct App {
    pub monitoring: MonitoringStack,
    pub cluster: DeploymentUnit,
}

impl App {
    /// Compose both stacks for `config`, checking the add-on order strictly.
    ///
    /// # Errors
    /// Returns an error if the profile's composition is invalid.
    pub fn synth(config: &DeployConfig) -> Result<Self> {
        Self::synth_with(config, OrderingMode::Strict)
    }

    /// Compose both stacks with an explicit ordering mode.
    ///
    /// # Errors
    /// Returns an error if the profile's composition is invalid.
    pub fn synth_with(config: &DeployConfig, ordering: OrderingMode) -> Result<Self> {
        let monitoring = MonitoringStack::provision(config);
        let endpoint = monitoring.prometheus_endpoint();

        let cluster = EksBlueprint::builder()
            .config(config)
            .cluster_provider(profile::cluster_provider(config.profile)?)
            .add_ons(profile::add_ons(config, &endpoint))
            .ordering(ordering)
            .enable_control_plane_log_types([
                ControlPlaneLogType::Api,
                ControlPlaneLogType::Scheduler,
            ])
            .use_default_secret_encryption(true)
            .import(&monitoring.outputs.prometheus_endpoint)
            .build(profile::deployment_id(config.profile))?;

        info!(
            profile = %config.profile,
            monitoring = %monitoring.id,
            cluster = cluster.id(),
            "Composed application"
        );

        Ok(Self {
            monitoring,
            cluster,
        })
    }

    /// Stacks in the order they must be applied.
    #[must_use]
    pub fn stacks(&self) -> Vec<StackArtifact> {
        vec![
            StackArtifact::Monitoring(self.monitoring.clone()),
            StackArtifact::Cluster(self.cluster.clone()),
        ]
    }

    /// Hand every stack to `engine`, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the engine's error, or [`EngineError::UnappliedDependency`] if a
    /// stack would be applied before one it consumes outputs from.
    pub async fn deploy(
        &self,
        engine: &dyn ProvisioningEngine,
    ) -> std::result::Result<Vec<ApplyReport>, EngineError> {
        let mut applied: HashSet<String> = HashSet::new();
        let mut reports = Vec::new();

        for stack in self.stacks() {
            if let Some(missing) = stack
                .depends_on()
                .into_iter()
                .find(|dependency| !applied.contains(dependency))
            {
                return Err(EngineError::UnappliedDependency {
                    stack: stack.id().to_string(),
                    missing,
                });
            }

            let report = engine.apply(&stack).await.inspect_err(|e| {
                warn!(stack = stack.id(), error = %e, "Stack apply failed");
            })?;
            applied.insert(report.stack_id.clone());
            reports.push(report);
        }

        engine.finalize(&reports).await?;
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addons::{AddOn, AddOnKind};
    use crate::config::Profile;
    use crate::engine::MockProvisioningEngine;
    use mockall::Sequence;

    fn config() -> DeployConfig {
        DeployConfig::new("111111111111", "us-east-1", Profile::Dev).unwrap()
    }

    fn report(stack: &StackArtifact) -> ApplyReport {
        ApplyReport {
            stack_id: stack.id().to_string(),
            depends_on: stack.depends_on(),
            artifact: None,
        }
    }

    #[test]
    fn test_amp_receives_monitoring_endpoint() {
        let app = App::synth(&config()).unwrap();
        let Some(AddOn::Amp(options)) = app.cluster.add_on(AddOnKind::Amp) else {
            panic!("amp add-on missing");
        };
        assert_eq!(options.amp_prometheus_endpoint, app.monitoring.prometheus_endpoint());
        assert_eq!(app.cluster.dependencies(), vec![app.monitoring.id.clone()]);
    }

    #[tokio::test]
    async fn test_deploy_applies_monitoring_first() {
        let app = App::synth(&config()).unwrap();
        let mut engine = MockProvisioningEngine::new();
        let mut seq = Sequence::new();

        engine
            .expect_apply()
            .withf(|stack| stack.id() == "MonitoringStack")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|stack| Ok(report(stack)));
        engine
            .expect_apply()
            .withf(|stack| stack.id() == "example-app1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|stack| Ok(report(stack)));
        engine
            .expect_finalize()
            .withf(|reports| reports.len() == 2)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let reports = app.deploy(&engine).await.unwrap();
        assert_eq!(reports[0].stack_id, "MonitoringStack");
        assert_eq!(reports[1].depends_on, vec!["MonitoringStack".to_string()]);
    }

    #[tokio::test]
    async fn test_deploy_stops_on_first_failure() {
        let app = App::synth(&config()).unwrap();
        let mut engine = MockProvisioningEngine::new();

        engine.expect_apply().times(1).returning(|stack| {
            Err(EngineError::Rejected {
                stack: stack.id().to_string(),
                message: "quota exceeded".into(),
            })
        });
        engine.expect_finalize().times(0);

        let err = app.deploy(&engine).await.unwrap_err();
        assert!(matches!(err, EngineError::Rejected { ref stack, .. } if stack == "MonitoringStack"));
    }

    #[tokio::test]
    async fn test_deploy_refuses_unapplied_dependency() {
        let app = App::synth(&config()).unwrap();
        let mut engine = MockProvisioningEngine::new();

        // Engine reports the monitoring stack under a different id.
        engine.expect_apply().times(1).returning(|_| {
            Ok(ApplyReport {
                stack_id: "Elsewhere".into(),
                depends_on: vec![],
                artifact: None,
            })
        });
        engine.expect_finalize().times(0);

        let err = app.deploy(&engine).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnappliedDependency { ref missing, .. } if missing == "MonitoringStack"
        ));
    }
}
