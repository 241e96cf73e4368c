//! Deployment unit assembly.
//!
//! [`EksBlueprint::builder`] collects the target environment, the cluster
//! provider and the ordered add-ons, checks them, and produces an immutable
//! [`DeploymentUnit`] for the provisioning engine.

use serde::Serialize;
use tracing::{debug, info};

use crate::addons::{AddOn, AddOnKind};
use crate::aws::{ControlPlaneLogType, KubernetesVersion};
use crate::capacity::ClusterProvider;
use crate::config::DeployConfig;
use crate::error::{BlueprintError, Result};
use crate::ordering::OrderingMode;
use crate::template::StackOutput;

/// Entry point for building a deployment unit.
pub struct EksBlueprint;

impl EksBlueprint {
    #[must_use]
    pub fn builder() -> BlueprintBuilder {
        BlueprintBuilder::default()
    }
}

/// The final, immutable description of the cluster deployment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentUnit {
    id: String,
    account: String,
    region: String,
    version: KubernetesVersion,
    cluster_provider: ClusterProvider,
    add_ons: Vec<AddOn>,
    control_plane_log_types: Vec<ControlPlaneLogType>,
    use_default_secret_encryption: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    imports: Vec<StackOutput>,
}

impl DeploymentUnit {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub const fn version(&self) -> &KubernetesVersion {
        &self.version
    }

    #[must_use]
    pub const fn cluster_provider(&self) -> &ClusterProvider {
        &self.cluster_provider
    }

    /// Add-ons in application order.
    #[must_use]
    pub fn add_ons(&self) -> &[AddOn] {
        &self.add_ons
    }

    /// Find the descriptor of a given kind.
    #[must_use]
    pub fn add_on(&self, kind: AddOnKind) -> Option<&AddOn> {
        self.add_ons.iter().find(|a| a.kind() == kind)
    }

    /// Position of a given kind in the application order.
    #[must_use]
    pub fn position(&self, kind: AddOnKind) -> Option<usize> {
        self.add_ons.iter().position(|a| a.kind() == kind)
    }

    #[must_use]
    pub fn control_plane_log_types(&self) -> &[ControlPlaneLogType] {
        &self.control_plane_log_types
    }

    #[must_use]
    pub const fn use_default_secret_encryption(&self) -> bool {
        self.use_default_secret_encryption
    }

    /// Outputs of other stacks this unit consumes.
    #[must_use]
    pub fn imports(&self) -> &[StackOutput] {
        &self.imports
    }

    /// Stacks that must be applied before this one, without duplicates.
    #[must_use]
    pub fn dependencies(&self) -> Vec<String> {
        let mut stacks: Vec<String> = Vec::new();
        for import in &self.imports {
            if !stacks.contains(&import.stack_id) {
                stacks.push(import.stack_id.clone());
            }
        }
        stacks
    }
}

/// Builder for [`DeploymentUnit`].
#[derive(Debug, Default)]
pub struct BlueprintBuilder {
    account: Option<String>,
    region: Option<String>,
    version: KubernetesVersion,
    cluster_provider: Option<ClusterProvider>,
    add_ons: Vec<AddOn>,
    ordering: OrderingMode,
    control_plane_log_types: Vec<ControlPlaneLogType>,
    use_default_secret_encryption: bool,
    imports: Vec<StackOutput>,
}

impl BlueprintBuilder {
    #[must_use]
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Take account and region from a validated configuration.
    #[must_use]
    pub fn config(self, config: &DeployConfig) -> Self {
        self.account(config.account.clone())
            .region(config.region.clone())
    }

    #[must_use]
    pub fn version(mut self, version: KubernetesVersion) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn cluster_provider(mut self, provider: ClusterProvider) -> Self {
        self.cluster_provider = Some(provider);
        self
    }

    /// Append add-ons in application order.
    #[must_use]
    pub fn add_ons(mut self, add_ons: impl IntoIterator<Item = AddOn>) -> Self {
        self.add_ons.extend(add_ons);
        self
    }

    /// How the declared add-on order is checked at build time.
    #[must_use]
    pub fn ordering(mut self, mode: OrderingMode) -> Self {
        self.ordering = mode;
        self
    }

    /// Enable control plane log categories (duplicates are ignored).
    #[must_use]
    pub fn enable_control_plane_log_types(
        mut self,
        log_types: impl IntoIterator<Item = ControlPlaneLogType>,
    ) -> Self {
        for log_type in log_types {
            if !self.control_plane_log_types.contains(&log_type) {
                self.control_plane_log_types.push(log_type);
            }
        }
        self
    }

    #[must_use]
    pub fn use_default_secret_encryption(mut self, enabled: bool) -> Self {
        self.use_default_secret_encryption = enabled;
        self
    }

    /// Record that the unit consumes `output` from another stack.
    #[must_use]
    pub fn import(mut self, output: &StackOutput) -> Self {
        if !self.imports.contains(output) {
            self.imports.push(output.clone());
        }
        self
    }

    /// Check everything and produce the deployment unit named `id`.
    ///
    /// # Errors
    /// Returns an error if a required field is missing or the add-on list
    /// violates the dependency catalog.
    pub fn build(self, id: impl Into<String>) -> Result<DeploymentUnit> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(BlueprintError::MissingField("id"));
        }
        let account = self.account.ok_or(BlueprintError::MissingField("account"))?;
        let region = self.region.ok_or(BlueprintError::MissingField("region"))?;
        let cluster_provider = self
            .cluster_provider
            .ok_or(BlueprintError::MissingField("cluster_provider"))?;
        cluster_provider.capacity.validate()?;

        let add_ons = self.ordering.apply(self.add_ons)?;
        debug!(
            id = %id,
            order = %add_ons.iter().map(|a| a.kind().name()).collect::<Vec<_>>().join(","),
            "Add-on order accepted"
        );

        info!(
            id = %id,
            cluster = %cluster_provider.cluster_name,
            capacity = cluster_provider.capacity.label(),
            add_ons = add_ons.len(),
            "Built deployment unit"
        );

        Ok(DeploymentUnit {
            id,
            account,
            region,
            version: self.version,
            cluster_provider,
            add_ons,
            control_plane_log_types: self.control_plane_log_types,
            use_default_secret_encryption: self.use_default_secret_encryption,
            imports: self.imports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::{AmiType, CapacityType, InstanceClass, InstanceSize, InstanceType};
    use crate::capacity::{CapacityStrategy, ManagedNodeGroup};

    fn provider() -> ClusterProvider {
        ClusterProvider::new(
            "test",
            KubernetesVersion::v1_27(),
            CapacityStrategy::ManagedPool(ManagedNodeGroup {
                id: "test-base".into(),
                ami_type: AmiType::Al2X86_64,
                enable_ssm_permissions: false,
                instance_types: vec![InstanceType::of(InstanceClass::T3, InstanceSize::Large)],
                min_size: 1,
                node_group_capacity_type: CapacityType::OnDemand,
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_build_requires_fields() {
        let err = EksBlueprint::builder()
            .region("us-east-1")
            .cluster_provider(provider())
            .build("app")
            .unwrap_err();
        assert!(matches!(err, BlueprintError::MissingField("account")));

        let err = EksBlueprint::builder()
            .account("111111111111")
            .region("us-east-1")
            .build("app")
            .unwrap_err();
        assert!(matches!(err, BlueprintError::MissingField("cluster_provider")));
    }

    #[test]
    fn test_build_rejects_misordered_add_ons() {
        let err = EksBlueprint::builder()
            .account("111111111111")
            .region("us-east-1")
            .cluster_provider(provider())
            .add_ons([AddOn::AdotCollector, AddOn::CertManager])
            .build("app")
            .unwrap_err();
        assert!(matches!(err, BlueprintError::OrderingViolation { .. }));
    }

    #[test]
    fn test_build_resolve_mode_reorders() {
        let unit = EksBlueprint::builder()
            .account("111111111111")
            .region("us-east-1")
            .cluster_provider(provider())
            .ordering(OrderingMode::Resolve)
            .add_ons([AddOn::AdotCollector, AddOn::CertManager])
            .build("app")
            .unwrap();
        assert_eq!(unit.position(AddOnKind::CertManager), Some(0));
        assert_eq!(unit.position(AddOnKind::AdotCollector), Some(1));
    }

    #[test]
    fn test_log_types_deduplicated() {
        let unit = EksBlueprint::builder()
            .account("111111111111")
            .region("us-east-1")
            .cluster_provider(provider())
            .enable_control_plane_log_types([ControlPlaneLogType::Api, ControlPlaneLogType::Api])
            .enable_control_plane_log_types([ControlPlaneLogType::Scheduler])
            .use_default_secret_encryption(true)
            .build("app")
            .unwrap();
        assert_eq!(
            unit.control_plane_log_types(),
            &[ControlPlaneLogType::Api, ControlPlaneLogType::Scheduler]
        );
        assert!(unit.use_default_secret_encryption());
        assert_eq!(unit.version(), &KubernetesVersion::Auto);
    }

    #[test]
    fn test_dependencies_from_imports() {
        let output = StackOutput::new("MonitoringStack", "Ws", "PrometheusEndpoint");
        let unit = EksBlueprint::builder()
            .account("111111111111")
            .region("us-east-1")
            .cluster_provider(provider())
            .import(&output)
            .import(&output)
            .build("app")
            .unwrap();
        assert_eq!(unit.imports().len(), 1);
        assert_eq!(unit.dependencies(), vec!["MonitoringStack".to_string()]);
    }
}
