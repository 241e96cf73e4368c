//! Compute capacity backing the cluster.
//!
//! Exactly one strategy is active per deployment: a fixed managed node group
//! or a self-managed auto scaling group. The strategy is a tagged variant, so
//! "both" and "neither" are unrepresentable once a [`CapacityStrategy`] exists.

use serde::Serialize;

use crate::aws::{AmiType, CapacityType, InstanceType, KubernetesVersion};
use crate::error::{BlueprintError, Result};

/// EKS managed node group. Maximum and desired sizes are left to engine defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedNodeGroup {
    pub id: String,
    pub ami_type: AmiType,
    pub enable_ssm_permissions: bool,
    pub instance_types: Vec<InstanceType>,
    pub min_size: u32,
    pub node_group_capacity_type: CapacityType,
}

/// Kubelet bootstrap arguments for self-managed nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapOptions {
    pub kubelet_extra_args: String,
    pub use_max_pods: bool,
}

/// Self-managed auto scaling group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingNodeGroup {
    pub id: String,
    pub auto_scaling_group_name: String,
    pub bootstrap_options: BootstrapOptions,
    pub instance_type: InstanceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot_price: Option<String>,
}

/// The one capacity strategy of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "camelCase")]
pub enum CapacityStrategy {
    ManagedPool(ManagedNodeGroup),
    SelfManaged(AutoscalingNodeGroup),
}

impl CapacityStrategy {
    /// Build a strategy from two optional inputs, such as values read from a
    /// file where either section may be present.
    ///
    /// # Errors
    /// Returns [`BlueprintError::CapacityConflict`] when both are given and
    /// [`BlueprintError::NoCapacity`] when neither is.
    pub fn from_parts(
        managed: Option<ManagedNodeGroup>,
        self_managed: Option<AutoscalingNodeGroup>,
    ) -> Result<Self> {
        let strategy = match (managed, self_managed) {
            (Some(_), Some(_)) => return Err(BlueprintError::CapacityConflict),
            (None, None) => return Err(BlueprintError::NoCapacity),
            (Some(group), None) => Self::ManagedPool(group),
            (None, Some(group)) => Self::SelfManaged(group),
        };
        strategy.validate()?;
        Ok(strategy)
    }

    /// Identity of the node group.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::ManagedPool(group) => &group.id,
            Self::SelfManaged(group) => &group.id,
        }
    }

    /// Short label for summaries.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ManagedPool(_) => "managed pool",
            Self::SelfManaged(_) => "self-managed group",
        }
    }

    /// Check the fields the provisioning engine cannot default.
    ///
    /// # Errors
    /// Returns [`BlueprintError::InvalidCapacity`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.id().trim().is_empty() {
            return Err(BlueprintError::InvalidCapacity("node group id is empty".into()));
        }
        match self {
            Self::ManagedPool(group) if group.instance_types.is_empty() => Err(
                BlueprintError::InvalidCapacity(format!(
                    "managed pool {} has no instance types",
                    group.id
                )),
            ),
            Self::SelfManaged(group) if group.auto_scaling_group_name.trim().is_empty() => {
                Err(BlueprintError::InvalidCapacity(format!(
                    "self-managed group {} has no scaling group name",
                    group.id
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Cluster control plane plus the capacity backing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProvider {
    pub cluster_name: String,
    pub version: KubernetesVersion,
    pub capacity: CapacityStrategy,
}

impl ClusterProvider {
    /// Create a validated cluster provider.
    ///
    /// # Errors
    /// Returns an error if the name is empty or the capacity strategy is invalid.
    pub fn new(
        cluster_name: impl Into<String>,
        version: KubernetesVersion,
        capacity: CapacityStrategy,
    ) -> Result<Self> {
        let cluster_name = cluster_name.into();
        if cluster_name.trim().is_empty() {
            return Err(BlueprintError::MissingField("cluster_name"));
        }
        capacity.validate()?;
        Ok(Self {
            cluster_name,
            version,
            capacity,
        })
    }
}
