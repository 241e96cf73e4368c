//! Environment profiles.
//!
//! A profile picks the capacity strategy and the add-on set of a deployment.
//! Add-ons are grouped into tiers that are concatenated in a fixed order:
//! core platform, observability, autoscaling, then the GitOps bootstrapper.

use std::collections::BTreeMap;

use tracing::info;

use crate::addons::{
    AddOn, CloudWatchLogsOptions, Consolidation, KarpenterLimits, KarpenterOptions, KedaOptions,
    NginxOptions, NodeRequirement, RequirementOperator, ResourceQuantities, Taint,
};
use crate::aws::{AmiType, CapacityType, InstanceClass, InstanceSize, InstanceType, KubernetesVersion};
use crate::capacity::{
    AutoscalingNodeGroup, BootstrapOptions, CapacityStrategy, ClusterProvider, ManagedNodeGroup,
};
use crate::config::{DeployConfig, Profile};
use crate::error::Result;

/// EKS cluster name shared by all profiles.
pub const CLUSTER_NAME: &str = "mycluster1";

/// Node group identity shared by all profiles.
pub const NODE_GROUP_ID: &str = "mycluster1-base";

/// Repository the GitOps bootstrapper tracks.
pub const GITOPS_REPO_URL: &str = "https://github.com/aleksmeshr/eks-cdk-example.git";

/// Name of the deployment unit.
#[must_use]
pub const fn deployment_id(profile: Profile) -> &'static str {
    match profile {
        Profile::Dev => "example-app1",
        Profile::Prod => "example-app1-prod",
    }
}

/// Path inside [`GITOPS_REPO_URL`] holding the profile's workloads.
#[must_use]
pub const fn gitops_path(profile: Profile) -> &'static str {
    match profile {
        Profile::Dev => "envs/dev",
        Profile::Prod => "envs/prod",
    }
}

/// Capacity strategy of the profile.
#[must_use]
pub fn capacity(profile: Profile) -> CapacityStrategy {
    match profile {
        Profile::Dev => CapacityStrategy::ManagedPool(ManagedNodeGroup {
            id: NODE_GROUP_ID.into(),
            ami_type: AmiType::Al2X86_64,
            enable_ssm_permissions: true,
            instance_types: vec![InstanceType::of(InstanceClass::T3, InstanceSize::Large)],
            min_size: 2,
            node_group_capacity_type: CapacityType::Spot,
        }),
        Profile::Prod => CapacityStrategy::SelfManaged(AutoscalingNodeGroup {
            id: NODE_GROUP_ID.into(),
            auto_scaling_group_name: NODE_GROUP_ID.into(),
            bootstrap_options: BootstrapOptions {
                kubelet_extra_args: "--max-pods=40".into(),
                use_max_pods: false,
            },
            instance_type: InstanceType::of(InstanceClass::T3, InstanceSize::Medium),
            min_size: Some(3),
            spot_price: None,
        }),
    }
}

/// Cluster control plane and capacity of the profile.
///
/// # Errors
/// Returns an error if the capacity descriptor is invalid.
pub fn cluster_provider(profile: Profile) -> Result<ClusterProvider> {
    ClusterProvider::new(CLUSTER_NAME, KubernetesVersion::v1_27(), capacity(profile))
}

/// Networking, DNS, secrets, ingress and certificates.
#[must_use]
pub fn core_add_ons(profile: Profile) -> Vec<AddOn> {
    let mut add_ons = vec![
        AddOn::VpcCni,
        AddOn::EbsCsiDriver,
        AddOn::CoreDns,
        AddOn::KubeProxy,
        AddOn::SecretsStore,
        AddOn::AwsLoadBalancerController,
        AddOn::Nginx(NginxOptions::without_service()),
        AddOn::CertManager,
    ];
    if profile == Profile::Prod {
        // Per-pod network policies.
        add_ons.push(AddOn::calico_operator());
    }
    add_ons
}

/// Logs, metrics, traces and dashboards. The managed Prometheus bridge writes
/// to `prometheus_endpoint`.
#[must_use]
pub fn observability_add_ons(profile: Profile, prometheus_endpoint: &str) -> Vec<AddOn> {
    let logs = match profile {
        Profile::Dev => AddOn::CloudWatchInsights,
        Profile::Prod => AddOn::CloudWatchLogs(CloudWatchLogsOptions {
            log_group_prefix: format!("/eks/{CLUSTER_NAME}"),
            log_retention_days: 10,
        }),
    };
    vec![
        logs,
        AddOn::AdotCollector,
        AddOn::CloudWatchAdot,
        AddOn::amp(prometheus_endpoint),
        AddOn::GrafanaOperator,
    ]
}

/// Pod and node autoscaling.
#[must_use]
pub fn autoscaling_add_ons(config: &DeployConfig) -> Vec<AddOn> {
    let mut add_ons = vec![AddOn::MetricsServer, AddOn::Keda(KedaOptions::standard())];
    if config.profile == Profile::Prod {
        add_ons.push(AddOn::Karpenter(karpenter_options(&config.region)));
    }
    add_ons
}

/// GitOps bootstrapper; always the last add-on.
#[must_use]
pub fn gitops_add_on(profile: Profile) -> AddOn {
    AddOn::argocd(GITOPS_REPO_URL, gitops_path(profile))
}

/// All tiers of the profile, concatenated in application order.
#[must_use]
pub fn add_ons(config: &DeployConfig, prometheus_endpoint: &str) -> Vec<AddOn> {
    let profile = config.profile;
    let mut add_ons = core_add_ons(profile);
    add_ons.extend(observability_add_ons(profile, prometheus_endpoint));
    add_ons.extend(autoscaling_add_ons(config));
    add_ons.push(gitops_add_on(profile));

    info!(profile = %profile, add_ons = add_ons.len(), "Composed add-on list");
    add_ons
}

fn karpenter_options(region: &str) -> KarpenterOptions {
    KarpenterOptions {
        requirements: vec![
            NodeRequirement::new(
                "node.kubernetes.io/instance-type",
                RequirementOperator::In,
                &["m3.medium"],
            ),
            NodeRequirement::new(
                "topology.kubernetes.io/zone",
                RequirementOperator::NotIn,
                &[format!("{region}e").as_str()],
            ),
            NodeRequirement::new("kubernetes.io/arch", RequirementOperator::In, &["amd64"]),
            NodeRequirement::new("karpenter.sh/capacity-type", RequirementOperator::In, &["spot"]),
        ],
        subnet_tags: BTreeMap::from([("Name".into(), "my-karpenter-subnet-tag".into())]),
        security_group_tags: BTreeMap::from([(
            format!("kubernetes.io/cluster/{CLUSTER_NAME}"),
            "owned".into(),
        )]),
        taints: vec![Taint {
            key: "workload".into(),
            value: "test".into(),
            effect: "NoSchedule".into(),
        }],
        ami_selector: BTreeMap::from([(
            format!("karpenter.sh/discovery/{CLUSTER_NAME}"),
            "*".into(),
        )]),
        consolidation: Consolidation { enabled: true },
        ttl_seconds_until_expired: 2_592_000,
        weight: 20,
        interruption_handling: true,
        limits: KarpenterLimits {
            resources: ResourceQuantities {
                cpu: 20,
                memory: "64Gi".into(),
            },
        },
        tags: BTreeMap::from([("schedule".into(), "always-on".into())]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addons::AddOnKind;
    use crate::ordering;

    fn config(profile: Profile) -> DeployConfig {
        DeployConfig::new("111111111111", "us-east-1", profile).unwrap()
    }

    fn kinds(add_ons: &[AddOn]) -> Vec<AddOnKind> {
        add_ons.iter().map(AddOn::kind).collect()
    }

    #[test]
    fn test_dev_add_on_order() {
        let add_ons = add_ons(&config(Profile::Dev), "endpoint");
        assert_eq!(
            kinds(&add_ons),
            vec![
                AddOnKind::VpcCni,
                AddOnKind::EbsCsiDriver,
                AddOnKind::CoreDns,
                AddOnKind::KubeProxy,
                AddOnKind::SecretsStore,
                AddOnKind::AwsLoadBalancerController,
                AddOnKind::Nginx,
                AddOnKind::CertManager,
                AddOnKind::CloudWatchInsights,
                AddOnKind::AdotCollector,
                AddOnKind::CloudWatchAdot,
                AddOnKind::Amp,
                AddOnKind::GrafanaOperator,
                AddOnKind::MetricsServer,
                AddOnKind::Keda,
                AddOnKind::ArgoCd,
            ]
        );
    }

    #[test]
    fn test_every_profile_passes_validation() {
        for profile in [Profile::Dev, Profile::Prod] {
            let add_ons = add_ons(&config(profile), "endpoint");
            assert!(ordering::validate(&add_ons).is_ok(), "{profile}");
            assert!(cluster_provider(profile).is_ok(), "{profile}");
        }
    }

    #[test]
    fn test_prod_differs_from_dev() {
        let add_ons = add_ons(&config(Profile::Prod), "endpoint");
        let kinds = kinds(&add_ons);
        assert!(kinds.contains(&AddOnKind::CalicoOperator));
        assert!(kinds.contains(&AddOnKind::CloudWatchLogs));
        assert!(!kinds.contains(&AddOnKind::CloudWatchInsights));
        assert!(kinds.contains(&AddOnKind::Karpenter));
        assert!(matches!(capacity(Profile::Prod), CapacityStrategy::SelfManaged(_)));
        assert!(matches!(capacity(Profile::Dev), CapacityStrategy::ManagedPool(_)));
    }

    #[test]
    fn test_karpenter_excludes_fifth_zone_of_region() {
        let options = karpenter_options("eu-west-1");
        let zone = options
            .requirements
            .iter()
            .find(|r| r.key == "topology.kubernetes.io/zone")
            .unwrap();
        assert_eq!(zone.op, RequirementOperator::NotIn);
        assert_eq!(zone.vals, vec!["eu-west-1e"]);
    }

    #[test]
    fn test_prod_karpenter_descriptor_payload() {
        let add_ons = add_ons(&config(Profile::Prod), "endpoint");
        let karpenter = add_ons
            .iter()
            .find(|a| a.kind() == AddOnKind::Karpenter)
            .unwrap();
        let payload = karpenter.options();
        assert_eq!(payload["consolidation"], serde_json::json!({ "enabled": true }));
        assert_eq!(payload["limits"]["resources"]["cpu"], 20);
        assert_eq!(payload["limits"]["resources"]["memory"], "64Gi");
        assert!(payload["limits"].get("cpu").is_none());
    }

    #[test]
    fn test_gitops_targets_profile_path() {
        let AddOn::ArgoCd(options) = gitops_add_on(Profile::Prod) else {
            panic!("expected argocd");
        };
        assert_eq!(options.bootstrap_repo.path, "envs/prod");
        assert_eq!(options.bootstrap_repo.repo_url, GITOPS_REPO_URL);
    }
}
