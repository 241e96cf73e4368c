//! Option payloads for configurable add-ons.
//!
//! Field names serialize in the catalog's camelCase option vocabulary.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

/// Nginx ingress controller chart values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NginxOptions {
    /// Raw Helm values merged over the chart defaults.
    pub values: Value,
}

impl NginxOptions {
    /// Controller without its own `LoadBalancer` service; traffic enters through
    /// the AWS load balancer controller instead.
    #[must_use]
    pub fn without_service() -> Self {
        Self {
            values: json!({ "controller": { "service": { "create": false } } }),
        }
    }
}

/// Generic Helm chart coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmChartOptions {
    pub name: String,
    pub namespace: String,
    pub version: String,
    pub chart: String,
    pub release: String,
    pub repository: String,
}

/// Fluent Bit log shipping to CloudWatch Logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudWatchLogsOptions {
    pub log_group_prefix: String,
    pub log_retention_days: u32,
}

/// How the OpenTelemetry collector for managed Prometheus is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Standalone `Deployment`.
    Deployment,
    DaemonSet,
    StatefulSet,
    /// Injected next to each workload.
    Sidecar,
}

/// Managed Prometheus bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmpOptions {
    /// Remote-write/query endpoint of the Prometheus workspace.
    pub amp_prometheus_endpoint: String,
    pub deployment_mode: DeploymentMode,
}

/// Event-driven autoscaler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KedaOptions {
    pub namespace: String,
    pub pod_security_context_fs_group: u32,
    pub security_context_run_as_group: u32,
    pub security_context_run_as_user: u32,
    /// Managed policies granted to the operator's service account.
    pub irsa_roles: Vec<String>,
}

impl KedaOptions {
    /// Operator running as uid/gid 1001 with CloudWatch and SQS access.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            namespace: "keda".into(),
            pod_security_context_fs_group: 1001,
            security_context_run_as_group: 1001,
            security_context_run_as_user: 1001,
            irsa_roles: vec!["CloudWatchFullAccess".into(), "AmazonSQSFullAccess".into()],
        }
    }
}

/// Operator of a node requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequirementOperator {
    In,
    NotIn,
}

/// Scheduling constraint for provisioned nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRequirement {
    pub key: String,
    pub op: RequirementOperator,
    pub vals: Vec<String>,
}

impl NodeRequirement {
    #[must_use]
    pub fn new(key: &str, op: RequirementOperator, vals: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            op,
            vals: vals.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Node taint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Taint {
    pub key: String,
    pub value: String,
    pub effect: String,
}

/// Node consolidation switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Consolidation {
    pub enabled: bool,
}

/// Aggregate resources the provisioner may launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceQuantities {
    pub cpu: u32,
    pub memory: String,
}

/// Resource ceiling for everything the provisioner launches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KarpenterLimits {
    pub resources: ResourceQuantities,
}

/// Node autoscaler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KarpenterOptions {
    pub requirements: Vec<NodeRequirement>,
    pub subnet_tags: BTreeMap<String, String>,
    pub security_group_tags: BTreeMap<String, String>,
    pub taints: Vec<Taint>,
    pub ami_selector: BTreeMap<String, String>,
    pub consolidation: Consolidation,
    pub ttl_seconds_until_expired: u64,
    pub weight: u32,
    pub interruption_handling: bool,
    pub limits: KarpenterLimits,
    pub tags: BTreeMap<String, String>,
}

/// Git repository used as the source of truth for workloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    pub repo_url: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_revision: Option<String>,
}

/// GitOps bootstrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgoCdOptions {
    pub bootstrap_repo: GitRepository,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keda_payload_names() {
        let payload = serde_json::to_value(KedaOptions::standard()).unwrap();
        assert_eq!(payload["namespace"], "keda");
        assert_eq!(payload["podSecurityContextFsGroup"], 1001);
        assert_eq!(payload["securityContextRunAsGroup"], 1001);
        assert_eq!(payload["securityContextRunAsUser"], 1001);
        assert_eq!(
            payload["irsaRoles"],
            json!(["CloudWatchFullAccess", "AmazonSQSFullAccess"])
        );
    }

    #[test]
    fn test_amp_payload_uses_standalone_deployment() {
        let options = AmpOptions {
            amp_prometheus_endpoint: "https://example/".into(),
            deployment_mode: DeploymentMode::Deployment,
        };
        let payload = serde_json::to_value(options).unwrap();
        assert_eq!(payload["deploymentMode"], "deployment");
        assert_eq!(payload["ampPrometheusEndpoint"], "https://example/");
    }

    #[test]
    fn test_karpenter_payload_nests_consolidation_and_limits() {
        let options = KarpenterOptions {
            requirements: vec![NodeRequirement::new(
                "kubernetes.io/arch",
                RequirementOperator::In,
                &["amd64"],
            )],
            subnet_tags: BTreeMap::new(),
            security_group_tags: BTreeMap::new(),
            taints: vec![],
            ami_selector: BTreeMap::new(),
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
            tags: BTreeMap::new(),
        };
        let payload = serde_json::to_value(options).unwrap();
        assert_eq!(payload["consolidation"], json!({ "enabled": true }));
        assert_eq!(
            payload["limits"],
            json!({ "resources": { "cpu": 20, "memory": "64Gi" } })
        );
        assert_eq!(payload["ttlSecondsUntilExpired"], 2_592_000);
        assert_eq!(payload["interruptionHandling"], true);
        assert_eq!(payload["requirements"][0]["op"], "In");
    }

    #[test]
    fn test_git_repository_omits_missing_revision() {
        let repo = GitRepository {
            repo_url: "https://github.com/org/repo.git".into(),
            path: "envs/dev".into(),
            target_revision: None,
        };
        let payload = serde_json::to_value(repo).unwrap();
        assert!(payload.get("targetRevision").is_none());
        assert_eq!(payload["repoUrl"], "https://github.com/org/repo.git");
    }
}
