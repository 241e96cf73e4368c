//! Cluster add-on descriptors.
//!
//! An [`AddOn`] is an immutable, named configuration record for one installable
//! capability. Descriptors never reference each other; the relationships
//! between them live in the catalog ([`AddOnKind::requires`]) and are checked
//! by [`crate::ordering`].

mod kind;
mod options;

use serde::Serialize;
use serde_json::Value;

pub use kind::{AddOnKind, AddOnTier};
pub use options::{
    AmpOptions, ArgoCdOptions, CloudWatchLogsOptions, Consolidation, DeploymentMode,
    GitRepository, HelmChartOptions, KarpenterLimits, KarpenterOptions, KedaOptions, NginxOptions,
    NodeRequirement, RequirementOperator, ResourceQuantities, Taint,
};

/// A desired installed capability and its options.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOn {
    VpcCni,
    EbsCsiDriver,
    CoreDns,
    KubeProxy,
    SecretsStore,
    AwsLoadBalancerController,
    Nginx(NginxOptions),
    CertManager,
    CalicoOperator(HelmChartOptions),
    CloudWatchInsights,
    CloudWatchLogs(CloudWatchLogsOptions),
    AdotCollector,
    CloudWatchAdot,
    Amp(AmpOptions),
    GrafanaOperator,
    MetricsServer,
    Keda(KedaOptions),
    Karpenter(KarpenterOptions),
    ArgoCd(ArgoCdOptions),
}

impl AddOn {
    /// Catalog identity of this descriptor.
    #[must_use]
    pub const fn kind(&self) -> AddOnKind {
        match self {
            Self::VpcCni => AddOnKind::VpcCni,
            Self::EbsCsiDriver => AddOnKind::EbsCsiDriver,
            Self::CoreDns => AddOnKind::CoreDns,
            Self::KubeProxy => AddOnKind::KubeProxy,
            Self::SecretsStore => AddOnKind::SecretsStore,
            Self::AwsLoadBalancerController => AddOnKind::AwsLoadBalancerController,
            Self::Nginx(_) => AddOnKind::Nginx,
            Self::CertManager => AddOnKind::CertManager,
            Self::CalicoOperator(_) => AddOnKind::CalicoOperator,
            Self::CloudWatchInsights => AddOnKind::CloudWatchInsights,
            Self::CloudWatchLogs(_) => AddOnKind::CloudWatchLogs,
            Self::AdotCollector => AddOnKind::AdotCollector,
            Self::CloudWatchAdot => AddOnKind::CloudWatchAdot,
            Self::Amp(_) => AddOnKind::Amp,
            Self::GrafanaOperator => AddOnKind::GrafanaOperator,
            Self::MetricsServer => AddOnKind::MetricsServer,
            Self::Keda(_) => AddOnKind::Keda,
            Self::Karpenter(_) => AddOnKind::Karpenter,
            Self::ArgoCd(_) => AddOnKind::ArgoCd,
        }
    }

    /// Option payload as a JSON object (empty for add-ons using catalog defaults).
    #[must_use]
    pub fn options(&self) -> Value {
        let payload = match self {
            Self::Nginx(o) => serde_json::to_value(o),
            Self::CalicoOperator(o) => serde_json::to_value(o),
            Self::CloudWatchLogs(o) => serde_json::to_value(o),
            Self::Amp(o) => serde_json::to_value(o),
            Self::Keda(o) => serde_json::to_value(o),
            Self::Karpenter(o) => serde_json::to_value(o),
            Self::ArgoCd(o) => serde_json::to_value(o),
            _ => Ok(Value::Object(serde_json::Map::new())),
        };
        // Option structs only hold strings, numbers, bools, lists and string-keyed maps.
        payload.unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
    }

    /// Calico operator pinned to the Tigera chart.
    #[must_use]
    pub fn calico_operator() -> Self {
        Self::CalicoOperator(HelmChartOptions {
            name: "calico-operator".into(),
            namespace: "calico-operator".into(),
            version: "3.26.4".into(),
            chart: "tigera-operator".into(),
            release: "bp-addon-calico-operator".into(),
            repository: "https://projectcalico.docs.tigera.io/charts".into(),
        })
    }

    /// Managed Prometheus bridge writing to `endpoint` from a standalone collector.
    #[must_use]
    pub fn amp(endpoint: impl Into<String>) -> Self {
        Self::Amp(AmpOptions {
            amp_prometheus_endpoint: endpoint.into(),
            deployment_mode: DeploymentMode::Deployment,
        })
    }

    /// GitOps bootstrapper tracking `path` in `repo_url`.
    #[must_use]
    pub fn argocd(repo_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self::ArgoCd(ArgoCdOptions {
            bootstrap_repo: GitRepository {
                repo_url: repo_url.into(),
                path: path.into(),
                target_revision: None,
            },
        })
    }
}

impl Serialize for AddOn {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let kind = self.kind();
        let mut state = serializer.serialize_struct("AddOn", 3)?;
        state.serialize_field("addOn", &kind)?;
        state.serialize_field("tier", &kind.tier())?;
        state.serialize_field("options", &self.options())?;
        state.end()
    }
}
