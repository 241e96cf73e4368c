//! Add-on identities and the dependency catalog.

use serde::Serialize;

/// Tier an add-on belongs to. Tiers are concatenated in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddOnTier {
    /// Networking, DNS, secrets, ingress, certificates.
    Core,
    /// Logs, metrics, traces, dashboards.
    Observability,
    /// Pod and node autoscaling.
    Autoscaling,
    /// Declarative workload management.
    GitOps,
}

impl AddOnTier {
    /// Stable tier name, as serialized.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Observability => "observability",
            Self::Autoscaling => "autoscaling",
            Self::GitOps => "gitops",
        }
    }
}

impl std::fmt::Display for AddOnTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of an add-on in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddOnKind {
    VpcCni,
    EbsCsiDriver,
    CoreDns,
    KubeProxy,
    SecretsStore,
    AwsLoadBalancerController,
    Nginx,
    CertManager,
    CalicoOperator,
    CloudWatchInsights,
    CloudWatchLogs,
    AdotCollector,
    CloudWatchAdot,
    Amp,
    GrafanaOperator,
    MetricsServer,
    Keda,
    Karpenter,
    ArgoCd,
}

impl AddOnKind {
    /// Every catalog entry.
    pub const ALL: [Self; 19] = [
        Self::VpcCni,
        Self::EbsCsiDriver,
        Self::CoreDns,
        Self::KubeProxy,
        Self::SecretsStore,
        Self::AwsLoadBalancerController,
        Self::Nginx,
        Self::CertManager,
        Self::CalicoOperator,
        Self::CloudWatchInsights,
        Self::CloudWatchLogs,
        Self::AdotCollector,
        Self::CloudWatchAdot,
        Self::Amp,
        Self::GrafanaOperator,
        Self::MetricsServer,
        Self::Keda,
        Self::Karpenter,
        Self::ArgoCd,
    ];

    /// Stable catalog name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::VpcCni => "vpc-cni",
            Self::EbsCsiDriver => "ebs-csi-driver",
            Self::CoreDns => "coredns",
            Self::KubeProxy => "kube-proxy",
            Self::SecretsStore => "secrets-store",
            Self::AwsLoadBalancerController => "aws-load-balancer-controller",
            Self::Nginx => "nginx",
            Self::CertManager => "cert-manager",
            Self::CalicoOperator => "calico-operator",
            Self::CloudWatchInsights => "cloudwatch-insights",
            Self::CloudWatchLogs => "cloudwatch-logs",
            Self::AdotCollector => "adot-collector",
            Self::CloudWatchAdot => "cloudwatch-adot",
            Self::Amp => "amp",
            Self::GrafanaOperator => "grafana-operator",
            Self::MetricsServer => "metrics-server",
            Self::Keda => "keda",
            Self::Karpenter => "karpenter",
            Self::ArgoCd => "argocd",
        }
    }

    #[must_use]
    pub const fn tier(self) -> AddOnTier {
        match self {
            Self::VpcCni
            | Self::EbsCsiDriver
            | Self::CoreDns
            | Self::KubeProxy
            | Self::SecretsStore
            | Self::AwsLoadBalancerController
            | Self::Nginx
            | Self::CertManager
            | Self::CalicoOperator => AddOnTier::Core,
            Self::CloudWatchInsights
            | Self::CloudWatchLogs
            | Self::AdotCollector
            | Self::CloudWatchAdot
            | Self::Amp
            | Self::GrafanaOperator => AddOnTier::Observability,
            Self::MetricsServer | Self::Keda | Self::Karpenter => AddOnTier::Autoscaling,
            Self::ArgoCd => AddOnTier::GitOps,
        }
    }

    /// Capabilities that must be installed before this add-on.
    #[must_use]
    pub const fn requires(self) -> &'static [Self] {
        match self {
            Self::CoreDns | Self::CalicoOperator => &[Self::VpcCni],
            Self::Nginx => &[Self::AwsLoadBalancerController],
            // The collector's admission webhooks need issued certificates.
            Self::AdotCollector => &[Self::CertManager],
            Self::CloudWatchAdot | Self::Amp => &[Self::AdotCollector],
            _ => &[],
        }
    }

    /// Add-ons that cannot be enabled together with this one.
    #[must_use]
    pub const fn conflicts_with(self) -> &'static [Self] {
        match self {
            Self::CloudWatchInsights => &[Self::CloudWatchLogs],
            Self::CloudWatchLogs => &[Self::CloudWatchInsights],
            _ => &[],
        }
    }

    /// Terminal add-ons take over workload management and must be applied last.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ArgoCd)
    }
}

impl std::fmt::Display for AddOnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for AddOnKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("Unknown add-on: {s}"))
    }
}

impl Serialize for AddOnKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in AddOnKind::ALL {
            assert_eq!(kind.name().parse::<AddOnKind>().unwrap(), kind);
        }
        assert!("istio".parse::<AddOnKind>().is_err());
    }

    #[test]
    fn test_dependencies_stay_within_earlier_or_same_tier() {
        for kind in AddOnKind::ALL {
            for dep in kind.requires() {
                assert!(dep.tier() <= kind.tier(), "{kind} depends on later tier {dep}");
                assert!(!dep.is_terminal());
            }
        }
    }

    #[test]
    fn test_conflicts_are_symmetric() {
        for kind in AddOnKind::ALL {
            for other in kind.conflicts_with() {
                assert!(other.conflicts_with().contains(&kind));
            }
        }
    }

    #[test]
    fn test_only_gitops_is_terminal() {
        let terminal: Vec<_> = AddOnKind::ALL.into_iter().filter(|k| k.is_terminal()).collect();
        assert_eq!(terminal, vec![AddOnKind::ArgoCd]);
        assert_eq!(AddOnKind::ArgoCd.tier(), AddOnTier::GitOps);
    }

    #[test]
    fn test_tier_display_matches_serialized_name() {
        for tier in [
            AddOnTier::Core,
            AddOnTier::Observability,
            AddOnTier::Autoscaling,
            AddOnTier::GitOps,
        ] {
            assert_eq!(serde_json::to_value(tier).unwrap(), tier.to_string());
        }
        assert_eq!(AddOnTier::GitOps.to_string(), "gitops");
    }
}
