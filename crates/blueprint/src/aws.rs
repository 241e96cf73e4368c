//! AWS value types shared by the cluster and monitoring stacks.

use serde::Serialize;

// ============================================================================
// EC2
// ============================================================================

/// Instance family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceClass {
    T3,
    M5,
    M6i,
    C6i,
    R6i,
}

impl std::fmt::Display for InstanceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::T3 => write!(f, "t3"),
            Self::M5 => write!(f, "m5"),
            Self::M6i => write!(f, "m6i"),
            Self::C6i => write!(f, "c6i"),
            Self::R6i => write!(f, "r6i"),
        }
    }
}

/// Instance size within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceSize {
    Small,
    Medium,
    Large,
    Xlarge,
    Xlarge2,
}

impl std::fmt::Display for InstanceSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Medium => write!(f, "medium"),
            Self::Large => write!(f, "large"),
            Self::Xlarge => write!(f, "xlarge"),
            Self::Xlarge2 => write!(f, "2xlarge"),
        }
    }
}

/// EC2 instance shape, rendered as `<class>.<size>` (e.g., "t3.large").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceType {
    pub class: InstanceClass,
    pub size: InstanceSize,
}

impl InstanceType {
    #[must_use]
    pub const fn of(class: InstanceClass, size: InstanceSize) -> Self {
        Self { class, size }
    }
}

impl std::fmt::Display for InstanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.class, self.size)
    }
}

impl Serialize for InstanceType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// EKS
// ============================================================================

/// Node group AMI family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AmiType {
    #[serde(rename = "AL2_x86_64")]
    Al2X86_64,
    #[serde(rename = "AL2_ARM_64")]
    Al2Arm64,
    #[serde(rename = "BOTTLEROCKET_x86_64")]
    BottlerocketX86_64,
}

/// Purchasing option for node group capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapacityType {
    OnDemand,
    Spot,
}

impl std::fmt::Display for CapacityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OnDemand => write!(f, "ON_DEMAND"),
            Self::Spot => write!(f, "SPOT"),
        }
    }
}

/// Kubernetes version requested from EKS.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KubernetesVersion {
    /// Let the provisioning engine pick the latest supported version.
    #[default]
    Auto,
    /// A specific `major.minor` release.
    Pinned(String),
}

impl KubernetesVersion {
    pub const V1_27: &'static str = "1.27";

    #[must_use]
    pub fn v1_27() -> Self {
        Self::Pinned(Self::V1_27.to_string())
    }
}

impl std::fmt::Display for KubernetesVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Pinned(version) => write!(f, "{version}"),
        }
    }
}

impl Serialize for KubernetesVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Control plane log categories shipped to CloudWatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlPlaneLogType {
    Api,
    Audit,
    Authenticator,
    ControllerManager,
    Scheduler,
}

impl std::fmt::Display for ControlPlaneLogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Audit => write!(f, "audit"),
            Self::Authenticator => write!(f, "authenticator"),
            Self::ControllerManager => write!(f, "controllerManager"),
            Self::Scheduler => write!(f, "scheduler"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_type_display() {
        let t3_large = InstanceType::of(InstanceClass::T3, InstanceSize::Large);
        assert_eq!(t3_large.to_string(), "t3.large");
        assert_eq!(
            InstanceType::of(InstanceClass::M6i, InstanceSize::Xlarge2).to_string(),
            "m6i.2xlarge"
        );
        assert_eq!(serde_json::to_value(t3_large).unwrap(), "t3.large");
    }

    #[test]
    fn test_eks_enums_serialize_like_the_api() {
        assert_eq!(serde_json::to_value(AmiType::Al2X86_64).unwrap(), "AL2_x86_64");
        assert_eq!(serde_json::to_value(CapacityType::Spot).unwrap(), "SPOT");
        assert_eq!(serde_json::to_value(CapacityType::OnDemand).unwrap(), "ON_DEMAND");
        assert_eq!(serde_json::to_value(KubernetesVersion::Auto).unwrap(), "auto");
        assert_eq!(serde_json::to_value(KubernetesVersion::v1_27()).unwrap(), "1.27");
    }
}
