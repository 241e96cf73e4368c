//! Resource declarations handed to the provisioning engine.
//!
//! Values that only exist after the engine has created a resource (ARNs,
//! endpoints, looked-up VPC ids) are carried as symbolic references and
//! resolved by the engine at apply time.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Attribute of a resource in the same stack, computed by the provisioning
/// engine (`Fn::GetAtt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intrinsic {
    pub logical_id: String,
    pub attribute: String,
}

impl Intrinsic {
    #[must_use]
    pub fn get_att(logical_id: &str, attribute: &str) -> Self {
        Self {
            logical_id: logical_id.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

impl Serialize for Intrinsic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("Fn::GetAtt", &[&self.logical_id, &self.attribute])?;
        map.end()
    }
}

/// What happens to a resource when its stack is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemovalPolicy {
    #[serde(rename = "Delete")]
    Destroy,
    Retain,
    Snapshot,
}

/// A value exported by one stack for another to consume.
///
/// The consumer embeds [`StackOutput::token`], a placeholder string the
/// engine substitutes with the real value once the producing stack exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutput {
    pub stack_id: String,
    pub logical_id: String,
    pub attribute: String,
}

impl StackOutput {
    #[must_use]
    pub fn new(stack_id: &str, logical_id: &str, attribute: &str) -> Self {
        Self {
            stack_id: stack_id.to_string(),
            logical_id: logical_id.to_string(),
            attribute: attribute.to_string(),
        }
    }

    /// Name under which the value is exported across stacks.
    #[must_use]
    pub fn export_name(&self) -> String {
        format!("{}:{}", self.stack_id, self.attribute)
    }

    /// Placeholder string embedded by consumers.
    #[must_use]
    pub fn token(&self) -> String {
        format!(
            "${{Token[{}.{}.{}]}}",
            self.stack_id, self.logical_id, self.attribute
        )
    }
}

impl Serialize for StackOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(
            "Value",
            &Intrinsic::get_att(&self.logical_id, &self.attribute),
        )?;
        map.serialize_entry("Export", &BTreeMap::from([("Name", self.export_name())]))?;
        map.end()
    }
}

/// Lookup of an existing VPC, resolved by the engine from account context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcLookup {
    pub is_default: bool,
}

impl VpcLookup {
    #[must_use]
    pub const fn default_vpc() -> Self {
        Self { is_default: true }
    }

    fn key(&self) -> String {
        format!("vpc-provider:isDefault={}", self.is_default)
    }

    /// Placeholder for the VPC id.
    #[must_use]
    pub fn vpc_id_token(&self) -> String {
        format!("${{Lookup[{}].vpcId}}", self.key())
    }

    /// Placeholder for the subnet in `availability_zone`.
    #[must_use]
    pub fn subnet_token(&self, availability_zone: &str) -> String {
        format!("${{Lookup[{}].subnet[{availability_zone}]}}", self.key())
    }
}

/// Properties of a supported resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResourceProperties {
    LogGroup(LogGroupProps),
    PrometheusWorkspace(PrometheusWorkspaceProps),
    SecurityGroup(SecurityGroupProps),
    Role(RoleProps),
    GrafanaWorkspace(GrafanaWorkspaceProps),
}

impl ResourceProperties {
    /// Resource type name understood by the engine.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::LogGroup(_) => "AWS::Logs::LogGroup",
            Self::PrometheusWorkspace(_) => "AWS::APS::Workspace",
            Self::SecurityGroup(_) => "AWS::EC2::SecurityGroup",
            Self::Role(_) => "AWS::IAM::Role",
            Self::GrafanaWorkspace(_) => "AWS::Grafana::Workspace",
        }
    }
}

/// A declared resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub properties: ResourceProperties,
    pub removal_policy: Option<RemovalPolicy>,
}

impl Resource {
    #[must_use]
    pub const fn new(properties: ResourceProperties) -> Self {
        Self {
            properties,
            removal_policy: None,
        }
    }

    #[must_use]
    pub const fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = Some(policy);
        self
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.removal_policy.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("Type", self.properties.type_name())?;
        map.serialize_entry("Properties", &self.properties)?;
        if let Some(policy) = self.removal_policy {
            map.serialize_entry("DeletionPolicy", &policy)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogGroupProps {
    pub log_group_name: String,
    pub retention_in_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoggingConfiguration {
    pub log_group_arn: Intrinsic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrometheusWorkspaceProps {
    pub alias: String,
    pub logging_configuration: LoggingConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EgressRule {
    pub cidr_ip: String,
    pub ip_protocol: String,
    pub description: String,
}

impl EgressRule {
    /// Allow all outbound IPv4 traffic.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            cidr_ip: "0.0.0.0/0".into(),
            ip_protocol: "-1".into(),
            description: "Allow all outbound traffic by default".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupProps {
    pub group_description: String,
    pub vpc_id: String,
    pub security_group_egress: Vec<EgressRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleProps {
    pub description: String,
    pub assume_role_policy_document: serde_json::Value,
    pub managed_policy_arns: Vec<String>,
}

impl RoleProps {
    /// Trust policy allowing `service` to assume the role.
    #[must_use]
    pub fn service_trust_policy(service: &str) -> serde_json::Value {
        serde_json::json!({
            "Version": "2012-10-17",
            "Statement": [{
                "Action": "sts:AssumeRole",
                "Effect": "Allow",
                "Principal": { "Service": service },
            }],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GrafanaVpcConfiguration {
    pub security_group_ids: Vec<Intrinsic>,
    pub subnet_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GrafanaWorkspaceProps {
    pub name: String,
    pub account_access_type: String,
    pub permission_type: String,
    pub role_arn: Intrinsic,
    pub authentication_providers: Vec<String>,
    pub notification_destinations: Vec<String>,
    pub vpc_configuration: GrafanaVpcConfiguration,
    pub data_sources: Vec<String>,
    pub plugin_admin_enabled: bool,
}
