//! Managed monitoring backends.
//!
//! The monitoring stack owns a managed Prometheus workspace and a managed
//! Grafana workspace. It is independent of the cluster lifecycle and is built
//! first, so the Prometheus endpoint exists before the cluster add-ons that
//! write to it are configured.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::config::DeployConfig;
use crate::template::{
    EgressRule, GrafanaVpcConfiguration, GrafanaWorkspaceProps, Intrinsic, LogGroupProps,
    LoggingConfiguration, PrometheusWorkspaceProps, RemovalPolicy, Resource, ResourceProperties,
    RoleProps, SecurityGroupProps, StackOutput, VpcLookup,
};

/// Stack identity.
pub const MONITORING_STACK_ID: &str = "MonitoringStack";

/// Log group receiving Prometheus workspace logs.
pub const AMP_LOG_GROUP_NAME: &str = "/aws/prometheus/my1";

/// Retention of the workspace log group.
pub const AMP_LOG_RETENTION_DAYS: u32 = 7;

/// Grafana workspace name.
pub const GRAFANA_WORKSPACE_NAME: &str = "my1";

/// Managed policy granting Grafana read access to Prometheus workspaces.
pub const GRAFANA_PROMETHEUS_POLICY: &str = "arn:aws:iam::aws:policy/AmazonPrometheusFullAccess";

const LOG_GROUP_ID: &str = "AmpLogGroup";
const PROMETHEUS_WORKSPACE_ID: &str = "MyPrometheusWorkspace";
const GRAFANA_SG_ID: &str = "GrafanaSG";
const GRAFANA_ROLE_ID: &str = "GrafanaRole";
const GRAFANA_WORKSPACE_ID: &str = "Grafana";

/// Values the monitoring stack exposes to other stacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitoringOutputs {
    /// Remote-write and query endpoint of the Prometheus workspace.
    pub prometheus_endpoint: StackOutput,
}

/// Managed Prometheus and Grafana workspaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringStack {
    pub id: String,
    pub account: String,
    pub region: String,
    pub vpc: VpcLookup,
    pub resources: BTreeMap<String, Resource>,
    pub outputs: MonitoringOutputs,
}

impl MonitoringStack {
    /// Declare the monitoring resources for the configured account and region.
    #[must_use]
    pub fn provision(config: &DeployConfig) -> Self {
        let vpc = VpcLookup::default_vpc();
        let mut resources = BTreeMap::new();

        resources.insert(
            LOG_GROUP_ID.to_string(),
            Resource::new(ResourceProperties::LogGroup(LogGroupProps {
                log_group_name: AMP_LOG_GROUP_NAME.into(),
                retention_in_days: AMP_LOG_RETENTION_DAYS,
            }))
            .with_removal_policy(RemovalPolicy::Destroy),
        );

        resources.insert(
            PROMETHEUS_WORKSPACE_ID.to_string(),
            Resource::new(ResourceProperties::PrometheusWorkspace(
                PrometheusWorkspaceProps {
                    alias: "alias".into(),
                    logging_configuration: LoggingConfiguration {
                        log_group_arn: Intrinsic::get_att(LOG_GROUP_ID, "Arn"),
                    },
                },
            )),
        );

        Self::declare_grafana(config, &vpc, &mut resources);

        let outputs = MonitoringOutputs {
            prometheus_endpoint: StackOutput::new(
                MONITORING_STACK_ID,
                PROMETHEUS_WORKSPACE_ID,
                "PrometheusEndpoint",
            ),
        };

        info!(
            stack = MONITORING_STACK_ID,
            account = %config.account,
            region = %config.region,
            resources = resources.len(),
            "Declared monitoring stack"
        );

        Self {
            id: MONITORING_STACK_ID.to_string(),
            account: config.account.clone(),
            region: config.region.clone(),
            vpc,
            resources,
            outputs,
        }
    }

    fn declare_grafana(
        config: &DeployConfig,
        vpc: &VpcLookup,
        resources: &mut BTreeMap<String, Resource>,
    ) {
        resources.insert(
            GRAFANA_SG_ID.to_string(),
            Resource::new(ResourceProperties::SecurityGroup(SecurityGroupProps {
                group_description: "SG for Managed Grafana".into(),
                vpc_id: vpc.vpc_id_token(),
                security_group_egress: vec![EgressRule::allow_all()],
            })),
        );

        resources.insert(
            GRAFANA_ROLE_ID.to_string(),
            Resource::new(ResourceProperties::Role(RoleProps {
                description: "Role for Grafana workspace".into(),
                assume_role_policy_document: RoleProps::service_trust_policy(
                    "grafana.amazonaws.com",
                ),
                managed_policy_arns: vec![GRAFANA_PROMETHEUS_POLICY.into()],
            })),
        );

        let subnet_ids = config
            .availability_zones()
            .iter()
            .map(|zone| vpc.subnet_token(zone))
            .collect();

        resources.insert(
            GRAFANA_WORKSPACE_ID.to_string(),
            Resource::new(ResourceProperties::GrafanaWorkspace(GrafanaWorkspaceProps {
                name: GRAFANA_WORKSPACE_NAME.into(),
                account_access_type: "CURRENT_ACCOUNT".into(),
                permission_type: "SERVICE_MANAGED".into(),
                role_arn: Intrinsic::get_att(GRAFANA_ROLE_ID, "Arn"),
                authentication_providers: vec!["SAML".into()],
                notification_destinations: vec!["SNS".into()],
                vpc_configuration: GrafanaVpcConfiguration {
                    security_group_ids: vec![Intrinsic::get_att(GRAFANA_SG_ID, "GroupId")],
                    subnet_ids,
                },
                data_sources: vec!["PROMETHEUS".into()],
                plugin_admin_enabled: true,
            })),
        );
    }

    /// Endpoint of the Prometheus workspace as the string consumers embed.
    ///
    /// The value is fixed for the lifetime of the stack.
    #[must_use]
    pub fn prometheus_endpoint(&self) -> String {
        self.outputs.prometheus_endpoint.token()
    }
}
