use anyhow::Context;
use async_trait::async_trait;
use rusoto_ec2::{DescribeFlowLogsRequest, DescribeInstancesRequest, Ec2, Ec2Client, Filter};
use thiserror::Error;

/// Failures while mapping an address to its flow log location. All of
/// these abort the run; there is no partial report.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no instance found with private IP {0}")]
    UnknownAddress(String),
    #[error("no flow log configured for {0}")]
    NoFlowLog(String),
    #[error("flow log for {0} has no log group name")]
    MissingLogGroup(String),
}

/// Port over the cloud inventory: which network owns an address, and where
/// that network's flow logs land.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn owner_network(&self, private_ip: &str) -> anyhow::Result<String>;
    async fn flow_log_group(&self, vpc_id: &str) -> anyhow::Result<String>;
}

/// EC2-backed inventory.
pub struct Ec2Inventory {
    client: Ec2Client,
}

impl Ec2Inventory {
    pub fn new(client: Ec2Client) -> Ec2Inventory {
        Ec2Inventory { client }
    }
}

fn filter(name: &str, value: &str) -> Filter {
    Filter {
        name: Some(name.to_string()),
        values: Some(vec![value.to_string()]),
    }
}

#[async_trait]
impl Inventory for Ec2Inventory {
    async fn owner_network(&self, private_ip: &str) -> anyhow::Result<String> {
        let request = DescribeInstancesRequest {
            filters: Some(vec![filter("private-ip-address", private_ip)]),
            ..Default::default()
        };
        let response = self
            .client
            .describe_instances(request)
            .await
            .with_context(|| format!("describing instances for {}", private_ip))?;
        // First matching instance wins; a private IP appearing in more than
        // one reservation is the API's problem, not ours.
        response
            .reservations
            .unwrap_or_default()
            .into_iter()
            .flat_map(|reservation| reservation.instances.unwrap_or_default())
            .find_map(|instance| instance.vpc_id)
            .ok_or_else(|| ResolveError::UnknownAddress(private_ip.to_string()).into())
    }

    async fn flow_log_group(&self, vpc_id: &str) -> anyhow::Result<String> {
        let request = DescribeFlowLogsRequest {
            filter: Some(vec![filter("resource-id", vpc_id)]),
            ..Default::default()
        };
        let response = self
            .client
            .describe_flow_logs(request)
            .await
            .with_context(|| format!("describing flow logs for {}", vpc_id))?;
        let mut flow_logs = response.flow_logs.unwrap_or_default();
        if flow_logs.is_empty() {
            return Err(ResolveError::NoFlowLog(vpc_id.to_string()).into());
        }
        match flow_logs.remove(0).log_group_name {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(ResolveError::MissingLogGroup(vpc_id.to_string()).into()),
        }
    }
}
