use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use async_trait::async_trait;
use rusoto_logs::{
    CloudWatchLogs, CloudWatchLogsClient, GetQueryResultsRequest, StartQueryRequest,
};
use thiserror::Error;
use tokio::time::{sleep, Instant};

use crate::config::RunConfig;

/// One query result row, field name to value.
pub type Row = HashMap<String, String>;

/// Query state as reported by the log service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    Running,
    Complete,
    Failed,
    Cancelled,
    Other(String),
}

impl QueryStatus {
    /// `Scheduled` means the query has not started executing yet, which is
    /// still "running" from the caller's point of view.
    fn from_api(status: &str) -> QueryStatus {
        match status {
            "Running" | "Scheduled" => QueryStatus::Running,
            "Complete" => QueryStatus::Complete,
            "Failed" => QueryStatus::Failed,
            "Cancelled" => QueryStatus::Cancelled,
            other => QueryStatus::Other(other.to_string()),
        }
    }
}

/// One poll observation: current state plus whatever rows are visible.
#[derive(Debug, Clone)]
pub struct QueryPoll {
    pub status: QueryStatus,
    pub rows: Vec<Row>,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query did not finish within {0} seconds")]
    TimedOut(u64),
    #[error("query ended in state {0:?}")]
    Terminal(QueryStatus),
}

/// Port over the asynchronous log query service.
#[async_trait]
pub trait LogQuery: Send + Sync {
    /// Start a query over `[start, end]` (epoch seconds) and return its id.
    async fn submit(
        &self,
        log_group: &str,
        query: &str,
        start: i64,
        end: i64,
    ) -> anyhow::Result<String>;

    /// Fetch the current state of a previously submitted query.
    async fn poll(&self, query_id: &str) -> anyhow::Result<QueryPoll>;
}

/// Query text for the most recent flow records. Records in the default
/// format start with the version number, so `/^2/` keeps real records and
/// drops control messages.
fn query_string(limit: u64) -> String {
    format!(
        "fields @timestamp, @message | filter @message like /^2/ | sort @timestamp desc | limit {}",
        limit
    )
}

/// Drive one query to completion and return its rows, which may be empty.
///
/// Sleeps `poll_interval` between polls and gives up once `query_timeout`
/// has elapsed, so a wedged query cannot stall the run forever. A query
/// that ends `Failed` or `Cancelled` is an error, not an empty result.
pub async fn run_query<Q>(
    service: &Q,
    log_group: &str,
    config: &RunConfig,
) -> anyhow::Result<Vec<Row>>
where
    Q: LogQuery + ?Sized,
{
    let end = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;
    let start = end - config.lookback.as_secs() as i64;

    let query_id = service
        .submit(log_group, &query_string(config.limit), start, end)
        .await
        .with_context(|| format!("starting query against {}", log_group))?;
    let deadline = Instant::now() + config.query_timeout;

    loop {
        sleep(config.poll_interval).await;
        let observed = service
            .poll(&query_id)
            .await
            .with_context(|| format!("polling query {}", query_id))?;
        match observed.status {
            QueryStatus::Running => {
                if Instant::now() >= deadline {
                    return Err(QueryError::TimedOut(config.query_timeout.as_secs()).into());
                }
                tracing::debug!(%query_id, "query still running");
            }
            QueryStatus::Complete => return Ok(observed.rows),
            status => return Err(QueryError::Terminal(status).into()),
        }
    }
}

/// CloudWatch Logs Insights implementation of the query port.
pub struct CloudWatchQuery {
    client: CloudWatchLogsClient,
}

impl CloudWatchQuery {
    pub fn new(client: CloudWatchLogsClient) -> CloudWatchQuery {
        CloudWatchQuery { client }
    }
}

#[async_trait]
impl LogQuery for CloudWatchQuery {
    async fn submit(
        &self,
        log_group: &str,
        query: &str,
        start: i64,
        end: i64,
    ) -> anyhow::Result<String> {
        let request = StartQueryRequest {
            log_group_name: Some(log_group.to_string()),
            query_string: query.to_string(),
            start_time: start,
            end_time: end,
            ..Default::default()
        };
        let response = self.client.start_query(request).await?;
        response
            .query_id
            .context("query submission returned no query id")
    }

    async fn poll(&self, query_id: &str) -> anyhow::Result<QueryPoll> {
        let request = GetQueryResultsRequest {
            query_id: query_id.to_string(),
        };
        let response = self.client.get_query_results(request).await?;
        let status = response
            .status
            .as_deref()
            .map(QueryStatus::from_api)
            .unwrap_or(QueryStatus::Running);
        let rows = response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|fields| {
                fields
                    .into_iter()
                    .filter_map(|field| Some((field.field?, field.value?)))
                    .collect()
            })
            .collect();
        Ok(QueryPoll { status, rows })
    }
}
