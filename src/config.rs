use std::time::Duration;

use anyhow::ensure;

/// Validated parameters for one correlation pass.
pub struct RunConfig {
    /// Private IPs of the two instances under test.
    pub targets: (String, String),
    /// How far back the query window reaches.
    pub lookback: Duration,
    /// Wait between polls of a running query.
    pub poll_interval: Duration,
    /// Give up on a query that has not finished within this deadline.
    pub query_timeout: Duration,
    /// Row cap pushed into the query text.
    pub limit: u64,
}

impl RunConfig {
    pub fn new(
        target1: String,
        target2: String,
        lookback: Duration,
        poll_interval: Duration,
        query_timeout: Duration,
        limit: u64,
    ) -> Result<Self, anyhow::Error> {
        ensure!(
            !target1.is_empty() && !target2.is_empty(),
            "target addresses must not be empty"
        );
        ensure!(target1 != target2, "target addresses must differ");
        ensure!(lookback.as_secs() > 0, "lookback window must be at least one second");
        ensure!(
            poll_interval > Duration::from_secs(0),
            "poll interval must be positive"
        );
        ensure!(
            query_timeout >= poll_interval,
            "query timeout must cover at least one poll interval"
        );
        ensure!(limit > 0, "query row limit must be positive");
        Ok(RunConfig {
            targets: (target1, target2),
            lookback,
            poll_interval,
            query_timeout,
            limit,
        })
    }
}
