//! Correlates VPC flow log telemetry for a pair of instances and reports
//! whether their communication is bidirectional, one-way, or absent.
//!
//! One pass per invocation: resolve both private IPs to their VPC, resolve
//! the VPC to its flow log group, run a Logs Insights query over the
//! lookback window, aggregate per-target peer sets, and print the report.

pub mod config;
pub mod flowlog;
pub mod peers;
pub mod query;
pub mod report;
pub mod resolve;

use crate::config::RunConfig;
use crate::query::LogQuery;
use crate::report::Verdict;
use crate::resolve::Inventory;

/// Execute one correlation pass and print the report.
///
/// Returns the verdict so callers can inspect it; the process exit code
/// only distinguishes success from fatal errors.
pub async fn run<I, Q>(inventory: &I, logs: &Q, config: &RunConfig) -> anyhow::Result<Verdict>
where
    I: Inventory + ?Sized,
    Q: LogQuery + ?Sized,
{
    let target1 = &config.targets.0;
    let target2 = &config.targets.1;

    let vpc1 = inventory.owner_network(target1).await?;
    let vpc2 = inventory.owner_network(target2).await?;
    println!("Resolved VPC ID for {}: {}", target1, vpc1);
    println!("Resolved VPC ID for {}: {}", target2, vpc2);

    // Both instances feed the same flow log group.
    let log_group = inventory.flow_log_group(&vpc1).await?;
    println!("Flow Log Group: {}", log_group);

    let rows1 = query::run_query(logs, &log_group, config).await?;
    let peers1 = peers::collect_peers(target1, &rows1);
    let rows2 = query::run_query(logs, &log_group, config).await?;
    let peers2 = peers::collect_peers(target2, &rows2);

    println!("\n=== Communication Summary for IP: {} ===", target1);
    peers1.print_summary();

    println!("\n=== Communication Summary for IP: {} ===", target2);
    peers2.print_summary();

    println!("\n=== Bidirectional Communication Report ===");
    let verdict = report::classify(
        peers1.outbound.contains(target2.as_str()),
        peers2.outbound.contains(target1.as_str()),
    );
    println!("{}", verdict.describe(target1, target2));

    Ok(verdict)
}
