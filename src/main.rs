use std::time::Duration;

use rusoto_core::Region;
use rusoto_ec2::Ec2Client;
use rusoto_logs::CloudWatchLogsClient;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use flowpair::config::RunConfig;
use flowpair::query::CloudWatchQuery;
use flowpair::resolve::Ec2Inventory;

#[derive(Debug, StructOpt)]
struct Opt {
    /// Private IP of the first instance
    target1: String,
    /// Private IP of the second instance
    target2: String,
    /// AWS region holding both instances
    #[structopt(short, long, default_value = "eu-north-1")]
    region: Region,
    /// How far back the query window reaches, in seconds
    #[structopt(long, default_value = "600")]
    lookback: u64,
    /// Seconds between polls of a running query
    #[structopt(long, default_value = "2")]
    poll_interval: u64,
    /// Give up on a query after this many seconds
    #[structopt(long, default_value = "120")]
    query_timeout: u64,
    /// Maximum rows fetched per query
    #[structopt(long, default_value = "1000")]
    limit: u64,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opt = Opt::from_args();
    let config = RunConfig::new(
        opt.target1,
        opt.target2,
        Duration::from_secs(opt.lookback),
        Duration::from_secs(opt.poll_interval),
        Duration::from_secs(opt.query_timeout),
        opt.limit,
    )?;

    let inventory = Ec2Inventory::new(Ec2Client::new(opt.region.clone()));
    let logs = CloudWatchQuery::new(CloudWatchLogsClient::new(opt.region));

    flowpair::run(&inventory, &logs, &config).await?;
    Ok(())
}
