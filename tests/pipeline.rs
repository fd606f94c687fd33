use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use flowpair::config::RunConfig;
use flowpair::query::{LogQuery, QueryPoll, QueryStatus, Row};
use flowpair::report::Verdict;
use flowpair::resolve::{Inventory, ResolveError};

const IP1: &str = "172.31.20.58";
const IP2: &str = "10.1.1.74";

struct StaticInventory {
    networks: HashMap<String, String>,
    log_groups: HashMap<String, String>,
}

impl StaticInventory {
    fn sample() -> StaticInventory {
        let mut networks = HashMap::new();
        networks.insert(IP1.to_string(), "vpc-111".to_string());
        networks.insert(IP2.to_string(), "vpc-111".to_string());
        let mut log_groups = HashMap::new();
        log_groups.insert("vpc-111".to_string(), "flowlogs-vpc-111".to_string());
        StaticInventory {
            networks,
            log_groups,
        }
    }
}

#[async_trait]
impl Inventory for StaticInventory {
    async fn owner_network(&self, private_ip: &str) -> anyhow::Result<String> {
        self.networks
            .get(private_ip)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownAddress(private_ip.to_string()).into())
    }

    async fn flow_log_group(&self, vpc_id: &str) -> anyhow::Result<String> {
        self.log_groups
            .get(vpc_id)
            .cloned()
            .ok_or_else(|| ResolveError::NoFlowLog(vpc_id.to_string()).into())
    }
}

/// Serves one canned row batch per submitted query, completing immediately.
struct CannedQuery {
    batches: Mutex<Vec<Vec<Row>>>,
}

impl CannedQuery {
    fn new(batches: Vec<Vec<Row>>) -> CannedQuery {
        CannedQuery {
            batches: Mutex::new(batches),
        }
    }
}

#[async_trait]
impl LogQuery for CannedQuery {
    async fn submit(
        &self,
        log_group: &str,
        _query: &str,
        start: i64,
        end: i64,
    ) -> anyhow::Result<String> {
        assert_eq!(log_group, "flowlogs-vpc-111");
        assert!(start < end);
        Ok("query-1".to_string())
    }

    async fn poll(&self, _query_id: &str) -> anyhow::Result<QueryPoll> {
        let mut batches = self.batches.lock().unwrap();
        let rows = if batches.is_empty() {
            Vec::new()
        } else {
            batches.remove(0)
        };
        Ok(QueryPoll {
            status: QueryStatus::Complete,
            rows,
        })
    }
}

fn row(message: &str) -> Row {
    let mut row = HashMap::new();
    row.insert(
        "@timestamp".to_string(),
        "2024-05-01 12:00:00.000".to_string(),
    );
    row.insert("@message".to_string(), message.to_string());
    row
}

fn accept(src: &str, dst: &str) -> Row {
    row(&format!(
        "2 111122223333 eni-1 {} {} 443 51514 6 10 840 1000 1005 ACCEPT OK",
        src, dst
    ))
}

fn config() -> RunConfig {
    RunConfig::new(
        IP1.to_string(),
        IP2.to_string(),
        Duration::from_secs(600),
        Duration::from_millis(1),
        Duration::from_millis(100),
        1000,
    )
    .unwrap()
}

/// Both query runs see the same rows, as they would against the real
/// service; only the target they are aggregated for differs.
fn same_rows_for_both_runs(rows: Vec<Row>) -> CannedQuery {
    CannedQuery::new(vec![rows.clone(), rows])
}

#[tokio::test]
async fn accepted_traffic_both_ways_is_bidirectional() {
    let inventory = StaticInventory::sample();
    let logs = same_rows_for_both_runs(vec![accept(IP1, IP2), accept(IP2, IP1)]);
    let verdict = flowpair::run(&inventory, &logs, &config()).await.unwrap();
    assert_eq!(verdict, Verdict::Bidirectional);
}

#[tokio::test]
async fn traffic_in_one_direction_is_outbound_only() {
    let inventory = StaticInventory::sample();
    let logs = same_rows_for_both_runs(vec![accept(IP1, IP2)]);
    let verdict = flowpair::run(&inventory, &logs, &config()).await.unwrap();
    assert_eq!(verdict, Verdict::OutboundOnly);
}

#[tokio::test]
async fn return_traffic_alone_is_inbound_only() {
    let inventory = StaticInventory::sample();
    let logs = same_rows_for_both_runs(vec![accept(IP2, IP1)]);
    let verdict = flowpair::run(&inventory, &logs, &config()).await.unwrap();
    assert_eq!(verdict, Verdict::InboundOnly);
}

#[tokio::test]
async fn no_matching_rows_means_no_communication() {
    let inventory = StaticInventory::sample();
    let logs = CannedQuery::new(Vec::new());
    let verdict = flowpair::run(&inventory, &logs, &config()).await.unwrap();
    assert_eq!(verdict, Verdict::None);
}

#[tokio::test]
async fn rejected_traffic_does_not_count() {
    let inventory = StaticInventory::sample();
    let logs = same_rows_for_both_runs(vec![row(&format!(
        "2 111122223333 eni-1 {} {} 443 51514 6 10 840 1000 1005 REJECT OK",
        IP1, IP2
    ))]);
    let verdict = flowpair::run(&inventory, &logs, &config()).await.unwrap();
    assert_eq!(verdict, Verdict::None);
}

#[tokio::test]
async fn unknown_address_aborts_the_run() {
    let mut inventory = StaticInventory::sample();
    inventory.networks.remove(IP2);
    let logs = CannedQuery::new(Vec::new());
    let err = flowpair::run(&inventory, &logs, &config()).await.unwrap_err();
    match err.downcast_ref::<ResolveError>() {
        Some(ResolveError::UnknownAddress(ip)) => assert_eq!(ip, IP2),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn missing_flow_log_aborts_the_run() {
    let mut inventory = StaticInventory::sample();
    inventory.log_groups.clear();
    let logs = CannedQuery::new(Vec::new());
    let err = flowpair::run(&inventory, &logs, &config()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ResolveError>(),
        Some(ResolveError::NoFlowLog(_))
    ));
}
