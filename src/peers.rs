use std::collections::BTreeSet;

use crate::flowlog::{self, FlowEvent, ParseOutcome};
use crate::query::Row;

/// Peer addresses observed for one target over one query window.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Peers {
    pub outbound: BTreeSet<String>,
    pub inbound: BTreeSet<String>,
    /// Accepted rows classified against the target. Counts rows, not
    /// distinct peers, so replayed traffic shows up here.
    pub allowed: u64,
    /// Rows that could not be parsed into a record.
    pub errors: u64,
}

impl Peers {
    /// Fold one accepted flow event into the sets, printing the trace line.
    ///
    /// The source side is checked first, so traffic from the target to
    /// itself counts as outbound.
    pub fn record(&mut self, target: &str, timestamp: &str, event: &FlowEvent) {
        let direction = if event.src_addr == target {
            self.outbound.insert(event.dst_addr.clone());
            "Outbound"
        } else if event.dst_addr == target {
            self.inbound.insert(event.src_addr.clone());
            "Inbound"
        } else {
            // The query filters on /^2/, not on the target address, so rows
            // about unrelated hosts land here. They carry no signal.
            tracing::debug!(
                src = %event.src_addr,
                dst = %event.dst_addr,
                "row matches neither side of the target"
            );
            return;
        };
        self.allowed += 1;
        println!(
            "[{}] {}: {} -> {} (Proto: {}, Ports: {} -> {})",
            timestamp,
            direction,
            event.src_addr,
            event.dst_addr,
            event.protocol,
            event.src_port,
            event.dst_port
        );
    }

    /// Branch on one parse outcome: events classify, short lines vanish,
    /// malformed records count against `errors` and the batch moves on.
    pub fn apply(&mut self, target: &str, timestamp: &str, outcome: ParseOutcome) {
        match outcome {
            ParseOutcome::NonEvent => {}
            ParseOutcome::Malformed(reason) => {
                self.errors += 1;
                tracing::warn!(%reason, "skipping malformed flow log row");
            }
            ParseOutcome::Event(event) => {
                if event.action.eq_ignore_ascii_case("ACCEPT") {
                    self.record(target, timestamp, &event);
                }
            }
        }
    }

    /// Peers seen in both directions.
    pub fn bidirectional(&self) -> impl Iterator<Item = &String> {
        self.outbound.intersection(&self.inbound)
    }

    pub fn print_summary(&self) {
        println!("Allowed: {}, Errors: {}", self.allowed, self.errors);
        println!("Outbound Peers: {:?}", self.outbound);
        println!("Inbound Peers: {:?}", self.inbound);
        println!("Bidirectional Peers:");
        for peer in self.bidirectional() {
            println!("{}", peer);
        }
    }
}

/// Aggregate the query rows for one target into its peer sets.
///
/// Empty messages and short lines are skipped silently; malformed records
/// are counted and skipped. Only ACCEPT records (any case) classify.
pub fn collect_peers(target: &str, rows: &[Row]) -> Peers {
    let mut peers = Peers::default();
    for row in rows {
        let timestamp = row.get("@timestamp").map(String::as_str).unwrap_or("");
        let message = row.get("@message").map(String::as_str).unwrap_or("");
        if message.is_empty() {
            continue;
        }
        peers.apply(target, timestamp, flowlog::parse(message));
    }
    peers
}
