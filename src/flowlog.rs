/// Positional field count of a VPC flow log record in the default format.
pub const FIELD_COUNT: usize = 14;

/// One VPC flow log record.
///
/// Every field keeps the raw token from the log line. Flow logs emit `-`
/// for fields that do not apply (ports on some ICMP records, counters on
/// NODATA windows), so numeric conversion would turn ordinary records into
/// failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEvent {
    pub version: String,
    pub account_id: String,
    pub interface_id: String,
    pub src_addr: String,
    pub dst_addr: String,
    pub src_port: String,
    pub dst_port: String,
    pub protocol: String,
    pub packets: String,
    pub bytes: String,
    pub start_time: String,
    pub end_time: String,
    pub action: String,
    pub log_status: String,
}

/// Outcome of parsing one raw log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A complete flow record.
    Event(FlowEvent),
    /// Not a flow record: status lines and header lines carry fewer fields.
    NonEvent,
    /// A record whose fields could not be extracted. Consumers count these
    /// and keep going; one bad row must never sink a batch.
    Malformed(String),
}

/// Parse one raw log message into a flow event.
///
/// The message is split on whitespace and the first [`FIELD_COUNT`] tokens
/// are mapped positionally; trailing tokens from extended formats are
/// ignored. Shorter lines are [`ParseOutcome::NonEvent`], not errors.
pub fn parse(message: &str) -> ParseOutcome {
    let tokens: Vec<&str> = message.split_whitespace().collect();
    if tokens.len() < FIELD_COUNT {
        return ParseOutcome::NonEvent;
    }
    ParseOutcome::Event(FlowEvent {
        version: tokens[0].to_string(),
        account_id: tokens[1].to_string(),
        interface_id: tokens[2].to_string(),
        src_addr: tokens[3].to_string(),
        dst_addr: tokens[4].to_string(),
        src_port: tokens[5].to_string(),
        dst_port: tokens[6].to_string(),
        protocol: tokens[7].to_string(),
        packets: tokens[8].to_string(),
        bytes: tokens[9].to_string(),
        start_time: tokens[10].to_string(),
        end_time: tokens[11].to_string(),
        action: tokens[12].to_string(),
        log_status: tokens[13].to_string(),
    })
}
