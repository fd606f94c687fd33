/// Four-way classification of traffic between the two targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Bidirectional,
    OutboundOnly,
    InboundOnly,
    None,
}

/// Map the two directional checks onto a verdict: does the first target
/// send accepted traffic to the second, and vice versa.
pub fn classify(first_reaches_second: bool, second_reaches_first: bool) -> Verdict {
    match (first_reaches_second, second_reaches_first) {
        (true, true) => Verdict::Bidirectional,
        (true, false) => Verdict::OutboundOnly,
        (false, true) => Verdict::InboundOnly,
        (false, false) => Verdict::None,
    }
}

impl Verdict {
    /// The report sentence for this verdict.
    pub fn describe(&self, first: &str, second: &str) -> String {
        match self {
            Verdict::Bidirectional => format!(
                "Perfect bidirectional communication between {} and {}",
                first, second
            ),
            Verdict::OutboundOnly => format!(
                "Outbound only: {} sent traffic to {} but no return.",
                first, second
            ),
            Verdict::InboundOnly => format!(
                "Inbound only: {} sent traffic to {} but no return.",
                second, first
            ),
            Verdict::None => {
                "No communication detected between the two instances.".to_string()
            }
        }
    }
}
