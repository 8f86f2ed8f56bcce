/// Suricata-compatible rule structures
use std::fmt;

/// Rule action keyword
///
/// Unrecognized actions are retained verbatim; whether they map to an output
/// event is decided at emit time against the configured event map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    /// Generate an alert
    Alert,
    /// Drop the packet (inline mode)
    Drop,
    /// Notify without alerting
    Notify,
    /// Log the packet
    Log,
    /// Pass the packet (allow)
    Pass,
    /// Reject the packet
    Reject,
    /// Anything else, kept verbatim
    Other(String),
}

impl RuleAction {
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "alert" => RuleAction::Alert,
            "drop" => RuleAction::Drop,
            "notify" => RuleAction::Notify,
            "log" => RuleAction::Log,
            "pass" => RuleAction::Pass,
            "reject" => RuleAction::Reject,
            _ => RuleAction::Other(token.to_string()),
        }
    }

    /// The lowercase keyword as it appears in rule text
    pub fn as_str(&self) -> &str {
        match self {
            RuleAction::Alert => "alert",
            RuleAction::Drop => "drop",
            RuleAction::Notify => "notify",
            RuleAction::Log => "log",
            RuleAction::Pass => "pass",
            RuleAction::Reject => "reject",
            RuleAction::Other(s) => s,
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Protocol named in the rule header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protocol {
    Ip,
    Tcp,
    Udp,
    /// Anything else, kept verbatim (no emitter handles these)
    Other(String),
}

impl Protocol {
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "ip" => Protocol::Ip,
            "tcp" => Protocol::Tcp,
            "udp" => Protocol::Udp,
            _ => Protocol::Other(token.to_string()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Ip => write!(f, "ip"),
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Direction of traffic flow
///
/// `->` is the usual marker; a bare `>` is accepted as a loose alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Unidirectional: source -> destination
    To,
    /// Bidirectional: source <> destination
    Either,
}

impl Direction {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "->" | ">" => Some(Direction::To),
            "<>" => Some(Direction::Either),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::To => write!(f, "->"),
            Direction::Either => write!(f, "<>"),
        }
    }
}

/// Address or port expression from a rule header
///
/// An expression is a literal, a `$VAR` reference, a bracketed list, or a
/// negated sub-expression. No semantic validation of IP/CIDR syntax happens
/// here; anything unstructured is carried as an opaque `Literal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointExpr {
    /// The unconstrained wildcard
    Any,
    /// Opaque literal (address, CIDR, port, port range)
    Literal(String),
    /// Variable reference (e.g., $HOME_NET)
    Variable(String),
    /// Bracketed list of sub-expressions
    List(Vec<EndpointExpr>),
    /// Negated sub-expression
    Not(Box<EndpointExpr>),
}

impl fmt::Display for EndpointExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointExpr::Any => write!(f, "any"),
            EndpointExpr::Literal(s) => write!(f, "{}", s),
            EndpointExpr::Variable(name) => write!(f, "${}", name),
            EndpointExpr::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            EndpointExpr::Not(inner) => write!(f, "!{}", inner),
        }
    }
}

/// One side of a rule header: address expression plus port expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub addr: EndpointExpr,
    pub port: EndpointExpr,
}

/// Value of a rule option key
///
/// A key that appears once holds a `Single`; a repeated key (chiefly
/// `content`) is promoted to `Many` in encounter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Single(String),
    Many(Vec<String>),
}

impl OptionValue {
    /// All values in encounter order
    pub fn values(&self) -> &[String] {
        match self {
            OptionValue::Single(v) => std::slice::from_ref(v),
            OptionValue::Many(vs) => vs,
        }
    }
}

/// Ordered key -> value(s) mapping for the rule option body
///
/// Insertion order is preserved; rules carry few options, so lookups are
/// linear scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: Vec<(String, OptionValue)>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, promoting an existing entry to a list
    pub fn push(&mut self, key: &str, value: String) {
        for (k, v) in &mut self.entries {
            if k == key {
                match v {
                    OptionValue::Single(existing) => {
                        let first = std::mem::take(existing);
                        *v = OptionValue::Many(vec![first, value]);
                    }
                    OptionValue::Many(list) => list.push(value),
                }
                return;
            }
        }
        self.entries.push((key.to_string(), OptionValue::Single(value)));
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// All values for a key in encounter order (empty when absent)
    pub fn values(&self, key: &str) -> &[String] {
        self.get(key).map(|v| v.values()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One parsed rule line
///
/// Created by the parser from a single line, consumed immediately by
/// normalization and emission, then discarded. A record is never mutated
/// after construction; every downstream step produces new values.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleRecord {
    pub action: RuleAction,
    pub protocol: Protocol,
    pub src: Endpoint,
    pub dst: Endpoint,
    pub direction: Direction,
    pub options: OptionMap,
    /// Signature ID, when present and numeric
    pub sid: Option<u32>,
    /// Revision number, when present and numeric
    pub rev: Option<u32>,
}

impl RuleRecord {
    /// Raw `content` option values in encounter order
    pub fn contents(&self) -> &[String] {
        self.options.values("content")
    }

    /// Rule message, when present
    pub fn msg(&self) -> Option<&str> {
        self.options.values("msg").first().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse() {
        assert_eq!(RuleAction::parse("alert"), RuleAction::Alert);
        assert_eq!(RuleAction::parse("ALERT"), RuleAction::Alert);
        assert_eq!(RuleAction::parse("drop"), RuleAction::Drop);
        assert_eq!(RuleAction::parse("notify"), RuleAction::Notify);
        assert_eq!(
            RuleAction::parse("sdrop"),
            RuleAction::Other("sdrop".to_string())
        );
    }

    #[test]
    fn test_protocol_parse() {
        assert_eq!(Protocol::parse("tcp"), Protocol::Tcp);
        assert_eq!(Protocol::parse("TCP"), Protocol::Tcp);
        assert_eq!(Protocol::parse("ip"), Protocol::Ip);
        assert_eq!(
            Protocol::parse("icmp"),
            Protocol::Other("icmp".to_string())
        );
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("->"), Some(Direction::To));
        assert_eq!(Direction::parse(">"), Some(Direction::To));
        assert_eq!(Direction::parse("<>"), Some(Direction::Either));
        assert_eq!(Direction::parse("<-"), None);
    }

    #[test]
    fn test_endpoint_expr_display() {
        assert_eq!(EndpointExpr::Any.to_string(), "any");
        assert_eq!(
            EndpointExpr::Variable("HOME_NET".to_string()).to_string(),
            "$HOME_NET"
        );
        assert_eq!(
            EndpointExpr::List(vec![
                EndpointExpr::Literal("10.0.0.0/8".to_string()),
                EndpointExpr::Literal("80".to_string()),
            ])
            .to_string(),
            "[10.0.0.0/8,80]"
        );
        assert_eq!(
            EndpointExpr::Not(Box::new(EndpointExpr::Any)).to_string(),
            "!any"
        );
    }

    #[test]
    fn test_option_map_single() {
        let mut opts = OptionMap::new();
        opts.push("msg", "Test".to_string());

        assert_eq!(
            opts.get("msg"),
            Some(&OptionValue::Single("Test".to_string()))
        );
        assert_eq!(opts.values("msg"), &["Test".to_string()]);
        assert!(opts.values("content").is_empty());
    }

    #[test]
    fn test_option_map_promotes_repeated_key() {
        let mut opts = OptionMap::new();
        opts.push("content", "GET".to_string());
        opts.push("content", "HTTP/1.1".to_string());
        opts.push("content", "Host".to_string());

        assert_eq!(
            opts.get("content"),
            Some(&OptionValue::Many(vec![
                "GET".to_string(),
                "HTTP/1.1".to_string(),
                "Host".to_string(),
            ]))
        );
        assert_eq!(opts.len(), 1);
    }

    #[test]
    fn test_option_map_preserves_insertion_order() {
        let mut opts = OptionMap::new();
        opts.push("msg", "m".to_string());
        opts.push("content", "a".to_string());
        opts.push("sid", "1".to_string());

        let keys: Vec<&str> = opts.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["msg", "content", "sid"]);
    }
}
