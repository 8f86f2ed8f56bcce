/// Variable resolution and endpoint canonicalization
use super::parser::parse_endpoint;
use super::rule::EndpointExpr;
use crate::error::ConvertWarning;
use ahash::AHashMap;

/// Canonical form of an endpoint expression.
///
/// Every expression normalizes to exactly one of these shapes; normalization
/// is total and idempotent. `Any` is a sentinel distinguished from all
/// concrete values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canonical {
    /// Unconstrained ("any" literal or an any-valued symbol)
    Any,
    /// Single concrete value
    One(String),
    /// Bracketed set of concrete values, duplicates coalesced
    Set(Vec<String>),
}

impl Canonical {
    pub fn is_any(&self) -> bool {
        matches!(self, Canonical::Any)
    }

    /// Collapse a set to its first value (Zeek addresses take one value)
    pub fn first(&self) -> Canonical {
        match self {
            Canonical::Set(values) => match values.first() {
                Some(v) => Canonical::One(v.clone()),
                None => Canonical::Any,
            },
            other => other.clone(),
        }
    }

    /// Collapse a set to its last value (Zeek ports take one value; the
    /// last-listed port is kept by convention)
    pub fn last(&self) -> Canonical {
        match self {
            Canonical::Set(values) => match values.last() {
                Some(v) => Canonical::One(v.clone()),
                None => Canonical::Any,
            },
            other => other.clone(),
        }
    }

    /// Alert-format port rendering: every value bracketed, `[any]` for the
    /// sentinel
    pub fn bracketed(&self) -> String {
        match self {
            Canonical::Any => "[any]".to_string(),
            Canonical::One(v) => format!("[{}]", v),
            Canonical::Set(values) => format!("[{}]", values.join(",")),
        }
    }

    /// Alert-format address rendering: a single concrete value stays bare;
    /// only sets and the `any` sentinel carry brackets
    pub fn address(&self) -> String {
        match self {
            Canonical::One(v) => v.clone(),
            other => other.bracketed(),
        }
    }
}

/// Canonical value plus metadata stripped on the way there.
///
/// Negation and per-field suffixes never affect the canonical value itself;
/// they are recorded for callers that care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub value: Canonical,
    pub negated: bool,
    pub suffix: Option<String>,
}

/// Fixed symbol table mapping variable names to literal values.
///
/// An explicit configuration value handed to the emitters, never process-wide
/// state. Table values are rule-expression text and are themselves normalized
/// on resolution (so `[192.168.0.0/24,10.0.0.0/16]` resolves to a set).
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    entries: AHashMap<String, String>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.entries.insert(name.to_string(), value.to_string());
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Default table for the alert-format target
    pub fn alert_defaults() -> Self {
        let mut table = Self::new();
        for name in [
            "HOME_NET",
            "HTTP_SERVERS",
            "SQL_SERVERS",
            "SMTP_SERVERS",
            "DNS_SERVERS",
        ] {
            table.insert(name, "[192.168.0.0/24,10.0.0.0/16]");
        }
        table.insert("EXTERNAL_NET", "any");
        table.insert("HTTP_PORTS", "80");
        table.insert("SSH_PORTS", "22");
        table
    }

    /// Default table for the Zeek signature target
    pub fn zeek_defaults() -> Self {
        let mut table = Self::new();
        for name in [
            "HOME_NET",
            "SMTP_SERVERS",
            "SQL_SERVERS",
            "HTTP_SERVERS",
            "DNS_SERVERS",
        ] {
            table.insert(name, "10.0.0.0/8");
        }
        table.insert("EXTERNAL_NET", "any");
        table.insert("HTTP_PORTS", "80");
        table.insert("SSH_PORTS", "22");
        table
    }
}

impl FromIterator<(String, String)> for VariableTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Normalize an endpoint expression against a symbol table.
///
/// Total: every input resolves to some output. Unresolved symbols pass
/// through verbatim with a warning rather than failing the rule.
pub fn normalize(
    expr: &EndpointExpr,
    table: &VariableTable,
    warnings: &mut Vec<ConvertWarning>,
) -> Normalized {
    match expr {
        EndpointExpr::Any => concrete(Canonical::Any),

        EndpointExpr::Not(inner) => {
            let inner = normalize(inner, table, warnings);
            Normalized {
                negated: true,
                ..inner
            }
        }

        EndpointExpr::Literal(text) => {
            // A per-field suffix after ':' (port ranges included) is metadata
            let (base, suffix) = match text.split_once(':') {
                Some((base, suffix)) => (base.trim(), Some(suffix.to_string())),
                None => (text.as_str(), None),
            };
            let value = if base.eq_ignore_ascii_case("any") {
                Canonical::Any
            } else {
                Canonical::One(base.to_string())
            };
            Normalized {
                value,
                negated: false,
                suffix,
            }
        }

        EndpointExpr::Variable(name) => {
            // Suffix stripping happens before symbol resolution, so
            // `$HTTP_PORTS:x` still resolves
            let (base, suffix) = match name.split_once(':') {
                Some((base, suffix)) => (base, Some(suffix.to_string())),
                None => (name.as_str(), None),
            };
            match table.resolve(base) {
                Some(resolved) => {
                    // Table values are expression text; run them through the
                    // same pipeline so bracketed values become sets
                    let resolved = normalize(&parse_endpoint(resolved), table, warnings);
                    Normalized {
                        suffix: suffix.or(resolved.suffix),
                        ..resolved
                    }
                }
                None => {
                    warnings.push(ConvertWarning::UnresolvedVariable {
                        name: base.to_string(),
                    });
                    Normalized {
                        value: Canonical::One(format!("${}", base)),
                        negated: false,
                        suffix,
                    }
                }
            }
        }

        EndpointExpr::List(items) => {
            let mut values: Vec<String> = Vec::new();
            for item in items {
                let normalized = normalize(item, table, warnings);
                match normalized.value {
                    Canonical::Any => push_unique(&mut values, "any".to_string()),
                    Canonical::One(v) => push_unique(&mut values, v),
                    // Flatten one level of nesting produced by sub-normalization
                    Canonical::Set(vs) => {
                        for v in vs {
                            push_unique(&mut values, v);
                        }
                    }
                }
            }
            concrete(coalesce(values))
        }
    }
}

fn concrete(value: Canonical) -> Normalized {
    Normalized {
        value,
        negated: false,
        suffix: None,
    }
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

/// Collapse a flattened value list into its canonical shape
fn coalesce(mut values: Vec<String>) -> Canonical {
    match values.len() {
        0 => Canonical::Any,
        1 => {
            let only = values.remove(0);
            if only == "any" {
                Canonical::Any
            } else {
                Canonical::One(only)
            }
        }
        _ => Canonical::Set(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::parser::parse_endpoint;

    fn norm(input: &str, table: &VariableTable) -> Normalized {
        let mut warnings = Vec::new();
        normalize(&parse_endpoint(input), table, &mut warnings)
    }

    #[test]
    fn test_any_sentinel() {
        let table = VariableTable::alert_defaults();
        assert_eq!(norm("any", &table).value, Canonical::Any);
        assert_eq!(norm("$EXTERNAL_NET", &table).value, Canonical::Any);
    }

    #[test]
    fn test_literal_passthrough() {
        let table = VariableTable::new();
        assert_eq!(
            norm("192.168.1.1", &table).value,
            Canonical::One("192.168.1.1".to_string())
        );
        assert_eq!(norm("80", &table).value, Canonical::One("80".to_string()));
    }

    #[test]
    fn test_home_net_resolves_to_set() {
        let table = VariableTable::alert_defaults();
        assert_eq!(
            norm("$HOME_NET", &table).value,
            Canonical::Set(vec![
                "192.168.0.0/24".to_string(),
                "10.0.0.0/16".to_string()
            ])
        );
    }

    #[test]
    fn test_zeek_home_net_resolves_to_one() {
        let table = VariableTable::zeek_defaults();
        assert_eq!(
            norm("$HOME_NET", &table).value,
            Canonical::One("10.0.0.0/8".to_string())
        );
    }

    #[test]
    fn test_unresolved_variable_passes_through() {
        let table = VariableTable::new();
        let mut warnings = Vec::new();
        let normalized = normalize(&parse_endpoint("$NO_SUCH"), &table, &mut warnings);

        assert_eq!(normalized.value, Canonical::One("$NO_SUCH".to_string()));
        assert_eq!(
            warnings,
            vec![ConvertWarning::UnresolvedVariable {
                name: "NO_SUCH".to_string()
            }]
        );
    }

    #[test]
    fn test_negation_and_suffix_are_metadata() {
        let table = VariableTable::new();

        let negated = norm("!10.0.0.1", &table);
        assert!(negated.negated);
        assert_eq!(negated.value, Canonical::One("10.0.0.1".to_string()));

        let ranged = norm("80:443", &table);
        assert_eq!(ranged.value, Canonical::One("80".to_string()));
        assert_eq!(ranged.suffix, Some("443".to_string()));
        assert!(!ranged.negated);
    }

    #[test]
    fn test_variable_suffix_stripped_before_resolution() {
        let table = VariableTable::zeek_defaults();
        let mut warnings = Vec::new();
        let normalized = normalize(&parse_endpoint("$HTTP_PORTS:x"), &table, &mut warnings);

        assert_eq!(normalized.value, Canonical::One("80".to_string()));
        assert_eq!(normalized.suffix, Some("x".to_string()));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unresolved_variable_with_suffix() {
        let table = VariableTable::new();
        let mut warnings = Vec::new();
        let normalized = normalize(&parse_endpoint("$NO_SUCH:9"), &table, &mut warnings);

        assert_eq!(normalized.value, Canonical::One("$NO_SUCH".to_string()));
        assert_eq!(normalized.suffix, Some("9".to_string()));
        assert_eq!(
            warnings,
            vec![ConvertWarning::UnresolvedVariable {
                name: "NO_SUCH".to_string()
            }]
        );
    }

    #[test]
    fn test_list_flattens_and_dedupes() {
        let table = VariableTable::alert_defaults();
        // $HOME_NET expands to a nested set; flatten one level, coalesce dups
        let normalized = norm("[$HOME_NET,10.0.0.0/16,1.2.3.4]", &table);
        assert_eq!(
            normalized.value,
            Canonical::Set(vec![
                "192.168.0.0/24".to_string(),
                "10.0.0.0/16".to_string(),
                "1.2.3.4".to_string(),
            ])
        );
    }

    #[test]
    fn test_singleton_list_collapses() {
        let table = VariableTable::new();
        assert_eq!(norm("[80]", &table).value, Canonical::One("80".to_string()));
        assert_eq!(norm("[any]", &table).value, Canonical::Any);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let table = VariableTable::alert_defaults();
        for input in ["$HOME_NET", "[80,443,80]", "any", "10.1.2.3", "[any]"] {
            let once = norm(input, &table).value;
            // Render the canonical value back to expression text and re-run
            let again = norm(&once.bracketed(), &table).value;
            assert_eq!(once, again, "not idempotent for {}", input);
        }
    }

    #[test]
    fn test_first_and_last_collapse() {
        let set = Canonical::Set(vec!["80".to_string(), "443".to_string()]);
        assert_eq!(set.first(), Canonical::One("80".to_string()));
        assert_eq!(set.last(), Canonical::One("443".to_string()));
        assert_eq!(Canonical::Any.last(), Canonical::Any);
        assert_eq!(
            Canonical::One("22".to_string()).last(),
            Canonical::One("22".to_string())
        );
    }

    #[test]
    fn test_bracketed_rendering() {
        assert_eq!(Canonical::Any.bracketed(), "[any]");
        assert_eq!(Canonical::One("80".to_string()).bracketed(), "[80]");
        assert_eq!(
            Canonical::Set(vec!["a".to_string(), "b".to_string()]).bracketed(),
            "[a,b]"
        );
    }

    #[test]
    fn test_address_rendering_keeps_single_values_bare() {
        assert_eq!(Canonical::Any.address(), "[any]");
        assert_eq!(Canonical::One("1.2.3.4".to_string()).address(), "1.2.3.4");
        assert_eq!(
            Canonical::Set(vec!["a".to_string(), "b".to_string()]).address(),
            "[a,b]"
        );
    }
}
