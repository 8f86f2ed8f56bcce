/// Custom alert-format emitter
///
/// One line per rule: `Alert; <sid>_<rev>; ip(...); tcp(...); content(...);`
use super::{Conversion, Emitter};
use crate::error::{ConvertError, ConvertWarning, Result};
use crate::rules::{normalize, Protocol, RuleRecord, VariableTable};
use ahash::AHashMap;

/// Mapping from rule action keywords to output event labels.
///
/// An explicit configuration value; both `alert` and `drop` map to `Alert`
/// by default. An unmapped action degrades to a capitalized copy of the
/// keyword with a warning, never a failure.
#[derive(Debug, Clone)]
pub struct EventMap {
    entries: AHashMap<String, String>,
}

impl EventMap {
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    pub fn insert(&mut self, action: &str, event: &str) {
        self.entries.insert(action.to_string(), event.to_string());
    }

    pub fn lookup(&self, action: &str) -> Option<&str> {
        self.entries.get(action).map(|s| s.as_str())
    }
}

impl Default for EventMap {
    fn default() -> Self {
        let mut map = Self::new();
        map.insert("alert", "Alert");
        map.insert("drop", "Alert");
        map
    }
}

impl FromIterator<(String, String)> for EventMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Emitter for the custom alert-matching format
#[derive(Debug, Clone)]
pub struct AlertEmitter {
    variables: VariableTable,
    events: EventMap,
}

impl AlertEmitter {
    pub fn new(variables: VariableTable, events: EventMap) -> Self {
        Self { variables, events }
    }

    fn event_label(&self, record: &RuleRecord, warnings: &mut Vec<ConvertWarning>) -> String {
        let action = record.action.as_str();
        match self.events.lookup(action) {
            Some(event) => event.to_string(),
            None => {
                warnings.push(ConvertWarning::UnmappedAction {
                    action: action.to_string(),
                });
                capitalize(action)
            }
        }
    }
}

impl Default for AlertEmitter {
    fn default() -> Self {
        Self::new(VariableTable::alert_defaults(), EventMap::default())
    }
}

impl Emitter for AlertEmitter {
    fn emit(&self, record: &RuleRecord) -> Result<Option<Conversion>> {
        // Only ip and tcp rules have a clause set; everything else is
        // out of scope for this target
        match record.protocol {
            Protocol::Ip | Protocol::Tcp => {}
            _ => return Ok(None),
        }

        let sid = record
            .sid
            .ok_or(ConvertError::MissingRequiredField("sid"))?;
        let rev = record
            .rev
            .ok_or(ConvertError::MissingRequiredField("rev"))?;

        let mut warnings = Vec::new();
        let mut text = format!("{}; {}_{};", self.event_label(record, &mut warnings), sid, rev);

        let src_ip = normalize(&record.src.addr, &self.variables, &mut warnings).value;
        let dst_ip = normalize(&record.dst.addr, &self.variables, &mut warnings).value;
        if !src_ip.is_any() || !dst_ip.is_any() {
            text.push_str(&format!(
                " ip({},{});",
                src_ip.address(),
                dst_ip.address()
            ));
        }

        if record.protocol == Protocol::Tcp {
            let src_port = normalize(&record.src.port, &self.variables, &mut warnings).value;
            let dst_port = normalize(&record.dst.port, &self.variables, &mut warnings).value;
            if !src_port.is_any() || !dst_port.is_any() {
                text.push_str(&format!(
                    " tcp({}, {});",
                    src_port.bracketed(),
                    dst_port.bracketed()
                ));
            }

            // Content is opaque passthrough text for this target
            for content in record.contents() {
                text.push_str(&format!(" content(tcp, {});", content));
            }
        }

        Ok(Some(Conversion { text, warnings }))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
