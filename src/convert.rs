/// Batch conversion: drive the parser and an emitter over input lines and
/// partition results into success and failure streams
use crate::emit::Emitter;
use crate::rules::parse_rule;
use tracing::{debug, warn};

/// Partitioned output of one batch run.
///
/// Every non-blank, non-comment input line lands in exactly one of the two
/// sinks, in input order. Failures carry the original line verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Emitted text, one entry per successfully converted rule
    pub converted: Vec<String>,
    /// Original lines that could not be converted
    pub failed: Vec<String>,
}

impl BatchOutcome {
    /// Total lines routed to either sink
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

/// Convert a sequence of rule lines with the given emitter.
///
/// Blank lines and `#` comments are silently dropped. A line that fails to
/// parse, is rejected by the emitter, or is out of the emitter's scope is
/// routed to the failure sink; one bad line never aborts the rest of the
/// input. Warnings are logged and do not affect routing.
pub fn convert_lines<'a, I, E>(lines: I, emitter: &E) -> BatchOutcome
where
    I: IntoIterator<Item = &'a str>,
    E: Emitter + ?Sized,
{
    let mut outcome = BatchOutcome::default();

    for (line_num, raw) in lines.into_iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record = match parse_rule(line) {
            Ok(record) => record,
            Err(e) => {
                warn!("line {}: {}", line_num + 1, e);
                outcome.failed.push(raw.to_string());
                continue;
            }
        };

        match emitter.emit(&record) {
            Ok(Some(conversion)) => {
                for warning in &conversion.warnings {
                    warn!("line {}: {}", line_num + 1, warning);
                }
                outcome.converted.push(conversion.text);
            }
            Ok(None) => {
                debug!("line {}: rule out of scope for this target", line_num + 1);
                outcome.failed.push(raw.to_string());
            }
            Err(e) => {
                warn!("line {}: {}", line_num + 1, e);
                outcome.failed.push(raw.to_string());
            }
        }
    }

    outcome
}
