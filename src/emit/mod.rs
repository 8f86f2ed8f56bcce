/// Emitter strategies: one parsed record, two output formats
use crate::error::{ConvertWarning, Result};
use crate::rules::RuleRecord;

pub mod alert;
pub mod zeek;

pub use alert::{AlertEmitter, EventMap};
pub use zeek::ZeekEmitter;

/// Output of one converted rule plus the non-fatal conditions hit on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub text: String,
    pub warnings: Vec<ConvertWarning>,
}

/// A conversion target consuming parsed rule records.
///
/// `Ok(None)` means the rule is out of scope for this target (for example an
/// unsupported protocol) and produces no output; errors are line-scoped.
pub trait Emitter {
    fn emit(&self, record: &RuleRecord) -> Result<Option<Conversion>>;
}
