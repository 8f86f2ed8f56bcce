/// Rule parsing, normalization and content decoding
pub mod content;
pub mod normalize;
pub mod parser;
pub mod rule;

pub use content::{decode_content, escape_bytes, ContentSegment};
pub use normalize::{normalize, Canonical, Normalized, VariableTable};
pub use parser::{extract_options, parse_endpoint, parse_rule};
pub use rule::{
    Direction, Endpoint, EndpointExpr, OptionMap, OptionValue, Protocol, RuleAction, RuleRecord,
};
