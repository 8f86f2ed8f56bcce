use thiserror::Error;

/// Errors produced while splitting a rule line into header and option body.
///
/// These are always line-scoped: a header that fails to parse sends the
/// original line to the failure sink and processing continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderParseError {
    #[error("rule has no option body (missing '(')")]
    MissingOptionBody,

    #[error("rule header has no direction marker")]
    MissingDirection,

    #[error("rule header is truncated: expected at least {expected} tokens, found {found}")]
    TruncatedHeader { expected: usize, found: usize },
}

/// Main error type for rulebridge
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("header parse error: {0}")]
    Header(#[from] HeaderParseError),

    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for rulebridge operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Non-fatal conditions noticed while converting a rule.
///
/// These deliberately do not fail the line: partial output is favored over
/// rejection. Callers decide whether to log or surface them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertWarning {
    /// Action keyword has no entry in the event map; a best-effort label
    /// was used instead
    UnmappedAction { action: String },
    /// Variable not in the symbol table; passed through verbatim
    UnresolvedVariable { name: String },
    /// Hex token inside a content value could not be decoded; dropped
    MalformedContentToken { token: String },
}

impl std::fmt::Display for ConvertWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertWarning::UnmappedAction { action } => {
                write!(f, "unmapped action: {}", action)
            }
            ConvertWarning::UnresolvedVariable { name } => {
                write!(f, "unresolved variable: ${}", name)
            }
            ConvertWarning::MalformedContentToken { token } => {
                write!(f, "malformed content hex token: {}", token)
            }
        }
    }
}
