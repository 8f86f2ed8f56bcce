pub mod config;
pub mod convert;
pub mod emit;
pub mod error;
pub mod rules;

pub use error::{ConvertError, ConvertWarning, HeaderParseError, Result};
