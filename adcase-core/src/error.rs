use thiserror::Error;

/// Error returned when a configuration string names an unknown value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {what}: '{value}'")]
pub struct ParseError {
    pub what: &'static str,
    pub value: String,
}

impl ParseError {
    pub fn new(what: &'static str, value: impl Into<String>) -> Self {
        Self {
            what,
            value: value.into(),
        }
    }
}
