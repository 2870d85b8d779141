use std::fmt;

use crate::source_location::Span;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { message, span } = self;
        write!(fmt, "ParseError: {message} at {}..{}", span.start, span.end)
    }
}

impl std::error::Error for ParseError {}
