use error_stack::Context;
use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub struct CheckError;

impl fmt::Display for CheckError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "CheckError")
    }
}

impl Context for CheckError {}
