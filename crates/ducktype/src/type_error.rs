use itertools::Itertools;
use std::fmt;

use crate::types::{CandidateType, FieldType, KeyKind};

/// A single reason a candidate isn't assignable to a target shape.
///
/// `field` is the path of the offending field relative to the value being
/// checked, e.g. `opacity`, `owner.name` or `tags[]`.  The path is empty when
/// the value itself has the wrong type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    MissingRequiredField(String),
    FieldTypeMismatch {
        field: String,
        expected: FieldType,
        actual: CandidateType,
    },
    ExcessProperty(String),
    IndexSignatureMismatch {
        field: String,
        key_kind: KeyKind,
        expected: FieldType,
        actual: CandidateType,
    },
    UnknownShape {
        field: String,
        name: String,
    },
}

impl Violation {
    pub fn field(&self) -> &str {
        match self {
            Violation::MissingRequiredField(field)
            | Violation::FieldTypeMismatch { field, .. }
            | Violation::ExcessProperty(field)
            | Violation::IndexSignatureMismatch { field, .. }
            | Violation::UnknownShape { field, .. } => field.as_str(),
        }
    }
}

struct FieldName<'a>(&'a str);

impl fmt::Display for FieldName<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            "" => write!(fmt, "value"),
            field => write!(fmt, "'{field}'"),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingRequiredField(field) => write!(
                fmt,
                "MissingRequiredField: {} is required",
                FieldName(field)
            ),
            Violation::FieldTypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                fmt,
                "FieldTypeMismatch: {} expected {expected}, got {actual}",
                FieldName(field)
            ),
            Violation::ExcessProperty(field) => write!(
                fmt,
                "ExcessProperty: {} does not exist in the target shape",
                FieldName(field)
            ),
            Violation::IndexSignatureMismatch {
                field,
                key_kind,
                expected,
                actual,
            } => write!(
                fmt,
                "IndexSignatureMismatch: {} of type {actual} is not assignable to {key_kind} index type {expected}",
                FieldName(field)
            ),
            Violation::UnknownShape { field, name } => write!(
                fmt,
                "UnknownShape: {} refers to undefined shape {name}",
                FieldName(field)
            ),
        }
    }
}

/// The outcome of one compatibility check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(Vec<Violation>),
}

impl Verdict {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        match violations.is_empty() {
            true => Verdict::Pass,
            false => Verdict::Fail(violations),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Verdict::Pass => &[],
            Verdict::Fail(violations) => violations,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(fmt, "Pass"),
            Verdict::Fail(violations) => {
                write!(fmt, "Fail({})", violations.iter().join(", "))
            }
        }
    }
}
