use std::fmt;

use ducktype_parser::Span;

use crate::registry::RegistryError;
use crate::type_error::Violation;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    Registry(RegistryError),
    NotAssignable,
    ConstAssignment,
    ReadonlyProperty,
    UnknownProperty,
    UndefinedBinding,
    MissingInitializer,
    Redeclared,
}

impl DiagnosticKind {
    /// Error codes follow the TypeScript compiler's numbering where there's
    /// an equivalent diagnostic.
    pub fn code(&self) -> u32 {
        match self {
            DiagnosticKind::Registry(err) => match err {
                RegistryError::DuplicateField { .. } => 2300,
                RegistryError::DuplicateIndexSignature { .. } => 2374,
                RegistryError::UnknownShape(_) => 2304,
                RegistryError::InconsistentIndexSignatures { .. } => 2413,
                RegistryError::FieldConflictsWithIndexSignature { .. } => 2411,
                RegistryError::IncompatibleExtension { .. } => 2430,
            },
            DiagnosticKind::NotAssignable => 2322,
            DiagnosticKind::ConstAssignment => 2588,
            DiagnosticKind::ReadonlyProperty => 2540,
            DiagnosticKind::UnknownProperty => 2339,
            DiagnosticKind::UndefinedBinding => 2304,
            DiagnosticKind::MissingInitializer => 1155,
            DiagnosticKind::Redeclared => 2451,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub reasons: Vec<Violation>,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            reasons: vec![],
            span,
        }
    }

    pub fn with_reasons(mut self, reasons: Vec<Violation>) -> Self {
        self.reasons = reasons;
        self
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

impl From<(RegistryError, Span)> for Diagnostic {
    fn from((err, span): (RegistryError, Span)) -> Self {
        let message = err.to_string();
        Diagnostic::new(DiagnosticKind::Registry(err), message, span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "DT_{} - {}", self.code(), self.message)?;
        if self.reasons.is_empty() {
            return Ok(());
        }
        write!(fmt, ":")?;
        let len = self.reasons.len();
        for (i, reason) in self.reasons.iter().enumerate() {
            if i < len - 1 {
                write!(fmt, "\n\u{251C} {reason}")?
            } else {
                write!(fmt, "\n\u{2514} {reason}")?
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn display_with_reasons() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::NotAssignable,
            "Type '{ colour: string }' is not assignable to type 'SquareConfig'",
            0..10,
        )
        .with_reasons(vec![
            Violation::ExcessProperty("colour".to_string()),
            Violation::MissingRequiredField("width".to_string()),
        ]);
        assert_eq!(
            diagnostic.to_string(),
            "DT_2322 - Type '{ colour: string }' is not assignable to type 'SquareConfig':\n\
             \u{251C} ExcessProperty: 'colour' does not exist in the target shape\n\
             \u{2514} MissingRequiredField: 'width' is required"
        );
    }

    #[test]
    fn display_registry_error() {
        let diagnostic = Diagnostic::from((RegistryError::UnknownShape("Shape".to_string()), 0..5));
        assert_eq!(diagnostic.code(), 2304);
        assert_eq!(diagnostic.to_string(), "DT_2304 - unknown shape `Shape`");
    }
}
