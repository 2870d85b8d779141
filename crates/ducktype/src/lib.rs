use error_stack::{Result, ResultExt};

mod checker;
mod diagnostic;
mod errors;
mod program;
mod registry;
mod type_error;
mod types;
mod unify;

pub use checker::{Checker, CheckerOptions, Report};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use errors::CheckError;
pub use program::{check_program, field_type_from_ann, infer_expr, Binding, Scope};
pub use registry::{RegistryError, ShapeRegistry};
pub use type_error::{Verdict, Violation};
pub use types::*;

/// Parses `src` and checks every statement in it against `checker`.
///
/// Shapes declared by `src` stay registered with `checker` afterwards.
pub fn check_source(checker: &mut Checker, src: &str) -> Result<Report, CheckError> {
    let program = ducktype_parser::parse(src)
        .change_context(CheckError)
        .attach_printable("Failed to parse source")?;
    Ok(check_program(checker, &program))
}
