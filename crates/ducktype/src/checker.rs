use std::fmt;

use crate::diagnostic::Diagnostic;
use crate::registry::{RegistryError, ShapeRegistry};
use crate::type_error::Verdict;
use crate::types::*;
use crate::unify::{SourceShape, Unifier};

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(fmt, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerOptions {
    /// Treat fresh object literals like any other value when it comes to
    /// fields the target doesn't declare.
    pub suppress_excess_property_errors: bool,
    /// How deeply nested a comparison may get before it's cut short and
    /// assumed to be compatible.
    pub max_depth: usize,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        CheckerOptions {
            suppress_excess_property_errors: false,
            max_depth: 32,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Checker {
    pub registry: ShapeRegistry,
    pub options: CheckerOptions,
}

impl Checker {
    pub fn new(options: CheckerOptions) -> Self {
        Checker {
            registry: ShapeRegistry::new(),
            options,
        }
    }

    pub fn with_registry(registry: ShapeRegistry, options: CheckerOptions) -> Self {
        Checker { registry, options }
    }

    pub fn define(
        &mut self,
        name: &str,
        fields: Vec<FieldSpec>,
        index_signatures: Vec<IndexSignature>,
    ) -> Result<(), RegistryError> {
        self.registry.define(name, fields, index_signatures)
    }

    pub fn define_extending(
        &mut self,
        name: &str,
        bases: &[&str],
        fields: Vec<FieldSpec>,
        index_signatures: Vec<IndexSignature>,
    ) -> Result<(), RegistryError> {
        self.registry
            .define_extending(name, bases, fields, index_signatures)
    }

    pub fn lookup(&self, name: &str) -> Result<&ShapeDef, RegistryError> {
        self.registry.lookup(name)
    }

    /// Checks whether `candidate` may be used where `target` is expected.
    pub fn check(
        &self,
        candidate: &CandidateShape,
        target: &ShapeDef,
        ctx: AssignContext,
    ) -> Verdict {
        let mut unifier = Unifier::new(&self.registry, &self.options);
        unifier.unify_shape(&SourceShape::from_candidate(candidate), target, "", ctx, 0);
        Verdict::from_violations(unifier.into_violations())
    }

    pub fn check_named(
        &self,
        candidate: &CandidateShape,
        target: &str,
        ctx: AssignContext,
    ) -> Result<Verdict, RegistryError> {
        let target = self.registry.lookup(target)?;
        Ok(self.check(candidate, target, ctx))
    }

    /// Like `check` but for any value, not just object values.
    pub fn check_type(
        &self,
        actual: &CandidateType,
        expected: &FieldType,
        ctx: AssignContext,
    ) -> Verdict {
        let mut unifier = Unifier::new(&self.registry, &self.options);
        unifier.unify_type(actual, expected, "", ctx, 0);
        Verdict::from_violations(unifier.into_violations())
    }

    pub fn can_assign_to(&self, target: &str, field: &str) -> Result<bool, RegistryError> {
        Ok(self.registry.lookup(target)?.can_assign_to(field))
    }
}
