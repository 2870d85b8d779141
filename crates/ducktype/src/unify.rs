use std::borrow::Cow;
use std::collections::HashSet;

use tracing::{trace, warn};

use crate::checker::CheckerOptions;
use crate::registry::ShapeRegistry;
use crate::type_error::Violation;
use crate::types::*;

/// A field as seen on the value being checked.
#[derive(Debug, Clone)]
pub(crate) struct SourceField<'a> {
    pub name: &'a str,
    pub t: Cow<'a, CandidateType>,
    pub optional: bool,
}

/// Either a candidate shape or a registered shape, viewed as the value side
/// of a comparison.
#[derive(Debug, Clone)]
pub(crate) struct SourceShape<'a> {
    pub fields: Vec<SourceField<'a>>,
    pub index_signatures: &'a [IndexSignature],
}

impl<'a> SourceShape<'a> {
    pub fn from_candidate(shape: &'a CandidateShape) -> Self {
        SourceShape {
            fields: shape
                .iter()
                .map(|(name, t)| SourceField {
                    name,
                    t: Cow::Borrowed(t),
                    optional: false,
                })
                .collect(),
            index_signatures: &[],
        }
    }

    pub fn from_def(def: &'a ShapeDef) -> Self {
        SourceShape {
            fields: def
                .fields
                .iter()
                .map(|field| SourceField {
                    name: &field.name,
                    t: Cow::Owned(CandidateType::from(&field.t)),
                    optional: field.optional,
                })
                .collect(),
            index_signatures: &def.index_signatures,
        }
    }

    fn get(&self, name: &str) -> Option<&SourceField<'a>> {
        self.fields.iter().find(|field| field.name == name)
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    match prefix {
        "" => name.to_owned(),
        _ => format!("{prefix}.{name}"),
    }
}

/// Width subtyping over shapes.
///
/// Violations are collected rather than returned early so that a single
/// check reports everything that's wrong with the candidate.
pub(crate) struct Unifier<'a> {
    registry: &'a ShapeRegistry,
    options: &'a CheckerOptions,
    // (source, target) pairs of named shapes currently being compared.  A
    // pair that comes up again while still in progress is assumed to be
    // compatible, which is what makes recursive shapes terminate.
    in_progress: HashSet<(String, String)>,
    violations: Vec<Violation>,
}

impl<'a> Unifier<'a> {
    pub fn new(registry: &'a ShapeRegistry, options: &'a CheckerOptions) -> Self {
        Unifier {
            registry,
            options,
            in_progress: HashSet::new(),
            violations: vec![],
        }
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Checks that every value of `source` can be used where `target` is
    /// expected.  Violations are appended in target declaration order,
    /// followed by any problems with fields the target doesn't declare.
    pub fn unify_shape(
        &mut self,
        source: &SourceShape,
        target: &ShapeDef,
        path: &str,
        ctx: AssignContext,
        depth: usize,
    ) {
        if depth > self.options.max_depth {
            warn!(
                shape = %target.name,
                path,
                max_depth = self.options.max_depth,
                "comparison exceeds max depth, assuming compatible"
            );
            return;
        }
        trace!(shape = %target.name, path, ?ctx, "unify shape");

        for field in &target.fields {
            let field_path = join_path(path, &field.name);
            match source.get(&field.name) {
                None if field.optional => (),
                None => self
                    .violations
                    .push(Violation::MissingRequiredField(field_path)),
                // An optional source field might be absent at runtime.
                Some(source_field) if source_field.optional && !field.optional => self
                    .violations
                    .push(Violation::MissingRequiredField(field_path)),
                Some(source_field) => {
                    self.unify_type(&source_field.t, &field.t, &field_path, ctx, depth + 1)
                }
            }
        }

        let excess_ctx = match self.options.suppress_excess_property_errors {
            true => AssignContext::Variable,
            false => ctx,
        };

        for source_field in &source.fields {
            if target.field(source_field.name).is_some() {
                continue;
            }
            let field_path = join_path(path, source_field.name);
            let sigs = target.index_signatures_for(source_field.name);

            if sigs.is_empty() {
                if excess_ctx == AssignContext::Literal {
                    self.violations
                        .push(Violation::ExcessProperty(field_path));
                }
                continue;
            }

            // The number signature comes first and takes precedence.  The
            // string signature is only consulted once it passes, and by then
            // freshness has already been accounted for.
            let mut sig_ctx = ctx;
            for sig in sigs {
                if !self.unify_index_value(&source_field.t, sig, &field_path, sig_ctx, depth) {
                    break;
                }
                sig_ctx = AssignContext::Variable;
            }
        }

        for source_sig in source.index_signatures {
            if let Some(sig) = target.index_signature(source_sig.key_kind) {
                let sig_path = join_path(path, &format!("[{}]", source_sig.key_kind));
                let actual = CandidateType::from(&source_sig.t);
                self.unify_index_value(&actual, sig, &sig_path, AssignContext::Variable, depth);
            }
        }
    }

    /// Returns true if `actual` fits the index signature.  Any nested
    /// problems are folded into a single IndexSignatureMismatch.
    fn unify_index_value(
        &mut self,
        actual: &CandidateType,
        sig: &IndexSignature,
        path: &str,
        ctx: AssignContext,
        depth: usize,
    ) -> bool {
        let mark = self.violations.len();
        self.unify_type(actual, &sig.t, path, ctx, depth + 1);
        if self.violations.len() == mark {
            return true;
        }
        self.violations.truncate(mark);
        self.violations.push(Violation::IndexSignatureMismatch {
            field: path.to_owned(),
            key_kind: sig.key_kind,
            expected: sig.t.to_owned(),
            actual: actual.to_owned(),
        });
        false
    }

    pub fn unify_type(
        &mut self,
        actual: &CandidateType,
        expected: &FieldType,
        path: &str,
        ctx: AssignContext,
        depth: usize,
    ) {
        match (actual, expected) {
            // All types are assignable to `unknown`
            (_, FieldType::Keyword(Keyword::Unknown)) => (),
            // `never` is assignable to everything
            (CandidateType::Keyword(Keyword::Never), _) => (),
            (CandidateType::Keyword(kw1), FieldType::Keyword(kw2)) if kw1 == kw2 => (),
            (CandidateType::Keyword(Keyword::Undefined), FieldType::Keyword(Keyword::Void)) => (),

            (CandidateType::Array(elem1), FieldType::Array(elem2))
            | (CandidateType::Array(elem1), FieldType::ReadonlyArray(elem2))
            | (CandidateType::ReadonlyArray(elem1), FieldType::ReadonlyArray(elem2)) => {
                self.unify_type(elem1, elem2, &format!("{path}[]"), ctx, depth + 1)
            }

            // Nested object values are as fresh as the value that contains
            // them so `ctx` is passed along unchanged.
            (CandidateType::Object(shape), FieldType::Ref(name)) => {
                let registry = self.registry;
                match registry.get(name) {
                    Some(target) => self.unify_shape(
                        &SourceShape::from_candidate(shape),
                        target,
                        path,
                        ctx,
                        depth + 1,
                    ),
                    None => self.violations.push(Violation::UnknownShape {
                        field: path.to_owned(),
                        name: name.to_owned(),
                    }),
                }
            }

            (CandidateType::Ref(name1), FieldType::Ref(name2)) if name1 == name2 => (),
            (CandidateType::Ref(name1), FieldType::Ref(name2)) => {
                let registry = self.registry;
                let (source, target) = match (registry.get(name1), registry.get(name2)) {
                    (Some(source), Some(target)) => (source, target),
                    (None, _) => {
                        self.violations.push(Violation::UnknownShape {
                            field: path.to_owned(),
                            name: name1.to_owned(),
                        });
                        return;
                    }
                    (_, None) => {
                        self.violations.push(Violation::UnknownShape {
                            field: path.to_owned(),
                            name: name2.to_owned(),
                        });
                        return;
                    }
                };

                let key = (name1.to_owned(), name2.to_owned());
                if !self.in_progress.insert(key.clone()) {
                    return;
                }
                // Values of a named shape are never fresh.
                self.unify_shape(
                    &SourceShape::from_def(source),
                    target,
                    path,
                    AssignContext::Variable,
                    depth + 1,
                );
                self.in_progress.remove(&key);
            }

            (_, _) => self.violations.push(Violation::FieldTypeMismatch {
                field: path.to_owned(),
                expected: expected.to_owned(),
                actual: actual.to_owned(),
            }),
        }
    }
}

/// Define-time assignability between two declared types.
///
/// Returns `None` when the answer depends on a shape that hasn't been
/// registered yet, so forward references aren't rejected.
pub(crate) fn is_assignable(
    registry: &ShapeRegistry,
    actual: &FieldType,
    expected: &FieldType,
) -> Option<bool> {
    let options = CheckerOptions::default();
    let mut unifier = Unifier::new(registry, &options);
    unifier.unify_type(
        &CandidateType::from(actual),
        expected,
        "",
        AssignContext::Variable,
        0,
    );
    let violations = unifier.into_violations();
    if violations
        .iter()
        .any(|violation| matches!(violation, Violation::UnknownShape { .. }))
    {
        return None;
    }
    Some(violations.is_empty())
}
