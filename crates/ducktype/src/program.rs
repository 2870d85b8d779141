use im::hashmap::HashMap;
use itertools::Itertools;
use tracing::debug;

use ducktype_parser::*;

use crate::checker::{Checker, Report};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::registry::RegistryError;
use crate::type_error::Verdict;
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub mutable: bool,
    pub t: FieldType,
}

/// Top-level bindings introduced by `let` and `const`.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    values: HashMap<String, Binding>,
}

impl Scope {
    pub fn lookup_binding(&self, name: &str) -> Option<&Binding> {
        self.values.get(name)
    }

    fn insert_binding(&mut self, name: String, b: Binding) {
        self.values.insert(name, b);
    }
}

pub fn field_type_from_ann(type_ann: &TypeAnn) -> FieldType {
    match &type_ann.kind {
        TypeAnnKind::Keyword(kw) => FieldType::Keyword(*kw),
        TypeAnnKind::TypeRef(name) => FieldType::Ref(name.to_owned()),
        TypeAnnKind::Array(elem) => FieldType::array(field_type_from_ann(elem)),
        TypeAnnKind::ReadonlyArray(elem) => FieldType::readonly_array(field_type_from_ann(elem)),
    }
}

fn members_from_decl(decl: &InterfaceDecl) -> (Vec<FieldSpec>, Vec<IndexSignature>) {
    let mut fields = vec![];
    let mut index_signatures = vec![];
    for member in &decl.members {
        match member {
            Member::Prop(prop) => fields.push(FieldSpec {
                name: prop.name.to_owned(),
                t: field_type_from_ann(&prop.type_ann),
                optional: prop.optional,
                readonly: prop.readonly,
            }),
            Member::Index(sig) => index_signatures.push(IndexSignature {
                key_kind: match sig.key {
                    IndexKey::String => KeyKind::String,
                    IndexKey::Number => KeyKind::Number,
                },
                t: field_type_from_ann(&sig.type_ann),
                readonly: sig.readonly,
            }),
        }
    }
    (fields, index_signatures)
}

/// Returns the type of `expr` along with whether it's a fresh value.
pub fn infer_expr(
    scope: &Scope,
    expr: &Expr,
) -> Result<(CandidateType, AssignContext), Diagnostic> {
    let ctx = match &expr.kind {
        ExprKind::Object(_) | ExprKind::Array(_) => AssignContext::Literal,
        _ => AssignContext::Variable,
    };
    Ok((infer_type(scope, expr)?, ctx))
}

fn infer_type(scope: &Scope, expr: &Expr) -> Result<CandidateType, Diagnostic> {
    let t = match &expr.kind {
        ExprKind::Num(_) => Keyword::Number.into(),
        ExprKind::BigInt(_) => Keyword::Bigint.into(),
        ExprKind::Str(_) => Keyword::String.into(),
        ExprKind::Bool(_) => Keyword::Boolean.into(),
        ExprKind::Null => Keyword::Null.into(),
        ExprKind::Undefined => Keyword::Undefined.into(),
        ExprKind::Ident(name) => match scope.lookup_binding(name) {
            Some(b) => CandidateType::from(&b.t),
            None => {
                return Err(Diagnostic::new(
                    DiagnosticKind::UndefinedBinding,
                    format!("Cannot find name '{name}'"),
                    expr.span.clone(),
                ))
            }
        },
        ExprKind::Object(props) => {
            let mut shape = CandidateShape::new();
            for prop in props {
                shape.insert(prop.key.to_owned(), infer_type(scope, &prop.value)?);
            }
            CandidateType::Object(shape)
        }
        ExprKind::Array(elems) => {
            let elems = elems
                .iter()
                .map(|elem| infer_type(scope, elem))
                .collect::<Result<Vec<_>, _>>()?;
            // There are no unions so mixed arrays fall back to `unknown[]`.
            let elem = match elems.first() {
                None => Keyword::Never.into(),
                Some(first) if elems.iter().all_equal() => first.to_owned(),
                Some(_) => Keyword::Unknown.into(),
            };
            CandidateType::Array(Box::new(elem))
        }
    };
    Ok(t)
}

/// Gives an inferred type a name that bindings can refer to.  Object values
/// are registered as anonymous shapes called `typeof <path>`.
fn widen_inferred(
    checker: &mut Checker,
    path: &str,
    t: &CandidateType,
) -> Result<FieldType, RegistryError> {
    let t = match t {
        CandidateType::Keyword(kw) => FieldType::Keyword(*kw),
        CandidateType::Ref(name) => FieldType::Ref(name.to_owned()),
        CandidateType::Array(elem) => {
            FieldType::array(widen_inferred(checker, &format!("{path}[]"), elem)?)
        }
        CandidateType::ReadonlyArray(elem) => {
            FieldType::readonly_array(widen_inferred(checker, &format!("{path}[]"), elem)?)
        }
        CandidateType::Object(shape) => {
            let mut fields = vec![];
            for (name, t) in shape.iter() {
                let t = widen_inferred(checker, &format!("{path}.{name}"), t)?;
                fields.push(FieldSpec::new(name, t));
            }
            let name = format!("typeof {path}");
            checker.define(&name, fields, vec![])?;
            FieldType::Ref(name)
        }
    };
    Ok(t)
}

fn not_assignable(
    verdict: Verdict,
    actual: &CandidateType,
    expected: &FieldType,
    span: &Span,
) -> Option<Diagnostic> {
    match verdict {
        Verdict::Pass => None,
        Verdict::Fail(violations) => Some(
            Diagnostic::new(
                DiagnosticKind::NotAssignable,
                format!("Type '{actual}' is not assignable to type '{expected}'"),
                span.to_owned(),
            )
            .with_reasons(violations),
        ),
    }
}

struct ProgramChecker<'a> {
    checker: &'a mut Checker,
    scope: Scope,
    report: Report,
}

impl<'a> ProgramChecker<'a> {
    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), Diagnostic> {
        match &stmt.kind {
            StmtKind::Interface(decl) => self.check_interface(decl, &stmt.span),
            StmtKind::VarDecl(decl) => self.check_var_decl(decl, &stmt.span),
            StmtKind::Assign(assign) => self.check_assign(assign, &stmt.span),
        }
    }

    fn check_interface(&mut self, decl: &InterfaceDecl, span: &Span) -> Result<(), Diagnostic> {
        let (fields, index_signatures) = members_from_decl(decl);
        let bases = decl
            .extends
            .iter()
            .map(|base| base.name.as_str())
            .collect::<Vec<_>>();
        self.checker
            .define_extending(&decl.name.name, &bases, fields, index_signatures)
            .map_err(|err| Diagnostic::from((err, span.to_owned())))
    }

    fn check_var_decl(&mut self, decl: &VarDecl, span: &Span) -> Result<(), Diagnostic> {
        let name = &decl.name.name;
        if self.scope.lookup_binding(name).is_some() {
            return Err(Diagnostic::new(
                DiagnosticKind::Redeclared,
                format!("Cannot redeclare block-scoped variable '{name}'"),
                decl.name.span.clone(),
            ));
        }
        let mutable = decl.kind == DeclKind::Let;

        let t = match (&decl.type_ann, &decl.init) {
            (Some(type_ann), init) => {
                let expected = field_type_from_ann(type_ann);
                // Bind first so the declaration holds even if the
                // initializer is rejected.
                self.scope.insert_binding(
                    name.to_owned(),
                    Binding {
                        mutable,
                        t: expected.to_owned(),
                    },
                );
                if let Some(init) = init {
                    let (actual, ctx) = infer_expr(&self.scope, init)?;
                    let verdict = self.checker.check_type(&actual, &expected, ctx);
                    if let Some(diagnostic) =
                        not_assignable(verdict, &actual, &expected, &init.span)
                    {
                        return Err(diagnostic);
                    }
                }
                expected
            }
            (None, Some(init)) => {
                let (actual, _) = infer_expr(&self.scope, init)?;
                widen_inferred(self.checker, name, &actual)
                    .map_err(|err| Diagnostic::from((err, span.to_owned())))?
            }
            (None, None) => Keyword::Unknown.into(),
        };
        self.scope.insert_binding(name.to_owned(), Binding { mutable, t });

        if !mutable && !decl.declare && decl.init.is_none() {
            return Err(Diagnostic::new(
                DiagnosticKind::MissingInitializer,
                "'const' declarations must be initialized",
                decl.name.span.clone(),
            ));
        }
        Ok(())
    }

    fn check_assign(&mut self, assign: &Assign, span: &Span) -> Result<(), Diagnostic> {
        let (expected, value_ok_if_undefined) = match &assign.target {
            AssignTarget::Ident(ident) => {
                let b = self.lookup(ident)?;
                if !b.mutable {
                    return Err(Diagnostic::new(
                        DiagnosticKind::ConstAssignment,
                        format!("Cannot assign to '{}' because it is a constant", ident.name),
                        ident.span.clone(),
                    ));
                }
                (b.t.to_owned(), false)
            }
            AssignTarget::Member { object, prop } => {
                let b = self.lookup(object)?;
                let unknown_property = || {
                    Diagnostic::new(
                        DiagnosticKind::UnknownProperty,
                        format!("Property '{}' does not exist on type '{}'", prop.name, b.t),
                        prop.span.clone(),
                    )
                };
                let readonly_property = || {
                    Diagnostic::new(
                        DiagnosticKind::ReadonlyProperty,
                        format!(
                            "Cannot assign to '{}' because it is a read-only property",
                            prop.name
                        ),
                        prop.span.clone(),
                    )
                };
                let readonly_index = |name: &str| {
                    Diagnostic::new(
                        DiagnosticKind::ReadonlyProperty,
                        format!("Index signature in type '{name}' only permits reading"),
                        prop.span.clone(),
                    )
                };

                match &b.t {
                    FieldType::Array(_) if prop.name == "length" => {
                        (Keyword::Number.into(), false)
                    }
                    FieldType::Array(elem) if is_numeric_key(&prop.name) => {
                        (elem.as_ref().to_owned(), false)
                    }
                    FieldType::ReadonlyArray(_) if prop.name == "length" => {
                        return Err(readonly_property())
                    }
                    FieldType::ReadonlyArray(_) if is_numeric_key(&prop.name) => {
                        return Err(readonly_index(&b.t.to_string()))
                    }
                    FieldType::Ref(shape_name) => {
                        let shape = self
                            .checker
                            .lookup(shape_name)
                            .map_err(|err| Diagnostic::from((err, span.to_owned())))?;

                        match shape.field(&prop.name) {
                            Some(field) if field.readonly => return Err(readonly_property()),
                            Some(field) => (field.t.to_owned(), field.optional),
                            None => match shape.index_signatures_for(&prop.name).first() {
                                None => return Err(unknown_property()),
                                Some(_) if !shape.can_assign_to(&prop.name) => {
                                    return Err(readonly_index(&shape.name))
                                }
                                Some(sig) => (sig.t.to_owned(), false),
                            },
                        }
                    }
                    _ => return Err(unknown_property()),
                }
            }
        };

        let (actual, ctx) = infer_expr(&self.scope, &assign.value)?;
        if value_ok_if_undefined && actual == CandidateType::Keyword(Keyword::Undefined) {
            return Ok(());
        }
        let verdict = self.checker.check_type(&actual, &expected, ctx);
        match not_assignable(verdict, &actual, &expected, &assign.value.span) {
            Some(diagnostic) => Err(diagnostic),
            None => Ok(()),
        }
    }

    fn lookup(&self, ident: &Ident) -> Result<Binding, Diagnostic> {
        match self.scope.lookup_binding(&ident.name) {
            Some(b) => Ok(b.to_owned()),
            None => Err(Diagnostic::new(
                DiagnosticKind::UndefinedBinding,
                format!("Cannot find name '{}'", ident.name),
                ident.span.clone(),
            )),
        }
    }
}

/// Checks each statement in order.  A statement with an error is reported
/// and checking carries on with the next one.
pub fn check_program(checker: &mut Checker, program: &Program) -> Report {
    let mut pc = ProgramChecker {
        checker,
        scope: Scope::default(),
        report: Report::default(),
    };
    for stmt in &program.stmts {
        if let Err(diagnostic) = pc.check_stmt(stmt) {
            debug!(code = diagnostic.code(), span = ?diagnostic.span, "{}", diagnostic.message);
            pc.report.diagnostics.push(diagnostic);
        }
    }
    pc.report
}
