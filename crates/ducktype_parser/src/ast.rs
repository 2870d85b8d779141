use std::fmt;

use crate::source_location::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Keyword {
    Number,
    String,
    Boolean,
    Bigint,
    Symbol,
    Null,
    Undefined,
    Void,
    Unknown,
    Never,
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let result = match self {
            Keyword::Number => "number",
            Keyword::String => "string",
            Keyword::Boolean => "boolean",
            Keyword::Bigint => "bigint",
            Keyword::Symbol => "symbol",
            Keyword::Null => "null",
            Keyword::Undefined => "undefined",
            Keyword::Void => "void",
            Keyword::Unknown => "unknown",
            Keyword::Never => "never",
        };
        write!(f, "{result}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeAnnKind {
    Keyword(Keyword),
    TypeRef(String),
    // `T[]` and `Array<T>` both produce this
    Array(Box<TypeAnn>),
    ReadonlyArray(Box<TypeAnn>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeAnn {
    pub kind: TypeAnnKind,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKey {
    String,
    Number,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropSig {
    pub name: String,
    pub optional: bool,
    pub readonly: bool,
    pub type_ann: TypeAnn,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSig {
    pub key_name: String,
    pub key: IndexKey,
    pub readonly: bool,
    pub type_ann: TypeAnn,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Member {
    Prop(PropSig),
    Index(IndexSig),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: Ident,
    pub extends: Vec<Ident>,
    pub members: Vec<Member>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclKind {
    Let,
    Const,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarDecl {
    pub kind: DeclKind,
    pub declare: bool,
    pub name: Ident,
    pub type_ann: Option<TypeAnn>,
    pub init: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssignTarget {
    Ident(Ident),
    Member { object: Ident, prop: Ident },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assign {
    pub target: AssignTarget,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StmtKind {
    Interface(InterfaceDecl),
    VarDecl(VarDecl),
    Assign(Assign),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectProp {
    pub key: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    Num(String),
    BigInt(String),
    Str(String),
    Bool(bool),
    Null,
    Undefined,
    Ident(String),
    Object(Vec<ObjectProp>),
    Array(Vec<Expr>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}
