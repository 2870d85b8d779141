// Shapes, fields and the types that flow through them
use itertools::Itertools;
use std::fmt;

pub use ducktype_parser::Keyword;

/// The declared type of a field or index signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Keyword(Keyword),
    Ref(String),
    Array(Box<FieldType>),
    /// `ReadonlyArray<T>`.  Arrays may be used where a readonly array is
    /// expected but not the other way round.
    ReadonlyArray(Box<FieldType>),
}

impl FieldType {
    pub fn reference(name: impl Into<String>) -> Self {
        FieldType::Ref(name.into())
    }

    pub fn array(elem: FieldType) -> Self {
        FieldType::Array(Box::new(elem))
    }

    pub fn readonly_array(elem: FieldType) -> Self {
        FieldType::ReadonlyArray(Box::new(elem))
    }
}

impl From<Keyword> for FieldType {
    fn from(kw: Keyword) -> Self {
        FieldType::Keyword(kw)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldType::Keyword(kw) => write!(f, "{kw}"),
            FieldType::Ref(name) => write!(f, "{name}"),
            FieldType::Array(elem) => write!(f, "{elem}[]"),
            FieldType::ReadonlyArray(elem) => write!(f, "readonly {elem}[]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyKind {
    String,
    Number,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyKind::String => write!(f, "string"),
            KeyKind::Number => write!(f, "number"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    pub name: String,
    pub t: FieldType,
    pub optional: bool,
    pub readonly: bool,
}

impl FieldSpec {
    /// A required, writable field.
    pub fn new(name: impl Into<String>, t: impl Into<FieldType>) -> Self {
        FieldSpec {
            name: name.into(),
            t: t.into(),
            optional: false,
            readonly: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.readonly {
            write!(f, "readonly ")?;
        }
        write!(f, "{}", self.name)?;
        if self.optional {
            write!(f, "?")?;
        }
        write!(f, ": {}", self.t)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexSignature {
    pub key_kind: KeyKind,
    pub t: FieldType,
    pub readonly: bool,
}

impl IndexSignature {
    pub fn new(key_kind: KeyKind, t: impl Into<FieldType>) -> Self {
        IndexSignature {
            key_kind,
            t: t.into(),
            readonly: false,
        }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

impl fmt::Display for IndexSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.readonly {
            write!(f, "readonly ")?;
        }
        write!(f, "[key: {}]: {}", self.key_kind, self.t)
    }
}

/// A named shape.  Fields keep their declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeDef {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub index_signatures: Vec<IndexSignature>,
}

impl ShapeDef {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn index_signature(&self, key_kind: KeyKind) -> Option<&IndexSignature> {
        self.index_signatures
            .iter()
            .find(|sig| sig.key_kind == key_kind)
    }

    /// Index signatures that cover `key`, number first.  A number signature
    /// only covers numeric-looking keys.
    pub fn index_signatures_for(&self, key: &str) -> Vec<&IndexSignature> {
        let number = match is_numeric_key(key) {
            true => self.index_signature(KeyKind::Number),
            false => None,
        };
        number
            .into_iter()
            .chain(self.index_signature(KeyKind::String))
            .collect()
    }

    /// Whether a value may be written to `field` on a value of this shape.
    ///
    /// Declared fields are writable unless marked `readonly`.  Undeclared
    /// fields are writable only through an index signature that isn't
    /// `readonly`; without one there's nothing to write to.
    pub fn can_assign_to(&self, field: &str) -> bool {
        match self.field(field) {
            Some(field) => !field.readonly,
            None => match self.index_signatures_for(field).first() {
                Some(sig) => !sig.readonly,
                None => false,
            },
        }
    }
}

impl fmt::Display for ShapeDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let members = self
            .index_signatures
            .iter()
            .map(|sig| sig.to_string())
            .chain(self.fields.iter().map(|field| field.to_string()))
            .join("; ");
        match members.is_empty() {
            true => write!(f, "interface {} {{}}", self.name),
            false => write!(f, "interface {} {{ {members} }}", self.name),
        }
    }
}

/// The observed type of a value being checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CandidateType {
    Keyword(Keyword),
    /// A value already typed as a named shape.
    Ref(String),
    Array(Box<CandidateType>),
    ReadonlyArray(Box<CandidateType>),
    /// A nested object value.
    Object(CandidateShape),
}

impl From<Keyword> for CandidateType {
    fn from(kw: Keyword) -> Self {
        CandidateType::Keyword(kw)
    }
}

impl From<&FieldType> for CandidateType {
    fn from(t: &FieldType) -> Self {
        match t {
            FieldType::Keyword(kw) => CandidateType::Keyword(*kw),
            FieldType::Ref(name) => CandidateType::Ref(name.to_owned()),
            FieldType::Array(elem) => CandidateType::Array(Box::new(elem.as_ref().into())),
            FieldType::ReadonlyArray(elem) => {
                CandidateType::ReadonlyArray(Box::new(elem.as_ref().into()))
            }
        }
    }
}

impl TryFrom<&CandidateType> for FieldType {
    type Error = ();

    /// Object values have no named shape to refer to so they can't be
    /// converted.
    fn try_from(t: &CandidateType) -> Result<Self, Self::Error> {
        match t {
            CandidateType::Keyword(kw) => Ok(FieldType::Keyword(*kw)),
            CandidateType::Ref(name) => Ok(FieldType::Ref(name.to_owned())),
            CandidateType::Array(elem) => Ok(FieldType::array(elem.as_ref().try_into()?)),
            CandidateType::ReadonlyArray(elem) => {
                Ok(FieldType::readonly_array(elem.as_ref().try_into()?))
            }
            CandidateType::Object(_) => Err(()),
        }
    }
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CandidateType::Keyword(kw) => write!(f, "{kw}"),
            CandidateType::Ref(name) => write!(f, "{name}"),
            CandidateType::Array(elem) => write!(f, "{elem}[]"),
            CandidateType::ReadonlyArray(elem) => write!(f, "readonly {elem}[]"),
            CandidateType::Object(shape) => write!(f, "{shape}"),
        }
    }
}

/// An ad-hoc, unnamed shape observed on a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CandidateShape {
    fields: Vec<(String, CandidateType)>,
}

impl CandidateShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `insert`.
    pub fn with(mut self, name: impl Into<String>, t: impl Into<CandidateType>) -> Self {
        self.insert(name, t);
        self
    }

    /// Later values for the same name replace earlier ones in place, the
    /// way duplicate keys in an object literal do.
    pub fn insert(&mut self, name: impl Into<String>, t: impl Into<CandidateType>) {
        let name = name.into();
        let t = t.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = t,
            None => self.fields.push((name, t)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CandidateType> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CandidateType)> {
        self.fields.iter().map(|(name, t)| (name.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, CandidateType)> for CandidateShape {
    fn from_iter<I: IntoIterator<Item = (S, CandidateType)>>(iter: I) -> Self {
        let mut shape = CandidateShape::new();
        for (name, t) in iter {
            shape.insert(name, t);
        }
        shape
    }
}

impl fmt::Display for CandidateShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "{{}}");
        }
        let fields = self
            .fields
            .iter()
            .map(|(name, t)| format!("{name}: {t}"))
            .join(", ");
        write!(f, "{{ {fields} }}")
    }
}

/// Where the candidate came from.  Only fresh object literals get the
/// excess property check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignContext {
    Literal,
    Variable,
}

/// Keys like `0`, `1.5` or `-3` are numeric: property access converts
/// numbers to these strings, so a number index signature covers them.
pub fn is_numeric_key(key: &str) -> bool {
    match key.parse::<f64>() {
        Ok(value) => value.is_finite() && format_number(value) == key,
        Err(_) => false,
    }
}

// Mirrors how JS writes a number as a property key: shortest round-trip
// digits, with exponent notation outside [1e-6, 1e21).
fn format_number(value: f64) -> String {
    let abs = value.abs();
    if value == 0.0 {
        // -0 is written as "0" as well.
        "0".to_owned()
    } else if !(1e-6..1e21).contains(&abs) {
        format!("{value:e}").replace('e', "e+").replace("e+-", "e-")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn numeric_keys_are_canonical_numbers() {
        assert!(is_numeric_key("0"));
        assert!(is_numeric_key("42"));
        assert!(is_numeric_key("1.5"));
        assert!(is_numeric_key("-3"));
        assert!(is_numeric_key("10000000000000000000"));
        assert!(!is_numeric_key("-0"));
        assert!(is_numeric_key("9223372036854776000"));
        assert!(!is_numeric_key("9223372036854775808"));
        assert!(is_numeric_key("1e+21"));
        assert!(!is_numeric_key("1000000000000000000000"));
        assert!(is_numeric_key("1e-7"));
        assert!(!is_numeric_key("01"));
        assert!(!is_numeric_key("1e3"));
        assert!(!is_numeric_key("length"));
        assert!(!is_numeric_key(""));
        assert!(!is_numeric_key("NaN"));
        assert!(!is_numeric_key("Infinity"));
    }

    #[test]
    fn candidate_insert_replaces_in_place() {
        let shape = CandidateShape::new()
            .with("a", Keyword::Number)
            .with("b", Keyword::String)
            .with("a", Keyword::Boolean);
        let fields: Vec<_> = shape.iter().map(|(name, t)| (name, t.clone())).collect();
        assert_eq!(
            fields,
            vec![
                ("a", CandidateType::Keyword(Keyword::Boolean)),
                ("b", CandidateType::Keyword(Keyword::String)),
            ]
        );
    }

    #[test]
    fn display_shapes() {
        let def = ShapeDef {
            name: "Point".to_string(),
            fields: vec![
                FieldSpec::new("x", Keyword::Number).readonly(),
                FieldSpec::new("tags", FieldType::array(Keyword::String.into())).optional(),
            ],
            index_signatures: vec![IndexSignature::new(KeyKind::String, Keyword::Unknown)],
        };
        assert_eq!(
            def.to_string(),
            "interface Point { [key: string]: unknown; readonly x: number; tags?: string[] }"
        );

        let candidate = CandidateShape::new()
            .with("owner", CandidateType::Object(CandidateShape::new()))
            .with("pet", CandidateType::Ref("Dog".to_string()));
        assert_eq!(candidate.to_string(), "{ owner: {}, pet: Dog }");
    }

    #[test]
    fn can_assign_to_respects_readonly_and_index_signatures() {
        let def = ShapeDef {
            name: "ReadonlyStringArray".to_string(),
            fields: vec![
                FieldSpec::new("length", Keyword::Number),
                FieldSpec::new("x", Keyword::Number).readonly(),
            ],
            index_signatures: vec![IndexSignature::new(KeyKind::Number, Keyword::String).readonly()],
        };
        assert!(def.can_assign_to("length"));
        assert!(!def.can_assign_to("x"));
        assert!(!def.can_assign_to("0"));
        assert!(!def.can_assign_to("missing"));
    }

    #[test]
    fn object_candidates_have_no_field_type() {
        let t = CandidateType::Array(Box::new(CandidateType::Object(CandidateShape::new())));
        assert_eq!(FieldType::try_from(&t), Err(()));
        let t = CandidateType::Array(Box::new(CandidateType::Ref("Dog".to_string())));
        assert_eq!(
            FieldType::try_from(&t),
            Ok(FieldType::array(FieldType::reference("Dog")))
        );
    }
}
