use crate::source_location::*;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    Identifier(String), // [a-zA-Z_$][a-zA-Z0-9_$]*

    // Literals
    BoolLit(bool),
    NumLit(String),
    BigIntLit(String),
    StrLit(String),
    Null,
    Undefined,

    // Types
    Number,
    Boolean,
    String,
    Bigint,
    Symbol,
    Void,
    Unknown,
    Never,

    // Keywords
    Interface,
    Extends,
    Readonly,
    Declare,
    Let,
    Const,

    // punctuation
    Colon,
    Comma,
    Semicolon,
    Dot,
    Question,
    Assign,
    Minus,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    LessThan,
    GreaterThan,

    Eof,
}

impl TokenKind {
    pub fn from_word(word: &str) -> TokenKind {
        match word {
            "true" => TokenKind::BoolLit(true),
            "false" => TokenKind::BoolLit(false),
            "null" => TokenKind::Null,
            "undefined" => TokenKind::Undefined,
            "number" => TokenKind::Number,
            "boolean" => TokenKind::Boolean,
            "string" => TokenKind::String,
            "bigint" => TokenKind::Bigint,
            "symbol" => TokenKind::Symbol,
            "void" => TokenKind::Void,
            "unknown" => TokenKind::Unknown,
            "never" => TokenKind::Never,
            "interface" => TokenKind::Interface,
            "extends" => TokenKind::Extends,
            "readonly" => TokenKind::Readonly,
            "declare" => TokenKind::Declare,
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            _ => TokenKind::Identifier(word.to_owned()),
        }
    }

    /// Returns the source text of identifiers and keywords.  Keywords are
    /// valid property names, e.g. `{ readonly: true, number: 5 }`.
    pub fn as_word(&self) -> Option<&str> {
        let word = match self {
            TokenKind::Identifier(name) => name.as_str(),
            TokenKind::BoolLit(true) => "true",
            TokenKind::BoolLit(false) => "false",
            TokenKind::Null => "null",
            TokenKind::Undefined => "undefined",
            TokenKind::Number => "number",
            TokenKind::Boolean => "boolean",
            TokenKind::String => "string",
            TokenKind::Bigint => "bigint",
            TokenKind::Symbol => "symbol",
            TokenKind::Void => "void",
            TokenKind::Unknown => "unknown",
            TokenKind::Never => "never",
            TokenKind::Interface => "interface",
            TokenKind::Extends => "extends",
            TokenKind::Readonly => "readonly",
            TokenKind::Declare => "declare",
            TokenKind::Let => "let",
            TokenKind::Const => "const",
            _ => return None,
        };
        Some(word)
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

pub const EOF: Token = Token {
    kind: TokenKind::Eof,
    span: DUMMY_SPAN,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip_through_as_word() {
        for word in ["interface", "readonly", "number", "null", "true", "const"] {
            assert_eq!(TokenKind::from_word(word).as_word(), Some(word));
        }
        assert_eq!(
            TokenKind::from_word("label"),
            TokenKind::Identifier("label".to_string())
        );
        assert_eq!(TokenKind::Colon.as_word(), None);
    }
}
