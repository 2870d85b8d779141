use crate::parse_error::ParseError;
use crate::scanner::Scanner;
use crate::source_location::*;
use crate::token::*;

pub struct Lexer {
    scanner: Scanner,
}

impl Lexer {
    pub fn new(string: &str) -> Self {
        Self {
            scanner: Scanner::new(string),
        }
    }

    pub fn lex(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(character) = self.scanner.peek(0) {
            let start = self.scanner.offset();
            let kind = match character {
                ' ' | '\t' | '\r' | '\n' => {
                    self.scanner.pop();
                    continue;
                }
                '/' => match self.scanner.peek(1) {
                    Some('/') => {
                        self.skip_line_comment();
                        continue;
                    }
                    Some('*') => {
                        self.skip_block_comment(start)?;
                        continue;
                    }
                    _ => return Err(self.unexpected(character, start)),
                },
                'a'..='z' | 'A'..='Z' | '_' | '$' => {
                    tokens.push(self.lex_ident_or_keyword(start));
                    continue;
                }
                '0'..='9' => {
                    tokens.push(self.lex_number(start)?);
                    continue;
                }
                '"' | '\'' | '`' => {
                    tokens.push(self.lex_string(start, character)?);
                    continue;
                }
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                '[' => TokenKind::LeftBracket,
                ']' => TokenKind::RightBracket,
                '<' => TokenKind::LessThan,
                '>' => TokenKind::GreaterThan,
                ':' => TokenKind::Colon,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                '.' => TokenKind::Dot,
                '?' => TokenKind::Question,
                '=' => TokenKind::Assign,
                '-' => TokenKind::Minus,
                _ => return Err(self.unexpected(character, start)),
            };
            self.scanner.pop();
            tokens.push(Token {
                kind,
                span: start..self.scanner.offset(),
            });
        }
        Ok(tokens)
    }

    fn unexpected(&self, character: char, start: usize) -> ParseError {
        ParseError::new(
            format!("Unexpected character: '{character}'"),
            start..start + character.len_utf8(),
        )
    }

    fn skip_line_comment(&mut self) {
        while let Some(character) = self.scanner.pop() {
            if character == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self, start: usize) -> Result<(), ParseError> {
        self.scanner.pop(); // consume '/'
        self.scanner.pop(); // consume '*'
        loop {
            match self.scanner.pop() {
                Some('*') if self.scanner.peek(0) == Some('/') => {
                    self.scanner.pop();
                    return Ok(());
                }
                Some(_) => (),
                None => {
                    return Err(ParseError::new(
                        "Unterminated block comment",
                        start..self.scanner.offset(),
                    ))
                }
            }
        }
    }

    fn lex_ident_or_keyword(&mut self, start: usize) -> Token {
        let mut ident = String::new();
        while let Some(character) = self.scanner.peek(0) {
            match character {
                'a'..='z' | 'A'..='Z' | '_' | '$' | '0'..='9' => {
                    ident.push(character);
                    self.scanner.pop();
                }
                _ => break,
            }
        }
        Token {
            kind: TokenKind::from_word(&ident),
            span: start..self.scanner.offset(),
        }
    }

    // Accepts decimal, hex (0x), binary (0b) and octal (0o) literals with `_`
    // separators.  A trailing `n` makes it a bigint literal.
    fn lex_number(&mut self, start: usize) -> Result<Token, ParseError> {
        let mut raw = String::new();
        while let Some(character) = self.scanner.peek(0) {
            match character {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '.' => {
                    raw.push(character);
                    self.scanner.pop();
                }
                _ => break,
            }
        }
        let span = start..self.scanner.offset();

        let (digits, is_bigint) = match raw.strip_suffix('n') {
            Some(digits) => (digits, true),
            None => (raw.as_str(), false),
        };
        let digits = digits.replace('_', "");
        let lower = digits.to_ascii_lowercase();
        let valid = if let Some(hex) = lower.strip_prefix("0x") {
            u128::from_str_radix(hex, 16).is_ok()
        } else if let Some(bin) = lower.strip_prefix("0b") {
            u128::from_str_radix(bin, 2).is_ok()
        } else if let Some(oct) = lower.strip_prefix("0o") {
            u128::from_str_radix(oct, 8).is_ok()
        } else if is_bigint {
            digits.parse::<u128>().is_ok()
        } else {
            digits.parse::<f64>().is_ok() && !digits.ends_with('.')
        };

        if !valid {
            return Err(ParseError::new(
                format!("Invalid number literal: '{raw}'"),
                span,
            ));
        }

        let kind = match is_bigint {
            true => TokenKind::BigIntLit(digits),
            false => TokenKind::NumLit(digits),
        };
        Ok(Token { kind, span })
    }

    fn lex_string(&mut self, start: usize, quote: char) -> Result<Token, ParseError> {
        let mut string = String::new();
        self.scanner.pop(); // consume opening quote
        loop {
            match self.scanner.pop() {
                Some(character) if character == quote => break,
                Some('\\') => {
                    let escaped = self.scanner.pop().ok_or_else(|| {
                        ParseError::new("Unterminated string literal", start..self.scanner.offset())
                    })?;
                    match escaped {
                        'n' => string.push('\n'),
                        'r' => string.push('\r'),
                        't' => string.push('\t'),
                        'b' => string.push('\u{0008}'),
                        'f' => string.push('\u{000c}'),
                        '0' => string.push('\0'),
                        // covers quotes, backslashes and unknown escapes
                        character => string.push(character),
                    }
                }
                Some('\n') if quote != '`' => {
                    return Err(ParseError::new(
                        "Unterminated string literal",
                        start..self.scanner.offset(),
                    ))
                }
                Some(character) => string.push(character),
                None => {
                    return Err(ParseError::new(
                        "Unterminated string literal",
                        start..self.scanner.offset(),
                    ))
                }
            }
        }
        Ok(Token {
            kind: TokenKind::StrLit(string),
            span: start..self.scanner.offset(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .lex()
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn lex_interface_members() {
        assert_eq!(
            kinds("interface Point { readonly x: number; y?: string }"),
            vec![
                TokenKind::Interface,
                TokenKind::Identifier("Point".to_string()),
                TokenKind::LeftBrace,
                TokenKind::Readonly,
                TokenKind::Identifier("x".to_string()),
                TokenKind::Colon,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Identifier("y".to_string()),
                TokenKind::Question,
                TokenKind::Colon,
                TokenKind::String,
                TokenKind::RightBrace,
            ]
        );
    }

    #[test]
    fn lex_number_literals() {
        assert_eq!(
            kinds("6 0xf00d 0b1010 0o744 1_000 0.5 100n"),
            vec![
                TokenKind::NumLit("6".to_string()),
                TokenKind::NumLit("0xf00d".to_string()),
                TokenKind::NumLit("0b1010".to_string()),
                TokenKind::NumLit("0o744".to_string()),
                TokenKind::NumLit("1000".to_string()),
                TokenKind::NumLit("0.5".to_string()),
                TokenKind::BigIntLit("100".to_string()),
            ]
        );
    }

    #[test]
    fn lex_invalid_number() {
        let err = Lexer::new("let x = 0b102").lex().unwrap_err();
        assert_eq!(err.span, 8..13);
    }

    #[test]
    fn lex_strings_with_every_quote_style() {
        assert_eq!(
            kinds(r#"'blue' "red" `Bob ${name}` "a\"b""#),
            vec![
                TokenKind::StrLit("blue".to_string()),
                TokenKind::StrLit("red".to_string()),
                TokenKind::StrLit("Bob ${name}".to_string()),
                TokenKind::StrLit("a\"b".to_string()),
            ]
        );
    }

    #[test]
    fn lex_skips_comments() {
        assert_eq!(
            kinds("// heading\nlet /* inline */ a = 1; // FAIL"),
            vec![
                TokenKind::Let,
                TokenKind::Identifier("a".to_string()),
                TokenKind::Assign,
                TokenKind::NumLit("1".to_string()),
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn lex_unterminated_string() {
        let err = Lexer::new("let s = 'oops").lex().unwrap_err();
        assert_eq!(err.message, "Unterminated string literal");
        assert_eq!(err.span, 8..13);
    }

    #[test]
    fn lex_unexpected_character() {
        let err = Lexer::new("a # b").lex().unwrap_err();
        assert_eq!(err.span, 2..3);
    }
}
