use crate::lexer::Lexer;
use crate::parse_error::ParseError;
use crate::source_location::*;
use crate::token::*;

pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    last_end: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: Lexer::new(input).lex()?,
            cursor: 0,
            last_end: 0,
        })
    }

    pub fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    pub fn peek_nth(&self, lookahead: usize) -> &Token {
        self.tokens.get(self.cursor + lookahead).unwrap_or(&EOF)
    }

    pub fn next(&mut self) -> Token {
        match self.tokens.get(self.cursor) {
            Some(token) => {
                self.cursor += 1;
                self.last_end = token.span.end;
                token.clone()
            }
            None => Token {
                kind: TokenKind::Eof,
                span: self.last_end..self.last_end,
            },
        }
    }

    /// End offset of the most recently consumed token.
    pub fn last_end(&self) -> usize {
        self.last_end
    }

    /// Consumes the next token if it matches `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.next();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.next();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.unexpected(&token, &format!("{kind:?}")))
        }
    }

    pub fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        let token = self.next();
        match &token.kind {
            TokenKind::Identifier(name) => Ok((name.clone(), token.span.clone())),
            _ => Err(self.unexpected(&token, "identifier")),
        }
    }

    /// Property names can be identifiers, keywords, strings or numbers.
    pub fn expect_prop_name(&mut self) -> Result<(String, Span), ParseError> {
        let token = self.next();
        if let Some(word) = token.kind.as_word() {
            return Ok((word.to_owned(), token.span));
        }
        match &token.kind {
            TokenKind::StrLit(name) | TokenKind::NumLit(name) => {
                Ok((name.clone(), token.span.clone()))
            }
            _ => Err(self.unexpected(&token, "property name")),
        }
    }

    pub fn unexpected(&self, token: &Token, expected: &str) -> ParseError {
        let span = match token.kind {
            TokenKind::Eof => self.last_end..self.last_end,
            _ => token.span.clone(),
        };
        ParseError::new(
            format!("Expected {expected}, found {:?}", token.kind),
            span,
        )
    }
}
