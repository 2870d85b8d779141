use crate::ast::*;
use crate::parse_error::ParseError;
use crate::parser::*;
use crate::token::*;

impl Parser {
    fn parse_type_ann_atom(&mut self) -> Result<TypeAnn, ParseError> {
        let token = self.next();
        let kind = match &token.kind {
            TokenKind::Number => TypeAnnKind::Keyword(Keyword::Number),
            TokenKind::String => TypeAnnKind::Keyword(Keyword::String),
            TokenKind::Boolean => TypeAnnKind::Keyword(Keyword::Boolean),
            TokenKind::Bigint => TypeAnnKind::Keyword(Keyword::Bigint),
            TokenKind::Symbol => TypeAnnKind::Keyword(Keyword::Symbol),
            TokenKind::Null => TypeAnnKind::Keyword(Keyword::Null),
            TokenKind::Undefined => TypeAnnKind::Keyword(Keyword::Undefined),
            TokenKind::Void => TypeAnnKind::Keyword(Keyword::Void),
            TokenKind::Unknown => TypeAnnKind::Keyword(Keyword::Unknown),
            TokenKind::Never => TypeAnnKind::Keyword(Keyword::Never),
            TokenKind::Identifier(name)
                if (name == "Array" || name == "ReadonlyArray")
                    && self.peek().kind == TokenKind::LessThan =>
            {
                self.next(); // consume '<'
                let elem = Box::new(self.parse_type_ann()?);
                self.expect(TokenKind::GreaterThan)?;
                match name.as_str() {
                    "ReadonlyArray" => TypeAnnKind::ReadonlyArray(elem),
                    _ => TypeAnnKind::Array(elem),
                }
            }
            TokenKind::Identifier(name) => TypeAnnKind::TypeRef(name.to_owned()),
            _ => return Err(self.unexpected(&token, "type")),
        };

        Ok(TypeAnn {
            kind,
            span: token.span.start..self.last_end(),
        })
    }

    pub fn parse_type_ann(&mut self) -> Result<TypeAnn, ParseError> {
        let mut type_ann = self.parse_type_ann_atom()?;

        // `T[]` binds tighter than anything else we parse, so postfix
        // brackets are handled in a simple loop.
        while self.peek().kind == TokenKind::LeftBracket
            && self.peek_nth(1).kind == TokenKind::RightBracket
        {
            self.next(); // consume '['
            self.next(); // consume ']'
            let span = type_ann.span.start..self.last_end();
            type_ann = TypeAnn {
                kind: TypeAnnKind::Array(Box::new(type_ann)),
                span,
            };
        }

        Ok(type_ann)
    }
}
