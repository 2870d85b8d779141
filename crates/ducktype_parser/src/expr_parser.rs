use crate::ast::*;
use crate::parse_error::ParseError;
use crate::parser::*;
use crate::token::*;

impl Parser {
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let token = self.next();
        let start = token.span.start;
        let kind = match &token.kind {
            TokenKind::NumLit(value) => ExprKind::Num(value.to_owned()),
            TokenKind::BigIntLit(value) => ExprKind::BigInt(value.to_owned()),
            TokenKind::StrLit(value) => ExprKind::Str(value.to_owned()),
            TokenKind::BoolLit(value) => ExprKind::Bool(*value),
            TokenKind::Null => ExprKind::Null,
            TokenKind::Undefined => ExprKind::Undefined,
            TokenKind::Identifier(name) => ExprKind::Ident(name.to_owned()),
            TokenKind::Minus => {
                let operand = self.next();
                match &operand.kind {
                    TokenKind::NumLit(value) => ExprKind::Num(format!("-{value}")),
                    TokenKind::BigIntLit(value) => ExprKind::BigInt(format!("-{value}")),
                    _ => return Err(self.unexpected(&operand, "number literal")),
                }
            }
            TokenKind::LeftBrace => ExprKind::Object(self.parse_object_props()?),
            TokenKind::LeftBracket => ExprKind::Array(self.parse_array_elems()?),
            _ => return Err(self.unexpected(&token, "expression")),
        };

        Ok(Expr {
            kind,
            span: start..self.last_end(),
        })
    }

    // Assumes the '{' has already been consumed.
    fn parse_object_props(&mut self) -> Result<Vec<ObjectProp>, ParseError> {
        let mut props: Vec<ObjectProp> = vec![];

        while self.peek().kind != TokenKind::RightBrace {
            let (key, key_span) = self.expect_prop_name()?;
            let value = if self.eat(&TokenKind::Colon) {
                self.parse_expr()?
            } else {
                // shorthand property, e.g. `{ x, y }`
                Expr {
                    kind: ExprKind::Ident(key.to_owned()),
                    span: key_span.clone(),
                }
            };

            props.push(ObjectProp {
                key,
                span: key_span.start..self.last_end(),
                value,
            });

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RightBrace)?;
        Ok(props)
    }

    // Assumes the '[' has already been consumed.
    fn parse_array_elems(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut elems: Vec<Expr> = vec![];

        while self.peek().kind != TokenKind::RightBracket {
            elems.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RightBracket)?;
        Ok(elems)
    }
}
