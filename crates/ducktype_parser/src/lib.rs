mod ast;
mod expr_parser;
mod lexer;
mod parse_error;
mod parser;
mod scanner;
mod source_location;
mod stmt_parser;
mod token;
mod type_ann_parser;

use parser::Parser;

pub use ast::*;
pub use parse_error::ParseError;
pub use source_location::{Span, DUMMY_SPAN};
pub use stmt_parser::parse;

/// Parses a standalone type annotation such as `Array<Animal>`.
pub fn parse_type_ann(input: &str) -> Result<TypeAnn, ParseError> {
    let mut parser = Parser::new(input)?;
    let type_ann = parser.parse_type_ann()?;
    parser.expect(token::TokenKind::Eof)?;
    Ok(type_ann)
}

/// Parses a standalone expression such as an object literal.
pub fn parse_expr(input: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(input)?;
    let expr = parser.parse_expr()?;
    parser.expect(token::TokenKind::Eof)?;
    Ok(expr)
}
