use crate::ast::*;
use crate::parse_error::ParseError;
use crate::parser::*;
use crate::source_location::merge_spans;
use crate::token::*;

impl Parser {
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut stmts = vec![];
        while self.peek().kind != TokenKind::Eof {
            stmts.push(self.parse_stmt()?);
        }
        Ok(Program { stmts })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let first = self.peek().span.clone();
        let kind = match &self.peek().kind {
            TokenKind::Interface => StmtKind::Interface(self.parse_interface()?),
            TokenKind::Declare => {
                self.next(); // consume 'declare'
                StmtKind::VarDecl(self.parse_var_decl(true)?)
            }
            TokenKind::Let | TokenKind::Const => StmtKind::VarDecl(self.parse_var_decl(false)?),
            TokenKind::Identifier(_) => StmtKind::Assign(self.parse_assign()?),
            _ => {
                let token = self.next();
                return Err(self.unexpected(&token, "statement"));
            }
        };
        let span = merge_spans(&first, &(self.last_end()..self.last_end()));
        // Semicolons are optional, the same as in TypeScript.
        self.eat(&TokenKind::Semicolon);

        Ok(Stmt { kind, span })
    }

    fn parse_interface(&mut self) -> Result<InterfaceDecl, ParseError> {
        self.expect(TokenKind::Interface)?;
        let (name, span) = self.expect_ident()?;
        let name = Ident { name, span };

        let mut extends = vec![];
        if self.eat(&TokenKind::Extends) {
            loop {
                let (name, span) = self.expect_ident()?;
                extends.push(Ident { name, span });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::LeftBrace)?;
        let mut members = vec![];
        while self.peek().kind != TokenKind::RightBrace {
            members.push(self.parse_member()?);
            // Members may be separated by ';', ',' or nothing at all.
            if !self.eat(&TokenKind::Semicolon) {
                self.eat(&TokenKind::Comma);
            }
        }
        self.expect(TokenKind::RightBrace)?;

        Ok(InterfaceDecl {
            name,
            extends,
            members,
        })
    }

    fn parse_member(&mut self) -> Result<Member, ParseError> {
        let start = self.peek().span.start;

        // `readonly` is only a modifier when it isn't itself the name of the
        // property, e.g. `readonly: boolean` or `readonly?: boolean`.
        let readonly = self.peek().kind == TokenKind::Readonly
            && !matches!(
                self.peek_nth(1).kind,
                TokenKind::Colon | TokenKind::Question
            );
        if readonly {
            self.next();
        }

        if self.eat(&TokenKind::LeftBracket) {
            let (key_name, _) = self.expect_prop_name()?;
            self.expect(TokenKind::Colon)?;
            let key_token = self.next();
            let key = match key_token.kind {
                TokenKind::String => IndexKey::String,
                TokenKind::Number => IndexKey::Number,
                _ => {
                    return Err(ParseError::new(
                        "An index signature parameter type must be 'string' or 'number'",
                        key_token.span,
                    ))
                }
            };
            self.expect(TokenKind::RightBracket)?;
            self.expect(TokenKind::Colon)?;
            let type_ann = self.parse_type_ann()?;

            return Ok(Member::Index(IndexSig {
                key_name,
                key,
                readonly,
                type_ann,
                span: start..self.last_end(),
            }));
        }

        let (name, _) = self.expect_prop_name()?;
        let optional = self.eat(&TokenKind::Question);
        self.expect(TokenKind::Colon)?;
        let type_ann = self.parse_type_ann()?;

        Ok(Member::Prop(PropSig {
            name,
            optional,
            readonly,
            type_ann,
            span: start..self.last_end(),
        }))
    }

    fn parse_var_decl(&mut self, declare: bool) -> Result<VarDecl, ParseError> {
        let token = self.next();
        let kind = match token.kind {
            TokenKind::Let => DeclKind::Let,
            TokenKind::Const => DeclKind::Const,
            _ => return Err(self.unexpected(&token, "'let' or 'const'")),
        };
        let (name, span) = self.expect_ident()?;
        let name = Ident { name, span };

        let type_ann = match self.eat(&TokenKind::Colon) {
            true => Some(self.parse_type_ann()?),
            false => None,
        };

        let init = match self.peek().kind {
            TokenKind::Assign => {
                let assign = self.next();
                if declare {
                    return Err(ParseError::new(
                        "Initializers are not allowed in ambient contexts",
                        assign.span,
                    ));
                }
                Some(self.parse_expr()?)
            }
            _ => None,
        };

        Ok(VarDecl {
            kind,
            declare,
            name,
            type_ann,
            init,
        })
    }

    fn parse_assign(&mut self) -> Result<Assign, ParseError> {
        let (name, span) = self.expect_ident()?;
        let object = Ident { name, span };

        let target = if self.eat(&TokenKind::Dot) {
            let (name, span) = self.expect_prop_name()?;
            AssignTarget::Member {
                object,
                prop: Ident { name, span },
            }
        } else {
            AssignTarget::Ident(object)
        };

        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr()?;

        Ok(Assign { target, value })
    }
}

pub fn parse(input: &str) -> Result<Program, ParseError> {
    let mut parser = Parser::new(input)?;
    parser.parse_program()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn interface(src: &str) -> InterfaceDecl {
        let mut program = parse(src).unwrap();
        match program.stmts.remove(0).kind {
            StmtKind::Interface(decl) => decl,
            kind => panic!("expected an interface, found {kind:?}"),
        }
    }

    #[test]
    fn parse_interface_with_modifiers() {
        let decl = interface(
            r#"
            interface SquareConfig {
                color?: string;
                readonly width: number
                readonly?: boolean,
            }
            "#,
        );
        assert_eq!(decl.name.name, "SquareConfig");
        let props: Vec<_> = decl
            .members
            .iter()
            .map(|member| match member {
                Member::Prop(prop) => (prop.name.as_str(), prop.optional, prop.readonly),
                Member::Index(_) => panic!("unexpected index signature"),
            })
            .collect();
        assert_eq!(
            props,
            vec![
                ("color", true, false),
                ("width", false, true),
                ("readonly", true, false),
            ]
        );
    }

    #[test]
    fn parse_interface_with_index_signatures() {
        let decl = interface(
            "interface Dictionary { readonly [index: number]: string; [key: string]: string; length: number }",
        );
        let Member::Index(first) = &decl.members[0] else {
            panic!("expected an index signature");
        };
        assert_eq!(first.key, IndexKey::Number);
        assert_eq!(first.key_name, "index");
        assert!(first.readonly);
        let Member::Index(second) = &decl.members[1] else {
            panic!("expected an index signature");
        };
        assert_eq!(second.key, IndexKey::String);
        assert!(!second.readonly);
        assert!(matches!(decl.members[2], Member::Prop(_)));
    }

    #[test]
    fn parse_interface_extends() {
        let decl = interface("interface Square extends Shape, PenStroke { sideLength: number }");
        let bases: Vec<_> = decl.extends.iter().map(|base| base.name.as_str()).collect();
        assert_eq!(bases, vec!["Shape", "PenStroke"]);
    }

    #[test]
    fn parse_invalid_index_key() {
        let err = parse("interface Bad { [key: boolean]: string }").unwrap_err();
        assert_eq!(err.span, 22..29);
    }

    #[test]
    fn parse_var_decls() {
        let program = parse(
            r#"
            let isDone: boolean = false;
            const user1: User = { name: "Earnest", id: 0 }
            declare const maybe: unknown;
            let point1 = { x: 12, y: 26 };
            "#,
        )
        .unwrap();
        let decls: Vec<_> = program
            .stmts
            .iter()
            .map(|stmt| match &stmt.kind {
                StmtKind::VarDecl(decl) => (
                    decl.kind,
                    decl.declare,
                    decl.name.name.as_str(),
                    decl.type_ann.is_some(),
                    decl.init.is_some(),
                ),
                kind => panic!("expected a declaration, found {kind:?}"),
            })
            .collect();
        assert_eq!(
            decls,
            vec![
                (DeclKind::Let, false, "isDone", true, true),
                (DeclKind::Const, false, "user1", true, true),
                (DeclKind::Const, true, "maybe", true, false),
                (DeclKind::Let, false, "point1", false, true),
            ]
        );
    }

    #[test]
    fn parse_declare_with_initializer_fails() {
        let err = parse("declare let x: number = 5").unwrap_err();
        assert_eq!(err.message, "Initializers are not allowed in ambient contexts");
        assert_eq!(err.span, 22..23);
    }

    #[test]
    fn parse_assignments() {
        let program = parse("color = 'red'; p1.x = 5").unwrap();
        match &program.stmts[0].kind {
            StmtKind::Assign(Assign {
                target: AssignTarget::Ident(ident),
                ..
            }) => assert_eq!(ident.name, "color"),
            kind => panic!("expected an assignment, found {kind:?}"),
        }
        match &program.stmts[1].kind {
            StmtKind::Assign(Assign {
                target: AssignTarget::Member { object, prop },
                value,
            }) => {
                assert_eq!(object.name, "p1");
                assert_eq!(prop.name, "x");
                assert_eq!(value.kind, ExprKind::Num("5".to_string()));
            }
            kind => panic!("expected an assignment, found {kind:?}"),
        }
    }

    #[test]
    fn stmt_spans_exclude_the_semicolon() {
        let program = parse("let a = 1;\nlet b = 2").unwrap();
        assert_eq!(program.stmts[0].span, 0..9);
        assert_eq!(program.stmts[1].span, 11..20);
    }

    #[test]
    fn parse_unexpected_statement() {
        let err = parse("42").unwrap_err();
        assert_eq!(err.span, 0..2);
    }
}
