//! Recursive descent parser for XPIDL.
//!
//! Grammar, informally:
//!
//! ```text
//! idlfile    : production*
//! production : CDATA | INCLUDE | typedef | native | webidl | interface
//! typedef    : 'typedef' type IDENTIFIER ';'
//! native     : attributes 'native' IDENTIFIER '(' NATIVEID ')' ';'
//! webidl     : 'webidl' IDENTIFIER ';'
//! interface  : attributes 'interface' IDENTIFIER [':' IDENTIFIER]
//!              ['{' member* '}'] ';'
//! member     : CDATA | const | attribute | method
//! const      : 'const' type IDENTIFIER '=' expr ';'
//! attribute  : attributes ['readonly'] 'attribute' type IDENTIFIER ';'
//! method     : attributes type IDENTIFIER '(' paramlist ')' [raises] ';'
//! param      : attributes ('in'|'out'|'inout') type IDENTIFIER
//! type       : IDENTIFIER ['<' type (',' type)* '>']
//! ```
//!
//! An interface without a body is a forward declaration, which must carry
//! no attributes and no base. Parsing aborts at the first error.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{Location, Span, Tok, Token};

/// Collapse newline runs in raw passthrough data to single newlines.
fn collapse_newlines(data: &str) -> String {
    let mut out = String::with_capacity(data.len());
    let mut last_newline = false;
    for c in data.chars() {
        if c == '\n' {
            if !last_newline {
                out.push('\n');
            }
            last_newline = true;
        } else {
            out.push(c);
            last_newline = false;
        }
    }
    out
}

pub struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
    file: String,
}

/// Parse a whole IDL file.
pub fn parse(source: &str, file: &str) -> Result<Idl, ParseError> {
    Parser::new(source, file)?.parse()
}

impl Parser {
    pub fn new(source: &str, file: impl Into<String>) -> Result<Self, ParseError> {
        let file = file.into();
        let tokens = Lexer::new(source, file.clone()).tokenize()?;
        Ok(Parser {
            tokens,
            pos: 0,
            file,
        })
    }

    fn current(&self) -> &Tok {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Tok {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, token: &Token) -> bool {
        &self.current().token == token
    }

    fn at_eof(&self) -> bool {
        matches!(self.current().token, Token::Eof)
    }

    fn location(&self, span: Span) -> Location {
        Location::new(self.file.clone(), span)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            message: message.into(),
            location: self.location(self.current().span),
        }
    }

    fn error_at(&self, message: impl Into<String>, span: Span) -> ParseError {
        ParseError::Syntax {
            message: message.into(),
            location: self.location(span),
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<Tok, ParseError> {
        if self.at_eof() {
            return Err(ParseError::UnexpectedEof {
                file: self.file.clone(),
                expected: expected.to_owned(),
            });
        }
        if self.check(&token) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {expected}, found {}", self.current().token)))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> Result<(String, Tok), ParseError> {
        if self.at_eof() {
            return Err(ParseError::UnexpectedEof {
                file: self.file.clone(),
                expected: expected.to_owned(),
            });
        }
        match &self.current().token {
            Token::Identifier(_) => {
                let tok = self.advance();
                let name = match &tok.token {
                    Token::Identifier(name) => name.clone(),
                    _ => unreachable!(),
                };
                Ok((name, tok))
            }
            other => Err(self.error(format!("expected {expected}, found {other}"))),
        }
    }

    /// Parse the whole token stream into an [`Idl`].
    pub fn parse(&mut self) -> Result<Idl, ParseError> {
        let mut productions = Vec::new();
        while !self.at_eof() {
            productions.push(self.parse_production()?);
        }
        Ok(Idl {
            productions,
            deps: vec![self.file.clone()],
        })
    }

    fn parse_production(&mut self) -> Result<Production, ParseError> {
        match &self.current().token {
            Token::Cdata(_) => {
                let tok = self.advance();
                let data = match tok.token {
                    Token::Cdata(data) => data,
                    _ => unreachable!(),
                };
                Ok(Production::Cdata(Cdata {
                    data: collapse_newlines(&data),
                    location: self.location(tok.span),
                }))
            }
            Token::Include(_) => {
                let tok = self.advance();
                let filename = match tok.token {
                    Token::Include(filename) => filename,
                    _ => unreachable!(),
                };
                Ok(Production::Include(Include {
                    filename,
                    location: self.location(tok.span),
                }))
            }
            Token::Typedef => self.parse_typedef().map(Production::Typedef),
            Token::Webidl => self.parse_webidl().map(Production::WebIdl),
            Token::Native => self.parse_native(Vec::new()).map(Production::Native),
            Token::Interface => self.parse_interface(Vec::new(), Vec::new()),
            Token::LBracket => {
                let (attlist, docs) = self.parse_attlist()?;
                match &self.current().token {
                    Token::Native => self.parse_native(attlist).map(Production::Native),
                    Token::Interface => self.parse_interface(attlist, docs),
                    other => Err(self.error(format!(
                        "expected 'native' or 'interface' after attribute list, found {other}"
                    ))),
                }
            }
            Token::Eof => Err(ParseError::UnexpectedEof {
                file: self.file.clone(),
                expected: "a declaration".to_owned(),
            }),
            other => Err(self.error(format!("unexpected {other} at top level"))),
        }
    }

    fn parse_typedef(&mut self) -> Result<TypedefDecl, ParseError> {
        let kw = self.advance();
        let ty = self.parse_type()?;
        let (name, _) = self.expect_identifier("typedef name")?;
        self.expect(Token::Semi, "';'")?;
        Ok(TypedefDecl {
            ty,
            name,
            location: self.location(kw.span),
            doc_comments: kw.doc_comments,
        })
    }

    fn parse_webidl(&mut self) -> Result<WebIdlDecl, ParseError> {
        self.advance();
        let (name, name_tok) = self.expect_identifier("webidl interface name")?;
        self.expect(Token::Semi, "';'")?;
        Ok(WebIdlDecl {
            name,
            location: self.location(name_tok.span),
        })
    }

    fn parse_native(&mut self, attlist: Vec<Attrib>) -> Result<NativeDecl, ParseError> {
        let kw = self.advance();
        let (name, _) = self.expect_identifier("native type name")?;
        self.expect(Token::LParen, "'('")?;
        let native_name = match &self.current().token {
            Token::NativeId(_) => {
                let tok = self.advance();
                match tok.token {
                    Token::NativeId(text) => text,
                    _ => unreachable!(),
                }
            }
            other => {
                return Err(self.error(format!("expected native type text, found {other}")));
            }
        };
        self.expect(Token::RParen, "')'")?;
        self.expect(Token::Semi, "';'")?;
        Ok(NativeDecl {
            name,
            native_name,
            attlist,
            location: self.location(kw.span),
        })
    }

    fn parse_interface(
        &mut self,
        attlist: Vec<Attrib>,
        mut doc_comments: Vec<String>,
    ) -> Result<Production, ParseError> {
        let kw = self.advance();
        doc_comments.extend(kw.doc_comments.iter().cloned());
        let (name, _) = self.expect_identifier("interface name")?;
        let location = self.location(kw.span);

        let base = if self.check(&Token::Colon) {
            self.advance();
            let (base, _) = self.expect_identifier("base interface name")?;
            Some(base)
        } else {
            None
        };

        if self.check(&Token::LBrace) {
            self.advance();
            let mut members = Vec::new();
            while !self.check(&Token::RBrace) {
                if self.at_eof() {
                    return Err(ParseError::UnexpectedEof {
                        file: self.file.clone(),
                        expected: "'}'".to_owned(),
                    });
                }
                members.push(self.parse_member()?);
            }
            self.advance();
            self.expect(Token::Semi, "';'")?;
            Ok(Production::Interface(InterfaceDecl {
                name,
                attlist,
                base,
                members,
                location,
                doc_comments,
            }))
        } else {
            self.expect(Token::Semi, "';'")?;
            if let Some(attr) = attlist.first() {
                return Err(ParseError::Syntax {
                    message: "forward-declared interface must not have attributes".to_owned(),
                    location: attr.location.clone(),
                });
            }
            if base.is_some() {
                return Err(ParseError::Syntax {
                    message: "forward-declared interface must not have a base".to_owned(),
                    location,
                });
            }
            Ok(Production::Forward(ForwardDecl {
                name,
                location,
                doc_comments,
            }))
        }
    }

    /// Parse a bracketed attribute list, returning the entries and the doc
    /// comments attached to the opening bracket.
    fn parse_attlist(&mut self) -> Result<(Vec<Attrib>, Vec<String>), ParseError> {
        let open = self.advance();
        let mut attlist = Vec::new();
        loop {
            attlist.push(self.parse_attrib()?);
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::RBracket, "']'")?;
        Ok((attlist, open.doc_comments))
    }

    fn parse_attrib(&mut self) -> Result<Attrib, ParseError> {
        // `const` doubles as an attribute name (e.g. in native decls).
        let (name, span) = match &self.current().token {
            Token::Identifier(name) => {
                let name = name.clone();
                let tok = self.advance();
                (name, tok.span)
            }
            Token::Const => {
                let tok = self.advance();
                ("const".to_owned(), tok.span)
            }
            other => {
                return Err(self.error(format!("expected attribute name, found {other}")));
            }
        };
        let value = if self.check(&Token::LParen) {
            self.advance();
            let value = match &self.current().token {
                Token::Identifier(v) | Token::Iid(v) => v.clone(),
                other => {
                    return Err(
                        self.error(format!("expected attribute value, found {other}"))
                    );
                }
            };
            self.advance();
            self.expect(Token::RParen, "')'")?;
            Some(value)
        } else {
            None
        };
        Ok(Attrib {
            name,
            value,
            location: self.location(span),
        })
    }

    fn parse_member(&mut self) -> Result<Member, ParseError> {
        match &self.current().token {
            Token::Cdata(_) => {
                let tok = self.advance();
                let data = match tok.token {
                    Token::Cdata(data) => data,
                    _ => unreachable!(),
                };
                Ok(Member::Cdata(Cdata {
                    data: collapse_newlines(&data),
                    location: self.location(tok.span),
                }))
            }
            Token::Const => self.parse_const_member().map(Member::Const),
            Token::LBracket => {
                let (attlist, docs) = self.parse_attlist()?;
                self.parse_attr_or_method(attlist, docs)
            }
            Token::ReadOnly | Token::Attribute | Token::Identifier(_) => {
                self.parse_attr_or_method(Vec::new(), Vec::new())
            }
            other => Err(self.error(format!("unexpected {other} in interface body"))),
        }
    }

    fn parse_const_member(&mut self) -> Result<ConstMemberDecl, ParseError> {
        let kw = self.advance();
        let ty = self.parse_type()?;
        let (name, _) = self.expect_identifier("constant name")?;
        self.expect(Token::Equals, "'='")?;
        let value = self.parse_expr(0)?;
        self.expect(Token::Semi, "';'")?;
        Ok(ConstMemberDecl {
            ty,
            name,
            value,
            location: self.location(kw.span),
            doc_comments: kw.doc_comments,
        })
    }

    fn parse_attr_or_method(
        &mut self,
        attlist: Vec<Attrib>,
        docs: Vec<String>,
    ) -> Result<Member, ParseError> {
        let readonly_tok = if self.check(&Token::ReadOnly) {
            Some(self.advance())
        } else {
            None
        };
        if self.check(&Token::Attribute) || readonly_tok.is_some() {
            let kw = self.expect(Token::Attribute, "'attribute'")?;
            // Doc comments come from the earliest introducer present.
            let doc_comments = if !docs.is_empty() {
                docs
            } else if let Some(ro) = &readonly_tok {
                ro.doc_comments.clone()
            } else {
                kw.doc_comments.clone()
            };
            let ty = self.parse_type()?;
            let (name, _) = self.expect_identifier("attribute name")?;
            self.expect(Token::Semi, "';'")?;
            return Ok(Member::Attribute(AttributeDecl {
                ty,
                name,
                attlist,
                readonly: readonly_tok.is_some(),
                location: self.location(kw.span),
                doc_comments,
            }));
        }

        let type_tok = self.current().clone();
        let ty = self.parse_type()?;
        let doc_comments = if !docs.is_empty() {
            docs
        } else {
            type_tok.doc_comments
        };
        let (name, name_tok) = self.expect_identifier("method name")?;
        self.expect(Token::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                params.push(self.parse_param()?);
                if self.check(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "')'")?;
        let raises = self.parse_raises()?;
        self.expect(Token::Semi, "';'")?;
        Ok(Member::Method(MethodDecl {
            ty,
            name,
            attlist,
            params,
            raises,
            location: self.location(name_tok.span),
            doc_comments,
        }))
    }

    fn parse_param(&mut self) -> Result<ParamDecl, ParseError> {
        let attlist = if self.check(&Token::LBracket) {
            self.parse_attlist()?.0
        } else {
            Vec::new()
        };
        let direction = match &self.current().token {
            Token::In => Direction::In,
            Token::Out => Direction::Out,
            Token::InOut => Direction::InOut,
            other => {
                return Err(self.error(format!(
                    "expected parameter direction ('in', 'out' or 'inout'), found {other}"
                )));
            }
        };
        self.advance();
        let type_span = self.current().span;
        let ty = self.parse_type()?;
        let (name, _) = self.expect_identifier("parameter name")?;
        Ok(ParamDecl {
            direction,
            ty,
            name,
            attlist,
            location: self.location(type_span),
        })
    }

    fn parse_raises(&mut self) -> Result<Vec<String>, ParseError> {
        if !self.check(&Token::Raises) {
            return Ok(Vec::new());
        }
        self.advance();
        self.expect(Token::LParen, "'('")?;
        let mut ids = Vec::new();
        loop {
            let (id, _) = self.expect_identifier("exception name")?;
            ids.push(id);
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::RParen, "')'")?;
        Ok(ids)
    }

    fn parse_type(&mut self) -> Result<TypeId, ParseError> {
        let (name, _) = self.expect_identifier("type name")?;
        let mut params = Vec::new();
        if self.check(&Token::Less) {
            self.advance();
            loop {
                params.push(self.parse_type()?);
                if self.check(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
            // `>>` closes two nested template lists.
            if self.check(&Token::Shr) {
                self.tokens[self.pos].token = Token::Greater;
                self.tokens[self.pos].span.start += 1;
            } else {
                self.expect(Token::Greater, "'>'")?;
            }
        }
        Ok(TypeId { name, params })
    }

    // Constant expressions, precedence climbing. `|` binds loosest, then
    // shifts, then additive, then `*`; unary minus binds tightest.
    fn parse_expr(&mut self, min_prec: u8) -> Result<ConstExpr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let (op, prec) = match &self.current().token {
                Token::Pipe => (BinOp::Or, 1),
                Token::Shl => (BinOp::Shl, 2),
                Token::Shr => (BinOp::Shr, 2),
                Token::Plus => (BinOp::Add, 3),
                Token::Minus => (BinOp::Sub, 3),
                Token::Star => (BinOp::Mul, 4),
                _ => break,
            };
            if prec < min_prec {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(prec + 1)?;
            lhs = ConstExpr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<ConstExpr, ParseError> {
        match &self.current().token {
            Token::Minus => {
                self.advance();
                Ok(ConstExpr::Neg(Box::new(self.parse_unary()?)))
            }
            Token::LParen => {
                self.advance();
                let expr = self.parse_expr(0)?;
                self.expect(Token::RParen, "')'")?;
                Ok(expr)
            }
            Token::Number(text) => {
                let text = text.clone();
                let span = self.current().span;
                let value = text
                    .parse::<u64>()
                    .map_err(|_| self.error_at(format!("integer literal '{text}' out of range"), span))?;
                self.advance();
                Ok(ConstExpr::Literal(value as i64))
            }
            Token::HexNum(text) => {
                let text = text.clone();
                let span = self.current().span;
                let value = u64::from_str_radix(&text[2..], 16)
                    .map_err(|_| self.error_at(format!("integer literal '{text}' out of range"), span))?;
                self.advance();
                Ok(ConstExpr::Literal(value as i64))
            }
            Token::Identifier(name) => {
                let name = name.clone();
                let tok = self.advance();
                Ok(ConstExpr::Name(name, self.location(tok.span)))
            }
            Token::Eof => Err(ParseError::UnexpectedEof {
                file: self.file.clone(),
                expected: "a constant expression".to_owned(),
            }),
            other => Err(self.error(format!("expected constant expression, found {other}"))),
        }
    }
}
