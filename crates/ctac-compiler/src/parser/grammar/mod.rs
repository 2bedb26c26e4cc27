//! Recursive-descent grammar over the token stream.
//!
//! Split by construct:
//! - `declarations` - specifiers, declarators, struct/union/enum, typedefs
//! - `expressions` - precedence climbing, unary/postfix/primary
//! - `statements` - statements and block items

mod declarations;
mod expressions;
mod statements;

use std::collections::VecDeque;

use ctac_core::ScopedMap;

use super::ParseError;
use super::ast::{ExternalDecl, StaticAssert, Type};
use super::lexer::{Token, TokenKind, lex};
use super::nametab::NameTable;

/// Pull parser for one translation unit.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    /// Typedef-name / enumeration-constant classification, fed as we parse.
    names: NameTable,
    /// Aliased type of each live typedef name.
    typedefs: ScopedMap<Type>,
    /// Value of each live enumeration constant.
    enum_values: ScopedMap<i64>,
    /// Brace depth; scope stamp for the three maps above.
    depth: u32,
    anon_counter: u32,
    /// Declarations split out of a combined definition, served first.
    pending: VecDeque<ExternalDecl>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Result<Self, ParseError> {
        Ok(Self {
            source,
            tokens: lex(source)?,
            pos: 0,
            names: NameTable::new(),
            typedefs: ScopedMap::new(),
            enum_values: ScopedMap::new(),
            depth: 0,
            anon_counter: 0,
            pending: VecDeque::new(),
        })
    }

    /// Parse the next external declaration, or `None` at end of input.
    ///
    /// A definition combined with declarators, like `struct S { int x; } s;`,
    /// is split: the tag-introducing declaration is returned first and the
    /// variable declaration on the following call. Typedef declarations are
    /// consumed entirely by the parser and surface nothing.
    pub fn next_external_decl(&mut self) -> Result<Option<ExternalDecl>, ParseError> {
        loop {
            if let Some(decl) = self.pending.pop_front() {
                return Ok(Some(decl));
            }
            if self.at_end() {
                return Ok(None);
            }
            self.parse_external_declaration()?;
        }
    }

    /// Parse every remaining external declaration.
    pub fn parse_all(&mut self) -> Result<Vec<ExternalDecl>, ParseError> {
        let mut decls = Vec::new();
        while let Some(decl) = self.next_external_decl()? {
            decls.push(decl);
        }
        Ok(decls)
    }

    pub(super) fn parse_static_assert(&mut self) -> Result<StaticAssert, ParseError> {
        self.expect(TokenKind::KwStaticAssert)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_conditional_expr()?;
        let message = if self.eat(TokenKind::Comma) {
            Some(self.parse_string_literal()?)
        } else {
            None
        };
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semi)?;
        Ok(StaticAssert { condition, message })
    }

    // ------------------------------------------------------------------
    // Token-stream helpers
    // ------------------------------------------------------------------

    pub(super) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    pub(super) fn peek_nth(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    pub(super) fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    pub(super) fn advance(&mut self) -> Result<Token, ParseError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(token)
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            self.advance()
        } else {
            Err(self.unexpected(&format!("{kind:?}")))
        }
    }

    pub(super) fn text(&self, token: &Token) -> &'src str {
        &self.source[token.span.clone()]
    }

    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(token) => ParseError::UnexpectedToken {
                found: self.text(token).to_owned(),
                expected: expected.to_owned(),
            },
            None => ParseError::UnexpectedEof,
        }
    }

    pub(super) fn expect_ident(&mut self) -> Result<String, ParseError> {
        if self.at(TokenKind::Ident) {
            let token = self.advance()?;
            Ok(self.text(&token).to_owned())
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    pub(super) fn fresh_anon_tag(&mut self) -> String {
        let tag = format!("__anon{}", self.anon_counter);
        self.anon_counter += 1;
        tag
    }

    pub(super) fn open_scope(&mut self) {
        self.depth += 1;
    }

    pub(super) fn close_scope(&mut self) {
        self.depth -= 1;
        self.names.purge(self.depth);
        self.typedefs.purge(self.depth);
        self.enum_values.purge(self.depth);
    }
}
