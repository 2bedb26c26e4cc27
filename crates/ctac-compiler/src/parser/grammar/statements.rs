//! Statement and block-item parsing.

use super::Parser;
use crate::parser::ParseError;
use crate::parser::ast::{BlockItem, ForInit, Stmt};
use crate::parser::lexer::TokenKind;

impl Parser<'_> {
    /// Parse `{ ... }` into block items, managing the name-table scope.
    pub(super) fn parse_brace_items(&mut self) -> Result<Vec<BlockItem>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        self.open_scope();
        let mut items = Vec::new();
        while !self.eat(TokenKind::RBrace) {
            if self.starts_declaration() {
                for decl in self.parse_block_declaration()? {
                    items.push(BlockItem::Decl(decl));
                }
            } else {
                items.push(BlockItem::Stmt(self.parse_statement()?));
            }
        }
        self.close_scope();
        Ok(items)
    }

    pub(super) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            Some(TokenKind::LBrace) => Ok(Stmt::Compound(self.parse_brace_items()?)),
            Some(TokenKind::Semi) => {
                self.advance()?;
                Ok(Stmt::Empty)
            }
            Some(TokenKind::KwReturn) => {
                self.advance()?;
                let expr = if self.at(TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Return(expr))
            }
            Some(TokenKind::KwIf) => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let condition = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let then_stmt = Box::new(self.parse_statement()?);
                let else_stmt = if self.eat(TokenKind::KwElse) {
                    Some(Box::new(self.parse_statement()?))
                } else {
                    None
                };
                Ok(Stmt::If {
                    condition,
                    then_stmt,
                    else_stmt,
                })
            }
            Some(TokenKind::KwWhile) => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let condition = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.parse_statement()?);
                Ok(Stmt::While {
                    condition,
                    body,
                    label: None,
                })
            }
            Some(TokenKind::KwDo) => {
                self.advance()?;
                let body = Box::new(self.parse_statement()?);
                self.expect(TokenKind::KwWhile)?;
                self.expect(TokenKind::LParen)?;
                let condition = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::DoWhile {
                    body,
                    condition,
                    label: None,
                })
            }
            Some(TokenKind::KwFor) => self.parse_for(),
            Some(TokenKind::KwSwitch) => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let condition = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.parse_statement()?);
                Ok(Stmt::Switch {
                    condition,
                    body,
                    label: None,
                    cases: Vec::new(),
                })
            }
            Some(TokenKind::KwCase) => {
                self.advance()?;
                let expr = self.parse_conditional_expr()?;
                self.expect(TokenKind::Colon)?;
                let stmt = Box::new(self.parse_statement()?);
                Ok(Stmt::Case {
                    expr,
                    stmt,
                    label: None,
                })
            }
            Some(TokenKind::KwDefault) => {
                self.advance()?;
                self.expect(TokenKind::Colon)?;
                let stmt = Box::new(self.parse_statement()?);
                Ok(Stmt::Default { stmt, label: None })
            }
            Some(TokenKind::KwBreak) => {
                self.advance()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Break { label: None })
            }
            Some(TokenKind::KwContinue) => {
                self.advance()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Continue { label: None })
            }
            Some(TokenKind::KwGoto) => {
                self.advance()?;
                let target = self.expect_ident()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Goto(target))
            }
            Some(TokenKind::Ident) if self.peek_nth(1) == Some(TokenKind::Colon) => {
                let name = self.expect_ident()?;
                self.advance()?; // ':'
                let stmt = Box::new(self.parse_statement()?);
                Ok(Stmt::Labeled { name, stmt })
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?; // for
        self.expect(TokenKind::LParen)?;
        // The for header opens its own scope for declared names.
        self.open_scope();

        let init = if self.eat(TokenKind::Semi) {
            ForInit::Expr(None)
        } else if self.starts_declaration() {
            let mut decls = self.parse_block_declaration()?;
            if decls.len() != 1 {
                return Err(self.unexpected("simple declaration in for header"));
            }
            ForInit::Decl(decls.pop().expect("one declaration"))
        } else {
            let expr = self.parse_expr()?;
            self.expect(TokenKind::Semi)?;
            ForInit::Expr(Some(expr))
        };

        let condition = if self.at(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semi)?;

        let update = if self.at(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);
        self.close_scope();

        Ok(Stmt::For {
            init,
            condition,
            update,
            body,
            label: None,
        })
    }
}
