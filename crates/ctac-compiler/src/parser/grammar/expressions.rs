//! Expression parsing: precedence climbing for binary operators, plus
//! unary, postfix, and primary expressions.

use super::Parser;
use crate::parser::ParseError;
use crate::parser::ast::{
    BinaryOp, Expr, ExprKind, GenericAssoc, Literal, UnaryOp,
};
use crate::parser::lexer::{
    TokenKind, parse_char_const, parse_float_const, parse_int_const, parse_string_lit,
};
use crate::parser::nametab::NameClass;

/// Binding power of a binary operator token; `None` for non-operators.
fn binary_precedence(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    let entry = match kind {
        TokenKind::PipePipe => (BinaryOp::Or, 1),
        TokenKind::AmpAmp => (BinaryOp::And, 2),
        TokenKind::Pipe => (BinaryOp::BitOr, 3),
        TokenKind::Caret => (BinaryOp::BitXor, 4),
        TokenKind::Amp => (BinaryOp::BitAnd, 5),
        TokenKind::EqEq => (BinaryOp::Equal, 6),
        TokenKind::Ne => (BinaryOp::NotEqual, 6),
        TokenKind::Lt => (BinaryOp::LessThan, 7),
        TokenKind::Gt => (BinaryOp::GreaterThan, 7),
        TokenKind::Le => (BinaryOp::LessOrEqual, 7),
        TokenKind::Ge => (BinaryOp::GreaterOrEqual, 7),
        TokenKind::Shl => (BinaryOp::ShiftLeft, 8),
        TokenKind::Shr => (BinaryOp::ShiftRight, 8),
        TokenKind::Plus => (BinaryOp::Add, 9),
        TokenKind::Minus => (BinaryOp::Subtract, 9),
        TokenKind::Star => (BinaryOp::Multiply, 10),
        TokenKind::Slash => (BinaryOp::Divide, 10),
        TokenKind::Percent => (BinaryOp::Remainder, 10),
        _ => return None,
    };
    Some(entry)
}

/// Compound-assignment operator lowering, e.g. `+=` to `Add`.
fn compound_assign_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::PlusEq => BinaryOp::Add,
        TokenKind::MinusEq => BinaryOp::Subtract,
        TokenKind::StarEq => BinaryOp::Multiply,
        TokenKind::SlashEq => BinaryOp::Divide,
        TokenKind::PercentEq => BinaryOp::Remainder,
        TokenKind::ShlEq => BinaryOp::ShiftLeft,
        TokenKind::ShrEq => BinaryOp::ShiftRight,
        TokenKind::AmpEq => BinaryOp::BitAnd,
        TokenKind::CaretEq => BinaryOp::BitXor,
        TokenKind::PipeEq => BinaryOp::BitOr,
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    pub(super) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment_expr()
    }

    pub(super) fn parse_assignment_expr(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_conditional_expr()?;
        match self.peek() {
            Some(TokenKind::Eq) => {
                self.advance()?;
                let rhs = self.parse_assignment_expr()?;
                Ok(Expr::new(ExprKind::Assign {
                    op: None,
                    target: Box::new(lhs),
                    value: Box::new(rhs),
                }))
            }
            Some(kind) => match compound_assign_op(kind) {
                Some(op) => {
                    self.advance()?;
                    let rhs = self.parse_assignment_expr()?;
                    Ok(Expr::new(ExprKind::Assign {
                        op: Some(op),
                        target: Box::new(lhs),
                        value: Box::new(rhs),
                    }))
                }
                None => Ok(lhs),
            },
            None => Ok(lhs),
        }
    }

    pub(super) fn parse_conditional_expr(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_binary_expr(1)?;
        if !self.eat(TokenKind::Question) {
            return Ok(condition);
        }
        let then_expr = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_conditional_expr()?;
        Ok(Expr::new(ExprKind::Conditional {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }))
    }

    fn parse_binary_expr(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_cast_expr()?;
        while let Some(kind) = self.peek() {
            let Some((op, prec)) = binary_precedence(kind) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.advance()?;
            let right = self.parse_binary_expr(prec + 1)?;
            left = Expr::new(ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_cast_expr(&mut self) -> Result<Expr, ParseError> {
        if self.at(TokenKind::LParen) && self.starts_type_at(1) {
            self.advance()?;
            let target = self.parse_type_name()?;
            self.expect(TokenKind::RParen)?;
            if self.at(TokenKind::LBrace) {
                return self.parse_compound_literal(target);
            }
            let expr = self.parse_cast_expr()?;
            return Ok(Expr::new(ExprKind::Cast {
                target,
                expr: Box::new(expr),
            }));
        }
        self.parse_unary_expr()
    }

    fn parse_compound_literal(&mut self, ty: crate::parser::ast::Type) -> Result<Expr, ParseError> {
        let init = self.parse_initializer()?;
        let items = match init.kind {
            crate::parser::ast::InitializerKind::Compound(items) => items,
            crate::parser::ast::InitializerKind::Single(_) => {
                return Err(self.unexpected("brace-enclosed initializer"));
            }
        };
        Ok(Expr::new(ExprKind::CompoundLiteral { ty, init: items }))
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some(TokenKind::PlusPlus) | Some(TokenKind::MinusMinus) => {
                // Prefix increment desugars to compound assignment.
                let kind = self.advance()?.kind;
                let op = if kind == TokenKind::PlusPlus {
                    BinaryOp::Add
                } else {
                    BinaryOp::Subtract
                };
                let target = self.parse_unary_expr()?;
                Ok(Expr::new(ExprKind::Assign {
                    op: Some(op),
                    target: Box::new(target),
                    value: Box::new(Expr::new(ExprKind::Literal(Literal::Int(1)))),
                }))
            }
            Some(TokenKind::Amp) => self.parse_prefix(UnaryOp::AddressOf),
            Some(TokenKind::Star) => self.parse_prefix(UnaryOp::Dereference),
            Some(TokenKind::Minus) => self.parse_prefix(UnaryOp::Negate),
            Some(TokenKind::Tilde) => self.parse_prefix(UnaryOp::Complement),
            Some(TokenKind::Bang) => self.parse_prefix(UnaryOp::Not),
            Some(TokenKind::Plus) => {
                // Unary plus is a no-op.
                self.advance()?;
                self.parse_cast_expr()
            }
            Some(TokenKind::KwSizeof) => {
                self.advance()?;
                if self.at(TokenKind::LParen) && self.starts_type_at(1) {
                    self.advance()?;
                    let ty = self.parse_type_name()?;
                    self.expect(TokenKind::RParen)?;
                    Ok(Expr::new(ExprKind::SizeOfType(ty)))
                } else {
                    let expr = self.parse_unary_expr()?;
                    Ok(Expr::new(ExprKind::SizeOfExpr(Box::new(expr))))
                }
            }
            Some(TokenKind::KwAlignof) => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let ty = self.parse_type_name()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::new(ExprKind::AlignOf(ty)))
            }
            Some(TokenKind::KwGeneric) => self.parse_generic(),
            _ => self.parse_postfix_expr(),
        }
    }

    fn parse_prefix(&mut self, op: UnaryOp) -> Result<Expr, ParseError> {
        self.advance()?;
        let expr = self.parse_cast_expr()?;
        Ok(Expr::new(ExprKind::Unary {
            op,
            expr: Box::new(expr),
        }))
    }

    fn parse_generic(&mut self) -> Result<Expr, ParseError> {
        self.advance()?; // _Generic
        self.expect(TokenKind::LParen)?;
        let control = self.parse_assignment_expr()?;
        let mut associations = Vec::new();
        while self.eat(TokenKind::Comma) {
            if self.eat(TokenKind::KwDefault) {
                self.expect(TokenKind::Colon)?;
                associations.push(GenericAssoc::Default(self.parse_assignment_expr()?));
            } else {
                let ty = self.parse_type_name()?;
                self.expect(TokenKind::Colon)?;
                let expr = self.parse_assignment_expr()?;
                associations.push(GenericAssoc::Type { ty, expr });
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(Expr::new(ExprKind::Generic {
            control: Box::new(control),
            associations,
        }))
    }

    fn parse_postfix_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary_expr()?;
        loop {
            match self.peek() {
                Some(TokenKind::LBracket) => {
                    self.advance()?;
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::new(ExprKind::Subscript {
                        left: Box::new(expr),
                        right: Box::new(index),
                    });
                }
                Some(TokenKind::LParen) => {
                    self.advance()?;
                    let mut args = Vec::new();
                    if !self.eat(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_assignment_expr()?);
                            if !self.eat(TokenKind::Comma) {
                                self.expect(TokenKind::RParen)?;
                                break;
                            }
                        }
                    }
                    expr = Expr::new(ExprKind::Call {
                        func: Box::new(expr),
                        args,
                    });
                }
                Some(TokenKind::Dot) => {
                    self.advance()?;
                    let field = self.expect_ident()?;
                    expr = Expr::new(ExprKind::FieldAccess {
                        expr: Box::new(expr),
                        field,
                    });
                }
                Some(TokenKind::Arrow) => {
                    self.advance()?;
                    let field = self.expect_ident()?;
                    expr = Expr::new(ExprKind::PtrAccess {
                        expr: Box::new(expr),
                        field,
                    });
                }
                Some(TokenKind::PlusPlus) => {
                    self.advance()?;
                    expr = Expr::new(ExprKind::PostIncrement(Box::new(expr)));
                }
                Some(TokenKind::MinusMinus) => {
                    self.advance()?;
                    expr = Expr::new(ExprKind::PostDecrement(Box::new(expr)));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some(TokenKind::Ident) => {
                let name = self.expect_ident()?;
                if self.names.find(&name) == Some(NameClass::EnumerationConstant) {
                    let value = self.enum_values.get(&name).copied().unwrap_or(0);
                    Ok(Expr::new(ExprKind::Literal(Literal::Enum { name, value })))
                } else {
                    Ok(Expr::new(ExprKind::Var(name)))
                }
            }
            Some(TokenKind::IntConst) => {
                let token = self.advance()?;
                let parsed = parse_int_const(self.text(&token))?;
                let literal = if parsed.is_unsigned {
                    if parsed.is_long || parsed.value > u32::MAX as u64 {
                        Literal::ULong(parsed.value)
                    } else {
                        Literal::UInt(parsed.value)
                    }
                } else if parsed.is_long || parsed.value > i32::MAX as u64 {
                    if parsed.value > i64::MAX as u64 {
                        Literal::ULong(parsed.value)
                    } else {
                        Literal::Long(parsed.value as i64)
                    }
                } else {
                    Literal::Int(parsed.value as i64)
                };
                Ok(Expr::new(ExprKind::Literal(literal)))
            }
            Some(TokenKind::FloatConst) => {
                let token = self.advance()?;
                let value = parse_float_const(self.text(&token))?;
                Ok(Expr::new(ExprKind::Literal(Literal::Float(value))))
            }
            Some(TokenKind::CharConst) => {
                let token = self.advance()?;
                let value = parse_char_const(self.text(&token))?;
                Ok(Expr::new(ExprKind::Literal(Literal::Char(value))))
            }
            Some(TokenKind::StringLit) => {
                let bytes = self.parse_string_literal()?;
                Ok(Expr::new(ExprKind::Literal(Literal::String(bytes))))
            }
            Some(TokenKind::LParen) => {
                self.advance()?;
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Parse one or more adjacent string literals, concatenated.
    pub(super) fn parse_string_literal(&mut self) -> Result<Vec<u8>, ParseError> {
        let mut bytes = Vec::new();
        let mut seen = false;
        while self.at(TokenKind::StringLit) {
            let token = self.advance()?;
            bytes.extend(parse_string_lit(self.text(&token))?);
            seen = true;
        }
        if !seen {
            return Err(self.unexpected("string literal"));
        }
        Ok(bytes)
    }
}
