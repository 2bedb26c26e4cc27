//! Type checking: annotates every expression with a type, materializes
//! implicit conversions as cast nodes, and registers file-scope variables
//! and function signatures in the symbol table.
//!
//! The checker consumes AST nodes and returns the rewritten versions, so
//! cast insertion is a plain wrap instead of in-place surgery.

use indexmap::IndexSet;

use super::SemanticError;
use super::static_init::{is_zero_int, to_static_init};
use super::symbol_table::{InitState, SymbolKind, SymbolTable};
use super::type_table::TypeTable;
use super::types::{
    common_type, compute_layout, is_arithmetic, is_character, is_complete, is_complete_pointer,
    is_integer, is_pointer, is_scalar, same_kind,
};
use crate::parser::ast::{
    BinaryOp, BlockItem, Declaration, EmptyDecl, Expr, ExprKind, ExternalDecl, ForInit,
    FunctionDecl, InitDeclarator, InitItem, Initializer, InitializerKind, Literal, Param, Stmt,
    StorageClass, Type, UnaryOp, VarDecl,
};

/// Type-check one external declaration, returning the annotated AST.
pub fn typecheck(
    decl: ExternalDecl,
    symbols: &mut SymbolTable,
    types: &mut TypeTable,
) -> Result<ExternalDecl, SemanticError> {
    let mut checker = TypeChecker { symbols, types };
    checker.check_external(decl)
}

/// Whether an expression designates a storage location.
///
/// The binary-operator clause mirrors the reference behavior exactly:
/// `(a op b)` counts as an lvalue when `op` is not a logical connective
/// and `a` is an lvalue.
pub fn is_lvalue(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Var(_) | ExprKind::FieldAccess { .. } | ExprKind::PtrAccess { .. } => true,
        ExprKind::Binary { op, left, .. } => {
            if matches!(op, BinaryOp::And | BinaryOp::Or) {
                return false;
            }
            is_lvalue(left)
        }
        ExprKind::Unary { op, .. } => *op == UnaryOp::Dereference,
        _ => false,
    }
}

/// True for an integer-literal zero, the null pointer constant.
pub fn is_null_pointer_constant(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Literal(lit) => is_zero_int(lit),
        _ => false,
    }
}

pub struct TypeChecker<'a> {
    symbols: &'a mut SymbolTable,
    types: &'a mut TypeTable,
}

impl TypeChecker<'_> {
    pub fn check_external(&mut self, decl: ExternalDecl) -> Result<ExternalDecl, SemanticError> {
        match decl {
            ExternalDecl::Function(fd) => Ok(ExternalDecl::Function(self.check_fn_decl(fd)?)),
            ExternalDecl::Declaration(Declaration::Var(var)) => Ok(ExternalDecl::Declaration(
                Declaration::Var(self.check_file_scope_var_decl(var)?),
            )),
            // Tag declarations were laid out by the resolver; static asserts
            // were evaluated there too.
            other => Ok(other),
        }
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn validate_type(&self, ty: &Type) -> Result<(), SemanticError> {
        match ty {
            Type::Array { element, .. } => {
                if !is_complete(element, self.types) {
                    return Err(SemanticError::IncompleteArrayElement);
                }
                self.validate_type(element)
            }
            Type::Pointer { target, .. } => self.validate_type(target),
            Type::Function { return_type, params, .. } => {
                self.validate_type(return_type)?;
                for param in params {
                    self.validate_type(&param.ty)?;
                }
                Ok(())
            }
            Type::Void
            | Type::Char
            | Type::SChar
            | Type::UChar
            | Type::Short
            | Type::Int
            | Type::UInt
            | Type::Long
            | Type::ULong
            | Type::Float
            | Type::Double
            | Type::Bool
            | Type::Struct { .. }
            | Type::Union { .. } => Ok(()),
            other => Err(SemanticError::UnsupportedType(other.to_string())),
        }
    }

    // ------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------

    /// Wrap `expr` in a cast to `target` unless the kinds already match.
    fn convert_to(&self, expr: Expr, target: &Type) -> Expr {
        if same_kind(expr.ty(), target) {
            return expr;
        }
        Expr::typed(
            ExprKind::Cast {
                target: target.clone(),
                expr: Box::new(expr),
            },
            target.clone(),
        )
    }

    /// The conversions permitted in assignment contexts.
    fn convert_by_assignment(&self, expr: Expr, target: &Type) -> Result<Expr, SemanticError> {
        if same_kind(expr.ty(), target) {
            return Ok(expr);
        }
        if is_arithmetic(expr.ty()) && is_arithmetic(target) {
            return Ok(self.convert_to(expr, target));
        }
        if is_null_pointer_constant(&expr) && is_pointer(target) {
            return Ok(self.convert_to(expr, target));
        }
        let void_star_involved = matches!(
            (expr.ty(), target),
            (Type::Pointer { target: a, .. }, Type::Pointer { .. }) if matches!(a.as_ref(), Type::Void)
        ) || matches!(
            (expr.ty(), target),
            (Type::Pointer { .. }, Type::Pointer { target: b, .. }) if matches!(b.as_ref(), Type::Void)
        );
        if void_star_involved {
            return Ok(self.convert_to(expr, target));
        }
        Err(SemanticError::AssignmentConversion)
    }

    /// Common type of two pointer-ish operands in comparisons and `?:`.
    fn common_pointer_type(&self, e1: &Expr, e2: &Expr) -> Result<Type, SemanticError> {
        let (t1, t2) = (e1.ty(), e2.ty());
        if is_pointer(t1) && is_pointer(t2) && same_kind(t1, t2) {
            return Ok(t1.clone());
        }
        if is_null_pointer_constant(e1) {
            return Ok(t2.clone());
        }
        if is_null_pointer_constant(e2) {
            return Ok(t1.clone());
        }
        let points_to_void = |t: &Type| {
            matches!(t, Type::Pointer { target, .. } if matches!(target.as_ref(), Type::Void))
        };
        if points_to_void(t1) || points_to_void(t2) {
            return Ok(Type::Pointer {
                target: Box::new(Type::Void),
                qualifiers: Default::default(),
            });
        }
        Err(SemanticError::IncompatiblePointers)
    }

    /// Type-check, then apply array-to-pointer decay in place.
    fn check_and_convert(&mut self, expr: Expr) -> Result<Expr, SemanticError> {
        let mut typed = self.check_expr(expr)?;
        if matches!(typed.ty(), Type::Struct { .. } | Type::Union { .. })
            && !is_complete(typed.ty(), self.types)
        {
            return Err(SemanticError::IncompleteStructExpr);
        }
        if let Type::Array { element, .. } = typed.ty() {
            typed.ty = Some(Type::Pointer {
                target: element.clone(),
                qualifiers: Default::default(),
            });
        }
        Ok(typed)
    }

    fn check_scalar(&mut self, expr: Expr) -> Result<Expr, SemanticError> {
        let typed = self.check_and_convert(expr)?;
        if !is_scalar(typed.ty()) {
            return Err(SemanticError::ScalarRequired);
        }
        Ok(typed)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn check_expr(&mut self, expr: Expr) -> Result<Expr, SemanticError> {
        match expr.kind {
            ExprKind::Var(name) => {
                let symbol = self.symbols.get(&name)?;
                let ty = symbol
                    .ty
                    .clone()
                    .ok_or_else(|| SemanticError::UndeclaredVariable(name.clone()))?;
                if matches!(ty, Type::Function { .. }) {
                    return Err(SemanticError::FunctionAsVariable);
                }
                Ok(Expr::typed(ExprKind::Var(name), ty))
            }
            ExprKind::Literal(lit) => self.check_literal(lit),
            ExprKind::Cast { target, expr } => {
                self.validate_type(&target)?;
                let inner = self.check_and_convert(*expr)?;
                let pointer_double = (matches!(target, Type::Double) && is_pointer(inner.ty()))
                    || (is_pointer(&target) && matches!(inner.ty(), Type::Double));
                if pointer_double {
                    return Err(SemanticError::CastBetweenPointerAndDouble);
                }
                if !matches!(target, Type::Void)
                    && (!is_scalar(&target) || !is_scalar(inner.ty()))
                {
                    return Err(SemanticError::CastNonScalar);
                }
                Ok(Expr::typed(
                    ExprKind::Cast {
                        target: target.clone(),
                        expr: Box::new(inner),
                    },
                    target,
                ))
            }
            ExprKind::Unary { op, expr } => self.check_unary(op, *expr),
            ExprKind::Binary { op, left, right } => self.check_binary(op, *left, *right),
            ExprKind::Assign { op, target, value } => self.check_assign(op, *target, *value),
            ExprKind::Conditional { condition, then_expr, else_expr } => {
                self.check_conditional(*condition, *then_expr, *else_expr)
            }
            ExprKind::Call { func, args } => self.check_call(*func, args),
            ExprKind::Subscript { left, right } => self.check_subscript(*left, *right),
            ExprKind::SizeOfExpr(inner) => {
                // No array decay: sizeof sees the array type itself.
                let typed = self.check_expr(*inner)?;
                if !is_complete(typed.ty(), self.types) {
                    return Err(SemanticError::SizeofIncomplete);
                }
                Ok(Expr::typed(
                    ExprKind::SizeOfExpr(Box::new(typed)),
                    Type::ULong,
                ))
            }
            ExprKind::SizeOfType(ty) => {
                self.validate_type(&ty)?;
                if !is_complete(&ty, self.types) {
                    return Err(SemanticError::SizeofIncomplete);
                }
                Ok(Expr::typed(ExprKind::SizeOfType(ty), Type::ULong))
            }
            ExprKind::AlignOf(ty) => {
                self.validate_type(&ty)?;
                if !is_complete(&ty, self.types) {
                    return Err(SemanticError::SizeofIncomplete);
                }
                Ok(Expr::typed(ExprKind::AlignOf(ty), Type::ULong))
            }
            ExprKind::FieldAccess { expr, field } => {
                let inner = self.check_and_convert(*expr)?;
                let tag = match inner.ty() {
                    Type::Struct { tag, .. } | Type::Union { tag, .. } => tag.clone(),
                    _ => return Err(SemanticError::DotOnNonStruct),
                };
                let entry = self.types.find(&tag)?;
                let member = entry
                    .field(&field)
                    .ok_or_else(|| SemanticError::NoSuchMember {
                        tag: tag.clone(),
                        member: field.clone(),
                    })?;
                let ty = member.ty.clone();
                Ok(Expr::typed(
                    ExprKind::FieldAccess {
                        expr: Box::new(inner),
                        field,
                    },
                    ty,
                ))
            }
            ExprKind::PtrAccess { expr, field } => {
                let inner = self.check_and_convert(*expr)?;
                let tag = match inner.ty() {
                    Type::Pointer { target, .. } => match target.as_ref() {
                        Type::Struct { tag, .. } | Type::Union { tag, .. } => tag.clone(),
                        _ => return Err(SemanticError::ArrowOnNonStructPtr),
                    },
                    _ => return Err(SemanticError::ArrowOnNonStructPtr),
                };
                let entry = self.types.find(&tag)?;
                let member = entry
                    .field(&field)
                    .ok_or_else(|| SemanticError::NoSuchMember {
                        tag: tag.clone(),
                        member: field.clone(),
                    })?;
                let ty = member.ty.clone();
                Ok(Expr::typed(
                    ExprKind::PtrAccess {
                        expr: Box::new(inner),
                        field,
                    },
                    ty,
                ))
            }
            ExprKind::PostIncrement(inner) => {
                let typed = self.check_postfix_step(*inner)?;
                let ty = typed.ty().clone();
                Ok(Expr::typed(ExprKind::PostIncrement(Box::new(typed)), ty))
            }
            ExprKind::PostDecrement(inner) => {
                let typed = self.check_postfix_step(*inner)?;
                let ty = typed.ty().clone();
                Ok(Expr::typed(ExprKind::PostDecrement(Box::new(typed)), ty))
            }
            ExprKind::CompoundLiteral { .. } => Err(SemanticError::Unsupported("compound literals")),
            ExprKind::Generic { .. } => Err(SemanticError::Unsupported("_Generic expressions")),
        }
    }

    fn check_literal(&mut self, lit: Literal) -> Result<Expr, SemanticError> {
        let ty = match &lit {
            Literal::Int(_) => Type::Int,
            Literal::UInt(_) => Type::UInt,
            Literal::Long(_) => Type::Long,
            Literal::ULong(_) => Type::ULong,
            Literal::Char(_) => Type::Char,
            Literal::Float(_) => Type::Double,
            Literal::Enum { .. } => Type::Int,
            Literal::String(bytes) => Type::Array {
                element: Box::new(Type::Char),
                size: Some(Box::new(Expr::new(ExprKind::Literal(Literal::Int(
                    bytes.len() as i64 + 1,
                ))))),
                qualifiers: Default::default(),
                is_static: false,
            },
        };
        Ok(Expr::typed(ExprKind::Literal(lit), ty))
    }

    fn check_unary(&mut self, op: UnaryOp, inner: Expr) -> Result<Expr, SemanticError> {
        match op {
            UnaryOp::Not => {
                let typed = self.check_scalar(inner)?;
                Ok(Expr::typed(
                    ExprKind::Unary {
                        op,
                        expr: Box::new(typed),
                    },
                    Type::Int,
                ))
            }
            UnaryOp::Complement => {
                let mut typed = self.check_and_convert(inner)?;
                if !is_integer(typed.ty()) {
                    return Err(SemanticError::ComplementNonInteger);
                }
                if is_character(typed.ty()) {
                    typed = self.convert_to(typed, &Type::Int);
                }
                let ty = typed.ty().clone();
                Ok(Expr::typed(
                    ExprKind::Unary {
                        op,
                        expr: Box::new(typed),
                    },
                    ty,
                ))
            }
            UnaryOp::Negate => {
                let mut typed = self.check_and_convert(inner)?;
                if !is_arithmetic(typed.ty()) {
                    return Err(SemanticError::ArithmeticOnly("negate"));
                }
                if is_character(typed.ty()) {
                    typed = self.convert_to(typed, &Type::Int);
                }
                let ty = typed.ty().clone();
                Ok(Expr::typed(
                    ExprKind::Unary {
                        op,
                        expr: Box::new(typed),
                    },
                    ty,
                ))
            }
            UnaryOp::Dereference => {
                let typed = self.check_and_convert(inner)?;
                let Type::Pointer { target, .. } = typed.ty() else {
                    return Err(SemanticError::DerefNonPointer);
                };
                if matches!(target.as_ref(), Type::Void) {
                    return Err(SemanticError::DerefVoidPointer);
                }
                let ty = target.as_ref().clone();
                Ok(Expr::typed(
                    ExprKind::Unary {
                        op,
                        expr: Box::new(typed),
                    },
                    ty,
                ))
            }
            UnaryOp::AddressOf => {
                let typed = self.check_expr(inner)?;
                if !is_lvalue(&typed) {
                    return Err(SemanticError::AddressOfNonLvalue);
                }
                let ty = Type::Pointer {
                    target: Box::new(typed.ty().clone()),
                    qualifiers: Default::default(),
                };
                Ok(Expr::typed(
                    ExprKind::Unary {
                        op,
                        expr: Box::new(typed),
                    },
                    ty,
                ))
            }
        }
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        left: Expr,
        right: Expr,
    ) -> Result<Expr, SemanticError> {
        match op {
            BinaryOp::And | BinaryOp::Or => {
                let e1 = self.check_scalar(left)?;
                let e2 = self.check_scalar(right)?;
                Ok(binary(op, e1, e2, Type::Int))
            }
            BinaryOp::Add => {
                let e1 = self.check_and_convert(left)?;
                let e2 = self.check_and_convert(right)?;
                if is_arithmetic(e1.ty()) && is_arithmetic(e2.ty()) {
                    let common = common_type(e1.ty(), e2.ty())?;
                    let e1 = self.convert_to(e1, &common);
                    let e2 = self.convert_to(e2, &common);
                    Ok(binary(op, e1, e2, common))
                } else if is_complete_pointer(e1.ty(), self.types) && is_integer(e2.ty()) {
                    let ty = e1.ty().clone();
                    let e2 = self.convert_to(e2, &Type::Long);
                    Ok(binary(op, e1, e2, ty))
                } else if is_complete_pointer(e2.ty(), self.types) && is_integer(e1.ty()) {
                    let ty = e2.ty().clone();
                    let e1 = self.convert_to(e1, &Type::Long);
                    Ok(binary(op, e1, e2, ty))
                } else {
                    Err(SemanticError::InvalidOperands("addition"))
                }
            }
            BinaryOp::Subtract => {
                let e1 = self.check_and_convert(left)?;
                let e2 = self.check_and_convert(right)?;
                if is_arithmetic(e1.ty()) && is_arithmetic(e2.ty()) {
                    let common = common_type(e1.ty(), e2.ty())?;
                    let e1 = self.convert_to(e1, &common);
                    let e2 = self.convert_to(e2, &common);
                    Ok(binary(op, e1, e2, common))
                } else if is_complete_pointer(e1.ty(), self.types) && is_integer(e2.ty()) {
                    let ty = e1.ty().clone();
                    let e2 = self.convert_to(e2, &Type::Long);
                    Ok(binary(op, e1, e2, ty))
                } else if is_complete_pointer(e1.ty(), self.types) && same_kind(e1.ty(), e2.ty()) {
                    Ok(binary(op, e1, e2, Type::Long))
                } else {
                    Err(SemanticError::InvalidOperands("subtraction"))
                }
            }
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Remainder => {
                let e1 = self.check_and_convert(left)?;
                let e2 = self.check_and_convert(right)?;
                if !is_arithmetic(e1.ty()) || !is_arithmetic(e2.ty()) {
                    return Err(SemanticError::ArithmeticOnly("multiply"));
                }
                let common = common_type(e1.ty(), e2.ty())?;
                if op == BinaryOp::Remainder && matches!(common, Type::Double) {
                    return Err(SemanticError::RemainderOnDouble);
                }
                let e1 = self.convert_to(e1, &common);
                let e2 = self.convert_to(e2, &common);
                Ok(binary(op, e1, e2, common))
            }
            BinaryOp::Equal | BinaryOp::NotEqual => {
                let e1 = self.check_and_convert(left)?;
                let e2 = self.check_and_convert(right)?;
                let common = if is_pointer(e1.ty()) || is_pointer(e2.ty()) {
                    self.common_pointer_type(&e1, &e2)?
                } else {
                    common_type(e1.ty(), e2.ty())?
                };
                let e1 = self.convert_to(e1, &common);
                let e2 = self.convert_to(e2, &common);
                Ok(binary(op, e1, e2, Type::Int))
            }
            BinaryOp::LessThan
            | BinaryOp::GreaterThan
            | BinaryOp::LessOrEqual
            | BinaryOp::GreaterOrEqual => {
                let e1 = self.check_and_convert(left)?;
                let e2 = self.check_and_convert(right)?;
                let common = if is_arithmetic(e1.ty()) && is_arithmetic(e2.ty()) {
                    common_type(e1.ty(), e2.ty())?
                } else if std::mem::discriminant(e1.ty()) == std::mem::discriminant(e2.ty()) {
                    e1.ty().clone()
                } else {
                    return Err(SemanticError::InvalidComparison);
                };
                let e1 = self.convert_to(e1, &common);
                let e2 = self.convert_to(e2, &common);
                Ok(binary(op, e1, e2, Type::Int))
            }
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
                let e1 = self.check_and_convert(left)?;
                let e2 = self.check_and_convert(right)?;
                if !is_integer(e1.ty()) || !is_integer(e2.ty()) {
                    return Err(SemanticError::InvalidOperands("bitwise operation"));
                }
                let common = common_type(e1.ty(), e2.ty())?;
                let e1 = self.convert_to(e1, &common);
                let e2 = self.convert_to(e2, &common);
                Ok(binary(op, e1, e2, common))
            }
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight => {
                let mut e1 = self.check_and_convert(left)?;
                let mut e2 = self.check_and_convert(right)?;
                if !is_integer(e1.ty()) || !is_integer(e2.ty()) {
                    return Err(SemanticError::InvalidOperands("shift"));
                }
                if is_character(e1.ty()) {
                    e1 = self.convert_to(e1, &Type::Int);
                }
                if is_character(e2.ty()) {
                    e2 = self.convert_to(e2, &Type::Int);
                }
                // The result type is the promoted left operand; the right
                // operand is not brought to a common type.
                let ty = e1.ty().clone();
                Ok(binary(op, e1, e2, ty))
            }
        }
    }

    fn check_assign(
        &mut self,
        op: Option<BinaryOp>,
        target: Expr,
        value: Expr,
    ) -> Result<Expr, SemanticError> {
        let lhs = self.check_and_convert(target)?;
        if !is_lvalue(&lhs) {
            return Err(SemanticError::InvalidLvalue);
        }
        let rhs = self.check_and_convert(value)?;

        let Some(op) = op else {
            let rhs = self.convert_by_assignment(rhs, lhs.ty())?;
            let ty = lhs.ty().clone();
            return Ok(Expr::typed(
                ExprKind::Assign {
                    op: None,
                    target: Box::new(lhs),
                    value: Box::new(rhs),
                },
                ty,
            ));
        };

        // Compound assignment: the operation is typed like the binary
        // operator, then the result converts back to the target's type.
        let ty = lhs.ty().clone();
        let rhs = match op {
            BinaryOp::Add | BinaryOp::Subtract
                if is_complete_pointer(lhs.ty(), self.types) && is_integer(rhs.ty()) =>
            {
                self.convert_to(rhs, &Type::Long)
            }
            BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide
            | BinaryOp::Remainder => {
                if !is_arithmetic(lhs.ty()) || !is_arithmetic(rhs.ty()) {
                    return Err(SemanticError::ArithmeticOnly("multiply"));
                }
                let common = common_type(lhs.ty(), rhs.ty())?;
                if op == BinaryOp::Remainder && matches!(common, Type::Double) {
                    return Err(SemanticError::RemainderOnDouble);
                }
                self.convert_to(rhs, &common)
            }
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
                if !is_integer(lhs.ty()) || !is_integer(rhs.ty()) {
                    return Err(SemanticError::InvalidOperands("bitwise operation"));
                }
                let common = common_type(lhs.ty(), rhs.ty())?;
                self.convert_to(rhs, &common)
            }
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight => {
                if !is_integer(lhs.ty()) || !is_integer(rhs.ty()) {
                    return Err(SemanticError::InvalidOperands("shift"));
                }
                if is_character(rhs.ty()) {
                    self.convert_to(rhs, &Type::Int)
                } else {
                    rhs
                }
            }
            BinaryOp::And | BinaryOp::Or
            | BinaryOp::Equal | BinaryOp::NotEqual
            | BinaryOp::LessThan | BinaryOp::GreaterThan
            | BinaryOp::LessOrEqual | BinaryOp::GreaterOrEqual => {
                return Err(SemanticError::InvalidOperands("compound assignment"));
            }
        };
        Ok(Expr::typed(
            ExprKind::Assign {
                op: Some(op),
                target: Box::new(lhs),
                value: Box::new(rhs),
            },
            ty,
        ))
    }

    fn check_conditional(
        &mut self,
        condition: Expr,
        then_expr: Expr,
        else_expr: Expr,
    ) -> Result<Expr, SemanticError> {
        let condition = self.check_scalar(condition)?;
        let then_expr = self.check_and_convert(then_expr)?;
        let else_expr = self.check_and_convert(else_expr)?;

        let result_type = if matches!(then_expr.ty(), Type::Void)
            && matches!(else_expr.ty(), Type::Void)
        {
            Type::Void
        } else if is_pointer(then_expr.ty()) || is_pointer(else_expr.ty()) {
            self.common_pointer_type(&then_expr, &else_expr)?
        } else if is_arithmetic(then_expr.ty()) && is_arithmetic(else_expr.ty()) {
            common_type(then_expr.ty(), else_expr.ty())?
        } else if std::mem::discriminant(then_expr.ty())
            == std::mem::discriminant(else_expr.ty())
        {
            then_expr.ty().clone()
        } else {
            return Err(SemanticError::InvalidOperands("conditional"));
        };

        let then_expr = self.convert_to(then_expr, &result_type);
        let else_expr = self.convert_to(else_expr, &result_type);
        Ok(Expr::typed(
            ExprKind::Conditional {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            result_type,
        ))
    }

    fn check_call(&mut self, func: Expr, args: Vec<Expr>) -> Result<Expr, SemanticError> {
        let ExprKind::Var(name) = &func.kind else {
            return Err(SemanticError::CallNotVariable);
        };
        let symbol = self.symbols.get(name)?;
        let Some(Type::Function { return_type, params, .. }) = &symbol.ty else {
            return Err(SemanticError::VariableAsFunction);
        };
        let return_type = return_type.as_ref().clone();
        let param_types: Vec<Type> = params.iter().map(|p| p.ty.clone()).collect();
        if param_types.len() != args.len() {
            return Err(SemanticError::WrongArgCount);
        }

        let mut converted = Vec::with_capacity(args.len());
        for (arg, param_ty) in args.into_iter().zip(&param_types) {
            let arg = self.check_and_convert(arg)?;
            converted.push(self.convert_by_assignment(arg, param_ty)?);
        }
        Ok(Expr::typed(
            ExprKind::Call {
                func: Box::new(Expr::typed(
                    func.kind,
                    Type::Function {
                        return_type: Box::new(return_type.clone()),
                        params: param_types
                            .into_iter()
                            .map(|ty| Param { name: None, ty })
                            .collect(),
                        variadic: false,
                    },
                )),
                args: converted,
            },
            return_type,
        ))
    }

    fn check_subscript(&mut self, left: Expr, right: Expr) -> Result<Expr, SemanticError> {
        let mut ptr = self.check_and_convert(left)?;
        let mut index = self.check_and_convert(right)?;
        let result_type;
        if is_complete_pointer(ptr.ty(), self.types) && is_integer(index.ty()) {
            let Type::Pointer { target, .. } = ptr.ty() else {
                return Err(SemanticError::InvalidSubscript);
            };
            result_type = target.as_ref().clone();
            index = self.convert_to(index, &Type::Long);
        } else if is_complete_pointer(index.ty(), self.types) && is_integer(ptr.ty()) {
            let Type::Pointer { target, .. } = index.ty() else {
                return Err(SemanticError::InvalidSubscript);
            };
            result_type = target.as_ref().clone();
            ptr = self.convert_to(ptr, &Type::Long);
        } else {
            return Err(SemanticError::InvalidSubscript);
        }
        Ok(Expr::typed(
            ExprKind::Subscript {
                left: Box::new(ptr),
                right: Box::new(index),
            },
            result_type,
        ))
    }

    /// Shared checks for postfix `++` and `--`.
    fn check_postfix_step(&mut self, inner: Expr) -> Result<Expr, SemanticError> {
        let typed = self.check_and_convert(inner)?;
        if !is_lvalue(&typed) {
            return Err(SemanticError::IncrementNonLvalue);
        }
        if is_pointer(typed.ty()) {
            if !is_complete_pointer(typed.ty(), self.types) {
                return Err(SemanticError::InvalidOperands("increment"));
            }
        } else if !is_arithmetic(typed.ty()) {
            return Err(SemanticError::InvalidOperands("increment"));
        }
        Ok(typed)
    }

    // ------------------------------------------------------------------
    // Initializers
    // ------------------------------------------------------------------

    /// Type-check an initializer against its target type, padding
    /// compound initializers with zero-fill for trailing members.
    fn check_init(
        &mut self,
        target: &Type,
        init: Initializer,
    ) -> Result<Initializer, SemanticError> {
        // Array from string literal.
        if let (Type::Array { element, .. }, InitializerKind::Single(expr)) = (target, &init.kind)
            && let ExprKind::Literal(Literal::String(bytes)) = &expr.kind
        {
            if !is_character(element) {
                return Err(SemanticError::StringIntoNonCharArray);
            }
            let array_size = super::types::array_len(target)?;
            if array_size < bytes.len() as i64 + 1 {
                return Err(SemanticError::TooManyChars);
            }
            let InitializerKind::Single(expr) = init.kind else {
                unreachable!()
            };
            let typed = self.check_expr(expr)?;
            return Ok(Initializer {
                kind: InitializerKind::Single(typed),
                ty: Some(target.clone()),
            });
        }

        match (target, init.kind) {
            (Type::Struct { tag, .. }, InitializerKind::Compound(items)) => {
                let members = self.types.find(tag)?.fields.clone();
                if items.len() > members.len() {
                    return Err(SemanticError::TooManyStructInitializers);
                }
                let mut new_items = Vec::with_capacity(members.len());
                let mut members_iter = members.iter();
                for item in items {
                    let member = members_iter.next().expect("length checked above");
                    new_items.push(InitItem {
                        designators: Vec::new(),
                        init: self.check_init(&member.ty, item.init)?,
                    });
                }
                for member in members_iter {
                    new_items.push(InitItem {
                        designators: Vec::new(),
                        init: self.make_zero_init(&member.ty)?,
                    });
                }
                Ok(Initializer {
                    kind: InitializerKind::Compound(new_items),
                    ty: Some(target.clone()),
                })
            }
            (_, InitializerKind::Single(expr)) => {
                let typed = self.check_and_convert(expr)?;
                let converted = self.convert_by_assignment(typed, target)?;
                Ok(Initializer {
                    kind: InitializerKind::Single(converted),
                    ty: Some(target.clone()),
                })
            }
            (Type::Array { element, .. }, InitializerKind::Compound(items)) => {
                let array_size = super::types::array_len(target)?;
                if items.len() as i64 > array_size {
                    return Err(SemanticError::TooManyInitializers);
                }
                let mut new_items = Vec::with_capacity(array_size as usize);
                let filled = items.len() as i64;
                for item in items {
                    new_items.push(InitItem {
                        designators: Vec::new(),
                        init: self.check_init(element, item.init)?,
                    });
                }
                for _ in filled..array_size {
                    new_items.push(InitItem {
                        designators: Vec::new(),
                        init: self.make_zero_init(element)?,
                    });
                }
                Ok(Initializer {
                    kind: InitializerKind::Compound(new_items),
                    ty: Some(target.clone()),
                })
            }
            (_, InitializerKind::Compound(_)) => Err(SemanticError::ScalarFromCompound),
        }
    }

    /// An all-zero initializer for a type, expanded element by element.
    fn make_zero_init(&mut self, ty: &Type) -> Result<Initializer, SemanticError> {
        match ty {
            Type::Array { element, .. } => {
                let len = super::types::array_len(ty)?;
                let mut items = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    items.push(InitItem {
                        designators: Vec::new(),
                        init: self.make_zero_init(element)?,
                    });
                }
                Ok(Initializer {
                    kind: InitializerKind::Compound(items),
                    ty: Some(ty.clone()),
                })
            }
            Type::Struct { tag, .. } | Type::Union { tag, .. } => {
                let members = self.types.find(tag)?.fields.clone();
                let mut items = Vec::with_capacity(members.len());
                for member in &members {
                    items.push(InitItem {
                        designators: Vec::new(),
                        init: self.make_zero_init(&member.ty)?,
                    });
                }
                Ok(Initializer {
                    kind: InitializerKind::Compound(items),
                    ty: Some(ty.clone()),
                })
            }
            Type::Char | Type::SChar | Type::UChar => Ok(zero_single(ty, Literal::Char(0))),
            Type::Int | Type::UInt => Ok(zero_single(ty, Literal::Int(0))),
            Type::Long | Type::ULong => Ok(zero_single(ty, Literal::Long(0))),
            Type::Double => Ok(zero_single(ty, Literal::Float(0.0))),
            Type::Pointer { .. } => Ok(zero_single(ty, Literal::Int(0))),
            other => Err(SemanticError::UnsupportedType(other.to_string())),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn check_block(
        &mut self,
        items: Vec<BlockItem>,
        return_type: &Type,
    ) -> Result<Vec<BlockItem>, SemanticError> {
        items
            .into_iter()
            .map(|item| match item {
                BlockItem::Stmt(stmt) => {
                    Ok(BlockItem::Stmt(self.check_statement(stmt, return_type)?))
                }
                BlockItem::Decl(decl) => Ok(BlockItem::Decl(self.check_local_decl(decl)?)),
            })
            .collect()
    }

    fn check_statement(&mut self, stmt: Stmt, return_type: &Type) -> Result<Stmt, SemanticError> {
        match stmt {
            Stmt::Return(Some(expr)) => {
                if matches!(return_type, Type::Void) {
                    return Err(SemanticError::VoidReturn);
                }
                let typed = self.check_and_convert(expr)?;
                let converted = self.convert_by_assignment(typed, return_type)?;
                Ok(Stmt::Return(Some(converted)))
            }
            Stmt::Return(None) => Ok(Stmt::Return(None)),
            Stmt::Expr(expr) => Ok(Stmt::Expr(self.check_and_convert(expr)?)),
            Stmt::Empty => Ok(Stmt::Empty),
            Stmt::If { condition, then_stmt, else_stmt } => {
                let condition = self.check_scalar(condition)?;
                let then_stmt = Box::new(self.check_statement(*then_stmt, return_type)?);
                let else_stmt = match else_stmt {
                    Some(stmt) => Some(Box::new(self.check_statement(*stmt, return_type)?)),
                    None => None,
                };
                Ok(Stmt::If {
                    condition,
                    then_stmt,
                    else_stmt,
                })
            }
            Stmt::Compound(items) => Ok(Stmt::Compound(self.check_block(items, return_type)?)),
            Stmt::While { condition, body, label } => Ok(Stmt::While {
                condition: self.check_scalar(condition)?,
                body: Box::new(self.check_statement(*body, return_type)?),
                label,
            }),
            Stmt::DoWhile { body, condition, label } => Ok(Stmt::DoWhile {
                body: Box::new(self.check_statement(*body, return_type)?),
                condition: self.check_scalar(condition)?,
                label,
            }),
            Stmt::For { init, condition, update, body, label } => {
                let init = match init {
                    ForInit::Decl(decl) => {
                        if let Declaration::Var(var) = &decl
                            && var.storage != StorageClass::None
                        {
                            return Err(SemanticError::StorageClassInForInit);
                        }
                        ForInit::Decl(self.check_local_decl(decl)?)
                    }
                    ForInit::Expr(Some(expr)) => {
                        ForInit::Expr(Some(self.check_and_convert(expr)?))
                    }
                    ForInit::Expr(None) => ForInit::Expr(None),
                };
                let condition = match condition {
                    Some(expr) => Some(self.check_scalar(expr)?),
                    None => None,
                };
                let update = match update {
                    Some(expr) => Some(self.check_and_convert(expr)?),
                    None => None,
                };
                let body = Box::new(self.check_statement(*body, return_type)?);
                Ok(Stmt::For {
                    init,
                    condition,
                    update,
                    body,
                    label,
                })
            }
            Stmt::Switch { condition, body, label, cases } => {
                let mut condition = self.check_and_convert(condition)?;
                if !is_integer(condition.ty()) {
                    return Err(SemanticError::SwitchNotInteger);
                }
                if is_character(condition.ty()) {
                    condition = self.convert_to(condition, &Type::Int);
                }
                let body = Box::new(self.check_statement(*body, return_type)?);
                Ok(Stmt::Switch {
                    condition,
                    body,
                    label,
                    cases,
                })
            }
            Stmt::Case { expr, stmt, label } => {
                let expr = self.check_and_convert(expr)?;
                if !is_integer(expr.ty()) {
                    return Err(SemanticError::CaseNotConstant);
                }
                let stmt = Box::new(self.check_statement(*stmt, return_type)?);
                Ok(Stmt::Case { expr, stmt, label })
            }
            Stmt::Default { stmt, label } => Ok(Stmt::Default {
                stmt: Box::new(self.check_statement(*stmt, return_type)?),
                label,
            }),
            Stmt::Labeled { name, stmt } => Ok(Stmt::Labeled {
                name,
                stmt: Box::new(self.check_statement(*stmt, return_type)?),
            }),
            Stmt::Goto(target) => Ok(Stmt::Goto(target)),
            Stmt::Break { label } => Ok(Stmt::Break { label }),
            Stmt::Continue { label } => Ok(Stmt::Continue { label }),
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn check_local_decl(&mut self, decl: Declaration) -> Result<Declaration, SemanticError> {
        match decl {
            Declaration::Var(var) => Ok(Declaration::Var(self.check_local_var_decl(var)?)),
            Declaration::Empty(empty) => {
                self.check_struct_decl(&empty)?;
                Ok(Declaration::Empty(empty))
            }
            other => Ok(other),
        }
    }

    fn check_local_var_decl(&mut self, mut var: VarDecl) -> Result<VarDecl, SemanticError> {
        for declarator in &mut var.declarators {
            complete_array_size(&mut declarator.ty, declarator.init.as_ref());
            self.check_one_local_declarator(var.storage, declarator)?;
        }
        Ok(var)
    }

    fn check_one_local_declarator(
        &mut self,
        storage: StorageClass,
        declarator: &mut InitDeclarator,
    ) -> Result<(), SemanticError> {
        let var_type = declarator.ty.clone();
        if matches!(var_type, Type::Void) {
            return Err(SemanticError::VoidDeclaration);
        }
        self.validate_type(&var_type)?;

        if storage == StorageClass::Extern {
            if declarator.init.is_some() {
                return Err(SemanticError::ExternInitializer);
            }
            if let Some(existing) = self.symbols.get_opt(&declarator.name) {
                if let Some(existing_ty) = &existing.ty
                    && !same_kind(existing_ty, &var_type)
                {
                    return Err(SemanticError::RedeclaredDifferentType(
                        declarator.name.clone(),
                    ));
                }
            } else {
                self.symbols.add_static_var(
                    &declarator.name,
                    var_type,
                    true,
                    InitState::None,
                    Vec::new(),
                );
            }
            return Ok(());
        }

        if !is_complete(&var_type, self.types) {
            return Err(SemanticError::IncompleteVariable);
        }

        if storage == StorageClass::Static {
            let init = to_static_init(
                &var_type,
                declarator.init.as_ref(),
                self.symbols,
                self.types,
            )?;
            self.symbols.add_static_var(
                &declarator.name,
                var_type,
                false,
                InitState::Initialized,
                init,
            );
            declarator.init = None;
            return Ok(());
        }

        // Locals sit at level 1: they must survive until the declaration's
        // translation runs, and the driver purges them afterwards.
        self.symbols
            .add_automatic_var(&declarator.name, var_type.clone(), 1);
        declarator.init = match declarator.init.take() {
            Some(init) => Some(self.check_init(&var_type, init)?),
            None => None,
        };
        Ok(())
    }

    /// Block-scope tag declaration: the resolver's layout left the table
    /// when its scope closed, so rebuild it at level 0 for member lookups
    /// in the remainder of the pass.
    fn check_struct_decl(&mut self, decl: &EmptyDecl) -> Result<(), SemanticError> {
        let (tag, members, is_union) = match &decl.ty {
            Type::Struct { tag, fields: Some(fields) } => (tag, fields, false),
            Type::Union { tag, fields: Some(fields) } => (tag, fields, true),
            _ => return Ok(()),
        };
        if self.types.exists(tag) {
            return Ok(());
        }

        let mut seen = IndexSet::new();
        for member in members {
            if matches!(member.ty, Type::Function { .. }) {
                return Err(SemanticError::MemberFunctionType);
            }
            if !is_complete(&member.ty, self.types) {
                return Err(SemanticError::MemberIncomplete);
            }
            if !seen.insert(member.name.clone()) {
                return Err(SemanticError::DuplicateMember {
                    tag: tag.clone(),
                    member: member.name.clone(),
                });
            }
            self.validate_type(&member.ty)?;
        }
        let (alignment, size, fields) = compute_layout(members, is_union, self.types)?;
        self.types.add_struct(tag, alignment, size, fields, 0);
        Ok(())
    }

    fn check_file_scope_var_decl(&mut self, mut var: VarDecl) -> Result<VarDecl, SemanticError> {
        for declarator in &mut var.declarators {
            complete_array_size(&mut declarator.ty, declarator.init.as_ref());
            self.check_one_file_scope_declarator(var.storage, declarator)?;
        }
        Ok(var)
    }

    fn check_one_file_scope_declarator(
        &mut self,
        storage: StorageClass,
        declarator: &mut InitDeclarator,
    ) -> Result<(), SemanticError> {
        let var_type = declarator.ty.clone();
        if matches!(var_type, Type::Void) {
            return Err(SemanticError::VoidDeclaration);
        }
        self.validate_type(&var_type)?;

        let mut global = storage != StorageClass::Static;
        let mut init_state = if storage == StorageClass::Extern {
            InitState::None
        } else {
            InitState::Tentative
        };
        let mut init_list = Vec::new();
        if let Some(init) = &declarator.init {
            init_state = InitState::Initialized;
            init_list = to_static_init(&var_type, Some(init), self.symbols, self.types)?;
        }
        if !is_complete(&var_type, self.types) && init_state != InitState::None {
            return Err(SemanticError::IncompleteVariable);
        }

        if let Some(existing) = self.symbols.get_opt(&declarator.name) {
            if let Some(existing_ty) = &existing.ty
                && !same_kind(existing_ty, &var_type)
            {
                return Err(SemanticError::RedeclaredDifferentType(
                    declarator.name.clone(),
                ));
            }
            if let SymbolKind::Static {
                global: existing_global,
                init_state: existing_state,
                init: existing_init,
            } = &existing.kind
            {
                if storage != StorageClass::Extern && *existing_global != global {
                    return Err(SemanticError::ConflictingLinkage);
                }
                if *existing_state == InitState::Initialized
                    && init_state == InitState::Initialized
                {
                    return Err(SemanticError::ConflictingDefinition);
                }
                if *existing_state == InitState::Initialized {
                    init_state = InitState::Initialized;
                    init_list = existing_init.clone();
                }
                if storage == StorageClass::Extern {
                    global = *existing_global;
                }
            }
        }

        self.symbols
            .add_static_var(&declarator.name, var_type, global, init_state, init_list);
        declarator.init = None;
        Ok(())
    }

    fn check_fn_decl(&mut self, mut fd: FunctionDecl) -> Result<FunctionDecl, SemanticError> {
        self.validate_type(&fd.ty)?;
        let Type::Function { return_type, params, variadic } = fd.ty.clone() else {
            return Err(SemanticError::NonFunctionType);
        };
        if matches!(return_type.as_ref(), Type::Array { .. }) {
            return Err(SemanticError::FunctionReturnsArray);
        }

        // Array parameters decay to pointers; void parameters are rejected.
        let mut adjusted_params = Vec::with_capacity(params.len());
        for param in params {
            let ty = match param.ty {
                Type::Array { element, .. } => Type::Pointer {
                    target: element,
                    qualifiers: Default::default(),
                },
                Type::Void => return Err(SemanticError::VoidParam),
                other => other,
            };
            adjusted_params.push(Param {
                name: param.name,
                ty,
            });
        }

        let has_body = fd.body.is_some();
        let return_complete = matches!(return_type.as_ref(), Type::Void)
            || is_complete(&return_type, self.types);
        let params_complete = adjusted_params
            .iter()
            .all(|p| is_complete(&p.ty, self.types));
        if has_body && (!return_complete || !params_complete) {
            return Err(SemanticError::FunctionIncomplete);
        }

        let mut global = fd.storage != StorageClass::Static;
        let mut defined = has_body;
        if let Some(existing) = self.symbols.get_opt(&fd.name) {
            let existing_is_function = matches!(
                existing.ty,
                Some(Type::Function { .. })
            );
            if !existing_is_function {
                return Err(SemanticError::RedeclaredFunctionType(fd.name.clone()));
            }
            if let SymbolKind::Function {
                global: existing_global,
                defined: existing_defined,
            } = &existing.kind
            {
                if *existing_defined && has_body {
                    return Err(SemanticError::FunctionDefinedTwice(fd.name.clone()));
                }
                if *existing_global && fd.storage == StorageClass::Static {
                    return Err(SemanticError::StaticAfterNonStatic);
                }
                defined = has_body || *existing_defined;
                global = *existing_global;
            }
        }

        let adjusted_type = Type::Function {
            return_type: return_type.clone(),
            params: adjusted_params.clone(),
            variadic,
        };
        self.symbols
            .add_function(&fd.name, adjusted_type.clone(), global, defined);

        if let Some(body) = fd.body.take() {
            for param in &adjusted_params {
                let name = param
                    .name
                    .as_ref()
                    .ok_or(SemanticError::ParamNameOmitted)?;
                self.symbols.add_automatic_var(name, param.ty.clone(), 1);
            }
            fd.body = Some(self.check_block(body, &return_type)?);
        }
        fd.ty = adjusted_type;
        Ok(fd)
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr, ty: Type) -> Expr {
    Expr::typed(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        ty,
    )
}

fn zero_single(ty: &Type, lit: Literal) -> Initializer {
    Initializer {
        kind: InitializerKind::Single(Expr::typed(ExprKind::Literal(lit), ty.clone())),
        ty: Some(ty.clone()),
    }
}

/// Fill in the length of an unsized array from its initializer.
fn complete_array_size(ty: &mut Type, init: Option<&Initializer>) {
    let Type::Array { size, .. } = ty else { return };
    if size.is_some() {
        return;
    }
    let Some(init) = init else { return };
    let len = match &init.kind {
        InitializerKind::Single(expr) => match &expr.kind {
            ExprKind::Literal(Literal::String(bytes)) => bytes.len() as i64 + 1,
            _ => return,
        },
        InitializerKind::Compound(items) => items.len() as i64,
    };
    *size = Some(Box::new(Expr::new(ExprKind::Literal(Literal::Int(len)))));
}
