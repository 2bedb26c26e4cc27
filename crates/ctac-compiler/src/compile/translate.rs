//! Translation of the typed AST into three-address code.
//!
//! Expression results come in three shapes: a plain operand, a pointer to
//! dereference, or a sub-object of a named aggregate. Implicit casts
//! inserted by the type checker select the matching conversion instruction
//! by operand size and signedness.

use ctac_tac::{
    BinaryOp as TacBinaryOp, Constant, Instruction, StaticInit, TacType, TopLevel, UnaryOp, Val,
};

use crate::analyze::const_convert::{const_convert, literal_constant};
use crate::analyze::symbol_table::{InitState, SymbolKind, SymbolTable};
use crate::analyze::type_table::TypeTable;
use crate::analyze::types::{array_len, is_pointer, is_signed, size_of};
use crate::analyze::SemanticError;
use crate::parser::ast::{
    BinaryOp, BlockItem, Declaration, Expr, ExprKind, ExternalDecl, ForInit, FunctionDecl,
    InitDeclarator, Initializer, InitializerKind, Literal, Stmt, StorageClass, Type,
};

/// Translate one external declaration.
///
/// Function definitions produce a `Function` top-level; everything else
/// produces nothing here, because static variables and constants are
/// emitted from the symbol table once the translation unit ends.
pub fn translate(
    decl: &ExternalDecl,
    symbols: &mut SymbolTable,
    types: &TypeTable,
) -> Result<Option<TopLevel>, SemanticError> {
    let ExternalDecl::Function(fd) = decl else {
        return Ok(None);
    };
    if fd.body.is_none() {
        return Ok(None);
    }
    let mut translator = Translator {
        symbols,
        types,
        instructions: Vec::new(),
        tmp_counter: 0,
        label_counter: 0,
    };
    Ok(Some(translator.translate_function(fd)?))
}

/// Sweep the symbol table and emit the static variables and constants of
/// the translation unit, in table order.
///
/// Tentative definitions resolve to a single zero-fill record here.
pub fn emit_symbols(
    symbols: &SymbolTable,
    types: &TypeTable,
) -> Result<Vec<TopLevel>, SemanticError> {
    let mut out = Vec::new();
    for (name, symbol) in symbols.iter() {
        match &symbol.kind {
            SymbolKind::Static { global, init_state, init } => {
                let ty = symbol
                    .ty
                    .as_ref()
                    .ok_or_else(|| SemanticError::SymbolNotFound(name.to_owned()))?;
                let init = match init_state {
                    InitState::Initialized => init.clone(),
                    InitState::Tentative => {
                        vec![StaticInit::Zero(size_of(ty, types)? as u64)]
                    }
                    InitState::None => continue,
                };
                out.push(TopLevel::StaticVariable {
                    name: name.to_owned(),
                    global: *global,
                    ty: tac_type(ty)?,
                    init,
                });
            }
            SymbolKind::Constant { init } => {
                let ty = symbol
                    .ty
                    .as_ref()
                    .ok_or_else(|| SemanticError::SymbolNotFound(name.to_owned()))?;
                out.push(TopLevel::StaticConstant {
                    name: name.to_owned(),
                    ty: tac_type(ty)?,
                    init: init.clone(),
                });
            }
            SymbolKind::Function { .. } | SymbolKind::Local { .. } => {}
        }
    }
    Ok(out)
}

/// Convert a front-end type to its TAC rendition.
pub fn tac_type(ty: &Type) -> Result<TacType, SemanticError> {
    match ty {
        Type::Char => Ok(TacType::Char),
        Type::SChar => Ok(TacType::SChar),
        Type::UChar => Ok(TacType::UChar),
        Type::Int => Ok(TacType::Int),
        Type::UInt => Ok(TacType::UInt),
        Type::Long => Ok(TacType::Long),
        Type::ULong => Ok(TacType::ULong),
        Type::Double => Ok(TacType::Double),
        Type::Void => Ok(TacType::Void),
        Type::Pointer { target, .. } => Ok(TacType::Pointer(Box::new(tac_type(target)?))),
        Type::Array { element, .. } => Ok(TacType::Array {
            element: Box::new(tac_type(element)?),
            size: array_len(ty)?,
        }),
        Type::Function { return_type, params, .. } => Ok(TacType::Function {
            params: params
                .iter()
                .map(|p| tac_type(&p.ty))
                .collect::<Result<_, _>>()?,
            ret: Box::new(tac_type(return_type)?),
        }),
        Type::Struct { tag, .. } | Type::Union { tag, .. } => {
            Ok(TacType::Structure(tag.clone()))
        }
        other => Err(SemanticError::UnsupportedType(other.to_string())),
    }
}

/// Where an expression's value lives.
#[derive(Debug, Clone)]
enum ExprResult {
    Operand(Val),
    Dereferenced(Val),
    SubObject { base: String, offset: i64 },
}

struct Translator<'a> {
    symbols: &'a mut SymbolTable,
    types: &'a TypeTable,
    instructions: Vec<Instruction>,
    tmp_counter: u32,
    label_counter: u32,
}

impl Translator<'_> {
    fn translate_function(&mut self, fd: &FunctionDecl) -> Result<TopLevel, SemanticError> {
        let Type::Function { params, .. } = &fd.ty else {
            return Err(SemanticError::NonFunctionType);
        };
        let param_names: Vec<String> = params
            .iter()
            .map(|p| p.name.clone().ok_or(SemanticError::ParamNameOmitted))
            .collect::<Result<_, _>>()?;

        let body = fd.body.as_ref().expect("definition checked by caller");
        self.translate_block(body)?;
        // A function that runs off the end returns zero.
        self.emit(Instruction::Return(Some(Val::Constant(Constant::Int(0)))));

        Ok(TopLevel::Function {
            name: fd.name.clone(),
            global: self.symbols.is_global(&fd.name),
            params: param_names,
            body: std::mem::take(&mut self.instructions),
        })
    }

    fn emit(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    fn fresh_tmp(&mut self) -> String {
        let name = format!("tmp.{}", self.tmp_counter);
        self.tmp_counter += 1;
        name
    }

    fn fresh_label(&mut self, prefix: &str) -> String {
        let label = format!("{prefix}.{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Translate an expression to a usable value, loading through pointer
    /// and sub-object results.
    fn translate_expr(&mut self, expr: &Expr) -> Result<Val, SemanticError> {
        let result = self.translate_expr_result(expr)?;
        Ok(self.load_result(result))
    }

    fn load_result(&mut self, result: ExprResult) -> Val {
        match result {
            ExprResult::Operand(val) => val,
            ExprResult::Dereferenced(ptr) => {
                let dst = Val::Var(self.fresh_tmp());
                self.emit(Instruction::Load {
                    src_ptr: ptr,
                    dst: dst.clone(),
                });
                dst
            }
            ExprResult::SubObject { base, offset } => {
                let dst = Val::Var(self.fresh_tmp());
                self.emit(Instruction::CopyFromOffset {
                    src: base,
                    offset,
                    dst: dst.clone(),
                });
                dst
            }
        }
    }

    /// Store a value into an lvalue result, returning the stored value.
    fn store_result(&mut self, target: ExprResult, value: Val) -> Val {
        match target {
            ExprResult::Operand(obj) => {
                self.emit(Instruction::Copy {
                    src: value,
                    dst: obj.clone(),
                });
                obj
            }
            ExprResult::Dereferenced(ptr) => {
                self.emit(Instruction::Store {
                    src: value.clone(),
                    dst_ptr: ptr,
                });
                value
            }
            ExprResult::SubObject { base, offset } => {
                self.emit(Instruction::CopyToOffset {
                    src: value.clone(),
                    dst: base,
                    offset,
                });
                value
            }
        }
    }

    fn translate_expr_result(&mut self, expr: &Expr) -> Result<ExprResult, SemanticError> {
        match &expr.kind {
            ExprKind::Literal(Literal::String(bytes)) => {
                // An rvalue string literal becomes an interned constant
                // whose address is the value.
                let name = self.symbols.add_string_literal(bytes);
                let dst = Val::Var(self.fresh_tmp());
                self.emit(Instruction::GetAddress {
                    src: Val::Var(name),
                    dst: dst.clone(),
                });
                Ok(ExprResult::Operand(dst))
            }
            ExprKind::Literal(lit) => {
                let c = literal_constant(lit)
                    .ok_or_else(|| SemanticError::UnsupportedType(expr.ty().to_string()))?;
                let c = const_convert(expr.ty(), c)?;
                Ok(ExprResult::Operand(Val::Constant(c)))
            }
            ExprKind::Var(name) => {
                let symbol = self.symbols.get(name)?;
                let object_is_array = matches!(symbol.ty, Some(Type::Array { .. }));
                if object_is_array && is_pointer(expr.ty()) {
                    // Array-to-pointer decay: the value is the address.
                    let dst = Val::Var(self.fresh_tmp());
                    self.emit(Instruction::GetAddress {
                        src: Val::Var(name.clone()),
                        dst: dst.clone(),
                    });
                    return Ok(ExprResult::Operand(dst));
                }
                Ok(ExprResult::Operand(Val::Var(name.clone())))
            }
            ExprKind::Cast { target, expr: inner } => {
                let src = self.translate_expr(inner)?;
                if matches!(target, Type::Void) {
                    return Ok(ExprResult::Operand(Val::Constant(Constant::Int(0))));
                }
                let val = self.emit_cast(src, inner.ty(), target)?;
                Ok(ExprResult::Operand(val))
            }
            ExprKind::Unary { op, expr: inner } => self.translate_unary(*op, inner),
            ExprKind::Binary { op, left, right } => {
                self.translate_binary(expr, *op, left, right)
            }
            ExprKind::Assign { op, target, value } => {
                self.translate_assign(*op, target, value)
            }
            ExprKind::Conditional { condition, then_expr, else_expr } => {
                self.translate_conditional(expr, condition, then_expr, else_expr)
            }
            ExprKind::Call { func, args } => self.translate_call(expr, func, args),
            ExprKind::Subscript { left, right } => {
                // After type checking, one side is the pointer and the
                // other a long index; the element type is the result type.
                let (ptr_expr, index_expr) = if is_pointer(left.ty()) {
                    (left, right)
                } else {
                    (right, left)
                };
                let ptr = self.translate_expr(ptr_expr)?;
                let index = self.translate_expr(index_expr)?;
                let scale = size_of(expr.ty(), self.types)?;
                let dst = Val::Var(self.fresh_tmp());
                self.emit(Instruction::AddPtr {
                    ptr,
                    index,
                    scale,
                    dst: dst.clone(),
                });
                Ok(ExprResult::Dereferenced(dst))
            }
            ExprKind::FieldAccess { expr: inner, field } => {
                let member_offset = self.member_offset(inner.ty(), field)?;
                let base = self.translate_expr_result(inner)?;
                match base {
                    ExprResult::SubObject { base, offset } => Ok(ExprResult::SubObject {
                        base,
                        offset: offset + member_offset,
                    }),
                    ExprResult::Operand(Val::Var(name)) => Ok(ExprResult::SubObject {
                        base: name,
                        offset: member_offset,
                    }),
                    ExprResult::Dereferenced(ptr) => {
                        Ok(self.offset_pointer(ptr, member_offset))
                    }
                    ExprResult::Operand(Val::Constant(_)) => {
                        Err(SemanticError::DotOnNonStruct)
                    }
                }
            }
            ExprKind::PtrAccess { expr: inner, field } => {
                let pointee = match inner.ty() {
                    Type::Pointer { target, .. } => target.as_ref(),
                    _ => return Err(SemanticError::ArrowOnNonStructPtr),
                };
                let member_offset = self.member_offset(pointee, field)?;
                let ptr = self.translate_expr(inner)?;
                Ok(self.offset_pointer(ptr, member_offset))
            }
            ExprKind::PostIncrement(inner) => self.translate_postfix_step(inner, true),
            ExprKind::PostDecrement(inner) => self.translate_postfix_step(inner, false),
            ExprKind::SizeOfExpr(inner) => {
                let size = size_of(inner.ty(), self.types)?;
                Ok(ExprResult::Operand(Val::Constant(Constant::ULong(
                    size as u64,
                ))))
            }
            ExprKind::SizeOfType(ty) => {
                let size = size_of(ty, self.types)?;
                Ok(ExprResult::Operand(Val::Constant(Constant::ULong(
                    size as u64,
                ))))
            }
            ExprKind::AlignOf(ty) => {
                let alignment = crate::analyze::types::alignment_of(ty, self.types)?;
                Ok(ExprResult::Operand(Val::Constant(Constant::ULong(
                    alignment as u64,
                ))))
            }
            ExprKind::CompoundLiteral { .. } => {
                Err(SemanticError::Unsupported("compound literals"))
            }
            ExprKind::Generic { .. } => Err(SemanticError::Unsupported("_Generic expressions")),
        }
    }

    fn member_offset(&self, ty: &Type, field: &str) -> Result<i64, SemanticError> {
        let tag = match ty {
            Type::Struct { tag, .. } | Type::Union { tag, .. } => tag,
            _ => return Err(SemanticError::DotOnNonStruct),
        };
        let entry = self.types.find(tag)?;
        let member = entry.field(field).ok_or_else(|| SemanticError::NoSuchMember {
            tag: tag.clone(),
            member: field.to_owned(),
        })?;
        Ok(member.offset)
    }

    fn offset_pointer(&mut self, ptr: Val, offset: i64) -> ExprResult {
        if offset == 0 {
            return ExprResult::Dereferenced(ptr);
        }
        let dst = Val::Var(self.fresh_tmp());
        self.emit(Instruction::AddPtr {
            ptr,
            index: Val::Constant(Constant::Long(offset)),
            scale: 1,
            dst: dst.clone(),
        });
        ExprResult::Dereferenced(dst)
    }

    fn translate_unary(
        &mut self,
        op: crate::parser::ast::UnaryOp,
        inner: &Expr,
    ) -> Result<ExprResult, SemanticError> {
        use crate::parser::ast::UnaryOp as AstUnary;
        match op {
            AstUnary::Dereference => {
                let ptr = self.translate_expr(inner)?;
                Ok(ExprResult::Dereferenced(ptr))
            }
            AstUnary::AddressOf => {
                let target = self.translate_expr_result(inner)?;
                match target {
                    ExprResult::Operand(obj) => {
                        let dst = Val::Var(self.fresh_tmp());
                        self.emit(Instruction::GetAddress {
                            src: obj,
                            dst: dst.clone(),
                        });
                        Ok(ExprResult::Operand(dst))
                    }
                    // The address of a dereference is the pointer itself.
                    ExprResult::Dereferenced(ptr) => Ok(ExprResult::Operand(ptr)),
                    ExprResult::SubObject { base, offset } => {
                        let base_addr = Val::Var(self.fresh_tmp());
                        self.emit(Instruction::GetAddress {
                            src: Val::Var(base),
                            dst: base_addr.clone(),
                        });
                        if offset == 0 {
                            return Ok(ExprResult::Operand(base_addr));
                        }
                        let dst = Val::Var(self.fresh_tmp());
                        self.emit(Instruction::AddPtr {
                            ptr: base_addr,
                            index: Val::Constant(Constant::Long(offset)),
                            scale: 1,
                            dst: dst.clone(),
                        });
                        Ok(ExprResult::Operand(dst))
                    }
                }
            }
            AstUnary::Not | AstUnary::Negate | AstUnary::Complement => {
                let src = self.translate_expr(inner)?;
                let dst = Val::Var(self.fresh_tmp());
                let op = match op {
                    AstUnary::Not => UnaryOp::Not,
                    AstUnary::Negate => UnaryOp::Negate,
                    _ => UnaryOp::Complement,
                };
                self.emit(Instruction::Unary {
                    op,
                    src,
                    dst: dst.clone(),
                });
                Ok(ExprResult::Operand(dst))
            }
        }
    }

    fn translate_binary(
        &mut self,
        expr: &Expr,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<ExprResult, SemanticError> {
        match op {
            BinaryOp::And | BinaryOp::Or => self.translate_short_circuit(op, left, right),
            BinaryOp::Add | BinaryOp::Subtract if is_pointer(expr.ty()) => {
                // Pointer arithmetic scales the integer operand.
                let (ptr_expr, index_expr) = if is_pointer(left.ty()) {
                    (left, right)
                } else {
                    (right, left)
                };
                let ptr = self.translate_expr(ptr_expr)?;
                let mut index = self.translate_expr(index_expr)?;
                if op == BinaryOp::Subtract {
                    let negated = Val::Var(self.fresh_tmp());
                    self.emit(Instruction::Unary {
                        op: UnaryOp::Negate,
                        src: index,
                        dst: negated.clone(),
                    });
                    index = negated;
                }
                let pointee = match expr.ty() {
                    Type::Pointer { target, .. } => target.as_ref(),
                    _ => return Err(SemanticError::InvalidOperands("pointer arithmetic")),
                };
                let scale = size_of(pointee, self.types)?;
                let dst = Val::Var(self.fresh_tmp());
                self.emit(Instruction::AddPtr {
                    ptr,
                    index,
                    scale,
                    dst: dst.clone(),
                });
                Ok(ExprResult::Operand(dst))
            }
            BinaryOp::Subtract
                if is_pointer(left.ty()) && is_pointer(right.ty()) =>
            {
                // Pointer difference: byte difference divided by the scale.
                let v1 = self.translate_expr(left)?;
                let v2 = self.translate_expr(right)?;
                let pointee = match left.ty() {
                    Type::Pointer { target, .. } => target.as_ref(),
                    _ => return Err(SemanticError::InvalidOperands("subtraction")),
                };
                let scale = size_of(pointee, self.types)?;
                let diff = Val::Var(self.fresh_tmp());
                self.emit(Instruction::Binary {
                    op: TacBinaryOp::Subtract,
                    src1: v1,
                    src2: v2,
                    dst: diff.clone(),
                });
                let dst = Val::Var(self.fresh_tmp());
                self.emit(Instruction::Binary {
                    op: TacBinaryOp::Divide,
                    src1: diff,
                    src2: Val::Constant(Constant::Long(scale)),
                    dst: dst.clone(),
                });
                Ok(ExprResult::Operand(dst))
            }
            _ => {
                let src1 = self.translate_expr(left)?;
                let src2 = self.translate_expr(right)?;
                let dst = Val::Var(self.fresh_tmp());
                self.emit(Instruction::Binary {
                    op: tac_binary_op(op)?,
                    src1,
                    src2,
                    dst: dst.clone(),
                });
                Ok(ExprResult::Operand(dst))
            }
        }
    }

    fn translate_short_circuit(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<ExprResult, SemanticError> {
        let dst = Val::Var(self.fresh_tmp());
        if op == BinaryOp::And {
            let false_label = self.fresh_label("and_false");
            let end_label = self.fresh_label("and_end");
            let v1 = self.translate_expr(left)?;
            self.emit(Instruction::JumpIfZero {
                condition: v1,
                target: false_label.clone(),
            });
            let v2 = self.translate_expr(right)?;
            self.emit(Instruction::JumpIfZero {
                condition: v2,
                target: false_label.clone(),
            });
            self.emit(Instruction::Copy {
                src: Val::Constant(Constant::Int(1)),
                dst: dst.clone(),
            });
            self.emit(Instruction::Jump {
                target: end_label.clone(),
            });
            self.emit(Instruction::Label { name: false_label });
            self.emit(Instruction::Copy {
                src: Val::Constant(Constant::Int(0)),
                dst: dst.clone(),
            });
            self.emit(Instruction::Label { name: end_label });
        } else {
            let true_label = self.fresh_label("or_true");
            let end_label = self.fresh_label("or_end");
            let v1 = self.translate_expr(left)?;
            self.emit(Instruction::JumpIfNotZero {
                condition: v1,
                target: true_label.clone(),
            });
            let v2 = self.translate_expr(right)?;
            self.emit(Instruction::JumpIfNotZero {
                condition: v2,
                target: true_label.clone(),
            });
            self.emit(Instruction::Copy {
                src: Val::Constant(Constant::Int(0)),
                dst: dst.clone(),
            });
            self.emit(Instruction::Jump {
                target: end_label.clone(),
            });
            self.emit(Instruction::Label { name: true_label });
            self.emit(Instruction::Copy {
                src: Val::Constant(Constant::Int(1)),
                dst: dst.clone(),
            });
            self.emit(Instruction::Label { name: end_label });
        }
        Ok(ExprResult::Operand(dst))
    }

    fn translate_assign(
        &mut self,
        op: Option<BinaryOp>,
        target: &Expr,
        value: &Expr,
    ) -> Result<ExprResult, SemanticError> {
        let lhs = self.translate_expr_result(target)?;

        let Some(op) = op else {
            let rhs = self.translate_expr(value)?;
            let stored = self.store_result(lhs, rhs);
            return Ok(ExprResult::Operand(stored));
        };

        // Compound assignment: load the current value once, operate in the
        // operation's type, convert back, store through the same lvalue.
        let current = self.load_result(lhs.clone());
        let rhs = self.translate_expr(value)?;

        let new_value = if is_pointer(target.ty()) {
            let mut index = rhs;
            if op == BinaryOp::Subtract {
                let negated = Val::Var(self.fresh_tmp());
                self.emit(Instruction::Unary {
                    op: UnaryOp::Negate,
                    src: index,
                    dst: negated.clone(),
                });
                index = negated;
            }
            let pointee = match target.ty() {
                Type::Pointer { target, .. } => target.as_ref(),
                _ => return Err(SemanticError::InvalidOperands("pointer arithmetic")),
            };
            let scale = size_of(pointee, self.types)?;
            let dst = Val::Var(self.fresh_tmp());
            self.emit(Instruction::AddPtr {
                ptr: current,
                index,
                scale,
                dst: dst.clone(),
            });
            dst
        } else {
            let op_ty = compound_op_type(op, target.ty(), value.ty());
            let current = self.emit_cast(current, target.ty(), &op_ty)?;
            let result = Val::Var(self.fresh_tmp());
            self.emit(Instruction::Binary {
                op: tac_binary_op(op)?,
                src1: current,
                src2: rhs,
                dst: result.clone(),
            });
            self.emit_cast(result, &op_ty, target.ty())?
        };

        let stored = self.store_result(lhs, new_value);
        Ok(ExprResult::Operand(stored))
    }

    fn translate_conditional(
        &mut self,
        expr: &Expr,
        condition: &Expr,
        then_expr: &Expr,
        else_expr: &Expr,
    ) -> Result<ExprResult, SemanticError> {
        let else_label = self.fresh_label("cond_else");
        let end_label = self.fresh_label("cond_end");
        let is_void = matches!(expr.ty(), Type::Void);
        let dst = Val::Var(self.fresh_tmp());

        let c = self.translate_expr(condition)?;
        self.emit(Instruction::JumpIfZero {
            condition: c,
            target: else_label.clone(),
        });
        let v1 = self.translate_expr(then_expr)?;
        if !is_void {
            self.emit(Instruction::Copy {
                src: v1,
                dst: dst.clone(),
            });
        }
        self.emit(Instruction::Jump {
            target: end_label.clone(),
        });
        self.emit(Instruction::Label { name: else_label });
        let v2 = self.translate_expr(else_expr)?;
        if !is_void {
            self.emit(Instruction::Copy {
                src: v2,
                dst: dst.clone(),
            });
        }
        self.emit(Instruction::Label { name: end_label });

        if is_void {
            Ok(ExprResult::Operand(Val::Constant(Constant::Int(0))))
        } else {
            Ok(ExprResult::Operand(dst))
        }
    }

    fn translate_call(
        &mut self,
        expr: &Expr,
        func: &Expr,
        args: &[Expr],
    ) -> Result<ExprResult, SemanticError> {
        let ExprKind::Var(name) = &func.kind else {
            return Err(SemanticError::CallNotVariable);
        };
        let mut arg_vals = Vec::with_capacity(args.len());
        for arg in args {
            arg_vals.push(self.translate_expr(arg)?);
        }
        let returns_void = matches!(expr.ty(), Type::Void);
        let dst = if returns_void {
            None
        } else {
            Some(Val::Var(self.fresh_tmp()))
        };
        self.emit(Instruction::FunCall {
            name: name.clone(),
            args: arg_vals,
            dst: dst.clone(),
        });
        Ok(ExprResult::Operand(
            dst.unwrap_or(Val::Constant(Constant::Int(0))),
        ))
    }

    fn translate_postfix_step(
        &mut self,
        inner: &Expr,
        increment: bool,
    ) -> Result<ExprResult, SemanticError> {
        let lvalue = self.translate_expr_result(inner)?;
        let current = self.load_result(lvalue.clone());

        // Keep the original value as the expression's result.
        let old = Val::Var(self.fresh_tmp());
        self.emit(Instruction::Copy {
            src: current.clone(),
            dst: old.clone(),
        });

        let new_value = if let Type::Pointer { target, .. } = inner.ty() {
            let scale = size_of(target, self.types)?;
            let step = if increment { 1 } else { -1 };
            let dst = Val::Var(self.fresh_tmp());
            self.emit(Instruction::AddPtr {
                ptr: current,
                index: Val::Constant(Constant::Long(step)),
                scale,
                dst: dst.clone(),
            });
            dst
        } else {
            let one = const_convert(inner.ty(), Constant::Int(1))?;
            let dst = Val::Var(self.fresh_tmp());
            self.emit(Instruction::Binary {
                op: if increment {
                    TacBinaryOp::Add
                } else {
                    TacBinaryOp::Subtract
                },
                src1: current,
                src2: Val::Constant(one),
                dst: dst.clone(),
            });
            dst
        };
        self.store_result(lvalue, new_value);
        Ok(ExprResult::Operand(old))
    }

    /// Emit the conversion instruction for a cast between scalar types.
    fn emit_cast(&mut self, src: Val, from: &Type, to: &Type) -> Result<Val, SemanticError> {
        if crate::analyze::types::same_kind(from, to) {
            return Ok(src);
        }
        let dst = Val::Var(self.fresh_tmp());
        let from_double = matches!(from, Type::Double);
        let to_double = matches!(to, Type::Double);

        let instr = if to_double {
            if is_signed(from)? {
                Instruction::IntToDouble {
                    src,
                    dst: dst.clone(),
                }
            } else {
                Instruction::UIntToDouble {
                    src,
                    dst: dst.clone(),
                }
            }
        } else if from_double {
            if is_signed(to)? {
                Instruction::DoubleToInt {
                    src,
                    dst: dst.clone(),
                }
            } else {
                Instruction::DoubleToUInt {
                    src,
                    dst: dst.clone(),
                }
            }
        } else {
            let from_size = scalar_size(from);
            let to_size = scalar_size(to);
            if from_size == to_size {
                Instruction::Copy {
                    src,
                    dst: dst.clone(),
                }
            } else if to_size < from_size {
                Instruction::Truncate {
                    src,
                    dst: dst.clone(),
                }
            } else if is_signed(from)? {
                Instruction::SignExtend {
                    src,
                    dst: dst.clone(),
                }
            } else {
                Instruction::ZeroExtend {
                    src,
                    dst: dst.clone(),
                }
            }
        };
        self.emit(instr);
        Ok(dst)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn translate_block(&mut self, items: &[BlockItem]) -> Result<(), SemanticError> {
        for item in items {
            match item {
                BlockItem::Stmt(stmt) => self.translate_stmt(stmt)?,
                BlockItem::Decl(decl) => self.translate_local_decl(decl)?,
            }
        }
        Ok(())
    }

    fn translate_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::Return(expr) => {
                let val = match expr {
                    Some(expr) => Some(self.translate_expr(expr)?),
                    None => None,
                };
                self.emit(Instruction::Return(val));
                Ok(())
            }
            Stmt::Expr(expr) => {
                self.translate_expr(expr)?;
                Ok(())
            }
            Stmt::Empty => Ok(()),
            Stmt::Compound(items) => self.translate_block(items),
            Stmt::If { condition, then_stmt, else_stmt } => {
                let c = self.translate_expr(condition)?;
                match else_stmt {
                    None => {
                        let end_label = self.fresh_label("if_end");
                        self.emit(Instruction::JumpIfZero {
                            condition: c,
                            target: end_label.clone(),
                        });
                        self.translate_stmt(then_stmt)?;
                        self.emit(Instruction::Label { name: end_label });
                    }
                    Some(else_stmt) => {
                        let else_label = self.fresh_label("if_else");
                        let end_label = self.fresh_label("if_end");
                        self.emit(Instruction::JumpIfZero {
                            condition: c,
                            target: else_label.clone(),
                        });
                        self.translate_stmt(then_stmt)?;
                        self.emit(Instruction::Jump {
                            target: end_label.clone(),
                        });
                        self.emit(Instruction::Label { name: else_label });
                        self.translate_stmt(else_stmt)?;
                        self.emit(Instruction::Label { name: end_label });
                    }
                }
                Ok(())
            }
            Stmt::While { condition, body, label } => {
                let label = required_label(label)?;
                let continue_label = format!("{label}.continue");
                let break_label = format!("{label}.break");
                self.emit(Instruction::Label {
                    name: continue_label.clone(),
                });
                let c = self.translate_expr(condition)?;
                self.emit(Instruction::JumpIfZero {
                    condition: c,
                    target: break_label.clone(),
                });
                self.translate_stmt(body)?;
                self.emit(Instruction::Jump {
                    target: continue_label,
                });
                self.emit(Instruction::Label { name: break_label });
                Ok(())
            }
            Stmt::DoWhile { body, condition, label } => {
                let label = required_label(label)?;
                let start_label = format!("{label}.start");
                let continue_label = format!("{label}.continue");
                let break_label = format!("{label}.break");
                self.emit(Instruction::Label {
                    name: start_label.clone(),
                });
                self.translate_stmt(body)?;
                self.emit(Instruction::Label {
                    name: continue_label,
                });
                let c = self.translate_expr(condition)?;
                self.emit(Instruction::JumpIfNotZero {
                    condition: c,
                    target: start_label,
                });
                self.emit(Instruction::Label { name: break_label });
                Ok(())
            }
            Stmt::For { init, condition, update, body, label } => {
                let label = required_label(label)?;
                let start_label = format!("{label}.start");
                let continue_label = format!("{label}.continue");
                let break_label = format!("{label}.break");
                match init {
                    ForInit::Decl(decl) => self.translate_local_decl(decl)?,
                    ForInit::Expr(Some(expr)) => {
                        self.translate_expr(expr)?;
                    }
                    ForInit::Expr(None) => {}
                }
                self.emit(Instruction::Label {
                    name: start_label.clone(),
                });
                if let Some(condition) = condition {
                    let c = self.translate_expr(condition)?;
                    self.emit(Instruction::JumpIfZero {
                        condition: c,
                        target: break_label.clone(),
                    });
                }
                self.translate_stmt(body)?;
                self.emit(Instruction::Label {
                    name: continue_label,
                });
                if let Some(update) = update {
                    self.translate_expr(update)?;
                }
                self.emit(Instruction::Jump { target: start_label });
                self.emit(Instruction::Label { name: break_label });
                Ok(())
            }
            Stmt::Switch { condition, body, label, cases } => {
                let label = required_label(label)?;
                let break_label = format!("{label}.break");
                let control = self.translate_expr(condition)?;
                for (value, case_label) in cases {
                    let Some(value) = value else { continue };
                    let case_const = const_convert(condition.ty(), Constant::Long(*value))?;
                    let cmp = Val::Var(self.fresh_tmp());
                    self.emit(Instruction::Binary {
                        op: TacBinaryOp::Equal,
                        src1: control.clone(),
                        src2: Val::Constant(case_const),
                        dst: cmp.clone(),
                    });
                    self.emit(Instruction::JumpIfNotZero {
                        condition: cmp,
                        target: case_label.clone(),
                    });
                }
                let default_target = cases
                    .iter()
                    .find(|(value, _)| value.is_none())
                    .map(|(_, label)| label.clone())
                    .unwrap_or_else(|| break_label.clone());
                self.emit(Instruction::Jump {
                    target: default_target,
                });
                self.translate_stmt(body)?;
                self.emit(Instruction::Label { name: break_label });
                Ok(())
            }
            Stmt::Case { stmt, label, .. } | Stmt::Default { stmt, label } => {
                let label = required_label(label)?;
                self.emit(Instruction::Label {
                    name: label.to_owned(),
                });
                self.translate_stmt(stmt)
            }
            Stmt::Break { label } => {
                let label = required_label(label)?;
                self.emit(Instruction::Jump {
                    target: format!("{label}.break"),
                });
                Ok(())
            }
            Stmt::Continue { label } => {
                let label = required_label(label)?;
                self.emit(Instruction::Jump {
                    target: format!("{label}.continue"),
                });
                Ok(())
            }
            Stmt::Goto(target) => {
                self.emit(Instruction::Jump {
                    target: target.clone(),
                });
                Ok(())
            }
            Stmt::Labeled { name, stmt } => {
                self.emit(Instruction::Label { name: name.clone() });
                self.translate_stmt(stmt)
            }
        }
    }

    fn translate_local_decl(&mut self, decl: &Declaration) -> Result<(), SemanticError> {
        let Declaration::Var(var) = decl else {
            return Ok(());
        };
        // Statics and externs live in the symbol table; only automatic
        // variables with initializers produce instructions.
        if var.storage != StorageClass::None {
            return Ok(());
        }
        for declarator in &var.declarators {
            if declarator.init.is_some() {
                self.translate_declarator_init(declarator)?;
            }
        }
        Ok(())
    }

    fn translate_declarator_init(
        &mut self,
        declarator: &InitDeclarator,
    ) -> Result<(), SemanticError> {
        let init = declarator.init.as_ref().expect("checked by caller");
        match &declarator.ty {
            Type::Array { .. } | Type::Struct { .. } | Type::Union { .. } => {
                self.translate_aggregate_init(&declarator.name, &declarator.ty, 0, init)
            }
            _ => {
                let InitializerKind::Single(expr) = &init.kind else {
                    return Err(SemanticError::ScalarFromCompound);
                };
                let val = self.translate_expr(expr)?;
                self.emit(Instruction::Copy {
                    src: val,
                    dst: Val::Var(declarator.name.clone()),
                });
                Ok(())
            }
        }
    }

    /// Initialize part of an aggregate at a byte offset within `base`.
    fn translate_aggregate_init(
        &mut self,
        base: &str,
        ty: &Type,
        offset: i64,
        init: &Initializer,
    ) -> Result<(), SemanticError> {
        match (&init.kind, ty) {
            (InitializerKind::Single(expr), Type::Array { element, .. }) => {
                // A string literal initializing a character array copies
                // its bytes, then zero-fills the remainder.
                let ExprKind::Literal(Literal::String(bytes)) = &expr.kind else {
                    return Err(SemanticError::ArrayFromScalar);
                };
                let len = array_len(ty)?;
                let elem_size = size_of(element, self.types)?;
                for (i, &b) in bytes.iter().enumerate() {
                    self.emit(Instruction::CopyToOffset {
                        src: Val::Constant(Constant::Char(b as i8)),
                        dst: base.to_owned(),
                        offset: offset + i as i64 * elem_size,
                    });
                }
                for i in bytes.len() as i64..len {
                    self.emit(Instruction::CopyToOffset {
                        src: Val::Constant(Constant::Char(0)),
                        dst: base.to_owned(),
                        offset: offset + i * elem_size,
                    });
                }
                Ok(())
            }
            (InitializerKind::Compound(items), Type::Array { element, .. }) => {
                let elem_size = size_of(element, self.types)?;
                for (i, item) in items.iter().enumerate() {
                    self.translate_element_init(
                        base,
                        element,
                        offset + i as i64 * elem_size,
                        &item.init,
                    )?;
                }
                Ok(())
            }
            (InitializerKind::Compound(items), Type::Struct { tag, .. })
            | (InitializerKind::Compound(items), Type::Union { tag, .. }) => {
                let fields = self.types.find(tag)?.fields.clone();
                for (item, field) in items.iter().zip(&fields) {
                    self.translate_element_init(
                        base,
                        &field.ty,
                        offset + field.offset,
                        &item.init,
                    )?;
                }
                Ok(())
            }
            _ => Err(SemanticError::ArrayFromScalar),
        }
    }

    fn translate_element_init(
        &mut self,
        base: &str,
        ty: &Type,
        offset: i64,
        init: &Initializer,
    ) -> Result<(), SemanticError> {
        match ty {
            Type::Array { .. } | Type::Struct { .. } | Type::Union { .. } => {
                self.translate_aggregate_init(base, ty, offset, init)
            }
            _ => {
                let InitializerKind::Single(expr) = &init.kind else {
                    return Err(SemanticError::ScalarFromCompound);
                };
                let val = self.translate_expr(expr)?;
                self.emit(Instruction::CopyToOffset {
                    src: val,
                    dst: base.to_owned(),
                    offset,
                });
                Ok(())
            }
        }
    }
}

fn scalar_size(ty: &Type) -> i64 {
    match ty {
        Type::Char | Type::SChar | Type::UChar => 1,
        Type::Int | Type::UInt => 4,
        _ => 8,
    }
}

/// The type a compound-assignment operation is performed in.
fn compound_op_type(op: BinaryOp, lhs: &Type, rhs: &Type) -> Type {
    match op {
        BinaryOp::ShiftLeft | BinaryOp::ShiftRight => {
            if matches!(lhs, Type::Char | Type::SChar | Type::UChar) {
                Type::Int
            } else {
                lhs.clone()
            }
        }
        // The type checker already converted the right-hand side to the
        // common type of the operation.
        _ => rhs.clone(),
    }
}

fn tac_binary_op(op: BinaryOp) -> Result<TacBinaryOp, SemanticError> {
    Ok(match op {
        BinaryOp::Add => TacBinaryOp::Add,
        BinaryOp::Subtract => TacBinaryOp::Subtract,
        BinaryOp::Multiply => TacBinaryOp::Multiply,
        BinaryOp::Divide => TacBinaryOp::Divide,
        BinaryOp::Remainder => TacBinaryOp::Remainder,
        BinaryOp::Equal => TacBinaryOp::Equal,
        BinaryOp::NotEqual => TacBinaryOp::NotEqual,
        BinaryOp::LessThan => TacBinaryOp::LessThan,
        BinaryOp::LessOrEqual => TacBinaryOp::LessOrEqual,
        BinaryOp::GreaterThan => TacBinaryOp::GreaterThan,
        BinaryOp::GreaterOrEqual => TacBinaryOp::GreaterOrEqual,
        BinaryOp::BitAnd => TacBinaryOp::BitwiseAnd,
        BinaryOp::BitOr => TacBinaryOp::BitwiseOr,
        BinaryOp::BitXor => TacBinaryOp::BitwiseXor,
        BinaryOp::ShiftLeft => TacBinaryOp::LeftShift,
        BinaryOp::ShiftRight => TacBinaryOp::RightShift,
        BinaryOp::And | BinaryOp::Or => {
            return Err(SemanticError::InvalidOperands("logical operator"));
        }
    })
}

fn required_label(label: &Option<String>) -> Result<&str, SemanticError> {
    label
        .as_deref()
        .ok_or(SemanticError::BreakOutside)
}
