//! Lowering of syntactic initializers to flat static-initializer records.
//!
//! Produces a list in strictly ascending offset order. Padding between
//! struct members and trailing unfilled space become `Zero` records; the
//! walk itself does not coalesce adjacent zeros.

use ctac_tac::{Constant, StaticInit};

use super::SemanticError;
use super::const_convert::{const_convert, literal_constant};
use super::symbol_table::SymbolTable;
use super::type_table::TypeTable;
use super::types::{array_len, is_arithmetic, is_character, size_of};
use crate::parser::ast::{ExprKind, Initializer, InitializerKind, Literal, Type};

/// True for an integer literal comparing equal to zero.
pub fn is_zero_int(lit: &Literal) -> bool {
    matches!(
        lit,
        Literal::Int(0) | Literal::Long(0) | Literal::UInt(0) | Literal::ULong(0)
            | Literal::Char(0)
    )
}

fn constant_record(c: Constant) -> StaticInit {
    match c {
        Constant::Char(v) => StaticInit::Char(v),
        Constant::UChar(v) => StaticInit::UChar(v),
        Constant::Int(v) => StaticInit::Int(v),
        Constant::UInt(v) => StaticInit::UInt(v),
        Constant::Long(v) => StaticInit::Long(v),
        Constant::ULong(v) => StaticInit::ULong(v),
        Constant::Double(v) => StaticInit::Double(v),
    }
}

/// Convert a literal to an init record of exactly the target type.
fn record_from_literal(target: &Type, lit: &Literal) -> Result<StaticInit, SemanticError> {
    let c = literal_constant(lit)
        .ok_or_else(|| SemanticError::InvalidStaticInitializer(target.to_string()))?;
    Ok(constant_record(const_convert(target, c)?))
}

/// Lower an initializer for `target` into flat records.
///
/// A missing initializer produces a single `Zero` covering the whole
/// object.
pub fn to_static_init(
    target: &Type,
    init: Option<&Initializer>,
    symbols: &mut SymbolTable,
    types: &TypeTable,
) -> Result<Vec<StaticInit>, SemanticError> {
    let mut out = Vec::new();
    static_init_helper(target, init, symbols, types, &mut out)?;
    Ok(out)
}

fn static_init_helper(
    target: &Type,
    init: Option<&Initializer>,
    symbols: &mut SymbolTable,
    types: &TypeTable,
    out: &mut Vec<StaticInit>,
) -> Result<(), SemanticError> {
    let Some(init) = init else {
        out.push(StaticInit::Zero(size_of(target, types)? as u64));
        return Ok(());
    };

    // Array initialized by a string literal.
    if let (Type::Array { element, .. }, InitializerKind::Single(expr)) = (target, &init.kind)
        && let ExprKind::Literal(Literal::String(bytes)) = &expr.kind
    {
        if !is_character(element) {
            return Err(SemanticError::StringIntoNonCharArray);
        }
        let len = bytes.len() as i64;
        let array_size = array_len(target)?;
        if array_size < len + 1 {
            return Err(SemanticError::TooManyChars);
        }
        out.push(StaticInit::String {
            bytes: bytes.clone(),
            null_terminated: array_size >= len + 1,
        });
        if array_size > len + 1 {
            let remainder = (array_size - (len + 1)) * size_of(element, types)?;
            out.push(StaticInit::Zero(remainder as u64));
        }
        return Ok(());
    }

    if matches!(target, Type::Array { .. }) && matches!(init.kind, InitializerKind::Single(_)) {
        return Err(SemanticError::ArrayFromScalar);
    }

    // Pointer initialized by a string literal: intern the string and point
    // at the generated constant.
    if let (Type::Pointer { target: pointee, .. }, InitializerKind::Single(expr)) =
        (target, &init.kind)
        && let ExprKind::Literal(Literal::String(bytes)) = &expr.kind
    {
        if !matches!(pointee.as_ref(), Type::Char) {
            return Err(SemanticError::StringIntoWrongPointer);
        }
        let label = symbols.add_string_literal(bytes);
        out.push(StaticInit::Pointer(label));
        return Ok(());
    }

    // Pointer initialized by the name of an array variable: the array
    // decays to its address, recorded as a pointer to the symbol.
    if let (Type::Pointer { target: pointee, .. }, InitializerKind::Single(expr)) =
        (target, &init.kind)
        && let ExprKind::Var(name) = &expr.kind
    {
        let symbol = symbols.get(name)?;
        let Some(Type::Array { element, .. }) = &symbol.ty else {
            return Err(SemanticError::InvalidStaticInitializer(target.to_string()));
        };
        if std::mem::discriminant(pointee.as_ref()) != std::mem::discriminant(element.as_ref()) {
            return Err(SemanticError::InvalidStaticInitializer(target.to_string()));
        }
        out.push(StaticInit::Pointer(name.clone()));
        return Ok(());
    }

    if let InitializerKind::Single(expr) = &init.kind {
        let lit = match &expr.kind {
            ExprKind::Literal(lit) => lit,
            // Implicit conversions inserted by the type checker do not
            // change the literal's value; look through them.
            ExprKind::Cast { expr: inner, .. } => match &inner.kind {
                ExprKind::Literal(lit) => lit,
                _ => return Err(SemanticError::InvalidStaticInitializer(target.to_string())),
            },
            _ => return Err(SemanticError::InvalidStaticInitializer(target.to_string())),
        };
        if is_zero_int(lit) {
            out.push(StaticInit::Zero(size_of(target, types)? as u64));
            return Ok(());
        }
        if !is_arithmetic(target) {
            return Err(SemanticError::InvalidStaticInitializer(target.to_string()));
        }
        out.push(record_from_literal(target, lit)?);
        return Ok(());
    }

    // Struct initialized by a compound initializer: members and items walk
    // in parallel, padding the gaps.
    if let (Type::Struct { tag, .. }, InitializerKind::Compound(items)) = (target, &init.kind) {
        let entry = types.find(tag)?.clone();
        let mut current_offset = 0i64;
        let mut members = entry.fields.iter();
        for item in items {
            let Some(member) = members.next() else {
                return Err(SemanticError::TooManyStructInitializers);
            };
            if current_offset < member.offset {
                out.push(StaticInit::Zero((member.offset - current_offset) as u64));
            }
            static_init_helper(&member.ty, Some(&item.init), symbols, types, out)?;
            current_offset = member.offset + size_of(&member.ty, types)?;
        }
        if current_offset < entry.size {
            out.push(StaticInit::Zero((entry.size - current_offset) as u64));
        }
        return Ok(());
    }

    if let (Type::Array { element, .. }, InitializerKind::Compound(items)) = (target, &init.kind) {
        let array_size = array_len(target)?;
        if items.len() as i64 > array_size {
            return Err(SemanticError::TooManyStaticInitializers);
        }
        for item in items {
            static_init_helper(element, Some(&item.init), symbols, types, out)?;
        }
        let missing = array_size - items.len() as i64;
        if missing > 0 {
            out.push(StaticInit::Zero((missing * size_of(element, types)?) as u64));
        }
        return Ok(());
    }

    Err(SemanticError::InvalidStaticInitializer(target.to_string()))
}
