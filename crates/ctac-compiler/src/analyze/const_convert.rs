//! Constant conversion between arithmetic types.
//!
//! Conversions go through a canonical signed 64-bit pivot: signed sources
//! sign-extend, unsigned sources zero-extend, doubles truncate, and the
//! result wraps modulo the target width. Two cases bypass the pivot
//! because the round-trip would lose range: `ulong` to `double` and
//! `double` to `ulong`.

use ctac_tac::Constant;

use super::SemanticError;
use crate::parser::ast::{Literal, Type};

/// The natural constant for a scanned literal.
///
/// String literals have no constant form; callers handle them separately.
pub fn literal_constant(lit: &Literal) -> Option<Constant> {
    match lit {
        Literal::Int(v) => Some(Constant::Int(*v as i32)),
        Literal::UInt(v) => Some(Constant::UInt(*v as u32)),
        Literal::Long(v) => Some(Constant::Long(*v)),
        Literal::ULong(v) => Some(Constant::ULong(*v)),
        Literal::Char(v) => Some(Constant::Char(*v)),
        Literal::Float(v) => Some(Constant::Double(*v)),
        Literal::Enum { value, .. } => Some(Constant::Int(*value as i32)),
        Literal::String(_) => None,
    }
}

fn kind_matches(target: &Type, c: Constant) -> bool {
    matches!(
        (target, c),
        (Type::SChar, Constant::Char(_))
            | (Type::UChar, Constant::UChar(_))
            | (Type::Int, Constant::Int(_))
            | (Type::Long, Constant::Long(_))
            | (Type::UInt, Constant::UInt(_))
            | (Type::ULong, Constant::ULong(_))
            | (Type::Double, Constant::Double(_))
    )
}

fn to_i64(c: Constant) -> i64 {
    match c {
        Constant::Char(v) => v as i64,
        Constant::UChar(v) => v as i64,
        Constant::Int(v) => v as i64,
        Constant::Long(v) => v,
        Constant::UInt(v) => v as i64,
        Constant::ULong(v) => v as i64,
        Constant::Double(v) => v as i64,
    }
}

fn of_i64(value: i64, target: &Type) -> Result<Constant, SemanticError> {
    match target {
        Type::Char | Type::SChar => Ok(Constant::Char(value as i8)),
        Type::UChar => Ok(Constant::UChar(value as u8)),
        Type::Int => Ok(Constant::Int(value as i32)),
        Type::Long => Ok(Constant::Long(value)),
        Type::UInt => Ok(Constant::UInt(value as u32)),
        Type::ULong | Type::Pointer { .. } => Ok(Constant::ULong(value as u64)),
        Type::Double => Ok(Constant::Double(value as f64)),
        other => Err(SemanticError::ConstConvertNonScalar(other.to_string())),
    }
}

/// Convert a constant to the given arithmetic (or pointer) target type.
pub fn const_convert(target: &Type, c: Constant) -> Result<Constant, SemanticError> {
    if kind_matches(target, c) {
        return Ok(c);
    }
    if matches!(target, Type::Double)
        && let Constant::ULong(v) = c
    {
        return Ok(Constant::Double(v as f64));
    }
    if matches!(target, Type::ULong)
        && let Constant::Double(v) = c
    {
        return Ok(Constant::ULong(v as u64));
    }
    of_i64(to_i64(c), target)
}
