//! Pure helpers over `Type`: layout queries, classification predicates,
//! and the usual arithmetic conversions.

use super::SemanticError;
use super::type_table::TypeTable;
use crate::parser::ast::{Expr, ExprKind, Literal, Type};

/// Size of a type in bytes.
///
/// `void` and function types have no size; incomplete structs fail the
/// table lookup.
pub fn size_of(ty: &Type, types: &TypeTable) -> Result<i64, SemanticError> {
    match ty {
        Type::Char | Type::SChar | Type::UChar => Ok(1),
        Type::Int | Type::UInt => Ok(4),
        Type::Long | Type::ULong | Type::Double | Type::Pointer { .. } => Ok(8),
        Type::Array { element, .. } => Ok(array_len(ty)? * size_of(element, types)?),
        Type::Struct { tag, .. } | Type::Union { tag, .. } => Ok(types.find(tag)?.size),
        other => Err(SemanticError::NoSize(other.to_string())),
    }
}

/// Alignment of a type in bytes; arrays align as their element does.
pub fn alignment_of(ty: &Type, types: &TypeTable) -> Result<i64, SemanticError> {
    match ty {
        Type::Char | Type::SChar | Type::UChar => Ok(1),
        Type::Int | Type::UInt => Ok(4),
        Type::Long | Type::ULong | Type::Double | Type::Pointer { .. } => Ok(8),
        Type::Array { element, .. } => alignment_of(element, types),
        Type::Struct { tag, .. } | Type::Union { tag, .. } => Ok(types.find(tag)?.alignment),
        other => Err(SemanticError::NoAlignment(other.to_string())),
    }
}

/// Number of elements of an array type; the size expression must have been
/// reduced to an integer literal.
pub fn array_len(ty: &Type) -> Result<i64, SemanticError> {
    let Type::Array { size, .. } = ty else {
        return Err(SemanticError::ArraySizeMissing);
    };
    let Some(size) = size else {
        return Err(SemanticError::ArraySizeMissing);
    };
    literal_int(size).ok_or(SemanticError::ArraySizeNotLiteral)
}

fn literal_int(expr: &Expr) -> Option<i64> {
    match &expr.kind {
        ExprKind::Literal(Literal::Int(v)) | ExprKind::Literal(Literal::Long(v)) => Some(*v),
        ExprKind::Literal(Literal::UInt(v)) | ExprKind::Literal(Literal::ULong(v)) => {
            Some(*v as i64)
        }
        ExprKind::Literal(Literal::Char(v)) => Some(*v as i64),
        ExprKind::Literal(Literal::Enum { value, .. }) => Some(*value),
        _ => None,
    }
}

/// False for `void` and for struct/union tags without a completed layout.
pub fn is_complete(ty: &Type, types: &TypeTable) -> bool {
    match ty {
        Type::Void => false,
        Type::Struct { tag, .. } | Type::Union { tag, .. } => types.exists(tag),
        _ => true,
    }
}

pub fn is_pointer(ty: &Type) -> bool {
    matches!(ty, Type::Pointer { .. })
}

pub fn is_complete_pointer(ty: &Type, types: &TypeTable) -> bool {
    match ty {
        Type::Pointer { target, .. } => is_complete(target, types),
        _ => false,
    }
}

pub fn is_integer(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Char | Type::SChar | Type::UChar | Type::Int | Type::UInt | Type::Long | Type::ULong
    )
}

pub fn is_character(ty: &Type) -> bool {
    matches!(ty, Type::Char | Type::SChar | Type::UChar)
}

pub fn is_arithmetic(ty: &Type) -> bool {
    is_integer(ty) || matches!(ty, Type::Double)
}

pub fn is_scalar(ty: &Type) -> bool {
    is_arithmetic(ty) || is_pointer(ty)
}

pub fn is_array(ty: &Type) -> bool {
    matches!(ty, Type::Array { .. })
}

/// Signedness of an integral (or pointer) type; fatal otherwise.
pub fn is_signed(ty: &Type) -> Result<bool, SemanticError> {
    match ty {
        Type::Int | Type::Long | Type::Char | Type::SChar => Ok(true),
        Type::UInt | Type::ULong | Type::UChar | Type::Pointer { .. } => Ok(false),
        other => Err(SemanticError::SignednessNonIntegral(other.to_string())),
    }
}

fn arithmetic_size(ty: &Type) -> i64 {
    match ty {
        Type::Char | Type::SChar | Type::UChar => 1,
        Type::Int | Type::UInt => 4,
        _ => 8,
    }
}

/// Usual arithmetic conversions: characters promote to `int`; matching
/// kinds stand; `double` wins; equal sizes prefer the unsigned operand;
/// otherwise the larger type wins.
pub fn common_type(t1: &Type, t2: &Type) -> Result<Type, SemanticError> {
    let t1 = if is_character(t1) { &Type::Int } else { t1 };
    let t2 = if is_character(t2) { &Type::Int } else { t2 };
    if same_kind(t1, t2) {
        return Ok(t1.clone());
    }
    if matches!(t1, Type::Double) || matches!(t2, Type::Double) {
        return Ok(Type::Double);
    }
    let (s1, s2) = (arithmetic_size(t1), arithmetic_size(t2));
    if s1 == s2 {
        return Ok(if is_signed(t1)? { t2.clone() } else { t1.clone() });
    }
    Ok(if s1 > s2 { t1.clone() } else { t2.clone() })
}

/// Shallow kind equality: top-level variants match, and for pointers the
/// pointee variants match as well.
pub fn same_kind(t1: &Type, t2: &Type) -> bool {
    match (t1, t2) {
        (Type::Pointer { target: a, .. }, Type::Pointer { target: b, .. }) => {
            std::mem::discriminant(a.as_ref()) == std::mem::discriminant(b.as_ref())
        }
        _ => std::mem::discriminant(t1) == std::mem::discriminant(t2),
    }
}

/// Lay out the members of a struct or union definition.
///
/// Returns `(alignment, size, fields)`. Struct members are placed at the
/// running size rounded up to their alignment; union members all sit at
/// offset 0, the running size tracking the last member. The total size is
/// rounded up to the overall alignment.
pub fn compute_layout(
    members: &[crate::parser::ast::Field],
    is_union: bool,
    types: &TypeTable,
) -> Result<(i64, i64, Vec<super::type_table::FieldDef>), SemanticError> {
    let mut fields = Vec::with_capacity(members.len());
    let mut current_size = 0i64;
    let mut current_alignment = 1i64;
    for member in members {
        let member_alignment = alignment_of(&member.ty, types)?;
        let offset = if is_union {
            0
        } else {
            round_away_from_zero(member_alignment, current_size)
        };
        fields.push(super::type_table::FieldDef {
            name: member.name.clone(),
            ty: member.ty.clone(),
            offset,
        });
        current_alignment = current_alignment.max(member_alignment);
        current_size = offset + size_of(&member.ty, types)?;
    }
    let size = round_away_from_zero(current_alignment, current_size);
    Ok((current_alignment, size, fields))
}

/// Smallest multiple of `alignment` no closer to zero than `size`, with
/// the sign of `size`.
pub fn round_away_from_zero(alignment: i64, size: i64) -> i64 {
    if size % alignment == 0 {
        return size;
    }
    if size < 0 {
        size - alignment - (size % alignment)
    } else {
        size + alignment - (size % alignment)
    }
}
