use super::type_table::TypeTable;
use super::types::{
    alignment_of, common_type, compute_layout, is_arithmetic, is_complete, is_scalar, is_signed,
    round_away_from_zero, size_of,
};
use crate::parser::ast::{Expr, ExprKind, Field, Literal, Type};

fn array_of(element: Type, len: i64) -> Type {
    Type::Array {
        element: Box::new(element),
        size: Some(Box::new(Expr::new(ExprKind::Literal(Literal::Int(len))))),
        qualifiers: Default::default(),
        is_static: false,
    }
}

fn ptr_to(target: Type) -> Type {
    Type::Pointer {
        target: Box::new(target),
        qualifiers: Default::default(),
    }
}

#[test]
fn scalar_sizes() {
    let table = TypeTable::new();
    assert_eq!(size_of(&Type::Char, &table).unwrap(), 1);
    assert_eq!(size_of(&Type::UChar, &table).unwrap(), 1);
    assert_eq!(size_of(&Type::Int, &table).unwrap(), 4);
    assert_eq!(size_of(&Type::UInt, &table).unwrap(), 4);
    assert_eq!(size_of(&Type::Long, &table).unwrap(), 8);
    assert_eq!(size_of(&Type::Double, &table).unwrap(), 8);
    assert_eq!(size_of(&ptr_to(Type::Void), &table).unwrap(), 8);
}

#[test]
fn array_size_multiplies_element_size() {
    let table = TypeTable::new();
    assert_eq!(size_of(&array_of(Type::Int, 5), &table).unwrap(), 20);
    assert_eq!(
        size_of(&array_of(array_of(Type::Char, 3), 4), &table).unwrap(),
        12
    );
}

#[test]
fn void_and_function_have_no_size() {
    let table = TypeTable::new();
    assert!(size_of(&Type::Void, &table).is_err());
    let fun = Type::Function {
        return_type: Box::new(Type::Int),
        params: vec![],
        variadic: false,
    };
    assert!(size_of(&fun, &table).is_err());
}

#[test]
fn array_alignment_is_element_alignment() {
    let table = TypeTable::new();
    assert_eq!(alignment_of(&array_of(Type::Double, 2), &table).unwrap(), 8);
    assert_eq!(alignment_of(&array_of(Type::Char, 16), &table).unwrap(), 1);
}

#[test]
fn completeness() {
    let table = TypeTable::new();
    assert!(!is_complete(&Type::Void, &table));
    assert!(is_complete(&Type::Int, &table));
    let s = Type::Struct {
        tag: "S".into(),
        fields: None,
    };
    assert!(!is_complete(&s, &table));

    let mut table = TypeTable::new();
    table.add_struct("S", 4, 4, vec![], 0);
    assert!(is_complete(&s, &table));
}

#[test]
fn classification_predicates() {
    assert!(is_arithmetic(&Type::Char));
    assert!(is_arithmetic(&Type::Double));
    assert!(!is_arithmetic(&ptr_to(Type::Int)));
    assert!(is_scalar(&ptr_to(Type::Int)));
    assert!(!is_scalar(&Type::Void));
}

#[test]
fn signedness() {
    assert!(is_signed(&Type::Int).unwrap());
    assert!(is_signed(&Type::Char).unwrap());
    assert!(!is_signed(&Type::UInt).unwrap());
    assert!(!is_signed(&ptr_to(Type::Int)).unwrap());
    assert!(is_signed(&Type::Double).is_err());
    assert!(is_signed(&Type::Void).is_err());
}

#[test]
fn usual_arithmetic_conversions() {
    // Characters promote to int.
    assert_eq!(common_type(&Type::Char, &Type::Char).unwrap(), Type::Int);
    assert_eq!(common_type(&Type::SChar, &Type::Int).unwrap(), Type::Int);
    // Matching kinds stand.
    assert_eq!(common_type(&Type::Long, &Type::Long).unwrap(), Type::Long);
    // Double wins.
    assert_eq!(common_type(&Type::Int, &Type::Double).unwrap(), Type::Double);
    assert_eq!(common_type(&Type::Double, &Type::ULong).unwrap(), Type::Double);
    // Equal sizes prefer the unsigned operand.
    assert_eq!(common_type(&Type::Int, &Type::UInt).unwrap(), Type::UInt);
    assert_eq!(common_type(&Type::ULong, &Type::Long).unwrap(), Type::ULong);
    // Otherwise the larger type.
    assert_eq!(common_type(&Type::Int, &Type::Long).unwrap(), Type::Long);
    assert_eq!(common_type(&Type::UInt, &Type::Long).unwrap(), Type::Long);
}

#[test]
fn rounding_away_from_zero() {
    assert_eq!(round_away_from_zero(8, 0), 0);
    assert_eq!(round_away_from_zero(8, 4), 8);
    assert_eq!(round_away_from_zero(8, 8), 8);
    assert_eq!(round_away_from_zero(8, 12), 16);
    assert_eq!(round_away_from_zero(4, -2), -4);
}

#[test]
fn struct_layout_orders_and_pads() {
    let table = TypeTable::new();
    let members = vec![
        Field { name: "x".into(), ty: Type::Int },
        Field { name: "y".into(), ty: Type::Double },
        Field { name: "z".into(), ty: Type::Char },
    ];
    let (alignment, size, fields) = compute_layout(&members, false, &table).unwrap();
    assert_eq!(alignment, 8);
    let offsets: Vec<i64> = fields.iter().map(|f| f.offset).collect();
    assert_eq!(offsets, vec![0, 8, 16]);
    // 17 bytes of content round up to the 8-byte alignment.
    assert_eq!(size, 24);
}

#[test]
fn union_layout_overlaps_members() {
    let table = TypeTable::new();
    let members = vec![
        Field { name: "a".into(), ty: Type::Long },
        Field { name: "b".into(), ty: Type::Char },
    ];
    let (alignment, size, fields) = compute_layout(&members, true, &table).unwrap();
    assert_eq!(alignment, 8);
    assert!(fields.iter().all(|f| f.offset == 0));
    // The running size tracks the last member, rounded to the alignment.
    assert_eq!(size, 8);
}
