use super::SemanticError;
use super::type_table::{FieldDef, TypeTable};
use crate::parser::ast::Type;

fn point_fields() -> Vec<FieldDef> {
    vec![
        FieldDef {
            name: "x".into(),
            ty: Type::Int,
            offset: 0,
        },
        FieldDef {
            name: "y".into(),
            ty: Type::Double,
            offset: 8,
        },
    ]
}

#[test]
fn add_and_find() {
    let mut table = TypeTable::new();
    table.add_struct("Point", 8, 16, point_fields(), 0);

    let def = table.find("Point").unwrap();
    assert_eq!(def.tag, "Point");
    assert_eq!(def.alignment, 8);
    assert_eq!(def.size, 16);
    assert_eq!(def.fields.len(), 2);
    assert_eq!(def.field("y").unwrap().offset, 8);
    assert!(def.field("z").is_none());
}

#[test]
fn exists_and_missing_lookup() {
    let mut table = TypeTable::new();
    assert!(!table.exists("S"));
    table.add_struct("S", 4, 4, vec![], 0);
    assert!(table.exists("S"));

    let err = table.find("T").unwrap_err();
    assert_eq!(err, SemanticError::UndeclaredStructure("T".into()));
    assert_eq!(err.to_string(), "Undeclared structure type T");
}

#[test]
fn purge_respects_levels() {
    let mut table = TypeTable::new();
    table.add_struct("File", 4, 4, vec![], 0);
    table.add_struct("Block", 4, 4, vec![], 2);

    table.purge(1);
    assert!(table.exists("File"));
    assert!(!table.exists("Block"));
}

#[test]
fn dump_renders_layout() {
    let mut table = TypeTable::new();
    table.add_struct("Point", 8, 16, point_fields(), 0);
    let dump = table.dump();
    assert!(dump.contains("struct Point: size 16 bytes, alignment 8"));
    assert!(dump.contains("field x: offset 0"));
    assert!(dump.contains("field y: offset 8"));
}
