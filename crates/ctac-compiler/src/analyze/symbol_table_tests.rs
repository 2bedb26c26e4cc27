use ctac_tac::StaticInit;

use super::SemanticError;
use super::symbol_table::{InitState, SymbolKind, SymbolTable};
use crate::parser::ast::Type;

#[test]
fn automatic_var_roundtrip() {
    let mut table = SymbolTable::new();
    table.add_automatic_var("x", Type::Int, 1);

    let sym = table.get("x").unwrap();
    assert_eq!(sym.name, "x");
    assert_eq!(sym.ty, Some(Type::Int));
    assert_eq!(sym.kind, SymbolKind::Local { has_linkage: false });
    assert!(!sym.has_linkage());
}

#[test]
fn linkage_local_has_no_type_yet() {
    let mut table = SymbolTable::new();
    table.add_automatic_var_with_linkage("x", true, 2);
    let sym = table.get("x").unwrap();
    assert_eq!(sym.ty, None);
    assert!(sym.has_linkage());
}

#[test]
fn static_var_and_linkage() {
    let mut table = SymbolTable::new();
    table.add_static_var(
        "g",
        Type::Int,
        true,
        InitState::Initialized,
        vec![StaticInit::Int(42)],
    );
    table.add_static_var("s", Type::Int, false, InitState::Tentative, Vec::new());

    assert!(table.is_global("g"));
    assert!(!table.is_global("s"));
    assert!(!table.is_global("missing"));

    let SymbolKind::Static { init_state, init, .. } = &table.get("g").unwrap().kind else {
        panic!("expected a static symbol");
    };
    assert_eq!(*init_state, InitState::Initialized);
    assert_eq!(init, &vec![StaticInit::Int(42)]);
}

#[test]
fn function_symbols() {
    let mut table = SymbolTable::new();
    let fun_ty = Type::Function {
        return_type: Box::new(Type::Int),
        params: vec![],
        variadic: false,
    };
    table.add_function("main", fun_ty, true, true);
    assert!(table.is_global("main"));
    assert!(table.get("main").unwrap().has_linkage());
}

#[test]
fn replacement_is_unconditional() {
    let mut table = SymbolTable::new();
    table.add_automatic_var("x", Type::Int, 1);
    table.add_automatic_var("x", Type::Double, 2);
    assert_eq!(table.get("x").unwrap().ty, Some(Type::Double));
    assert_eq!(table.len(), 1);
}

#[test]
fn string_literal_names_are_stable() {
    let mut table = SymbolTable::new();
    assert_eq!(table.add_string_literal(b"hello"), "_str0");
    assert_eq!(table.add_string_literal(b"world"), "_str1");

    let sym = table.get("_str0").unwrap();
    assert_eq!(sym.ty.as_ref().unwrap().to_string(), "array(char, 6)");
    let SymbolKind::Constant { init } = &sym.kind else {
        panic!("expected a constant symbol");
    };
    assert_eq!(
        init,
        &StaticInit::String {
            bytes: b"hello".to_vec(),
            null_terminated: true,
        }
    );
}

#[test]
fn purge_drops_scope_locals_only() {
    let mut table = SymbolTable::new();
    table.add_static_var("g", Type::Int, true, InitState::Tentative, Vec::new());
    table.add_automatic_var("a", Type::Int, 1);
    table.add_automatic_var("b", Type::Int, 2);

    table.purge(1);
    assert!(table.get_opt("g").is_some());
    assert!(table.get_opt("a").is_some());
    assert!(table.get_opt("b").is_none());

    table.purge(0);
    assert!(table.get_opt("g").is_some());
    assert!(table.get_opt("a").is_none());
}

#[test]
fn missing_symbol_is_fatal() {
    let table = SymbolTable::new();
    let err = table.get("ghost").unwrap_err();
    assert_eq!(err, SemanticError::SymbolNotFound("ghost".into()));
    assert_eq!(err.to_string(), "Symbol 'ghost' not found");
}

#[test]
fn dump_renders_symbols() {
    let mut table = SymbolTable::new();
    table.add_static_var(
        "x",
        Type::Int,
        true,
        InitState::Initialized,
        vec![StaticInit::Int(42)],
    );
    let dump = table.dump();
    assert!(dump.contains("x: static_var global initialized"));
    assert!(dump.contains("Int(42)"));
}
