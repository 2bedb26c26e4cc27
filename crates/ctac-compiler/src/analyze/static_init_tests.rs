use ctac_tac::StaticInit;

use super::SemanticError;
use super::resolve;
use super::symbol_table::{InitState, SymbolKind, SymbolTable};
use super::type_table::TypeTable;
use super::typecheck;
use crate::parser::Parser;

fn analyze(source: &str) -> Result<(SymbolTable, TypeTable), SemanticError> {
    let mut parser = Parser::new(source).expect("lexes");
    let mut symbols = SymbolTable::new();
    let mut types = TypeTable::new();
    loop {
        let Some(decl) = parser.next_external_decl().expect("parses") else {
            break;
        };
        resolve::resolve(&decl, &mut symbols, &mut types)?;
        typecheck::typecheck(decl, &mut symbols, &mut types)?;
    }
    Ok((symbols, types))
}

fn init_list(symbols: &SymbolTable, name: &str) -> Vec<StaticInit> {
    match &symbols.get(name).unwrap().kind {
        SymbolKind::Static { init_state: InitState::Initialized, init, .. } => init.clone(),
        other => panic!("expected initialized static, got {other:?}"),
    }
}

#[test]
fn integer_literal() {
    let (symbols, _) = analyze("int x = 42;").unwrap();
    assert_eq!(init_list(&symbols, "x"), vec![StaticInit::Int(42)]);
}

#[test]
fn zero_literal_collapses_to_zero_fill() {
    let (symbols, _) = analyze("int x = 0;").unwrap();
    assert_eq!(init_list(&symbols, "x"), vec![StaticInit::Zero(4)]);
}

#[test]
fn literal_converts_to_the_target_type() {
    let (symbols, _) = analyze("long l = 5; double d = 2.5; unsigned u = 7;").unwrap();
    assert_eq!(init_list(&symbols, "l"), vec![StaticInit::Long(5)]);
    assert_eq!(init_list(&symbols, "d"), vec![StaticInit::Double(2.5)]);
    assert_eq!(init_list(&symbols, "u"), vec![StaticInit::UInt(7)]);
}

#[test]
fn string_into_exact_array() {
    let (symbols, _) = analyze(r#"char s[6] = "hello";"#).unwrap();
    assert_eq!(
        init_list(&symbols, "s"),
        vec![StaticInit::String {
            bytes: b"hello".to_vec(),
            null_terminated: true,
        }]
    );
}

#[test]
fn string_into_larger_array_pads_with_zero() {
    let (symbols, _) = analyze(r#"char s[8] = "hello";"#).unwrap();
    assert_eq!(
        init_list(&symbols, "s"),
        vec![
            StaticInit::String {
                bytes: b"hello".to_vec(),
                null_terminated: true,
            },
            StaticInit::Zero(2),
        ]
    );
}

#[test]
fn string_into_smaller_array_is_fatal() {
    assert_eq!(
        analyze(r#"char s[5] = "hello";"#).unwrap_err(),
        SemanticError::TooManyChars
    );
}

#[test]
fn unsized_array_completes_from_the_string() {
    let (symbols, _) = analyze(r#"char s[] = "hello";"#).unwrap();
    let sym = symbols.get("s").unwrap();
    assert_eq!(sym.ty.as_ref().unwrap().to_string(), "array(char, 6)");
    assert_eq!(
        init_list(&symbols, "s"),
        vec![StaticInit::String {
            bytes: b"hello".to_vec(),
            null_terminated: true,
        }]
    );
}

#[test]
fn string_into_non_character_array_is_fatal() {
    assert_eq!(
        analyze(r#"int a[3] = "no";"#).unwrap_err(),
        SemanticError::StringIntoNonCharArray
    );
}

#[test]
fn char_pointer_interns_the_string() {
    let (symbols, _) = analyze(r#"char *s = "hi";"#).unwrap();
    assert_eq!(
        init_list(&symbols, "s"),
        vec![StaticInit::Pointer("_str0".into())]
    );

    let constant = symbols.get("_str0").unwrap();
    let SymbolKind::Constant { init } = &constant.kind else {
        panic!("expected interned constant");
    };
    assert_eq!(
        init,
        &StaticInit::String {
            bytes: b"hi".to_vec(),
            null_terminated: true,
        }
    );
}

#[test]
fn string_into_non_char_pointer_is_fatal() {
    assert_eq!(
        analyze(r#"int *p = "hi";"#).unwrap_err(),
        SemanticError::StringIntoWrongPointer
    );
}

#[test]
fn pointer_from_array_name_records_a_label() {
    let (symbols, _) =
        analyze("int arr[5] = {1, 2, 3, 4, 5}; int *ptr = arr;").unwrap();
    assert_eq!(
        init_list(&symbols, "ptr"),
        vec![StaticInit::Pointer("arr".into())]
    );
}

#[test]
fn array_compound_pads_missing_elements() {
    let (symbols, _) = analyze("int a[5] = {1, 2, 3};").unwrap();
    assert_eq!(
        init_list(&symbols, "a"),
        vec![
            StaticInit::Int(1),
            StaticInit::Int(2),
            StaticInit::Int(3),
            StaticInit::Zero(8),
        ]
    );
}

#[test]
fn too_many_array_elements_is_fatal() {
    assert_eq!(
        analyze("int a[2] = {1, 2, 3};").unwrap_err(),
        SemanticError::TooManyStaticInitializers
    );
}

#[test]
fn array_from_scalar_is_fatal() {
    assert_eq!(
        analyze("int a[2] = 1;").unwrap_err(),
        SemanticError::ArrayFromScalar
    );
}

#[test]
fn struct_initializer_pads_between_members() {
    let (symbols, _) = analyze(
        "struct Point { int x; double y; };
         struct Point p = {1, 2.0};",
    )
    .unwrap();
    assert_eq!(
        init_list(&symbols, "p"),
        vec![
            StaticInit::Int(1),
            StaticInit::Zero(4),
            StaticInit::Double(2.0),
        ]
    );
}

#[test]
fn struct_initializer_zero_fills_trailing_members() {
    let (symbols, _) = analyze(
        "struct Pair { int a; int b; };
         struct Pair p = {7};",
    )
    .unwrap();
    assert_eq!(
        init_list(&symbols, "p"),
        vec![StaticInit::Int(7), StaticInit::Zero(4)]
    );
}

#[test]
fn too_many_struct_elements_is_fatal() {
    assert_eq!(
        analyze("struct S { int a; }; struct S s = {1, 2};").unwrap_err(),
        SemanticError::TooManyStructInitializers
    );
}

#[test]
fn tentative_definitions_stay_tentative() {
    let (symbols, _) = analyze("int t;").unwrap();
    let SymbolKind::Static { init_state, .. } = &symbols.get("t").unwrap().kind else {
        panic!("expected static");
    };
    assert_eq!(*init_state, InitState::Tentative);
}

#[test]
fn extern_declarations_have_no_initializer_state() {
    let (symbols, _) = analyze("extern int e;").unwrap();
    let SymbolKind::Static { init_state, global, .. } = &symbols.get("e").unwrap().kind
    else {
        panic!("expected static");
    };
    assert_eq!(*init_state, InitState::None);
    assert!(*global);
}

#[test]
fn tentative_then_definition_merges_to_initialized() {
    let (symbols, _) = analyze("int x; int x = 3;").unwrap();
    assert_eq!(init_list(&symbols, "x"), vec![StaticInit::Int(3)]);
}

#[test]
fn two_definitions_conflict() {
    assert_eq!(
        analyze("int x = 1; int x = 2;").unwrap_err(),
        SemanticError::ConflictingDefinition
    );
}

#[test]
fn linkage_conflict_is_fatal() {
    assert_eq!(
        analyze("int x; static int x;").unwrap_err(),
        SemanticError::ConflictingLinkage
    );
}
