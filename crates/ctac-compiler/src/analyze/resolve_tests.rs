use super::SemanticError;
use super::resolve;
use super::symbol_table::SymbolTable;
use super::type_table::TypeTable;
use super::typecheck;
use crate::parser::Parser;
use crate::parser::ast::ExternalDecl;

/// Run the resolver and type checker over a whole translation unit,
/// declaration by declaration, the way the driver does.
fn analyze(source: &str) -> Result<(Vec<ExternalDecl>, SymbolTable, TypeTable), SemanticError> {
    let mut parser = Parser::new(source).expect("lexes");
    let mut symbols = SymbolTable::new();
    let mut types = TypeTable::new();
    let mut decls = Vec::new();
    loop {
        let Some(decl) = parser.next_external_decl().expect("parses") else {
            break;
        };
        resolve::resolve(&decl, &mut symbols, &mut types)?;
        decls.push(typecheck::typecheck(decl, &mut symbols, &mut types)?);
    }
    Ok((decls, symbols, types))
}

fn analyze_err(source: &str) -> SemanticError {
    analyze(source).expect_err("analysis should fail")
}

#[test]
fn undeclared_variable_is_fatal() {
    assert_eq!(
        analyze_err("int main(void) { return x; }"),
        SemanticError::UndeclaredVariable("x".into())
    );
}

#[test]
fn undeclared_function_is_fatal() {
    assert_eq!(
        analyze_err("int main(void) { return f(); }"),
        SemanticError::UndeclaredFunction("f".into())
    );
}

#[test]
fn undeclared_structure_is_fatal() {
    assert_eq!(
        analyze_err("struct S *p;"),
        SemanticError::UndeclaredStructure("S".into())
    );
}

#[test]
fn duplicate_local_declaration_is_fatal() {
    assert_eq!(
        analyze_err("int main(void) { int x; int x; return 0; }"),
        SemanticError::DuplicateVariable("x".into())
    );
}

#[test]
fn shadowing_is_rejected() {
    assert_eq!(
        analyze_err("int main(void) { int x; { int x; } return 0; }"),
        SemanticError::DuplicateVariable("x".into())
    );
}

#[test]
fn function_redeclaration_then_definition_is_fine() {
    let (_, symbols, _) = analyze("int f(void); int f(void) { return 1; }").unwrap();
    let sym = symbols.get("f").unwrap();
    assert!(matches!(
        sym.kind,
        super::symbol_table::SymbolKind::Function { defined: true, global: true }
    ));
}

#[test]
fn struct_layout_is_built_by_the_resolver() {
    let (_, _, types) = analyze("struct Point { int x; double y; };").unwrap();
    let def = types.find("Point").unwrap();
    assert_eq!(def.alignment, 8);
    assert_eq!(def.size, 16);
    assert_eq!(def.fields.len(), 2);
    assert_eq!(def.fields[0].name, "x");
    assert_eq!(def.fields[0].offset, 0);
    assert_eq!(def.fields[1].name, "y");
    assert_eq!(def.fields[1].offset, 8);
}

#[test]
fn union_members_share_offset_zero() {
    let (_, _, types) = analyze("union U { long a; char b; };").unwrap();
    let def = types.find("U").unwrap();
    assert!(def.fields.iter().all(|f| f.offset == 0));
    assert_eq!(def.alignment, 8);
    assert_eq!(def.size, 8);
}

#[test]
fn redeclared_structure_is_fatal() {
    let err = analyze_err("struct S { int x; }; struct S { int y; };");
    assert_eq!(err, SemanticError::RedeclaredStructure("S".into()));
    assert_eq!(err.to_string(), "Re-declared structure type S");
}

#[test]
fn duplicate_member_is_fatal() {
    assert_eq!(
        analyze_err("struct S { int x; int x; };"),
        SemanticError::DuplicateMember {
            tag: "S".into(),
            member: "x".into(),
        }
    );
}

#[test]
fn function_typed_member_is_fatal() {
    assert_eq!(
        analyze_err("struct S { int f(void); };"),
        SemanticError::MemberFunctionType
    );
}

#[test]
fn incomplete_member_is_fatal() {
    assert_eq!(
        analyze_err("struct S { void v; };"),
        SemanticError::MemberIncomplete
    );
}

#[test]
fn self_referential_pointer_member_is_allowed() {
    let (_, _, types) = analyze("struct Node { int value; struct Node *next; };").unwrap();
    let def = types.find("Node").unwrap();
    assert_eq!(def.size, 16);
    assert_eq!(def.fields[1].offset, 8);
}

#[test]
fn direct_self_member_is_incomplete() {
    assert_eq!(
        analyze_err("struct S { struct S inner; };"),
        SemanticError::MemberIncomplete
    );
}

#[test]
fn locals_leave_the_table_with_their_scope() {
    let mut parser = Parser::new("int main(void) { int x; return x; }").unwrap();
    let mut symbols = SymbolTable::new();
    let mut types = TypeTable::new();
    let decl = parser.next_external_decl().unwrap().unwrap();
    resolve::resolve(&decl, &mut symbols, &mut types).unwrap();

    // Resolution closed every scope: the local is gone, the function stays.
    assert!(symbols.get_opt("x").is_none());
    assert!(symbols.get_opt("main").is_some());
}

#[test]
fn failing_static_assert_is_fatal() {
    assert_eq!(
        analyze_err(r#"_Static_assert(0, "impossible");"#),
        SemanticError::StaticAssertFailed
    );
}

#[test]
fn passing_static_assert_is_silent() {
    assert!(analyze(r#"_Static_assert(1, "fine");"#).is_ok());
}
