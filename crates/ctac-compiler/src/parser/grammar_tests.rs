use super::ParseError;
use super::ast::{
    BinaryOp, BlockItem, Declaration, ExprKind, ExternalDecl, InitializerKind, Literal, Stmt,
    StorageClass, Type,
};
use super::grammar::Parser;

fn parse(source: &str) -> Vec<ExternalDecl> {
    Parser::new(source)
        .expect("lexes")
        .parse_all()
        .expect("parses")
}

fn parse_err(source: &str) -> ParseError {
    Parser::new(source)
        .and_then(|mut p| p.parse_all())
        .expect_err("should fail to parse")
}

fn only_var(decls: &[ExternalDecl]) -> &super::ast::VarDecl {
    match decls {
        [ExternalDecl::Declaration(Declaration::Var(var))] => var,
        other => panic!("expected a single variable declaration, got {other:?}"),
    }
}

#[test]
fn scalar_declaration_with_initializer() {
    let decls = parse("int x = 42;");
    let var = only_var(&decls);
    assert_eq!(var.storage, StorageClass::None);
    assert_eq!(var.declarators.len(), 1);
    let d = &var.declarators[0];
    assert_eq!(d.name, "x");
    assert_eq!(d.ty.to_string(), "int");
    let init = d.init.as_ref().expect("initializer");
    let InitializerKind::Single(expr) = &init.kind else {
        panic!("expected single initializer");
    };
    assert_eq!(expr.kind, ExprKind::Literal(Literal::Int(42)));
}

#[test]
fn declarator_precedence() {
    let decls = parse("int *a[3];");
    assert_eq!(only_var(&decls).declarators[0].ty.to_string(), "array(ptr(int), 3)");

    let decls = parse("int (*b)[3];");
    assert_eq!(only_var(&decls).declarators[0].ty.to_string(), "ptr(array(int, 3))");

    let decls = parse("char **argv;");
    assert_eq!(only_var(&decls).declarators[0].ty.to_string(), "ptr(ptr(char))");
}

#[test]
fn specifier_combinations() {
    let decls = parse("unsigned long a; signed char b; long int c; unsigned d;");
    let types: Vec<String> = decls
        .iter()
        .map(|d| match d {
            ExternalDecl::Declaration(Declaration::Var(v)) => {
                v.declarators[0].ty.to_string()
            }
            other => panic!("unexpected declaration {other:?}"),
        })
        .collect();
    assert_eq!(types, vec!["ulong", "schar", "long", "uint"]);
}

#[test]
fn function_definition() {
    let decls = parse("int main(void) { return 0; }");
    let [ExternalDecl::Function(fd)] = decls.as_slice() else {
        panic!("expected one function");
    };
    assert_eq!(fd.name, "main");
    assert_eq!(fd.ty.to_string(), "fun() -> int");
    let body = fd.body.as_ref().expect("definition");
    assert_eq!(body.len(), 1);
    assert!(matches!(body[0], BlockItem::Stmt(Stmt::Return(Some(_)))));
}

#[test]
fn function_prototype_has_no_body() {
    let decls = parse("int add(int a, double b);");
    let [ExternalDecl::Function(fd)] = decls.as_slice() else {
        panic!("expected one function");
    };
    assert_eq!(fd.name, "add");
    assert_eq!(fd.ty.to_string(), "fun(int, double) -> int");
    assert!(fd.body.is_none());
}

#[test]
fn variadic_prototype() {
    let decls = parse("int printf(char *fmt, ...);");
    let [ExternalDecl::Function(fd)] = decls.as_slice() else {
        panic!("expected one function");
    };
    assert_eq!(fd.ty.to_string(), "fun(ptr(char), ...) -> int");
}

#[test]
fn struct_definition_splits_from_declarator() {
    let decls = parse("struct S { int x; } s;");
    assert_eq!(decls.len(), 2);
    let ExternalDecl::Declaration(Declaration::Empty(empty)) = &decls[0] else {
        panic!("expected the tag declaration first");
    };
    let Type::Struct { tag, fields: Some(fields) } = &empty.ty else {
        panic!("expected a struct definition");
    };
    assert_eq!(tag, "S");
    assert_eq!(fields.len(), 1);

    let ExternalDecl::Declaration(Declaration::Var(var)) = &decls[1] else {
        panic!("expected the variable declaration second");
    };
    assert_eq!(var.declarators[0].ty.to_string(), "struct S");
}

#[test]
fn typedef_expands_during_parsing() {
    let decls = parse("typedef unsigned long size; size n;");
    let var = only_var(&decls);
    assert_eq!(var.declarators[0].name, "n");
    assert_eq!(var.declarators[0].ty.to_string(), "ulong");
}

#[test]
fn typedef_name_scoping() {
    // The typedef declared inside the function leaves scope at the brace,
    // so the outer `T` keeps meaning the variable afterwards.
    let decls = parse("int T; int main(void) { typedef int T; T x; return x; }");
    assert_eq!(decls.len(), 2);
    let ExternalDecl::Function(fd) = &decls[1] else {
        panic!("expected function");
    };
    let body = fd.body.as_ref().unwrap();
    // Two items survive: the declaration of x and the return.
    assert_eq!(body.len(), 2);
}

#[test]
fn enum_constants_get_values() {
    let decls = parse("enum Color { RED, GREEN = 5, BLUE }; int c = BLUE;");
    assert_eq!(decls.len(), 2);
    let ExternalDecl::Declaration(Declaration::Var(var)) = &decls[1] else {
        panic!("expected variable declaration");
    };
    let init = var.declarators[0].init.as_ref().unwrap();
    let InitializerKind::Single(expr) = &init.kind else {
        panic!("expected single initializer");
    };
    assert_eq!(
        expr.kind,
        ExprKind::Literal(Literal::Enum {
            name: "BLUE".into(),
            value: 6,
        })
    );
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let decls = parse("int x = 1 + 2 * 3;");
    let var = only_var(&decls);
    let InitializerKind::Single(expr) = &var.declarators[0].init.as_ref().unwrap().kind else {
        panic!("expected single initializer");
    };
    let ExprKind::Binary { op: BinaryOp::Add, right, .. } = &expr.kind else {
        panic!("expected addition at the top");
    };
    assert!(matches!(
        right.kind,
        ExprKind::Binary { op: BinaryOp::Multiply, .. }
    ));
}

#[test]
fn cast_versus_parenthesized_expression() {
    let decls = parse("typedef int T; int y = (T) 1; int z = (y) + 1;");
    assert_eq!(decls.len(), 2);
    let ExternalDecl::Declaration(Declaration::Var(y)) = &decls[0] else {
        panic!("expected y");
    };
    let InitializerKind::Single(expr) = &y.declarators[0].init.as_ref().unwrap().kind else {
        panic!("expected single initializer");
    };
    assert!(matches!(expr.kind, ExprKind::Cast { .. }));

    let ExternalDecl::Declaration(Declaration::Var(z)) = &decls[1] else {
        panic!("expected z");
    };
    let InitializerKind::Single(expr) = &z.declarators[0].init.as_ref().unwrap().kind else {
        panic!("expected single initializer");
    };
    assert!(matches!(expr.kind, ExprKind::Binary { .. }));
}

#[test]
fn sizeof_type_and_expression() {
    let decls = parse("int a = sizeof(long); int b = sizeof a;");
    let ExternalDecl::Declaration(Declaration::Var(a)) = &decls[0] else {
        panic!();
    };
    let InitializerKind::Single(expr) = &a.declarators[0].init.as_ref().unwrap().kind else {
        panic!();
    };
    assert!(matches!(expr.kind, ExprKind::SizeOfType(Type::Long)));

    let ExternalDecl::Declaration(Declaration::Var(b)) = &decls[1] else {
        panic!();
    };
    let InitializerKind::Single(expr) = &b.declarators[0].init.as_ref().unwrap().kind else {
        panic!();
    };
    assert!(matches!(expr.kind, ExprKind::SizeOfExpr(_)));
}

#[test]
fn adjacent_string_literals_concatenate() {
    let decls = parse(r#"char *s = "ab" "cd";"#);
    let var = only_var(&decls);
    let InitializerKind::Single(expr) = &var.declarators[0].init.as_ref().unwrap().kind else {
        panic!();
    };
    assert_eq!(expr.kind, ExprKind::Literal(Literal::String(b"abcd".to_vec())));
}

#[test]
fn designated_initializers_parse() {
    let decls = parse("int a[3] = { [0] = 1, 2 };");
    let var = only_var(&decls);
    let InitializerKind::Compound(items) = &var.declarators[0].init.as_ref().unwrap().kind
    else {
        panic!("expected compound initializer");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].designators.len(), 1);
    assert!(items[1].designators.is_empty());
}

#[test]
fn prefix_increment_desugars_to_compound_assignment() {
    let decls = parse("int main(void) { int i; ++i; return i; }");
    let ExternalDecl::Function(fd) = &decls[0] else { panic!() };
    let body = fd.body.as_ref().unwrap();
    let BlockItem::Stmt(Stmt::Expr(expr)) = &body[1] else {
        panic!("expected expression statement");
    };
    assert!(matches!(
        expr.kind,
        ExprKind::Assign { op: Some(BinaryOp::Add), .. }
    ));
}

#[test]
fn statements_parse() {
    let decls = parse(
        "int main(void) {
            int i;
            for (i = 0; i < 10; i = i + 1) { continue; }
            while (i) { break; }
            do { i = i - 1; } while (i > 0);
            switch (i) { case 1: return 1; default: return 0; }
        }",
    );
    let ExternalDecl::Function(fd) = &decls[0] else { panic!() };
    let body = fd.body.as_ref().unwrap();
    assert_eq!(body.len(), 5);
}

#[test]
fn bitfields_are_rejected() {
    assert_eq!(
        parse_err("struct S { int x : 3; };"),
        ParseError::Unsupported("bit-field members")
    );
}

#[test]
fn alignas_is_rejected() {
    assert_eq!(
        parse_err("_Alignas(8) int x;"),
        ParseError::Unsupported("_Alignas specifiers")
    );
}

#[test]
fn missing_type_specifier_is_rejected() {
    assert!(matches!(
        parse_err("x = 1;"),
        ParseError::MissingTypeSpecifier | ParseError::UnexpectedToken { .. }
    ));
}
