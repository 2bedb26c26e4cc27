//! End-to-end scenarios over the whole pipeline: parse, resolve,
//! type-check, label, translate, emit.

use ctac_tac::{StaticInit, TopLevel};
use indoc::indoc;

use crate::analyze::symbol_table::{InitState, SymbolKind};
use crate::parser::ast::{
    BlockItem, Expr, ExprKind, ExternalDecl, FunctionDecl, Stmt, Type,
};
use crate::{Error, SemanticError, compile_source};

fn function<'a>(decls: &'a [ExternalDecl], name: &str) -> &'a FunctionDecl {
    decls
        .iter()
        .find_map(|d| match d {
            ExternalDecl::Function(fd) if fd.name == name => Some(fd),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no function {name}"))
}

fn return_expr<'a>(fd: &'a FunctionDecl) -> &'a Expr {
    fd.body
        .as_ref()
        .expect("definition")
        .iter()
        .find_map(|item| match item {
            BlockItem::Stmt(Stmt::Return(Some(expr))) => Some(expr),
            _ => None,
        })
        .expect("return expression")
}

/// Every expression reachable from a statement tree carries a type.
fn assert_all_typed(fd: &FunctionDecl) {
    fn check_expr(expr: &Expr) {
        assert!(expr.ty.is_some(), "untyped expression: {expr:?}");
        match &expr.kind {
            ExprKind::Unary { expr, .. }
            | ExprKind::PostIncrement(expr)
            | ExprKind::PostDecrement(expr)
            | ExprKind::SizeOfExpr(expr)
            | ExprKind::FieldAccess { expr, .. }
            | ExprKind::PtrAccess { expr, .. }
            | ExprKind::Cast { expr, .. } => check_expr(expr),
            ExprKind::Binary { left, right, .. }
            | ExprKind::Subscript { left, right } => {
                check_expr(left);
                check_expr(right);
            }
            ExprKind::Assign { target, value, .. } => {
                check_expr(target);
                check_expr(value);
            }
            ExprKind::Conditional { condition, then_expr, else_expr } => {
                check_expr(condition);
                check_expr(then_expr);
                check_expr(else_expr);
            }
            ExprKind::Call { args, .. } => args.iter().for_each(check_expr),
            _ => {}
        }
    }
    fn check_stmt(stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) | Stmt::Return(Some(expr)) => check_expr(expr),
            Stmt::Compound(items) => check_items(items),
            Stmt::If { condition, then_stmt, else_stmt } => {
                check_expr(condition);
                check_stmt(then_stmt);
                if let Some(else_stmt) = else_stmt {
                    check_stmt(else_stmt);
                }
            }
            Stmt::While { condition, body, .. }
            | Stmt::DoWhile { condition, body, .. }
            | Stmt::Switch { condition, body, .. } => {
                check_expr(condition);
                check_stmt(body);
            }
            Stmt::For { condition, update, body, .. } => {
                if let Some(condition) = condition {
                    check_expr(condition);
                }
                if let Some(update) = update {
                    check_expr(update);
                }
                check_stmt(body);
            }
            Stmt::Labeled { stmt, .. }
            | Stmt::Case { stmt, .. }
            | Stmt::Default { stmt, .. } => check_stmt(stmt),
            _ => {}
        }
    }
    fn check_items(items: &[BlockItem]) {
        for item in items {
            if let BlockItem::Stmt(stmt) = item {
                check_stmt(stmt);
            }
        }
    }
    check_items(fd.body.as_ref().expect("definition"));
}

#[test]
fn integer_global_and_function() {
    let out = compile_source("int x = 42; int main(void) { return x + 1; }").unwrap();

    let x = out.symbols.get("x").unwrap();
    assert_eq!(x.ty, Some(Type::Int));
    let SymbolKind::Static { global, init_state, init } = &x.kind else {
        panic!("expected static symbol");
    };
    assert!(*global);
    assert_eq!(*init_state, InitState::Initialized);
    assert_eq!(init, &vec![StaticInit::Int(42)]);

    let main = out.symbols.get("main").unwrap();
    assert_eq!(
        main.kind,
        SymbolKind::Function {
            global: true,
            defined: true,
        }
    );
    assert_eq!(main.ty.as_ref().unwrap().to_string(), "fun() -> int");

    let fd = function(&out.decls, "main");
    assert_all_typed(fd);
    let expr = return_expr(fd);
    assert_eq!(expr.ty().to_string(), "int");
    let ExprKind::Binary { left, right, .. } = &expr.kind else {
        panic!("expected addition");
    };
    assert_eq!(left.ty().to_string(), "int");
    assert_eq!(right.ty().to_string(), "int");
}

#[test]
fn struct_definition_instance_and_dot_access() {
    let out = compile_source(indoc! {"
        struct Point { int x; double y; };
        struct Point p = {1, 2.0};
        double get_y(void) { return p.y; }
    "})
    .unwrap();

    let def = out.types.find("Point").unwrap();
    assert_eq!(def.alignment, 8);
    assert_eq!(def.size, 16);
    assert_eq!(
        def.fields
            .iter()
            .map(|f| (f.name.as_str(), f.offset))
            .collect::<Vec<_>>(),
        vec![("x", 0), ("y", 8)]
    );

    let SymbolKind::Static { init, .. } = &out.symbols.get("p").unwrap().kind else {
        panic!("expected static symbol");
    };
    assert_eq!(
        init,
        &vec![
            StaticInit::Int(1),
            StaticInit::Zero(4),
            StaticInit::Double(2.0),
        ]
    );

    let fd = function(&out.decls, "get_y");
    assert_all_typed(fd);
    assert_eq!(return_expr(fd).ty().to_string(), "double");
}

#[test]
fn char_array_from_string_literal_and_subscript() {
    let out = compile_source(
        r#"char str[] = "hello"; int main(void) { return str[0]; }"#,
    )
    .unwrap();

    let str_sym = out.symbols.get("str").unwrap();
    assert_eq!(str_sym.ty.as_ref().unwrap().to_string(), "array(char, 6)");
    let SymbolKind::Static { init, .. } = &str_sym.kind else {
        panic!("expected static symbol");
    };
    assert_eq!(
        init,
        &vec![StaticInit::String {
            bytes: b"hello".to_vec(),
            null_terminated: true,
        }]
    );

    let fd = function(&out.decls, "main");
    assert_all_typed(fd);
    let ret = return_expr(fd);
    let ExprKind::Cast { expr: subscript, .. } = &ret.kind else {
        panic!("expected return conversion");
    };
    assert_eq!(subscript.ty().to_string(), "char");
    let ExprKind::Subscript { left, right } = &subscript.kind else {
        panic!("expected subscript");
    };
    // The array reference decayed, and the index was promoted to long.
    assert_eq!(left.ty().to_string(), "ptr(char)");
    assert_eq!(right.ty().to_string(), "long");
}

#[test]
fn array_decay_and_pointer_arithmetic() {
    let out = compile_source(indoc! {"
        int arr[5] = {1, 2, 3, 4, 5};
        int *ptr = arr;
        int main(void) { return *(ptr + 1); }
    "})
    .unwrap();

    let SymbolKind::Static { init, .. } = &out.symbols.get("ptr").unwrap().kind else {
        panic!("expected static symbol");
    };
    assert_eq!(init, &vec![StaticInit::Pointer("arr".into())]);

    let fd = function(&out.decls, "main");
    assert_all_typed(fd);
    let ret = return_expr(fd);
    assert_eq!(ret.ty().to_string(), "int");
    let ExprKind::Unary { expr: sum, .. } = &ret.kind else {
        panic!("expected dereference");
    };
    assert_eq!(sum.ty().to_string(), "ptr(int)");
    let ExprKind::Binary { right, .. } = &sum.kind else {
        panic!("expected pointer addition");
    };
    assert_eq!(right.ty().to_string(), "long");
}

#[test]
fn conditional_conversion_to_common_type() {
    let out = compile_source(indoc! {"
        int add(int a, double b) { return a + b; }
        int main(void) { return add(1, 2.0); }
    "})
    .unwrap();

    let add = function(&out.decls, "add");
    assert_all_typed(add);
    let ret = return_expr(add);
    let ExprKind::Cast { target, expr: sum } = &ret.kind else {
        panic!("expected cast back to the return type");
    };
    assert_eq!(target.to_string(), "int");
    assert_eq!(sum.ty().to_string(), "double");

    let main = function(&out.decls, "main");
    let call = return_expr(main);
    assert_eq!(call.ty().to_string(), "int");
    let ExprKind::Call { args, .. } = &call.kind else {
        panic!("expected call");
    };
    assert_eq!(args[0].ty().to_string(), "int");
    assert_eq!(args[1].ty().to_string(), "double");
}

#[test]
fn duplicate_struct_declaration_is_fatal() {
    let err = compile_source("struct S { int x; }; struct S { int y; };").unwrap_err();
    assert_eq!(
        err,
        Error::Semantic(SemanticError::RedeclaredStructure("S".into()))
    );
    assert_eq!(err.to_string(), "Re-declared structure type S");
}

#[test]
fn program_orders_functions_then_statics() {
    let out = compile_source(indoc! {"
        int x = 1;
        int main(void) { return x; }
    "})
    .unwrap();
    let names: Vec<&str> = out
        .program
        .iter()
        .map(|top| match top {
            TopLevel::Function { name, .. } => name.as_str(),
            TopLevel::StaticVariable { name, .. } => name.as_str(),
            TopLevel::StaticConstant { name, .. } => name.as_str(),
        })
        .collect();
    assert_eq!(names, vec!["main", "x"]);
}

#[test]
fn string_boundaries() {
    // M = N + 1: exact fit, null terminator included.
    let out = compile_source(r#"char a[3] = "ab";"#).unwrap();
    let SymbolKind::Static { init, .. } = &out.symbols.get("a").unwrap().kind else {
        panic!();
    };
    assert_eq!(
        init,
        &vec![StaticInit::String {
            bytes: b"ab".to_vec(),
            null_terminated: true,
        }]
    );

    // M > N + 1: trailing zero fill.
    let out = compile_source(r#"char b[5] = "ab";"#).unwrap();
    let SymbolKind::Static { init, .. } = &out.symbols.get("b").unwrap().kind else {
        panic!();
    };
    assert_eq!(
        init,
        &vec![
            StaticInit::String {
                bytes: b"ab".to_vec(),
                null_terminated: true,
            },
            StaticInit::Zero(2),
        ]
    );

    // M < N + 1: fatal.
    let err = compile_source(r#"char c[2] = "ab";"#).unwrap_err();
    assert_eq!(err, Error::Semantic(SemanticError::TooManyChars));
}
