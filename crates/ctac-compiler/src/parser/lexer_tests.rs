use super::ParseError;
use super::lexer::{
    TokenKind, lex, parse_char_const, parse_float_const, parse_int_const, parse_string_lit,
};

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).expect("lexes").iter().map(|t| t.kind).collect()
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds("int x = 42;"),
        vec![
            TokenKind::KwInt,
            TokenKind::Ident,
            TokenKind::Eq,
            TokenKind::IntConst,
            TokenKind::Semi,
        ]
    );
}

#[test]
fn linemarkers_are_trivia() {
    let source = "# 1 \"prog.c\"\nint x;\n# 4 \"prog.c\" 2\nint y;\n";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::KwInt,
            TokenKind::Ident,
            TokenKind::Semi,
            TokenKind::KwInt,
            TokenKind::Ident,
            TokenKind::Semi,
        ]
    );
}

#[test]
fn comments_are_trivia() {
    assert_eq!(
        kinds("int /* a comment */ x; // trailing\n"),
        vec![TokenKind::KwInt, TokenKind::Ident, TokenKind::Semi]
    );
}

#[test]
fn multi_character_punctuators() {
    assert_eq!(
        kinds("a >>= b -> c ... ++"),
        vec![
            TokenKind::Ident,
            TokenKind::ShrEq,
            TokenKind::Ident,
            TokenKind::Arrow,
            TokenKind::Ident,
            TokenKind::Ellipsis,
            TokenKind::PlusPlus,
        ]
    );
}

#[test]
fn unexpected_character_reports_offset() {
    assert_eq!(lex("int @"), Err(ParseError::UnexpectedChar(4)));
}

#[test]
fn integer_constants() {
    let v = parse_int_const("42").unwrap();
    assert_eq!(v.value, 42);
    assert!(!v.is_unsigned);
    assert!(!v.is_long);

    let v = parse_int_const("0x2A").unwrap();
    assert_eq!(v.value, 42);

    let v = parse_int_const("052").unwrap();
    assert_eq!(v.value, 42);

    let v = parse_int_const("42ul").unwrap();
    assert_eq!(v.value, 42);
    assert!(v.is_unsigned);
    assert!(v.is_long);

    let v = parse_int_const("5000000000").unwrap();
    assert_eq!(v.value, 5_000_000_000);
}

#[test]
fn float_constants() {
    assert_eq!(parse_float_const("2.0").unwrap(), 2.0);
    assert_eq!(parse_float_const("1.5e2").unwrap(), 150.0);
    assert_eq!(parse_float_const(".5").unwrap(), 0.5);
    assert_eq!(parse_float_const("1.0f").unwrap(), 1.0);
}

#[test]
fn character_constants() {
    assert_eq!(parse_char_const("'A'").unwrap(), 65);
    assert_eq!(parse_char_const(r"'\n'").unwrap(), 10);
    assert_eq!(parse_char_const(r"'\0'").unwrap(), 0);
    assert_eq!(parse_char_const(r"'\x41'").unwrap(), 65);
    assert_eq!(parse_char_const(r"'\101'").unwrap(), 65);
}

#[test]
fn string_literals_decode_escapes() {
    assert_eq!(parse_string_lit(r#""hello""#).unwrap(), b"hello");
    assert_eq!(parse_string_lit(r#""a\tb""#).unwrap(), vec![b'a', 9, b'b']);
    assert_eq!(parse_string_lit(r#""\"q\"""#).unwrap(), b"\"q\"");
    assert_eq!(parse_string_lit(r#""""#).unwrap(), Vec::<u8>::new());
}
