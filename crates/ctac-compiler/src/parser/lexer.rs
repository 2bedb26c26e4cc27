//! Scanner for preprocessed C source.
//!
//! Produces span-based tokens; text is sliced from the source on demand.
//! GNU linemarkers (`# <num> "<file>" …`) and comments are skipped as
//! trivia. Escape sequences in character and string constants are decoded
//! by the helpers at the bottom, which the parser calls when it needs the
//! value.

use logos::Logos;
use std::ops::Range;

use super::ParseError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\x0b\x0c]+")]
#[logos(skip(r"#[^\n]*", allow_greedy = true))]
#[logos(skip(r"//[^\n]*", allow_greedy = true))]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum TokenKind {
    // Keywords
    #[token("void")]
    KwVoid,
    #[token("char")]
    KwChar,
    #[token("short")]
    KwShort,
    #[token("int")]
    KwInt,
    #[token("long")]
    KwLong,
    #[token("float")]
    KwFloat,
    #[token("double")]
    KwDouble,
    #[token("signed")]
    KwSigned,
    #[token("unsigned")]
    KwUnsigned,
    #[token("_Bool")]
    KwBool,
    #[token("_Complex")]
    KwComplex,
    #[token("_Imaginary")]
    KwImaginary,
    #[token("struct")]
    KwStruct,
    #[token("union")]
    KwUnion,
    #[token("enum")]
    KwEnum,
    #[token("typedef")]
    KwTypedef,
    #[token("extern")]
    KwExtern,
    #[token("static")]
    KwStatic,
    #[token("auto")]
    KwAuto,
    #[token("register")]
    KwRegister,
    #[token("const")]
    KwConst,
    #[token("volatile")]
    KwVolatile,
    #[token("restrict")]
    KwRestrict,
    #[token("inline")]
    KwInline,
    #[token("_Noreturn")]
    KwNoreturn,
    #[token("_Atomic")]
    KwAtomic,
    #[token("_Alignas")]
    KwAlignas,
    #[token("_Alignof")]
    KwAlignof,
    #[token("_Generic")]
    KwGeneric,
    #[token("_Static_assert")]
    KwStaticAssert,
    #[token("_Thread_local")]
    KwThreadLocal,
    #[token("sizeof")]
    KwSizeof,
    #[token("return")]
    KwReturn,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,
    #[token("while")]
    KwWhile,
    #[token("do")]
    KwDo,
    #[token("for")]
    KwFor,
    #[token("break")]
    KwBreak,
    #[token("continue")]
    KwContinue,
    #[token("goto")]
    KwGoto,
    #[token("switch")]
    KwSwitch,
    #[token("case")]
    KwCase,
    #[token("default")]
    KwDefault,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"0[xX][0-9a-fA-F]+[uUlL]*|0[0-7]*[uUlL]*|[1-9][0-9]*[uUlL]*")]
    IntConst,
    #[regex(r"([0-9]+\.[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?[fFlL]?|[0-9]+[eE][+-]?[0-9]+[fFlL]?")]
    FloatConst,
    #[regex(r"'(\\.|[^'\\\n])+'")]
    CharConst,
    #[regex(r#""(\\.|[^"\\\n])*""#)]
    StringLit,

    // Punctuators
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("&")]
    Amp,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("^")]
    Caret,
    #[token("|")]
    Pipe,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token("&=")]
    AmpEq,
    #[token("^=")]
    CaretEq,
    #[token("|=")]
    PipeEq,
    #[token("...")]
    Ellipsis,
}

/// Token: kind plus byte span into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Tokenize a whole translation unit.
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    while let Some(result) = lexer.next() {
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                span: lexer.span(),
            }),
            Err(()) => return Err(ParseError::UnexpectedChar(lexer.span().start)),
        }
    }
    Ok(tokens)
}

/// Slice the source text of a token.
pub fn token_text<'src>(source: &'src str, token: &Token) -> &'src str {
    &source[token.span.clone()]
}

/// Integer constant value and suffix flags.
pub struct IntValue {
    pub value: u64,
    pub is_unsigned: bool,
    pub is_long: bool,
}

/// Parse an integer constant (decimal, octal, hex) with `u`/`l` suffixes.
pub fn parse_int_const(text: &str) -> Result<IntValue, ParseError> {
    let digits_end = text
        .find(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L'))
        .unwrap_or(text.len());
    // Hex constants also contain letters, but never u-suffix letters before
    // the suffix, so scan from the end instead for 0x forms.
    let (digits, suffix) = if text.starts_with("0x") || text.starts_with("0X") {
        let end = text
            .rfind(|c: char| c.is_ascii_hexdigit())
            .map(|i| i + 1)
            .unwrap_or(text.len());
        (&text[..end], &text[end..])
    } else {
        (&text[..digits_end], &text[digits_end..])
    };

    let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else if digits.len() > 1 && digits.starts_with('0') {
        u64::from_str_radix(&digits[1..], 8)
    } else {
        digits.parse::<u64>()
    }
    .map_err(|_| ParseError::InvalidConstant {
        what: "integer",
        text: text.to_owned(),
    })?;

    Ok(IntValue {
        value,
        is_unsigned: suffix.contains(['u', 'U']),
        is_long: suffix.contains(['l', 'L']),
    })
}

/// Parse a floating constant, ignoring any `f`/`l` suffix.
pub fn parse_float_const(text: &str) -> Result<f64, ParseError> {
    let digits = text.trim_end_matches(['f', 'F', 'l', 'L']);
    digits.parse::<f64>().map_err(|_| ParseError::InvalidConstant {
        what: "floating",
        text: text.to_owned(),
    })
}

/// Decode a character constant (including its quotes) to its value.
pub fn parse_char_const(text: &str) -> Result<i8, ParseError> {
    let inner = &text[1..text.len() - 1];
    let bytes = unescape(inner).ok_or_else(|| ParseError::InvalidConstant {
        what: "character",
        text: text.to_owned(),
    })?;
    match bytes.as_slice() {
        [b] => Ok(*b as i8),
        _ => Err(ParseError::InvalidConstant {
            what: "character",
            text: text.to_owned(),
        }),
    }
}

/// Decode a string literal (including its quotes) to its bytes.
pub fn parse_string_lit(text: &str) -> Result<Vec<u8>, ParseError> {
    let inner = &text[1..text.len() - 1];
    unescape(inner).ok_or_else(|| ParseError::InvalidConstant {
        what: "string",
        text: text.to_owned(),
    })
}

fn unescape(s: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len());
    let mut bytes = s.bytes().peekable();
    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next()? {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'v' => out.push(0x0b),
            d @ b'0'..=b'7' => {
                // Up to three octal digits; the first was just consumed.
                let mut value = (d - b'0') as u32;
                for _ in 0..2 {
                    match bytes.peek() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + (*d - b'0') as u32;
                            bytes.next();
                        }
                        _ => break,
                    }
                }
                out.push(value as u8);
            }
            b'x' => {
                let mut value: u32 = 0;
                let mut seen = false;
                while let Some(d) = bytes.peek() {
                    if d.is_ascii_hexdigit() {
                        value = value * 16 + (*d as char).to_digit(16)?;
                        bytes.next();
                        seen = true;
                    } else {
                        break;
                    }
                }
                if !seen {
                    return None;
                }
                out.push(value as u8);
            }
            b'\\' => out.push(b'\\'),
            b'\'' => out.push(b'\''),
            b'"' => out.push(b'"'),
            b'?' => out.push(b'?'),
            _ => return None,
        }
    }
    Some(out)
}
