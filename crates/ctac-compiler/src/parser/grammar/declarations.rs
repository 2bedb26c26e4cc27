//! Declaration parsing: specifiers, declarators, struct/union/enum
//! specifiers, initializers, and typedef registration.

use super::Parser;
use crate::parser::ParseError;
use crate::parser::ast::{
    Declaration, EmptyDecl, Enumerator, Expr, ExprKind, ExternalDecl, Field, FunctionDecl,
    InitDeclarator, InitItem, Initializer, Literal, Param, Qualifiers, StorageClass, Type,
    UnaryOp, VarDecl,
};
use crate::parser::lexer::TokenKind;
use crate::parser::nametab::NameClass;

/// Declarator skeleton before the base type is applied.
pub(super) enum RawDeclarator {
    Name(Option<String>),
    Pointer {
        qualifiers: Qualifiers,
        inner: Box<RawDeclarator>,
    },
    Array {
        inner: Box<RawDeclarator>,
        size: Option<Expr>,
        qualifiers: Qualifiers,
        is_static: bool,
    },
    Function {
        inner: Box<RawDeclarator>,
        params: Vec<Param>,
        variadic: bool,
    },
}

/// Derive the declared name and full type from a declarator skeleton.
///
/// Works inside-out: each wrapper consumes the current base type, so
/// `int (*x)[3]` comes out as pointer-to-array while `int *x[3]` comes out
/// as array-of-pointers.
pub(super) fn apply_declarator(raw: RawDeclarator, base: Type) -> (Option<String>, Type) {
    match raw {
        RawDeclarator::Name(name) => (name, base),
        RawDeclarator::Pointer { qualifiers, inner } => apply_declarator(
            *inner,
            Type::Pointer {
                target: Box::new(base),
                qualifiers,
            },
        ),
        RawDeclarator::Array { inner, size, qualifiers, is_static } => apply_declarator(
            *inner,
            Type::Array {
                element: Box::new(base),
                size: size.map(Box::new),
                qualifiers,
                is_static,
            },
        ),
        RawDeclarator::Function { inner, params, variadic } => apply_declarator(
            *inner,
            Type::Function {
                return_type: Box::new(base),
                params,
                variadic,
            },
        ),
    }
}

impl Parser<'_> {
    /// Parse one external declaration and push the resulting declarations
    /// (possibly none, for a typedef) onto the pending queue.
    pub(super) fn parse_external_declaration(&mut self) -> Result<(), ParseError> {
        if self.at(TokenKind::KwStaticAssert) {
            let assert = self.parse_static_assert()?;
            self.push_external(Declaration::StaticAssert(assert));
            return Ok(());
        }

        let (storage, raw_ty) = self.parse_declaration_specifiers(true)?;
        if self.eat(TokenKind::Semi) {
            self.push_external(Declaration::Empty(EmptyDecl { ty: raw_ty }));
            return Ok(());
        }

        let base = match self.split_tag_definition(raw_ty) {
            (Some(empty), base) => {
                self.push_external(empty);
                base
            }
            (None, base) => base,
        };
        let first = self.parse_declarator()?;
        let (name, ty) = apply_declarator(first, base.clone());
        let name = name.ok_or_else(|| self.unexpected("declarator name"))?;

        if matches!(ty, Type::Function { .. }) && self.at(TokenKind::LBrace) {
            let body = self.parse_brace_items()?;
            self.pending.push_back(ExternalDecl::Function(FunctionDecl {
                name,
                ty,
                storage,
                body: Some(body),
            }));
            return Ok(());
        }

        let declarators = self.parse_init_declarator_rest(name, ty, &base)?;
        if storage == StorageClass::Typedef {
            for d in &declarators {
                self.register_typedef(&d.name, d.ty.clone());
            }
            return Ok(());
        }
        // Function-typed declarators are prototypes; they surface as
        // function declarations without a body.
        let mut vars = Vec::new();
        for d in declarators {
            if matches!(d.ty, Type::Function { .. }) {
                if d.init.is_some() {
                    return Err(ParseError::Unsupported("function initializers"));
                }
                self.pending.push_back(ExternalDecl::Function(FunctionDecl {
                    name: d.name,
                    ty: d.ty,
                    storage,
                    body: None,
                }));
            } else {
                vars.push(d);
            }
        }
        if !vars.is_empty() {
            self.push_external(Declaration::Var(VarDecl {
                storage,
                declarators: vars,
            }));
        }
        Ok(())
    }

    fn push_external(&mut self, decl: Declaration) {
        self.pending.push_back(ExternalDecl::Declaration(decl));
    }

    /// Parse one block-scope declaration, which may expand to several
    /// (a split tag definition plus the variable declaration).
    pub(super) fn parse_block_declaration(&mut self) -> Result<Vec<Declaration>, ParseError> {
        if self.at(TokenKind::KwStaticAssert) {
            let assert = self.parse_static_assert()?;
            return Ok(vec![Declaration::StaticAssert(assert)]);
        }

        let (storage, raw_ty) = self.parse_declaration_specifiers(true)?;
        let mut out = Vec::new();
        if self.eat(TokenKind::Semi) {
            out.push(Declaration::Empty(EmptyDecl { ty: raw_ty }));
            return Ok(out);
        }

        let base = match self.split_tag_definition(raw_ty) {
            (Some(empty), base) => {
                out.push(empty);
                base
            }
            (None, base) => base,
        };
        let first = self.parse_declarator()?;
        let (name, ty) = apply_declarator(first, base.clone());
        let name = name.ok_or_else(|| self.unexpected("declarator name"))?;
        let declarators = self.parse_init_declarator_rest(name, ty, &base)?;
        if storage == StorageClass::Typedef {
            for d in &declarators {
                self.register_typedef(&d.name, d.ty.clone());
            }
            return Ok(out);
        }
        out.push(Declaration::Var(VarDecl { storage, declarators }));
        Ok(out)
    }

    /// Finish an init-declarator list whose first declarator has been parsed.
    fn parse_init_declarator_rest(
        &mut self,
        first_name: String,
        first_ty: Type,
        base: &Type,
    ) -> Result<Vec<InitDeclarator>, ParseError> {
        let mut declarators = Vec::new();
        let mut current = InitDeclarator {
            name: first_name,
            ty: first_ty,
            init: None,
        };
        loop {
            if self.eat(TokenKind::Eq) {
                current.init = Some(self.parse_initializer()?);
            }
            declarators.push(current);
            if !self.eat(TokenKind::Comma) {
                break;
            }
            let raw = self.parse_declarator()?;
            let (name, ty) = apply_declarator(raw, base.clone());
            let name = name.ok_or_else(|| self.unexpected("declarator name"))?;
            current = InitDeclarator { name, ty, init: None };
        }
        self.expect(TokenKind::Semi)?;
        Ok(declarators)
    }

    fn register_typedef(&mut self, name: &str, ty: Type) {
        self.names.define(name, NameClass::TypedefName, self.depth);
        self.typedefs.insert(name, ty, self.depth);
    }

    /// Detach an inline tag definition from a base type: the definition is
    /// surfaced as a separate empty declaration, and declarators see the
    /// stripped reference type. Enums lower to `int` either way.
    fn split_tag_definition(&mut self, raw: Type) -> (Option<Declaration>, Type) {
        match raw {
            Type::Struct { tag, fields: Some(fields) } => (
                Some(Declaration::Empty(EmptyDecl {
                    ty: Type::Struct {
                        tag: tag.clone(),
                        fields: Some(fields),
                    },
                })),
                Type::Struct { tag, fields: None },
            ),
            Type::Union { tag, fields: Some(fields) } => (
                Some(Declaration::Empty(EmptyDecl {
                    ty: Type::Union {
                        tag: tag.clone(),
                        fields: Some(fields),
                    },
                })),
                Type::Union { tag, fields: None },
            ),
            Type::Enum { .. } => (None, Type::Int),
            other => (None, other),
        }
    }

    // ------------------------------------------------------------------
    // Specifiers
    // ------------------------------------------------------------------

    /// Parse declaration specifiers into a storage class and a base type.
    pub(super) fn parse_declaration_specifiers(
        &mut self,
        allow_storage: bool,
    ) -> Result<(StorageClass, Type), ParseError> {
        let mut storage = StorageClass::None;
        let mut qualifiers = Qualifiers::default();
        let mut tag_type: Option<Type> = None;

        let mut n_void = 0;
        let mut n_char = 0;
        let mut n_short = 0;
        let mut n_int = 0;
        let mut n_long = 0;
        let mut n_float = 0;
        let mut n_double = 0;
        let mut n_signed = 0;
        let mut n_unsigned = 0;
        let mut n_bool = 0;
        let mut n_complex = 0;
        let mut n_imaginary = 0;

        loop {
            let Some(kind) = self.peek() else { break };
            match kind {
                TokenKind::KwTypedef | TokenKind::KwExtern | TokenKind::KwStatic => {
                    if !allow_storage {
                        return Err(ParseError::InvalidSpecifiers);
                    }
                    storage = match kind {
                        TokenKind::KwTypedef => StorageClass::Typedef,
                        TokenKind::KwExtern => StorageClass::Extern,
                        _ => StorageClass::Static,
                    };
                    self.advance()?;
                }
                TokenKind::KwAuto
                | TokenKind::KwRegister
                | TokenKind::KwInline
                | TokenKind::KwNoreturn
                | TokenKind::KwThreadLocal => {
                    self.advance()?;
                }
                TokenKind::KwConst => {
                    qualifiers.is_const = true;
                    self.advance()?;
                }
                TokenKind::KwVolatile => {
                    qualifiers.is_volatile = true;
                    self.advance()?;
                }
                TokenKind::KwRestrict => {
                    qualifiers.is_restrict = true;
                    self.advance()?;
                }
                TokenKind::KwAlignas => return Err(ParseError::Unsupported("_Alignas specifiers")),
                TokenKind::KwAtomic => {
                    self.advance()?;
                    if self.eat(TokenKind::LParen) {
                        let inner = self.parse_type_name()?;
                        self.expect(TokenKind::RParen)?;
                        tag_type = Some(Type::Atomic(Box::new(inner)));
                    } else {
                        qualifiers.is_atomic = true;
                    }
                }
                TokenKind::KwVoid => {
                    n_void += 1;
                    self.advance()?;
                }
                TokenKind::KwChar => {
                    n_char += 1;
                    self.advance()?;
                }
                TokenKind::KwShort => {
                    n_short += 1;
                    self.advance()?;
                }
                TokenKind::KwInt => {
                    n_int += 1;
                    self.advance()?;
                }
                TokenKind::KwLong => {
                    n_long += 1;
                    self.advance()?;
                }
                TokenKind::KwFloat => {
                    n_float += 1;
                    self.advance()?;
                }
                TokenKind::KwDouble => {
                    n_double += 1;
                    self.advance()?;
                }
                TokenKind::KwSigned => {
                    n_signed += 1;
                    self.advance()?;
                }
                TokenKind::KwUnsigned => {
                    n_unsigned += 1;
                    self.advance()?;
                }
                TokenKind::KwBool => {
                    n_bool += 1;
                    self.advance()?;
                }
                TokenKind::KwComplex => {
                    n_complex += 1;
                    self.advance()?;
                }
                TokenKind::KwImaginary => {
                    n_imaginary += 1;
                    self.advance()?;
                }
                TokenKind::KwStruct | TokenKind::KwUnion => {
                    tag_type = Some(self.parse_struct_specifier()?);
                }
                TokenKind::KwEnum => {
                    tag_type = Some(self.parse_enum_specifier()?);
                }
                TokenKind::Ident => {
                    let has_specifier = tag_type.is_some()
                        || n_void + n_char + n_short + n_int + n_long + n_float + n_double
                            + n_signed + n_unsigned + n_bool + n_complex + n_imaginary
                            > 0;
                    let token = self.tokens[self.pos].clone();
                    let name = self.text(&token);
                    if !has_specifier
                        && self.names.find(name) == Some(NameClass::TypedefName)
                    {
                        let expanded = self
                            .typedefs
                            .get(name)
                            .cloned()
                            .ok_or(ParseError::MissingTypeSpecifier)?;
                        tag_type = Some(expanded);
                        self.advance()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }

        let keyword_count = n_void + n_char + n_short + n_int + n_long + n_float + n_double
            + n_signed + n_unsigned + n_bool + n_complex + n_imaginary;

        if let Some(ty) = tag_type {
            if keyword_count > 0 {
                return Err(ParseError::InvalidSpecifiers);
            }
            return Ok((storage, ty));
        }
        if keyword_count == 0 {
            return Err(ParseError::MissingTypeSpecifier);
        }

        let base = if n_void > 0 {
            Type::Void
        } else if n_bool > 0 {
            Type::Bool
        } else if n_char > 0 {
            if n_unsigned > 0 {
                Type::UChar
            } else if n_signed > 0 {
                Type::SChar
            } else {
                Type::Char
            }
        } else if n_double > 0 || n_float > 0 {
            let float_base = if n_double > 0 { Type::Double } else { Type::Float };
            if n_complex > 0 {
                Type::Complex(Box::new(float_base))
            } else if n_imaginary > 0 {
                Type::Imaginary(Box::new(float_base))
            } else {
                float_base
            }
        } else if n_short > 0 {
            Type::Short
        } else if n_long > 0 {
            if n_unsigned > 0 { Type::ULong } else { Type::Long }
        } else if n_unsigned > 0 {
            Type::UInt
        } else if n_int > 0 || n_signed > 0 {
            Type::Int
        } else {
            return Err(ParseError::InvalidSpecifiers);
        };
        Ok((storage, base))
    }

    fn parse_struct_specifier(&mut self) -> Result<Type, ParseError> {
        let keyword = self.advance()?;
        let is_union = keyword.kind == TokenKind::KwUnion;
        let tag = if self.at(TokenKind::Ident) {
            self.expect_ident()?
        } else {
            self.fresh_anon_tag()
        };

        let fields = if self.eat(TokenKind::LBrace) {
            let mut fields = Vec::new();
            while !self.eat(TokenKind::RBrace) {
                if self.at(TokenKind::KwStaticAssert) {
                    self.parse_static_assert()?;
                    continue;
                }
                let (_, raw) = self.parse_declaration_specifiers(false)?;
                if matches!(
                    raw,
                    Type::Struct { fields: Some(_), .. } | Type::Union { fields: Some(_), .. }
                ) {
                    return Err(ParseError::Unsupported("nested structure definitions"));
                }
                let base = match raw {
                    Type::Enum { .. } => Type::Int,
                    other => other,
                };
                loop {
                    if self.at(TokenKind::Colon) {
                        return Err(ParseError::Unsupported("bit-field members"));
                    }
                    let raw_d = self.parse_declarator()?;
                    let (name, ty) = apply_declarator(raw_d, base.clone());
                    if self.at(TokenKind::Colon) {
                        return Err(ParseError::Unsupported("bit-field members"));
                    }
                    let name = name.ok_or(ParseError::UnnamedMember)?;
                    fields.push(Field { name, ty });
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::Semi)?;
            }
            Some(fields)
        } else {
            None
        };

        Ok(if is_union {
            Type::Union { tag, fields }
        } else {
            Type::Struct { tag, fields }
        })
    }

    fn parse_enum_specifier(&mut self) -> Result<Type, ParseError> {
        self.advance()?; // enum
        let tag = if self.at(TokenKind::Ident) {
            self.expect_ident()?
        } else {
            self.fresh_anon_tag()
        };

        let enumerators = if self.eat(TokenKind::LBrace) {
            let mut list = Vec::new();
            let mut next = 0i64;
            loop {
                if self.eat(TokenKind::RBrace) {
                    break;
                }
                let name = self.expect_ident()?;
                if self.eat(TokenKind::Eq) {
                    let expr = self.parse_conditional_expr()?;
                    next = const_int_value(&expr).ok_or(ParseError::ExpectedConstant)?;
                }
                self.names
                    .define(&name, NameClass::EnumerationConstant, self.depth);
                self.enum_values.insert(&name, next, self.depth);
                list.push(Enumerator { name, value: next });
                next += 1;
                if !self.eat(TokenKind::Comma) {
                    self.expect(TokenKind::RBrace)?;
                    break;
                }
            }
            Some(list)
        } else {
            None
        };

        Ok(Type::Enum { tag, enumerators })
    }

    // ------------------------------------------------------------------
    // Declarators
    // ------------------------------------------------------------------

    pub(super) fn parse_declarator(&mut self) -> Result<RawDeclarator, ParseError> {
        if self.eat(TokenKind::Star) {
            let mut qualifiers = Qualifiers::default();
            loop {
                match self.peek() {
                    Some(TokenKind::KwConst) => qualifiers.is_const = true,
                    Some(TokenKind::KwVolatile) => qualifiers.is_volatile = true,
                    Some(TokenKind::KwRestrict) => qualifiers.is_restrict = true,
                    Some(TokenKind::KwAtomic) => qualifiers.is_atomic = true,
                    _ => break,
                }
                self.advance()?;
            }
            let inner = self.parse_declarator()?;
            return Ok(RawDeclarator::Pointer {
                qualifiers,
                inner: Box::new(inner),
            });
        }
        self.parse_direct_declarator()
    }

    fn parse_direct_declarator(&mut self) -> Result<RawDeclarator, ParseError> {
        let mut decl = match self.peek() {
            Some(TokenKind::Ident) => {
                let name = self.expect_ident()?;
                RawDeclarator::Name(Some(name))
            }
            Some(TokenKind::LParen) => {
                // `(` opens either a grouped declarator or the parameter
                // list of an omitted (abstract) name.
                if self.peek_nth(1) == Some(TokenKind::RParen) || self.starts_type_at(1) {
                    RawDeclarator::Name(None)
                } else {
                    self.advance()?;
                    let inner = self.parse_declarator()?;
                    self.expect(TokenKind::RParen)?;
                    inner
                }
            }
            _ => RawDeclarator::Name(None),
        };

        loop {
            if self.eat(TokenKind::LBracket) {
                let mut is_static = self.eat(TokenKind::KwStatic);
                let mut qualifiers = Qualifiers::default();
                loop {
                    match self.peek() {
                        Some(TokenKind::KwConst) => qualifiers.is_const = true,
                        Some(TokenKind::KwVolatile) => qualifiers.is_volatile = true,
                        Some(TokenKind::KwRestrict) => qualifiers.is_restrict = true,
                        Some(TokenKind::KwAtomic) => qualifiers.is_atomic = true,
                        _ => break,
                    }
                    self.advance()?;
                }
                is_static |= self.eat(TokenKind::KwStatic);
                if self.at(TokenKind::Star) && self.peek_nth(1) == Some(TokenKind::RBracket) {
                    return Err(ParseError::Unsupported("variable-length arrays"));
                }
                let size = if self.at(TokenKind::RBracket) {
                    None
                } else {
                    Some(self.parse_conditional_expr()?)
                };
                self.expect(TokenKind::RBracket)?;
                decl = RawDeclarator::Array {
                    inner: Box::new(decl),
                    size,
                    qualifiers,
                    is_static,
                };
            } else if self.eat(TokenKind::LParen) {
                let (params, variadic) = self.parse_param_list()?;
                decl = RawDeclarator::Function {
                    inner: Box::new(decl),
                    params,
                    variadic,
                };
            } else {
                break;
            }
        }
        Ok(decl)
    }

    /// Parse a parameter list; the opening parenthesis is already consumed.
    fn parse_param_list(&mut self) -> Result<(Vec<Param>, bool), ParseError> {
        if self.eat(TokenKind::RParen) {
            return Ok((Vec::new(), false));
        }
        if self.at(TokenKind::KwVoid) && self.peek_nth(1) == Some(TokenKind::RParen) {
            self.advance()?;
            self.advance()?;
            return Ok((Vec::new(), false));
        }

        let mut params = Vec::new();
        let mut variadic = false;
        loop {
            if self.eat(TokenKind::Ellipsis) {
                variadic = true;
                self.expect(TokenKind::RParen)?;
                break;
            }
            let (_, raw) = self.parse_declaration_specifiers(false)?;
            if matches!(
                raw,
                Type::Struct { fields: Some(_), .. } | Type::Union { fields: Some(_), .. }
            ) {
                return Err(ParseError::Unsupported("nested structure definitions"));
            }
            let base = match raw {
                Type::Enum { .. } => Type::Int,
                other => other,
            };
            let raw_d = self.parse_declarator()?;
            let (name, ty) = apply_declarator(raw_d, base);
            params.push(Param { name, ty });
            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RParen)?;
                break;
            }
        }
        Ok((params, variadic))
    }

    /// Parse a type-name (for casts, `sizeof`, `_Alignof`).
    pub(super) fn parse_type_name(&mut self) -> Result<Type, ParseError> {
        let (_, raw) = self.parse_declaration_specifiers(false)?;
        if matches!(
            raw,
            Type::Struct { fields: Some(_), .. } | Type::Union { fields: Some(_), .. }
        ) {
            return Err(ParseError::Unsupported("nested structure definitions"));
        }
        let base = match raw {
            Type::Enum { .. } => Type::Int,
            other => other,
        };
        let raw_d = self.parse_declarator()?;
        let (name, ty) = apply_declarator(raw_d, base);
        if name.is_some() {
            return Err(self.unexpected("abstract declarator"));
        }
        Ok(ty)
    }

    // ------------------------------------------------------------------
    // Initializers
    // ------------------------------------------------------------------

    pub(super) fn parse_initializer(&mut self) -> Result<Initializer, ParseError> {
        if !self.eat(TokenKind::LBrace) {
            return Ok(Initializer::single(self.parse_assignment_expr()?));
        }
        let mut items = Vec::new();
        loop {
            if self.eat(TokenKind::RBrace) {
                break;
            }
            let mut designators = Vec::new();
            loop {
                if self.eat(TokenKind::LBracket) {
                    let expr = self.parse_conditional_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    designators.push(crate::parser::ast::Designator::Index(expr));
                } else if self.eat(TokenKind::Dot) {
                    designators.push(crate::parser::ast::Designator::Member(
                        self.expect_ident()?,
                    ));
                } else {
                    break;
                }
            }
            if !designators.is_empty() {
                self.expect(TokenKind::Eq)?;
            }
            let init = self.parse_initializer()?;
            items.push(InitItem { designators, init });
            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RBrace)?;
                break;
            }
        }
        Ok(Initializer::compound(items))
    }

    // ------------------------------------------------------------------
    // Lookahead
    // ------------------------------------------------------------------

    /// True if the token at `pos + n` can begin a type.
    pub(super) fn starts_type_at(&self, n: usize) -> bool {
        let Some(token) = self.tokens.get(self.pos + n) else {
            return false;
        };
        match token.kind {
            TokenKind::KwVoid
            | TokenKind::KwChar
            | TokenKind::KwShort
            | TokenKind::KwInt
            | TokenKind::KwLong
            | TokenKind::KwFloat
            | TokenKind::KwDouble
            | TokenKind::KwSigned
            | TokenKind::KwUnsigned
            | TokenKind::KwBool
            | TokenKind::KwComplex
            | TokenKind::KwImaginary
            | TokenKind::KwStruct
            | TokenKind::KwUnion
            | TokenKind::KwEnum
            | TokenKind::KwConst
            | TokenKind::KwVolatile
            | TokenKind::KwRestrict
            | TokenKind::KwAtomic => true,
            TokenKind::Ident => {
                let name = &self.source[token.span.clone()];
                self.names.find(name) == Some(NameClass::TypedefName)
            }
            _ => false,
        }
    }

    /// True if the current token can begin a declaration.
    pub(super) fn starts_declaration(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                TokenKind::KwTypedef
                    | TokenKind::KwExtern
                    | TokenKind::KwStatic
                    | TokenKind::KwAuto
                    | TokenKind::KwRegister
                    | TokenKind::KwInline
                    | TokenKind::KwNoreturn
                    | TokenKind::KwThreadLocal
                    | TokenKind::KwAlignas
                    | TokenKind::KwStaticAssert
            )
        ) || self.starts_type_at(0)
    }
}

/// Fold an expression to a constant integer, when it is one.
pub(super) fn const_int_value(expr: &Expr) -> Option<i64> {
    match &expr.kind {
        ExprKind::Literal(lit) => match lit {
            Literal::Int(v) | Literal::Long(v) => Some(*v),
            Literal::UInt(v) | Literal::ULong(v) => Some(*v as i64),
            Literal::Char(v) => Some(*v as i64),
            Literal::Enum { value, .. } => Some(*value),
            Literal::Float(_) | Literal::String(_) => None,
        },
        ExprKind::Unary { op: UnaryOp::Negate, expr } => const_int_value(expr).map(|v| -v),
        _ => None,
    }
}
