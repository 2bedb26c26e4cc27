//! Symbol table: the primary binding table of the translation unit.
//!
//! Keyed by identifier over the scope-stamped map. Functions, file-scope
//! variables, and string-literal constants live at level 0; automatic
//! variables are stamped with the scope level they were declared in and
//! leave at scope exit.

use std::fmt::Write;

use ctac_core::ScopedMap;
use ctac_tac::StaticInit;

use super::SemanticError;
use crate::parser::ast::{Expr, ExprKind, Literal, Type};

/// Initialization state of a static variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    None,
    Tentative,
    Initialized,
}

/// Kind-specific payload of a symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Local {
        has_linkage: bool,
    },
    Static {
        global: bool,
        init_state: InitState,
        init: Vec<StaticInit>,
    },
    Function {
        global: bool,
        defined: bool,
    },
    Constant {
        init: StaticInit,
    },
}

/// A named entity: variable, function, or string-literal constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    /// Filled for every symbol except linkage-only locals, whose type is
    /// supplied by the file-scope declaration they refer to.
    pub ty: Option<Type>,
    pub kind: SymbolKind,
}

impl Symbol {
    /// Whether a later declaration of the same name may legally coexist
    /// with this binding.
    ///
    /// Functions can be redeclared (declaration then definition); local
    /// `extern` declarations refer onward. Plain locals and file-scope
    /// variables cannot be shadowed, because the table holds one live
    /// binding per name.
    pub fn has_linkage(&self) -> bool {
        match &self.kind {
            SymbolKind::Local { has_linkage } => *has_linkage,
            SymbolKind::Function { .. } => true,
            SymbolKind::Static { .. } | SymbolKind::Constant { .. } => false,
        }
    }
}

/// Scope-aware table binding names to symbols.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    map: ScopedMap<Symbol>,
    string_counter: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a local variable with a known type.
    pub fn add_automatic_var(&mut self, name: &str, ty: Type, level: u32) {
        self.map.insert(
            name,
            Symbol {
                name: name.to_owned(),
                ty: Some(ty),
                kind: SymbolKind::Local { has_linkage: false },
            },
            level,
        );
    }

    /// Add a local declaration that may carry linkage (`extern` at block
    /// scope); the type is filled in by the file-scope entity.
    pub fn add_automatic_var_with_linkage(&mut self, name: &str, has_linkage: bool, level: u32) {
        self.map.insert(
            name,
            Symbol {
                name: name.to_owned(),
                ty: None,
                kind: SymbolKind::Local { has_linkage },
            },
            level,
        );
    }

    /// Add a file-scope or `static`-qualified variable at level 0.
    ///
    /// `init` must be non-empty exactly when `init_state` is `Initialized`.
    pub fn add_static_var(
        &mut self,
        name: &str,
        ty: Type,
        global: bool,
        init_state: InitState,
        init: Vec<StaticInit>,
    ) {
        self.map.insert(
            name,
            Symbol {
                name: name.to_owned(),
                ty: Some(ty),
                kind: SymbolKind::Static {
                    global,
                    init_state,
                    init,
                },
            },
            0,
        );
    }

    /// Add a function declaration or definition at level 0.
    pub fn add_function(&mut self, name: &str, ty: Type, global: bool, defined: bool) {
        self.map.insert(
            name,
            Symbol {
                name: name.to_owned(),
                ty: Some(ty),
                kind: SymbolKind::Function { global, defined },
            },
            0,
        );
    }

    /// Intern a string literal as a fresh `_strN` constant of type
    /// `char[len + 1]` and return the generated name.
    pub fn add_string_literal(&mut self, contents: &[u8]) -> String {
        let name = format!("_str{}", self.string_counter);
        self.string_counter += 1;

        let len = contents.len() as i64;
        let ty = Type::Array {
            element: Box::new(Type::Char),
            size: Some(Box::new(Expr::new(ExprKind::Literal(Literal::Int(
                len + 1,
            ))))),
            qualifiers: Default::default(),
            is_static: false,
        };
        self.map.insert(
            &name,
            Symbol {
                name: name.clone(),
                ty: Some(ty),
                kind: SymbolKind::Constant {
                    init: StaticInit::String {
                        bytes: contents.to_vec(),
                        null_terminated: true,
                    },
                },
            },
            0,
        );
        name
    }

    /// Look up a symbol; absence is a fatal error.
    pub fn get(&self, name: &str) -> Result<&Symbol, SemanticError> {
        self.map
            .get(name)
            .ok_or_else(|| SemanticError::SymbolNotFound(name.to_owned()))
    }

    /// Look up a symbol, `None` on miss.
    pub fn get_opt(&self, name: &str) -> Option<&Symbol> {
        self.map.get(name)
    }

    /// True iff the symbol exists and has global linkage.
    pub fn is_global(&self, name: &str) -> bool {
        match self.map.get(name) {
            Some(sym) => match &sym.kind {
                SymbolKind::Function { global, .. } => *global,
                SymbolKind::Static { global, .. } => *global,
                _ => false,
            },
            None => false,
        }
    }

    /// Scope-exit hook: drop every symbol stamped deeper than `level`.
    pub fn purge(&mut self, level: u32) {
        self.map.purge(level);
    }

    /// In-order iteration over all live symbols.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Render all symbols for the `-D` debug dump.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (_, sym) in self.iter() {
            write!(out, "    {}:", sym.name).unwrap();
            match &sym.kind {
                SymbolKind::Function { global, defined } => {
                    out.push_str(" function");
                    if *global {
                        out.push_str(" global");
                    }
                    if *defined {
                        out.push_str(" defined");
                    }
                    out.push('\n');
                }
                SymbolKind::Static { global, init_state, init } => {
                    out.push_str(" static_var");
                    if *global {
                        out.push_str(" global");
                    }
                    match init_state {
                        InitState::None => out.push('\n'),
                        InitState::Tentative => out.push_str(" tentative\n"),
                        InitState::Initialized => {
                            out.push_str(" initialized\n");
                            for record in init {
                                writeln!(out, "        {record}").unwrap();
                            }
                        }
                    }
                }
                SymbolKind::Constant { init } => {
                    out.push_str(" string\n");
                    writeln!(out, "        {init}").unwrap();
                }
                SymbolKind::Local { has_linkage } => {
                    out.push_str(" local");
                    if *has_linkage {
                        out.push_str(" linkage");
                    }
                    out.push('\n');
                }
            }
            if let Some(ty) = &sym.ty {
                writeln!(out, "        {ty}").unwrap();
            }
        }
        out
    }
}
