//! ctac front-end: C source in, three-address code out.
//!
//! The pipeline runs per external declaration:
//! - `parser` - scanner, name table, and recursive-descent grammar
//! - `analyze` - name resolution, type checking, initializer lowering
//! - `compile` - loop labelling and TAC translation
//!
//! Drivers either call `compile_source` for the whole translation unit or
//! pull declarations from `Parser` and run the passes themselves.

pub mod analyze;
pub mod compile;
pub mod parser;

#[cfg(test)]
mod pipeline_tests;

use ctac_tac::TopLevel;

pub use analyze::{SemanticError, SymbolTable, TypeTable};
pub use parser::{ParseError, Parser};
pub use parser::ast::ExternalDecl;

/// Any fatal front-end error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Everything the pipeline produced for one translation unit.
#[derive(Debug)]
pub struct Compilation {
    /// TAC top-levels: functions in source order, then static variables
    /// and constants in symbol-table order.
    pub program: Vec<TopLevel>,
    pub symbols: SymbolTable,
    pub types: TypeTable,
    /// The resolved, typed AST of each external declaration.
    pub decls: Vec<ExternalDecl>,
}

/// Compile one translation unit of preprocessed C source.
pub fn compile_source(source: &str) -> Result<Compilation> {
    let mut parser = Parser::new(source)?;
    let mut symbols = SymbolTable::new();
    let mut types = TypeTable::new();
    let mut program = Vec::new();
    let mut decls = Vec::new();

    while let Some(decl) = parser.next_external_decl()? {
        analyze::resolve::resolve(&decl, &mut symbols, &mut types)?;
        let mut decl = analyze::typecheck::typecheck(decl, &mut symbols, &mut types)?;
        compile::label_loops(&mut decl)?;
        if let Some(top) = compile::translate(&decl, &mut symbols, &types)? {
            program.push(top);
        }
        // The declaration is fully lowered; its locals leave the table.
        symbols.purge(0);
        decls.push(decl);
    }
    program.extend(compile::emit_symbols(&symbols, &types)?);

    Ok(Compilation {
        program,
        symbols,
        types,
        decls,
    })
}
