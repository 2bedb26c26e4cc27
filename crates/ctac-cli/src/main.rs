//! Translator driver: scan, parse, resolve, type-check, label, translate,
//! and emit one translation unit in the selected serialization.

mod cli;

use std::fs;
use std::io::Write;
use std::process;

use clap::Parser as _;

use ctac_compiler::analyze::{resolve, typecheck};
use ctac_compiler::compile::{emit_symbols, label_loops, translate};
use ctac_compiler::{Parser, SymbolTable, TypeTable};
use ctac_tac::{TopLevel, to_binary, to_dot, to_yaml};

use cli::{Cli, OutputFormat};

fn main() {
    let cli = Cli::parse();
    if let Err(message) = run(&cli) {
        eprintln!("Fatal error: {message}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let source = fs::read_to_string(&cli.input)
        .map_err(|e| format!("{}: {e}", cli.input.display()))?;
    let output_path = cli.output_path();

    if cli.verbose {
        match cli.format() {
            OutputFormat::Tac => {
                println!("Emitting TAC in binary format to {}", output_path.display())
            }
            OutputFormat::Yaml => {
                println!("Emitting YAML format to {}", output_path.display())
            }
            OutputFormat::Dot => {
                println!("Emitting Graphviz DOT script to {}", output_path.display())
            }
        }
    }

    let program = compile(cli, &source)?;

    let bytes = match cli.format() {
        OutputFormat::Tac => to_binary(&program),
        OutputFormat::Yaml => to_yaml(&program).into_bytes(),
        OutputFormat::Dot => to_dot(&program).into_bytes(),
    };

    if output_path.as_os_str() == "-" {
        std::io::stdout()
            .write_all(&bytes)
            .map_err(|e| e.to_string())?;
    } else {
        fs::write(&output_path, bytes)
            .map_err(|e| format!("{}: {e}", output_path.display()))?;
    }
    Ok(())
}

fn compile(cli: &Cli, source: &str) -> Result<Vec<TopLevel>, String> {
    let mut parser = Parser::new(source).map_err(|e| e.to_string())?;
    let mut symbols = SymbolTable::new();
    let mut types = TypeTable::new();
    let mut program = Vec::new();

    while let Some(decl) = parser.next_external_decl().map_err(|e| e.to_string())? {
        if cli.debug {
            eprintln!("{decl:#?}");
        }
        resolve::resolve(&decl, &mut symbols, &mut types).map_err(|e| e.to_string())?;
        let mut decl =
            typecheck::typecheck(decl, &mut symbols, &mut types).map_err(|e| e.to_string())?;
        label_loops(&mut decl).map_err(|e| e.to_string())?;
        if let Some(top) = translate(&decl, &mut symbols, &types).map_err(|e| e.to_string())? {
            program.push(top);
        }
        symbols.purge(0);
        if cli.debug {
            eprintln!("Symbol table:");
            eprint!("{}", symbols.dump());
            eprintln!("Type table:");
            eprint!("{}", types.dump());
        }
        if cli.verbose {
            println!("Processed one external declaration");
        }
    }
    program.extend(emit_symbols(&symbols, &types).map_err(|e| e.to_string())?);
    Ok(program)
}
