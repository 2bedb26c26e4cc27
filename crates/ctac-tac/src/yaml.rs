//! YAML rendering of a TAC program.
//!
//! Hand-written indent-based writer; instructions render as single-line
//! scalars via their `Display` impls.

use std::fmt::Write;

use crate::ir::{StaticInit, TopLevel};

/// Render a TAC program as YAML text.
pub fn to_yaml(program: &[TopLevel]) -> String {
    let mut out = String::new();
    for item in program {
        match item {
            TopLevel::Function { name, global, params, body } => {
                out.push_str("- function:\n");
                writeln!(out, "    name: {name}").unwrap();
                writeln!(out, "    global: {global}").unwrap();
                if params.is_empty() {
                    out.push_str("    params: []\n");
                } else {
                    out.push_str("    params:\n");
                    for p in params {
                        writeln!(out, "      - {p}").unwrap();
                    }
                }
                if body.is_empty() {
                    out.push_str("    body: []\n");
                } else {
                    out.push_str("    body:\n");
                    for instr in body {
                        writeln!(out, "      - {instr}").unwrap();
                    }
                }
            }
            TopLevel::StaticVariable { name, global, ty, init } => {
                out.push_str("- static_variable:\n");
                writeln!(out, "    name: {name}").unwrap();
                writeln!(out, "    global: {global}").unwrap();
                writeln!(out, "    type: {ty}").unwrap();
                write_inits(&mut out, init);
            }
            TopLevel::StaticConstant { name, ty, init } => {
                out.push_str("- static_constant:\n");
                writeln!(out, "    name: {name}").unwrap();
                writeln!(out, "    type: {ty}").unwrap();
                writeln!(out, "    init: {init}").unwrap();
            }
        }
    }
    out
}

fn write_inits(out: &mut String, inits: &[StaticInit]) {
    if inits.is_empty() {
        out.push_str("    init: []\n");
        return;
    }
    out.push_str("    init:\n");
    for init in inits {
        writeln!(out, "      - {init}").unwrap();
    }
}
