//! Graphviz DOT rendering of a TAC program.
//!
//! One cluster per function with one node per instruction; edges follow
//! sequential flow plus jump targets. Static variables and constants
//! render as standalone box nodes.

use std::collections::HashMap;
use std::fmt::Write;

use crate::ir::{Instruction, TopLevel};

/// Render a TAC program as a Graphviz digraph.
pub fn to_dot(program: &[TopLevel]) -> String {
    let mut out = String::from("digraph tac {\n    node [shape=record, fontname=\"monospace\"];\n");
    for (index, item) in program.iter().enumerate() {
        match item {
            TopLevel::Function { name, body, .. } => {
                write_function(&mut out, index, name, body);
            }
            TopLevel::StaticVariable { name, ty, .. } => {
                writeln!(
                    out,
                    "    s{index} [shape=box, label=\"{name}: {ty}\"];",
                )
                .unwrap();
            }
            TopLevel::StaticConstant { name, ty, .. } => {
                writeln!(
                    out,
                    "    s{index} [shape=box, style=dashed, label=\"{name}: {ty}\"];",
                )
                .unwrap();
            }
        }
    }
    out.push_str("}\n");
    out
}

fn write_function(out: &mut String, index: usize, name: &str, body: &[Instruction]) {
    writeln!(out, "    subgraph cluster_{index} {{").unwrap();
    writeln!(out, "        label=\"{name}\";").unwrap();

    // Map label names to node ids for jump edges.
    let mut label_nodes: HashMap<&str, usize> = HashMap::new();
    for (i, instr) in body.iter().enumerate() {
        if let Instruction::Label { name } = instr {
            label_nodes.insert(name.as_str(), i);
        }
    }

    for (i, instr) in body.iter().enumerate() {
        let text = escape(&instr.to_string());
        writeln!(out, "        f{index}_{i} [label=\"{text}\"];").unwrap();
    }

    for (i, instr) in body.iter().enumerate() {
        let falls_through = !matches!(
            instr,
            Instruction::Jump { .. } | Instruction::Return(_)
        );
        if falls_through && i + 1 < body.len() {
            writeln!(out, "        f{index}_{i} -> f{index}_{};", i + 1).unwrap();
        }
        if let Some(target) = jump_target(instr)
            && let Some(&t) = label_nodes.get(target)
        {
            writeln!(out, "        f{index}_{i} -> f{index}_{t};").unwrap();
        }
    }

    out.push_str("    }\n");
}

fn jump_target(instr: &Instruction) -> Option<&str> {
    match instr {
        Instruction::Jump { target }
        | Instruction::JumpIfZero { target, .. }
        | Instruction::JumpIfNotZero { target, .. } => Some(target),
        _ => None,
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
