//! Three-address code: the back-end-facing IR.
//!
//! A TAC program is an ordered list of top-levels (functions, static
//! variables, static constants). This crate defines the IR types and the
//! three serializations the translator can emit:
//! - `binary` - bespoke binary container (default output)
//! - `yaml` - human-readable YAML rendering
//! - `dot` - Graphviz control-flow diagram

mod binary;
mod dot;
mod ir;
mod yaml;

#[cfg(test)]
mod binary_tests;
#[cfg(test)]
mod dot_tests;

pub use binary::to_binary;
pub use dot::to_dot;
pub use ir::{
    BinaryOp, Constant, Instruction, StaticInit, TacType, TopLevel, UnaryOp, Val,
};
pub use yaml::to_yaml;
