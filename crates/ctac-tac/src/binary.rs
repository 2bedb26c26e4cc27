//! Binary container for TAC programs.
//!
//! Layout: a 16-byte header followed by the payload.
//!
//! ```text
//! offset  size  field
//! 0       4     magic "CTAC"
//! 4       2     format version (LE)
//! 6       2     reserved (zero)
//! 8       4     payload length (LE)
//! 12      4     CRC32 of payload (LE)
//! 16      -     payload: u32 top-level count, then tagged records
//! ```
//!
//! All integers are little-endian; strings are u32-length-prefixed UTF-8.

use crate::ir::{BinaryOp, Constant, Instruction, StaticInit, TacType, TopLevel, UnaryOp, Val};

pub const MAGIC: [u8; 4] = *b"CTAC";
pub const VERSION: u16 = 1;

/// Serialize a TAC program into the binary container format.
pub fn to_binary(program: &[TopLevel]) -> Vec<u8> {
    let mut payload = Vec::new();
    put_u32(&mut payload, program.len() as u32);
    for item in program {
        put_top_level(&mut payload, item);
    }

    let mut out = Vec::with_capacity(16 + payload.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

fn put_u8(out: &mut Vec<u8>, v: u8) {
    out.push(v);
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_i64(out: &mut Vec<u8>, v: i64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_f64(out: &mut Vec<u8>, v: f64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_bool(out: &mut Vec<u8>, v: bool) {
    out.push(v as u8);
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    put_u32(out, s.len() as u32);
    out.extend_from_slice(s.as_bytes());
}

fn put_bytes(out: &mut Vec<u8>, b: &[u8]) {
    put_u32(out, b.len() as u32);
    out.extend_from_slice(b);
}

fn put_top_level(out: &mut Vec<u8>, item: &TopLevel) {
    match item {
        TopLevel::Function { name, global, params, body } => {
            put_u8(out, 0);
            put_str(out, name);
            put_bool(out, *global);
            put_u32(out, params.len() as u32);
            for p in params {
                put_str(out, p);
            }
            put_u32(out, body.len() as u32);
            for instr in body {
                put_instruction(out, instr);
            }
        }
        TopLevel::StaticVariable { name, global, ty, init } => {
            put_u8(out, 1);
            put_str(out, name);
            put_bool(out, *global);
            put_type(out, ty);
            put_u32(out, init.len() as u32);
            for i in init {
                put_static_init(out, i);
            }
        }
        TopLevel::StaticConstant { name, ty, init } => {
            put_u8(out, 2);
            put_str(out, name);
            put_type(out, ty);
            put_static_init(out, init);
        }
    }
}

fn put_val(out: &mut Vec<u8>, val: &Val) {
    match val {
        Val::Constant(c) => {
            put_u8(out, 0);
            put_constant(out, c);
        }
        Val::Var(name) => {
            put_u8(out, 1);
            put_str(out, name);
        }
    }
}

fn put_opt_val(out: &mut Vec<u8>, val: &Option<Val>) {
    match val {
        None => put_u8(out, 0),
        Some(v) => {
            put_u8(out, 1);
            put_val(out, v);
        }
    }
}

fn put_constant(out: &mut Vec<u8>, c: &Constant) {
    match c {
        Constant::Char(v) => {
            put_u8(out, 0);
            put_i64(out, *v as i64);
        }
        Constant::UChar(v) => {
            put_u8(out, 1);
            put_u64(out, *v as u64);
        }
        Constant::Int(v) => {
            put_u8(out, 2);
            put_i64(out, *v as i64);
        }
        Constant::UInt(v) => {
            put_u8(out, 3);
            put_u64(out, *v as u64);
        }
        Constant::Long(v) => {
            put_u8(out, 4);
            put_i64(out, *v);
        }
        Constant::ULong(v) => {
            put_u8(out, 5);
            put_u64(out, *v);
        }
        Constant::Double(v) => {
            put_u8(out, 6);
            put_f64(out, *v);
        }
    }
}

fn unary_tag(op: UnaryOp) -> u8 {
    match op {
        UnaryOp::Complement => 0,
        UnaryOp::Negate => 1,
        UnaryOp::Not => 2,
    }
}

fn binary_tag(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Add => 0,
        BinaryOp::Subtract => 1,
        BinaryOp::Multiply => 2,
        BinaryOp::Divide => 3,
        BinaryOp::Remainder => 4,
        BinaryOp::Equal => 5,
        BinaryOp::NotEqual => 6,
        BinaryOp::LessThan => 7,
        BinaryOp::LessOrEqual => 8,
        BinaryOp::GreaterThan => 9,
        BinaryOp::GreaterOrEqual => 10,
        BinaryOp::BitwiseAnd => 11,
        BinaryOp::BitwiseOr => 12,
        BinaryOp::BitwiseXor => 13,
        BinaryOp::LeftShift => 14,
        BinaryOp::RightShift => 15,
    }
}

fn put_instruction(out: &mut Vec<u8>, instr: &Instruction) {
    match instr {
        Instruction::Return(val) => {
            put_u8(out, 0);
            put_opt_val(out, val);
        }
        Instruction::SignExtend { src, dst } => put_conversion(out, 1, src, dst),
        Instruction::Truncate { src, dst } => put_conversion(out, 2, src, dst),
        Instruction::ZeroExtend { src, dst } => put_conversion(out, 3, src, dst),
        Instruction::DoubleToInt { src, dst } => put_conversion(out, 4, src, dst),
        Instruction::DoubleToUInt { src, dst } => put_conversion(out, 5, src, dst),
        Instruction::IntToDouble { src, dst } => put_conversion(out, 6, src, dst),
        Instruction::UIntToDouble { src, dst } => put_conversion(out, 7, src, dst),
        Instruction::Unary { op, src, dst } => {
            put_u8(out, 8);
            put_u8(out, unary_tag(*op));
            put_val(out, src);
            put_val(out, dst);
        }
        Instruction::Binary { op, src1, src2, dst } => {
            put_u8(out, 9);
            put_u8(out, binary_tag(*op));
            put_val(out, src1);
            put_val(out, src2);
            put_val(out, dst);
        }
        Instruction::Copy { src, dst } => put_conversion(out, 10, src, dst),
        Instruction::GetAddress { src, dst } => put_conversion(out, 11, src, dst),
        Instruction::Load { src_ptr, dst } => put_conversion(out, 12, src_ptr, dst),
        Instruction::Store { src, dst_ptr } => put_conversion(out, 13, src, dst_ptr),
        Instruction::AddPtr { ptr, index, scale, dst } => {
            put_u8(out, 14);
            put_val(out, ptr);
            put_val(out, index);
            put_i64(out, *scale);
            put_val(out, dst);
        }
        Instruction::CopyToOffset { src, dst, offset } => {
            put_u8(out, 15);
            put_val(out, src);
            put_str(out, dst);
            put_i64(out, *offset);
        }
        Instruction::CopyFromOffset { src, offset, dst } => {
            put_u8(out, 16);
            put_str(out, src);
            put_i64(out, *offset);
            put_val(out, dst);
        }
        Instruction::Jump { target } => {
            put_u8(out, 17);
            put_str(out, target);
        }
        Instruction::JumpIfZero { condition, target } => {
            put_u8(out, 18);
            put_val(out, condition);
            put_str(out, target);
        }
        Instruction::JumpIfNotZero { condition, target } => {
            put_u8(out, 19);
            put_val(out, condition);
            put_str(out, target);
        }
        Instruction::Label { name } => {
            put_u8(out, 20);
            put_str(out, name);
        }
        Instruction::FunCall { name, args, dst } => {
            put_u8(out, 21);
            put_str(out, name);
            put_u32(out, args.len() as u32);
            for a in args {
                put_val(out, a);
            }
            put_opt_val(out, dst);
        }
    }
}

fn put_conversion(out: &mut Vec<u8>, tag: u8, src: &Val, dst: &Val) {
    put_u8(out, tag);
    put_val(out, src);
    put_val(out, dst);
}

fn put_type(out: &mut Vec<u8>, ty: &TacType) {
    match ty {
        TacType::Char => put_u8(out, 0),
        TacType::SChar => put_u8(out, 1),
        TacType::UChar => put_u8(out, 2),
        TacType::Int => put_u8(out, 3),
        TacType::UInt => put_u8(out, 4),
        TacType::Long => put_u8(out, 5),
        TacType::ULong => put_u8(out, 6),
        TacType::Double => put_u8(out, 7),
        TacType::Void => put_u8(out, 8),
        TacType::Function { params, ret } => {
            put_u8(out, 9);
            put_u32(out, params.len() as u32);
            for p in params {
                put_type(out, p);
            }
            put_type(out, ret);
        }
        TacType::Pointer(target) => {
            put_u8(out, 10);
            put_type(out, target);
        }
        TacType::Array { element, size } => {
            put_u8(out, 11);
            put_type(out, element);
            put_i64(out, *size);
        }
        TacType::Structure(tag) => {
            put_u8(out, 12);
            put_str(out, tag);
        }
    }
}

fn put_static_init(out: &mut Vec<u8>, init: &StaticInit) {
    match init {
        StaticInit::Int(v) => {
            put_u8(out, 0);
            put_i64(out, *v as i64);
        }
        StaticInit::Long(v) => {
            put_u8(out, 1);
            put_i64(out, *v);
        }
        StaticInit::UInt(v) => {
            put_u8(out, 2);
            put_u64(out, *v as u64);
        }
        StaticInit::ULong(v) => {
            put_u8(out, 3);
            put_u64(out, *v);
        }
        StaticInit::Char(v) => {
            put_u8(out, 4);
            put_i64(out, *v as i64);
        }
        StaticInit::UChar(v) => {
            put_u8(out, 5);
            put_u64(out, *v as u64);
        }
        StaticInit::Double(v) => {
            put_u8(out, 6);
            put_f64(out, *v);
        }
        StaticInit::Zero(bytes) => {
            put_u8(out, 7);
            put_u64(out, *bytes);
        }
        StaticInit::String { bytes, null_terminated } => {
            put_u8(out, 8);
            put_bytes(out, bytes);
            put_bool(out, *null_terminated);
        }
        StaticInit::Pointer(label) => {
            put_u8(out, 9);
            put_str(out, label);
        }
    }
}
