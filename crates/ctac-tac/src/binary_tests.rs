use crate::binary::{MAGIC, VERSION, to_binary};
use crate::ir::{Constant, Instruction, StaticInit, TacType, TopLevel, Val};

#[test]
fn header_layout() {
    let bytes = to_binary(&[]);
    assert_eq!(&bytes[0..4], &MAGIC);
    assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), VERSION);
    assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), 0);

    let payload_len = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
    assert_eq!(bytes.len(), 16 + payload_len);

    let checksum = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
    assert_eq!(checksum, crc32fast::hash(&bytes[16..]));
}

#[test]
fn empty_program_payload_is_count_only() {
    let bytes = to_binary(&[]);
    assert_eq!(&bytes[16..], &0u32.to_le_bytes());
}

#[test]
fn checksum_covers_payload() {
    let program = vec![TopLevel::StaticVariable {
        name: "x".into(),
        global: true,
        ty: TacType::Int,
        init: vec![StaticInit::Int(42)],
    }];
    let bytes = to_binary(&program);
    let checksum = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
    assert_eq!(checksum, crc32fast::hash(&bytes[16..]));
}

#[test]
fn function_record_starts_with_tag_and_name() {
    let program = vec![TopLevel::Function {
        name: "main".into(),
        global: true,
        params: vec![],
        body: vec![Instruction::Return(Some(Val::Constant(Constant::Int(0))))],
    }];
    let bytes = to_binary(&program);
    let payload = &bytes[16..];

    // count = 1, then tag 0 (function), then "main" length-prefixed
    assert_eq!(&payload[0..4], &1u32.to_le_bytes());
    assert_eq!(payload[4], 0);
    assert_eq!(&payload[5..9], &4u32.to_le_bytes());
    assert_eq!(&payload[9..13], b"main");
}

#[test]
fn serialization_is_deterministic() {
    let program = vec![TopLevel::StaticConstant {
        name: "_str0".into(),
        ty: TacType::Array {
            element: Box::new(TacType::Char),
            size: 3,
        },
        init: StaticInit::String {
            bytes: b"hi".to_vec(),
            null_terminated: true,
        },
    }];
    assert_eq!(to_binary(&program), to_binary(&program));
}
