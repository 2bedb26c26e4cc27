use indoc::indoc;

use crate::dot::to_dot;
use crate::ir::{Constant, Instruction, StaticInit, TacType, TopLevel, Val};

#[test]
fn empty_program_renders_a_bare_digraph() {
    assert_eq!(
        to_dot(&[]),
        indoc! {r#"
            digraph tac {
                node [shape=record, fontname="monospace"];
            }
        "#}
    );
}

#[test]
fn function_edges_follow_flow_and_jumps() {
    let program = vec![TopLevel::Function {
        name: "main".into(),
        global: true,
        params: vec![],
        body: vec![
            Instruction::JumpIfZero {
                condition: Val::Var("c".into()),
                target: "skip".into(),
            },
            Instruction::Copy {
                src: Val::Constant(Constant::Int(1)),
                dst: Val::Var("x".into()),
            },
            Instruction::Jump {
                target: "end".into(),
            },
            Instruction::Label {
                name: "skip".into(),
            },
            Instruction::Copy {
                src: Val::Constant(Constant::Int(0)),
                dst: Val::Var("x".into()),
            },
            Instruction::Label { name: "end".into() },
            Instruction::Return(Some(Val::Var("x".into()))),
        ],
    }];

    // A conditional jump keeps its fall-through edge plus the edge to its
    // label; an unconditional jump and a return fall through to nothing.
    assert_eq!(
        to_dot(&program),
        indoc! {r#"
            digraph tac {
                node [shape=record, fontname="monospace"];
                subgraph cluster_0 {
                    label="main";
                    f0_0 [label="JumpIfZero(c, skip)"];
                    f0_1 [label="Copy(1, x)"];
                    f0_2 [label="Jump(end)"];
                    f0_3 [label="Label(skip)"];
                    f0_4 [label="Copy(0, x)"];
                    f0_5 [label="Label(end)"];
                    f0_6 [label="Return(x)"];
                    f0_0 -> f0_1;
                    f0_0 -> f0_3;
                    f0_1 -> f0_2;
                    f0_2 -> f0_5;
                    f0_3 -> f0_4;
                    f0_4 -> f0_5;
                    f0_5 -> f0_6;
                }
            }
        "#}
    );
}

#[test]
fn statics_render_as_box_nodes() {
    let program = vec![
        TopLevel::StaticVariable {
            name: "x".into(),
            global: true,
            ty: TacType::Int,
            init: vec![StaticInit::Int(42)],
        },
        TopLevel::StaticConstant {
            name: "_str0".into(),
            ty: TacType::Array {
                element: Box::new(TacType::Char),
                size: 3,
            },
            init: StaticInit::String {
                bytes: b"hi".to_vec(),
                null_terminated: true,
            },
        },
    ];

    assert_eq!(
        to_dot(&program),
        indoc! {r#"
            digraph tac {
                node [shape=record, fontname="monospace"];
                s0 [shape=box, label="x: int"];
                s1 [shape=box, style=dashed, label="_str0: array(char, 3)"];
            }
        "#}
    );
}
