//! Loop labelling: gives every loop and switch a unique label and points
//! `break`/`continue` at the innermost enclosing target.
//!
//! `switch` bodies are also scanned for `case`/`default` statements, which
//! receive labels of their own, collected onto the switch node for the
//! translator's dispatch sequence.

use crate::analyze::SemanticError;
use crate::parser::ast::{BlockItem, Expr, ExprKind, ExternalDecl, Literal, Stmt};

/// Annotate one external declaration.
pub fn label_loops(decl: &mut ExternalDecl) -> Result<(), SemanticError> {
    let ExternalDecl::Function(fd) = decl else {
        return Ok(());
    };
    let Some(body) = &mut fd.body else {
        return Ok(());
    };
    let mut labeler = Labeler {
        counter: 0,
        stack: Vec::new(),
    };
    labeler.label_block(body)
}

enum Frame {
    Loop(String),
    Switch {
        label: String,
        cases: Vec<(Option<i64>, String)>,
    },
}

impl Frame {
    fn label(&self) -> &str {
        match self {
            Frame::Loop(label) => label,
            Frame::Switch { label, .. } => label,
        }
    }
}

struct Labeler {
    counter: u32,
    stack: Vec<Frame>,
}

impl Labeler {
    fn fresh(&mut self, prefix: &str) -> String {
        let label = format!("{prefix}.{}", self.counter);
        self.counter += 1;
        label
    }

    fn label_block(&mut self, items: &mut [BlockItem]) -> Result<(), SemanticError> {
        for item in items {
            match item {
                BlockItem::Stmt(stmt) => self.label_stmt(stmt)?,
                BlockItem::Decl(_) => {}
            }
        }
        Ok(())
    }

    fn label_stmt(&mut self, stmt: &mut Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::While { body, label, .. }
            | Stmt::DoWhile { body, label, .. } => {
                let name = self.fresh("loop");
                *label = Some(name.clone());
                self.stack.push(Frame::Loop(name));
                self.label_stmt(body)?;
                self.stack.pop();
                Ok(())
            }
            Stmt::For { body, label, .. } => {
                let name = self.fresh("loop");
                *label = Some(name.clone());
                self.stack.push(Frame::Loop(name));
                self.label_stmt(body)?;
                self.stack.pop();
                Ok(())
            }
            Stmt::Switch { body, label, cases, .. } => {
                let name = self.fresh("switch");
                *label = Some(name.clone());
                self.stack.push(Frame::Switch {
                    label: name,
                    cases: Vec::new(),
                });
                self.label_stmt(body)?;
                let Some(Frame::Switch { cases: collected, .. }) = self.stack.pop() else {
                    unreachable!("switch frame pushed above");
                };
                *cases = collected;
                Ok(())
            }
            Stmt::Break { label } => {
                let frame = self.stack.last().ok_or(SemanticError::BreakOutside)?;
                *label = Some(frame.label().to_owned());
                Ok(())
            }
            Stmt::Continue { label } => {
                let target = self
                    .stack
                    .iter()
                    .rev()
                    .find_map(|frame| match frame {
                        Frame::Loop(name) => Some(name.clone()),
                        Frame::Switch { .. } => None,
                    })
                    .ok_or(SemanticError::ContinueOutside)?;
                *label = Some(target);
                Ok(())
            }
            Stmt::Case { expr, stmt, label } => {
                let value = case_value(expr).ok_or(SemanticError::CaseNotConstant)?;
                let case_label = {
                    let switch = self
                        .stack
                        .iter_mut()
                        .rev()
                        .find_map(|frame| match frame {
                            Frame::Switch { label, cases } => Some((label, cases)),
                            Frame::Loop(_) => None,
                        })
                        .ok_or(SemanticError::CaseOutsideSwitch)?;
                    let (switch_label, cases) = switch;
                    if cases.iter().any(|(v, _)| *v == Some(value)) {
                        return Err(SemanticError::DuplicateCase(value));
                    }
                    let case_label = format!("{switch_label}.case.{}", cases.len());
                    cases.push((Some(value), case_label.clone()));
                    case_label
                };
                *label = Some(case_label);
                self.label_stmt(stmt)
            }
            Stmt::Default { stmt, label } => {
                let default_label = {
                    let switch = self
                        .stack
                        .iter_mut()
                        .rev()
                        .find_map(|frame| match frame {
                            Frame::Switch { label, cases } => Some((label, cases)),
                            Frame::Loop(_) => None,
                        })
                        .ok_or(SemanticError::DefaultOutsideSwitch)?;
                    let (switch_label, cases) = switch;
                    if cases.iter().any(|(v, _)| v.is_none()) {
                        return Err(SemanticError::DuplicateDefault);
                    }
                    let default_label = format!("{switch_label}.default");
                    cases.push((None, default_label.clone()));
                    default_label
                };
                *label = Some(default_label);
                self.label_stmt(stmt)
            }
            Stmt::If { then_stmt, else_stmt, .. } => {
                self.label_stmt(then_stmt)?;
                if let Some(else_stmt) = else_stmt {
                    self.label_stmt(else_stmt)?;
                }
                Ok(())
            }
            Stmt::Compound(items) => self.label_block(items),
            Stmt::Labeled { stmt, .. } => self.label_stmt(stmt),
            Stmt::Expr(_)
            | Stmt::Empty
            | Stmt::Goto(_)
            | Stmt::Return(_) => Ok(()),
        }
    }
}

/// Constant value of a case expression, looking through inserted casts.
fn case_value(expr: &Expr) -> Option<i64> {
    match &expr.kind {
        ExprKind::Literal(lit) => match lit {
            Literal::Int(v) | Literal::Long(v) => Some(*v),
            Literal::UInt(v) | Literal::ULong(v) => Some(*v as i64),
            Literal::Char(v) => Some(*v as i64),
            Literal::Enum { value, .. } => Some(*value),
            _ => None,
        },
        ExprKind::Cast { expr, .. } => case_value(expr),
        ExprKind::Unary { op: crate::parser::ast::UnaryOp::Negate, expr } => {
            case_value(expr).map(|v| -v)
        }
        _ => None,
    }
}
