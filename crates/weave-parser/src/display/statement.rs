//! Display implementation for statements and blocks.

use std::fmt;

use super::write_indent;
use crate::ast::{Block, Statement};

/// Writes `stmt` on its own indented line.
pub(crate) fn write_statement(
    f: &mut fmt::Formatter<'_>,
    stmt: &Statement,
    level: usize,
) -> fmt::Result {
    write_indent(f, level)?;
    write_inline(f, stmt, level)?;
    writeln!(f)
}

pub(crate) fn write_block(f: &mut fmt::Formatter<'_>, block: &Block, level: usize) -> fmt::Result {
    writeln!(f, "{{")?;
    for stmt in &block.statements {
        write_statement(f, stmt, level + 1)?;
    }
    write_indent(f, level)?;
    write!(f, "}}")
}

/// Returns true if an `else` following `stmt` would bind inside it.
fn captures_else(stmt: &Statement) -> bool {
    match stmt {
        Statement::If {
            else_branch: None, ..
        } => true,
        Statement::If {
            else_branch: Some(branch),
            ..
        } => captures_else(branch),
        Statement::While { body, .. } => captures_else(body),
        Statement::Labeled { statement, .. } => captures_else(statement),
        _ => false,
    }
}

/// Writes the body of an `if` or `while`.
fn write_branch(f: &mut fmt::Formatter<'_>, stmt: &Statement, level: usize) -> fmt::Result {
    if let Statement::Block(block) = stmt {
        write!(f, " ")?;
        write_block(f, block, level)
    } else {
        writeln!(f)?;
        write_indent(f, level + 1)?;
        write_inline(f, stmt, level + 1)
    }
}

/// Writes `stmt` starting at the cursor, without a trailing newline.
fn write_inline(f: &mut fmt::Formatter<'_>, stmt: &Statement, level: usize) -> fmt::Result {
    match stmt {
        Statement::Block(block) => write_block(f, block, level),
        Statement::LocalDeclaration {
            ty, declarators, ..
        } => {
            write!(f, "{ty} ")?;
            for (i, declarator) in declarators.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", declarator.name)?;
                if let Some(initializer) = &declarator.initializer {
                    write!(f, " = {initializer}")?;
                }
            }
            write!(f, ";")
        }
        Statement::Expression { expression, .. } => write!(f, "{expression};"),
        Statement::Return { value: Some(v), .. } => write!(f, "return {v};"),
        Statement::Return { value: None, .. } => write!(f, "return;"),
        Statement::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            write!(f, "if ({condition})")?;
            match else_branch {
                Some(_) if captures_else(then_branch) => {
                    write!(f, " {{\n")?;
                    write_statement(f, then_branch, level + 1)?;
                    write_indent(f, level)?;
                    write!(f, "}}")?;
                }
                _ => write_branch(f, then_branch, level)?,
            }

            let Some(else_branch) = else_branch else {
                return Ok(());
            };
            if matches!(then_branch.as_ref(), Statement::Block(_)) || captures_else(then_branch) {
                write!(f, " else")?;
            } else {
                writeln!(f)?;
                write_indent(f, level)?;
                write!(f, "else")?;
            }
            if matches!(else_branch.as_ref(), Statement::If { .. }) {
                write!(f, " ")?;
                write_inline(f, else_branch, level)
            } else {
                write_branch(f, else_branch, level)
            }
        }
        Statement::While {
            condition, body, ..
        } => {
            write!(f, "while ({condition})")?;
            write_branch(f, body, level)
        }
        Statement::Goto { label, .. } => write!(f, "goto {label};"),
        Statement::Labeled {
            label, statement, ..
        } => {
            write!(f, "{label}: ")?;
            write_inline(f, statement, level)
        }
        Statement::Empty { .. } => write!(f, ";"),
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_inline(f, self, 0)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_block(f, self, 0)
    }
}
