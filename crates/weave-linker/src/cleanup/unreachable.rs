//! Unreachable code removal.
//!
//! Removes statements following a `return` or `goto` in the same block, up
//! to the next statement carrying a label.

use weave_parser::{Block, Statement};

use super::CleanupPass;

/// Unreachable code elimination pass
pub struct UnreachableCodePass;

impl CleanupPass for UnreachableCodePass {
    fn name(&self) -> &str {
        "UnreachableCode"
    }

    fn run(&self, body: &mut Block) -> bool {
        remove_unreachable_code(&mut body.statements)
    }
}

fn remove_unreachable_code(statements: &mut Vec<Statement>) -> bool {
    let mut changed = false;
    let mut reachable = true;

    statements.retain(|statement| {
        if contains_label(statement) {
            reachable = true;
        }
        let keep = reachable;
        if keep && never_completes(statement) {
            reachable = false;
        }
        changed |= !keep;
        keep
    });

    for statement in statements.iter_mut() {
        changed |= remove_nested(statement);
    }

    changed
}

fn remove_nested(statement: &mut Statement) -> bool {
    if let Statement::Block(block) = statement {
        return remove_unreachable_code(&mut block.statements);
    }

    let mut changed = false;
    statement.for_each_child_mut(&mut |child| changed |= remove_nested(child));
    changed
}

fn never_completes(statement: &Statement) -> bool {
    match statement {
        Statement::Labeled { statement, .. } => never_completes(statement),
        other => other.is_jump(),
    }
}

/// Returns true if a `goto` could enter `statement`.
fn contains_label(statement: &Statement) -> bool {
    if matches!(statement, Statement::Labeled { .. }) {
        return true;
    }
    let mut found = false;
    statement.for_each_child(&mut |child| found = found || contains_label(child));
    found
}
