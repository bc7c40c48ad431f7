//! Redundant jump removal.
//!
//! Inlining leaves `goto` statements aimed at the end of an inlined body.
//! Once blocks are flattened and dead code removed, many of them jump to the
//! very next statement, and their labels end up untargeted.

use rustc_hash::FxHashSet;
use weave_parser::{Block, Statement};

use super::CleanupPass;

/// Removes jumps to the next statement and unused empty labels
pub struct RedundantJumpPass;

impl CleanupPass for RedundantJumpPass {
    fn name(&self) -> &str {
        "RedundantJump"
    }

    fn run(&self, body: &mut Block) -> bool {
        let mut changed = remove_fallthrough_jumps(&mut body.statements);

        let mut targets = FxHashSet::default();
        for statement in &body.statements {
            collect_targets(statement, &mut targets);
        }
        changed |= remove_unused_labels(&mut body.statements, &targets);

        changed
    }
}

/// Removes `goto L;` directly followed by `L: ...` in the same block.
fn remove_fallthrough_jumps(statements: &mut Vec<Statement>) -> bool {
    let mut changed = false;

    let mut i = 0;
    while i < statements.len() {
        let redundant = match (&statements[i], statements.get(i + 1)) {
            (Statement::Goto { label, .. }, Some(next)) => labels_of(next).contains(&label.as_str()),
            _ => false,
        };
        if redundant {
            statements.remove(i);
            changed = true;
        } else {
            i += 1;
        }
    }

    for statement in statements.iter_mut() {
        changed |= visit_blocks(statement, &mut remove_fallthrough_jumps);
    }

    changed
}

/// Drops `L: ;` when nothing jumps to `L`.
fn remove_unused_labels(statements: &mut Vec<Statement>, targets: &FxHashSet<String>) -> bool {
    let before = statements.len();
    statements.retain(|statement| {
        !matches!(
            statement,
            Statement::Labeled { label, statement, .. }
                if matches!(statement.as_ref(), Statement::Empty { .. }) && !targets.contains(label)
        )
    });
    let mut changed = statements.len() != before;

    for statement in statements.iter_mut() {
        changed |= visit_blocks(statement, &mut |s| remove_unused_labels(s, targets));
    }

    changed
}

/// Labels attached to `statement`, outermost first.
fn labels_of(statement: &Statement) -> Vec<&str> {
    let mut labels = Vec::new();
    let mut current = statement;
    while let Statement::Labeled {
        label, statement, ..
    } = current
    {
        labels.push(label.as_str());
        current = statement.as_ref();
    }
    labels
}

fn collect_targets(statement: &Statement, targets: &mut FxHashSet<String>) {
    if let Statement::Goto { label, .. } = statement {
        targets.insert(label.clone());
    }
    statement.for_each_child(&mut |child| collect_targets(child, targets));
}

/// Applies `f` to the statement list of every block nested in `statement`.
fn visit_blocks(
    statement: &mut Statement,
    f: &mut impl FnMut(&mut Vec<Statement>) -> bool,
) -> bool {
    if let Statement::Block(block) = statement {
        return f(&mut block.statements);
    }

    let mut changed = false;
    statement.for_each_child_mut(&mut |child| changed |= visit_blocks(child, f));
    changed
}
