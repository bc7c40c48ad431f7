//! Block flattening pass.
//!
//! Inlined bodies arrive as blocks tagged flattenable. Merging them into the
//! enclosing block is safe as long as none of their locals or labels is
//! already declared there.

use rustc_hash::FxHashSet;
use weave_parser::{Block, Statement};

use super::CleanupPass;

/// Merges flattenable blocks into their parent
pub struct FlattenBlocksPass;

impl CleanupPass for FlattenBlocksPass {
    fn name(&self) -> &str {
        "FlattenBlocks"
    }

    fn run(&self, body: &mut Block) -> bool {
        flatten_statements(&mut body.statements)
    }
}

fn flatten_statements(statements: &mut Vec<Statement>) -> bool {
    let mut changed = false;
    for statement in statements.iter_mut() {
        changed |= flatten_nested(statement);
    }

    let mut taken: FxHashSet<String> = declared_names(
        statements
            .iter()
            .filter(|s| !matches!(s, Statement::Block(b) if b.flattenable)),
    );

    let mut result = Vec::with_capacity(statements.len());
    for statement in statements.drain(..) {
        match statement {
            Statement::Block(block) if block.flattenable => {
                let names = declared_names(&block.statements);
                if names.is_disjoint(&taken) {
                    taken.extend(names);
                    result.extend(block.statements);
                    changed = true;
                } else {
                    result.push(Statement::Block(block));
                }
            }
            other => result.push(other),
        }
    }

    *statements = result;
    changed
}

fn flatten_nested(statement: &mut Statement) -> bool {
    if let Statement::Block(block) = statement {
        return flatten_statements(&mut block.statements);
    }

    let mut changed = false;
    statement.for_each_child_mut(&mut |child| {
        changed |= flatten_nested(child);
        changed |= unwrap_single(child);
    });
    changed
}

/// Replaces a flattenable branch block holding one plain statement by that
/// statement.
fn unwrap_single(statement: &mut Statement) -> bool {
    let Statement::Block(block) = statement else {
        return false;
    };
    let plain = matches!(
        block.statements.as_slice(),
        [inner] if !matches!(inner, Statement::LocalDeclaration { .. } | Statement::Labeled { .. })
    );
    if !block.flattenable || !plain {
        return false;
    }

    match block.statements.pop() {
        Some(inner) => {
            *statement = inner;
            true
        }
        None => false,
    }
}

/// Locals and labels declared directly by `statements`.
fn declared_names<'s>(statements: impl IntoIterator<Item = &'s Statement>) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    for statement in statements {
        match statement {
            Statement::LocalDeclaration { declarators, .. } => {
                names.extend(declarators.iter().map(|d| d.name.clone()));
            }
            Statement::Labeled { label, .. } => {
                names.insert(label.clone());
            }
            _ => {}
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::Span;
    use weave_parser::parse_statement_source;

    fn statement(source: &str) -> Statement {
        parse_statement_source(source).unwrap()
    }

    fn flattenable(sources: &[&str]) -> Statement {
        Statement::Block(Block::flattenable(
            sources.iter().map(|s| statement(s)).collect(),
            Span::default(),
        ))
    }

    #[test]
    fn test_flattenable_block_is_merged() {
        let mut body = Block::new(
            vec![
                statement("a();"),
                flattenable(&["int x;", "x = 1;"]),
                statement("return x;"),
            ],
            Span::default(),
        );

        assert!(FlattenBlocksPass.run(&mut body));
        assert_eq!(
            body.to_string(),
            "{\n    a();\n    int x;\n    x = 1;\n    return x;\n}"
        );
        assert!(!FlattenBlocksPass.run(&mut body));
    }

    #[test]
    fn test_plain_blocks_are_kept() {
        let mut body = Block::new(vec![statement("{ a(); }")], Span::default());
        assert!(!FlattenBlocksPass.run(&mut body));
    }

    #[test]
    fn test_colliding_names_block_flattening() {
        let mut body = Block::new(
            vec![statement("int x = 0;"), flattenable(&["int x;", "x = 1;"])],
            Span::default(),
        );

        assert!(!FlattenBlocksPass.run(&mut body));
        assert_eq!(body.statements.len(), 2);
    }

    #[test]
    fn test_nested_flattenable_blocks_collapse() {
        let inner = flattenable(&["b();"]);
        let Statement::Block(mut outer) = flattenable(&["a();"]) else {
            unreachable!()
        };
        outer.statements.push(inner);
        let mut body = Block::new(vec![Statement::Block(outer)], Span::default());

        assert!(FlattenBlocksPass.run(&mut body));
        assert_eq!(body.to_string(), "{\n    a();\n    b();\n}");
    }

    #[test]
    fn test_single_statement_branch_is_unwrapped() {
        let mut body = Block::new(
            vec![Statement::If {
                condition: weave_parser::parse_expression_source("c").unwrap(),
                then_branch: Box::new(flattenable(&["f();"])),
                else_branch: None,
                span: Span::default(),
            }],
            Span::default(),
        );

        assert!(FlattenBlocksPass.run(&mut body));
        assert_eq!(body.to_string(), "{\n    if (c)\n        f();\n}");
    }
}
