//! Cleanup of linked bodies: merges inlined blocks and removes the jumps
//! that inlining made redundant.

mod flatten;
mod jumps;
mod pass;
mod unreachable;

pub use flatten::FlattenBlocksPass;
pub use jumps::RedundantJumpPass;
pub use pass::CleanupPass;
pub use unreachable::UnreachableCodePass;

use tracing::{trace, warn};
use weave_parser::{Block, Member, Program};

/// Runs cleanup passes over every body of a program until nothing changes.
pub struct CleanupPipeline {
    passes: Vec<Box<dyn CleanupPass>>,
    max_iterations: usize,
}

impl CleanupPipeline {
    /// Creates a pipeline with the default passes
    #[must_use]
    pub fn new(max_iterations: usize) -> Self {
        Self {
            passes: vec![
                Box::new(FlattenBlocksPass),
                Box::new(UnreachableCodePass),
                Box::new(RedundantJumpPass),
            ],
            max_iterations,
        }
    }

    /// Creates an empty pipeline with no passes
    #[must_use]
    pub fn empty(max_iterations: usize) -> Self {
        Self {
            passes: Vec::new(),
            max_iterations,
        }
    }

    /// Adds a cleanup pass
    pub fn add_pass(&mut self, pass: Box<dyn CleanupPass>) -> &mut Self {
        self.passes.push(pass);
        self
    }

    /// Cleans every method and accessor body of `program`.
    ///
    /// Returns `false` if some body still changed after the last iteration.
    pub fn run(&self, program: &mut Program) -> bool {
        let mut converged = true;
        for class in &mut program.classes {
            for member in &mut class.members {
                for body in member_bodies(member) {
                    converged &= self.run_body(body);
                }
            }
        }
        converged
    }

    /// Runs the passes on one body, repeating until no changes are made
    pub fn run_body(&self, body: &mut Block) -> bool {
        for iteration in 1..=self.max_iterations {
            let mut changed = false;
            for pass in &self.passes {
                if pass.run(body) {
                    trace!(pass = pass.name(), iteration, "cleanup pass changed a body");
                    changed = true;
                }
            }

            if !changed {
                return true;
            }
        }

        warn!(
            max_iterations = self.max_iterations,
            "cleanup reached maximum iterations"
        );
        false
    }
}

fn member_bodies(member: &mut Member) -> Vec<&mut Block> {
    match member {
        Member::Field(_) => Vec::new(),
        Member::Method(method) => vec![&mut method.body],
        Member::Property(property) => property
            .accessors
            .iter_mut()
            .map(|accessor| &mut accessor.body)
            .collect(),
        Member::Event(event) => event
            .accessors
            .iter_mut()
            .map(|accessor| &mut accessor.body)
            .collect(),
    }
}
