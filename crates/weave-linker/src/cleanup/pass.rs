//! Cleanup pass trait.

use weave_parser::Block;

/// A structural rewrite applied to linked member bodies.
pub trait CleanupPass {
    /// Returns the name of the pass
    fn name(&self) -> &str;

    /// Runs the pass on one member body
    ///
    /// Returns `true` if any changes were made, `false` otherwise
    fn run(&self, body: &mut Block) -> bool;
}
