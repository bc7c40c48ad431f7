//! Source printing for syntax trees.
//!
//! Printed output parses back into an equivalent tree: parentheses are
//! inserted by precedence, and blocks use four-space indentation with
//! braces on the opening line.

mod expression;
mod program;
mod statement;

use std::fmt;

const INDENT: &str = "    ";

fn write_indent(f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    for _ in 0..level {
        f.write_str(INDENT)?;
    }
    Ok(())
}
