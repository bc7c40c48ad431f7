//! Parsing implementation modules.

mod expressions;
mod items;
mod parser;
mod primary;
mod statements;

pub use parser::Parser;
