//! Core types shared by every stage of the weave aspect linker.
//!
//! This crate provides source spans, the common error type, the symbol model
//! of woven declarations, transformation layers and the aspect reference
//! vocabulary (`base`, `previous`, `current`, `final`).

pub mod error;
pub mod layer;
pub mod reference;
pub mod span;
pub mod symbols;

pub use error::{Error, Result};
pub use layer::{LayerIndex, LayerOrder, TransformationLayer};
pub use reference::{ChainPosition, ReferenceAnnotation, ReferenceId, ReferenceOrder, Semantic};
pub use span::Span;
