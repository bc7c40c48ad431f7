//! Binding of parsed programs into a [`Compilation`](crate::Compilation).

mod core;
mod members;
mod references;

pub use self::core::Binder;
