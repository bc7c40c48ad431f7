//! Common test utilities for binder and resolver tests.

#![allow(dead_code)]

use weave_core::Result;
use weave_core::symbols::SymbolId;
use weave_semantic::{Compilation, bind_source};

/// Binds source code, panicking on failure.
pub fn compile(source: &str) -> Compilation {
    match bind_source(source) {
        Ok(compilation) => compilation,
        Err(err) => panic!("binding failed: {err}"),
    }
}

/// Binds source code and returns the error message, if any.
pub fn bind_error(source: &str) -> Option<String> {
    bind_source(source).err().map(|err| err.to_string())
}

/// Helper function to check if source code fails binding.
pub fn should_fail(source: &str) -> bool {
    bind_source(source).is_err()
}

/// Helper function to check if source code binds.
pub fn should_pass(source: &str) -> bool {
    bind_source(source).map(|_| ()).is_ok()
}

/// Looks up a member of the first class.
pub fn member(compilation: &Compilation, name: &str) -> SymbolId {
    let class = &compilation.classes[0].name;
    compilation
        .symbols
        .lookup_member(class, name)
        .unwrap_or_else(|| panic!("no member '{name}'"))
}

pub fn ok(result: Result<()>) {
    if let Err(err) = result {
        panic!("unexpected error: {err}");
    }
}
