//! Shared utilities for the weave toolchain.

mod config;

pub use config::{CONFIG_FILE_NAME, Config, LinkerOptions};
