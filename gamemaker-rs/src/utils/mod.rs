//! Shared utilities for the gamemaker-rs CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
