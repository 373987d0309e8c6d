//! GameMaker command-line tools
//!
//! Inspection and preview commands for skeletal animation data, built on
//! the `gm-animation` crate.

pub mod cli;
pub mod commands;
pub mod utils;
