//! CLI command handlers.

pub mod config;
pub mod lookup;
pub mod render;
pub mod run;
