// ABOUTME: Command implementations for each CLI subcommand
// ABOUTME: Exports export, columns, assemble, and validate commands

pub mod assemble;
pub mod columns;
pub mod export;
pub mod validate;

pub use assemble::assemble;
pub use columns::{columns, render_json};
pub use export::{export, run_export};
pub use validate::validate;
