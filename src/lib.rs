// ABOUTME: Library module for pg-column-export
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod config;
pub mod export;
pub mod postgres;
pub mod utils;
