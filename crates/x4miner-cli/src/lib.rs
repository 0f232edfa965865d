//! x4miner CLI library.
//!
//! Subcommand handlers, terminal styling, and output formatting for the
//! `x4miner` binary.

pub mod commands;
pub mod output;
pub mod terminal;
