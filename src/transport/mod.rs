//! Transport layer for the terminal UI and one-shot CLI commands

pub mod cli;
