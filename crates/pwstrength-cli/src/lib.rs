//! Command-line front end for the password strength toolchain
//!
//! Subcommands mirror the offline pipeline: `generate` writes the synthetic
//! corpus, `train` fits and evaluates a forest, `download` fetches pre-trained
//! assets, and `predict` classifies a single password locally.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::run;
