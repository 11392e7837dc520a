//! Command-line argument definitions for the Spindle CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the passes to run,
//! configuration file selection, and logging verbosity.

use clap::{Parser, ValueEnum};

/// A processing pass applied to the loaded diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pass {
    /// Auto-layout nodes and reroute every flow
    Layout,
    /// Recreate flow and start event labels
    Labels,
    /// Rename non-sequential ids into `_<n>` / `flow_<n>`
    Ids,
}

/// Command-line arguments for the Spindle layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input diagram document (TOML)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output diagram document
    #[arg(short, long, default_value = "out.toml")]
    pub output: String,

    /// Passes to run, in order
    #[arg(
        short,
        long = "pass",
        value_enum,
        value_delimiter = ',',
        default_values_t = [Pass::Layout, Pass::Labels, Pass::Ids]
    )]
    pub passes: Vec<Pass>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
