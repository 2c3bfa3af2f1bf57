//! Command-line argument definitions for the Quill CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the backend,
//! configuration file selection, and logging verbosity.

use clap::Parser;

use quill::config::BackendChoice;

/// Command-line arguments for the Quill scene renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input scene file
    #[arg(help = "Path to the scene file (TOML)")]
    pub input: String,

    /// Path to the output markup file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Backend to render with (auto, svg, vml), overriding the configuration
    #[arg(short, long)]
    pub backend: Option<BackendChoice>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
