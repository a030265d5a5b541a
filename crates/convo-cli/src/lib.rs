//! Library side of the `convo-graph` binary.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (build, inspect)
//! - `settings`: Layered configuration

pub mod cli;
pub mod commands;
pub mod settings;

pub use cli::{BuildArgs, Cli, Commands};
pub use commands::{
    apply_overrides, build_graph, init_logging, inspect_graph, print_summary, run_build,
    write_graph, BuildSummary,
};
pub use settings::{Settings, SettingsError};
