//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the global configuration document
    #[arg(long, value_name = "PATH", global = true)]
    pub global: Option<PathBuf>,

    /// Path to the local override document (dev environment only)
    #[arg(long, value_name = "PATH", global = true)]
    pub local: Option<PathBuf>,

    /// Run outside the dev environment: the local document is never loaded
    #[arg(long, global = true)]
    pub production: bool,

    /// Resolver options file (YAML)
    #[arg(long, value_name = "PATH", global = true)]
    pub options: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the value of a key
    Get {
        /// Key to look up
        key: String,

        /// Restrict the lookup to a scope path such as /configuration/appSettings/paths/
        #[arg(long, value_name = "SCOPE")]
        scope: Option<String>,

        /// Fail with this message when the key has no value
        #[arg(long, value_name = "MESSAGE")]
        required: Option<String>,
    },

    /// Print the value of a key as an integer
    GetInt {
        key: String,
    },

    /// Print the value of a key as a boolean
    GetBool {
        key: String,
    },

    /// Print a connection string
    ConnectionString {
        key: String,
    },

    /// Print a configured path
    Path {
        key: String,
    },

    /// Set a value in the global document
    Set {
        key: String,
        value: String,

        /// Write under this scope path instead of updating the key wherever it is
        #[arg(long, value_name = "SCOPE")]
        scope: Option<String>,
    },

    /// Show which documents are in use
    Locate {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}
