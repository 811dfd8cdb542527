//! CLI module for Gatehouse
//!
//! Provides command-line interface parsing for the gatehouse-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use rand::RngCore;
use std::path::PathBuf;

use crate::auth::jwt::TokenService;

/// Gatehouse - stateless bearer-token authentication server
#[derive(Parser, Debug)]
#[command(
    name = "gatehouse-server",
    author = "Gatehouse Developers",
    version,
    about = "Gatehouse - stateless bearer-token authentication server",
    long_about = "Issues and verifies signed bearer tokens and guards HTTP routes with them.\n\n\
                  Run without arguments to start the server, or use 'keygen' to create a signing key.",
    after_help = "EXAMPLES:\n    \
                  gatehouse-server                        # Start the server (reads gatehouse.toml)\n    \
                  gatehouse-server --config my.toml       # Use a custom config file\n    \
                  gatehouse-server config --validate      # Check the configuration and exit\n    \
                  gatehouse-server keygen                 # Print a fresh base64 signing key"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "gatehouse.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default when no subcommand is given)
    Serve,

    /// Show configuration information
    Config {
        /// Validate the configuration file, including the signing key
        #[arg(long)]
        validate: bool,
    },

    /// Generate a random base64 signing key
    Keygen {
        /// Key length in bytes
        #[arg(short, long, default_value_t = 64)]
        bytes: usize,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Generate `len` random bytes and encode them as standard base64.
///
/// Returns `None` when `len` is shorter than the minimum HMAC key length.
pub fn generate_key(len: usize) -> Option<String> {
    if len < TokenService::MIN_KEY_LENGTH {
        return None;
    }

    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    Some(STANDARD.encode(bytes))
}
