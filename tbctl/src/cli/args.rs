//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// tbctl - terminal admin console for ThingsBoard-compatible IoT platforms
#[derive(Parser, Debug)]
#[command(name = "tbctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute; defaults to the interactive console
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive session console
    Console,

    /// Manage configured server environments
    Env {
        #[command(subcommand)]
        action: EnvAction,
    },

    /// Open the active environment's web UI in a browser
    Open,
}

/// Environment registry actions
#[derive(Subcommand, Debug)]
pub enum EnvAction {
    /// Add a server environment and make it active
    Add {
        /// Display name
        name: String,

        /// Base URL, e.g. http://localhost:8080
        url: String,
    },

    /// List configured environments
    List,

    /// Remove an environment by id
    Remove {
        /// Environment id
        id: String,
    },

    /// Make an environment active (forces re-authentication)
    Select {
        /// Environment id
        id: String,
    },
}
