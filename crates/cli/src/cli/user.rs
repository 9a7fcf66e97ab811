//! Account CLI commands.

use clap::{Parser, Subcommand};

/// Account commands.
#[derive(Debug, Parser)]
pub struct UserCommand {
    #[command(subcommand)]
    pub action: UserAction,
}

/// Available account actions.
#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// Find or create the account for an email, as a login would.
    Resolve {
        /// Email claim value.
        #[arg(long)]
        email: String,
    },
}
