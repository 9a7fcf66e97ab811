//! CLI command definitions.

pub mod session;
pub mod user;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Inspect and manage oidcache session caches and accounts.
///
/// Providers and cache slots are read from `OIDCACHE_*` environment variables.
#[derive(Debug, Parser)]
#[command(name = "oidcache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Provider whose cache slot session commands use.
    #[arg(long, env = "OIDCACHE_PROVIDER", default_value = "default")]
    pub provider: String,

    /// SQLite database holding accounts and the session index.
    #[arg(long, env = "OIDCACHE_SQLITE_PATH", default_value = "oidcache.db")]
    pub sqlite_path: PathBuf,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Session cache and index operations.
    Session(session::SessionCommand),
    /// Account operations.
    User(user::UserCommand),
    /// Create the account and session index tables.
    ///
    /// Every command already does this on startup; `migrate` runs it alone.
    Migrate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_defaults() {
        let cli = Cli::try_parse_from(["oidcache", "migrate"]).unwrap();

        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(matches!(cli.command, Commands::Migrate));
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from([
            "oidcache",
            "--provider",
            "corp-sso",
            "--sqlite-path",
            "/tmp/o.db",
            "--format",
            "json",
            "migrate",
        ])
        .unwrap();

        assert_eq!(cli.provider, "corp-sso");
        assert_eq!(cli.sqlite_path, PathBuf::from("/tmp/o.db"));
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
