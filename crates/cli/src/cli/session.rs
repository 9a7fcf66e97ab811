//! Session CLI commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Session cache and index commands.
#[derive(Debug, Parser)]
pub struct SessionCommand {
    #[command(subcommand)]
    pub action: SessionAction,
}

/// Available session actions.
#[derive(Debug, Subcommand)]
pub enum SessionAction {
    /// Store a session, replacing any previous value.
    Set {
        /// Session key.
        sid: String,
        /// Text attribute as `name=value`. Repeatable.
        #[arg(long = "text", value_parser = parse_text_attribute)]
        texts: Vec<(String, String)>,
        /// Boolean attribute as `name=true|false`. Repeatable.
        #[arg(long = "flag", value_parser = parse_flag_attribute)]
        flags: Vec<(String, bool)>,
        /// PEM file with an RSA private or public key to embed.
        #[arg(long)]
        rsa_key_pem: Option<PathBuf>,
    },
    /// Show a stored session.
    Get {
        /// Session key.
        sid: String,
    },
    /// Remove a stored session.
    Delete {
        /// Session key.
        sid: String,
    },
    /// Report whether a session is stored.
    Contains {
        /// Session key.
        sid: String,
    },
    /// List session keys bound to a local user id.
    ByUid {
        /// Local user id.
        uid: String,
    },
    /// List session keys bound to a provider subject.
    BySub {
        /// Provider subject.
        sub: String,
    },
    /// Record which user and subject a session belongs to.
    Bind {
        /// Session key.
        sid: String,
        /// Local user id.
        #[arg(long)]
        uid: String,
        /// Provider subject.
        #[arg(long)]
        sub: String,
    },
}

fn split_assignment(s: &str) -> Result<(&str, &str), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => Err(format!("expected name=value, got '{s}'")),
    }
}

/// Parses `name=value`. The value may itself contain `=`.
pub fn parse_text_attribute(s: &str) -> Result<(String, String), String> {
    let (name, value) = split_assignment(s)?;
    Ok((name.to_string(), value.to_string()))
}

/// Parses `name=true` or `name=false`.
pub fn parse_flag_attribute(s: &str) -> Result<(String, bool), String> {
    let (name, value) = split_assignment(s)?;
    let value = value
        .parse::<bool>()
        .map_err(|_| format!("flag '{name}' must be true or false, got '{value}'"))?;
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_parse_text_attribute() {
        assert_eq!(
            parse_text_attribute("sub=abc"),
            Ok(("sub".to_string(), "abc".to_string()))
        );
        assert_eq!(
            parse_text_attribute("state=a=b"),
            Ok(("state".to_string(), "a=b".to_string()))
        );
        assert_eq!(
            parse_text_attribute("empty="),
            Ok(("empty".to_string(), String::new()))
        );
        assert!(parse_text_attribute("novalue").is_err());
        assert!(parse_text_attribute("=abc").is_err());
    }

    #[test]
    fn test_parse_flag_attribute() {
        assert_eq!(
            parse_flag_attribute("active=true"),
            Ok(("active".to_string(), true))
        );
        assert_eq!(
            parse_flag_attribute("active=false"),
            Ok(("active".to_string(), false))
        );
        assert!(parse_flag_attribute("active=yes").is_err());
    }

    #[test]
    fn test_set_collects_repeated_attributes() {
        let cli = Cli::try_parse_from([
            "oidcache", "session", "set", "sid123", "--text", "sub=abc", "--text", "nonce=n1",
            "--flag", "active=true",
        ])
        .unwrap();

        let Commands::Session(SessionCommand {
            action:
                SessionAction::Set {
                    sid,
                    texts,
                    flags,
                    rsa_key_pem,
                },
        }) = cli.command
        else {
            panic!("expected session set");
        };
        assert_eq!(sid, "sid123");
        assert_eq!(texts.len(), 2);
        assert_eq!(flags, vec![("active".to_string(), true)]);
        assert!(rsa_key_pem.is_none());
    }

    #[test]
    fn test_bind_requires_uid_and_sub() {
        assert!(Cli::try_parse_from(["oidcache", "session", "bind", "sid123", "--uid", "42"]).is_err());
        assert!(Cli::try_parse_from([
            "oidcache", "session", "bind", "sid123", "--uid", "42", "--sub", "abc"
        ])
        .is_ok());
    }
}
