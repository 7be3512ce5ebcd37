//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use drivequota_core::OutputFormat;

/// drivequota - Google Drive storage across all your linked accounts
#[derive(Debug, Parser)]
#[command(name = "drivequota")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "DRIVEQUOTA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Local user whose accounts to use (defaults to $USER)
    #[arg(long, short, env = "DRIVEQUOTA_USER", global = true)]
    pub user: Option<String>,

    /// Show the Drive/trash usage breakdown
    #[arg(long)]
    pub breakdown: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns the output format based on CLI flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Tty
        }
    }

    /// Returns the config file to read and write.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::ClientConfig::default_path)
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show quota per linked account and the total (default)
    Quota,

    /// Manage linked Google accounts
    Accounts {
        #[command(subcommand)]
        action: AccountsAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check that configuration and token store are usable
    Check,
}

/// Account management actions.
#[derive(Debug, Subcommand)]
pub enum AccountsAction {
    /// List linked accounts
    List,

    /// Link a Google account from tokens obtained by an OAuth consent flow
    Link {
        /// Google account identifier (the `sub` claim)
        account_id: String,

        /// Account email, shown instead of the identifier
        #[arg(long)]
        email: Option<String>,

        /// JSON token response (`access_token`, `refresh_token`, `expires_in`, `scope`)
        #[arg(long, conflicts_with_all = ["access_token", "refresh_token", "expires_in"])]
        token_file: Option<PathBuf>,

        /// Access token
        #[arg(long, env = "DRIVEQUOTA_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,

        /// Refresh token
        #[arg(long, env = "DRIVEQUOTA_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: Option<String>,

        /// Access token lifetime in seconds
        #[arg(long)]
        expires_in: Option<i64>,
    },

    /// Disconnect a linked account and delete its credential
    Disconnect {
        /// Google account identifier
        account_id: String,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration and token store paths
    Path,

    /// Save OAuth client credentials to config.toml
    SetCredentials {
        /// OAuth client ID (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
        client_secret: Option<String>,

        /// Path to Google Cloud Console credentials JSON file
        #[arg(long, env = "GOOGLE_CREDENTIALS_FILE")]
        credentials_file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_quota() {
        let cli = Cli::try_parse_from(["drivequota", "--json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.output_format(), OutputFormat::Json);
    }

    #[test]
    fn link_with_flags() {
        let cli = Cli::try_parse_from([
            "drivequota",
            "--user",
            "alice",
            "accounts",
            "link",
            "1234",
            "--email",
            "alice@example.com",
            "--access-token",
            "ya29.x",
            "--refresh-token",
            "1//r",
            "--expires-in",
            "3599",
        ])
        .unwrap();

        assert_eq!(cli.user.as_deref(), Some("alice"));
        match cli.command {
            Some(Command::Accounts {
                action:
                    AccountsAction::Link {
                        account_id,
                        email,
                        refresh_token,
                        expires_in,
                        ..
                    },
            }) => {
                assert_eq!(account_id, "1234");
                assert_eq!(email.as_deref(), Some("alice@example.com"));
                assert_eq!(refresh_token.as_deref(), Some("1//r"));
                assert_eq!(expires_in, Some(3599));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn token_file_conflicts_with_token_flags() {
        let result = Cli::try_parse_from([
            "drivequota",
            "accounts",
            "link",
            "1234",
            "--token-file",
            "tokens.json",
            "--access-token",
            "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["drivequota", "accounts", "list", "--json"]).unwrap();
        assert!(cli.json);
    }
}
