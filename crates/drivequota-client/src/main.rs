//! drivequota CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use drivequota_core::{TracingConfig, init_tracing};

use drivequota_client::cli::{AccountsAction, Cli, Command, ConfigAction};
use drivequota_client::commands::{accounts, check, config as config_cmd, quota};
use drivequota_client::config::ClientConfig;
use drivequota_client::error::{ClientError, ClientResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing = if cli.debug {
        TracingConfig::debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing) {
        eprintln!("warning: logging disabled: {}", e);
    }

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<String> {
    let config_path = cli.config_path();
    let config = ClientConfig::load_or_default(&config_path).map_err(ClientError::Config)?;
    let format = cli.output_format();

    match cli.command {
        None | Some(Command::Quota) => {
            let user = config.effective_user(cli.user.as_deref())?;
            let mut options = config.display.format_options();
            options.show_breakdown |= cli.breakdown;
            quota::show(&config, &user, format, options).await
        }
        Some(Command::Accounts { action }) => {
            let user = config.effective_user(cli.user.as_deref())?;
            let store = check::open_store(&config)?;
            match action {
                AccountsAction::List => accounts::list(&*store, &user, format),
                AccountsAction::Link {
                    account_id,
                    email,
                    token_file,
                    access_token,
                    refresh_token,
                    expires_in,
                } => {
                    let tokens = match token_file {
                        Some(path) => accounts::LinkTokens::from_file(&path)?,
                        None => accounts::LinkTokens::from_flags(
                            access_token,
                            refresh_token,
                            expires_in,
                        )?,
                    };
                    let account = accounts::link(&*store, &user, &account_id, email, tokens)?;
                    Ok(format!("Linked {}", account))
                }
                AccountsAction::Disconnect { account_id } => {
                    let account = accounts::disconnect(&*store, &user, &account_id)?;
                    Ok(format!("Disconnected {}", account))
                }
            }
        }
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => config_cmd::dump(&config, &config_path),
            ConfigAction::Validate => config_cmd::validate(&config),
            ConfigAction::Path => Ok(config_cmd::path(&config, &config_path)),
            ConfigAction::SetCredentials {
                client_id,
                client_secret,
                credentials_file,
            } => config_cmd::set_credentials(
                &config_path,
                client_id,
                client_secret,
                credentials_file,
            ),
        },
        Some(Command::Check) => {
            let user = config.effective_user(cli.user.as_deref())?;
            check::check(&config, &user)
        }
    }
}
