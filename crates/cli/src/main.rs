//! AngoHost CLI - operator tools for the back office.
//!
//! # Usage
//!
//! ```bash
//! # Give a member of staff the support role
//! ah-cli user set-role -u ana@angohost.ao -r support
//!
//! # Deactivate or re-activate an account
//! ah-cli user toggle-active -u ana@angohost.ao
//!
//! # Look up a taxpayer number
//! ah-cli nif lookup 5417123456
//!
//! # Check SMTP credentials
//! ah-cli smtp test -s mail.angohost.ao -p 587 -u noreply@angohost.ao
//!
//! # Mark past-due invoices overdue
//! ah-cli invoices sweep-overdue
//! ```
//!
//! # Commands
//!
//! - `user` - Change roles and activation (needs `BAAS_URL`, `BAAS_SERVICE_KEY`)
//! - `nif lookup` - Query the taxpayer registry (`NIF_LOOKUP_URL`)
//! - `smtp test` - Connect to an SMTP server and log in
//! - `invoices sweep-overdue` - Mark pending invoices past their due date

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use angohost_admin::services::SmtpTestRequest;
use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "ah-cli")]
#[command(author, version, about = "AngoHost CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage customer and staff profiles
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Taxpayer registry
    Nif {
        #[command(subcommand)]
        action: NifAction,
    },
    /// Outgoing mail
    Smtp {
        #[command(subcommand)]
        action: SmtpAction,
    },
    /// Invoice maintenance
    Invoices {
        #[command(subcommand)]
        action: InvoiceAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Change a user's role
    SetRole {
        /// Email address or profile id
        #[arg(short, long)]
        user: String,

        /// New role (`admin`, `support`, `finance`, `customer`)
        #[arg(short, long)]
        role: String,
    },
    /// Deactivate an active user, or re-activate an inactive one
    ToggleActive {
        /// Email address or profile id
        #[arg(short, long)]
        user: String,
    },
}

#[derive(Subcommand)]
enum NifAction {
    /// Look up a NIF
    Lookup {
        /// Taxpayer number
        nif: String,

        /// Registry base URL; the NIF is appended as the last path segment
        #[arg(long, env = "NIF_LOOKUP_URL")]
        url: Option<String>,

        /// Request timeout in seconds
        #[arg(long, env = "NIF_TIMEOUT_SECS", default_value_t = 10)]
        timeout: u64,
    },
}

#[derive(Subcommand)]
enum SmtpAction {
    /// Connect, authenticate and disconnect
    Test {
        /// SMTP server host name
        #[arg(short, long, env = "SMTP_HOST")]
        server: String,

        /// Port (465 for implicit TLS, otherwise STARTTLS)
        #[arg(short, long, env = "SMTP_PORT", default_value_t = 587)]
        port: u16,

        /// Login user; leave empty to skip authentication
        #[arg(short, long, env = "SMTP_USERNAME", default_value = "")]
        user: String,

        /// Login password
        #[arg(long, env = "SMTP_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum InvoiceAction {
    /// Mark pending invoices past their due date as overdue
    SweepOverdue,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::User { action } => match action {
            UserAction::SetRole { user, role } => {
                let profile = commands::users::set_role(commands::connect()?, &user, &role).await?;
                tracing::info!("{} is now {}", profile.email, profile.role);
            }
            UserAction::ToggleActive { user } => {
                let profile = commands::users::toggle_active(commands::connect()?, &user).await?;
                let state = if profile.is_active {
                    "active"
                } else {
                    "inactive"
                };
                tracing::info!("{} is now {state}", profile.email);
            }
        },
        Commands::Nif { action } => match action {
            NifAction::Lookup { nif, url, timeout } => {
                commands::nif::lookup(url, Duration::from_secs(timeout), &nif).await?;
            }
        },
        Commands::Smtp { action } => match action {
            SmtpAction::Test {
                server,
                port,
                user,
                password,
            } => {
                commands::smtp::test(SmtpTestRequest {
                    smtp_server: server,
                    smtp_port: port,
                    smtp_user: user,
                    smtp_password: password,
                })
                .await?;
            }
        },
        Commands::Invoices { action } => match action {
            InvoiceAction::SweepOverdue => {
                commands::invoices::sweep_overdue(commands::connect()?).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
