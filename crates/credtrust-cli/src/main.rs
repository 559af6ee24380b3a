//! CredTrust CLI: command-line client for a CredTrust node.
//!
//! Subcommands: init, status, register, issuers, issue, verify, revoke,
//! credential-status, demo.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// CredTrust: issue, verify, and revoke signed credentials.
#[derive(Parser, Debug)]
#[command(name = "credtrust", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default node configuration.
    Init(commands::init::InitArgs),
    /// Query the status of a running node.
    Status(commands::status::StatusArgs),
    /// Register a new issuer.
    Register(commands::register::RegisterArgs),
    /// List registered issuers.
    Issuers(commands::issuers::IssuersArgs),
    /// Issue a credential to a holder.
    Issue(commands::issue::IssueArgs),
    /// Verify a credential token.
    Verify(commands::verify::VerifyArgs),
    /// Revoke a credential.
    Revoke(commands::revoke::RevokeArgs),
    /// Look up the revocation status of a credential.
    CredentialStatus(commands::credential_status::CredentialStatusArgs),
    /// Run the register, issue, verify, revoke, verify walkthrough.
    Demo(commands::demo::DemoArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Status(args) => commands::status::run(args).await,
        Commands::Register(args) => commands::register::run(args).await,
        Commands::Issuers(args) => commands::issuers::run(args).await,
        Commands::Issue(args) => commands::issue::run(args).await,
        Commands::Verify(args) => commands::verify::run(args).await,
        Commands::Revoke(args) => commands::revoke::run(args).await,
        Commands::CredentialStatus(args) => commands::credential_status::run(args).await,
        Commands::Demo(args) => commands::demo::run(args).await,
    }
}
