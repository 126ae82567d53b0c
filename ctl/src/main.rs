use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context as _, bail};
use certdir_client::{client::ApiClient, credentials::StaticAdminIdentity};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{
    commands::{
        Context,
        certificates::{CreateCertificateArgs, UpdateCertificateArgs},
    },
    config::{ConfigOverrides, CtlConfig},
};

mod commands;
mod config;
mod output;
mod prompt;

#[derive(Parser)]
#[command(name = "certctl", version, about = "Look up and manage certificates in a certificate directory")]
pub struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(long, short, global = true, env = "CERTDIR_CONFIG_PATH")]
    config_path: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List every certificate in the directory
    List,

    /// Look a certificate up by its ID
    Lookup { id: String },

    /// Add a certificate
    Create(CreateCertificateArgs),

    /// Edit a certificate, sending the full record back
    Update(UpdateCertificateArgs),

    /// Change only the status of a certificate
    SetStatus {
        id: String,

        /// valid or invalid
        status: certdir_common::views::CertificateStatus,
    },

    /// Delete a certificate
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Inspect or register the bot webhook
    #[command(subcommand)]
    Webhook(WebhookCommand),
}

#[derive(Subcommand)]
pub enum WebhookCommand {
    /// Show whether a webhook is registered
    Status,

    /// Register the webhook, then show its status
    Configure,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("✗ {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "certctl=debug,certdir_client=debug"
    } else {
        "certctl=warn,certdir_client=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = CtlConfig::load(args.config_path.as_deref(), &args.overrides)?;

    if matches!(args.command, Command::Webhook(_)) && config.webhook_url.is_none() {
        bail!("No webhook endpoint configured (set CERTDIR_WEBHOOK_URL or --webhook-url)");
    }

    let api = ApiClient::new(
        &config.api_url,
        config.webhook_url.as_deref(),
        Arc::new(StaticAdminIdentity::new(config.admin_identity.clone())),
    )
    .context("Failed to create API client")?;

    let mut ctx = Context::new(Arc::new(api), args.json);

    match args.command {
        Command::List => commands::certificates::list(&mut ctx).await,
        Command::Lookup { id } => commands::certificates::lookup(&mut ctx, &id).await,
        Command::Create(params) => commands::certificates::create(&mut ctx, params).await,
        Command::Update(params) => commands::certificates::update(&mut ctx, params).await,
        Command::SetStatus { id, status } => {
            commands::certificates::set_status(&mut ctx, &id, status).await
        }
        Command::Delete { id, yes } => commands::certificates::delete(&mut ctx, &id, yes).await,
        Command::Webhook(WebhookCommand::Status) => commands::webhook::status(&mut ctx).await,
        Command::Webhook(WebhookCommand::Configure) => commands::webhook::configure(&mut ctx).await,
    }
}
