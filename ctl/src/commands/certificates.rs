use std::process::ExitCode;

use certdir_client::{client::Lookup, directory::Deletion};
use certdir_common::views::CertificateStatus;
use chrono::NaiveDate;
use clap::Parser;

use super::Context;
use crate::{output, prompt::TerminalConfirm};

#[derive(Clone, Parser)]
pub struct CreateCertificateArgs {
    /// Certificate ID, e.g. CERT-2024-001
    #[arg(long)]
    pub id: String,

    /// Name of the certificate holder
    #[arg(long)]
    pub owner: String,

    /// Link to the certificate document
    #[arg(long)]
    pub url: String,

    #[arg(long)]
    pub status: Option<CertificateStatus>,

    /// First day the certificate is in force (YYYY-MM-DD)
    #[arg(long)]
    pub valid_from: Option<NaiveDate>,

    /// Last day the certificate is in force (YYYY-MM-DD)
    #[arg(long)]
    pub valid_until: Option<NaiveDate>,
}

#[derive(Clone, Parser)]
pub struct UpdateCertificateArgs {
    pub id: String,

    #[arg(long)]
    pub owner: Option<String>,

    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub status: Option<CertificateStatus>,

    #[arg(long)]
    pub valid_from: Option<NaiveDate>,

    #[arg(long)]
    pub valid_until: Option<NaiveDate>,
}

pub async fn list(ctx: &mut Context) -> anyhow::Result<ExitCode> {
    let mut directory = ctx.directory();
    directory.refresh().await;

    if let Some(reason) = ctx.flush().first() {
        eprintln!("✗ Could not load certificates: {reason}");
        return Ok(ExitCode::FAILURE);
    }

    output::print_certificates(directory.state().certificates(), ctx.json)?;
    Ok(ExitCode::SUCCESS)
}

pub async fn lookup(ctx: &mut Context, id: &str) -> anyhow::Result<ExitCode> {
    let mut directory = ctx.directory();
    let result = directory.lookup(id).await;
    ctx.flush();

    match result {
        Ok(Lookup::Found(cert)) => {
            output::print_certificate(&cert, ctx.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(Lookup::NotFound) | Err(_) => Ok(ExitCode::FAILURE),
    }
}

pub async fn create(
    ctx: &mut Context,
    CreateCertificateArgs {
        id,
        owner,
        url,
        status,
        valid_from,
        valid_until,
    }: CreateCertificateArgs,
) -> anyhow::Result<ExitCode> {
    let mut directory = ctx.directory();

    let draft = directory.draft_mut();
    draft.id = id;
    draft.owner_name = owner;
    draft.certificate_url = url;
    draft.status = status;
    draft.valid_from = valid_from;
    draft.valid_until = valid_until;

    let result = directory.create().await;
    Ok(finish(ctx, result.is_ok()))
}

pub async fn update(ctx: &mut Context, args: UpdateCertificateArgs) -> anyhow::Result<ExitCode> {
    let mut directory = ctx.directory();
    directory.refresh().await;

    if let Some(reason) = ctx.flush().first() {
        eprintln!("✗ Could not load certificates: {reason}");
        return Ok(ExitCode::FAILURE);
    }

    let Ok(draft) = directory.begin_edit(&args.id) else {
        return Ok(finish(ctx, false));
    };

    if let Some(owner) = args.owner {
        draft.owner_name = owner;
    }
    if let Some(url) = args.url {
        draft.certificate_url = url;
    }
    if let Some(status) = args.status {
        draft.status = Some(status);
    }
    if args.valid_from.is_some() {
        draft.valid_from = args.valid_from;
    }
    if args.valid_until.is_some() {
        draft.valid_until = args.valid_until;
    }

    let result = directory.save_edit().await;
    if result.is_err() {
        directory.cancel_edit();
    }
    Ok(finish(ctx, result.is_ok()))
}

pub async fn set_status(
    ctx: &mut Context,
    id: &str,
    status: CertificateStatus,
) -> anyhow::Result<ExitCode> {
    let mut directory = ctx.directory();
    let result = directory.set_status(id, status).await;
    Ok(finish(ctx, result.is_ok()))
}

pub async fn delete(ctx: &mut Context, id: &str, yes: bool) -> anyhow::Result<ExitCode> {
    let mut directory = ctx.directory();

    let result = if yes {
        directory.delete(id, &|_: &str| true).await
    } else {
        directory.delete(id, &TerminalConfirm).await
    };

    if let Ok(Deletion::Declined) = result {
        eprintln!("Deletion cancelled");
    }
    Ok(finish(ctx, result.is_ok()))
}

/// Prints the notices an operation raised. Failures were already reported
/// that way, so only the exit code is left to decide.
fn finish(ctx: &mut Context, ok: bool) -> ExitCode {
    ctx.flush();
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
