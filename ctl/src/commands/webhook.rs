use std::process::ExitCode;

use certdir_client::webhook::WebhookStatus;

use super::Context;

pub async fn status(ctx: &mut Context) -> anyhow::Result<ExitCode> {
    let mut toggle = ctx.webhook();
    let status = toggle.check().await;
    ctx.flush();

    Ok(print_status(&status))
}

pub async fn configure(ctx: &mut Context) -> anyhow::Result<ExitCode> {
    let mut toggle = ctx.webhook();
    let result = toggle.configure().await;
    ctx.flush();

    match result {
        Ok(status) => Ok(print_status(&status)),
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

fn print_status(status: &WebhookStatus) -> ExitCode {
    match status {
        WebhookStatus::Active { url } => {
            println!("Webhook active: {url}");
            ExitCode::SUCCESS
        }
        WebhookStatus::NotConfigured => {
            println!("Webhook not configured");
            ExitCode::SUCCESS
        }
        WebhookStatus::Error | WebhookStatus::Unknown => {
            println!("Webhook status unavailable");
            ExitCode::FAILURE
        }
    }
}
