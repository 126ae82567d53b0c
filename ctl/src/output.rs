use certdir_client::notify::{Notice, NoticeLevel};
use certdir_common::views::Certificate;

pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success => eprintln!("✓ {}", notice.message),
        NoticeLevel::Error => eprintln!("✗ {}", notice.message),
    }
}

pub fn print_certificates(certs: &[Certificate], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(certs)?);
        return Ok(());
    }

    if certs.is_empty() {
        println!("No certificates.");
        return Ok(());
    }

    for cert in certs {
        println!("{}", summary_line(cert));
    }
    Ok(())
}

pub fn print_certificate(cert: &Certificate, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(cert)?);
        return Ok(());
    }

    println!("ID:      {}", cert.id);
    println!("Owner:   {}", cert.owner_name);
    println!("Status:  {}", cert.status);
    if let Some(window) = validity(cert) {
        println!("Valid:   {window}");
    }
    println!("URL:     {}", cert.certificate_url);
    if let Some(created_at) = &cert.created_at {
        println!("Created: {created_at}");
    }
    Ok(())
}

fn summary_line(cert: &Certificate) -> String {
    let mut line = format!(
        "{:<16} {:<8} {:<24} {}",
        cert.id,
        cert.status.as_str(),
        cert.owner_name,
        cert.certificate_url
    );

    if let Some(window) = validity(cert) {
        line.push_str(&format!(" ({window})"));
    }
    line
}

fn validity(cert: &Certificate) -> Option<String> {
    match (cert.valid_from, cert.valid_until) {
        (None, None) => None,
        (Some(from), Some(until)) => Some(format!("{from} to {until}")),
        (Some(from), None) => Some(format!("from {from}")),
        (None, Some(until)) => Some(format!("until {until}")),
    }
}
