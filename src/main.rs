use std::path::Path;
use std::sync::Arc;

use mail_dispatch::{EmailService, FileSource, MailConfig, email_to};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(to) = args.next() else {
        anyhow::bail!("Usage: mail-dispatch <to> [attachment-path ...] (set MAIL_SMTP_HOST first)");
    };
    let paths: Vec<String> = args.collect();

    let config = MailConfig::from_env()?;
    tracing::info!(
        "mail-dispatch v{} via {}:{} ({})",
        env!("CARGO_PKG_VERSION"),
        config.host,
        config.port,
        config.security
    );

    let mut builder = email_to(to)
        .subject("mail-dispatch test message")
        .text("Sent by mail-dispatch.");
    if let Ok(from) = std::env::var("MAIL_FROM") {
        builder = builder.from(from);
    }
    if !paths.is_empty() {
        builder = builder.html("<p>Sent by <b>mail-dispatch</b>.</p>");
    }
    for path in &paths {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        builder = builder.attachment(name, FileSource::new(path));
    }

    let service = Arc::new(EmailService::from_config(&config)?);
    service.send_async(builder.build()).await?;

    Ok(())
}
