use anyhow::Result;
use leadflow_core::models::MailConfig;
use leadflow_core::pipeline::LeadContext;
use leadflow_server::app;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    info!("Starting Leadflow server");

    // Configuration is loaded once; an unconfigured process still serves
    // traffic and answers lead submissions with SERVICE_NOT_CONFIGURED
    let config = MailConfig::from_env();
    let ctx = Arc::new(LeadContext::new(config));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(8080);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port = port, configured = ctx.is_configured(), "Listening");

    axum::serve(listener, app(ctx)).await?;
    Ok(())
}
