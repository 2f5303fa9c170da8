use lambda_http::{Body, Error, Request, Response, run, service_fn};
use leadflow_core::models::MailConfig;
use leadflow_core::pipeline::{LeadContext, LeadResponse, respond};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    info!("Starting Leadflow lead-capture function");

    // One configuration snapshot and SMTP transport per execution
    // environment; every invocation reuses them
    let config = MailConfig::from_env();
    let ctx = Arc::new(LeadContext::new(config));

    run(service_fn(|event: Request| {
        let ctx = ctx.clone();
        async move { handler(ctx, event).await }
    }))
    .await
}

async fn handler(ctx: Arc<LeadContext>, event: Request) -> Result<Response<Body>, Error> {
    let (parts, body) = event.into_parts();
    let descriptor = respond(&ctx, &parts.method, &body.to_vec()).await;
    into_lambda(descriptor)
}

fn into_lambda(descriptor: LeadResponse) -> Result<Response<Body>, Error> {
    let mut builder = Response::builder()
        .status(descriptor.status)
        .header("x-content-type-options", "nosniff");

    let body = match descriptor.body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::Empty,
    };

    Ok(builder.body(body)?)
}
