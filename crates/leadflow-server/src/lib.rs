/// Leadflow Server - long-running HTTP shell
///
/// A thin adapter over the hosting-agnostic pipeline in `leadflow-core`: it
/// feeds method + body into `respond` and maps the returned descriptor onto
/// an axum response unchanged.
pub mod health;
pub mod middleware;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
};
use leadflow_core::pipeline::{LeadContext, LeadResponse, respond};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

/// Builds the application router
pub fn app(ctx: Arc<LeadContext>) -> Router {
    Router::new()
        // any() so the 405 contract comes from the pipeline, not from axum
        .route("/api/lead", any(lead))
        .route("/health", get(health::handler))
        .route_layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .with_state(ctx)
}

/// Lead submission endpoint
async fn lead(State(ctx): State<Arc<LeadContext>>, method: Method, body: Bytes) -> Response {
    into_http(respond(&ctx, &method, &body).await)
}

fn into_http(descriptor: LeadResponse) -> Response {
    match descriptor.body {
        Some(body) => (descriptor.status, axum::Json(body)).into_response(),
        None => descriptor.status.into_response(),
    }
}
