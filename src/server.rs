//! # Server Configuration
//!
//! Router, OpenAPI document and serve loop for the operator admin API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::auth_middleware;
use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry::trace_context_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let admin = Router::new()
        .route("/admin/tenancy", get(handlers::tenancy::get_status))
        .route(
            "/admin/tenancy/backfill",
            post(handlers::tenancy::run_backfill),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .merge(admin)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Serves the admin API until Ctrl-C.
pub async fn run_server(config: Arc<AppConfig>, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config.bind_addr().context("invalid api bind address")?;
    let state = AppState {
        config: Arc::clone(&config),
        db,
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, profile = %config.profile, "Admin API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("admin API server error")?;

    tracing::info!("Admin API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::tenancy::get_status,
        crate::handlers::tenancy::run_backfill,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::DomainTable,
            crate::handlers::HealthResponse,
            crate::backfill::TenancyStatus,
            crate::backfill::BackfillReport,
            crate::backfill::TableCount,
            crate::backfill::SupportRowsCreated,
            crate::error::ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "root", description = "Service metadata and health"),
        (name = "tenancy", description = "Tenant backfill operations")
    ),
    info(
        title = "CRM Tenancy Admin API",
        description = "Operator API for the multi-tenant data backfill",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
