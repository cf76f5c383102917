//! # Tenancy Admin Handlers
//!
//! Operator endpoints to inspect and run the tenant backfill. Rollback is
//! CLI-only.

use axum::{extract::State, response::Json};

use crate::backfill::{
    BackfillOptions, BackfillReport, TenancyStatus, TenantBackfill, tenancy_status,
};
use crate::error::ApiError;
use crate::server::AppState;

/// Current tenancy state: support rows and unassigned domain rows
#[utoipa::path(
    get,
    path = "/admin/tenancy",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tenancy status", body = TenancyStatus),
        (status = 401, description = "Missing or invalid operator token", body = ApiError),
        (status = 503, description = "Datastore unavailable", body = ApiError)
    ),
    tag = "tenancy"
)]
pub async fn get_status(State(state): State<AppState>) -> Result<Json<TenancyStatus>, ApiError> {
    let status = tenancy_status(&state.db).await?;
    Ok(Json(status))
}

/// Run the tenant backfill; safe to repeat
#[utoipa::path(
    post,
    path = "/admin/tenancy/backfill",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Backfill completed", body = BackfillReport),
        (status = 401, description = "Missing or invalid operator token", body = ApiError),
        (status = 500, description = "Backfill aborted; details name the failed step", body = ApiError),
        (status = 503, description = "Datastore unavailable", body = ApiError)
    ),
    tag = "tenancy"
)]
pub async fn run_backfill(
    State(state): State<AppState>,
) -> Result<Json<BackfillReport>, ApiError> {
    let options = BackfillOptions::from(&state.config.backfill);
    let report = TenantBackfill::new(&state.db)
        .with_options(options)
        .run()
        .await?;

    tracing::info!(
        tenant_id = %report.tenant_id,
        rows = report.total_assigned(),
        "Backfill triggered through admin API"
    );

    Ok(Json(report))
}
