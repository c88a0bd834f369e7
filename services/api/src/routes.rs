use crate::infra::{AppState, Catalog};
use crate::report::stats_csv;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use sekolah_okupasi::catalog::catalog_router;
use sekolah_okupasi::error::AppError;
use sekolah_okupasi::matching::school_stats_router;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExportQuery {
    #[serde(default)]
    pub(crate) occupation_code: Option<String>,
}

pub(crate) fn with_operational_routes(catalog: &Catalog) -> axum::Router {
    catalog_router(catalog.admin.clone())
        .merge(school_stats_router(catalog.stats.clone()))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/schools/stats/by-occupation/export",
            axum::routing::get(stats_export_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Ranking for one occupation as a CSV download.
pub(crate) async fn stats_export_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let stats = state.stats.by_occupation(query.occupation_code.as_deref())?;
    let body = stats_csv(&stats)?;
    let disposition = format!(
        "attachment; filename=\"school-stats-{}.csv\"",
        stats.occupation_code
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
