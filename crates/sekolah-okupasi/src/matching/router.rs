use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{error, warn};

use super::service::{MatchError, SchoolStatsService};
use crate::catalog::CatalogStore;
use crate::response::{failure, success};

/// Router builder exposing the school ranking endpoint used by the map page.
pub fn school_stats_router<S>(service: Arc<SchoolStatsService<S>>) -> Router
where
    S: CatalogStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/schools/stats/by-occupation",
            get(school_stats_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchoolStatsQuery {
    #[serde(default)]
    pub(crate) occupation_code: Option<String>,
}

pub(crate) async fn school_stats_handler<S>(
    State(service): State<Arc<SchoolStatsService<S>>>,
    Query(query): Query<SchoolStatsQuery>,
) -> Response
where
    S: CatalogStore + 'static,
{
    match service.by_occupation(query.occupation_code.as_deref()) {
        Ok(stats) => success(StatusCode::OK, stats),
        Err(err @ MatchError::MissingOccupationCode) => {
            failure(StatusCode::BAD_REQUEST, &err.to_string())
        }
        Err(MatchError::OccupationNotFound { code }) => {
            warn!(occupation_code = %code, "school stats requested for unknown occupation");
            failure(StatusCode::NOT_FOUND, "Occupation not found")
        }
        Err(MatchError::Store(source)) => {
            error!(error = %source, "error fetching school stats");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch school stats",
            )
        }
    }
}
