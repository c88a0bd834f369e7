use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::domain::{
    CompetencyId, CompetencyInput, ConcentrationInput, GraduateCompetencyInput, Occupation,
    OccupationId, OccupationInput, SchoolId, SchoolInput, SchoolView,
};
use super::pagination::PageMeta;
use super::service::{CatalogError, CatalogService, OccupationListQuery, SchoolListQuery};
use super::store::CatalogStore;
use crate::response::{failure, success, Message};

type SharedCatalog<S> = State<Arc<CatalogService<S>>>;

/// Router builder exposing the occupation, competency, school and concentration endpoints.
pub fn catalog_router<S>(service: Arc<CatalogService<S>>) -> Router
where
    S: CatalogStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/occupations",
            get(list_occupations_handler::<S>).post(create_occupation_handler::<S>),
        )
        .route(
            "/api/v1/occupations/search",
            get(search_occupations_handler::<S>),
        )
        .route(
            "/api/v1/occupations/by-name/:name",
            get(occupation_by_name_handler::<S>),
        )
        .route(
            "/api/v1/occupations/:id",
            get(get_occupation_handler::<S>)
                .put(update_occupation_handler::<S>)
                .delete(delete_occupation_handler::<S>),
        )
        .route(
            "/api/v1/occupations/:id/competencies",
            get(list_competencies_handler::<S>).post(create_competency_handler::<S>),
        )
        .route(
            "/api/v1/occupations/:id/competencies/:competency_id",
            get(get_competency_handler::<S>)
                .put(update_competency_handler::<S>)
                .delete(delete_competency_handler::<S>),
        )
        .route(
            "/api/v1/schools",
            get(list_schools_handler::<S>).post(create_school_handler::<S>),
        )
        .route(
            "/api/v1/schools/:id",
            get(get_school_handler::<S>)
                .put(update_school_handler::<S>)
                .delete(delete_school_handler::<S>),
        )
        .route(
            "/api/v1/schools/:id/competencies",
            get(list_school_competencies_handler::<S>)
                .post(add_school_competency_handler::<S>)
                .delete(remove_school_competency_handler::<S>),
        )
        .route(
            "/api/v1/concentrations",
            get(list_concentrations_handler::<S>).post(create_concentration_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Serialize)]
struct OccupationPage {
    occupations: Vec<Occupation>,
    meta: PageMeta,
}

#[derive(Debug, Serialize)]
struct SchoolPage {
    schools: Vec<SchoolView>,
    meta: PageMeta,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemoveCompetencyQuery {
    #[serde(default)]
    competency_id: Option<String>,
}

/// Map a catalog failure onto the response envelope.
pub(crate) fn catalog_error_response(err: CatalogError) -> Response {
    match err {
        CatalogError::InvalidInput(message) => failure(StatusCode::BAD_REQUEST, &message),
        CatalogError::NotFound(entity) => failure(
            StatusCode::NOT_FOUND,
            &format!("{} not found", capitalize(entity)),
        ),
        CatalogError::Conflict(message) => failure(StatusCode::CONFLICT, &message),
        CatalogError::Store(source) => {
            error!(error = %source, "catalog store failure");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to access the catalog store",
            )
        }
    }
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, CatalogError>) -> Response {
    match result {
        Ok(data) => success(status, data),
        Err(err) => catalog_error_response(err),
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) async fn list_occupations_handler<S>(
    State(service): SharedCatalog<S>,
    Query(query): Query<OccupationListQuery>,
) -> Response
where
    S: CatalogStore + 'static,
{
    let result = service.list_occupations(query).map(|page| OccupationPage {
        occupations: page.items,
        meta: page.meta,
    });
    respond(StatusCode::OK, result)
}

pub(crate) async fn create_occupation_handler<S>(
    State(service): SharedCatalog<S>,
    Json(input): Json<OccupationInput>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(StatusCode::CREATED, service.create_occupation(input))
}

pub(crate) async fn search_occupations_handler<S>(
    State(service): SharedCatalog<S>,
    Query(query): Query<SearchQuery>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(
        StatusCode::OK,
        service.search_occupations(query.query.as_deref()),
    )
}

pub(crate) async fn occupation_by_name_handler<S>(
    State(service): SharedCatalog<S>,
    Path(name): Path<String>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(StatusCode::OK, service.find_occupation_by_name(&name))
}

pub(crate) async fn get_occupation_handler<S>(
    State(service): SharedCatalog<S>,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(StatusCode::OK, service.get_occupation(&OccupationId(id)))
}

pub(crate) async fn update_occupation_handler<S>(
    State(service): SharedCatalog<S>,
    Path(id): Path<String>,
    Json(input): Json<OccupationInput>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(
        StatusCode::OK,
        service.update_occupation(&OccupationId(id), input),
    )
}

pub(crate) async fn delete_occupation_handler<S>(
    State(service): SharedCatalog<S>,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore + 'static,
{
    let result = service
        .delete_occupation(&OccupationId(id))
        .map(|()| Message::new("Occupation deleted successfully"));
    respond(StatusCode::OK, result)
}

pub(crate) async fn list_competencies_handler<S>(
    State(service): SharedCatalog<S>,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(StatusCode::OK, service.list_competencies(&OccupationId(id)))
}

pub(crate) async fn create_competency_handler<S>(
    State(service): SharedCatalog<S>,
    Path(id): Path<String>,
    Json(input): Json<CompetencyInput>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(
        StatusCode::CREATED,
        service.create_competency(&OccupationId(id), input),
    )
}

pub(crate) async fn get_competency_handler<S>(
    State(service): SharedCatalog<S>,
    Path((id, competency_id)): Path<(String, String)>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(
        StatusCode::OK,
        service.get_competency(&OccupationId(id), &CompetencyId(competency_id)),
    )
}

pub(crate) async fn update_competency_handler<S>(
    State(service): SharedCatalog<S>,
    Path((id, competency_id)): Path<(String, String)>,
    Json(input): Json<CompetencyInput>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(
        StatusCode::OK,
        service.update_competency(&OccupationId(id), &CompetencyId(competency_id), input),
    )
}

pub(crate) async fn delete_competency_handler<S>(
    State(service): SharedCatalog<S>,
    Path((id, competency_id)): Path<(String, String)>,
) -> Response
where
    S: CatalogStore + 'static,
{
    let result = service
        .delete_competency(&OccupationId(id), &CompetencyId(competency_id))
        .map(|()| Message::new("Competency deleted successfully"));
    respond(StatusCode::OK, result)
}

pub(crate) async fn list_schools_handler<S>(
    State(service): SharedCatalog<S>,
    Query(query): Query<SchoolListQuery>,
) -> Response
where
    S: CatalogStore + 'static,
{
    let result = service.list_schools(query).map(|page| SchoolPage {
        schools: page.items,
        meta: page.meta,
    });
    respond(StatusCode::OK, result)
}

pub(crate) async fn create_school_handler<S>(
    State(service): SharedCatalog<S>,
    Json(input): Json<SchoolInput>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(StatusCode::CREATED, service.create_school(input))
}

pub(crate) async fn get_school_handler<S>(
    State(service): SharedCatalog<S>,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(StatusCode::OK, service.get_school(&SchoolId(id)))
}

pub(crate) async fn update_school_handler<S>(
    State(service): SharedCatalog<S>,
    Path(id): Path<String>,
    Json(input): Json<SchoolInput>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(StatusCode::OK, service.update_school(&SchoolId(id), input))
}

pub(crate) async fn delete_school_handler<S>(
    State(service): SharedCatalog<S>,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore + 'static,
{
    let result = service
        .delete_school(&SchoolId(id))
        .map(|()| Message::new("School deleted successfully"));
    respond(StatusCode::OK, result)
}

pub(crate) async fn list_school_competencies_handler<S>(
    State(service): SharedCatalog<S>,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(StatusCode::OK, service.list_school_competencies(&SchoolId(id)))
}

pub(crate) async fn add_school_competency_handler<S>(
    State(service): SharedCatalog<S>,
    Path(id): Path<String>,
    Json(input): Json<GraduateCompetencyInput>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_school_competency(&SchoolId(id), input),
    )
}

pub(crate) async fn remove_school_competency_handler<S>(
    State(service): SharedCatalog<S>,
    Path(id): Path<String>,
    Query(query): Query<RemoveCompetencyQuery>,
) -> Response
where
    S: CatalogStore + 'static,
{
    let result = service
        .remove_school_competency(&SchoolId(id), query.competency_id.as_deref())
        .map(|()| Message::new("School competency deleted successfully"));
    respond(StatusCode::OK, result)
}

pub(crate) async fn list_concentrations_handler<S>(State(service): SharedCatalog<S>) -> Response
where
    S: CatalogStore + 'static,
{
    respond(StatusCode::OK, service.list_concentrations())
}

pub(crate) async fn create_concentration_handler<S>(
    State(service): SharedCatalog<S>,
    Json(input): Json<ConcentrationInput>,
) -> Response
where
    S: CatalogStore + 'static,
{
    respond(StatusCode::CREATED, service.create_concentration(input))
}
