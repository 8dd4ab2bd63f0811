use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::repository::{SessionId, SessionStore};
use super::service::{AnalysisError, AnalysisService};
use crate::workflows::plots::PlotId;
use crate::workflows::recommendation::{Language, RecommendationError, Recommender};
use crate::workflows::scoring::{ExportView, FullRow, MapPoint, MinimalRow};

/// Header carrying the uploaded file's name, echoed back in session summaries.
pub const SOURCE_NAME_HEADER: &str = "x-source-name";
const DEFAULT_RANKING_LIMIT: usize = 5;
const MAX_RANKING_LIMIT: usize = 100;

/// Router builder exposing upload, lookup, recommendation and export endpoints.
pub fn session_router<S, R>(service: Arc<AnalysisService<S, R>>) -> Router
where
    S: SessionStore + 'static,
    R: Recommender + 'static,
{
    Router::new()
        .route("/api/v1/sessions", post(upload_handler::<S, R>))
        .route(
            "/api/v1/sessions/:session_id",
            get(summary_handler::<S, R>).delete(close_handler::<S, R>),
        )
        .route(
            "/api/v1/sessions/:session_id/plots",
            get(plots_handler::<S, R>),
        )
        .route(
            "/api/v1/sessions/:session_id/plots/:plot_id",
            get(plot_handler::<S, R>),
        )
        .route(
            "/api/v1/sessions/:session_id/plots/:plot_id/recommendation",
            get(recommendation_handler::<S, R>),
        )
        .route(
            "/api/v1/sessions/:session_id/export",
            get(export_handler::<S, R>),
        )
        .route("/api/v1/sessions/:session_id/map", get(map_handler::<S, R>))
        .route(
            "/api/v1/sessions/:session_id/rankings",
            get(rankings_handler::<S, R>),
        )
        .with_state(service)
}

/// Raw `?view=` value, parsed with [`ExportView`]'s `FromStr` so aliases
/// and error bodies match the rest of the API.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ViewQuery {
    view: Option<String>,
}

impl ViewQuery {
    fn view(&self) -> Result<ExportView, AnalysisError> {
        match self.view.as_deref() {
            Some(raw) => Ok(raw.parse::<ExportView>()?),
            None => Ok(ExportView::default()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LanguageQuery {
    language: Option<String>,
}

impl LanguageQuery {
    fn language(&self) -> Result<Language, AnalysisError> {
        match self.language.as_deref() {
            Some(raw) => Ok(raw.parse::<Language>()?),
            None => Ok(Language::default()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RankingQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "view", content = "rows", rename_all = "snake_case")]
pub(crate) enum PlotRows {
    Full(Vec<FullRow>),
    Minimal(Vec<MinimalRow>),
}

#[derive(Debug, Serialize)]
pub(crate) struct MapView {
    session_id: SessionId,
    points: Vec<MapPoint>,
}

pub(crate) async fn upload_handler<S, R>(
    State(service): State<Arc<AnalysisService<S, R>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: SessionStore + 'static,
    R: Recommender + 'static,
{
    let source_name = headers
        .get(SOURCE_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    match service.upload(body.as_ref(), source_name) {
        Ok(record) => (StatusCode::CREATED, Json(record.summary_view())).into_response(),
        Err(error) => {
            warn!(%error, "plot upload rejected");
            error.into_response()
        }
    }
}

pub(crate) async fn summary_handler<S, R>(
    State(service): State<Arc<AnalysisService<S, R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    R: Recommender + 'static,
{
    match service.session(&SessionId(session_id)) {
        Ok(record) => (StatusCode::OK, Json(record.summary_view())).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn close_handler<S, R>(
    State(service): State<Arc<AnalysisService<S, R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    R: Recommender + 'static,
{
    match service.close(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn plots_handler<S, R>(
    State(service): State<Arc<AnalysisService<S, R>>>,
    Path(session_id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Response
where
    S: SessionStore + 'static,
    R: Recommender + 'static,
{
    let view = match query.view() {
        Ok(view) => view,
        Err(error) => return error.into_response(),
    };
    let record = match service.session(&SessionId(session_id)) {
        Ok(record) => record,
        Err(error) => return error.into_response(),
    };

    let rows = match view {
        ExportView::Full => PlotRows::Full(record.table.full_rows()),
        ExportView::Minimal => PlotRows::Minimal(record.table.minimal_rows()),
    };
    (StatusCode::OK, Json(rows)).into_response()
}

pub(crate) async fn plot_handler<S, R>(
    State(service): State<Arc<AnalysisService<S, R>>>,
    Path((session_id, plot_id)): Path<(String, String)>,
) -> Response
where
    S: SessionStore + 'static,
    R: Recommender + 'static,
{
    match service.plot(&SessionId(session_id), &PlotId(plot_id)) {
        Ok(plot) => (StatusCode::OK, Json(plot)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn recommendation_handler<S, R>(
    State(service): State<Arc<AnalysisService<S, R>>>,
    Path((session_id, plot_id)): Path<(String, String)>,
    Query(query): Query<LanguageQuery>,
) -> Response
where
    S: SessionStore + 'static,
    R: Recommender + 'static,
{
    let language = match query.language() {
        Ok(language) => language,
        Err(error) => return error.into_response(),
    };

    match service.recommend(&SessionId(session_id), &PlotId(plot_id), language) {
        Ok(recommendation) => (StatusCode::OK, Json(recommendation)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn export_handler<S, R>(
    State(service): State<Arc<AnalysisService<S, R>>>,
    Path(session_id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Response
where
    S: SessionStore + 'static,
    R: Recommender + 'static,
{
    let view = match query.view() {
        Ok(view) => view,
        Err(error) => return error.into_response(),
    };

    match service.export(&SessionId(session_id), view) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", view.file_name()),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn map_handler<S, R>(
    State(service): State<Arc<AnalysisService<S, R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    R: Recommender + 'static,
{
    match service.session(&SessionId(session_id)) {
        Ok(record) => {
            let view = MapView {
                points: record.table.map_points(),
                session_id: record.id,
            };
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn rankings_handler<S, R>(
    State(service): State<Arc<AnalysisService<S, R>>>,
    Path(session_id): Path<String>,
    Query(query): Query<RankingQuery>,
) -> Response
where
    S: SessionStore + 'static,
    R: Recommender + 'static,
{
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RANKING_LIMIT)
        .clamp(1, MAX_RANKING_LIMIT);

    match service.session(&SessionId(session_id)) {
        Ok(record) => (StatusCode::OK, Json(record.table.rankings(limit))).into_response(),
        Err(error) => error.into_response(),
    }
}

impl AnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::SessionNotFound(_) | AnalysisError::PlotNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            AnalysisError::Import(_) | AnalysisError::Scoring(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AnalysisError::Recommendation(RecommendationError::UnsupportedLanguage(_))
            | AnalysisError::View(_) => StatusCode::BAD_REQUEST,
            AnalysisError::Recommendation(RecommendationError::Generation(_)) => {
                StatusCode::BAD_GATEWAY
            }
            AnalysisError::Export(_) | AnalysisError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
