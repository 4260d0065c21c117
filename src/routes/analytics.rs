//! Dashboard reports. Every route shares the same filter query string and
//! runs through the report assembler under the configured deadline.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::analytics::filter::normalize_id;
use crate::analytics::{FilterParams, ReportKind};
use crate::auth::AdminAuthUser;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::operations::submissions::SubmissionQuery;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(overview))
        .route("/daily", get(daily))
        .route("/by-worker", get(by_worker))
        .route("/by-store", get(by_store))
        .route("/by-product", get(by_product))
        .route("/worker/:id", get(worker_detail))
        .route("/store/:id", get(store_detail))
        .route("/product", get(product_detail))
        .route("/questions", get(questions))
}

async fn run(
    state: &AppState,
    query: SubmissionQuery,
    kind: ReportKind,
) -> Result<impl IntoResponse, AppError> {
    let report = state.reports().build(query, kind).await?;
    Ok(ok(report))
}

fn filtered(state: &AppState, filters: &FilterParams) -> SubmissionQuery {
    filters.normalize(state.config().reports.today())
}

async fn overview(
    _admin: AdminAuthUser,
    State(state): State<AppState>,
    Query(filters): Query<FilterParams>,
) -> Result<impl IntoResponse, AppError> {
    run(&state, filtered(&state, &filters), ReportKind::Overview).await
}

async fn daily(
    _admin: AdminAuthUser,
    State(state): State<AppState>,
    Query(filters): Query<FilterParams>,
) -> Result<impl IntoResponse, AppError> {
    run(&state, filtered(&state, &filters), ReportKind::Daily).await
}

async fn by_worker(
    _admin: AdminAuthUser,
    State(state): State<AppState>,
    Query(filters): Query<FilterParams>,
) -> Result<impl IntoResponse, AppError> {
    run(&state, filtered(&state, &filters), ReportKind::ByWorker).await
}

async fn by_store(
    _admin: AdminAuthUser,
    State(state): State<AppState>,
    Query(filters): Query<FilterParams>,
) -> Result<impl IntoResponse, AppError> {
    run(&state, filtered(&state, &filters), ReportKind::ByStore).await
}

async fn by_product(
    _admin: AdminAuthUser,
    State(state): State<AppState>,
    Query(filters): Query<FilterParams>,
) -> Result<impl IntoResponse, AppError> {
    run(&state, filtered(&state, &filters), ReportKind::ByProduct).await
}

// A well-formed path id wins over a `worker`/`store` query filter. A malformed
// one is dropped like any other malformed id filter.
async fn worker_detail(
    _admin: AdminAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(filters): Query<FilterParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut query = filtered(&state, &filters);
    if let Some(worker_id) = normalize_id("worker", Some(&id)) {
        query.worker_id = Some(worker_id);
    }
    run(&state, query, ReportKind::WorkerDetail).await
}

async fn store_detail(
    _admin: AdminAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(filters): Query<FilterParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut query = filtered(&state, &filters);
    if let Some(store_id) = normalize_id("store", Some(&id)) {
        query.store_id = Some(store_id);
    }
    run(&state, query, ReportKind::StoreDetail).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductQuery {
    product_name: Option<String>,
}

async fn product_detail(
    _admin: AdminAuthUser,
    State(state): State<AppState>,
    Query(filters): Query<FilterParams>,
    Query(product): Query<ProductQuery>,
) -> Result<impl IntoResponse, AppError> {
    let product_name = product
        .product_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::bad_request("VALIDATION_ERROR", "productName is required"))?;
    run(
        &state,
        filtered(&state, &filters),
        ReportKind::ProductDetail { product_name },
    )
    .await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionQuery {
    question_id: Option<String>,
}

async fn questions(
    _admin: AdminAuthUser,
    State(state): State<AppState>,
    Query(filters): Query<FilterParams>,
    Query(question): Query<QuestionQuery>,
) -> Result<impl IntoResponse, AppError> {
    let question_id = normalize_id("questionId", question.question_id.as_deref());
    run(
        &state,
        filtered(&state, &filters),
        ReportKind::Questions { question_id },
    )
    .await
}
