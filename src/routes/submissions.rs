use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::analytics::FilterParams;
use crate::auth::AdminAuthUser;
use crate::extractors::JsonBody;
use crate::response::{created, ok, paginated, AppError};
use crate::state::AppState;
use crate::store::operations::catalog::{Product, Question, RetailStore, Worker};
use crate::store::operations::submissions::{
    Submission, SubmissionAnswer, SubmissionDraft, SubmissionItem, SubmissionSort,
};
use crate::store::Store;
use crate::validation::validate_submission_date;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_submissions).post(create_submission))
        .route("/check", get(check_submission))
        .route("/:id", delete(delete_submission))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSubmissionsQuery {
    worker: Option<String>,
    store: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    today_only: Option<String>,
    page: Option<u64>,
    #[serde(alias = "limit")]
    per_page: Option<u64>,
}

impl ListSubmissionsQuery {
    fn filters(&self) -> FilterParams {
        FilterParams {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            worker: self.worker.clone(),
            store: self.store.clone(),
            today_only: self.today_only.clone(),
        }
    }
}

async fn list_submissions(
    _admin: AdminAuthUser,
    Query(q): Query<ListSubmissionsQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = &state.config().pagination;
    let page = q.page.unwrap_or(1).max(1);
    let per_page = q
        .per_page
        .unwrap_or(pagination.default_page_size)
        .clamp(1, pagination.max_page_size);
    let query = q.filters().normalize(state.config().reports.today());

    let total = state.store().count_submissions(&query)? as u64;
    let skip = usize::try_from(page.saturating_sub(1).saturating_mul(per_page))
        .unwrap_or(usize::MAX);
    let items = state.store().find_submissions(
        &query,
        SubmissionSort::Newest,
        Some(per_page as usize),
        skip,
    )?;
    Ok(paginated(items, total, page, per_page))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckQuery {
    worker_id: String,
    store_id: String,
    date: String,
}

#[derive(Debug, Serialize)]
struct CheckResponse {
    exists: bool,
}

async fn check_submission(
    Query(q): Query<CheckQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let exists = state
        .store()
        .submission_exists(q.worker_id.trim(), q.store_id.trim(), q.date.trim())?;
    Ok(ok(CheckResponse { exists }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionRequest {
    pub worker_id: String,
    pub store_id: String,
    pub date: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemInput>,
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub product_id: String,
    pub quantity: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub question_id: String,
    /// Forms send numbers for numeric questions and strings otherwise.
    #[serde(default)]
    pub value: serde_json::Value,
}

async fn create_submission(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let draft = build_draft(state.store(), req)?;
    let submission = Submission::from_draft(uuid::Uuid::new_v4().to_string(), draft, Utc::now());
    state.store().create_submission(&submission)?;

    tracing::info!(
        action = "submission_create",
        submission_id = %submission.id,
        worker = %submission.worker_name,
        store = %submission.store_name,
        date = %submission.date,
        "Submission recorded"
    );
    Ok(created(submission))
}

/// Resolves references and captures the name/price snapshots. Items with a
/// zero quantity are dropped.
pub fn build_draft(store: &Store, req: CreateSubmissionRequest) -> Result<SubmissionDraft, AppError> {
    let date = req.date.trim().to_string();
    validate_submission_date(&date).map_err(|msg| AppError::bad_request("INVALID_DATE", msg))?;

    let worker = store
        .get_catalog::<Worker>(req.worker_id.trim())?
        .filter(|w| w.is_active)
        .ok_or_else(|| AppError::bad_request("UNKNOWN_WORKER", "Worker not found or inactive"))?;
    let retail_store = store
        .get_catalog::<RetailStore>(req.store_id.trim())?
        .filter(|s| s.is_active)
        .ok_or_else(|| AppError::bad_request("UNKNOWN_STORE", "Store not found or inactive"))?;

    let mut seen_products = HashSet::new();
    let mut items = Vec::with_capacity(req.items.len());
    for input in req.items {
        let product_id = input.product_id.trim().to_string();
        if !seen_products.insert(product_id.clone()) {
            return Err(AppError::bad_request(
                "DUPLICATE_ITEM",
                &format!("Product {product_id} listed more than once"),
            ));
        }
        if input.quantity == 0 {
            continue;
        }
        let product = store.get_catalog::<Product>(&product_id)?.ok_or_else(|| {
            AppError::bad_request("UNKNOWN_PRODUCT", &format!("Product {product_id} not found"))
        })?;
        items.push(SubmissionItem::new(
            &product.id,
            &product.name,
            input.quantity,
            product.price,
        ));
    }

    let mut answers = Vec::with_capacity(req.answers.len());
    let mut answered = HashSet::new();
    for input in req.answers {
        let question_id = input.question_id.trim().to_string();
        let question = store.get_catalog::<Question>(&question_id)?.ok_or_else(|| {
            AppError::bad_request(
                "UNKNOWN_QUESTION",
                &format!("Question {question_id} not found"),
            )
        })?;
        let Some(value) = answer_text(&input.value) else {
            continue;
        };
        if !answered.insert(question.id.clone()) {
            return Err(AppError::bad_request(
                "DUPLICATE_ANSWER",
                &format!("Question {question_id} answered more than once"),
            ));
        }
        answers.push(SubmissionAnswer {
            question_id: question.id,
            question_text: question.text,
            question_type: question.question_type,
            value,
        });
    }

    let missing_required = store
        .list_active_catalog::<Question>()?
        .into_iter()
        .find(|q| q.is_required && !answered.contains(&q.id));
    if let Some(question) = missing_required {
        return Err(AppError::bad_request(
            "MISSING_ANSWER",
            &format!("Question '{}' requires an answer", question.text),
        ));
    }

    Ok(SubmissionDraft {
        worker_id: worker.id,
        worker_name: worker.name,
        store_id: retail_store.id,
        store_name: retail_store.name,
        date,
        notes: req.notes.map(|n| n.trim().to_string()).unwrap_or_default(),
        items,
        answers,
    })
}

/// Stored text of an answer; `None` for blank or missing values.
fn answer_text(value: &serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    Some(text).filter(|t| !t.is_empty())
}

async fn delete_submission(
    admin: AdminAuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store().delete_submission(&id)? {
        return Err(AppError::not_found("Submission not found"));
    }
    tracing::info!(action = "submission_delete", submission_id = %id, admin = %admin.username, "Submission deleted");
    Ok(ok(serde_json::json!({"deleted": true, "id": id})))
}
