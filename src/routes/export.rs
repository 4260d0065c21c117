use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;

use crate::analytics::{FilterParams, ReportError};
use crate::auth::AdminAuthUser;
use crate::export::{build_workbook, ExportFormat};
use crate::response::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/excel", get(export_excel))
        .route("/csv", get(export_csv))
}

async fn export_excel(
    admin: AdminAuthUser,
    State(state): State<AppState>,
    Query(filters): Query<FilterParams>,
) -> Result<impl IntoResponse, AppError> {
    export(&state, &admin, &filters, ExportFormat::Xlsx).await
}

async fn export_csv(
    admin: AdminAuthUser,
    State(state): State<AppState>,
    Query(filters): Query<FilterParams>,
) -> Result<impl IntoResponse, AppError> {
    export(&state, &admin, &filters, ExportFormat::Csv).await
}

async fn export(
    state: &AppState,
    admin: &AdminAuthUser,
    filters: &FilterParams,
    format: ExportFormat,
) -> Result<impl IntoResponse, AppError> {
    let reports = &state.config().reports;
    let query = filters.normalize(reports.today());
    let submissions = state.reports().export_snapshot(query).await?;
    let rows = submissions.len();
    let offset = reports.utc_offset();

    let render = tokio::task::spawn_blocking(move || {
        let workbook = build_workbook(&submissions, offset);
        format.render(&workbook)
    });
    let bytes = match tokio::time::timeout(state.reports().timeout(), render).await {
        Ok(joined) => joined.map_err(ReportError::from)??,
        Err(_) => {
            tracing::warn!(report = "export", format = format.extension(), "Export render deadline exceeded");
            return Err(ReportError::TimedOut.into());
        }
    };

    let file_name = format.file_name(Utc::now().timestamp_millis());
    tracing::info!(
        action = "export",
        format = format.extension(),
        rows,
        admin = %admin.username,
        "Export generated"
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    ))
}
