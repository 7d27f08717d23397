//! # Report Handlers

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Local;
use mostrador_core::DashboardStats;
use mostrador_db::report;
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    let now = Local::now().naive_local();
    Ok(Json(state.db.sales().dashboard(now).await?))
}

/// Current month's sale lines as an `.xlsx` attachment.
pub async fn monthly_report(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let now = Local::now().naive_local();
    let rows = state.db.sales().monthly_report_rows(now).await?;
    let workbook = report::monthly_workbook(&rows)?;
    let file_name = report::monthly_file_name(now);

    info!(rows = rows.len(), file = %file_name, "Monthly report generated");

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        workbook,
    ))
}
