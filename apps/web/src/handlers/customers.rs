//! # Customer Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mostrador_core::{Customer, NewCustomer, Page, SaleDetail};

use super::PageQuery;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<Customer>>> {
    let request = query.request(state.config.store.page_size);
    Ok(Json(state.db.customers().list(request).await?))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = state.db.customers().insert(input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.db.customers().get_by_id(id).await?))
}

/// Every purchase of one customer, newest first, with lines.
pub async fn customer_sales(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<SaleDetail>>> {
    Ok(Json(state.db.sales().customer_history(id).await?))
}
