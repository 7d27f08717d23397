//! # Sale Handlers
//!
//! ## Confirmation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /sales { "payment_method": "tarjeta", "installments": 3 }        │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  lock session (held until the response is built)                       │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  SaleRepository::confirm(customer, cart lines, payment)                │
//! │        │                                      │                        │
//! │     Ok(receipt)                           Err(e)                       │
//! │        │                                      │                        │
//! │        ▼                                      ▼                        │
//! │  finish_sale(): empty cart,          cart untouched, error returned    │
//! │  no customer                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A second submit from the same session waits on the lock and then finds an
//! empty cart, so it fails validation instead of charging twice.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mostrador_core::{Page, PageRequest, SaleDetail, SaleReceipt, SaleSummary};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::{AppState, CurrentSession};

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    /// cash | transfer | card, or efectivo | transferencia | tarjeta
    pub payment_method: String,
    #[serde(default)]
    pub installments: Option<i64>,
}

pub async fn confirm_sale(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(req): Json<ConfirmRequest>,
) -> ApiResult<(StatusCode, Json<SaleReceipt>)> {
    debug!(session_id = %current.id, payment_method = %req.payment_method, "confirm_sale");

    let mut session = current.session.lock().await;
    let receipt = state
        .db
        .sales()
        .confirm(
            session.customer_id(),
            session.cart.lines(),
            &req.payment_method,
            req.installments,
        )
        .await?;

    session.finish_sale();
    info!(session_id = %current.id, sale_id = receipt.sale_id, "Session cart checked out");

    Ok((StatusCode::CREATED, Json(receipt)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Search by sale id instead of paging.
    pub id: Option<i64>,
}

/// Sales newest first, or the single sale matching `id`.
pub async fn sale_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Page<SaleSummary>>> {
    let per_page = query.per_page.unwrap_or(state.config.store.page_size);

    if let Some(id) = query.id {
        let items: Vec<SaleSummary> =
            state.db.sales().find_summary(id).await?.into_iter().collect();
        let total = items.len() as i64;
        return Ok(Json(Page::new(items, total, PageRequest::new(1, per_page))));
    }

    let request = PageRequest::new(query.page.unwrap_or(1), per_page);
    Ok(Json(state.db.sales().history(request).await?))
}

pub async fn sale_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<SaleDetail>> {
    Ok(Json(state.db.sales().detail(id).await?))
}
