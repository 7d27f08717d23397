//! # Cart Handlers
//!
//! Every endpoint works on the caller's own [`SaleSession`], resolved from
//! the `x-session-id` header.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Customer │────►│ Confirmed│       │
//! │  │  Cart    │     │          │     │ selected │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                 │              │
//! │                   POST /cart/items                  POST /sales         │
//! │                   PATCH /cart/items/{i}             (sales.rs)          │
//! │                   PUT /cart/items/{i}/price              │              │
//! │                   DELETE /cart/items/{i}                 ▼              │
//! │                        │                          session reset         │
//! │                   DELETE /cart ──────────────────► (back to empty)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`SaleSession`]: mostrador_core::SaleSession

use axum::extract::{Path, State};
use axum::Json;
use mostrador_core::{CartLine, Money, SaleSession};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, CurrentSession};

/// Cart response including lines and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub customer_id: Option<i64>,
    pub item_count: usize,
    pub total_quantity: i64,
    pub total_cents: i64,
    /// Total with the store's currency symbol, e.g. "$7.50".
    pub total_display: String,
}

impl CartResponse {
    pub fn new(session: &SaleSession, config: &AppConfig) -> ApiResult<Self> {
        let total = session.cart.total()?;
        Ok(CartResponse {
            lines: session.cart.lines().to_vec(),
            customer_id: session.customer_id(),
            item_count: session.cart.item_count(),
            total_quantity: session.cart.total_quantity(),
            total_cents: total.cents(),
            total_display: config.format_money(total),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    /// Decimal string, e.g. "2.10"
    pub price: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    pub customer_id: i64,
}

pub async fn get_cart(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ApiResult<Json<CartResponse>> {
    let session = current.session.lock().await;
    Ok(Json(CartResponse::new(&session, &state.config)?))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ApiResult<Json<CartResponse>> {
    debug!(session_id = %current.id, "clear_cart");
    let mut session = current.session.lock().await;
    session.cart.clear();
    Ok(Json(CartResponse::new(&session, &state.config)?))
}

/// Adds a product, merging with its existing line.
///
/// Stock is checked against the product as currently stored; the final
/// check happens again when the sale is confirmed.
pub async fn add_item(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<Json<CartResponse>> {
    debug!(
        session_id = %current.id,
        product_id = req.product_id,
        quantity = req.quantity,
        "add_item"
    );

    let product = state.db.products().get_by_id(req.product_id).await?;

    let mut session = current.session.lock().await;
    session.cart.add(&product, req.quantity)?;
    Ok(Json(CartResponse::new(&session, &state.config)?))
}

pub async fn update_quantity(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(index): Path<usize>,
    Json(req): Json<QuantityRequest>,
) -> ApiResult<Json<CartResponse>> {
    debug!(session_id = %current.id, index, quantity = req.quantity, "update_quantity");

    let mut session = current.session.lock().await;
    let product_id = session
        .cart
        .line(index)
        .map(|line| line.product_id)
        .ok_or_else(|| ApiError::not_found("Cart line", &index.to_string()))?;

    let product = state.db.products().get_by_id(product_id).await?;
    session.cart.update_quantity(index, req.quantity, &product)?;
    Ok(Json(CartResponse::new(&session, &state.config)?))
}

/// Overrides the unit price of one line. Any positive price up to
/// [`MAX_PRICE_CENTS`](mostrador_core::MAX_PRICE_CENTS) is accepted.
pub async fn override_price(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(index): Path<usize>,
    Json(req): Json<PriceRequest>,
) -> ApiResult<Json<CartResponse>> {
    let price = Money::parse_decimal(&req.price)?;
    debug!(session_id = %current.id, index, price = %price, "override_price");

    let mut session = current.session.lock().await;
    session.cart.override_price(index, price)?;
    Ok(Json(CartResponse::new(&session, &state.config)?))
}

pub async fn remove_item(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(index): Path<usize>,
) -> ApiResult<Json<CartResponse>> {
    debug!(session_id = %current.id, index, "remove_item");

    let mut session = current.session.lock().await;
    session.cart.remove(index)?;
    Ok(Json(CartResponse::new(&session, &state.config)?))
}

pub async fn select_customer(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(req): Json<CustomerRequest>,
) -> ApiResult<Json<CartResponse>> {
    let customer = state.db.customers().get_by_id(req.customer_id).await?;

    let mut session = current.session.lock().await;
    session.select_customer(&customer);
    Ok(Json(CartResponse::new(&session, &state.config)?))
}
