//! # Product Handlers
//!
//! ## Listing Query
//! ```text
//! GET /products?q=arroz&stock=out&order=price_asc&page=2
//!
//!   q      substring of code OR description
//!   stock  "out" → only products with stock = 0
//!   order  newest | oldest | price_desc | price_asc (nuevo/viejo/mayor/menor)
//!   page   1-based
//! ```
//!
//! Prices travel as decimal strings ("2.50") on input and as cents on output.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mostrador_core::{ImportReport, Money, NewProduct, Page, Product, ProductFilter, ProductOrder};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    pub q: Option<String>,
    pub stock: Option<String>,
    pub order: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProductQuery {
    pub fn into_filter(self, default_per_page: u32) -> ApiResult<ProductFilter> {
        let order = match self.order.as_deref().map(str::trim) {
            Some(order) if !order.is_empty() => order.parse::<ProductOrder>()?,
            _ => ProductOrder::default(),
        };

        let out_of_stock_only = matches!(
            self.stock.as_deref().map(str::trim),
            Some("out") | Some("sin")
        );

        Ok(ProductFilter {
            search: self.q,
            out_of_stock_only,
            order,
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(default_per_page),
        })
    }
}

/// Create/update body.
#[derive(Debug, Deserialize)]
pub struct ProductInput {
    pub code: String,
    pub description: String,
    /// Decimal string, e.g. "2.50"
    pub price: String,
    pub stock: i64,
}

impl ProductInput {
    fn into_new_product(self) -> ApiResult<NewProduct> {
        let price = Money::parse_decimal(&self.price)?;
        Ok(NewProduct {
            code: self.code,
            description: self.description,
            price_cents: price.cents(),
            stock: self.stock,
        })
    }
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<Page<Product>>> {
    let filter = query.into_filter(state.config.store.page_size)?;
    debug!(?filter, "list_products");

    let page = state.db.products().list(&filter).await?;
    Ok(Json(page))
}

/// Products with stock left, for the sale screen picker.
pub async fn available_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.db.products().available().await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().get_by_id(id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.db.products().insert(input.into_new_product()?).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .products()
        .update(id, input.into_new_product()?)
        .await?;
    Ok(Json(product))
}

/// Deletes a product that has never been sold.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db.products().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upserts the catalog from an `.xlsx` body (Code, Description, Price, Stock).
pub async fn import_spreadsheet(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<ImportReport>> {
    if body.is_empty() {
        return Err(ApiError::validation("Import file is empty"));
    }
    Ok(Json(state.db.products().import_spreadsheet(&body).await?))
}

/// Upserts the catalog from a marketplace `;`-separated export.
pub async fn import_marketplace(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<ImportReport>> {
    if body.is_empty() {
        return Err(ApiError::validation("Import file is empty"));
    }
    Ok(Json(state.db.products().import_marketplace_csv(&body).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let filter = ProductQuery::default().into_filter(20).unwrap();
        assert_eq!(filter, ProductFilter::default());
    }

    #[test]
    fn test_query_maps_stock_and_order() {
        let query = ProductQuery {
            q: Some("arroz".to_string()),
            stock: Some("out".to_string()),
            order: Some("menor".to_string()),
            page: Some(3),
            per_page: None,
        };
        let filter = query.into_filter(50).unwrap();
        assert!(filter.out_of_stock_only);
        assert_eq!(filter.order, ProductOrder::PriceAsc);
        assert_eq!(filter.page, 3);
        assert_eq!(filter.per_page, 50);
    }

    #[test]
    fn test_unknown_order_is_rejected() {
        let query = ProductQuery {
            order: Some("random".to_string()),
            ..Default::default()
        };
        assert!(query.into_filter(20).is_err());
    }

    #[test]
    fn test_input_parses_decimal_price() {
        let input = ProductInput {
            code: "P001".to_string(),
            description: "Arroz 1 kg".to_string(),
            price: "2.50".to_string(),
            stock: 100,
        };
        assert_eq!(input.into_new_product().unwrap().price_cents, 250);
    }
}
