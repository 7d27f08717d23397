//! # HTTP Handlers
//!
//! One module per resource. Handlers stay thin: parse input, call a
//! repository or the session cart, map errors through [`ApiError`].
//!
//! ## Module Organization
//! ```text
//! handlers/
//! ├── mod.rs        ← health, sessions, store config
//! ├── products.rs   ← catalog CRUD, search, bulk import
//! ├── customers.rs  ← customer registry and purchase history
//! ├── cart.rs       ← per-session cart mutations
//! ├── sales.rs      ← confirmation, history, detail
//! └── reports.rs    ← dashboard and monthly xlsx
//! ```
//!
//! [`ApiError`]: crate::error::ApiError

pub mod cart;
pub mod customers;
pub mod products;
pub mod reports;
pub mod sales;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::state::AppState;

/// Liveness check.
pub async fn health_handler() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

/// Opens a new sale session for the calling client.
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let session_id = state.sessions.create();
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

/// Store name, currency symbol and page size for the front end.
pub async fn get_config(State(state): State<AppState>) -> Json<StoreConfig> {
    Json(state.config.store.clone())
}

/// Pagination query shared by the listing endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    pub fn request(&self, default_per_page: u32) -> mostrador_core::PageRequest {
        mostrador_core::PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(default_per_page),
        )
    }
}
