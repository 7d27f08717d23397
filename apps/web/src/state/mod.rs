//! # State Module
//!
//! Shared state handed to every axum handler.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  Router::with_state(AppState)                                           │
//! │          │                                                              │
//! │          ├── db: Database          SQLite pool, cloned per request      │
//! │          ├── sessions: SessionStore one SaleSession per browser tab     │
//! │          └── config: Arc<AppConfig> read-only after startup             │
//! │                                                                         │
//! │  THREAD SAFETY:                                                         │
//! │  • Database: internal connection pool                                   │
//! │  • SessionStore: map behind a std Mutex, each session behind its own    │
//! │    tokio Mutex so a confirm can hold it across awaits                   │
//! │  • Idle sessions are evicted after server.session_ttl_minutes           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod session;

use std::sync::Arc;

use mostrador_db::Database;

use crate::config::AppConfig;

pub use session::{
    CurrentSession, SessionStore, SharedSession, DEFAULT_SESSION_TTL, SESSION_HEADER,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        AppState {
            db,
            sessions: SessionStore::new(config.session_ttl()),
            config: Arc::new(config),
        }
    }
}
