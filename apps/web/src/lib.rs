//! # Mostrador Web Server
//!
//! JSON API for the shop counter: catalog, customers, the per-session cart,
//! sale confirmation and reports.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mostrador Web Server                             │
//! │                                                                         │
//! │  Browser ──HTTP──► axum Router ──► handlers ──► mostrador-db ──► SQLite│
//! │                        │                │                               │
//! │                        │                └──► mostrador-core (cart)      │
//! │                        ▼                                                │
//! │                   AppState                                              │
//! │                   ├── Database                                          │
//! │                   ├── SessionStore                                      │
//! │                   └── AppConfig                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (`RUST_LOG` or the default filter)
//! 2. Load [`AppConfig`] (defaults → file → environment)
//! 3. Open the database and run migrations
//! 4. Bind the listener and serve until Ctrl+C / SIGTERM

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;
use mostrador_db::{Database, DbConfig};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::handlers::{cart, customers, products, reports, sales};
use crate::state::AppState;

/// Upload ceiling for catalog imports.
const BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - ERROR: failed storage operations
/// - WARN: rejected sales, skipped input
/// - INFO: startup, committed sales, imports
/// - DEBUG: every handler and repository call
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mostrador=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/config", get(handlers::get_config))
        .route("/sessions", post(handlers::create_session))
        .route("/dashboard", get(reports::dashboard))
        // Catalog
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products/available", get(products::available_products))
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/import/spreadsheet", post(products::import_spreadsheet))
        .route("/products/import/marketplace", post(products::import_marketplace))
        // Customers
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route("/customers/{id}", get(customers::get_customer))
        .route("/customers/{id}/sales", get(customers::customer_sales))
        // Session cart
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/items", post(cart::add_item))
        .route(
            "/cart/items/{index}",
            patch(cart::update_quantity).delete(cart::remove_item),
        )
        .route("/cart/items/{index}/price", put(cart::override_price))
        .route("/cart/customer", put(cart::select_customer))
        // Sales
        .route("/sales", get(sales::sale_history).post(sales::confirm_sale))
        .route("/sales/{id}", get(sales::sale_detail))
        .route("/reports/monthly", get(reports::monthly_report))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

/// Opens the database and serves until a shutdown signal arrives.
pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.socket_addr()?;
    let db_path = config.database_path()?;

    info!(path = %db_path.display(), "Opening database");
    let db = Database::new(
        DbConfig::new(db_path).max_connections(config.database.max_connections),
    )
    .await?;

    info!(
        store = %config.store.name,
        session_ttl_minutes = config.server.session_ttl_minutes,
        "Store configured"
    );
    let app = router(AppState::new(db.clone(), config));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Mostrador listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
