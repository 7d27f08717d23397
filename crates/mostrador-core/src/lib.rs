//! # mostrador-core: Pure Business Logic for Mostrador
//!
//! Everything a sale needs before it touches storage: money arithmetic,
//! domain records, the per-session cart and the checks a confirmation must
//! pass. No I/O lives here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mostrador Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/web (axum JSON API)                       │   │
//! │  │     /products ─ /cart ─ /sales ─ /reports ─ /dashboard          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ mostrador-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │ Customer  │  │  parsing  │  │  Session  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                mostrador-db (Database Layer)                    │   │
//! │  │      SQLite repositories, sale transaction, import/export       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Customer, Sale, reports)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Session cart with stock-aware mutations
//! - [`session`] - Per-session sale context
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use mostrador_core::money::Money;
//!
//! let price = Money::parse_decimal("2.50").unwrap();
//! assert_eq!(price.checked_multiply_quantity(3).map(|t| t.cents()), Some(750));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use session::SaleSession;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Name of the walk-in customer row created by the initial migration.
pub const WALK_IN_CUSTOMER_NAME: &str = "Consumidor Final";

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum units of one product on a single line.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price accepted, in cents ($999,999,999.99).
///
/// A full cart at this price and [`MAX_ITEM_QUANTITY`] still fits in an `i64`.
pub const MAX_PRICE_CENTS: i64 = 99_999_999_999;

/// Default page size for catalog and history listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Installment counts accepted for card payments.
pub const ALLOWED_INSTALLMENTS: [i64; 3] = [2, 3, 6];
