//! # Repository Module
//!
//! Database repository implementations for Mostrador.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().list(&filter)                                   │
//! │       ▼                                                                 │
//! │  ProductRepository / CustomerRepository / SaleRepository / UserRepo    │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked, bound parameters only)                  │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD, filtered listing, import upserts
//! - [`customer::CustomerRepository`] - Customer registry
//! - [`sale::SaleRepository`] - Sale confirmation, history and reports
//! - [`user::UserRepository`] - Hashed credentials

pub mod customer;
pub mod product;
pub mod sale;
pub mod user;
