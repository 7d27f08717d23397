//! # Customer Repository
//!
//! Database operations for the customer registry. The walk-in customer
//! ("Consumidor Final") is seeded by the initial migration and behaves like
//! any other row.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use mostrador_core::{Customer, NewCustomer, Page, PageRequest, WALK_IN_CUSTOMER_NAME};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists customers alphabetically.
    pub async fn list(&self, request: PageRequest) -> DbResult<Page<Customer>> {
        debug!(page = request.page, per_page = request.per_page, "Listing customers");

        let total = self.count().await?;
        let items = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, tax_id, phone
            FROM customers
            ORDER BY name COLLATE NOCASE, id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, request))
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Customer> {
        sqlx::query_as::<_, Customer>("SELECT id, name, tax_id, phone FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Registers a customer.
    ///
    /// ## Errors
    /// - `Domain(Validation)` for a blank or overlong name
    /// - `UniqueViolation` when the tax id belongs to another customer
    pub async fn insert(&self, customer: NewCustomer) -> DbResult<Customer> {
        let customer = customer.normalized();
        customer.validate()?;

        debug!(name = %customer.name, "Inserting customer");

        let tax_id = customer.tax_id.clone().unwrap_or_default();
        let created = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, tax_id, phone)
            VALUES (?1, ?2, ?3)
            RETURNING id, name, tax_id, phone
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.tax_id)
        .bind(&customer.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("tax_id", &tax_id))?;

        Ok(created)
    }

    /// The walk-in customer used for anonymous counter sales.
    pub async fn walk_in(&self) -> DbResult<Customer> {
        sqlx::query_as::<_, Customer>(
            "SELECT id, name, tax_id, phone FROM customers WHERE name = ?1 ORDER BY id LIMIT 1",
        )
        .bind(WALK_IN_CUSTOMER_NAME)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", WALK_IN_CUSTOMER_NAME))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
