//! # Sale Repository
//!
//! Sale confirmation plus everything that reads sales back: history,
//! detail, per-customer history, the dashboard and the monthly report.
//!
//! ## Confirmation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       confirm(customer, lines, payment)                 │
//! │                                                                         │
//! │  1. VALIDATE (no I/O)                                                  │
//! │     └── cart non-empty, customer chosen, method + installments valid   │
//! │                                                                         │
//! │  2. BEGIN                                                              │
//! │     └── per line: UPDATE products SET stock = stock - qty              │
//! │                   WHERE id = ? AND stock >= qty                        │
//! │         0 rows → product gone (NotFound) or short (InsufficientStock)  │
//! │                                                                         │
//! │  3. customer still exists?                                             │
//! │                                                                         │
//! │  4. INSERT sale (total = Σ unit price × qty), INSERT sale lines        │
//! │                                                                         │
//! │  5. COMMIT                                                             │
//! │     └── any early return drops the transaction → ROLLBACK              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decrement is the first statement of the transaction, so the write
//! lock is taken before any stock is read. A second confirmation waits on
//! the busy timeout and then sees the already-decremented stock.

use chrono::{Local, NaiveDateTime, Timelike};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use mostrador_core::cart::line_totals;
use mostrador_core::validation::{validate_price_cents, validate_quantity, validate_sale_request};
use mostrador_core::{
    CartLine, CoreError, DashboardStats, MonthlyReportRow, Page, PageRequest, Period, Sale,
    SaleDetail, SaleLine, SaleLineDetail, SaleReceipt, SaleSummary, ValidationError,
};

/// Sales shown on the dashboard.
const RECENT_SALES: i64 = 5;

const SUMMARY_SELECT: &str = r#"
    SELECT
        s.id,
        s.created_at,
        s.customer_id,
        c.name AS customer_name,
        s.total_cents,
        s.payment_method,
        s.installments
    FROM sales s
    INNER JOIN customers c ON c.id = s.customer_id
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Confirms a sale at the current local time.
    ///
    /// ## Arguments
    /// * `customer_id` - Selected customer, `None` if the cashier chose nobody
    /// * `lines` - Cart lines with their effective unit prices
    /// * `payment_method` - `cash` | `transfer` | `card` (Spanish names accepted)
    /// * `installments` - Card only: 2, 3 or 6
    ///
    /// ## Errors
    /// - `Domain(Validation)` before any write when the request is malformed
    /// - `Domain(InsufficientStock)` when a line exceeds current stock
    /// - `NotFound` when a product or the customer no longer exists
    pub async fn confirm(
        &self,
        customer_id: Option<i64>,
        lines: &[CartLine],
        payment_method: &str,
        installments: Option<i64>,
    ) -> DbResult<SaleReceipt> {
        let now = Local::now().naive_local();
        self.confirm_at(now, customer_id, lines, payment_method, installments)
            .await
    }

    /// Same as [`confirm`](Self::confirm), stamping the sale with `at`.
    pub async fn confirm_at(
        &self,
        at: NaiveDateTime,
        customer_id: Option<i64>,
        lines: &[CartLine],
        payment_method: &str,
        installments: Option<i64>,
    ) -> DbResult<SaleReceipt> {
        let terms = validate_sale_request(lines.len(), customer_id, payment_method, installments)?;
        let Some(customer_id) = customer_id else {
            return Err(ValidationError::required("customer").into());
        };
        for line in lines {
            validate_quantity(line.quantity)?;
            validate_price_cents(line.unit_price_cents)?;
        }

        // Stored as "YYYY-MM-DD HH:MM:SS" so day and month ranges compare as text
        let created_at = at.with_nanosecond(0).unwrap_or(at);
        let total = line_totals(lines)?;

        debug!(
            customer_id,
            lines = lines.len(),
            total_cents = total.cents(),
            method = %terms.method,
            "Confirming sale"
        );

        let mut tx = self.pool.begin().await?;

        for line in lines {
            let decremented = sqlx::query(
                "UPDATE products SET stock = stock - ?1 WHERE id = ?2 AND stock >= ?1",
            )
            .bind(line.quantity)
            .bind(line.product_id)
            .execute(&mut *tx)
            .await?;

            if decremented.rows_affected() == 0 {
                let current: Option<(String, i64)> =
                    sqlx::query_as("SELECT code, stock FROM products WHERE id = ?1")
                        .bind(line.product_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                return Err(match current {
                    None => DbError::not_found("Product", line.product_id),
                    Some((code, available)) => {
                        warn!(
                            code = %code,
                            available,
                            requested = line.quantity,
                            "Sale rejected: insufficient stock"
                        );
                        CoreError::InsufficientStock {
                            code,
                            available,
                            requested: line.quantity,
                        }
                        .into()
                    }
                });
            }
        }

        let customer: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE id = ?1")
            .bind(customer_id)
            .fetch_optional(&mut *tx)
            .await?;
        if customer.is_none() {
            return Err(DbError::not_found("Customer", customer_id));
        }

        let sale_id = sqlx::query(
            r#"
            INSERT INTO sales (created_at, customer_id, total_cents, payment_method, installments)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(created_at)
        .bind(customer_id)
        .bind(total.cents())
        .bind(terms.method)
        .bind(terms.installments)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO sale_lines (sale_id, product_id, quantity, unit_price_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id,
            customer_id,
            total_cents = total.cents(),
            lines = lines.len(),
            "Sale confirmed"
        );

        Ok(SaleReceipt {
            sale_id,
            created_at,
            customer_id,
            total_cents: total.cents(),
            line_count: lines.len(),
            terms,
        })
    }

    /// Gets a sale header by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Sale> {
        sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, created_at, customer_id, total_cents, payment_method, installments
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Sale", id))
    }

    /// Raw lines of a sale, in insertion order.
    pub async fn lines(&self, sale_id: i64) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price_cents
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Sales newest first, with customer names.
    pub async fn history(&self, request: PageRequest) -> DbResult<Page<SaleSummary>> {
        debug!(page = request.page, "Loading sales history");

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, SaleSummary>(&format!(
            "{SUMMARY_SELECT} ORDER BY s.created_at DESC, s.id DESC LIMIT ?1 OFFSET ?2"
        ))
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, request))
    }

    /// History search by sale number: zero or one result.
    pub async fn find_summary(&self, id: i64) -> DbResult<Option<SaleSummary>> {
        let summary = sqlx::query_as::<_, SaleSummary>(&format!("{SUMMARY_SELECT} WHERE s.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(summary)
    }

    /// Header plus lines joined with product data.
    pub async fn detail(&self, id: i64) -> DbResult<SaleDetail> {
        let summary = self
            .find_summary(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;
        let lines = self.line_details(id).await?;

        Ok(SaleDetail { summary, lines })
    }

    /// Everything a customer bought, newest first.
    pub async fn customer_history(&self, customer_id: i64) -> DbResult<Vec<SaleDetail>> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE id = ?1")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Customer", customer_id));
        }

        let summaries = sqlx::query_as::<_, SaleSummary>(&format!(
            "{SUMMARY_SELECT} WHERE s.customer_id = ?1 ORDER BY s.created_at DESC, s.id DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut history = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let lines = self.line_details(summary.id).await?;
            history.push(SaleDetail { summary, lines });
        }

        Ok(history)
    }

    /// Landing-page figures as of `now`.
    pub async fn dashboard(&self, now: NaiveDateTime) -> DbResult<DashboardStats> {
        let product_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        let customer_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        let (sales_today, revenue_today_cents) = self.period_totals(Period::day(now.date())).await?;
        let (sales_this_month, revenue_this_month_cents) =
            self.period_totals(Period::month(now.date())).await?;

        let recent_sales = sqlx::query_as::<_, SaleSummary>(&format!(
            "{SUMMARY_SELECT} ORDER BY s.created_at DESC, s.id DESC LIMIT ?1"
        ))
        .bind(RECENT_SALES)
        .fetch_all(&self.pool)
        .await?;

        Ok(DashboardStats {
            product_count,
            customer_count,
            sales_today,
            revenue_today_cents,
            sales_this_month,
            revenue_this_month_cents,
            recent_sales,
        })
    }

    /// Every sale line of the month containing `now`, oldest first.
    pub async fn monthly_report_rows(&self, now: NaiveDateTime) -> DbResult<Vec<MonthlyReportRow>> {
        let period = Period::month(now.date());
        debug!(start = %period.start, end = %period.end, "Loading monthly report rows");

        let rows = sqlx::query_as::<_, MonthlyReportRow>(
            r#"
            SELECT
                s.id AS sale_id,
                s.created_at,
                c.name AS customer_name,
                p.description,
                sl.quantity,
                sl.unit_price_cents,
                sl.quantity * sl.unit_price_cents AS subtotal_cents
            FROM sale_lines sl
            INNER JOIN sales s ON s.id = sl.sale_id
            INNER JOIN customers c ON c.id = s.customer_id
            INNER JOIN products p ON p.id = sl.product_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            ORDER BY s.created_at, s.id, sl.id
            "#,
        )
        .bind(period.start)
        .bind(period.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn line_details(&self, sale_id: i64) -> DbResult<Vec<SaleLineDetail>> {
        let lines = sqlx::query_as::<_, SaleLineDetail>(
            r#"
            SELECT
                sl.product_id,
                p.code,
                p.description,
                sl.quantity,
                sl.unit_price_cents,
                sl.quantity * sl.unit_price_cents AS subtotal_cents
            FROM sale_lines sl
            INNER JOIN products p ON p.id = sl.product_id
            WHERE sl.sale_id = ?1
            ORDER BY sl.id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Sale count and revenue within `period`.
    async fn period_totals(&self, period: Period) -> DbResult<(i64, i64)> {
        let totals: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_cents), 0)
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(period.start)
        .bind(period.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::NaiveDate;
    use mostrador_core::{Cart, Money, NewCustomer, NewProduct, PaymentMethod, Product, SaleSession};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    async fn product(db: &Database, code: &str, price_cents: i64, stock: i64) -> Product {
        db.products()
            .insert(NewProduct {
                code: code.to_string(),
                description: format!("Producto {code}"),
                price_cents,
                stock,
            })
            .await
            .unwrap()
    }

    async fn sale_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn line_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sale_lines")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_counter_sale_to_walk_in_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let arroz = product(&db, "P001", 250, 100).await;
        let walk_in = db.customers().walk_in().await.unwrap();

        let mut session = SaleSession::new();
        session.cart.add(&arroz, 3).unwrap();
        session.select_customer(&walk_in);

        let receipt = db
            .sales()
            .confirm(session.customer_id(), session.cart.lines(), "efectivo", None)
            .await
            .unwrap();
        session.finish_sale();

        assert_eq!(receipt.total_cents, 750);
        assert_eq!(Money::from_cents(receipt.total_cents).to_string(), "$7.50");
        assert_eq!(receipt.terms.method, PaymentMethod::Cash);
        assert_eq!(receipt.line_count, 1);
        assert!(session.cart.is_empty());

        let stock = db.products().get_by_id(arroz.id).await.unwrap().stock;
        assert_eq!(stock, 97);

        let sale = db.sales().get_by_id(receipt.sale_id).await.unwrap();
        assert_eq!(sale.customer_id, walk_in.id);
        assert_eq!(sale.installments, None);

        let lines = db.sales().lines(receipt.sale_id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!((lines[0].quantity, lines[0].unit_price_cents), (3, 250));
    }

    #[tokio::test]
    async fn test_card_sale_records_installments() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "P001", 1000, 10).await;
        let walk_in = db.customers().walk_in().await.unwrap();
        let mut cart = Cart::new();
        cart.add(&p, 2).unwrap();

        let receipt = db
            .sales()
            .confirm(Some(walk_in.id), cart.lines(), "tarjeta", Some(3))
            .await
            .unwrap();

        let sale = db.sales().get_by_id(receipt.sale_id).await.unwrap();
        assert_eq!(sale.payment_method, PaymentMethod::Card);
        assert_eq!(sale.installments, Some(3));
    }

    #[tokio::test]
    async fn test_invalid_installments_rejected_before_any_write() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "P001", 250, 10).await;
        let walk_in = db.customers().walk_in().await.unwrap();
        let mut cart = Cart::new();
        cart.add(&p, 1).unwrap();

        let err = db
            .sales()
            .confirm(Some(walk_in.id), cart.lines(), "tarjeta", Some(4))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert_eq!(sale_count(&db).await, 0);
        assert_eq!(db.products().get_by_id(p.id).await.unwrap().stock, 10);
    }

    #[tokio::test]
    async fn test_oversized_lines_rejected_before_any_write() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "P001", 250, 10).await;
        let walk_in = db.customers().walk_in().await.unwrap();
        let mut cart = Cart::new();
        cart.add(&p, 2).unwrap();
        let line = cart.lines()[0].clone();

        let wrapping_total = CartLine {
            unit_price_cents: i64::MAX / 2 + 1,
            ..line.clone()
        };
        let too_many = CartLine {
            quantity: mostrador_core::MAX_ITEM_QUANTITY + 1,
            ..line.clone()
        };
        let too_expensive = CartLine {
            unit_price_cents: mostrador_core::MAX_PRICE_CENTS + 1,
            ..line
        };

        for lines in [[wrapping_total], [too_many], [too_expensive]] {
            let err = db
                .sales()
                .confirm(Some(walk_in.id), &lines, "cash", None)
                .await
                .unwrap_err();
            assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        }

        assert_eq!(sale_count(&db).await, 0);
        assert_eq!(db.products().get_by_id(p.id).await.unwrap().stock, 10);
    }

    #[tokio::test]
    async fn test_preconditions_checked_in_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "P001", 250, 10).await;
        let mut cart = Cart::new();
        cart.add(&p, 1).unwrap();
        let sales = db.sales();

        let empty = sales.confirm(None, &[], "bitcoin", None).await.unwrap_err();
        assert_eq!(
            empty.to_string(),
            DbError::from(ValidationError::required("cart items")).to_string()
        );

        let no_customer = sales.confirm(None, cart.lines(), "cash", None).await.unwrap_err();
        assert_eq!(
            no_customer.to_string(),
            DbError::from(ValidationError::required("customer")).to_string()
        );

        let installments_on_cash = sales.confirm(Some(1), cart.lines(), "cash", Some(3)).await;
        assert!(installments_on_cash.is_err());
        assert_eq!(sale_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_every_line() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let first = product(&db, "P001", 250, 10).await;
        let second = product(&db, "P002", 500, 5).await;
        let walk_in = db.customers().walk_in().await.unwrap();

        let mut cart = Cart::new();
        cart.add(&first, 4).unwrap();
        cart.add(&second, 5).unwrap();

        // Stock drops after the line was added
        db.products()
            .update(
                second.id,
                NewProduct {
                    code: second.code.clone(),
                    description: second.description.clone(),
                    price_cents: second.price_cents,
                    stock: 2,
                },
            )
            .await
            .unwrap();

        let err = db
            .sales()
            .confirm(Some(walk_in.id), cart.lines(), "cash", None)
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock {
                code,
                available,
                requested,
            }) => {
                assert_eq!(code, "P002");
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("expected insufficient stock, got {other:?}"),
        }

        assert_eq!(sale_count(&db).await, 0);
        assert_eq!(line_count(&db).await, 0);
        assert_eq!(db.products().get_by_id(first.id).await.unwrap().stock, 10);
        assert_eq!(db.products().get_by_id(second.id).await.unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_missing_customer_or_product_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "P001", 250, 10).await;
        let gone = product(&db, "P002", 250, 10).await;
        let walk_in = db.customers().walk_in().await.unwrap();

        let mut cart = Cart::new();
        cart.add(&p, 2).unwrap();
        let err = db
            .sales()
            .confirm(Some(9999), cart.lines(), "cash", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Customer"));
        assert_eq!(db.products().get_by_id(p.id).await.unwrap().stock, 10);

        let mut cart = Cart::new();
        cart.add(&gone, 1).unwrap();
        db.products().delete(gone.id).await.unwrap();
        let err = db
            .sales()
            .confirm(Some(walk_in.id), cart.lines(), "cash", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Product"));
        assert_eq!(sale_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_overridden_price_is_what_gets_recorded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "P001", 1000, 10).await;
        let walk_in = db.customers().walk_in().await.unwrap();

        let mut cart = Cart::new();
        cart.add(&p, 2).unwrap();
        cart.override_price(0, Money::from_cents(800)).unwrap();

        let receipt = db
            .sales()
            .confirm(Some(walk_in.id), cart.lines(), "transfer", None)
            .await
            .unwrap();
        assert_eq!(receipt.total_cents, 1600);

        let detail = db.sales().detail(receipt.sale_id).await.unwrap();
        assert_eq!(detail.lines[0].unit_price_cents, 800);
        assert_eq!(detail.lines[0].subtotal_cents, 1600);
        // Catalog price untouched
        assert_eq!(db.products().get_by_id(p.id).await.unwrap().price_cents, 1000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_confirms_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("race.db")).max_connections(4))
            .await
            .unwrap();
        let last_unit = product(&db, "P001", 250, 1).await;
        let walk_in = db.customers().walk_in().await.unwrap();

        let mut cart = Cart::new();
        cart.add(&last_unit, 1).unwrap();
        let lines = cart.lines().to_vec();
        let customer_id = walk_in.id;

        let first = {
            let (db, lines) = (db.clone(), lines.clone());
            tokio::spawn(async move {
                db.sales().confirm(Some(customer_id), &lines, "cash", None).await
            })
        };
        let second = {
            let (db, lines) = (db.clone(), lines.clone());
            tokio::spawn(async move {
                db.sales().confirm(Some(customer_id), &lines, "cash", None).await
            })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let short = results
            .iter()
            .filter(|r| matches!(r, Err(DbError::Domain(CoreError::InsufficientStock { .. }))))
            .count();

        assert_eq!(succeeded, 1);
        assert_eq!(short, 1);
        assert_eq!(db.products().get_by_id(last_unit.id).await.unwrap().stock, 0);
        assert_eq!(sale_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_history_detail_and_search() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "P001", 250, 100).await;
        let ana = db
            .customers()
            .insert(NewCustomer {
                name: "Ana".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let walk_in = db.customers().walk_in().await.unwrap();

        let mut cart = Cart::new();
        cart.add(&p, 1).unwrap();
        let sales = db.sales();
        let older = sales
            .confirm_at(at(2026, 10, 1, 9), Some(ana.id), cart.lines(), "cash", None)
            .await
            .unwrap();
        let newer = sales
            .confirm_at(at(2026, 10, 2, 9), Some(walk_in.id), cart.lines(), "cash", None)
            .await
            .unwrap();

        let page = sales.history(PageRequest::new(1, 20)).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].id, newer.sale_id);
        assert_eq!(page.items[1].customer_name, "Ana");

        let found = sales.find_summary(older.sale_id).await.unwrap().unwrap();
        assert_eq!(found.created_at, at(2026, 10, 1, 9));
        assert!(sales.find_summary(9999).await.unwrap().is_none());

        let detail = sales.detail(older.sale_id).await.unwrap();
        assert_eq!(detail.summary.customer_name, "Ana");
        assert_eq!(detail.lines[0].description, "Producto P001");
        assert!(matches!(sales.detail(9999).await.unwrap_err(), DbError::NotFound { .. }));

        let history = sales.customer_history(ana.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].summary.id, older.sale_id);
        assert_eq!(history[0].lines.len(), 1);
        assert!(sales.customer_history(9999).await.is_err());
    }

    #[tokio::test]
    async fn test_dashboard_and_monthly_rows_use_calendar_windows() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "P001", 250, 100).await;
        let walk_in = db.customers().walk_in().await.unwrap();
        let sales = db.sales();

        let mut one = Cart::new();
        one.add(&p, 1).unwrap();
        let mut two = Cart::new();
        two.add(&p, 2).unwrap();

        // Previous month, earlier this month, today
        for (when, cart) in [
            (at(2026, 9, 30, 23), &one),
            (at(2026, 10, 3, 12), &one),
            (at(2026, 10, 17, 8), &two),
        ] {
            sales
                .confirm_at(when, Some(walk_in.id), cart.lines(), "cash", None)
                .await
                .unwrap();
        }

        let now = at(2026, 10, 17, 18);
        let stats = sales.dashboard(now).await.unwrap();
        assert_eq!(stats.product_count, 1);
        assert_eq!(stats.customer_count, 1);
        assert_eq!((stats.sales_today, stats.revenue_today_cents), (1, 500));
        assert_eq!((stats.sales_this_month, stats.revenue_this_month_cents), (2, 750));
        assert_eq!(stats.recent_sales.len(), 3);

        let rows = sales.monthly_report_rows(now).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].created_at, at(2026, 10, 3, 12));
        assert_eq!(rows[1].quantity, 2);
        assert_eq!(rows[1].subtotal_cents, 500);
        assert_eq!(rows[1].customer_name, "Consumidor Final");

        let empty = sales.dashboard(at(2027, 1, 5, 10)).await.unwrap();
        assert_eq!((empty.sales_today, empty.revenue_this_month_cents), (0, 0));
    }
}
