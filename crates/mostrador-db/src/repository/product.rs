//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Filtered, paginated listing
//! - CRUD with a usage-guarded delete
//! - Bulk upserts for catalog imports
//!
//! ## Filtered Listing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How list(filter) Builds Its Query                    │
//! │                                                                         │
//! │  ProductFilter { search: "arroz", out_of_stock_only, order, page }     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM products WHERE 1 = 1                                  │
//! │       AND (code LIKE ?  ESCAPE '\' OR description LIKE ? ESCAPE '\')   │
//! │       AND stock = 0                          (out_of_stock_only)       │
//! │       ORDER BY id DESC                       (newest)                  │
//! │       LIMIT ? OFFSET ?                                                  │
//! │                                                                         │
//! │  Every value is bound; only fixed SQL fragments are pushed as text.   │
//! │  The same WHERE clause feeds the COUNT(*) for the page total.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::import;
use mostrador_core::validation::validate_search_query;
use mostrador_core::{
    CoreError, ImportReport, NewProduct, Page, Product, ProductFilter, ProductOrder,
};

const PRODUCT_COLUMNS: &str = "SELECT id, code, description, price_cents, stock FROM products";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let filter = ProductFilter { search: Some("arroz".into()), ..Default::default() };
/// let page = repo.list(&filter).await?;
/// let product = repo.get_by_code("P001").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products matching `filter`, one page at a time.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Page<Product>> {
        if let Some(term) = filter.search_term() {
            validate_search_query(term)?;
        }
        let request = filter.page_request();

        debug!(
            search = ?filter.search_term(),
            out_of_stock_only = filter.out_of_stock_only,
            order = ?filter.order,
            page = request.page,
            "Listing products"
        );

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut list_query = QueryBuilder::<Sqlite>::new(PRODUCT_COLUMNS);
        push_filter(&mut list_query, filter);
        list_query
            .push(" ORDER BY ")
            .push(order_clause(filter.order))
            .push(" LIMIT ")
            .push_bind(request.limit())
            .push(" OFFSET ")
            .push_bind(request.offset());

        let items = list_query
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), total, "List returned products");
        Ok(Page::new(items, total, request))
    }

    /// Products with stock left, for the point-of-sale picker.
    pub async fn available(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, description, price_cents, stock
            FROM products
            WHERE stock > 0
            ORDER BY description
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Product> {
        sqlx::query_as::<_, Product>(
            "SELECT id, code, description, price_cents, stock FROM products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))
    }

    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, code, description, price_cents, stock FROM products WHERE code = ?1",
        )
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// - `Domain(Validation)` when a field breaks the catalog rules
    /// - `UniqueViolation` when the code is already taken
    pub async fn insert(&self, product: NewProduct) -> DbResult<Product> {
        let product = product.normalized();
        product.validate()?;

        debug!(code = %product.code, "Inserting product");

        let created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (code, description, price_cents, stock)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, code, description, price_cents, stock
            "#,
        )
        .bind(&product.code)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("code", &product.code))?;

        Ok(created)
    }

    /// Replaces every field of an existing product.
    pub async fn update(&self, id: i64, product: NewProduct) -> DbResult<Product> {
        let product = product.normalized();
        product.validate()?;

        debug!(id, code = %product.code, "Updating product");

        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET code = ?2, description = ?3, price_cents = ?4, stock = ?5
            WHERE id = ?1
            RETURNING id, code, description, price_cents, stock
            "#,
        )
        .bind(id)
        .bind(&product.code)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("code", &product.code))?
        .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product that has never been sold.
    ///
    /// ## Usage Guard
    /// ```text
    /// DELETE ... WHERE id = ? AND NOT EXISTS (sale line for id)
    ///     │
    ///     ├── 1 row  → deleted
    ///     └── 0 rows → product missing   → NotFound
    ///                  product was sold  → AlreadySold
    /// ```
    /// The check and the delete are one statement, so a sale confirmed in
    /// between cannot leave a dangling sale line.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query(
            r#"
            DELETE FROM products
            WHERE id = ?1
            AND NOT EXISTS (SELECT 1 FROM sale_lines WHERE product_id = ?1)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let product = self.get_by_id(id).await?;
            return Err(CoreError::AlreadySold { code: product.code }.into());
        }

        info!(id, "Product deleted");
        Ok(())
    }

    /// Counts catalog entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts or replaces products keyed by code, all in one transaction.
    ///
    /// Rows are applied in order, so when a code repeats the last row wins.
    /// Returns how many rows were written.
    pub async fn upsert_by_code(&self, products: &[NewProduct]) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        for product in products {
            sqlx::query(
                r#"
                INSERT INTO products (code, description, price_cents, stock)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(code) DO UPDATE SET
                    description = excluded.description,
                    price_cents = excluded.price_cents,
                    stock = excluded.stock
                "#,
            )
            .bind(&product.code)
            .bind(&product.description)
            .bind(product.price_cents)
            .bind(product.stock)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(products.len() as u64)
    }

    /// Imports the first worksheet of an `.xlsx` catalog.
    pub async fn import_spreadsheet(&self, bytes: &[u8]) -> DbResult<ImportReport> {
        let parsed = import::parse_spreadsheet(bytes)?;
        self.apply_import("spreadsheet", parsed).await
    }

    /// Imports a marketplace (Tienda Nube) product export.
    pub async fn import_marketplace_csv(&self, bytes: &[u8]) -> DbResult<ImportReport> {
        let parsed = import::parse_marketplace_csv(bytes)?;
        self.apply_import("marketplace", parsed).await
    }

    async fn apply_import(
        &self,
        source: &'static str,
        parsed: import::ParsedCatalog,
    ) -> DbResult<ImportReport> {
        let imported = self.upsert_by_code(&parsed.products).await?;
        let report = ImportReport {
            imported,
            skipped: parsed.skipped,
        };

        info!(
            source,
            imported = report.imported,
            skipped = report.skipped,
            "Catalog import finished"
        );
        Ok(report)
    }
}

/// Appends the WHERE clause shared by the page query and its count.
fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ProductFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(term) = filter.search_term() {
        let pattern = like_pattern(term);
        builder
            .push(" AND (code LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    if filter.out_of_stock_only {
        builder.push(" AND stock = 0");
    }
}

fn order_clause(order: ProductOrder) -> &'static str {
    match order {
        ProductOrder::Newest => "id DESC",
        ProductOrder::Oldest => "id ASC",
        ProductOrder::PriceDesc => "price_cents DESC, id DESC",
        ProductOrder::PriceAsc => "price_cents ASC, id ASC",
    }
}

/// Wraps a search term for a substring LIKE, escaping its wildcards.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use mostrador_core::Cart;

    fn new_product(code: &str, description: &str, price_cents: i64, stock: i64) -> NewProduct {
        NewProduct {
            code: code.to_string(),
            description: description.to_string(),
            price_cents,
            stock,
        }
    }

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(new_product("P001", "Arroz 1 kg", 250, 100)).await.unwrap();
        repo.insert(new_product("P002", "Yerba mate 500 g", 1800, 0)).await.unwrap();
        repo.insert(new_product("P003", "Fideos 100% sémola", 900, 12)).await.unwrap();
        db
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("arroz"), "%arroz%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = seeded().await;
        let repo = db.products();

        let product = repo.get_by_code("P001").await.unwrap().unwrap();
        assert_eq!(product.description, "Arroz 1 kg");
        assert_eq!(product.price_cents, 250);
        assert_eq!(product.stock, 100);

        let same = repo.get_by_id(product.id).await.unwrap();
        assert_eq!(same, product);
        assert!(repo.get_by_code("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_code() {
        let db = seeded().await;
        let err = db
            .products()
            .insert(new_product("P001", "Otro arroz", 300, 1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::UniqueViolation { ref field, ref value } if field == "code" && value == "P001"
        ));
    }

    #[tokio::test]
    async fn test_insert_validates_fields() {
        let db = seeded().await;
        let err = db
            .products()
            .insert(new_product("P009", "Gratis", 0, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_search_and_stock_filter() {
        let db = seeded().await;
        let repo = db.products();

        let filter = ProductFilter {
            search: Some("yerba".to_string()),
            ..Default::default()
        };
        let page = repo.list(&filter).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].code, "P002");

        // Matches on code too
        let filter = ProductFilter {
            search: Some("p00".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list(&filter).await.unwrap().total, 3);

        let filter = ProductFilter {
            out_of_stock_only: true,
            ..Default::default()
        };
        let page = repo.list(&filter).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].stock, 0);
    }

    #[tokio::test]
    async fn test_list_search_treats_percent_literally() {
        let db = seeded().await;
        let filter = ProductFilter {
            search: Some("100%".to_string()),
            ..Default::default()
        };
        let page = db.products().list(&filter).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].code, "P003");
    }

    #[tokio::test]
    async fn test_list_order_and_pagination() {
        let db = seeded().await;
        let repo = db.products();

        let newest = repo.list(&ProductFilter::default()).await.unwrap();
        let codes: Vec<_> = newest.items.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, ["P003", "P002", "P001"]);

        let filter = ProductFilter {
            order: ProductOrder::PriceAsc,
            page: 2,
            per_page: 2,
            ..Default::default()
        };
        let page = repo.list(&filter).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].code, "P002");
    }

    #[tokio::test]
    async fn test_available_excludes_out_of_stock() {
        let db = seeded().await;
        let available = db.products().available().await.unwrap();
        assert_eq!(available.len(), 2);
        assert!(available.iter().all(|p| p.stock > 0));
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let db = seeded().await;
        let repo = db.products();
        let product = repo.get_by_code("P001").await.unwrap().unwrap();

        let updated = repo
            .update(product.id, new_product("P001", "Arroz largo fino 1 kg", 275, 80))
            .await
            .unwrap();
        assert_eq!(updated.description, "Arroz largo fino 1 kg");
        assert_eq!(updated.price_cents, 275);

        let err = repo
            .update(product.id, new_product("P002", "Choca", 100, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let err = repo
            .update(9999, new_product("P999", "Nada", 100, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_unsold_product() {
        let db = seeded().await;
        let repo = db.products();
        let product = repo.get_by_code("P002").await.unwrap().unwrap();

        repo.delete(product.id).await.unwrap();
        assert!(repo.get_by_code("P002").await.unwrap().is_none());

        let err = repo.delete(product.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_sold_product_is_refused() {
        let db = seeded().await;
        let repo = db.products();
        let product = repo.get_by_code("P001").await.unwrap().unwrap();
        let walk_in = db.customers().walk_in().await.unwrap();

        let mut cart = Cart::new();
        cart.add(&product, 1).unwrap();
        db.sales()
            .confirm(Some(walk_in.id), cart.lines(), "cash", None)
            .await
            .unwrap();

        let err = repo.delete(product.id).await.unwrap_err();
        assert!(err.to_string().contains("already sold"));
        assert!(repo.get_by_code("P001").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_upsert_by_code_last_row_wins() {
        let db = seeded().await;
        let repo = db.products();

        let written = repo
            .upsert_by_code(&[
                new_product("P001", "Arroz 1 kg", 260, 90),
                new_product("P010", "Azúcar 1 kg", 1200, 5),
                new_product("P010", "Azúcar 1 kg", 1250, 7),
            ])
            .await
            .unwrap();
        assert_eq!(written, 3);

        let arroz = repo.get_by_code("P001").await.unwrap().unwrap();
        assert_eq!((arroz.price_cents, arroz.stock), (260, 90));

        let azucar = repo.get_by_code("P010").await.unwrap().unwrap();
        assert_eq!((azucar.price_cents, azucar.stock), (1250, 7));
        assert_eq!(repo.count().await.unwrap(), 4);
    }
}
