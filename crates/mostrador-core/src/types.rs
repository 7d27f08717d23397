//! # Domain Types
//!
//! Core domain types used throughout Mostrador.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Customer     │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  code (unique)  │   │  name           │   │  created_at     │       │
//! │  │  description    │   │  tax_id (uniq?) │   │  customer_id    │       │
//! │  │  price_cents    │   │  phone          │   │  total_cents    │       │
//! │  │  stock          │   └─────────────────┘   │  payment_method │       │
//! │  └─────────────────┘                         │  installments   │       │
//! │                                              └────────┬────────┘       │
//! │                                                       │ 1..n           │
//! │                                              ┌────────▼────────┐       │
//! │                                              │    SaleLine     │       │
//! │                                              │  product_id     │       │
//! │                                              │  quantity       │       │
//! │                                              │  unit_price     │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales and sale lines are written once, at confirmation, and never change.

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_code, validate_customer_name, validate_description, validate_price_cents,
    validate_stock, ValidationResult,
};
use crate::DEFAULT_PAGE_SIZE;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,

    /// Business identifier, unique across the catalog.
    pub code: String,

    pub description: String,

    /// Price in cents.
    pub price_cents: i64,

    /// Units on hand, never negative.
    pub stock: i64,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be taken from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }
}

/// Fields for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub code: String,
    pub description: String,
    pub price_cents: i64,
    pub stock: i64,
}

impl NewProduct {
    /// Trims text fields in place.
    pub fn normalized(mut self) -> Self {
        self.code = self.code.trim().to_string();
        self.description = self.description.trim().to_string();
        self
    }

    /// Checks every field against the catalog rules.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_code(&self.code)?;
        validate_description(&self.description)?;
        validate_price_cents(self.price_cents)?;
        validate_stock(self.stock)?;
        Ok(())
    }
}

// =============================================================================
// Product Listing
// =============================================================================

/// Sort order for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductOrder {
    /// Most recently created first.
    #[default]
    Newest,
    Oldest,
    PriceDesc,
    PriceAsc,
}

impl FromStr for ProductOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "nuevo" => Ok(ProductOrder::Newest),
            "oldest" | "viejo" => Ok(ProductOrder::Oldest),
            "price_desc" | "mayor" => Ok(ProductOrder::PriceDesc),
            "price_asc" | "menor" => Ok(ProductOrder::PriceAsc),
            _ => Err(ValidationError::NotAllowed {
                field: "order".to_string(),
                allowed: ["newest", "oldest", "price_desc", "price_asc"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

/// Typed catalog filter.
///
/// ## Fields
/// ```text
/// search            substring of code OR description
/// out_of_stock_only stock = 0
/// order             newest | oldest | price_desc | price_asc
/// page / per_page   1-based pagination
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub out_of_stock_only: bool,
    pub order: ProductOrder,
    pub page: u32,
    pub per_page: u32,
}

impl Default for ProductFilter {
    fn default() -> Self {
        ProductFilter {
            search: None,
            out_of_stock_only: false,
            order: ProductOrder::default(),
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ProductFilter {
    /// Returns the trimmed search term, or `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Returns the pagination window.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 200;

/// A clamped, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        PageRequest {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip for this page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        let per_page = i64::from(request.per_page);
        let total_pages = ((total.max(0) + per_page - 1) / per_page) as u32;
        Page {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            total_pages,
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer. The walk-in customer is a regular row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// Tax identifier (CUIT), unique when present.
    pub tax_id: Option<String>,
    pub phone: Option<String>,
}

/// Fields for registering a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewCustomer {
    /// Trims fields and turns blank optionals into `None`.
    pub fn normalized(self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        NewCustomer {
            name: self.name.trim().to_string(),
            tax_id: blank_to_none(self.tax_id),
            phone: blank_to_none(self.phone),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_customer_name(&self.name)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How a sale was paid. Stored lowercase in English; the Spanish names used
/// by the shop's front end are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[serde(alias = "efectivo")]
    Cash,
    #[serde(alias = "transferencia")]
    Transfer,
    #[serde(alias = "tarjeta")]
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Cash, PaymentMethod::Transfer, PaymentMethod::Card];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Card => "card",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(PaymentMethod::Cash),
            "transfer" | "transferencia" => Ok(PaymentMethod::Transfer),
            "card" | "tarjeta" => Ok(PaymentMethod::Card),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

/// Validated payment choice for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub method: PaymentMethod,
    /// Only set for card payments (2, 3 or 6).
    pub installments: Option<i64>,
}

// =============================================================================
// Sale
// =============================================================================

/// A confirmed sale header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub customer_id: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub installments: Option<i64>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line of a confirmed sale, priced as it was at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// What the engine hands back after a successful confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub sale_id: i64,
    pub created_at: NaiveDateTime,
    pub customer_id: i64,
    pub total_cents: i64,
    pub line_count: usize,
    pub terms: PaymentTerms,
}

/// Sale header joined with the customer's name, for history listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleSummary {
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub customer_id: i64,
    pub customer_name: String,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub installments: Option<i64>,
}

/// Sale line joined with the product's code and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLineDetail {
    pub product_id: i64,
    pub code: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

/// Full sale: header plus lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub summary: SaleSummary,
    pub lines: Vec<SaleLineDetail>,
}

// =============================================================================
// Reporting
// =============================================================================

/// Figures shown on the landing dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub product_count: i64,
    pub customer_count: i64,
    pub sales_today: i64,
    pub revenue_today_cents: i64,
    pub sales_this_month: i64,
    pub revenue_this_month_cents: i64,
    pub recent_sales: Vec<SaleSummary>,
}

/// One row of the monthly export: a sale line with its context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MonthlyReportRow {
    pub sale_id: i64,
    pub created_at: NaiveDateTime,
    pub customer_name: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

/// A half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Period {
    /// The calendar day containing `date`.
    pub fn day(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        Period {
            start,
            end: start + Duration::days(1),
        }
    }

    /// The calendar month containing `date`.
    pub fn month(date: NaiveDate) -> Self {
        let first = date - Duration::days(i64::from(date.day0()));
        let next_month = first + Days::new(32);
        let next_first = next_month - Duration::days(i64::from(next_month.day0()));
        Period {
            start: first.and_time(NaiveTime::MIN),
            end: next_first.and_time(NaiveTime::MIN),
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }
}

// =============================================================================
// Import
// =============================================================================

/// Outcome of a bulk catalog import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows inserted or updated.
    pub imported: u64,
    /// Rows ignored because they were malformed.
    pub skipped: u64,
}

// =============================================================================
// Credentials
// =============================================================================

/// A stored login. The hash is a PHC string with its own salt.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_payment_method_parsing_accepts_aliases() {
        assert_eq!("efectivo".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("Transfer".parse::<PaymentMethod>().unwrap(), PaymentMethod::Transfer);
        assert_eq!("tarjeta".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_serde() {
        let method: PaymentMethod = serde_json::from_str("\"tarjeta\"").unwrap();
        assert_eq!(method, PaymentMethod::Card);
        assert_eq!(serde_json::to_string(&PaymentMethod::Cash).unwrap(), "\"cash\"");
    }

    #[test]
    fn test_product_order_parsing() {
        assert_eq!("mayor".parse::<ProductOrder>().unwrap(), ProductOrder::PriceDesc);
        assert_eq!("price_asc".parse::<ProductOrder>().unwrap(), ProductOrder::PriceAsc);
        assert!("random".parse::<ProductOrder>().is_err());
    }

    #[test]
    fn test_filter_search_term_ignores_blank() {
        let mut filter = ProductFilter::default();
        assert_eq!(filter.search_term(), None);

        filter.search = Some("   ".to_string());
        assert_eq!(filter.search_term(), None);

        filter.search = Some("  arroz ".to_string());
        assert_eq!(filter.search_term(), Some("arroz"));
    }

    #[test]
    fn test_page_request_clamps() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, 1);

        let request = PageRequest::new(3, 20);
        assert_eq!(request.offset(), 40);
        assert_eq!(PageRequest::new(1, 10_000).per_page, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_total_pages() {
        let page: Page<i64> = Page::new(vec![], 41, PageRequest::new(1, 20));
        assert_eq!(page.total_pages, 3);

        let empty: Page<i64> = Page::new(vec![], 0, PageRequest::new(1, 20));
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_new_customer_normalization() {
        let customer = NewCustomer {
            name: "  Ana  ".to_string(),
            tax_id: Some("   ".to_string()),
            phone: Some(" 555-1234 ".to_string()),
        }
        .normalized();

        assert_eq!(customer.name, "Ana");
        assert_eq!(customer.tax_id, None);
        assert_eq!(customer.phone.as_deref(), Some("555-1234"));
    }

    #[test]
    fn test_period_day() {
        let period = Period::day(date(2026, 10, 16));
        assert_eq!(period.start, date(2026, 10, 16).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(period.end, date(2026, 10, 17).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_period_month_handles_year_end_and_short_months() {
        let december = Period::month(date(2026, 12, 31));
        assert_eq!(december.start, date(2026, 12, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(december.end, date(2027, 1, 1).and_hms_opt(0, 0, 0).unwrap());

        let february = Period::month(date(2028, 2, 29));
        assert_eq!(february.end, date(2028, 3, 1).and_hms_opt(0, 0, 0).unwrap());
        assert!(february.contains(date(2028, 2, 29).and_hms_opt(23, 59, 59).unwrap()));
        assert!(!february.contains(february.end));
    }
}
