//! # Catalog Import
//!
//! Parsers that turn uploaded files into catalog rows. Nothing here touches
//! the database; [`ProductRepository`](crate::ProductRepository) upserts the
//! parsed rows in one transaction.
//!
//! ## Formats
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Spreadsheet (.xlsx, first worksheet)                                   │
//! │  ┌────────┬──────────────┬────────┬───────┐                             │
//! │  │ Code   │ Description  │ Price  │ Stock │  ← header, any order,       │
//! │  ├────────┼──────────────┼────────┼───────┤    Spanish names accepted   │
//! │  │ P001   │ Arroz 1 kg   │ 2.5    │ 100   │                             │
//! │  └────────┴──────────────┴────────┴───────┘                             │
//! │                                                                         │
//! │  Marketplace CSV (Tienda Nube export, ';' separated, UTF-8 or 1252)     │
//! │  col 1 name │ col 9 price │ col 15 stock │ col 16 sku                   │
//! │  code = sku, or the first 20 chars of the name with '_' for spaces      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A bad row is counted as skipped; it never fails the whole import. A
//! spreadsheet missing one of the four columns does.

use std::borrow::Cow;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use encoding_rs::WINDOWS_1252;
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::error::{DbError, DbResult};
use mostrador_core::{Money, NewProduct, ValidationError};

/// Columns a marketplace row must have to be considered.
const MARKETPLACE_MIN_COLUMNS: usize = 17;
const MARKETPLACE_NAME: usize = 1;
const MARKETPLACE_PRICE: usize = 9;
const MARKETPLACE_STOCK: usize = 15;
const MARKETPLACE_SKU: usize = 16;

/// Characters of the product name used as a code when the SKU is blank.
const GENERATED_CODE_CHARS: usize = 20;

/// Rows ready to upsert, plus how many were rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCatalog {
    pub products: Vec<NewProduct>,
    pub skipped: u64,
}

impl ParsedCatalog {
    fn accept(&mut self, product: Option<NewProduct>) {
        match product {
            Some(product) => self.products.push(product),
            None => self.skipped += 1,
        }
    }
}

// =============================================================================
// Spreadsheet
// =============================================================================

/// Column positions resolved from the header row.
struct SpreadsheetColumns {
    code: usize,
    description: usize,
    price: usize,
    stock: usize,
}

impl SpreadsheetColumns {
    fn from_header(header: &[Data]) -> Result<Self, ValidationError> {
        let names: Vec<String> = header
            .iter()
            .map(|cell| cell_text(cell).to_lowercase())
            .collect();
        let find = |aliases: &[&str], column: &str| {
            names
                .iter()
                .position(|name| aliases.contains(&name.as_str()))
                .ok_or_else(|| {
                    ValidationError::invalid_format(
                        "spreadsheet",
                        format!("missing required column '{column}'"),
                    )
                })
        };

        Ok(SpreadsheetColumns {
            code: find(&["code", "codigo", "código"], "code")?,
            description: find(&["description", "descripcion", "descripción"], "description")?,
            price: find(&["price", "precio"], "price")?,
            stock: find(&["stock"], "stock")?,
        })
    }
}

/// Parses the first worksheet of an `.xlsx` workbook.
///
/// ## Errors
/// - `Import` when the bytes are not a readable workbook
/// - `Domain(Validation)` when the header lacks a required column
pub fn parse_spreadsheet(bytes: &[u8]) -> DbResult<ParsedCatalog> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DbError::Import("workbook has no worksheets".to_string()))??;

    let mut rows = range.rows();
    let header = rows.next().unwrap_or(&[]);
    let columns = SpreadsheetColumns::from_header(header)?;

    let mut parsed = ParsedCatalog::default();
    for row in rows {
        if row.iter().all(|cell| cell_text(cell).is_empty()) {
            continue;
        }

        let field = |index: usize| row.get(index).map(cell_text).unwrap_or_default();
        parsed.accept(catalog_row(
            field(columns.code),
            field(columns.description),
            &field(columns.price),
            &field(columns.stock),
        ));
    }

    debug!(
        rows = parsed.products.len(),
        skipped = parsed.skipped,
        "Parsed spreadsheet"
    );
    Ok(parsed)
}

/// Cell contents as trimmed text. Numbers use their shortest form, so a
/// price cell holding 2.5 reads "2.5" and a stock cell holding 100.0 reads "100".
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

// =============================================================================
// Marketplace CSV
// =============================================================================

/// Parses a Tienda Nube product export.
pub fn parse_marketplace_csv(bytes: &[u8]) -> DbResult<ParsedCatalog> {
    let text = decode_text(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut parsed = ParsedCatalog::default();
    for record in reader.records() {
        let record = record?;
        if record.len() < MARKETPLACE_MIN_COLUMNS {
            parsed.skipped += 1;
            continue;
        }

        let column = |index: usize| record.get(index).unwrap_or("").trim();
        let name = column(MARKETPLACE_NAME);
        let sku = column(MARKETPLACE_SKU);

        let code = if sku.is_empty() {
            name.chars()
                .take(GENERATED_CODE_CHARS)
                .collect::<String>()
                .replace(' ', "_")
        } else {
            sku.to_string()
        };

        let price = column(MARKETPLACE_PRICE).replace(',', "");
        let price = if price.is_empty() { "0" } else { price.as_str() };
        let stock = column(MARKETPLACE_STOCK);
        let stock = if stock.is_empty() { "0" } else { stock };

        parsed.accept(catalog_row(code, name.to_string(), price, stock));
    }

    debug!(
        rows = parsed.products.len(),
        skipped = parsed.skipped,
        "Parsed marketplace export"
    );
    Ok(parsed)
}

/// UTF-8 (BOM stripped) when valid, Windows-1252 otherwise.
fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0,
    }
}

// =============================================================================
// Shared Row Rules
// =============================================================================

/// Builds a catalog row, or `None` if any field breaks the catalog rules.
fn catalog_row(code: String, description: String, price: &str, stock: &str) -> Option<NewProduct> {
    let price_cents = Money::parse_decimal(price).ok()?.cents();
    let stock = parse_stock(stock)?;

    let product = NewProduct {
        code,
        description,
        price_cents,
        stock,
    }
    .normalized();

    product.validate().ok()?;
    Some(product)
}

/// Whole units; a decimal such as "100.0" or "7.9" is truncated.
fn parse_stock(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(units) = text.parse::<i64>() {
        return Some(units);
    }

    let units = text.parse::<f64>().ok().filter(|v| v.is_finite())?;
    if units.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(units.trunc() as i64)
}

// =============================================================================
// Template
// =============================================================================

/// A ready-to-fill import workbook with one example row.
pub fn sample_spreadsheet() -> DbResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, title) in ["Code", "Description", "Price", "Stock"].iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }
    worksheet.write_string(1, 0, "P001")?;
    worksheet.write_string(1, 1, "Arroz 1 kg")?;
    worksheet.write_number(1, 2, 2.5)?;
    worksheet.write_number(1, 3, 100)?;

    Ok(workbook.save_to_buffer()?)
}

// =============================================================================
// Unit Tests
// =============================================================================
