//! # Monthly Sales Workbook
//!
//! Renders [`MonthlyReportRow`]s as an `.xlsx` download.
//!
//! ```text
//! ┌─────────────────────┬──────────┬────────────┬──────────┬────────────┬──────────┐
//! │ Date                │ Customer │ Product    │ Quantity │ Unit price │ Subtotal │
//! ├─────────────────────┼──────────┼────────────┼──────────┼────────────┼──────────┤
//! │ 2026-10-03 12:00:00 │ Ana      │ Arroz 1 kg │ 3        │ 2.5        │ 7.5      │
//! │ ...                 │          │            │          │            │          │
//! │                     │          │            │          │ Total      │ 7.5      │
//! └─────────────────────┴──────────┴────────────┴──────────┴────────────┴──────────┘
//! ```

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::error::{DbError, DbResult};
use mostrador_core::{Money, MonthlyReportRow};

const HEADERS: [&str; 6] = ["Date", "Customer", "Product", "Quantity", "Unit price", "Subtotal"];

/// Builds the workbook in memory.
pub fn monthly_workbook(rows: &[MonthlyReportRow]) -> DbResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("0.00");
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Sales")?;

    for (col, title) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    let mut total = Money::zero();
    let mut row_index: u32 = 1;
    for row in rows {
        let subtotal = Money::from_cents(row.subtotal_cents);
        total = total
            .checked_add(subtotal)
            .ok_or_else(|| DbError::Report("monthly total overflows".to_string()))?;

        let created_at = row.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
        worksheet.write_string(row_index, 0, created_at)?;
        worksheet.write_string(row_index, 1, &row.customer_name)?;
        worksheet.write_string(row_index, 2, &row.description)?;
        worksheet.write_number(row_index, 3, row.quantity as f64)?;
        worksheet.write_number_with_format(
            row_index,
            4,
            Money::from_cents(row.unit_price_cents).as_major_units(),
            &money,
        )?;
        worksheet.write_number_with_format(row_index, 5, subtotal.as_major_units(), &money)?;
        row_index += 1;
    }

    worksheet.write_string_with_format(row_index, 4, "Total", &bold)?;
    worksheet.write_number_with_format(row_index, 5, total.as_major_units(), &money)?;
    worksheet.autofit();

    debug!(rows = rows.len(), total_cents = total.cents(), "Rendered monthly workbook");
    Ok(workbook.save_to_buffer()?)
}

/// Download name for the month containing `now`, e.g. `sales-2026-10.xlsx`.
pub fn monthly_file_name(now: NaiveDateTime) -> String {
    format!("sales-{}.xlsx", now.format("%Y-%m"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn row(
        customer: &str,
        description: &str,
        quantity: i64,
        unit_price_cents: i64,
    ) -> MonthlyReportRow {
        MonthlyReportRow {
            sale_id: 1,
            created_at: NaiveDate::from_ymd_opt(2026, 10, 3)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            customer_name: customer.to_string(),
            description: description.to_string(),
            quantity,
            unit_price_cents,
            subtotal_cents: quantity * unit_price_cents,
        }
    }

    #[test]
    fn test_workbook_has_header_rows_and_total() {
        let bytes = monthly_workbook(&[
            row("Ana", "Arroz 1 kg", 3, 250),
            row("Consumidor Final", "Yerba mate 500 g", 1, 1800),
        ])
        .unwrap();

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Sales").unwrap();

        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Date".to_string())));
        assert_eq!(range.get_value((0, 5)), Some(&Data::String("Subtotal".to_string())));
        assert_eq!(
            range.get_value((1, 0)),
            Some(&Data::String("2026-10-03 12:00:00".to_string()))
        );
        assert_eq!(range.get_value((1, 1)), Some(&Data::String("Ana".to_string())));
        assert_eq!(range.get_value((1, 5)), Some(&Data::Float(7.5)));
        assert_eq!(range.get_value((3, 5)), Some(&Data::Float(25.5)));
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let mut big = row("Ana", "Arroz 1 kg", 1, 1);
        big.subtotal_cents = i64::MAX;

        let err = monthly_workbook(&[big.clone(), big]).unwrap_err();
        assert!(matches!(err, DbError::Report(_)));
    }

    #[test]
    fn test_empty_month_still_renders() {
        let bytes = monthly_workbook(&[]).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_file_name() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(monthly_file_name(now), "sales-2026-10.xlsx");
    }
}
