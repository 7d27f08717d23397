//! # Cart
//!
//! The in-progress sale held by one session.
//!
//! ## Line Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add(product, qty)                                                      │
//! │     ├── product already in cart? → quantities summed, stock re-checked  │
//! │     └── otherwise               → new line, price = product price       │
//! │                                                                         │
//! │  update_quantity(index, qty, product) → stock re-checked                │
//! │  override_price(index, price)         → any price > 0 (discounting)     │
//! │  remove(index) / clear()                                                │
//! │                                                                         │
//! │  Every mutation checks first and writes last: a failed call leaves      │
//! │  the cart exactly as it was.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock checks here are advisory; the sale transaction checks again
//! against the database at confirmation time.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{
    validate_line_index, validate_price_cents, validate_quantity, ValidationResult,
};
use crate::MAX_CART_ITEMS;
#[cfg(doc)]
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

// =============================================================================
// Cart Line
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,

    /// Code at time of adding.
    pub code: String,

    /// Description at time of adding.
    pub description: String,

    /// Catalog price when the line was created.
    pub original_price_cents: i64,

    /// Price charged per unit. Differs from the original after an override.
    pub unit_price_cents: i64,

    pub quantity: i64,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id,
            code: product.code.clone(),
            description: product.description.clone(),
            original_price_cents: product.price_cents,
            unit_price_cents: product.price_cents,
            quantity,
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Effective unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> ValidationResult<Money> {
        self.unit_price()
            .checked_multiply_quantity(self.quantity)
            .ok_or_else(|| ValidationError::overflow("line total"))
    }

    #[inline]
    pub fn is_price_overridden(&self) -> bool {
        self.unit_price_cents != self.original_price_cents
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&CartLine> {
        self.lines.get(index)
    }

    /// Adds a product or increases the quantity of its existing line.
    ///
    /// ## Errors
    /// - `Validation` if `quantity` or the merged quantity is outside
    ///   1..=[`MAX_ITEM_QUANTITY`]
    /// - `InsufficientStock` if the resulting quantity exceeds `product.stock`
    /// - `CartTooLarge` when a new line would exceed [`MAX_CART_ITEMS`]
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(index) = self.position_of(product.id) {
            let merged = self.lines[index]
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| ValidationError::overflow("quantity"))?;
            validate_quantity(merged)?;
            ensure_stock(product, merged)?;
            self.lines[index].quantity = merged;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }
        ensure_stock(product, quantity)?;

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Sets the quantity of a line, re-checking the product's current stock.
    pub fn update_quantity(
        &mut self,
        index: usize,
        quantity: i64,
        product: &Product,
    ) -> CoreResult<()> {
        validate_line_index(index, self.lines.len())?;
        validate_quantity(quantity)?;

        if self.lines[index].product_id != product.id {
            return Err(ValidationError::invalid_format(
                "product",
                format!("line {} holds a different product", index),
            )
            .into());
        }
        ensure_stock(product, quantity)?;

        self.lines[index].quantity = quantity;
        Ok(())
    }

    /// Replaces the unit price of a line. Any price in 1..=[`MAX_PRICE_CENTS`].
    pub fn override_price(&mut self, index: usize, price: Money) -> CoreResult<()> {
        validate_line_index(index, self.lines.len())?;
        validate_price_cents(price.cents())?;

        self.lines[index].unit_price_cents = price.cents();
        Ok(())
    }

    /// Removes and returns a line.
    pub fn remove(&mut self, index: usize) -> CoreResult<CartLine> {
        validate_line_index(index, self.lines.len())?;
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines
            .iter()
            .fold(0, |total, line| total.saturating_add(line.quantity))
    }

    /// Σ(effective price × quantity).
    pub fn total(&self) -> ValidationResult<Money> {
        line_totals(&self.lines)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position_of(&self, product_id: i64) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }
}

/// Checked Σ(effective price × quantity) over any set of lines.
pub fn line_totals(lines: &[CartLine]) -> ValidationResult<Money> {
    let totals = lines
        .iter()
        .map(CartLine::line_total)
        .collect::<ValidationResult<Vec<_>>>()?;

    Money::checked_sum(totals).ok_or_else(|| ValidationError::overflow("total"))
}

fn ensure_stock(product: &Product, requested: i64) -> CoreResult<()> {
    if !product.can_sell(requested) {
        return Err(CoreError::InsufficientStock {
            code: product.code.clone(),
            available: product.stock,
            requested,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
