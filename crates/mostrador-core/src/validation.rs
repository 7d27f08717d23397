//! # Validation Module
//!
//! Input validation for catalog edits, cart mutations and sale confirmation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser                                                      │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Rust (THIS MODULE)                                           │
//! │  ├── Field rules (code, description, price, stock)                     │
//! │  └── Sale preconditions, checked in a fixed order                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE (product code, customer tax id, username)                  │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mostrador_core::validation::{validate_code, validate_quantity};
//!
//! assert!(validate_code("P001").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{PaymentMethod, PaymentTerms};
use crate::{ALLOWED_INSTALLMENTS, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 50 characters
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::required("code"));
    }

    if code.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    Ok(())
}

/// Validates a product description.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::required("description"));
    }

    if description.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 200,
        });
    }

    Ok(())
}

pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::required("name"));
    }

    Ok(())
}

/// Validates a search query. Empty is fine; very long input is not.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value (1 to [`MAX_ITEM_QUANTITY`]).
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Item                                                         │
/// │                                                                         │
/// │  User enters quantity: 5                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → stock check against the product                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is not a valid price.
///
/// ```rust
/// use mostrador_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(250).is_ok());
/// assert!(validate_price_cents(0).is_err());
/// assert!(validate_price_cents(mostrador_core::MAX_PRICE_CENTS + 1).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::must_be_positive("price"));
    }

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 1,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a cart line index.
pub fn validate_line_index(index: usize, len: usize) -> ValidationResult<()> {
    if index >= len {
        return Err(ValidationError::OutOfRange {
            field: "line index".to_string(),
            min: 0,
            max: len as i64 - 1,
        });
    }

    Ok(())
}

// =============================================================================
// Sale Preconditions
// =============================================================================

/// Checks a confirmation request before anything is written.
///
/// ## Order (first failure wins)
/// ```text
/// 1. cart has at least one line
/// 2. a customer is selected
/// 3. payment method is cash | transfer | card (or efectivo | transferencia | tarjeta)
/// 4. card      → installments ∈ {2, 3, 6}
///    otherwise → installments absent
/// ```
pub fn validate_sale_request(
    line_count: usize,
    customer_id: Option<i64>,
    payment_method: &str,
    installments: Option<i64>,
) -> ValidationResult<PaymentTerms> {
    if line_count == 0 {
        return Err(ValidationError::required("cart items"));
    }

    if customer_id.is_none() {
        return Err(ValidationError::required("customer"));
    }

    if payment_method.trim().is_empty() {
        return Err(ValidationError::required("payment_method"));
    }
    let method: PaymentMethod = payment_method.parse()?;

    match (method, installments) {
        (PaymentMethod::Card, Some(n)) if ALLOWED_INSTALLMENTS.contains(&n) => {}
        (PaymentMethod::Card, None) => return Err(ValidationError::required("installments")),
        (PaymentMethod::Card, Some(_)) => {
            return Err(ValidationError::NotAllowed {
                field: "installments".to_string(),
                allowed: ALLOWED_INSTALLMENTS.iter().map(|n| n.to_string()).collect(),
            })
        }
        (_, Some(_)) => {
            return Err(ValidationError::NotApplicable {
                field: "installments".to_string(),
                reason: format!("only card payments take installments, got {}", method),
            })
        }
        (_, None) => {}
    }

    Ok(PaymentTerms {
        method,
        installments,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
