//! # Sale Session
//!
//! Per-session context for one in-progress sale: the cart plus the selected
//! customer. Callers receive it explicitly and pass it into every cart and
//! checkout operation; nothing here is global.
//!
//! ```text
//! SaleSession
//! ├── cart: Cart
//! └── customer_id: Option<i64>
//!
//! confirm succeeded ──► finish_sale() ──► empty cart, no customer
//! ```

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::Customer;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleSession {
    pub cart: Cart,
    customer_id: Option<i64>,
}

impl SaleSession {
    pub fn new() -> Self {
        SaleSession::default()
    }

    /// Selects the customer the sale will be recorded against.
    ///
    /// Takes the loaded record so a session can only point at a customer that
    /// existed when it was chosen.
    pub fn select_customer(&mut self, customer: &Customer) {
        self.customer_id = Some(customer.id);
    }

    pub fn customer_id(&self) -> Option<i64> {
        self.customer_id
    }

    /// Resets the session after a committed sale.
    pub fn finish_sale(&mut self) {
        self.cart.clear();
        self.customer_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;

    #[test]
    fn test_finish_sale_clears_cart_and_customer() {
        let mut session = SaleSession::new();
        let product = Product {
            id: 1,
            code: "P001".to_string(),
            description: "Arroz 1 kg".to_string(),
            price_cents: 250,
            stock: 100,
        };
        let customer = Customer {
            id: 1,
            name: "Consumidor Final".to_string(),
            tax_id: None,
            phone: None,
        };

        session.cart.add(&product, 3).unwrap();
        session.select_customer(&customer);
        assert_eq!(session.customer_id(), Some(1));

        session.finish_sale();
        assert!(session.cart.is_empty());
        assert_eq!(session.customer_id(), None);
    }
}
