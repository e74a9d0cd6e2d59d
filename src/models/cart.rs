use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Product;

/// A single cart line. Name, price and image are snapshots taken when the
/// product was first added; catalog updates after that point do not change
/// lines already in a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub image_url: Option<String>,
}

/// Session-scoped cart. Lines are keyed by the string form of the product id.
/// Invariant: a stored line always has quantity > 0 — reaching zero removes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: HashMap<String, CartLine>,
}

// Request types

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

// Response types

#[derive(Debug, Serialize)]
pub struct CartState {
    pub cart_items: HashMap<String, CartLine>,
    pub total_items: i64,
    pub total_price: Decimal,
}

impl Cart {
    /// Merges `quantity` into an existing line, or inserts a fresh snapshot
    /// line taken from the current product record. An existing line keeps its
    /// original snapshot fields.
    pub fn add_line(&mut self, product: &Product, quantity: i32) {
        let key = product.id.to_string();

        match self.items.get_mut(&key) {
            Some(line) => {
                line.quantity += quantity;
            }
            None => {
                self.items.insert(
                    key,
                    CartLine {
                        id: product.id,
                        name: product.name.clone(),
                        price: product.price,
                        quantity,
                        image_url: product.image_url.clone(),
                    },
                );
            }
        }
    }

    /// Replaces a line's quantity. A quantity of zero or less removes the
    /// line. Returns false when no line exists for `product_id`.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i32) -> bool {
        if !self.items.contains_key(product_id) {
            return false;
        }

        if quantity <= 0 {
            self.items.remove(product_id);
        } else if let Some(line) = self.items.get_mut(product_id) {
            line.quantity = quantity;
        }

        true
    }

    /// Returns false when no line exists for `product_id`.
    pub fn remove_line(&mut self, product_id: &str) -> bool {
        self.items.remove(product_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.items.values()
    }

    pub fn state(&self) -> CartState {
        let total_items = self.items.values().map(|line| line.quantity as i64).sum();

        let total_price: Decimal = self
            .items
            .values()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum();

        CartState {
            cart_items: self.items.clone(),
            total_items,
            total_price: total_price.round_dp(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::dec;

    fn product(id: i32, name: &str, price: Decimal) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: None,
            price,
            image_url: None,
            stock_quantity: 10,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn adding_same_product_merges_quantities() {
        let mut cart = Cart::default();
        let p = product(1, "Diamond Sword", dec!(10.99));

        cart.add_line(&p, 2);
        cart.add_line(&p, 3);

        let state = cart.state();
        assert_eq!(state.cart_items.len(), 1);
        assert_eq!(state.cart_items["1"].quantity, 5);
        assert_eq!(state.total_items, 5);
        assert_eq!(state.total_price, dec!(54.95));
    }

    #[test]
    fn snapshot_price_survives_catalog_changes() {
        let mut cart = Cart::default();
        let mut p = product(1, "Torch", dec!(1.50));

        cart.add_line(&p, 1);
        p.price = dec!(99.00);
        cart.add_line(&p, 1);

        // second add merged into the original snapshot line
        let state = cart.state();
        assert_eq!(state.cart_items["1"].price, dec!(1.50));
        assert_eq!(state.total_price, dec!(3.00));
    }

    #[test]
    fn set_quantity_replaces_instead_of_adding() {
        let mut cart = Cart::default();
        cart.add_line(&product(7, "Shield", dec!(25)), 4);

        assert!(cart.set_quantity("7", 2));
        assert_eq!(cart.state().total_items, 2);
    }

    #[test]
    fn set_quantity_zero_removes_the_line() {
        let mut cart = Cart::default();
        cart.add_line(&product(7, "Shield", dec!(25)), 4);

        assert!(cart.set_quantity("7", 0));
        assert!(cart.is_empty());

        // line is gone, further updates miss
        assert!(!cart.set_quantity("7", 3));
    }

    #[test]
    fn remove_missing_line_misses() {
        let mut cart = Cart::default();
        assert!(!cart.remove_line("42"));

        cart.add_line(&product(42, "Elytra", dec!(120)), 1);
        assert!(cart.remove_line("42"));
        assert!(cart.is_empty());
    }

    #[test]
    fn totals_round_to_two_decimals() {
        let mut cart = Cart::default();
        cart.add_line(&product(1, "Arrow", dec!(0.333)), 3);

        let state = cart.state();
        assert_eq!(state.total_price, dec!(1.00));
    }

    #[test]
    fn empty_cart_state() {
        let state = Cart::default().state();
        assert!(state.cart_items.is_empty());
        assert_eq!(state.total_items, 0);
        assert_eq!(state.total_price, Decimal::ZERO);
    }
}
