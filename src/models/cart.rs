use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hard cap on quantity per cart line for the direct API path. The chat path
/// deliberately merges uncapped; see `merge_chat_item`.
pub const MAX_QUANTITY_PER_LINE: u32 = 10;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    /// Unit price snapshot taken when the line was added.
    pub price: f64,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Per-user cart aggregate. One cart per user, enforced by a uniqueness
/// constraint on `user_id` in the store. `total_amount` is derived and is
/// recomputed by every mutation before the cart is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        Cart {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            total_amount: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn recalculate_total(&mut self) {
        let total: f64 = self.items.iter().map(CartItem::line_total).sum();
        self.total_amount = round2(total);
        self.updated_at = Utc::now();
    }

    /// Direct API add: exact (product, size, color) match, quantities merged
    /// and clamped to `MAX_QUANTITY_PER_LINE`.
    pub fn add_item(&mut self, product_id: Uuid, quantity: u32, size: &str, color: &str, price: f64) {
        let existing = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id && item.size == size && item.color == color);

        match existing {
            Some(item) => {
                item.quantity = (item.quantity + quantity).min(MAX_QUANTITY_PER_LINE);
            }
            None => self.items.push(CartItem {
                product_id,
                quantity: quantity.min(MAX_QUANTITY_PER_LINE),
                size: size.to_string(),
                color: color.to_string(),
                price,
            }),
        }

        self.recalculate_total();
    }

    /// Chat add: color is matched case-insensitively and stored lowercased,
    /// and the merged quantity is not clamped. The divergence from `add_item`
    /// is intentional and preserved from the conversational flow.
    pub fn merge_chat_item(
        &mut self,
        product_id: Uuid,
        quantity: u32,
        size: &str,
        color: &str,
        price: f64,
    ) {
        let existing = self.items.iter_mut().find(|item| {
            item.product_id == product_id
                && item.size == size
                && item.color.eq_ignore_ascii_case(color)
        });

        match existing {
            Some(item) => item.quantity += quantity,
            None => self.items.push(CartItem {
                product_id,
                quantity,
                size: size.to_string(),
                color: color.to_lowercase(),
                price,
            }),
        }

        self.recalculate_total();
    }

    /// Exact-match deletion.
    pub fn remove_item(&mut self, product_id: Uuid, size: &str, color: &str) {
        self.items.retain(|item| {
            !(item.product_id == product_id && item.size == size && item.color == color)
        });
        self.recalculate_total();
    }

    /// Removes the line at `index`, returning it. Used by the chat removal
    /// flow once a line has been resolved from the user's description.
    pub fn remove_line(&mut self, index: usize) -> CartItem {
        let item = self.items.remove(index);
        self.recalculate_total();
        item
    }

    /// Quantity <= 0 deletes the line; otherwise sets it, clamped to the cap.
    pub fn update_quantity(&mut self, product_id: Uuid, size: &str, color: &str, quantity: i64) {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id == product_id && item.size == size && item.color == color);

        if let Some(index) = index {
            if quantity <= 0 {
                self.items.remove(index);
            } else {
                self.items[index].quantity = (quantity as u32).min(MAX_QUANTITY_PER_LINE);
            }
            self.recalculate_total();
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.total_amount = 0.0;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_total(cart: &Cart) -> f64 {
        round2(cart.items.iter().map(CartItem::line_total).sum())
    }

    #[test]
    fn total_invariant_holds_across_mutations() {
        let product_a = Uuid::new_v4();
        let product_b = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());

        cart.add_item(product_a, 2, "9", "black", 59.99);
        assert_eq!(cart.total_amount, expected_total(&cart));

        cart.add_item(product_b, 1, "10", "white", 120.50);
        assert_eq!(cart.total_amount, expected_total(&cart));

        cart.update_quantity(product_a, "9", "black", 5);
        assert_eq!(cart.total_amount, expected_total(&cart));

        cart.remove_item(product_b, "10", "white");
        assert_eq!(cart.total_amount, expected_total(&cart));
        assert_eq!(cart.total_amount, round2(5.0 * 59.99));
    }

    #[test]
    fn re_adding_merges_into_one_line_clamped_at_ten() {
        let product = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());

        cart.add_item(product, 6, "9", "black", 10.0);
        cart.add_item(product, 7, "9", "black", 10.0);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 10);
        assert_eq!(cart.total_amount, 100.0);
    }

    #[test]
    fn different_size_or_color_is_a_separate_line() {
        let product = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());

        cart.add_item(product, 1, "9", "black", 10.0);
        cart.add_item(product, 1, "10", "black", 10.0);
        cart.add_item(product, 1, "9", "white", 10.0);

        assert_eq!(cart.items.len(), 3);
    }

    #[test]
    fn update_to_zero_deletes_the_line() {
        let product = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());

        cart.add_item(product, 3, "9", "black", 25.0);
        cart.update_quantity(product, "9", "black", 0);

        assert!(cart.is_empty());
        assert_eq!(cart.total_amount, 0.0);
    }

    #[test]
    fn update_clamps_to_max() {
        let product = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());

        cart.add_item(product, 1, "9", "black", 5.0);
        cart.update_quantity(product, "9", "black", 50);

        assert_eq!(cart.items[0].quantity, MAX_QUANTITY_PER_LINE);
    }

    #[test]
    fn chat_merge_matches_color_case_insensitively_and_is_uncapped() {
        let product = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());

        cart.merge_chat_item(product, 8, "9", "Black", 10.0);
        assert_eq!(cart.items[0].color, "black");

        cart.merge_chat_item(product, 8, "9", "BLACK", 10.0);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 16);
        assert_eq!(cart.total_amount, 160.0);
    }

    #[test]
    fn api_add_color_match_is_case_sensitive() {
        let product = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());

        cart.add_item(product, 1, "9", "Black", 10.0);
        cart.add_item(product, 1, "9", "black", 10.0);

        // Two distinct lines on the direct API path.
        assert_eq!(cart.items.len(), 2);
    }

    #[test]
    fn clear_empties_items_and_zeroes_total() {
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add_item(Uuid::new_v4(), 2, "9", "black", 33.33);

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.total_amount, 0.0);
    }

    #[test]
    fn totals_round_to_two_decimals() {
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add_item(Uuid::new_v4(), 3, "9", "black", 19.999);
        assert_eq!(cart.total_amount, 60.0);
    }
}
