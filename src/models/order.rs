use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::round2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    fn rank(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::Processing => 2,
            OrderStatus::Shipped => 3,
            OrderStatus::Delivered => 4,
            OrderStatus::Cancelled => 5,
        }
    }

    /// Status moves forward only, except into `Cancelled` which is reachable
    /// solely from `Pending` or `Confirmed`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        match next {
            OrderStatus::Cancelled => {
                matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
            }
            _ => self != OrderStatus::Cancelled && next.rank() > self.rank(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Bkash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bkash_payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bkash_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
}

impl PaymentInfo {
    pub fn new(method: PaymentMethod) -> Self {
        PaymentInfo {
            method,
            bkash_payment_id: None,
            bkash_transaction_id: None,
            payment_date: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
}

impl ShippingAddress {
    pub fn is_complete(&self) -> bool {
        !self.street.trim().is_empty()
            && !self.city.trim().is_empty()
            && !self.state.trim().is_empty()
            && !self.zip_code.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_brand: Option<String>,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub price: f64,
    pub subtotal: f64,
}

impl OrderItem {
    pub fn new(
        product_id: Uuid,
        product_name: &str,
        product_brand: Option<&str>,
        quantity: u32,
        size: &str,
        color: &str,
        price: f64,
    ) -> Self {
        OrderItem {
            id: Uuid::new_v4(),
            product_id,
            product_name: product_name.to_string(),
            product_brand: product_brand.map(str::to_string),
            quantity,
            size: size.to_string(),
            color: color.to_string(),
            price,
            subtotal: round2(price * quantity as f64),
        }
    }
}

/// Immutable-once-created snapshot of a cart at checkout time. Cancellation
/// removes items or the whole order; nothing is ever added after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub payment_info: PaymentInfo,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        user_id: Uuid,
        items: Vec<OrderItem>,
        total_amount: f64,
        shipping_address: ShippingAddress,
        method: PaymentMethod,
    ) -> Self {
        Order {
            id: Uuid::new_v4(),
            user_id,
            order_number: Self::generate_order_number(),
            items,
            total_amount,
            status: OrderStatus::Pending,
            shipping_address,
            payment_info: PaymentInfo::new(method),
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// `ORD-<millis>-<9 uppercase alphanumerics>`, globally unique in practice
    /// and additionally guarded by a uniqueness constraint in the store.
    pub fn generate_order_number() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(9)
            .map(|c| (c as char).to_ascii_uppercase())
            .collect();
        format!("ORD-{}-{}", Utc::now().timestamp_millis(), suffix)
    }

    pub fn can_cancel(&self) -> bool {
        self.status.can_transition_to(OrderStatus::Cancelled)
    }

    /// Marks the payment completed and confirms the order. The caller is
    /// responsible for running the stock decrement and cart clear alongside
    /// this through `OrderStore::complete_payment`.
    pub fn mark_paid(&mut self, transaction_id: Option<String>) {
        self.payment_status = PaymentStatus::Completed;
        if self.status.can_transition_to(OrderStatus::Confirmed) {
            self.status = OrderStatus::Confirmed;
        }
        self.payment_info.bkash_transaction_id = transaction_id;
        self.payment_info.payment_date = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Gateway failure or cancel callback: payment fails, the order is left
    /// otherwise untouched so the user's cart survives for a retry.
    pub fn mark_payment_failed(&mut self) {
        self.payment_status = PaymentStatus::Failed;
        self.updated_at = Utc::now();
    }

    pub fn cancel(&mut self) {
        self.status = OrderStatus::Cancelled;
        self.updated_at = Utc::now();
    }

    /// Removes a single item and re-establishes `total_amount == Σ subtotal`.
    /// Cancelling the last remaining item cancels the whole order. Returns the
    /// removed item so the caller can compensate stock.
    pub fn cancel_item(&mut self, item_id: Uuid) -> Option<OrderItem> {
        let index = self.items.iter().position(|item| item.id == item_id)?;
        let removed = self.items.remove(index);

        self.total_amount = round2(self.items.iter().map(|item| item.subtotal).sum());
        if self.items.is_empty() {
            self.status = OrderStatus::Cancelled;
        }
        self.updated_at = Utc::now();

        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_with_items() -> Order {
        let items = vec![
            OrderItem::new(Uuid::new_v4(), "Nike Air Max Classic", Some("Nike"), 2, "9", "black", 100.0),
            OrderItem::new(Uuid::new_v4(), "Birkenstock Arizona", Some("Birkenstock"), 1, "10", "brown", 80.0),
        ];
        let total = items.iter().map(|i| i.subtotal).sum();
        Order::new(
            Uuid::new_v4(),
            items,
            total,
            ShippingAddress {
                full_name: None,
                email: None,
                phone: None,
                street: "12 Lake Rd".to_string(),
                city: "Dhaka".to_string(),
                state: "Dhaka".to_string(),
                zip_code: "12345".to_string(),
                country: "Bangladesh".to_string(),
            },
            PaymentMethod::Bkash,
        )
    }

    #[test]
    fn status_transitions_are_forward_only() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn cancelled_reachable_only_from_pending_or_confirmed() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn order_number_shape() {
        let number = Order::generate_order_number();
        assert!(number.starts_with("ORD-"));
        let parts: Vec<&str> = number.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn mark_paid_confirms_and_stamps() {
        let mut order = order_with_items();
        order.mark_paid(Some("TRX123".to_string()));

        assert_eq!(order.payment_status, PaymentStatus::Completed);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_info.bkash_transaction_id.as_deref(), Some("TRX123"));
        assert!(order.payment_info.payment_date.is_some());
    }

    #[test]
    fn payment_failure_leaves_order_status_alone() {
        let mut order = order_with_items();
        order.mark_payment_failed();

        assert_eq!(order.payment_status, PaymentStatus::Failed);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn cancel_item_recomputes_total() {
        let mut order = order_with_items();
        let first = order.items[0].id;

        let removed = order.cancel_item(first).expect("item exists");

        assert_eq!(removed.quantity, 2);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_amount, 80.0);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn cancelling_last_item_cancels_the_order() {
        let mut order = order_with_items();
        let ids: Vec<Uuid> = order.items.iter().map(|i| i.id).collect();

        for id in ids {
            order.cancel_item(id);
        }

        assert!(order.items.is_empty());
        assert_eq!(order.total_amount, 0.0);
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn cancel_item_with_unknown_id_is_a_no_op() {
        let mut order = order_with_items();
        assert!(order.cancel_item(Uuid::new_v4()).is_none());
        assert_eq!(order.items.len(), 2);
    }

    #[test]
    fn incomplete_address_is_detected() {
        let mut order = order_with_items();
        assert!(order.shipping_address.is_complete());
        order.shipping_address.zip_code = " ".to_string();
        assert!(!order.shipping_address.is_complete());
    }
}
