use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Cart, ChatHistory, Order, OrderStatus, Product, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Fuzzy catalog filter built from chat entities. Every field is a
/// case-insensitive substring match; `name_or_brand` matches either column.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub name_or_brand: Option<String>,
    pub color: Option<String>,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_product(&self, id: Uuid) -> Result<Option<Product>>;

    async fn search_products(&self, filter: &ProductFilter, limit: i64) -> Result<Vec<Product>>;

    async fn find_product_by_name(&self, term: &str) -> Result<Option<Product>>;

    async fn find_product_by_brand(&self, term: &str) -> Result<Option<Product>>;

    async fn find_product_by_description(&self, term: &str) -> Result<Option<Product>>;

    /// Relative stock adjustment, floored at zero. Always increment-by-delta,
    /// never read-then-write-absolute, so concurrent orders against the same
    /// product reconcile.
    async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<()>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_cart(&self, user_id: Uuid) -> Result<Option<Cart>>;

    /// Upsert keyed on the cart's user, which carries a uniqueness
    /// constraint: one cart per user.
    async fn save_cart(&self, cart: &Cart) -> Result<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: &Order) -> Result<()>;

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>>;

    async fn find_order_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>>;

    async fn update_order(&self, order: &Order) -> Result<()>;

    /// Newest-first page of a user's orders plus the total count.
    async fn list_orders(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Order>, i64)>;

    /// Payment completion bundle: persist the paid order, decrement stock for
    /// every item, and optionally clear the originating cart, together. The
    /// caller has already applied `mark_paid` to the order. Gateway flows pass
    /// `clear_cart = true`; cash-on-delivery confirmation passes `false`
    /// because its cart was cleared at checkout and may hold new items by now.
    /// Implementations must not leave the bundle partially applied.
    async fn complete_payment(&self, order: &Order, clear_cart: bool) -> Result<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;
}

#[async_trait]
pub trait ChatHistoryStore: Send + Sync {
    async fn find_history(&self, user_id: Uuid, session_id: &str) -> Result<Option<ChatHistory>>;

    async fn save_history(&self, history: &ChatHistory) -> Result<()>;
}

/// Everything the routes and the dispatcher need, behind one object.
pub trait Store:
    CatalogStore + CartStore + OrderStore + UserStore + ChatHistoryStore
{
}

impl<T> Store for T where
    T: CatalogStore + CartStore + OrderStore + UserStore + ChatHistoryStore
{
}
