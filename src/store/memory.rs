use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Cart, ChatHistory, Order, OrderStatus, Product, User};

use super::{CartStore, CatalogStore, ChatHistoryStore, OrderStore, ProductFilter, UserStore};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Default)]
struct Inner {
    products: Vec<Product>,
    carts: HashMap<Uuid, Cart>,
    orders: Vec<Order>,
    users: HashMap<Uuid, User>,
    histories: HashMap<(Uuid, String), ChatHistory>,
}

/// In-memory store with the same matching semantics as the Postgres one.
/// Used by tests and by local runs without a database.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub async fn insert_product(&self, product: Product) {
        self.inner.write().await.products.push(product);
    }

    pub async fn insert_user(&self, user: User) {
        self.inner.write().await.users.insert(user.id, user);
    }

    pub async fn product_stock(&self, id: Uuid) -> Option<i32> {
        self.inner
            .read()
            .await
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.stock)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().find(|p| p.id == id).cloned())
    }

    async fn search_products(&self, filter: &ProductFilter, limit: i64) -> Result<Vec<Product>> {
        let inner = self.inner.read().await;
        let results = inner
            .products
            .iter()
            .filter(|p| {
                filter
                    .category
                    .as_deref()
                    .map_or(true, |c| contains_ci(p.category.as_str(), c))
            })
            .filter(|p| {
                filter.name_or_brand.as_deref().map_or(true, |term| {
                    contains_ci(&p.name, term) || contains_ci(&p.brand, term)
                })
            })
            .filter(|p| {
                filter
                    .color
                    .as_deref()
                    .map_or(true, |color| p.colors.iter().any(|c| contains_ci(c, color)))
            })
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok(results)
    }

    async fn find_product_by_name(&self, term: &str) -> Result<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .iter()
            .find(|p| contains_ci(&p.name, term))
            .cloned())
    }

    async fn find_product_by_brand(&self, term: &str) -> Result<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .iter()
            .find(|p| contains_ci(&p.brand, term))
            .cloned())
    }

    async fn find_product_by_description(&self, term: &str) -> Result<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .iter()
            .find(|p| contains_ci(&p.description, term))
            .cloned())
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(product) = inner.products.iter_mut().find(|p| p.id == id) {
            product.stock = (product.stock + delta).max(0);
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn find_cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
        Ok(self.inner.read().await.carts.get(&user_id).cloned())
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        self.inner
            .write()
            .await
            .carts
            .insert(cart.user_id, cart.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.inner.write().await.orders.push(order.clone());
        Ok(())
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn find_order_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .iter()
            .find(|o| o.payment_info.bkash_payment_id.as_deref() == Some(payment_id))
            .cloned())
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(slot) = inner.orders.iter_mut().find(|o| o.id == order.id) {
            *slot = order.clone();
        }
        Ok(())
    }

    async fn list_orders(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Order>, i64)> {
        let inner = self.inner.read().await;
        let mut matching: Vec<&Order> = inner
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .filter(|o| status.map_or(true, |s| o.status == s))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let offset = ((page - 1).max(0) * limit) as usize;
        let orders = matching
            .into_iter()
            .skip(offset)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((orders, total))
    }

    async fn complete_payment(&self, order: &Order, clear_cart: bool) -> Result<()> {
        // One write lock for the whole bundle, mirroring the transactional
        // Postgres implementation.
        let mut inner = self.inner.write().await;

        if let Some(slot) = inner.orders.iter_mut().find(|o| o.id == order.id) {
            *slot = order.clone();
        } else {
            inner.orders.push(order.clone());
        }

        for item in &order.items {
            if let Some(product) = inner.products.iter_mut().find(|p| p.id == item.product_id) {
                product.stock = (product.stock - item.quantity as i32).max(0);
            }
        }

        if clear_cart {
            if let Some(cart) = inner.carts.get_mut(&order.user_id) {
                cart.clear();
            }
        }

        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl ChatHistoryStore for MemoryStore {
    async fn find_history(&self, user_id: Uuid, session_id: &str) -> Result<Option<ChatHistory>> {
        let inner = self.inner.read().await;
        Ok(inner
            .histories
            .get(&(user_id, session_id.to_string()))
            .cloned())
    }

    async fn save_history(&self, history: &ChatHistory) -> Result<()> {
        self.inner
            .write()
            .await
            .histories
            .insert((history.user_id, history.session_id.clone()), history.clone());
        Ok(())
    }
}
