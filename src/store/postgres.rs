use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Cart, ChatHistory, Order, OrderStatus, Product, User};

use super::{CartStore, CatalogStore, ChatHistoryStore, OrderStore, ProductFilter, UserStore};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

const ADJUST_STOCK_SQL: &str = "UPDATE products SET data = jsonb_set(data, '{stock}', \
     to_jsonb(GREATEST((data->>'stock')::int + $2, 0))) WHERE id = $1";

const CLEAR_CART_SQL: &str =
    r#"UPDATE carts SET data = data || '{"items": [], "totalAmount": 0}'::jsonb WHERE user_id = $1"#;

/// Postgres-backed document store: one JSONB `data` column per aggregate plus
/// the key columns the uniqueness constraints need.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(PgStore { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    async fn find_product_where(&self, predicate: &str, term: &str) -> Result<Option<Product>> {
        let sql = format!("SELECT data FROM products WHERE {predicate} LIMIT 1");
        let row: Option<Json<Product>> = sqlx::query_scalar(&sql)
            .bind(format!("%{term}%"))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|Json(product)| product))
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
        let row: Option<Json<Product>> =
            sqlx::query_scalar("SELECT data FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(product)| product))
    }

    async fn search_products(&self, filter: &ProductFilter, limit: i64) -> Result<Vec<Product>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT data FROM products WHERE 1=1");

        if let Some(category) = &filter.category {
            qb.push(" AND data->>'category' ILIKE ");
            qb.push_bind(format!("%{category}%"));
        }
        if let Some(term) = &filter.name_or_brand {
            qb.push(" AND (data->>'name' ILIKE ");
            qb.push_bind(format!("%{term}%"));
            qb.push(" OR data->>'brand' ILIKE ");
            qb.push_bind(format!("%{term}%"));
            qb.push(")");
        }
        if let Some(color) = &filter.color {
            qb.push(
                " AND EXISTS (SELECT 1 FROM jsonb_array_elements_text(data->'colors') AS c \
                 WHERE c ILIKE ",
            );
            qb.push_bind(format!("%{color}%"));
            qb.push(")");
        }
        qb.push(" LIMIT ");
        qb.push_bind(limit);

        let rows: Vec<Json<Product>> = qb.build_query_scalar().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|Json(product)| product).collect())
    }

    async fn find_product_by_name(&self, term: &str) -> Result<Option<Product>> {
        self.find_product_where("data->>'name' ILIKE $1", term).await
    }

    async fn find_product_by_brand(&self, term: &str) -> Result<Option<Product>> {
        self.find_product_where("data->>'brand' ILIKE $1", term).await
    }

    async fn find_product_by_description(&self, term: &str) -> Result<Option<Product>> {
        self.find_product_where("data->>'description' ILIKE $1", term)
            .await
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<()> {
        sqlx::query(ADJUST_STOCK_SQL)
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn find_cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
        let row: Option<Json<Cart>> =
            sqlx::query_scalar("SELECT data FROM carts WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(cart)| cart))
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        sqlx::query(
            "INSERT INTO carts (user_id, data) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET data = EXCLUDED.data",
        )
        .bind(cart.user_id)
        .bind(Json(cart))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            "INSERT INTO orders (id, user_id, order_number, payment_id, status, created_at, data) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(&order.order_number)
        .bind(order.payment_info.bkash_payment_id.as_deref())
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(Json(order))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
        let row: Option<Json<Order>> = sqlx::query_scalar("SELECT data FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|Json(order)| order))
    }

    async fn find_order_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>> {
        let row: Option<Json<Order>> =
            sqlx::query_scalar("SELECT data FROM orders WHERE payment_id = $1")
                .bind(payment_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(order)| order))
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        sqlx::query("UPDATE orders SET data = $2, status = $3, payment_id = $4 WHERE id = $1")
            .bind(order.id)
            .bind(Json(order))
            .bind(order.status.as_str())
            .bind(order.payment_info.bkash_payment_id.as_deref())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_orders(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Order>, i64)> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT data FROM orders WHERE user_id = ");
        qb.push_bind(user_id);
        if let Some(status) = status {
            qb.push(" AND status = ");
            qb.push_bind(status.as_str());
        }
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind((page - 1).max(0) * limit);

        let rows: Vec<Json<Order>> = qb.build_query_scalar().fetch_all(&self.pool).await?;

        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM orders WHERE user_id = ");
        count_qb.push_bind(user_id);
        if let Some(status) = status {
            count_qb.push(" AND status = ");
            count_qb.push_bind(status.as_str());
        }
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((rows.into_iter().map(|Json(order)| order).collect(), total))
    }

    async fn complete_payment(&self, order: &Order, clear_cart: bool) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE orders SET data = $2, status = $3, payment_id = $4 WHERE id = $1")
            .bind(order.id)
            .bind(Json(order))
            .bind(order.status.as_str())
            .bind(order.payment_info.bkash_payment_id.as_deref())
            .execute(&mut *tx)
            .await?;

        for item in &order.items {
            sqlx::query(ADJUST_STOCK_SQL)
                .bind(item.product_id)
                .bind(-(item.quantity as i32))
                .execute(&mut *tx)
                .await?;
        }

        if clear_cart {
            sqlx::query(CLEAR_CART_SQL)
                .bind(order.user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let row: Option<Json<User>> = sqlx::query_scalar("SELECT data FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|Json(user)| user))
    }
}

#[async_trait]
impl ChatHistoryStore for PgStore {
    async fn find_history(&self, user_id: Uuid, session_id: &str) -> Result<Option<ChatHistory>> {
        let row: Option<Json<ChatHistory>> = sqlx::query_scalar(
            "SELECT data FROM chat_histories WHERE user_id = $1 AND session_id = $2",
        )
        .bind(user_id)
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|Json(history)| history))
    }

    async fn save_history(&self, history: &ChatHistory) -> Result<()> {
        sqlx::query(
            "INSERT INTO chat_histories (user_id, session_id, data) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, session_id) DO UPDATE SET data = EXCLUDED.data",
        )
        .bind(history.user_id)
        .bind(&history.session_id)
        .bind(Json(history))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
