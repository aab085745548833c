use serde::{Deserialize, Serialize};

use crate::models::{Order, OrderStatus};

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_orders: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrdersPage {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
}

impl OrdersPage {
    pub fn new(orders: Vec<Order>, total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        OrdersPage {
            orders,
            pagination: Pagination {
                current_page: page,
                total_pages,
                total_orders: total,
                has_next_page: page < total_pages,
                has_prev_page: page > 1,
            },
        }
    }
}

/// PATCH body for an order. Cancellation is the only supported action.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub action: OrderAction,
    #[serde(default)]
    pub item_id: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    CancelOrder,
    CancelItem,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_math() {
        let page = OrdersPage::new(Vec::new(), 25, 2, 10);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next_page);
        assert!(page.pagination.has_prev_page);

        let last = OrdersPage::new(Vec::new(), 25, 3, 10);
        assert!(!last.pagination.has_next_page);

        let empty = OrdersPage::new(Vec::new(), 0, 1, 10);
        assert_eq!(empty.pagination.total_pages, 0);
        assert!(!empty.pagination.has_next_page);
        assert!(!empty.pagination.has_prev_page);
    }
}
