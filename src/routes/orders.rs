use std::sync::Arc;

use actix_web::{get, patch, post, web, HttpResponse};
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{Order, PaymentMethod, PaymentStatus};
use crate::types::order::OrderAction;
use crate::types::{ApiResponse, OrdersPage, OrdersQuery, UpdateOrderRequest};
use crate::AppState;

#[get("/orders")]
pub async fn list_orders(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    query: web::Query<OrdersQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 50);

    let (orders, total) = state
        .store
        .list_orders(user.user_id, query.status, page, limit)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(OrdersPage::new(orders, total, page, limit))))
}

async fn owned_order(
    state: &AppState,
    user: AuthenticatedUser,
    order_id: Uuid,
) -> Result<Order, ApiError> {
    state
        .store
        .find_order(order_id)
        .await?
        .filter(|o| o.user_id == user.user_id)
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))
}

#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let order = owned_order(&state, user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(order)))
}

#[patch("/orders/{id}")]
pub async fn update_order(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let mut order = owned_order(&state, user, path.into_inner()).await?;

    if !order.can_cancel() {
        return Err(ApiError::Validation(
            "Order cannot be cancelled at this stage".to_string(),
        ));
    }

    match body.action {
        OrderAction::CancelOrder => {
            let paid = order.payment_status == PaymentStatus::Completed;
            let refund_amount = order.total_amount;
            order.cancel();

            if paid {
                // Put every item's stock back; the decrement ran at payment
                // completion.
                for item in &order.items {
                    state
                        .store
                        .adjust_stock(item.product_id, item.quantity as i32)
                        .await?;
                }

                if order.payment_info.method == PaymentMethod::Bkash {
                    try_refund(&state, &mut order, refund_amount).await;
                }
            }

            state.store.update_order(&order).await?;
            Ok(HttpResponse::Ok().json(ApiResponse::ok_msg(order, "Order cancelled successfully")))
        }
        OrderAction::CancelItem => {
            let item_id = body
                .item_id
                .ok_or_else(|| ApiError::Validation("itemId is required".to_string()))?;

            let removed = order
                .cancel_item(item_id)
                .ok_or_else(|| ApiError::NotFound("Item not found in this order".to_string()))?;

            if order.payment_status == PaymentStatus::Completed {
                state
                    .store
                    .adjust_stock(removed.product_id, removed.quantity as i32)
                    .await?;
            }

            state.store.update_order(&order).await?;
            Ok(HttpResponse::Ok().json(ApiResponse::ok_msg(order, "Item cancelled successfully")))
        }
    }
}

/// Full-order refund on a best-effort basis. A gateway failure leaves the
/// payment marked completed for manual follow-up; the cancellation itself
/// still goes through.
async fn try_refund(state: &AppState, order: &mut Order, amount: f64) {
    let (payment_id, trx_id) = match (
        order.payment_info.bkash_payment_id.as_deref(),
        order.payment_info.bkash_transaction_id.as_deref(),
    ) {
        (Some(p), Some(t)) => (p.to_string(), t.to_string()),
        _ => {
            warn!("Order {} has no refundable payment ids", order.order_number);
            return;
        }
    };

    match state
        .gateway
        .refund_payment(&payment_id, &trx_id, amount, "Order cancelled")
        .await
    {
        Ok(_) => {
            order.payment_status = PaymentStatus::Refunded;
        }
        Err(e) => {
            error!("Refund failed for order {}: {:?}", order.order_number, e);
        }
    }
}

/// Manual confirmation for cash-on-delivery orders. Runs the same payment
/// completion bundle as a gateway webhook would.
#[post("/orders/{id}/confirm-payment")]
pub async fn confirm_payment(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let mut order = owned_order(&state, user, path.into_inner()).await?;

    if order.payment_info.method != PaymentMethod::Cash {
        return Err(ApiError::Validation(
            "Only cash on delivery orders can be confirmed manually".to_string(),
        ));
    }
    if order.payment_status == PaymentStatus::Completed {
        return Err(ApiError::Conflict("Payment already completed".to_string()));
    }

    order.mark_paid(None);
    state.store.complete_payment(&order, false).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_msg(order, "Payment confirmed")))
}
