use std::sync::Arc;

use actix_web::{post, web, HttpResponse};
use tracing::error;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{Order, OrderItem, PaymentMethod};
use crate::types::{ApiResponse, CheckoutData, CheckoutRequest};
use crate::AppState;

#[post("/checkout")]
pub async fn checkout(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    if !body.shipping_address.is_complete() {
        return Err(ApiError::Validation(
            "Complete shipping address is required".to_string(),
        ));
    }

    let cart = state
        .store
        .find_cart(user.user_id)
        .await?
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation("Cart is empty".to_string()))?;

    // Validate stock up front; nothing is decremented until payment completes.
    let mut items = Vec::with_capacity(cart.items.len());
    for item in &cart.items {
        let product = state
            .store
            .find_product(item.product_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;
        if product.stock < item.quantity as i32 {
            return Err(ApiError::Validation(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }
        items.push(OrderItem::new(
            product.id,
            &product.name,
            Some(&product.brand),
            item.quantity,
            &item.size,
            &item.color,
            item.price,
        ));
    }

    let mut shipping = body.shipping_address;
    if shipping.country.trim().is_empty() {
        shipping.country = "Bangladesh".to_string();
    }

    let mut order = Order::new(
        user.user_id,
        items,
        cart.total_amount,
        shipping,
        body.payment_method,
    );

    match body.payment_method {
        PaymentMethod::Cash => {
            state.store.insert_order(&order).await?;

            let mut cart = cart;
            cart.clear();
            state.store.save_cart(&cart).await?;

            Ok(HttpResponse::Ok().json(ApiResponse::ok_msg(
                CheckoutData {
                    order_id: order.id,
                    order_number: order.order_number.clone(),
                    total_amount: order.total_amount,
                    payment_url: None,
                    payment_id: None,
                },
                "Order placed successfully",
            )))
        }
        PaymentMethod::Bkash => {
            state.store.insert_order(&order).await?;

            let phone = body
                .customer_phone
                .or_else(|| order.shipping_address.phone.clone())
                .unwrap_or_else(|| "01700000000".to_string());

            match state
                .gateway
                .create_payment(order.total_amount, &order.order_number, &phone)
                .await
            {
                Ok(payment) => {
                    order.payment_info.bkash_payment_id = Some(payment.payment_id.clone());
                    state.store.update_order(&order).await?;

                    Ok(HttpResponse::Ok().json(ApiResponse::ok_msg(
                        CheckoutData {
                            order_id: order.id,
                            order_number: order.order_number.clone(),
                            total_amount: order.total_amount,
                            payment_url: Some(payment.bkash_url),
                            payment_id: Some(payment.payment_id),
                        },
                        "Payment initiated",
                    )))
                }
                Err(e) => {
                    error!("bKash payment initiation failed: {:?}", e);
                    order.mark_payment_failed();
                    state.store.update_order(&order).await?;
                    Err(ApiError::Gateway(
                        "Failed to initiate bKash payment. Please try again.".to_string(),
                    ))
                }
            }
        }
        PaymentMethod::Card => Err(ApiError::Validation(
            "Payment method not supported yet".to_string(),
        )),
    }
}
