use std::sync::Arc;

use actix_web::http::header;
use actix_web::{get, post, web, HttpResponse};
use tracing::{error, info};

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::PaymentStatus;
use crate::types::{ApiResponse, VerifyPaymentData, VerifyPaymentRequest, WebhookQuery};
use crate::AppState;

fn redirect(url: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, url))
        .finish()
}

fn failed_redirect(frontend_url: &str, code: &str) -> HttpResponse {
    redirect(format!("{frontend_url}/payment/failed?error={code}"))
}

/// Client-initiated verification: asks the gateway for the payment status
/// and, on completion, applies the full payment bundle (order, stock, cart).
#[post("/payment/verify")]
pub async fn verify_payment(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let order = if let Some(payment_id) = body.payment_id.as_deref().filter(|p| !p.is_empty()) {
        state.store.find_order_by_payment_id(payment_id).await?
    } else if let Some(order_id) = body.order_id {
        state.store.find_order(order_id).await?
    } else {
        return Err(ApiError::Validation(
            "paymentID or orderId is required".to_string(),
        ));
    };

    let mut order = order
        .filter(|o| o.user_id == user.user_id)
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    if order.payment_status == PaymentStatus::Completed {
        return Ok(HttpResponse::Ok().json(ApiResponse::ok_msg(
            VerifyPaymentData {
                payment_status: order.payment_status,
                transaction_id: order.payment_info.bkash_transaction_id.clone(),
            },
            "Payment already verified",
        )));
    }

    let payment_id = order
        .payment_info
        .bkash_payment_id
        .clone()
        .ok_or_else(|| ApiError::Validation("Order has no gateway payment".to_string()))?;

    let result = state.gateway.query_payment(&payment_id).await.map_err(|e| {
        error!("Payment status query failed: {:?}", e);
        ApiError::Gateway("Failed to verify payment. Please try again.".to_string())
    })?;

    if result.is_completed() {
        order.mark_paid(result.trx_id);
        state.store.complete_payment(&order, true).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::ok_msg(
            VerifyPaymentData {
                payment_status: order.payment_status,
                transaction_id: order.payment_info.bkash_transaction_id.clone(),
            },
            "Payment verified successfully",
        )))
    } else {
        Err(ApiError::Validation("Payment not completed".to_string()))
    }
}

/// Server-to-server callback from the gateway. Unauthenticated; trust comes
/// from executing the payment against the gateway, not from the caller.
#[post("/payment/webhook")]
pub async fn payment_webhook(
    state: web::Data<Arc<AppState>>,
    body: web::Json<WebhookQuery>,
) -> Result<HttpResponse, ApiError> {
    let payload = body.into_inner();

    let payment_id = payload
        .payment_id
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("Missing payment ID".to_string()))?;

    let mut order = state
        .store
        .find_order_by_payment_id(&payment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    if order.payment_status == PaymentStatus::Completed {
        return Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Payment already completed")));
    }

    match payload.status.as_deref() {
        Some("success") => match state.gateway.execute_payment(&payment_id).await {
            Ok(result) if result.is_completed() => {
                info!("Payment {} completed for order {}", payment_id, order.order_number);
                order.mark_paid(result.trx_id);
                state.store.complete_payment(&order, true).await?;
                Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Payment completed")))
            }
            Ok(_) => {
                order.mark_payment_failed();
                state.store.update_order(&order).await?;
                Err(ApiError::Gateway("Payment execution failed".to_string()))
            }
            Err(e) => {
                error!("Payment execution failed: {:?}", e);
                order.mark_payment_failed();
                state.store.update_order(&order).await?;
                Err(ApiError::Gateway("Payment execution failed".to_string()))
            }
        },
        _ => {
            order.mark_payment_failed();
            state.store.update_order(&order).await?;
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Payment status recorded")))
        }
    }
}

/// Browser redirect from the gateway checkout page. Always answers with a
/// redirect to the storefront, never a JSON error.
#[get("/payment/webhook")]
pub async fn payment_callback(
    state: web::Data<Arc<AppState>>,
    query: web::Query<WebhookQuery>,
) -> HttpResponse {
    match handle_callback(&state, query.into_inner()).await {
        Ok(response) => response,
        Err(e) => {
            error!("Payment callback error: {:?}", e);
            failed_redirect(&state.config.frontend_url, "callback-error")
        }
    }
}

async fn handle_callback(state: &AppState, query: WebhookQuery) -> anyhow::Result<HttpResponse> {
    let frontend_url = &state.config.frontend_url;

    let payment_id = match query.payment_id.filter(|p| !p.is_empty()) {
        Some(payment_id) => payment_id,
        None => return Ok(failed_redirect(frontend_url, "missing-payment-id")),
    };

    let mut order = match state.store.find_order_by_payment_id(&payment_id).await? {
        Some(order) => order,
        None => return Ok(failed_redirect(frontend_url, "order-not-found")),
    };

    match query.status.as_deref() {
        Some("success") => match state.gateway.execute_payment(&payment_id).await {
            Ok(result) if result.is_completed() => {
                let transaction_id = result.trx_id.clone().unwrap_or_default();
                order.mark_paid(result.trx_id);
                state.store.complete_payment(&order, true).await?;
                Ok(redirect(format!(
                    "{frontend_url}/payment/success?orderId={}&transactionId={transaction_id}",
                    order.id
                )))
            }
            Ok(_) => {
                order.mark_payment_failed();
                state.store.update_order(&order).await?;
                Ok(failed_redirect(frontend_url, "execution-failed"))
            }
            Err(e) => {
                error!("Payment execution failed: {:?}", e);
                order.mark_payment_failed();
                state.store.update_order(&order).await?;
                Ok(failed_redirect(frontend_url, "execution-error"))
            }
        },
        _ => {
            order.mark_payment_failed();
            state.store.update_order(&order).await?;
            Ok(failed_redirect(frontend_url, "payment-cancelled"))
        }
    }
}
