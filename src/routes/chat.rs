use std::sync::Arc;

use actix_web::{post, web, HttpResponse};

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::types::{ApiResponse, ChatRequest, ChatResponse};
use crate::AppState;

#[post("/chat")]
pub async fn chat(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::Validation("Message is required".to_string()));
    }

    let (reply, session_id) = state
        .dispatcher
        .handle_turn(user.user_id, message, body.session_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ChatResponse {
        response: reply.response,
        intent: reply.intent.as_str().to_string(),
        entities: reply.entities,
        products: reply.products,
        cart_updated: reply.cart_updated,
        session_id,
    })))
}
