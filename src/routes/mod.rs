use actix_web::{get, web, HttpResponse, Responder};

pub mod cart;
pub mod chat;
pub mod checkout;
pub mod orders;
pub mod payment;

use crate::types::ApiResponse;

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::<()>::message("ok"))
}

/// Registers every API route. Mounted under `/api` by the server.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(chat::chat)
        .service(cart::get_cart)
        .service(cart::add_to_cart)
        .service(cart::update_cart)
        .service(cart::clear_cart)
        .service(cart::remove_from_cart)
        .service(checkout::checkout)
        .service(payment::verify_payment)
        .service(payment::payment_webhook)
        .service(payment::payment_callback)
        .service(orders::list_orders)
        .service(orders::get_order)
        .service(orders::update_order)
        .service(orders::confirm_payment);
}
