use std::sync::Arc;

use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::cart::MAX_QUANTITY_PER_LINE;
use crate::models::Cart;
use crate::store::Store;
use crate::types::{
    ApiResponse, CartAddRequest, CartItemView, CartRemoveRequest, CartUpdateRequest, CartView,
    ProductSummary,
};
use crate::AppState;

async fn cart_view(store: &dyn Store, cart: &Cart) -> Result<CartView, ApiError> {
    let mut items = Vec::with_capacity(cart.items.len());
    for item in &cart.items {
        let product = store.find_product(item.product_id).await?;
        items.push(CartItemView {
            product: product.as_ref().map(ProductSummary::from),
            product_id: item.product_id,
            quantity: item.quantity,
            size: item.size.clone(),
            color: item.color.clone(),
            price: item.price,
        });
    }
    Ok(CartView {
        id: cart.id,
        items,
        total_amount: cart.total_amount,
        updated_at: cart.updated_at,
    })
}

#[get("/cart")]
pub async fn get_cart(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let cart = state
        .store
        .find_cart(user.user_id)
        .await?
        .unwrap_or_else(|| Cart::new(user.user_id));

    let view = cart_view(state.store.as_ref(), &cart).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(view)))
}

#[post("/cart")]
pub async fn add_to_cart(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    body: web::Json<CartAddRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    if body.quantity < 1 || body.quantity > MAX_QUANTITY_PER_LINE {
        return Err(ApiError::Validation(
            "Quantity must be between 1 and 10".to_string(),
        ));
    }

    let product = state
        .store
        .find_product(body.product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    if product.stock < body.quantity as i32 {
        return Err(ApiError::Validation("Insufficient stock".to_string()));
    }
    if !product.has_size(&body.size) {
        return Err(ApiError::Validation(
            "Invalid size for this product".to_string(),
        ));
    }
    if !product.has_exact_color(&body.color) {
        return Err(ApiError::Validation(
            "Invalid color for this product".to_string(),
        ));
    }

    let mut cart = state
        .store
        .find_cart(user.user_id)
        .await?
        .unwrap_or_else(|| Cart::new(user.user_id));
    cart.add_item(
        product.id,
        body.quantity,
        &body.size,
        &body.color,
        product.price,
    );
    state.store.save_cart(&cart).await?;

    let view = cart_view(state.store.as_ref(), &cart).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_msg(view, "Item added to cart")))
}

#[put("/cart")]
pub async fn update_cart(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    body: web::Json<CartUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    if body.quantity > MAX_QUANTITY_PER_LINE as i64 {
        return Err(ApiError::Validation(
            "Quantity must be between 1 and 10".to_string(),
        ));
    }

    let mut cart = state
        .store
        .find_cart(user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".to_string()))?;

    cart.update_quantity(body.product_id, &body.size, &body.color, body.quantity);
    state.store.save_cart(&cart).await?;

    let view = cart_view(state.store.as_ref(), &cart).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_msg(view, "Cart updated")))
}

#[delete("/cart")]
pub async fn clear_cart(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let mut cart = state
        .store
        .find_cart(user.user_id)
        .await?
        .unwrap_or_else(|| Cart::new(user.user_id));

    cart.clear();
    state.store.save_cart(&cart).await?;

    let view = cart_view(state.store.as_ref(), &cart).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_msg(view, "Cart cleared")))
}

#[delete("/cart/remove")]
pub async fn remove_from_cart(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    body: web::Json<CartRemoveRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let mut cart = state
        .store
        .find_cart(user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".to_string()))?;

    cart.remove_item(body.product_id, &body.size, &body.color);
    state.store.save_cart(&cart).await?;

    let view = cart_view(state.store.as_ref(), &cart).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_msg(view, "Item removed from cart")))
}
