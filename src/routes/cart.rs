use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{AddToCartRequest, Cart, CartState, UpdateCartItemRequest},
    queries::product_queries,
    session::SessionId,
};

pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Json<CartState>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest("Quantity must be positive".to_string()));
    }

    let product = product_queries::find_by_id(&state.db, payload.product_id)
        .await?
        .ok_or(AppError::NotFound("Product not found".to_string()))?;

    let mut cart = state.carts.get(session).await;
    cart.add_line(&product, payload.quantity);
    let response = cart.state();
    state.carts.put(session, cart).await;

    Ok(Json(response))
}

pub async fn view_cart(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Json<CartState> {
    Json(state.carts.get(session).await.state())
}

pub async fn update_cart_item(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Path(product_id): Path<String>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<Json<CartState>> {
    let mut cart = state.carts.get(session).await;

    // quantity <= 0 removes the line, which still counts as a hit
    if !cart.set_quantity(&product_id, payload.quantity) {
        return Err(AppError::NotFound("Item not found in cart".to_string()));
    }

    let response = cart.state();
    state.carts.put(session, cart).await;

    Ok(Json(response))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Path(product_id): Path<String>,
) -> Result<Json<CartState>> {
    let mut cart = state.carts.get(session).await;

    if !cart.remove_line(&product_id) {
        return Err(AppError::NotFound("Item not found in cart".to_string()));
    }

    let response = cart.state();
    state.carts.put(session, cart).await;

    Ok(Json(response))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Json<CartState> {
    state.carts.clear(session).await;

    Json(Cart::default().state())
}
