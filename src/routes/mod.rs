mod cart;
mod checkout;
mod health;
mod import;
mod products;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::{AppState, middleware::session_middleware};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route(
            "/api/products",
            post(products::create_product).get(products::list_products),
        )
        .route("/api/products/search", get(products::search_products))
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/api/upload_products_excel",
            post(import::upload_products_excel),
        )
        .route("/api/cart/add", post(cart::add_to_cart))
        .route("/api/cart", get(cart::view_cart))
        .route("/api/cart/update/{product_id}", put(cart::update_cart_item))
        .route(
            "/api/cart/remove/{product_id}",
            delete(cart::remove_from_cart),
        )
        .route("/api/cart/clear", post(cart::clear_cart))
        .route("/api/checkout/place_order", post(checkout::place_order))
        .layer(middleware::from_fn(session_middleware))
}
