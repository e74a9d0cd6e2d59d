use axum::{Extension, Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{Cart, CartLine, OrderReceipt, PlaceOrderRequest},
    queries::order_queries,
    session::SessionId,
};

pub async fn place_order(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderReceipt>)> {
    let customer_name = payload.customer_name.trim();
    let customer_email = payload.customer_email.trim();

    if customer_name.is_empty() || customer_email.is_empty() {
        return Err(AppError::BadRequest(
            "Missing customer name or email".to_string(),
        ));
    }

    if !customer_email.contains('@') {
        return Err(AppError::BadRequest("Invalid customer email".to_string()));
    }

    let cart = state.carts.get(session).await;
    if cart.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let total_amount = order_total(&cart)?;
    let lines: Vec<CartLine> = cart.lines().cloned().collect();

    let order = order_queries::create_order_with_items(
        &state.db,
        customer_name,
        customer_email,
        total_amount,
        &lines,
    )
    .await?;

    // The cart survives any failure above; it is only dropped once the
    // order has committed.
    state.carts.clear(session).await;

    tracing::info!(
        "Order {} placed: {} line(s), total {}",
        order.id,
        lines.len(),
        order.total_amount
    );

    Ok((
        StatusCode::CREATED,
        Json(OrderReceipt {
            order_id: order.id,
            customer_name: order.customer_name,
            total_amount: order.total_amount,
        }),
    ))
}

/// Validates every line and computes the order total, rounded to 2 decimals.
/// Bad line data fails the whole order; there is no partial placement.
fn order_total(cart: &Cart) -> Result<Decimal> {
    let mut total = Decimal::ZERO;

    for line in cart.lines() {
        if line.price < Decimal::ZERO || line.quantity < 0 {
            return Err(AppError::InvalidCartData(format!(
                "Invalid price or quantity for item {}.",
                line.id
            )));
        }
        total += line.price * Decimal::from(line.quantity);
    }

    Ok(total.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use chrono::Utc;
    use rust_decimal::dec;

    fn product(id: i32, price: Decimal) -> Product {
        Product {
            id,
            name: format!("product-{}", id),
            description: None,
            price,
            image_url: None,
            stock_quantity: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn order_total_matches_cart_total() {
        let mut cart = Cart::default();
        cart.add_line(&product(1, dec!(10.99)), 3);
        cart.add_line(&product(2, dec!(0.45)), 2);

        let total = order_total(&cart).unwrap();
        assert_eq!(total, cart.state().total_price);
        assert_eq!(total, dec!(33.87));
    }

    #[test]
    fn negative_line_price_fails_the_order() {
        let mut cart = Cart::default();
        cart.add_line(&product(9, dec!(-1)), 1);

        assert!(matches!(
            order_total(&cart),
            Err(AppError::InvalidCartData(_))
        ));
    }

    #[test]
    fn empty_cart_totals_to_zero() {
        assert_eq!(order_total(&Cart::default()).unwrap(), Decimal::ZERO);
    }
}
