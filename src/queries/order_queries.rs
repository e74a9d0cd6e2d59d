use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    error::Result,
    models::{CartLine, Order},
};

/// Inserts the order and all of its items in one transaction. No order row
/// exists without its items and vice versa; any failure rolls both back.
pub async fn create_order_with_items(
    pool: &PgPool,
    customer_name: &str,
    customer_email: &str,
    total_amount: Decimal,
    lines: &[CartLine],
) -> Result<Order> {
    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (customer_name, customer_email, total_amount)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(customer_name)
    .bind(customer_email)
    .bind(total_amount)
    .fetch_one(&mut *tx)
    .await?;

    let product_ids: Vec<i32> = lines.iter().map(|l| l.id).collect();
    let quantities: Vec<i32> = lines.iter().map(|l| l.quantity).collect();
    let prices: Vec<Decimal> = lines.iter().map(|l| l.price).collect();

    sqlx::query(
        "INSERT INTO order_items (order_id, product_id, quantity, price_per_item)
         SELECT $1, unnest($2::int[]), unnest($3::int[]), unnest($4::decimal[])",
    )
    .bind(order.id)
    .bind(&product_ids)
    .bind(&quantities)
    .bind(&prices)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(order)
}
