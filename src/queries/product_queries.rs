use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::Result,
    models::{CreateProductRequest, ImportReport, Product, ProductRow, UpdateProductRequest},
};

pub async fn create(pool: &PgPool, req: &CreateProductRequest) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (name, description, price, image_url, stock_quantity)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(req.name.trim())
    .bind(&req.description)
    .bind(req.price)
    .bind(&req.image_url)
    .bind(req.stock_quantity.unwrap_or(0))
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

/// Exact match on the trimmed name. Used by the importer for its upsert
/// decision; name is a soft uniqueness key, not enforced by the schema.
pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE name = $1")
        .bind(name.trim())
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn get_all(pool: &PgPool) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(products)
}

/// Partial update: only provided fields are written, the rest keep their
/// stored values. Returns None when no product exists for `id`.
pub async fn update(
    pool: &PgPool,
    id: i32,
    req: UpdateProductRequest,
) -> Result<Option<Product>> {
    let mut query_builder = QueryBuilder::<Postgres>::new("UPDATE products SET ");
    let mut has_fields = false;

    if let Some(name) = req.name {
        query_builder.push("name = ");
        query_builder.push_bind(name.trim().to_string());
        has_fields = true;
    }

    if let Some(description) = req.description {
        if has_fields {
            query_builder.push(", ");
        }
        query_builder.push("description = ");
        query_builder.push_bind(description);
        has_fields = true;
    }

    if let Some(price) = req.price {
        if has_fields {
            query_builder.push(", ");
        }
        query_builder.push("price = ");
        query_builder.push_bind(price);
        has_fields = true;
    }

    if let Some(image_url) = req.image_url {
        if has_fields {
            query_builder.push(", ");
        }
        query_builder.push("image_url = ");
        query_builder.push_bind(image_url);
        has_fields = true;
    }

    if let Some(stock_quantity) = req.stock_quantity {
        if has_fields {
            query_builder.push(", ");
        }
        query_builder.push("stock_quantity = ");
        query_builder.push_bind(stock_quantity);
        has_fields = true;
    }

    if !has_fields {
        // No fields to update, return existing product
        return find_by_id(pool, id).await;
    }

    query_builder.push(", updated_at = NOW() WHERE id = ");
    query_builder.push_bind(id);
    query_builder.push(" RETURNING *");

    let product = query_builder
        .build_query_as::<Product>()
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

/// No referential guard: deleting a product referenced by order items
/// succeeds and leaves those items pointing at a gone product.
pub async fn delete(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Case-insensitive substring match against name or description. An empty or
/// whitespace-only query yields the pattern `%%`, which matches every row —
/// searching with no query returns the full catalog.
pub async fn search(pool: &PgPool, q: &str) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE name ILIKE $1 OR description ILIKE $1 ORDER BY id",
    )
    .bind(like_pattern(q))
    .fetch_all(pool)
    .await?;

    Ok(products)
}

fn like_pattern(q: &str) -> String {
    format!("%{}%", q.trim())
}

/// Commits a validated import batch in one transaction: rows are upserted by
/// exact name, and added/updated are counted separately. Any failure rolls
/// the whole batch back.
///
/// Duplicate names inside one sheet resolve in row order: a later row sees
/// the earlier row's uncommitted insert on the same connection and updates it.
pub async fn apply_import(pool: &PgPool, rows: &[ProductRow]) -> Result<ImportReport> {
    let mut tx = pool.begin().await?;

    let mut added = 0u32;
    let mut updated = 0u32;

    for row in rows {
        let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM products WHERE name = $1")
            .bind(&row.name)
            .fetch_optional(&mut *tx)
            .await?;

        match existing {
            Some(id) => {
                sqlx::query(
                    "UPDATE products
                     SET description = $1, price = $2, image_url = $3, stock_quantity = $4,
                         updated_at = NOW()
                     WHERE id = $5",
                )
                .bind(&row.description)
                .bind(row.price)
                .bind(&row.image_url)
                .bind(row.stock_quantity)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                updated += 1;
            }
            None => {
                sqlx::query(
                    "INSERT INTO products (name, description, price, image_url, stock_quantity)
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(&row.name)
                .bind(&row.description)
                .bind(row.price)
                .bind(&row.image_url)
                .bind(row.stock_quantity)
                .execute(&mut *tx)
                .await?;
                added += 1;
            }
        }
    }

    tx.commit().await?;

    Ok(ImportReport { added, updated })
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn empty_query_matches_everything() {
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern("   "), "%%");
    }

    #[test]
    fn query_is_trimmed_into_the_pattern() {
        assert_eq!(like_pattern(" sword "), "%sword%");
    }
}
