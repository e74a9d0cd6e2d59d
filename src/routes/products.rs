use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CreateProductRequest, Product, SearchQuery, UpdateProductRequest},
    queries::product_queries,
};

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    if payload.name.trim().is_empty() || payload.price.is_none() {
        return Err(AppError::BadRequest(
            "Missing required fields: name and price".to_string(),
        ));
    }

    validate_price_and_stock(payload.price, payload.stock_quantity)?;

    let product = product_queries::create(&state.db, &payload).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = product_queries::get_all(&state.db).await?;

    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let product = product_queries::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Name and price are required and cannot be empty".to_string(),
            ));
        }
    }

    validate_price_and_stock(payload.price, payload.stock_quantity)?;

    let product = product_queries::update(&state.db, id, payload)
        .await?
        .ok_or(AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let deleted = product_queries::delete(&state.db, id).await?;
    if !deleted {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>> {
    let q = params.q.unwrap_or_default();
    let products = product_queries::search(&state.db, &q).await?;

    Ok(Json(products))
}

fn validate_price_and_stock(price: Option<Decimal>, stock_quantity: Option<i32>) -> Result<()> {
    if let Some(price) = price {
        if price < Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Price must be a non-negative number".to_string(),
            ));
        }
    }

    if let Some(stock) = stock_quantity {
        if stock < 0 {
            return Err(AppError::BadRequest(
                "Stock quantity must be a non-negative integer".to_string(),
            ));
        }
    }

    Ok(())
}
