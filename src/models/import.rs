use rust_decimal::Decimal;
use serde::Serialize;

/// One validated spreadsheet row, ready to be upserted by name.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
}

// Response types

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub added: u32,
    pub updated: u32,
}
