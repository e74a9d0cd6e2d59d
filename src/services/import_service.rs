use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::{
    error::{AppError, Result},
    models::ProductRow,
};

const COL_NAME: &str = "Name";
const COL_PRICE: &str = "Price";
const COL_STOCK: &str = "Stock Quantity";
const COL_DESCRIPTION: &str = "Description";
const COL_IMAGE_URL: &str = "Image URL";

/// Decodes and validates an uploaded .xlsx workbook into product rows.
///
/// This is the pure half of the import: nothing is written anywhere. A
/// structurally unreadable workbook (bad bytes, no sheets, missing `Name` or
/// `Price` header) fails fast with `ImportParse`. Row-level problems are
/// collected across the whole sheet and returned together as `ImportRows`,
/// so the caller sees every failure in one response; a single bad row
/// rejects the entire batch.
pub fn read_products_sheet(data: &[u8]) -> Result<Vec<ProductRow>> {
    let mut workbook = Xlsx::new(Cursor::new(data))
        .map_err(|e| AppError::ImportParse(format!("Failed to read Excel: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::ImportParse("Workbook contains no sheets".to_string()))?
        .map_err(|e| AppError::ImportParse(format!("Failed to read Excel: {}", e)))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| AppError::ImportParse("Sheet is empty".to_string()))?;
    let columns = resolve_columns(header)?;

    let (products, errors) = decode_rows(&columns, rows);

    if !errors.is_empty() {
        return Err(AppError::ImportRows(errors));
    }

    Ok(products)
}

/// Header-derived column positions. Optional columns may be absent entirely.
struct Columns {
    name: usize,
    price: usize,
    stock_quantity: Option<usize>,
    description: Option<usize>,
    image_url: Option<usize>,
}

fn resolve_columns(header: &[Data]) -> Result<Columns> {
    let position = |title: &str| {
        header
            .iter()
            .position(|cell| cell.to_string().trim() == title)
    };

    let name = position(COL_NAME).ok_or_else(|| {
        AppError::ImportParse(format!("Missing required column '{}'", COL_NAME))
    })?;
    let price = position(COL_PRICE).ok_or_else(|| {
        AppError::ImportParse(format!("Missing required column '{}'", COL_PRICE))
    })?;

    Ok(Columns {
        name,
        price,
        stock_quantity: position(COL_STOCK),
        description: position(COL_DESCRIPTION),
        image_url: position(COL_IMAGE_URL),
    })
}

fn decode_rows<'a>(
    columns: &Columns,
    rows: impl Iterator<Item = &'a [Data]>,
) -> (Vec<ProductRow>, Vec<String>) {
    let mut products = Vec::new();
    let mut errors = Vec::new();

    // Reported numbers are 1-indexed plus the header row, matching the
    // numbering a user sees in the spreadsheet itself.
    for (index, cells) in rows.enumerate() {
        let row_number = index + 2;
        match decode_row(columns, cells, row_number) {
            Ok(row) => products.push(row),
            Err(message) => errors.push(message),
        }
    }

    (products, errors)
}

fn decode_row(
    columns: &Columns,
    cells: &[Data],
    row_number: usize,
) -> std::result::Result<ProductRow, String> {
    let name = match cell_text(cells, Some(columns.name)) {
        Some(name) => name,
        None => return Err(format!("Row {}: 'Name' is missing or empty.", row_number)),
    };

    let price_cell = cells.get(columns.price).filter(|cell| !is_blank(cell));
    let price_cell = match price_cell {
        Some(cell) => cell,
        None => {
            return Err(format!(
                "Row {}: 'Price' is missing for product '{}'.",
                row_number, name
            ));
        }
    };
    let price = match cell_decimal(price_cell) {
        Some(price) if price >= Decimal::ZERO => price,
        _ => {
            return Err(format!(
                "Row {}: 'Price' for '{}' ('{}') is not a valid non-negative number.",
                row_number, name, price_cell
            ));
        }
    };

    let stock_cell = columns
        .stock_quantity
        .and_then(|idx| cells.get(idx))
        .filter(|cell| !is_blank(cell));
    let stock_quantity = match stock_cell {
        None => 0,
        Some(cell) => match cell_integer(cell) {
            Some(stock) if stock >= 0 => stock,
            _ => {
                return Err(format!(
                    "Row {}: 'Stock Quantity' for '{}' ('{}') is not a valid integer.",
                    row_number, name, cell
                ));
            }
        },
    };

    Ok(ProductRow {
        name,
        description: cell_text(cells, columns.description),
        price,
        image_url: cell_text(cells, columns.image_url),
        stock_quantity,
    })
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Trimmed text of a cell, None when the column is absent or the cell blank.
fn cell_text(cells: &[Data], index: Option<usize>) -> Option<String> {
    let cell = cells.get(index?)?;
    if is_blank(cell) {
        return None;
    }

    let text = cell.to_string().trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

fn cell_decimal(cell: &Data) -> Option<Decimal> {
    match cell {
        Data::Float(f) => Decimal::from_f64(*f),
        Data::Int(i) => Some(Decimal::from(*i)),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer value of a cell, accepting decimal-formatted integers ("10.0" is
/// 10). Fractional parts truncate toward zero.
fn cell_integer(cell: &Data) -> Option<i32> {
    let value = match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    Some(value as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn columns() -> Columns {
        Columns {
            name: 0,
            price: 1,
            stock_quantity: Some(2),
            description: Some(3),
            image_url: Some(4),
        }
    }

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    #[test]
    fn decodes_a_complete_row() {
        let cells = vec![
            s(" Diamond Sword "),
            Data::Float(10.0),
            s("5.0"),
            s("Sharp."),
            s("http://img/sword.png"),
        ];

        let row = decode_row(&columns(), &cells, 2).unwrap();
        assert_eq!(row.name, "Diamond Sword");
        assert_eq!(row.price, dec!(10));
        assert_eq!(row.stock_quantity, 5);
        assert_eq!(row.description.as_deref(), Some("Sharp."));
        assert_eq!(row.image_url.as_deref(), Some("http://img/sword.png"));
    }

    #[test]
    fn blank_optional_cells_default() {
        let cells = vec![s("Torch"), s("1.25"), Data::Empty, s("  "), Data::Empty];

        let row = decode_row(&columns(), &cells, 2).unwrap();
        assert_eq!(row.price, dec!(1.25));
        assert_eq!(row.stock_quantity, 0);
        assert_eq!(row.description, None);
        assert_eq!(row.image_url, None);
    }

    #[test]
    fn missing_name_is_a_row_error() {
        let cells = vec![s("  "), Data::Float(5.0)];

        let err = decode_row(&columns(), &cells, 3).unwrap_err();
        assert_eq!(err, "Row 3: 'Name' is missing or empty.");
    }

    #[test]
    fn missing_and_invalid_prices_are_row_errors() {
        let missing = vec![s("A"), Data::Empty];
        assert_eq!(
            decode_row(&columns(), &missing, 2).unwrap_err(),
            "Row 2: 'Price' is missing for product 'A'."
        );

        let garbage = vec![s("A"), s("cheap")];
        let err = decode_row(&columns(), &garbage, 2).unwrap_err();
        assert!(err.contains("'Price' for 'A' ('cheap')"));

        let negative = vec![s("A"), Data::Float(-3.0)];
        assert!(decode_row(&columns(), &negative, 2).is_err());
    }

    #[test]
    fn invalid_stock_is_a_row_error() {
        let cells = vec![s("A"), Data::Float(5.0), s("lots")];
        let err = decode_row(&columns(), &cells, 4).unwrap_err();
        assert!(err.starts_with("Row 4: 'Stock Quantity'"));

        let negative = vec![s("A"), Data::Float(5.0), Data::Int(-1)];
        assert!(decode_row(&columns(), &negative, 4).is_err());
    }

    #[test]
    fn one_bad_row_rejects_the_batch_but_all_rows_are_scanned() {
        let rows: Vec<Vec<Data>> = vec![
            vec![s("A"), Data::Float(10.0)],
            vec![s(""), Data::Float(5.0)],
            vec![s("B"), s("free")],
        ];

        let (products, errors) =
            decode_rows(&columns(), rows.iter().map(|r| r.as_slice()));

        // valid rows were decoded, but the caller must discard them
        assert_eq!(products.len(), 1);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], "Row 3: 'Name' is missing or empty.");
        assert!(errors[1].starts_with("Row 4:"));
    }

    #[test]
    fn header_must_contain_name_and_price() {
        let header = vec![s("Name"), s("Stock Quantity")];
        assert!(matches!(
            resolve_columns(&header),
            Err(AppError::ImportParse(_))
        ));

        let full = vec![s("Image URL"), s(" Price "), s("Name")];
        let columns = resolve_columns(&full).unwrap();
        assert_eq!(columns.name, 2);
        assert_eq!(columns.price, 1);
        assert_eq!(columns.image_url, Some(0));
        assert_eq!(columns.stock_quantity, None);
    }

    #[test]
    fn unreadable_bytes_fail_fast() {
        assert!(matches!(
            read_products_sheet(b"not a workbook"),
            Err(AppError::ImportParse(_))
        ));
    }

    #[test]
    fn decimal_formatted_integers_are_accepted() {
        assert_eq!(cell_integer(&s("10.0")), Some(10));
        assert_eq!(cell_integer(&Data::Float(7.0)), Some(7));
        assert_eq!(cell_integer(&Data::Int(3)), Some(3));
        assert_eq!(cell_integer(&s("many")), None);
    }
}
