use axum::{Json, extract::Multipart, extract::State};

use crate::{
    AppState,
    error::{AppError, Result},
    models::ImportReport,
    queries::product_queries,
    services::import_service,
};

const UPLOAD_FIELD: &str = "excel_file";

/// Bulk product import. Decode and validation happen entirely in memory
/// first; the database is only touched when every row passed, and then in a
/// single all-or-nothing transaction.
pub async fn upload_products_excel(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
            upload = Some((filename, data.to_vec()));
            break;
        }
    }

    let (filename, data) =
        upload.ok_or(AppError::BadRequest("No excel_file part".to_string()))?;

    if filename.is_empty() {
        return Err(AppError::BadRequest("No selected file".to_string()));
    }

    if !filename.to_ascii_lowercase().ends_with(".xlsx") {
        return Err(AppError::BadRequest(
            "File type not allowed or missing. Only .xlsx is accepted.".to_string(),
        ));
    }

    let rows = import_service::read_products_sheet(&data)?;
    let report = product_queries::apply_import(&state.db, &rows).await?;

    tracing::info!(
        "Spreadsheet import committed: {} added, {} updated",
        report.added,
        report.updated
    );

    Ok(Json(report))
}
