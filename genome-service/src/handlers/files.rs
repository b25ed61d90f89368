use crate::dtos::FileEntry;
use crate::services::files::content_type_for;
use crate::startup::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;
use tokio_util::io::ReaderStream;

#[tracing::instrument(skip(state))]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileEntry>>, AppError> {
    let names = state.files.list().await.map_err(|e| {
        tracing::error!("Failed to list download directory: {}", e);
        e
    })?;

    Ok(Json(names.into_iter().map(FileEntry::new).collect()))
}

/// Stream one file of the download directory as an attachment.
#[tracing::instrument(skip(state))]
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let stored = state.files.open(&filename).await?;

    tracing::info!(file = %stored.name, size = stored.size, "File download started");

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&stored.name).to_string()),
        (header::CONTENT_DISPOSITION, attachment_disposition(&stored.name)),
        (header::CONTENT_LENGTH, stored.size.to_string()),
    ];
    let body = Body::from_stream(ReaderStream::new(stored.file));

    Ok((headers, body).into_response())
}

/// `Content-Disposition` value for `name`. Quotes, backslashes and control
/// characters cannot appear in the quoted filename and become `_`.
fn attachment_disposition(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn disposition_keeps_plain_names() {
        assert_eq!(
            attachment_disposition("variants 2024.vcf"),
            "attachment; filename=\"variants 2024.vcf\""
        );
    }

    #[test]
    fn disposition_is_always_a_valid_header_value() {
        for name in ["a\nb.csv", "tab\there.txt", "q\"uote.txt", "back\\slash", "del\u{7f}.gz"] {
            let value = attachment_disposition(name);
            assert!(HeaderValue::from_str(&value).is_ok(), "{:?}", value);
        }
        assert_eq!(
            attachment_disposition("a\nb\"c.csv"),
            "attachment; filename=\"a_b_c.csv\""
        );
    }
}
