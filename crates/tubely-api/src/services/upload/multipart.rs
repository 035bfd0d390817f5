//! Size-bounded extraction of one file field from a multipart body.

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tubely_core::AppError;

const DEFAULT_PART_CONTENT_TYPE: &str = "application/octet-stream";

/// What was read from the file field.
#[derive(Debug, Clone)]
pub struct DecodedField {
    /// Declared content type of the part, as sent.
    pub content_type: String,
    pub size_bytes: u64,
}

fn map_multipart_error(err: MultipartError, limit_bytes: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit_bytes }
    } else {
        AppError::MalformedPayload(err.body_text())
    }
}

/// Stream the field named `field_name` into `sink`.
///
/// `accept` sees the declared content type before any byte is read. Every
/// chunk counts against `limit_bytes`; the first chunk that crosses it fails
/// the decode with `PayloadTooLarge` without being written. Other fields are
/// skipped.
pub async fn decode_file_field<W, F>(
    multipart: &mut Multipart,
    field_name: &str,
    limit_bytes: u64,
    accept: F,
    sink: &mut W,
) -> Result<DecodedField, AppError>
where
    W: AsyncWrite + Unpin,
    F: Fn(&str) -> Result<(), AppError>,
{
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multipart_error(e, limit_bytes))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_PART_CONTENT_TYPE)
            .to_string();
        accept(&content_type)?;

        let mut size_bytes: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| map_multipart_error(e, limit_bytes))?
        {
            size_bytes += chunk.len() as u64;
            if size_bytes > limit_bytes {
                return Err(AppError::PayloadTooLarge { limit_bytes });
            }
            sink.write_all(&chunk).await?;
        }
        sink.flush().await?;

        tracing::debug!(
            field = field_name,
            content_type = %content_type,
            size_bytes,
            "Decoded multipart file field"
        );

        return Ok(DecodedField {
            content_type,
            size_bytes,
        });
    }

    Err(AppError::FieldMissing(field_name.to_string()))
}
