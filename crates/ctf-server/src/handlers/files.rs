//! Attachment upload and download
//!
//! Both directions move through the object store one chunk at a time: the
//! multipart field is fed to the store as a reader, and downloads stream the
//! stored chunks straight into the response body.

use axum::{
    body::Body,
    extract::{Multipart, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use ctf_blob::DEFAULT_CONTENT_TYPE;
use futures::TryStreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::io;
use tokio_util::io::StreamReader;
use tracing::info;

use super::{required_param, ApiResponse};
use crate::config::AppState;
use crate::error::{ApiError, Result};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_id: String,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    pub file_id: Option<String>,
}

/// POST /upload
///
/// Stores the multipart field named `file`. Any earlier object with the same
/// filename is replaced.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadedFile>>> {
    info!("POST /upload");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field.content_type().map(str::to_string);

        let reader = StreamReader::new(field.map_err(io::Error::other));
        tokio::pin!(reader);

        let file_id = state
            .objects
            .put(reader, &filename, content_type.as_deref())
            .await?;

        info!("Uploaded {:?} as {}", filename, file_id);
        return Ok(Json(ApiResponse::ok(UploadedFile { file_id, filename })));
    }

    Err(ApiError::Validation("No file provided".into()))
}

/// GET /download?fileId=
pub async fn download_file(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    let file_id = required_param(query.file_id)
        .ok_or_else(|| ApiError::Validation("File ID is required".into()))?;
    info!("GET /download?fileId={}", file_id);

    let (meta, chunks) = state.objects.open_download_stream(&file_id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(meta.content_type_or_default())
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(meta.length));
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&meta.filename),
    );

    Ok((headers, Body::from_stream(chunks)).into_response())
}

/// RFC 5987 `attr-char`: everything else is percent-encoded in `filename*`.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// `attachment; filename="..."` with quotes, backslashes and anything
/// outside printable ASCII replaced by `_`. Names that needed replacing also
/// get the exact name as an RFC 6266 `filename*` parameter.
pub fn content_disposition(filename: &str) -> HeaderValue {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    let value = if fallback == filename {
        format!("attachment; filename=\"{}\"", fallback)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            utf8_percent_encode(filename, ATTR_CHAR)
        )
    };

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_plain() {
        assert_eq!(
            content_disposition("rsa.py"),
            "attachment; filename=\"rsa.py\""
        );
    }

    #[test]
    fn test_content_disposition_escapes_unsafe_characters() {
        assert_eq!(
            content_disposition("a\"b\\c\r\n.txt"),
            "attachment; filename=\"a_b_c__.txt\"; filename*=UTF-8''a%22b%5Cc%0D%0A.txt"
        );
    }

    #[test]
    fn test_content_disposition_keeps_unicode_name() {
        assert_eq!(
            content_disposition("café.txt"),
            "attachment; filename=\"caf_.txt\"; filename*=UTF-8''caf%C3%A9.txt"
        );
        assert_eq!(
            content_disposition("flag é.bin"),
            "attachment; filename=\"flag _.bin\"; filename*=UTF-8''flag%20%C3%A9.bin"
        );
    }
}
