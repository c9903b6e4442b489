//! Request parameter lookup: headers first, then query string, then form body.

use axum::{
    body::to_bytes,
    extract::{FromRequest, Multipart, Request},
    http::{header, HeaderMap},
};

use crate::error::ApiError;

const FORM_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Parse an `application/x-www-form-urlencoded` body.
///
/// The content type is not checked. A body that fails to parse yields no pairs.
pub fn parse_form(body: &[u8]) -> Vec<(String, String)> {
    serde_urlencoded::from_bytes::<Vec<(String, String)>>(body).unwrap_or_else(|e| {
        tracing::debug!("ignoring undecodable form body: {e}");
        Vec::new()
    })
}

/// Text fields of a `multipart/form-data` or url-encoded body.
///
/// Uploaded files are skipped. Any other content type is decoded as url-encoded.
pub async fn read_form(request: Request) -> Result<Vec<(String, String)>, ApiError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if !is_multipart {
        let body = to_bytes(request.into_body(), FORM_BODY_LIMIT)
            .await
            .map_err(|e| ApiError::InvalidInput(format!("cannot read body: {e}")))?;
        return Ok(parse_form(&body));
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?
    {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        fields.push((name, value));
    }
    Ok(fields)
}

/// First value for `key` in a list of pairs.
pub fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub struct RequestParams<'a> {
    headers: &'a HeaderMap,
    query: &'a [(String, String)],
    form: &'a [(String, String)],
}

impl<'a> RequestParams<'a> {
    pub fn new(
        headers: &'a HeaderMap,
        query: &'a [(String, String)],
        form: &'a [(String, String)],
    ) -> Self {
        Self { headers, query, form }
    }

    /// Value of header `header`, falling back to value `name` from the query
    /// string or form. Empty headers fall through; a missing value is `""`.
    pub fn get(&self, header: &str, name: &str) -> String {
        let from_header = self
            .headers
            .get(header)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty());
        if let Some(v) = from_header {
            return v.to_string();
        }

        first_value(self.query, name)
            .or_else(|| first_value(self.form, name))
            .unwrap_or("")
            .to_string()
    }
}

/// `""` -> `None`
pub fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
