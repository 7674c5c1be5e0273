use std::collections::HashMap;

use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::convert::default_converter;
use crate::error::StructuredError;

/// JSON wire shape of a structured error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

/// Failure to decode an HTTP error payload.
#[derive(Error, Debug)]
#[error("failed to decode HTTP error payload: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

const FALLBACK_BODY: &str = r#"{"code":"INTERNAL","message":"failed to encode error response"}"#;

impl StructuredError {
    /// Project the JSON wire record.
    pub fn to_http_error(&self) -> HttpError {
        HttpError {
            code: self.code().to_string(),
            message: self.message().to_string(),
            reason: self.user_reason().to_string(),
            metadata: self.metadata().cloned(),
        }
    }

    /// Serialize the wire record, returning the body and the HTTP status
    /// code. A serialization failure falls back to a fixed literal body.
    pub fn to_http_json(&self) -> (Vec<u8>, u16) {
        let body = serde_json::to_vec(&self.to_http_error())
            .unwrap_or_else(|_| FALLBACK_BODY.as_bytes().to_vec());
        (body, self.http_code())
    }

    /// Build an [`http::Response`] carrying the JSON wire record.
    ///
    /// The response status is the error's HTTP code; values outside the
    /// valid status range fall back to 500.
    pub fn to_http_response(&self) -> Response<String> {
        let body = serde_json::to_string(&self.to_http_error())
            .unwrap_or_else(|_| FALLBACK_BODY.to_string());
        let mut response = Response::new(body);
        *response.status_mut() =
            StatusCode::from_u16(self.http_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }

    /// Decode an error from a JSON payload and the response status code.
    ///
    /// The gRPC code is derived from the HTTP code through the process-wide
    /// converter; an omitted reason or metadata stays unset.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the payload is not valid JSON or does
    /// not match the wire shape.
    pub fn from_http_json(payload: &[u8], http_code: u16) -> Result<StructuredError, DecodeError> {
        let wire: HttpError = serde_json::from_slice(payload)?;
        let grpc_code = default_converter().http_to_grpc(http_code);
        let mut err =
            StructuredError::new_with_codes(wire.code, wire.message, http_code, grpc_code);
        if !wire.reason.is_empty() {
            err = err.with_reason(wire.reason);
        }
        if let Some(metadata) = wire.metadata {
            for (key, value) in metadata {
                err = err.with_metadata(key, value);
            }
        }
        Ok(err)
    }
}

/// Build an error response with an explicit HTTP status; the gRPC code is
/// derived through the process-wide converter.
pub fn http_error_response(
    code: impl Into<String>,
    message: impl Into<String>,
    http_code: u16,
) -> Response<String> {
    let grpc_code = default_converter().http_to_grpc(http_code);
    StructuredError::new_with_codes(code, message, http_code, grpc_code).to_http_response()
}

/// Build an error response for a standard application code, with both
/// protocol codes resolved through the process-wide registry.
pub fn standard_http_error_response(
    code: impl Into<String>,
    message: impl Into<String>,
) -> Response<String> {
    StructuredError::new_standard(code, message).to_http_response()
}
