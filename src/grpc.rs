use tonic::Status;
use tonic_types::{ErrorDetails, StatusExt};

use crate::codes;
use crate::convert::default_converter;
use crate::details::DetailedError;
use crate::error::StructuredError;

/// Locale reported on localized-message details.
pub const DEFAULT_LOCALE: &str = "en-US";

impl StructuredError {
    /// Convert to a [`tonic::Status`].
    ///
    /// Attaches an error-info detail when the error carries metadata or an
    /// explicit domain, and a localized-message detail when a user-facing
    /// reason is set. An error with neither becomes a plain status.
    pub fn to_status(&self) -> Status {
        let mut details = ErrorDetails::new();
        let mut has_details = false;

        if self.metadata().is_some() || self.domain().is_some() {
            let info = self.error_info();
            details.set_error_info(info.reason, info.domain, info.metadata);
            has_details = true;
        }

        if !self.user_reason().is_empty() {
            details.set_localized_message(DEFAULT_LOCALE, self.user_reason());
            has_details = true;
        }

        if has_details {
            Status::with_error_details(self.grpc_code(), self.message(), details)
        } else {
            Status::new(self.grpc_code(), self.message())
        }
    }

    /// Rebuild from a [`tonic::Status`].
    ///
    /// The application code defaults to `UNKNOWN` until an attached
    /// error-info detail overrides it; the HTTP code is derived from the
    /// status code through the process-wide converter. Missing or malformed
    /// detail payloads are ignored.
    pub fn from_status(status: &Status) -> StructuredError {
        let details = status.get_error_details();

        let mut code = codes::UNKNOWN.to_string();
        let mut domain = None;
        let mut metadata = None;
        if let Some(info) = details.error_info() {
            code.clone_from(&info.reason);
            if !info.domain.is_empty() {
                domain = Some(info.domain.clone());
            }
            if !info.metadata.is_empty() {
                metadata = Some(info.metadata.clone());
            }
        }

        let http_code = default_converter().grpc_to_http(status.code());
        let mut err =
            StructuredError::new_with_codes(code, status.message(), http_code, status.code());
        if let Some(domain) = domain {
            err = err.with_domain(domain);
        }
        if let Some(entries) = metadata {
            for (key, value) in entries {
                err = err.with_metadata(key, value);
            }
        }
        if let Some(localized) = details.localized_message() {
            err = err.with_reason(localized.message.clone());
        }
        err
    }
}

impl From<StructuredError> for Status {
    fn from(err: StructuredError) -> Self {
        err.to_status()
    }
}
