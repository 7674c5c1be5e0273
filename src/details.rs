use std::collections::HashMap;

use tonic_types::{
    BadRequest, ErrorInfo, FieldViolation, PreconditionFailure, PreconditionViolation,
};

use crate::error::{StructuredError, DEFAULT_DOMAIN};

/// Metadata key prefix reserved for folded field violations.
pub const FIELD_PREFIX: &str = "field:";

/// Metadata key prefix reserved for folded precondition violations.
pub const PRECONDITION_PREFIX: &str = "precondition:";

/// Violation type reported on reconstructed precondition failures.
pub const PRECONDITION_VIOLATION_TYPE: &str = "PRECONDITION_FAILURE";

/// Rich-detail operations over [`StructuredError`].
///
/// Detail records are folded into the flat metadata map under the reserved
/// prefixes, so they survive any transport that carries metadata, and are
/// unfolded back into `google.rpc` records on demand. A key equal to a bare
/// prefix never matches, and unprefixed metadata is ignored by unfolding.
pub trait DetailedError {
    /// Set the domain and merge the supplied entries verbatim into the
    /// error's metadata. An empty domain leaves the field unset.
    #[must_use]
    fn with_error_info(self, domain: impl Into<String>, metadata: HashMap<String, String>) -> Self
    where
        Self: Sized;

    /// Fold one metadata entry per field violation, keyed `field:<name>`.
    #[must_use]
    fn with_bad_request(self, field_violations: HashMap<String, String>) -> Self
    where
        Self: Sized;

    /// Fold one metadata entry per precondition violation, keyed
    /// `precondition:<subject>`.
    #[must_use]
    fn with_precondition_failure(self, violations: HashMap<String, String>) -> Self
    where
        Self: Sized;

    /// The error-info record: reason = application code, configured or
    /// package-default domain, full metadata map.
    fn error_info(&self) -> ErrorInfo;

    /// Unfold the `field:` entries; `None` when no entry matches.
    fn bad_request(&self) -> Option<BadRequest>;

    /// Unfold the `precondition:` entries; `None` when no entry matches.
    fn precondition_failure(&self) -> Option<PreconditionFailure>;
}

impl DetailedError for StructuredError {
    fn with_error_info(
        self,
        domain: impl Into<String>,
        metadata: HashMap<String, String>,
    ) -> Self {
        let mut err = self.with_domain(domain);
        for (key, value) in metadata {
            err = err.with_metadata(key, value);
        }
        err
    }

    fn with_bad_request(self, field_violations: HashMap<String, String>) -> Self {
        let mut err = self;
        for (field, description) in field_violations {
            err = err.with_metadata(format!("{FIELD_PREFIX}{field}"), description);
        }
        err
    }

    fn with_precondition_failure(self, violations: HashMap<String, String>) -> Self {
        let mut err = self;
        for (subject, description) in violations {
            err = err.with_metadata(format!("{PRECONDITION_PREFIX}{subject}"), description);
        }
        err
    }

    fn error_info(&self) -> ErrorInfo {
        ErrorInfo::new(
            self.code(),
            self.domain().unwrap_or(DEFAULT_DOMAIN),
            self.metadata().cloned().unwrap_or_default(),
        )
    }

    fn bad_request(&self) -> Option<BadRequest> {
        let entries = prefixed_entries(self.metadata()?, FIELD_PREFIX)?;
        let violations: Vec<FieldViolation> = entries
            .into_iter()
            .map(|(field, description)| FieldViolation::new(field, description))
            .collect();
        Some(BadRequest::new(violations))
    }

    fn precondition_failure(&self) -> Option<PreconditionFailure> {
        let entries = prefixed_entries(self.metadata()?, PRECONDITION_PREFIX)?;
        let violations: Vec<PreconditionViolation> = entries
            .into_iter()
            .map(|(subject, description)| {
                PreconditionViolation::new(PRECONDITION_VIOLATION_TYPE, subject, description)
            })
            .collect();
        Some(PreconditionFailure::new(violations))
    }
}

/// Collect `(remainder, value)` pairs for keys under the prefix, sorted by
/// remainder so output is deterministic. `None` when nothing matches.
fn prefixed_entries<'a>(
    metadata: &'a HashMap<String, String>,
    prefix: &str,
) -> Option<Vec<(&'a str, &'a str)>> {
    let mut entries: Vec<(&str, &str)> = metadata
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(prefix)
                .filter(|remainder| !remainder.is_empty())
                .map(|remainder| (remainder, value.as_str()))
        })
        .collect();
    if entries.is_empty() {
        return None;
    }
    entries.sort_unstable();
    Some(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_bad_request_folds_prefixed_entries() {
        let violations = HashMap::from([
            ("email".to_string(), "must be a valid address".to_string()),
            ("age".to_string(), "must be positive".to_string()),
        ]);
        let err = StructuredError::new("DATA_VALIDATION", "payload rejected")
            .with_bad_request(violations);

        let metadata = err.metadata().unwrap();
        assert_eq!(
            metadata.get("field:email").map(String::as_str),
            Some("must be a valid address")
        );
        assert_eq!(
            metadata.get("field:age").map(String::as_str),
            Some("must be positive")
        );
    }

    #[test]
    fn test_bad_request_unfolds_sorted() {
        let violations = HashMap::from([
            ("email".to_string(), "must be a valid address".to_string()),
            ("age".to_string(), "must be positive".to_string()),
        ]);
        let err = StructuredError::new("DATA_VALIDATION", "payload rejected")
            .with_bad_request(violations)
            .with_metadata("request_id", "r-17");

        let bad_request = err.bad_request().unwrap();
        assert_eq!(bad_request.field_violations.len(), 2);
        assert_eq!(bad_request.field_violations[0].field, "age");
        assert_eq!(bad_request.field_violations[0].description, "must be positive");
        assert_eq!(bad_request.field_violations[1].field, "email");
    }

    #[test]
    fn test_bad_request_none_without_matches() {
        let err = StructuredError::new("NOT_FOUND", "missing");
        assert!(err.bad_request().is_none());

        let err = err.with_metadata("request_id", "r-17");
        assert!(err.bad_request().is_none());
    }

    #[test]
    fn test_bare_prefix_key_does_not_match() {
        let err = StructuredError::new("DATA_VALIDATION", "payload rejected")
            .with_metadata("field:", "orphaned description")
            .with_metadata("precondition:", "orphaned description");
        assert!(err.bad_request().is_none());
        assert!(err.precondition_failure().is_none());
    }

    #[test]
    fn test_precondition_failure_unfolds() {
        let violations = HashMap::from([(
            "account.balance".to_string(),
            "balance must cover the transfer".to_string(),
        )]);
        let err = StructuredError::new("BUSINESS_RULE", "transfer rejected")
            .with_precondition_failure(violations);

        let failure = err.precondition_failure().unwrap();
        assert_eq!(failure.violations.len(), 1);
        assert_eq!(failure.violations[0].r#type, PRECONDITION_VIOLATION_TYPE);
        assert_eq!(failure.violations[0].subject, "account.balance");
        assert_eq!(
            failure.violations[0].description,
            "balance must cover the transfer"
        );
    }

    #[test]
    fn test_prefixes_do_not_cross_match() {
        let err = StructuredError::new("DATA_VALIDATION", "payload rejected")
            .with_bad_request(HashMap::from([(
                "email".to_string(),
                "must be a valid address".to_string(),
            )]))
            .with_precondition_failure(HashMap::from([(
                "terms".to_string(),
                "terms of service not accepted".to_string(),
            )]))
            .with_metadata("request_id", "r-17");

        let bad_request = err.bad_request().unwrap();
        assert_eq!(bad_request.field_violations.len(), 1);
        assert_eq!(bad_request.field_violations[0].field, "email");

        let failure = err.precondition_failure().unwrap();
        assert_eq!(failure.violations.len(), 1);
        assert_eq!(failure.violations[0].subject, "terms");
    }

    #[test]
    fn test_fold_unfold_idempotent() {
        let input = HashMap::from([
            ("email".to_string(), "must be a valid address".to_string()),
            ("name".to_string(), "must not be empty".to_string()),
        ]);
        let err = StructuredError::new("DATA_VALIDATION", "payload rejected")
            .with_metadata("unrelated", "noise")
            .with_bad_request(input.clone());

        let unfolded: HashMap<String, String> = err
            .bad_request()
            .unwrap()
            .field_violations
            .into_iter()
            .map(|violation| (violation.field, violation.description))
            .collect();
        assert_eq!(unfolded, input);
    }

    #[test]
    fn test_error_info_defaults_domain() {
        let err = StructuredError::new("NOT_FOUND", "missing");
        let info = err.error_info();
        assert_eq!(info.reason, "NOT_FOUND");
        assert_eq!(info.domain, DEFAULT_DOMAIN);
        assert!(info.metadata.is_empty());
    }

    #[test]
    fn test_error_info_uses_configured_domain_and_metadata() {
        let err = StructuredError::new("NOT_FOUND", "missing")
            .with_domain("orders.example.com")
            .with_metadata("order_id", "42");
        let info = err.error_info();
        assert_eq!(info.domain, "orders.example.com");
        assert_eq!(info.metadata.get("order_id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_with_error_info_merges_metadata() {
        let err = StructuredError::new("NOT_FOUND", "missing")
            .with_metadata("order_id", "42")
            .with_error_info(
                "orders.example.com",
                HashMap::from([("region".to_string(), "eu-west-1".to_string())]),
            );

        assert_eq!(err.domain(), Some("orders.example.com"));
        let metadata = err.metadata().unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.get("order_id").map(String::as_str), Some("42"));
        assert_eq!(metadata.get("region").map(String::as_str), Some("eu-west-1"));
    }

    #[test]
    fn test_with_error_info_empty_domain_stays_unset() {
        let err = StructuredError::new("NOT_FOUND", "missing")
            .with_error_info("", HashMap::new());
        assert!(err.domain().is_none());
        assert!(err.metadata().is_none());
    }
}
