use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

use tonic::Code;

use crate::codes::{self, default_registry};
use crate::reason::{DefaultReason, Reason};

/// Domain reported in error-info details when none was set explicitly.
pub const DEFAULT_DOMAIN: &str = "errwire";

#[derive(Debug)]
enum ReasonHolder {
    Default(DefaultReason),
    Custom(Box<dyn Reason>),
}

impl ReasonHolder {
    fn as_reason(&self) -> &dyn Reason {
        match self {
            ReasonHolder::Default(reason) => reason,
            ReasonHolder::Custom(reason) => reason.as_ref(),
        }
    }
}

/// Structured application error portable across gRPC and HTTP.
///
/// Carries a machine-readable application code, a developer message, an
/// optional user-facing reason, both protocol status codes, optional string
/// metadata, an optional logical domain, and an optional wrapped cause.
/// Construction never fails; the fluent mutators consume and return the
/// value.
#[derive(Debug)]
pub struct StructuredError {
    reason: ReasonHolder,
    grpc_code: Code,
    http_code: u16,
    metadata: Option<HashMap<String, String>>,
    domain: Option<String>,
    cause: Option<Box<dyn StdError + Send + Sync>>,
}

impl StructuredError {
    /// Create an error with the default protocol codes (Unknown / 500).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new_with_codes(code, message, 500, Code::Unknown)
    }

    /// Create an error with protocol codes resolved through the
    /// process-wide registry.
    pub fn new_standard(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let mapping = default_registry().lookup(&code);
        Self::new_with_codes(code, message, mapping.http, mapping.grpc)
    }

    /// Create an error with explicit protocol codes.
    pub fn new_with_codes(
        code: impl Into<String>,
        message: impl Into<String>,
        http_code: u16,
        grpc_code: Code,
    ) -> Self {
        Self {
            reason: ReasonHolder::Default(DefaultReason::new(code, message)),
            grpc_code,
            http_code,
            metadata: None,
            domain: None,
            cause: None,
        }
    }

    /// Wrap any error under an application code.
    ///
    /// A source that already is a `StructuredError` gets its application
    /// code replaced and is returned as-is, so wrapping never stacks a
    /// second layer; its message, protocol codes, metadata, and cause are
    /// untouched. Any other source becomes the cause of a fresh
    /// Unknown / 500 error whose message is the source's rendering.
    pub fn wrap(
        source: impl Into<Box<dyn StdError + Send + Sync>>,
        code: impl Into<String>,
    ) -> Self {
        match source.into().downcast::<StructuredError>() {
            Ok(mut err) => {
                err.set_code(code.into());
                *err
            }
            Err(source) => {
                let message = source.to_string();
                let mut err = Self::new(code, message);
                err.cause = Some(source);
                err
            }
        }
    }

    /// [`wrap`](Self::wrap) under the `UNKNOWN` code.
    pub fn wrap_default(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::wrap(source, codes::UNKNOWN)
    }

    /// Set the user-facing reason text.
    ///
    /// A default reason is updated in place; a custom [`Reason`] is replaced
    /// by a default one seeded from its current code and message.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        self.reason = match self.reason {
            ReasonHolder::Default(mut current) => {
                current.set_user_reason(reason);
                ReasonHolder::Default(current)
            }
            ReasonHolder::Custom(current) => ReasonHolder::Default(
                DefaultReason::new(current.code(), current.message()).with_reason(reason),
            ),
        };
        self
    }

    /// Install a caller-supplied [`Reason`] implementation.
    #[must_use]
    pub fn with_custom_reason(mut self, reason: impl Reason + 'static) -> Self {
        self.reason = ReasonHolder::Custom(Box::new(reason));
        self
    }

    /// Override the gRPC status code.
    #[must_use]
    pub fn with_grpc_code(mut self, code: Code) -> Self {
        self.grpc_code = code;
        self
    }

    /// Override the HTTP status code.
    #[must_use]
    pub fn with_http_code(mut self, code: u16) -> Self {
        self.http_code = code;
        self
    }

    /// Attach one metadata entry, allocating the map on first use.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the logical domain reported in error-info details.
    ///
    /// An empty domain clears the field back to the package default.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        self.domain = if domain.is_empty() {
            None
        } else {
            Some(domain)
        };
        self
    }

    /// Machine-readable application code.
    pub fn code(&self) -> &str {
        self.reason.as_reason().code()
    }

    /// Developer-facing message.
    pub fn message(&self) -> &str {
        self.reason.as_reason().message()
    }

    /// User-facing reason; empty when unset.
    pub fn user_reason(&self) -> &str {
        self.reason.as_reason().user_reason()
    }

    pub fn grpc_code(&self) -> Code {
        self.grpc_code
    }

    pub fn http_code(&self) -> u16 {
        self.http_code
    }

    /// Metadata entries; `None` until the first entry is attached.
    pub fn metadata(&self) -> Option<&HashMap<String, String>> {
        self.metadata.as_ref()
    }

    /// Explicitly set domain, if any.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Wrapped source error, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Code-based equality: true iff the other error carries the same
    /// application code. Every other field is ignored.
    pub fn is(&self, other: &StructuredError) -> bool {
        self.code() == other.code()
    }

    fn set_code(&mut self, code: String) {
        if let ReasonHolder::Default(current) = &mut self.reason {
            current.set_code(code);
            return;
        }
        let current = self.reason.as_reason();
        let replacement =
            DefaultReason::new(code, current.message()).with_reason(current.user_reason());
        self.reason = ReasonHolder::Default(replacement);
    }
}

impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code();
        let message = self.message();
        if code.is_empty() && message.is_empty() {
            return f.write_str("unknown error");
        }
        write!(f, "[{code}] {message}")
    }
}

impl StdError for StructuredError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let cause = self.cause.as_deref()?;
        Some(cause)
    }
}
