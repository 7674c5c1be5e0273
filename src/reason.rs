use std::fmt::Debug;

/// Trait for the identifying strings of a structured error.
///
/// An error's code is the stable machine-readable identifier
/// (e.g. `"NOT_FOUND"`, `"AUTH.INVALID_PASSWORD"`), the message is the
/// developer-facing description, and the user reason is optional text safe
/// to surface to an end user. Implementations must be thread-safe since
/// errors cross task boundaries.
pub trait Reason: Debug + Send + Sync {
    /// Machine-readable application code.
    fn code(&self) -> &str;

    /// Developer-facing message.
    fn message(&self) -> &str;

    /// User-facing text; empty when unset.
    fn user_reason(&self) -> &str;
}

/// Standard value-type implementation of [`Reason`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultReason {
    code: String,
    message: String,
    reason: String,
}

impl DefaultReason {
    /// Create a reason from a code and a developer message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            reason: String::new(),
        }
    }

    /// Set the user-facing text.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub(crate) fn set_code(&mut self, code: String) {
        self.code = code;
    }

    pub(crate) fn set_user_reason(&mut self, reason: String) {
        self.reason = reason;
    }
}

impl Reason for DefaultReason {
    fn code(&self) -> &str {
        &self.code
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn user_reason(&self) -> &str {
        &self.reason
    }
}
