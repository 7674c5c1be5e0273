#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::indexing_slicing,
        clippy::panic,
        clippy::unwrap_used
    )
)]

//! Structured application errors portable across gRPC and HTTP.
//!
//! An error carries a machine-readable application code, a developer
//! message, an optional user-facing reason, both protocol status codes,
//! string metadata, an optional domain, and an optional wrapped cause. The
//! protocol adapters convert it to and from [`tonic::Status`] (with
//! `google.rpc` error details) and an HTTP JSON body, resolving status
//! codes through a swappable registry and converter.
//!
//! ```
//! use errwire::{codes, StructuredError};
//!
//! let err = StructuredError::new_standard(codes::NOT_FOUND, "order 42 is missing")
//!     .with_reason("We could not find that order.")
//!     .with_metadata("order_id", "42");
//! assert_eq!(err.http_code(), 404);
//!
//! let status = err.to_status();
//! let decoded = StructuredError::from_status(&status);
//! assert_eq!(decoded.code(), codes::NOT_FOUND);
//! assert_eq!(decoded.user_reason(), "We could not find that order.");
//! ```

pub mod codes;
pub mod convert;
pub mod details;
pub mod error;
pub mod grpc;
pub mod http;
pub mod reason;

// Re-export commonly used types
pub use self::codes::{default_registry, set_default_registry, CodeMapping, CodeRegistry};
pub use self::convert::{
    default_converter, set_default_converter, CodeConverter, DefaultCodeConverter,
};
pub use self::details::{
    DetailedError, FIELD_PREFIX, PRECONDITION_PREFIX, PRECONDITION_VIOLATION_TYPE,
};
pub use self::error::{StructuredError, DEFAULT_DOMAIN};
pub use self::grpc::DEFAULT_LOCALE;
pub use self::http::{http_error_response, standard_http_error_response, DecodeError, HttpError};
pub use self::reason::{DefaultReason, Reason};

// Protocol types surfaced by the conversion APIs
pub use tonic::{Code, Status};
pub use tonic_types::{
    BadRequest, ErrorInfo, FieldViolation, LocalizedMessage, PreconditionFailure,
    PreconditionViolation,
};
