use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tonic::Code;

/// Trait for the bidirectional gRPC / HTTP status mapping consulted by the
/// protocol adapters.
pub trait CodeConverter: Send + Sync {
    /// Map an HTTP status code to the closest gRPC code.
    fn http_to_grpc(&self, http_code: u16) -> Code;

    /// Map a gRPC code to the closest HTTP status code.
    fn grpc_to_http(&self, code: Code) -> u16;
}

/// The built-in [`CodeConverter`] tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCodeConverter;

impl CodeConverter for DefaultCodeConverter {
    fn http_to_grpc(&self, http_code: u16) -> Code {
        match http_code {
            200..=299 => Code::Ok,
            400 => Code::InvalidArgument,
            401 => Code::Unauthenticated,
            403 => Code::PermissionDenied,
            404 => Code::NotFound,
            409 => Code::Aborted,
            422 => Code::FailedPrecondition,
            429 => Code::ResourceExhausted,
            499 => Code::Cancelled,
            500 => Code::Internal,
            501 => Code::Unimplemented,
            503 => Code::Unavailable,
            504 => Code::DeadlineExceeded,
            other if (400..500).contains(&other) => Code::InvalidArgument,
            _ => Code::Unknown,
        }
    }

    fn grpc_to_http(&self, code: Code) -> u16 {
        match code {
            Code::Ok => 200,
            Code::Cancelled => 499,
            Code::Unknown => 500,
            Code::InvalidArgument => 400,
            Code::DeadlineExceeded => 504,
            Code::NotFound => 404,
            Code::AlreadyExists => 409,
            Code::PermissionDenied => 403,
            Code::ResourceExhausted => 429,
            Code::FailedPrecondition => 400,
            Code::Aborted => 409,
            Code::OutOfRange => 400,
            Code::Unimplemented => 501,
            Code::Internal => 500,
            Code::Unavailable => 503,
            Code::DataLoss => 500,
            Code::Unauthenticated => 401,
        }
    }
}

// ── Process-wide default ───────────────────────────────────────────────────────

static DEFAULT_CONVERTER: LazyLock<RwLock<Arc<dyn CodeConverter>>> =
    LazyLock::new(|| RwLock::new(Arc::new(DefaultCodeConverter)));

/// Replace the converter consulted by the protocol adapters.
pub fn set_default_converter(converter: impl CodeConverter + 'static) {
    let mut slot = DEFAULT_CONVERTER
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *slot = Arc::new(converter);
}

/// Get the converter consulted by the protocol adapters.
pub fn default_converter() -> Arc<dyn CodeConverter> {
    DEFAULT_CONVERTER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
