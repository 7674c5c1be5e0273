use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tonic::Code;

// ── General codes ──────────────────────────────────────────────────────────────

/// Catch-all for errors with no better classification.
pub const UNKNOWN: &str = "UNKNOWN";
pub const INTERNAL: &str = "INTERNAL";
pub const UNAVAILABLE: &str = "UNAVAILABLE";
pub const TIMEOUT: &str = "TIMEOUT";
pub const CANCELLED: &str = "CANCELLED";

// ── Client codes ───────────────────────────────────────────────────────────────

pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
pub const FAILED_PRECONDITION: &str = "FAILED_PRECONDITION";
pub const OUT_OF_RANGE: &str = "OUT_OF_RANGE";
pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
pub const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";
pub const ABORTED: &str = "ABORTED";

// ── Data codes ─────────────────────────────────────────────────────────────────

pub const DATA_LOSS: &str = "DATA_LOSS";
/// Payload failed semantic validation (422 rather than a plain 400).
pub const DATA_VALIDATION: &str = "DATA_VALIDATION";

// ── Business codes ─────────────────────────────────────────────────────────────

/// A domain rule rejected the operation (422 rather than a plain 400).
pub const BUSINESS_RULE: &str = "BUSINESS_RULE";
pub const CONFLICT: &str = "CONFLICT";

const STANDARD_MAPPINGS: &[(&str, Code, u16)] = &[
    (UNKNOWN, Code::Unknown, 500),
    (INTERNAL, Code::Internal, 500),
    (UNAVAILABLE, Code::Unavailable, 503),
    (TIMEOUT, Code::DeadlineExceeded, 504),
    (CANCELLED, Code::Cancelled, 499),
    (INVALID_ARGUMENT, Code::InvalidArgument, 400),
    (FAILED_PRECONDITION, Code::FailedPrecondition, 400),
    (OUT_OF_RANGE, Code::OutOfRange, 400),
    (UNAUTHENTICATED, Code::Unauthenticated, 401),
    (PERMISSION_DENIED, Code::PermissionDenied, 403),
    (NOT_FOUND, Code::NotFound, 404),
    (ALREADY_EXISTS, Code::AlreadyExists, 409),
    (RESOURCE_EXHAUSTED, Code::ResourceExhausted, 429),
    (ABORTED, Code::Aborted, 409),
    (DATA_LOSS, Code::DataLoss, 500),
    (DATA_VALIDATION, Code::InvalidArgument, 422),
    (BUSINESS_RULE, Code::FailedPrecondition, 422),
    (CONFLICT, Code::Aborted, 409),
];

/// A (gRPC, HTTP) status pair registered for an application code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeMapping {
    pub grpc: Code,
    pub http: u16,
}

/// Registry of application codes and their protocol status pairs.
///
/// Lookups on unregistered codes resolve to the registry's own `UNKNOWN`
/// entry, so a custom registry can redefine the fallback.
#[derive(Clone, Debug)]
pub struct CodeRegistry {
    entries: HashMap<String, CodeMapping>,
}

impl CodeRegistry {
    /// The built-in registry covering the standard application codes.
    pub fn standard() -> Self {
        let entries = STANDARD_MAPPINGS
            .iter()
            .map(|&(code, grpc, http)| (code.to_string(), CodeMapping { grpc, http }))
            .collect();
        Self { entries }
    }

    /// A registry with no entries.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a mapping, replacing any existing entry for the code.
    #[must_use]
    pub fn with_mapping(mut self, code: impl Into<String>, grpc: Code, http: u16) -> Self {
        self.entries.insert(code.into(), CodeMapping { grpc, http });
        self
    }

    /// Resolve a code to its status pair.
    ///
    /// Unregistered codes resolve to the `UNKNOWN` entry; a registry without
    /// an `UNKNOWN` entry falls back to Unknown / 500.
    pub fn lookup(&self, code: &str) -> CodeMapping {
        self.entries
            .get(code)
            .or_else(|| self.entries.get(UNKNOWN))
            .copied()
            .unwrap_or(CodeMapping {
                grpc: Code::Unknown,
                http: 500,
            })
    }

    /// Whether the code has its own entry.
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }
}

impl Default for CodeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// ── Process-wide default ───────────────────────────────────────────────────────

static DEFAULT_REGISTRY: LazyLock<RwLock<Arc<CodeRegistry>>> =
    LazyLock::new(|| RwLock::new(Arc::new(CodeRegistry::standard())));

/// Replace the registry consulted by [`StructuredError::new_standard`].
///
/// [`StructuredError::new_standard`]: crate::StructuredError::new_standard
pub fn set_default_registry(registry: CodeRegistry) {
    let mut slot = DEFAULT_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *slot = Arc::new(registry);
}

/// Get the registry consulted by [`StructuredError::new_standard`].
///
/// [`StructuredError::new_standard`]: crate::StructuredError::new_standard
pub fn default_registry() -> Arc<CodeRegistry> {
    DEFAULT_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
