use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Validation and contract errors exposed by `equiscan-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("history range end must be after start")]
    InvalidHistoryRange,

    #[error("invalid signal '{value}', expected one of STRONG_BUY, BUY, HOLD, SELL, STRONG_SELL")]
    InvalidSignal { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar high must be >= low")]
    InvalidBarRange,
    #[error("bar open/close must be within high/low range")]
    InvalidBarBounds,

    #[error("max_size must be greater than zero")]
    EmptyUniverseBound,

    #[error("score weights must be positive and finite")]
    InvalidScoreWeights,
}

/// Provider-level error classification used by the orchestrator's
/// exclusion-vs-degrade policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Unavailable,
    RateLimited,
    InvalidResponse,
    NotFound,
    Internal,
}

/// Structured error returned by data provider adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    retryable: bool,
}

impl ProviderError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::InvalidResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Unavailable => "provider.unavailable",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::InvalidResponse => "provider.invalid_response",
            ProviderErrorKind::NotFound => "provider.not_found",
            ProviderErrorKind::Internal => "provider.internal",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Why a single candidate dropped out of a scan.
///
/// Exclusion is per-candidate by design: no variant of this error ever
/// aborts an in-flight scan.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScreeningError {
    /// The fundamentals provider could not be reached for this candidate.
    #[error("fundamentals fetch failed for {symbol}: {source}")]
    ProviderUnavailable {
        symbol: String,
        source: ProviderError,
    },

    /// Fundamentals arrived but lack the fields required for scoring
    /// (`price`, `pe_ratio`). Never defaulted, always excluded.
    #[error("fundamentals for {symbol} are missing required fields")]
    InvalidFundamentals { symbol: String },

    /// A work unit failed inside the concurrency gate (task panic or
    /// join failure). Caught per unit, logged, never propagated.
    #[error("screening task failed for {symbol}: {message}")]
    Internal { symbol: String, message: String },
}

impl ScreeningError {
    pub fn symbol(&self) -> &str {
        match self {
            Self::ProviderUnavailable { symbol, .. }
            | Self::InvalidFundamentals { symbol }
            | Self::Internal { symbol, .. } => symbol,
        }
    }
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
