//! Error types for cache and memo operations
//!
//! Every lookup returns [`CacheError`] on failure. The computation error type
//! `E` is supplied by the caller and shared between all callers waiting on
//! the same computation, so it is carried behind an `Arc` rather than
//! requiring `E: Clone`.
//!
//! Errors implement [`ErrorClassification`] so callers can make uniform retry
//! and alerting decisions:
//!
//! | Variant | Retryable | Severity |
//! |---------|-----------|----------|
//! | `NotFound` | no | Info |
//! | `Compute` | yes | Warning |
//! | `Abandoned` | yes | Error |
//! | `Closed` | no | Error |

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Result type for cache lookups
pub type CacheResult<V, E> = Result<V, CacheError<E>>;

/// Errors produced by cache and memo lookups
#[derive(Debug, Error)]
pub enum CacheError<E> {
    /// The key is absent or expired and no computation was supplied
    #[error("no such entry")]
    NotFound,

    /// The computation failed; every concurrent waiter receives the same error
    #[error("computation failed: {0}")]
    Compute(Arc<E>),

    /// The owning computation unwound before publishing a result
    #[error("computation abandoned before completion")]
    Abandoned,

    /// The memo's coordinating thread is no longer accepting requests
    #[error("memo has been shut down")]
    Closed,
}

impl<E> CacheError<E> {
    /// True for the not-found outcome
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// The shared computation error, if this is a computation failure
    pub const fn compute_error(&self) -> Option<&Arc<E>> {
        match self {
            Self::Compute(err) => Some(err),
            _ => None,
        }
    }
}

impl<E> Clone for CacheError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::NotFound => Self::NotFound,
            Self::Compute(err) => Self::Compute(Arc::clone(err)),
            Self::Abandoned => Self::Abandoned,
            Self::Closed => Self::Closed,
        }
    }
}

/// Errors raised while loading a [`CacheConfig`](crate::cache::CacheConfig)
#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed into a configuration
    #[error("invalid cache configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Standard interface for classifying errors
pub trait ErrorClassification {
    /// Check if the failed operation may succeed when attempted again
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl<E> ErrorClassification for CacheError<E> {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Compute(_) | Self::Abandoned)
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound => ErrorSeverity::Info,
            Self::Compute(_) => ErrorSeverity::Warning,
            Self::Abandoned | Self::Closed => ErrorSeverity::Error,
        }
    }
}

#[cfg(feature = "serde")]
impl ErrorClassification for ConfigError {
    fn is_retryable(&self) -> bool {
        false
    }

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }
}
