//! Centralized error handling for the playlist pipeline
//!
//! # Error Categories
//!
//! - **Fetch Errors**: network, timeout, HTTP status and decode failures for a single
//!   remote resource. Always recoverable; the resource is treated as absent.
//! - **Cache Errors**: corrupt or unreadable cache files. Corruption is a cache miss.
//! - **Application Errors**: scratch-space filesystem failures, which end the run.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for per-resource fetch Results
pub type FetchResult<T> = Result<T, FetchError>;

/// Convenience type alias for cache store Results
pub type CacheResult<T> = Result<T, CacheError>;
