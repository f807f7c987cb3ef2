//! Utility modules shared across the pipeline

pub mod fs;
pub mod url;

pub use self::url::UrlUtils;
