//! Page acquisition and cleanup.
//!
//! - [`fetch`]: the [`fetch::PageFetcher`] trait and its reqwest-backed
//!   implementation
//! - [`sanitize`]: regex-based stripping of scripts, styles, and comments

pub mod fetch;
pub mod sanitize;

pub use fetch::{FetchOptions, HttpPageFetcher, PageFetcher};
pub use sanitize::clean;
