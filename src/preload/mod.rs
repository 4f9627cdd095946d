//! Throttled asset preloading.
//!
//! This module provides the `BatchPreloader` for warming a list of asset
//! URLs in fixed-size concurrent batches, the `AssetLoader` seam it fetches
//! through, and the progress/report types describing a session's outcome.

pub mod batch;
pub mod error;
pub mod loader;

pub use batch::{BatchPreloader, PreloadReport, ProgressUpdate};
pub use error::{FetchError, PreloadError};
pub use loader::{AssetLoader, HttpAssetLoader};
