use thiserror::Error;

use super::batch::PreloadReport;

/// Terminal failure of a preload session.
#[derive(Error, Debug)]
pub enum PreloadError {
    /// Every asset in a non-empty list failed. The full report still
    /// travels with the error so callers can inspect what was attempted.
    #[error("all {} assets failed to load", report.total)]
    AllAssetsFailed { report: PreloadReport },
}

/// Failure fetching a single asset.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
}
