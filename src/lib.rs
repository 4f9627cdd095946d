//! sitewarm - asset cache warmer for a static site.
//!
//! Warms the site's per-page image, font, and stylesheet assets in
//! throttled batches, records whether a warm-up is still fresh, and layers
//! instant-navigation decisions (fade transitions, hover prefetch) on top
//! of page links once freshness is established.

pub mod app;
pub mod config;
pub mod manifest;
pub mod nav;
pub mod preload;
pub mod store;
