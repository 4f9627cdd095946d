//! Application wiring for sitewarm.
//!
//! This module contains the core `App` struct that constructs the service
//! instances once at startup - freshness store, manifest, preloader,
//! navigation enhancer - and passes them explicitly to the operations that
//! need them.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::manifest::{AssetManifest, PAGES};
use crate::nav::{NavAction, NavEvent, NavigationEnhancer};
use crate::preload::{
    AssetLoader, BatchPreloader, HttpAssetLoader, PreloadError, PreloadReport, ProgressUpdate,
};
use crate::store::{FreshnessStatus, FreshnessStore, KvStore};

/// Which slice of the manifest to warm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmSelection {
    /// Device-optimized order favoring desktop assets.
    Desktop,
    /// Device-optimized order favoring mobile assets.
    Mobile,
    /// Every asset in manifest order.
    All,
}

/// Whether `page` is the site's home document.
pub fn is_home_page(page: &str) -> bool {
    page.ends_with("index.html") || page == "/" || page.ends_with('/')
}

pub struct App {
    store: FreshnessStore,
    manifest: AssetManifest,
    loader: Arc<dyn AssetLoader>,
    preloader: BatchPreloader,
}

impl App {
    /// Build the app from the on-disk configuration.
    pub fn new() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        let store = FreshnessStore::new(KvStore::new(config.cache_dir()?)?);
        let manifest = AssetManifest::load_or_default(&Config::manifest_path()?)
            .context("Failed to load asset manifest")?;
        let loader: Arc<dyn AssetLoader> = Arc::new(HttpAssetLoader::new(&config.base_url)?);
        Ok(Self::from_parts(store, manifest, loader))
    }

    /// Assemble the app from already-constructed services.
    pub fn from_parts(
        store: FreshnessStore,
        manifest: AssetManifest,
        loader: Arc<dyn AssetLoader>,
    ) -> Self {
        let preloader = BatchPreloader::new(Arc::clone(&loader));
        Self {
            store,
            manifest,
            loader,
            preloader,
        }
    }

    /// Warm the selected manifest slice and record freshness on success.
    ///
    /// Individual failures only lower the success rate; the record is
    /// marked as long as at least one asset loaded.
    pub async fn warm(
        &self,
        selection: WarmSelection,
        progress: Option<mpsc::UnboundedSender<ProgressUpdate>>,
    ) -> Result<PreloadReport> {
        let assets = match selection {
            WarmSelection::Desktop => self.manifest.get_optimized(true),
            WarmSelection::Mobile => self.manifest.get_optimized(false),
            WarmSelection::All => self.manifest.get_all(),
        };
        info!(total = assets.len(), ?selection, "Warming asset cache");

        match self.preloader.preload_all(&assets, progress).await {
            Ok(report) => {
                self.store.mark_cached()?;
                info!(
                    loaded = report.loaded.len(),
                    failed = report.failed.len(),
                    success_rate = report.success_rate,
                    "Asset cache warmed"
                );
                Ok(report)
            }
            Err(e @ PreloadError::AllAssetsFailed { .. }) => {
                warn!("Warm-up failed, cache record left untouched");
                Err(e.into())
            }
        }
    }

    /// Page-load flow: enable instant navigation when the record is fresh
    /// and this is not the home page, prefetching the other page documents.
    /// With `debug` set, the status snapshot is logged.
    pub async fn bootstrap(&self, page: &str, debug: bool) -> Result<NavigationEnhancer> {
        let enable = self.store.is_fresh() && !is_home_page(page);
        let mut nav = NavigationEnhancer::new(enable);

        if enable {
            info!(page, "Assets cached - enabling instant navigation");
            for target in PAGES.iter().filter(|p| !page.ends_with(**p)) {
                let event = NavEvent::Hover {
                    href: (*target).to_string(),
                };
                if let Some(NavAction::Prefetch { href }) = nav.handle(event) {
                    // Hints are best-effort; a miss just means a slower click
                    if let Err(e) = self.loader.fetch(&href).await {
                        debug!(href, error = %e, "Prefetch hint failed");
                    }
                }
            }
        }

        if debug {
            let status = self.store.status();
            info!(
                is_fresh = status.is_fresh,
                version = ?status.version,
                cached = ?status.cached,
                age = %status.age_display(),
                "Cache status (clear with `sitewarm clear`)"
            );
        }

        Ok(nav)
    }

    /// Diagnostic snapshot of the freshness record.
    pub fn status(&self) -> FreshnessStatus {
        self.store.status()
    }

    /// Drop the freshness record.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}
