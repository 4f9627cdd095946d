//! Batched asset preloading with progress aggregation.
//!
//! Assets are dispatched in fixed-size batches with a delay between
//! batches, throttling simultaneous in-flight requests. Within a batch all
//! loads run concurrently; completions from any batch feed one aggregation
//! loop that emits a progress event per settled asset and produces the
//! final report once every asset has settled.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::error::PreloadError;
use super::loader::AssetLoader;

/// Assets dispatched concurrently per batch.
/// 6 stays under typical per-host connection limits.
const BATCH_SIZE: usize = 6;

/// Delay before each batch after the first, in milliseconds.
const BATCH_DELAY_MS: u64 = 200;

/// Synthetic settle time for stylesheets, in milliseconds.
/// Stylesheet loads are not verified; the asset is assumed warm.
const STYLESHEET_SETTLE_MS: u64 = 30;

/// Synthetic settle time for fonts, in milliseconds.
const FONT_SETTLE_MS: u64 = 20;

/// Asset type inferred from the filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetKind {
    Stylesheet,
    Font,
    Image,
}

impl AssetKind {
    fn from_path(path: &str) -> Self {
        if path.ends_with(".css") {
            AssetKind::Stylesheet
        } else if path.ends_with(".ttf") || path.ends_with(".otf") {
            AssetKind::Font
        } else {
            AssetKind::Image
        }
    }
}

/// Progress event emitted once per settled asset.
/// `percent` counts successes only, rounded.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProgressUpdate {
    pub loaded: usize,
    pub total: usize,
    pub percent: u32,
}

/// Outcome of a preload session.
#[derive(Debug, Clone, Serialize)]
pub struct PreloadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<String>,
    pub total: usize,
    pub success_rate: u32,
}

fn percent(loaded: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    (loaded as f64 / total as f64 * 100.0).round() as u32
}

/// Preloads asset lists in throttled batches.
pub struct BatchPreloader {
    loader: Arc<dyn AssetLoader>,
}

impl BatchPreloader {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self { loader }
    }

    /// Load every asset exactly once and report the aggregate outcome.
    ///
    /// Each call owns its whole session: counters, ordered outcome lists,
    /// and a private completion channel live in this frame, so concurrent
    /// calls are fully independent. Individual failures are counted, not
    /// fatal; a non-empty list where nothing loads returns
    /// [`PreloadError::AllAssetsFailed`] carrying the report. An empty list
    /// is a trivial success with no progress events.
    ///
    /// There is no cancellation: dropping the future leaves already-issued
    /// loads running in the background.
    pub async fn preload_all(
        &self,
        assets: &[String],
        progress: Option<mpsc::UnboundedSender<ProgressUpdate>>,
    ) -> Result<PreloadReport, PreloadError> {
        let total = assets.len();
        if total == 0 {
            return Ok(PreloadReport {
                loaded: Vec::new(),
                failed: Vec::new(),
                total: 0,
                success_rate: percent(0, 0),
            });
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<(String, bool)>();

        let loader = Arc::clone(&self.loader);
        let batches: Vec<Vec<String>> = assets.chunks(BATCH_SIZE).map(<[String]>::to_vec).collect();
        tokio::spawn(async move {
            for (index, batch) in batches.into_iter().enumerate() {
                if index > 0 {
                    sleep(Duration::from_millis(BATCH_DELAY_MS)).await;
                }
                debug!(batch = index, count = batch.len(), "Dispatching preload batch");
                for url in batch {
                    let loader = Arc::clone(&loader);
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let ok = load_asset(loader.as_ref(), &url).await;
                        let _ = tx.send((url, ok));
                    });
                }
            }
        });

        let mut loaded: Vec<String> = Vec::new();
        let mut failed: Vec<String> = Vec::new();

        while loaded.len() + failed.len() < total {
            // Senders are held by the dispatcher and per-asset tasks until
            // every asset settles, so the channel cannot close early.
            let Some((url, ok)) = rx.recv().await else {
                break;
            };

            if ok {
                loaded.push(url);
            } else {
                failed.push(url);
            }

            if let Some(ref progress) = progress {
                let _ = progress.send(ProgressUpdate {
                    loaded: loaded.len(),
                    total,
                    percent: percent(loaded.len(), total),
                });
            }
        }

        let report = PreloadReport {
            total,
            success_rate: percent(loaded.len(), total),
            loaded,
            failed,
        };

        if report.loaded.is_empty() {
            warn!(total, "All assets failed to load");
            Err(PreloadError::AllAssetsFailed { report })
        } else {
            debug!(
                loaded = report.loaded.len(),
                failed = report.failed.len(),
                success_rate = report.success_rate,
                "Preload session complete"
            );
            Ok(report)
        }
    }
}

/// Settle one asset. Stylesheets and fonts complete synthetically after a
/// fixed delay; images go through the loader and can genuinely fail.
async fn load_asset(loader: &dyn AssetLoader, url: &str) -> bool {
    match AssetKind::from_path(url) {
        AssetKind::Stylesheet => {
            sleep(Duration::from_millis(STYLESHEET_SETTLE_MS)).await;
            true
        }
        AssetKind::Font => {
            sleep(Duration::from_millis(FONT_SETTLE_MS)).await;
            true
        }
        AssetKind::Image => match loader.fetch(url).await {
            Ok(()) => true,
            Err(e) => {
                debug!(url, error = %e, "Asset failed to load");
                false
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::super::error::FetchError;
    use super::*;

    /// Loader that records dispatch times and fails a configured set.
    struct MockLoader {
        fail: HashSet<String>,
        calls: Mutex<Vec<(String, Instant)>>,
    }

    impl MockLoader {
        fn new(fail: &[&str]) -> Self {
            Self {
                fail: fail.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn dispatch_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
        }
    }

    #[async_trait]
    impl AssetLoader for MockLoader {
        async fn fetch(&self, url: &str) -> Result<(), FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), Instant::now()));
            if self.fail.contains(url) {
                Err(FetchError::Status(reqwest::StatusCode::NOT_FOUND))
            } else {
                Ok(())
            }
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("img-{}.webp", i)).collect()
    }

    #[test]
    fn test_asset_kind_from_path() {
        assert_eq!(AssetKind::from_path("style.css"), AssetKind::Stylesheet);
        assert_eq!(AssetKind::from_path("Fonts/K.ttf"), AssetKind::Font);
        assert_eq!(AssetKind::from_path("Fonts/K.otf"), AssetKind::Font);
        assert_eq!(AssetKind::from_path("a.webp"), AssetKind::Image);
        assert_eq!(AssetKind::from_path("favicon.ico"), AssetKind::Image);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_list_trivial_success() {
        let loader = Arc::new(MockLoader::new(&[]));
        let preloader = BatchPreloader::new(Arc::clone(&loader) as Arc<dyn AssetLoader>);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let report = preloader.preload_all(&[], Some(tx)).await.unwrap();

        assert!(report.loaded.is_empty());
        assert!(report.failed.is_empty());
        assert_eq!(report.total, 0);
        // No asset ever settled, so no progress event fired
        assert!(rx.try_recv().is_err());
        assert!(loader.dispatch_times().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcome_conservation_and_success_rate() {
        let assets = urls(5);
        let loader = Arc::new(MockLoader::new(&["img-1.webp", "img-3.webp"]));
        let preloader = BatchPreloader::new(loader as Arc<dyn AssetLoader>);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let report = preloader.preload_all(&assets, Some(tx)).await.unwrap();

        assert_eq!(report.loaded.len() + report.failed.len(), report.total);
        assert_eq!(report.total, 5);
        assert_eq!(report.loaded.len(), 3);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.success_rate, 60);

        // One progress event per settled asset; the last reflects the
        // final success count
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 5);
        assert_eq!(events.last().unwrap().loaded, 3);
        assert_eq!(events.last().unwrap().percent, 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failed_rejects_with_report() {
        let assets = urls(3);
        let loader = Arc::new(MockLoader::new(&["img-0.webp", "img-1.webp", "img-2.webp"]));
        let preloader = BatchPreloader::new(loader as Arc<dyn AssetLoader>);

        let err = preloader.preload_all(&assets, None).await.unwrap_err();
        let PreloadError::AllAssetsFailed { report } = err;
        assert_eq!(report.success_rate, 0);
        assert_eq!(report.failed.len(), 3);
        assert!(report.loaded.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stylesheets_and_fonts_settle_synthetically() {
        let assets = vec![
            "style.css".to_string(),
            "Fonts/kodex/Kodex-Regular.ttf".to_string(),
            "Fonts/kodex/Kodex-Regular.otf".to_string(),
        ];
        let loader = Arc::new(MockLoader::new(&[]));
        let preloader = BatchPreloader::new(Arc::clone(&loader) as Arc<dyn AssetLoader>);

        let report = preloader.preload_all(&assets, None).await.unwrap();

        // `loaded` is appended in completion order: the 20ms fonts settle
        // before the 30ms stylesheet
        assert_eq!(report.success_rate, 100);
        assert!(report.failed.is_empty());
        let mut loaded = report.loaded.clone();
        loaded.sort();
        let mut expected = assets.clone();
        expected.sort();
        assert_eq!(loaded, expected);
        assert_eq!(report.loaded.last().map(String::as_str), Some("style.css"));
        // Never dispatched through the loader
        assert!(loader.dispatch_times().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_thirteen_assets_issue_three_spaced_batches() {
        let assets = urls(13);
        let loader = Arc::new(MockLoader::new(&[]));
        let preloader = BatchPreloader::new(Arc::clone(&loader) as Arc<dyn AssetLoader>);

        preloader.preload_all(&assets, None).await.unwrap();

        let times = loader.dispatch_times();
        assert_eq!(times.len(), 13);

        let mut distinct: Vec<Instant> = times.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), 3, "expected exactly 3 batch issue points");
        assert!(distinct[1] - distinct[0] >= Duration::from_millis(200));
        assert!(distinct[2] - distinct[1] >= Duration::from_millis(200));

        // Batch sizes: 6, 6, 1
        let batch_count = |t: Instant| times.iter().filter(|&&x| x == t).count();
        assert_eq!(batch_count(distinct[0]), 6);
        assert_eq!(batch_count(distinct[1]), 6);
        assert_eq!(batch_count(distinct[2]), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_sessions_are_independent() {
        let loader = Arc::new(MockLoader::new(&["img-0.webp"]));
        let preloader = Arc::new(BatchPreloader::new(loader as Arc<dyn AssetLoader>));

        let a = {
            let p = Arc::clone(&preloader);
            tokio::spawn(async move { p.preload_all(&urls(7), None).await })
        };
        let b = {
            let p = Arc::clone(&preloader);
            tokio::spawn(
                async move { p.preload_all(&["other.webp".to_string()], None).await },
            )
        };

        let report_a = a.await.unwrap().unwrap();
        let report_b = b.await.unwrap().unwrap();

        assert_eq!(report_a.total, 7);
        assert_eq!(report_a.failed, vec!["img-0.webp"]);
        assert_eq!(report_b.total, 1);
        assert_eq!(report_b.loaded, vec!["other.webp"]);
    }
}
