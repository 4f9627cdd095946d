//! Instant-navigation decisions.
//!
//! Once a warm-up record is fresh, page links get two enhancements: clicks
//! fade the page out before navigating, and hovers speculatively prefetch
//! the target document. The enhancer is a pure decision core: it consumes
//! link events and returns the action the host should perform, so the
//! DOM-less parts (guard state, delays, hint bookkeeping) stay testable.

use std::time::Duration;

use tracing::debug;

/// Fade-out duration before navigating, in milliseconds.
const FADE_MS: u64 = 200;

/// Navigation delay when the target is the home page, in milliseconds.
/// Slightly longer than [`NAV_DELAY_MS`] so the heavier page starts clean.
const HOME_NAV_DELAY_MS: u64 = 300;

/// Navigation delay for every other page, in milliseconds.
const NAV_DELAY_MS: u64 = 200;

/// A link interaction observed by the host.
#[derive(Debug, Clone)]
pub enum NavEvent {
    Click { href: String },
    Hover { href: String },
}

/// What the host should do in response to a link event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// Fade the page out over `fade`, then navigate to `href` after `delay`.
    Navigate {
        href: String,
        fade: Duration,
        delay: Duration,
    },
    /// Issue a prefetch hint for `href`.
    Prefetch { href: String },
}

/// Whether a link points at a page document this site enhances.
pub fn is_page_link(href: &str) -> bool {
    href.ends_with(".html")
}

fn is_going_home(href: &str) -> bool {
    href.contains("index.html") || href.ends_with('/')
}

/// Layers fade transitions and hover prefetching over page links.
pub struct NavigationEnhancer {
    enabled: bool,
    mid_fade: bool,
    hints: Vec<String>,
}

impl NavigationEnhancer {
    /// Build an enhancer. `enabled` should be the freshness verdict; a cold
    /// cache keeps default navigation untouched.
    pub fn new(enabled: bool) -> Self {
        if enabled {
            debug!("Instant navigation enabled");
        }
        Self {
            enabled,
            mid_fade: false,
            hints: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Prefetch hints issued so far, in order. Repeated hovers repeat the
    /// hint; downstream consumers dedup on their own.
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Decide the action for a link event. `None` means default handling.
    pub fn handle(&mut self, event: NavEvent) -> Option<NavAction> {
        if !self.enabled {
            return None;
        }

        match event {
            NavEvent::Click { href } => {
                if !is_page_link(&href) || self.mid_fade {
                    // A fade is already running; let the pending navigation win
                    return None;
                }
                self.mid_fade = true;
                let delay = if is_going_home(&href) {
                    Duration::from_millis(HOME_NAV_DELAY_MS)
                } else {
                    Duration::from_millis(NAV_DELAY_MS)
                };
                debug!(href = %href, delay_ms = delay.as_millis() as u64, "Fading out for navigation");
                Some(NavAction::Navigate {
                    href,
                    fade: Duration::from_millis(FADE_MS),
                    delay,
                })
            }
            NavEvent::Hover { href } => {
                if !is_page_link(&href) {
                    return None;
                }
                self.hints.push(href.clone());
                Some(NavAction::Prefetch { href })
            }
        }
    }
}
