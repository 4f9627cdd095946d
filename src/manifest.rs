//! Static asset manifest for the CRMD site.
//!
//! Maps each page to the assets it needs, plus a `core` bucket that every
//! page shares. The compiled-in default mirrors the deployed site; a
//! `manifest.json` in the config directory overrides it when present.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Page documents covered by the manifest, in bucket order.
pub const PAGES: &[&str] = &[
    "index.html",
    "about.html",
    "rules.html",
    "contact.html",
    "testimonials.html",
    "sponsors.html",
];

/// Per-page asset lists. Bucket order is fixed: core, index, about, rules,
/// contact, testimonials, sponsors. Lists are not deduplicated.
///
/// An override file replaces the manifest wholesale: buckets it omits are
/// empty, not backfilled from the compiled-in lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub core: Vec<String>,
    #[serde(default)]
    pub index: Vec<String>,
    #[serde(default)]
    pub about: Vec<String>,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub contact: Vec<String>,
    #[serde(default)]
    pub testimonials: Vec<String>,
    #[serde(default)]
    pub sponsors: Vec<String>,
}

impl AssetManifest {
    /// Load a manifest override from `path`, or fall back to the compiled-in
    /// default when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// All assets as one ordered list, buckets concatenated in fixed order.
    pub fn get_all(&self) -> Vec<String> {
        let buckets = [
            &self.core,
            &self.index,
            &self.about,
            &self.rules,
            &self.contact,
            &self.testimonials,
            &self.sponsors,
        ];
        buckets.iter().flat_map(|b| b.iter().cloned()).collect()
    }

    /// All assets reordered for the current device: universal assets first,
    /// then assets matching the device, then the other device's. Relative
    /// order within each group is preserved.
    pub fn get_optimized(&self, is_desktop: bool) -> Vec<String> {
        let mut universal = Vec::new();
        let mut matching = Vec::new();
        let mut other = Vec::new();

        for asset in self.get_all() {
            let desktop = asset.contains("desktop");
            let mobile = asset.contains("mobile");
            if !desktop && !mobile {
                universal.push(asset);
            } else if (is_desktop && desktop) || (!is_desktop && mobile) {
                matching.push(asset);
            } else {
                other.push(asset);
            }
        }

        universal.extend(matching);
        universal.extend(other);
        universal
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            core: list(&[
                "Assests/favicon.ico",
                "style.css",
                "Fonts/kodex/Kodex-Regular.ttf",
                "Fonts/kodex/Kodex-Regular.otf",
            ]),
            index: list(&[
                "Assests/chess_bg_desktop.webp",
                "Assests/chess_bg_mobile.webp",
                "Assests/king_desktop.webp",
                "Assests/king_mobile.webp",
                "Assests/king_desktop_fade.webp",
                "Assests/king_mobile_fade.webp",
                "Assests/crmd_landing_desktop_title.webp",
                "Assests/crmd_landing_mobile_title.webp",
                "Assests/crmd_landing_desktop_hand.webp",
                "Assests/Crmd_load.webp",
            ]),
            about: list(&[
                "Assests/crmd_desktop_bg.webp",
                "Assests/crmd_mobile_bg.webp",
                "Assests/crmd_desktop_hand.webp",
                "Assests/crmd_mobile_hand.webp",
                "Assests/CRMD_Poster_bg.webp",
            ]),
            // Rules and contact reuse CRMD_Poster_bg.webp from the about bucket
            rules: Vec::new(),
            contact: Vec::new(),
            testimonials: list(&[
                "Assests/Images/Afroz.webp",
                "Assests/Images/Al Qadri.webp",
                "Assests/Images/Arnab Goswami.webp",
                "Assests/Images/Dolly thakore.webp",
                "Assests/Images/Madhur bhandarkar.webp",
                "Assests/Images/Mahesh bhatt.webp",
            ]),
            sponsors: list(&[
                "Assests/sponsors/al-qadri.webp",
                "Assests/sponsors/balaji.webp",
                "Assests/sponsors/evepaper.webp",
                "Assests/sponsors/ishtikutum.webp",
                "Assests/sponsors/klaw-snacks.webp",
                "Assests/sponsors/lemonx.webp",
                "Assests/sponsors/mod.webp",
                "Assests/sponsors/negative.webp",
                "Assests/sponsors/no-escape.webp",
                "Assests/sponsors/nutri-snack-box.webp",
                "Assests/sponsors/panaa.webp",
                "Assests/sponsors/sizzle-and-sip.webp",
                "Assests/sponsors/sky-breeze.webp",
                "Assests/sponsors/smaaash.webp",
                "Assests/sponsors/stylish.webp",
                "Assests/sponsors/the-pulp.webp",
                "Assests/sponsors/total-sports&fitness.webp",
                "Assests/sponsors/valencia.webp",
                "Assests/sponsors/zenforest.webp",
            ]),
        }
    }
}
