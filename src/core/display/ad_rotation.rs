use std::collections::HashSet;

pub const SHOW_ADS_GLOBAL_KEY: &str = "tv_show_ads_global";
pub const SELECTED_AD_IDS_KEY: &str = "tv_selected_ad_ids";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdAsset {
    pub id: String,
    pub filename: String,
    pub mimetype: String,
    pub filepath: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdKind {
    Image,
    Video,
    Unsupported,
}

impl AdAsset {
    pub fn kind(&self) -> AdKind {
        let mimetype = self.mimetype.to_ascii_lowercase();
        if mimetype.starts_with("image/") {
            AdKind::Image
        } else if mimetype.starts_with("video/") {
            AdKind::Video
        } else {
            AdKind::Unsupported
        }
    }
}

/// Joins a backend-relative file path onto the media origin.
pub fn resolve_media_url(base_url: &str, filepath: &str) -> String {
    if filepath.is_empty() {
        return String::new();
    }
    let base = base_url.trim_end_matches('/');
    if filepath.starts_with('/') {
        format!("{base}{filepath}")
    } else {
        format!("{base}/{filepath}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdSettings {
    pub show_ads_globally: bool,
    pub allowed_ad_ids: HashSet<String>,
}

impl Default for AdSettings {
    fn default() -> Self {
        Self {
            show_ads_globally: true,
            allowed_ad_ids: HashSet::new(),
        }
    }
}

/// Parses the stored `tv_show_ads_global` value (a JSON boolean).
pub fn parse_show_ads(raw: &str) -> Option<bool> {
    serde_json::from_str::<bool>(raw.trim()).ok()
}

/// Parses the stored `tv_selected_ad_ids` value (a JSON array). Numeric ids are stringified.
pub fn parse_allowed_ad_ids(raw: &str) -> Option<HashSet<String>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(raw.trim()).ok()?;
    values
        .into_iter()
        .map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct AdRotation {
    catalog: Vec<AdAsset>,
    settings: AdSettings,
    current_index: usize,
}

impl AdRotation {
    pub fn new(settings: AdSettings) -> Self {
        Self {
            catalog: Vec::new(),
            settings,
            current_index: 0,
        }
    }

    pub fn set_catalog(&mut self, catalog: Vec<AdAsset>) {
        self.catalog = catalog;
        self.clamp_index();
    }

    pub fn set_show_ads_globally(&mut self, show: bool) {
        self.settings.show_ads_globally = show;
    }

    pub fn set_allowed_ad_ids(&mut self, ids: HashSet<String>) {
        self.settings.allowed_ad_ids = ids;
        self.clamp_index();
    }

    pub fn settings(&self) -> &AdSettings {
        &self.settings
    }

    /// Allowed ads in catalog order.
    pub fn visible(&self) -> Vec<&AdAsset> {
        self.catalog
            .iter()
            .filter(|ad| self.settings.allowed_ad_ids.contains(&ad.id))
            .collect()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> Option<&AdAsset> {
        let visible = self.visible();
        visible
            .get(self.current_index)
            .or_else(|| visible.first())
            .copied()
    }

    /// Advances to the next visible ad. Returns true when the index moved.
    pub fn tick(&mut self) -> bool {
        self.clamp_index();
        let len = self.visible().len();
        if len <= 1 {
            return false;
        }
        self.current_index = (self.current_index + 1) % len;
        true
    }

    fn clamp_index(&mut self) {
        if self.current_index >= self.visible().len() {
            self.current_index = 0;
        }
    }
}
