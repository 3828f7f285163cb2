// Ad rotation runner.
//
// Purpose
// - Advance the visible ad on a fixed timer and follow the admin's ad settings.
//
// Responsibilities
// - Poll the settings store and apply a key only when its raw stored value changed.
// - Load the ad catalog once; retry on the settings cadence until it succeeds.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::display_store::DisplayStore;
use crate::core::display::ad_rotation::{
    SELECTED_AD_IDS_KEY, SHOW_ADS_GLOBAL_KEY, parse_allowed_ad_ids, parse_show_ads,
};
use crate::core::ports::{QueueBackend, SettingsStore};

pub struct AdRotationRunner<TSettings, TBackend>
where
    TSettings: SettingsStore + ?Sized + 'static,
    TBackend: QueueBackend + ?Sized + 'static,
{
    settings: Arc<TSettings>,
    backend: Arc<TBackend>,
    store: Arc<DisplayStore>,
    rotation_interval: Duration,
    settings_interval: Duration,
    last_show_raw: Option<String>,
    last_ids_raw: Option<String>,
    catalog_loaded: bool,
}

impl<TSettings, TBackend> AdRotationRunner<TSettings, TBackend>
where
    TSettings: SettingsStore + ?Sized + 'static,
    TBackend: QueueBackend + ?Sized + 'static,
{
    pub fn new(
        settings: Arc<TSettings>,
        backend: Arc<TBackend>,
        store: Arc<DisplayStore>,
        rotation_interval: Duration,
        settings_interval: Duration,
    ) -> Self {
        Self {
            settings,
            backend,
            store,
            rotation_interval,
            settings_interval,
            last_show_raw: None,
            last_ids_raw: None,
            catalog_loaded: false,
        }
    }

    pub async fn load_catalog(&mut self) -> bool {
        match self.backend.ads().await {
            Ok(ads) => {
                info!(ads = ads.len(), "ad catalog loaded");
                self.store.with_ads(|rotation| rotation.set_catalog(ads)).await;
                self.catalog_loaded = true;
            }
            Err(error) => warn!(%error, "ad catalog unavailable; showing placeholder"),
        }
        self.catalog_loaded
    }

    async fn read_changed(&self, key: &str, last: Option<&str>) -> Option<String> {
        match self.settings.get(key).await {
            Ok(Some(raw)) if Some(raw.as_str()) != last && !raw.is_empty() => Some(raw),
            Ok(_) => None,
            Err(error) => {
                warn!(key, %error, "could not read ad settings");
                None
            }
        }
    }

    /// Returns true when at least one setting was applied.
    pub async fn poll_settings(&mut self) -> bool {
        let mut applied = false;

        if let Some(raw) = self.read_changed(SHOW_ADS_GLOBAL_KEY, self.last_show_raw.as_deref()).await {
            match parse_show_ads(&raw) {
                Some(show) => {
                    debug!(show, "ad visibility changed");
                    self.store.with_ads(|rotation| rotation.set_show_ads_globally(show)).await;
                    applied = true;
                }
                None => warn!(key = SHOW_ADS_GLOBAL_KEY, raw = %raw, "ignoring unparseable setting"),
            }
            self.last_show_raw = Some(raw);
        }

        if let Some(raw) = self.read_changed(SELECTED_AD_IDS_KEY, self.last_ids_raw.as_deref()).await {
            match parse_allowed_ad_ids(&raw) {
                Some(ids) => {
                    debug!(allowed = ids.len(), "allowed ads changed");
                    self.store.with_ads(|rotation| rotation.set_allowed_ad_ids(ids)).await;
                    applied = true;
                }
                None => warn!(key = SELECTED_AD_IDS_KEY, raw = %raw, "ignoring unparseable setting"),
            }
            self.last_ids_raw = Some(raw);
        }

        applied
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        let mut settings_ticker = tokio::time::interval(self.settings_interval);
        settings_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut rotation_ticker =
            tokio::time::interval_at(Instant::now() + self.rotation_interval, self.rotation_interval);
        rotation_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("ad rotation shutting down");
                    break;
                }
                _ = settings_ticker.tick() => {
                    if !self.catalog_loaded {
                        self.load_catalog().await;
                    }
                    self.poll_settings().await;
                }
                _ = rotation_ticker.tick() => {
                    self.store.with_ads(|rotation| rotation.tick()).await;
                }
            }
        }
    }
}
