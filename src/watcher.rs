use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::fetcher::ListingFetcher;
use crate::models::{Listing, field_or_placeholder};
use crate::notifier::{ListingNotifier, NotificationOutcome};
use crate::plugins::notifiers::{TelegramConfig, TelegramNotifier};
use crate::store::ListingStore;
use crate::utils::error::Result;
use crate::utils::retry::RetryPolicy;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub fetched: usize,
    pub new: usize,
    pub sent: usize,
    pub failed: usize,
}

/// One fetch → dedup → notify pass over the listing page.
pub struct Watcher {
    fetcher: ListingFetcher,
    store: ListingStore,
    notifier: ListingNotifier,
}

impl Watcher {
    pub fn new(fetcher: ListingFetcher, store: ListingStore, notifier: ListingNotifier) -> Self {
        Self {
            fetcher,
            store,
            notifier,
        }
    }

    /// Wires up the Telegram notifier and the on-disk store from `config`.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = ListingFetcher::new(&config.source)?;
        let store = ListingStore::open(&config.database.path).await?;
        let plugin = TelegramNotifier::new(TelegramConfig::from_settings(&config.telegram)?)?;
        let notifier = ListingNotifier::new(Arc::new(plugin), RetryPolicy::from(&config.retry));

        Ok(Self::new(fetcher, store, notifier))
    }

    pub fn store(&self) -> &ListingStore {
        &self.store
    }

    /// Runs the whole sequence once. Notifications go out one at a time in
    /// page order; a listing whose alert times out does not hold back the
    /// rest.
    pub async fn run_once(&self) -> Result<RunSummary> {
        self.store.init().await?;

        let listings: Vec<Listing> = self
            .fetcher
            .fetch()
            .await?
            .into_iter()
            .map(Listing::new)
            .collect();
        let fetched = listings.len();

        let new_listings = self.store.insert_all_new(listings).await?;

        let mut summary = RunSummary {
            fetched,
            new: new_listings.len(),
            ..RunSummary::default()
        };

        for listing in &new_listings {
            info!(
                address = field_or_placeholder(&listing.address),
                "Sending message for apartment"
            );
            match self.notifier.notify(listing).await? {
                NotificationOutcome::Sent { .. } => summary.sent += 1,
                NotificationOutcome::Failed { .. } => summary.failed += 1,
            }
        }

        Ok(summary)
    }
}
