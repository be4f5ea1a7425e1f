use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::{Listing, field_or_placeholder};
use crate::plugins::traits::{DeliveryError, NotifierPlugin};
use crate::utils::error::Result;
use crate::utils::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent { attempts: usize, message_id: Option<String> },
    /// Every attempt timed out. Logged, not raised.
    Failed { attempts: usize },
}

/// Formats new listings and hands them to a notifier plugin, retrying on
/// timeouts.
pub struct ListingNotifier {
    plugin: Arc<dyn NotifierPlugin>,
    retry: RetryPolicy,
}

impl ListingNotifier {
    pub fn new(plugin: Arc<dyn NotifierPlugin>, retry: RetryPolicy) -> Self {
        Self { plugin, retry }
    }

    /// Sends the alert for one listing.
    ///
    /// Timeouts are retried per the retry policy; running out of attempts
    /// yields `NotificationOutcome::Failed` so the caller can carry on with
    /// the next listing. Any other delivery error is returned.
    pub async fn notify(&self, listing: &Listing) -> Result<NotificationOutcome> {
        let message = format_message(listing);
        let channel = self.plugin.name();
        let max_attempts = self.retry.max_attempts;
        let mut attempts = 0;

        let result = self
            .retry
            .run(
                |attempt| {
                    attempts = attempt;
                    if attempt > 1 {
                        warn!(channel, attempt, max_attempts, "Timed out. Retrying...");
                    }
                    self.plugin.send(&message)
                },
                DeliveryError::is_transient,
            )
            .await;

        match result {
            Ok(sent) => {
                info!(channel, hash = %listing.identity_hash, attempts, "Message sent successfully.");
                Ok(NotificationOutcome::Sent {
                    attempts,
                    message_id: sent.message_id,
                })
            }
            Err(e) if e.is_transient() => {
                error!(channel, hash = %listing.identity_hash, attempts, "Failed to send message after retries");
                Ok(NotificationOutcome::Failed { attempts })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Renders the alert text for a listing.
pub fn format_message(listing: &Listing) -> String {
    format!(
        "Neue Stadtwohnung gefunden am {}:\n\n\
         Adresse: {}\n\
         Zone: Zürich, {}\n\
         Bruttomiete: {} CHF\n\
         Zimmer: {}\n\
         Stockwerk: {}\n\
         Fläche: {}\n\
         Vermietung ab: {}\n\
         Direktlink Bewerbung: {}",
        listing.observed_date(),
        field_or_placeholder(&listing.address),
        field_or_placeholder(&listing.zone),
        field_or_placeholder(&listing.gross_rent),
        field_or_placeholder(&listing.rooms),
        field_or_placeholder(&listing.floor),
        field_or_placeholder(&listing.area),
        field_or_placeholder(&listing.move_in_date),
        listing.link_or_placeholder(),
    )
}
