pub mod notifier;

pub use notifier::{DeliveryError, NotificationResult, NotifierPlugin};

#[cfg(test)]
pub use notifier::MockNotifierPlugin;
