pub mod traits;
pub mod notifiers;

pub use traits::{DeliveryError, NotificationResult, NotifierPlugin};
pub use notifiers::TelegramNotifier;
