pub mod alert_api;
pub mod notifications;
pub mod session;

pub use alert_api::{AlertApiClient, AlertStore};
pub use notifications::{Notification, Notifier, Severity};
pub use session::Session;
