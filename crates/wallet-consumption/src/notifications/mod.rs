//! The notification-item processing pipeline.
//!
//! Notifications carry side effects a peer asks us to apply locally. The
//! controller runs them as a compensating-transaction saga: items apply in
//! declared order, and any failure unwinds the already-applied items in
//! reverse order before the notification is marked errored.

pub mod controller;
pub mod items;
pub mod local_notification;
pub mod processor;
pub mod processors;
pub mod registry;

pub use controller::NotificationsController;
pub use items::{NotificationItem, NotificationItemKind};
pub use local_notification::{LocalNotification, Notification, NotificationStatus};
pub use processor::NotificationItemProcessor;
pub use registry::NotificationItemProcessorRegistry;
