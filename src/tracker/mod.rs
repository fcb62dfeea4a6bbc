pub mod format;
pub mod snapshot;
pub mod transition;

pub use format::{format_notification, format_notification_at};
pub use snapshot::{PositionRecord, PositionSnapshot, Side};
pub use transition::{detect_transitions, NotificationEvent, Transition};
