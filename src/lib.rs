pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod restful;
pub mod source;
pub mod store;
pub mod telegram;
pub mod tracker;

pub use client::BybitClient;
pub use monitor::{run_cycle, CycleOutcome, Monitor};
pub use source::{Notifier, PositionSource};
pub use telegram::TelegramNotifier;
