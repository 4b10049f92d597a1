//! Telegram Bot API adapters: inbound updates source and outbound notifier

pub mod notifier;
pub mod types;
pub mod updates;

pub use notifier::TelegramNotifier;
pub use updates::TelegramUpdatesSource;
