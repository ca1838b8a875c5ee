pub mod api;
pub mod console;
pub mod discord;

pub use api::Notifier;
pub use console::ConsoleNotifier;
pub use discord::DiscordNotifier;
