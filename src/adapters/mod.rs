// Adapters layer: concrete clients for the chat platform, GitHub and the AI endpoint.

pub mod completion;
pub mod github;
pub mod telegram;

pub use completion::CompletionClient;
pub use github::GitHubClient;
pub use telegram::TelegramApi;
