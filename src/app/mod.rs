pub mod bot;

pub use bot::RelayBot;
