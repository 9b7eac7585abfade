mod catalog;
mod conversation;
mod message;
mod relay;
mod role;
mod slash_commands;

pub use catalog::*;
pub use conversation::*;
pub use message::*;
pub use relay::*;
pub use role::*;
pub use slash_commands::*;
