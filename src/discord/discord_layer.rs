// Discord layer - the command seam, embeds, commands and the event handler.

#[path = "command.rs"]
pub mod command;

#[path = "embed.rs"]
pub mod embed;

#[path = "handler.rs"]
pub mod handler;

#[path = "commands/command_catalog.rs"]
pub mod commands;

// Re-export the types most of the layer deals in.
pub use command::{Data, SlashCommand};
pub use handler::Handler;
