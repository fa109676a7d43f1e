pub mod commands;

pub use commands::{Cli, Commands, FeedCommands, FollowCommands, UserCommands};
