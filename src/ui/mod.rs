pub mod command;
pub mod render;

pub use command::Command;
