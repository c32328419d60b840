//! rxlog CLI application: local chat history, recent drug interactions,
//! and the chat/prediction service that feeds them.

pub use backend::Backend;
pub use cmd::{Cli, Command};
pub use config::Config;
pub use consult::{Consult, Turn};

pub mod backend;
pub mod cmd;
pub mod config;
pub mod consult;
