//! Nightframe launcher library.

pub mod app;
pub mod cli;
pub mod config;
pub mod http;
pub mod info;
pub mod lifecycle;
pub mod observability;
pub mod platform;

pub use app::{Application, ApplicationDefinition};
pub use cli::{Launcher, ParsedCommand, Route};
pub use config::ServerSettings;
pub use http::Server;
pub use lifecycle::Shutdown;
