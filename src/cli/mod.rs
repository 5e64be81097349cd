//! Command line subsystem.
//!
//! # Data Flow
//! ```text
//! argv
//!     → args.rs (clap derive → ParsedCommand)
//!     → route.rs (help > info > version > run)
//!     → dispatch.rs (Launcher: print, or resolve + launch)
//! ```

pub mod args;
pub mod dispatch;
pub mod route;

pub use args::ParsedCommand;
pub use dispatch::Launcher;
pub use route::Route;
