//! Application subsystem.
//!
//! # Data Flow
//! ```text
//! Working directory
//!     → resolver.rs (app.toml present? contract check)
//!     → ApplicationDefinition (Default | User | Custom)
//!     → construct() → Box<dyn Application>
//!     → init(argv) → app() + settings() → server
//! ```
//!
//! # Design Decisions
//! - Applications are values implementing `Application`; the launcher
//!   never inspects what kind it holds after construction
//! - `app.toml` is checked structurally, not by any type hierarchy
//! - Rust embedders register a `Custom` factory instead of writing TOML

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;

use crate::cli::ParsedCommand;
use crate::config::ServerSettings;

pub mod default;
pub mod resolver;
pub mod user;

pub use default::DefaultApplication;
pub use resolver::{ApplicationResolver, ResolveError, APP_DEFINITION_FILE};
pub use user::{ApplicationError, UserApplication, UserManifest};

/// Capability contract of a launchable application.
///
/// `app` and `settings` are only meaningful after `init` has succeeded.
#[async_trait]
pub trait Application: Send {
    /// Prepare the application from the parsed command line.
    async fn init(&mut self, argv: &ParsedCommand) -> anyhow::Result<()>;

    /// Request-handler surface served by the server.
    fn app(&self) -> Option<Router>;

    /// Server configuration.
    fn settings(&self) -> Option<&ServerSettings>;
}

/// Factory for applications supplied from Rust code.
pub type ApplicationFactory = Arc<dyn Fn() -> Box<dyn Application> + Send + Sync>;

/// How to build the application for this process.
#[derive(Clone, Default)]
pub enum ApplicationDefinition {
    /// The framework's built-in application.
    #[default]
    Default,
    /// An application declared in `app.toml`.
    User(Arc<UserManifest>),
    /// An application registered by an embedding program.
    Custom {
        name: String,
        factory: ApplicationFactory,
    },
}

impl ApplicationDefinition {
    /// Definition built by `factory`.
    pub fn custom<F, A>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
        A: Application + 'static,
    {
        Self::Custom {
            name: name.into(),
            factory: Arc::new(move || Box::new(factory()) as Box<dyn Application>),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::User(manifest) => manifest.name(),
            Self::Custom { name, .. } => name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::User(_) => "user",
            Self::Custom { .. } => "custom",
        }
    }

    /// Construct a fresh, uninitialized instance.
    pub fn construct(&self) -> Box<dyn Application> {
        match self {
            Self::Default => Box::new(DefaultApplication::new()),
            Self::User(manifest) => Box::new(UserApplication::new(Arc::clone(manifest))),
            Self::Custom { factory, .. } => factory(),
        }
    }
}

impl fmt::Debug for ApplicationDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::User(manifest) => f.debug_tuple("User").field(manifest).finish(),
            Self::Custom { name, .. } => f
                .debug_struct("Custom")
                .field("name", name)
                .finish_non_exhaustive(),
        }
    }
}
