//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware stack, graceful shutdown)
//!     → request.rs (request ID)
//!     → application router (default, app.toml or custom)
//!     → response.rs (shared handlers, fixed responses)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, REQUEST_ID_HEADER};
pub use server::{Server, ServerError};
