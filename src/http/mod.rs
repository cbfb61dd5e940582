//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID)
//!     → handlers.rs
//!         /config     → bridge (blocking pool) → JSON
//!         /install    → process streamer → streamed frames
//!         /uninstall  → process streamer → streamed frames
//!     → response.rs (error bodies, frames)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
