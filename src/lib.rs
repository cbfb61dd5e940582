//! Installer bridge library.
//!
//! Serves an installer YAML document as order-preserving JSON and streams
//! the output of install/uninstall scripts to HTTP clients as it is produced.

// Core
pub mod bridge;
pub mod document;
pub mod error;
pub mod process;

// Service
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use bridge::ConfigBridge;
pub use config::ServiceConfig;
pub use document::{ConfigDocument, ConfigValue, DocumentStore};
pub use error::{Error, Result};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use process::{ProcessStreamer, StreamEvent};
