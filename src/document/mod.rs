//! Installer document subsystem.
//!
//! # Data Flow
//! ```text
//! installer YAML file
//!     → store.rs (read, parse)
//!     → value.rs (ConfigDocument of tagged ConfigValues, order kept)
//!     → bridge (JSON read / partial updates)
//!     → store.rs (render, temp file, rename into place)
//! ```
//!
//! # Design Decisions
//! - Scalars keep their native type end to end; the YAML serializer renders
//!   booleans and numbers canonically
//! - Every save is a full rewrite of the in-memory document
//! - Saves are atomic per call (rename), with no cross-call locking here

pub mod store;
pub mod value;

pub use store::DocumentStore;
pub use value::{ConfigDocument, ConfigValue, Mapping};
