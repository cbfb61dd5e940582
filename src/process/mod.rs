//! Process streaming subsystem.
//!
//! # Data Flow
//! ```text
//! POST /install
//!     → action.rs (argv: script, flag, document path)
//!     → streamer.rs spawns the child
//!         stdout reader ─┐
//!         stderr reader ─┴→ bounded mpsc → ProcessRun (Stream<StreamEvent>)
//!     → supervisor reaps the child, sends Done { exit_code }
//!     → HTTP body drains ProcessRun frame by frame
//! ```
//!
//! # Design Decisions
//! - Lines are forwarded as soon as they are read; nothing waits for exit
//! - Launch failures surface before any event, so no stream is opened
//! - When the consumer goes away the child is drained and reaped, or killed
//!   if `kill_on_disconnect` is set
//! - No timeouts: runs last as long as the script does

pub mod action;
pub mod event;
pub mod streamer;

pub use action::Action;
pub use event::{OutputSource, StreamEvent};
pub use streamer::{ProcessRun, ProcessStreamer, StreamerConfig};
