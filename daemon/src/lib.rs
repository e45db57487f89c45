//! Gaze host-monitoring backend.
//!
//! Streams host CPU/RAM utilisation over a WebSocket, serves a bounded
//! process snapshot, and terminates processes on request.

pub mod collector;
pub mod config;
pub mod directory;
pub mod error;
pub mod executor;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod streamer;
