//! # attendd Server
//!
//! HTTP command endpoint for biometric attendance terminals.
//!
//! This crate provides:
//! - Command handlers (`reg`, `sendlog`, `checklive`, `senduser`, `sendqrcode`)
//! - The command router mapping handler outcomes to HTTP replies
//! - The axum application with monitoring routes and middleware
//! - HTTP/HTTPS bootstrap
//!
//! # Architecture
//!
//! Every request is a stateless read-modify-write against one JSON
//! collection file. The server keeps no device sessions and no records in
//! memory between requests.
//!
//! # Protocol
//!
//! Terminals `POST /api` with a JSON object carrying `cmd`:
//! 1. `reg` on boot, registering the terminal by serial number
//! 2. `checklive` periodically as a heartbeat
//! 3. `sendlog` with attendance events, answered with an access decision
//! 4. `senduser` when users are enrolled on the terminal
//! 5. `sendqrcode` when a QR code is presented
//!
//! Every reply carries `ret`, `result` and `cloudtime`.
//!
//! # Concurrency
//!
//! Overlapping requests against the same collection race and the later save
//! wins, unless [`ServerConfig::with_serialize_writes`] is enabled.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
pub mod http;
mod router;
mod server;

pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::{ServerError, ServerResult};
pub use handler::{CommandHandler, DeviceRequest, HandlerContext};
pub use router::CommandRouter;
pub use server::AttendServer;
