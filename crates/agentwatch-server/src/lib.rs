//! agentwatch server library - HTTP/WebSocket host for worker activity presence.
//!
//! Routes, WebSocket handlers, and application state live here so integration
//! tests can build the same router as `main.rs`.

pub mod config;
pub mod global_ws;
pub mod logging;
pub mod routes;
pub mod state;
