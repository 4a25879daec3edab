//! Shared types for the agentwatch activity monitor.

mod activity;
mod log;
mod presence;
mod worker;
mod ws;

pub use activity::*;
pub use log::*;
pub use presence::*;
pub use worker::*;
pub use ws::*;
