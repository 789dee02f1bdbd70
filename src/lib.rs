//! Tab rail: coordinator core for a floating overlay that shows every
//! open browser tab on every web page.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod bridge;
pub mod cli;
pub mod coordinator;
pub mod event_loop;
pub mod host;
pub mod logging;
pub mod managers;
pub mod message_handler;
pub mod overlay_client;
pub mod platform;
pub mod services;
pub mod types;
