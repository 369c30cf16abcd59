//! Core domain + application logic for the TikTok relay bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the tikwm
//! extraction API live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod link;
pub mod logging;
pub mod ports;
pub mod rate_limit;
pub mod replies;

pub use errors::{Error, Result};
