//! Infrastructure layer providing external service integrations.
//!
//! This module contains startup configuration, logging setup, history export
//! and clipboard access.

pub mod config;
pub mod logging;
pub mod export;
pub mod clipboard;

pub use config::*;
pub use export::*;
pub use clipboard::*;
