//! Formulary - Terminal Formula Calculator Library
//!
//! Keep a list of named arithmetic formulas, fill in their free variables,
//! evaluate them, and keep a running history of results.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
