//! Small utility helpers for settings parsing, money formatting and host identifiers.
//!
//! Everything here is synchronous and side-effect free apart from logging.

pub mod config;
pub mod ids;
pub mod money;
