//! # Command Handlers
//!
//! Contains specific handler functions for each supported command (e.g., template, name, finish).
//! These handlers are invoked by the Router.

pub mod cancel;
pub mod draft;
pub mod finish;
pub mod help;
