//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot.
//! This includes the per-room session store, the template registry and command routing.

pub mod router;
pub mod session;
pub mod templates;
