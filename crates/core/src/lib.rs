//! Core types for mission-chat
//!
//! This crate contains domain types shared across all other crates: chat turns,
//! result sets, the fixed `MISSIONS` schema descriptor and runtime configuration.

mod chat;
mod config;
pub mod constants;
mod env_config;
mod error;
mod schema;

pub use chat::*;
pub use config::*;
pub use env_config::*;
pub use error::*;
pub use schema::*;
