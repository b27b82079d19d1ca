//! Service layer for mission-chat
//!
//! The question-to-results pipeline between the HTTP/CLI front ends and the
//! llm/storage crates: connectivity probe, SQL generation, safety validation,
//! execution and per-session chat history.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod chat_service;
mod connectivity;
mod error;
mod generator;
mod validator;

pub use chat_service::ChatService;
pub use connectivity::{ConnectivityCheck, SkipConnectivityCheck, TcpConnectivityCheck};
pub use error::{ErrorKind, PipelineError, ServiceError};
pub use generator::QueryGenerator;
pub use validator::{DENYLIST, SafetyValidator, ValidatedQuery};
