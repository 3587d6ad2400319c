//! linguabridge: a translation page driven over an injected surface, the
//! HTTP client it talks through, and the backend that serves it.

pub mod client;
pub mod config;
pub mod error;
pub mod language;
pub mod page;
pub mod routes;
pub mod state;
pub mod translate;
