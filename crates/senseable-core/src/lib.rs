//! Core types and trait definitions for the SenseAble rephrasing service.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the domain model, the [`store::ProfileStore`] abstraction, and the
//! pure stages of the rephrase pipeline (prompt assembly, suggestion
//! extraction, version assignment).

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod history;
pub mod preference;
pub mod prompt;
pub mod store;
pub mod suggestion;
pub mod tag;
pub mod user;

pub use error::{Error, Result};
