//! Core types and the content-management engine for Vitrine.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the section content shapes, the schema registry, the legacy migrator, the
//! lock and history types, the [`store::SectionStore`] abstraction, and the
//! [`manager::ContentManager`] that composes them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod content;
pub mod error;
pub mod lock;
pub mod manager;
pub mod migrate;
pub mod schema;
pub mod section;
pub mod store;

pub use error::{Error, ErrorKind, Result};
