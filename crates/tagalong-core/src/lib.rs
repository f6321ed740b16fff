//! Core types and trait definitions for Tagalong.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! It defines the domain records (users, events, photos, notifications), the
//! error taxonomy every layer reports in, the [`store::Store`] persistence
//! abstraction, and the external ports in [`ports`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod event;
pub mod notification;
pub mod photo;
pub mod ports;
pub mod store;
pub mod user;

pub use error::{Error, Result};
