//! Core types and trait definitions for the Spark discover client.
//!
//! This crate is deliberately free of HTTP, database and UI dependencies.
//! All other crates depend on it.

// Native `async fn` in traits; the futures' `Send` bounds are spelled out
// where they matter.
#![allow(async_fn_in_trait)]

pub mod age;
pub mod cache;
pub mod error;
pub mod profile;
pub mod session;
pub mod source;
pub mod subscription;

pub use error::{Error, Result};
