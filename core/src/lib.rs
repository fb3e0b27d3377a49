//! Core components for talking to the M-Pesa gateway.
//!
//! This crate provides the foundational types shared by the `mpesa` client
//! and its pluggable context implementations.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for file reading, HTTP sending, and environment access
//! - **Error**: The internal / client / server error taxonomy every operation reports
//! - **Validation**: Precondition checks run before a request is built
//!
//! ## Example
//!
//! ```no_run
//! use mpesa_core::{Context, HttpSend, StaticEnv};
//! use async_trait::async_trait;
//! use bytes::Bytes;
//!
//! #[derive(Debug)]
//! struct MyTransport;
//!
//! #[async_trait]
//! impl HttpSend for MyTransport {
//!     async fn http_send(&self, req: http::Request<Bytes>) -> anyhow::Result<http::Response<Bytes>> {
//!         // Hand the request to your http client here
//!         todo!()
//!     }
//! }
//!
//! let ctx = Context::new()
//!     .with_http_send(MyTransport)
//!     .with_env(StaticEnv::default());
//! ```
//!
//! ## Traits
//!
//! - [`FileRead`]: For asynchronous file reading
//! - [`HttpSend`]: For sending HTTP requests
//! - [`Env`]: For environment variable access
//!
//! ## Utilities
//!
//! - [`hash`]: Base64 and digest helpers
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction
//! - [`validate`]: Precondition checks

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;
pub mod validate;

mod context;
pub use context::{
    Context, Env, FileRead, HttpSend, NoopEnv, NoopFileRead, NoopHttpSend, OsEnv, StaticEnv,
};
mod error;
pub use error::{Error, ErrorKind, RequestParams, Result};
