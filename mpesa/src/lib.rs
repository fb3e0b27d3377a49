// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Client for the M-Pesa (Daraja) gateway.
//!
//! The client validates inputs, obtains and refreshes the bearer token,
//! derives the security credential required by privileged operations and
//! sends JSON requests through the transport configured on [`Context`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use mpesa::{Config, Mpesa};
//! use mpesa_core::{Context, OsEnv};
//! use mpesa_file_read_tokio::TokioFileRead;
//! use mpesa_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> mpesa_core::Result<()> {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     // Load MPESA_* variables from the environment.
//!     let config = Config::from_env(&ctx)?;
//!     let mpesa = Mpesa::new(ctx, config);
//!
//!     let resp = mpesa
//!         .b2c("BusinessPayment")
//!         .send(100, "254708374149", "refund", "")
//!         .await?;
//!     println!("{}", resp.body());
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Every operation returns [`mpesa_core::Error`]:
//!
//! - internal errors for invalid input, missing configuration and transport
//!   failures; no request is sent for invalid input.
//! - client errors for 4xx responses.
//! - server errors for 5xx responses.

pub mod constants;

mod config;
pub use config::{Config, Environment, IdentifierType, CONFIG_KEYS};

mod dispatcher;
pub use dispatcher::{Dispatcher, Response};

mod auth;
pub use auth::{Auth, Token};

mod credential;
pub use credential::{load_public_key, SecurityCredential};

mod client;
pub use client::Mpesa;

mod b2c;
pub use b2c::B2C;
mod b2b;
pub use b2b::B2B;
mod c2b;
pub use c2b::C2B;
