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

//! Reqwest-based HTTP transport for the M-Pesa client.
//!
//! ## Example
//!
//! ```no_run
//! use mpesa_core::Context;
//! use mpesa_http_send_reqwest::ReqwestHttpSend;
//!
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
//! ```

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use mpesa_core::HttpSend;
use reqwest::{Client, Request};

/// Reqwest-based implementation of the `HttpSend` trait.
///
/// Every response is handed back as-is, status classification happens in the
/// client's dispatcher.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Send requests through `client`, for example one with timeouts or a proxy configured.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> anyhow::Result<http::Response<Bytes>> {
        let target = format!("{} {}", req.method(), req.uri());

        let req = Request::try_from(req)
            .with_context(|| format!("invalid gateway request `{target}`"))?;
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .with_context(|| format!("failed to send gateway request `{target}`"))?
            .into();

        let status = resp.status();
        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .with_context(|| format!("failed to read `{status}` response body of `{target}`"))?
            .to_bytes();
        Ok(http::Response::from_parts(parts, bs))
    }
}
