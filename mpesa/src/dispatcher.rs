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

use bytes::Bytes;
use http::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use log::{debug, error};
use mpesa_core::{Context, Error, RequestParams, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Response returned by the gateway for a successful request.
///
/// The body is kept as raw JSON text; use [`Response::json`] to decode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    body: String,
    headers: String,
    status_code: u16,
}

impl Response {
    /// Create a new response. Body and headers are trimmed.
    pub fn new(body: &str, headers: &str, status_code: u16) -> Self {
        Self {
            body: body.trim().to_string(),
            headers: headers.trim().to_string(),
            status_code,
        }
    }

    /// Raw JSON body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Response headers serialized as a JSON object of name to values.
    pub fn headers(&self) -> &str {
        &self.headers
    }

    /// HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Decode the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| Error::internal("failed to parse response body").with_source(e))
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

/// Dispatcher sends JSON requests to the gateway and classifies the outcome.
///
/// - 4xx responses become client errors.
/// - 5xx responses become server errors.
/// - transport failures become internal errors.
///
/// Both client and server errors carry the response body, the status code and
/// the parameters of the request that failed.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    ctx: Context,
}

impl Dispatcher {
    /// Create a dispatcher sending requests through `ctx`.
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// The context requests are sent through.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Send a request.
    ///
    /// `Accept: application/json` and `Cache-Control: no-cache` are always set;
    /// `headers` are applied after them and override them. `body` defaults to
    /// an empty JSON object and is always sent JSON encoded.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: Option<HeaderMap>,
    ) -> Result<Response> {
        let mut all_headers = HeaderMap::new();
        all_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        all_headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        all_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(headers) = headers {
            for name in headers.keys() {
                all_headers.remove(name);
            }
            for (name, value) in headers.iter() {
                all_headers.append(name.clone(), value.clone());
            }
        }

        let body = serde_json::to_string(&body.unwrap_or_else(|| Value::Object(Default::default())))?;

        let params = RequestParams {
            url: uri.to_string(),
            method: method.to_string(),
            headers: all_headers
                .iter()
                .map(|(k, v)| {
                    (
                        k.as_str().to_string(),
                        String::from_utf8_lossy(v.as_bytes()).to_string(),
                    )
                })
                .collect(),
            body: body.clone(),
        };

        let mut req = http::Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(Bytes::from(body))?;
        *req.headers_mut() = all_headers;

        debug!("sending {method} {uri}");
        let resp = self.ctx.http_send(req).await?;

        let status = resp.status();
        let headers = serialize_headers(resp.headers())?;
        let body = String::from_utf8_lossy(resp.body()).to_string();

        if status.is_client_error() {
            error!("{method} {uri} got client error: {status}");
            return Err(Error::client(format!(
                "client error: `{method} {uri}` resulted in a `{status}` response"
            ))
            .with_response(status.as_u16(), body.trim())
            .with_request(params));
        }

        if status.is_server_error() {
            error!("{method} {uri} got server error: {status}");
            return Err(Error::server(format!(
                "server error: `{method} {uri}` resulted in a `{status}` response"
            ))
            .with_response(status.as_u16(), body.trim())
            .with_request(params));
        }

        debug!("{method} {uri} got response: {status}");
        Ok(Response::new(&body, &headers, status.as_u16()))
    }
}

fn serialize_headers(headers: &HeaderMap) -> Result<String> {
    let mut map: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        map.entry(name.as_str())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).to_string());
    }

    Ok(serde_json::to_string(&map)?)
}
