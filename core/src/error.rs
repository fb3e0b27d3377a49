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

use crate::utils::Redact;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The error type for every M-Pesa operation.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status_code: Option<u16>,
    body: Option<String>,
    request: Option<RequestParams>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller or configuration mistake detected before any request was sent.
    ///
    /// Empty or invalid fields, unknown enum values, out of range integers,
    /// sandbox-only operations in production, transport failures.
    Internal,

    /// The gateway rejected the request (HTTP 4xx).
    Client,

    /// The gateway failed to process the request (HTTP 5xx).
    Server,
}

/// The parameters of the request that produced a client or server error.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    /// Full request url.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Headers sent with the request.
    pub headers: BTreeMap<String, String>,
    /// JSON body sent with the request.
    pub body: String,
}

impl fmt::Debug for RequestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, String> = self
            .headers
            .iter()
            .map(|(k, v)| {
                let v = if k.eq_ignore_ascii_case("authorization") {
                    format!("{:?}", Redact::from(v))
                } else {
                    v.clone()
                };
                (k.as_str(), v)
            })
            .collect();

        f.debug_struct("RequestParams")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            body: None,
            request: None,
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach the gateway response status code and raw body.
    pub fn with_response(mut self, status_code: u16, body: impl Into<String>) -> Self {
        self.status_code = Some(status_code);
        self.body = Some(body.into());
        self
    }

    /// Attach the parameters of the request that failed.
    pub fn with_request(mut self, request: RequestParams) -> Self {
        self.request = Some(request);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message without the kind prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status code returned by the gateway, if any.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Raw body returned by the gateway, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Parameters of the failed request, if any.
    pub fn request(&self) -> Option<&RequestParams> {
        self.request.as_ref()
    }

    /// Check if this error was raised before touching the network.
    pub fn is_internal(&self) -> bool {
        self.kind == ErrorKind::Internal
    }

    /// Check if the gateway answered with a 4xx status.
    pub fn is_client(&self) -> bool {
        self.kind == ErrorKind::Client
    }

    /// Check if the gateway answered with a 5xx status.
    pub fn is_server(&self) -> bool {
        self.kind == ErrorKind::Server
    }
}

// Convenience constructors
impl Error {
    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a client error
    pub fn client(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Client, message)
    }

    /// Create a server error
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Server, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Internal => write!(f, "internal error"),
            ErrorKind::Client => write!(f, "client error"),
            ErrorKind::Server => write!(f, "server error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::internal(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::internal(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::internal(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::internal(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
