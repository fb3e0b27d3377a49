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

use crate::config::Config;
use crate::constants::GENERATE_TOKEN_PATH;
use crate::dispatcher::Dispatcher;
use chrono::TimeDelta;
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue, Method};
use log::debug;
use mpesa_core::time::{add_secs, now, DateTime};
use mpesa_core::utils::Redact;
use mpesa_core::validate::require_non_empty;
use mpesa_core::{Error, Result};
use serde::Deserialize;
use std::fmt::{self, Debug, Formatter};
use std::sync::Mutex;

/// Token is a bearer token issued by the gateway.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Token {
    access_token: String,
    expires_at: Option<DateTime>,
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &Redact::from(&self.access_token))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Token {
    /// Create a token that expires at `expires_at`.
    pub fn new(access_token: impl Into<String>, expires_at: DateTime) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: Some(expires_at),
        }
    }

    /// The bearer token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// When the token stops being accepted.
    pub fn expires_at(&self) -> Option<DateTime> {
        self.expires_at
    }

    /// Check if the token has expired.
    pub fn has_expired(&self) -> bool {
        self.has_expired_at(now())
    }

    /// Check if the token has expired at `time`.
    ///
    /// An empty token, or one without expiry, counts as expired.
    pub fn has_expired_at(&self, time: DateTime) -> bool {
        if self.access_token.is_empty() {
            return true;
        }

        match self.expires_at {
            Some(expires_at) => expires_at - time <= TimeDelta::zero(),
            None => true,
        }
    }
}

/// Token endpoint response.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: ExpiresIn,
}

/// The gateway sends `expires_in` as a string, accept numbers too.
#[derive(Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Number(i64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> Result<i64> {
        match self {
            ExpiresIn::Number(v) => Ok(*v),
            ExpiresIn::Text(v) => v.trim().parse().map_err(|e| {
                Error::internal(format!("token response has invalid expires_in: '{v}'"))
                    .with_source(anyhow::Error::new(e))
            }),
        }
    }
}

#[derive(Debug, Default)]
struct AuthState {
    /// Identity of the api credentials the token was issued for.
    identity: Option<String>,
    token: Option<Token>,
    issued: bool,
    token_changed: bool,
}

/// Auth owns the bearer token of a client and refreshes it on demand.
///
/// The token is bound to the api credentials it was issued for: changing the
/// consumer key, secret or environment makes the next [`Auth::token`] call
/// fetch a new one. Refreshes are single-flight, concurrent callers wait for
/// the in-progress refresh and reuse its token.
#[derive(Debug, Default)]
pub struct Auth {
    state: Mutex<AuthState>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl Auth {
    /// Create an auth without a token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a valid bearer token, refreshing it when needed.
    pub async fn token(&self, dispatcher: &Dispatcher, config: &Config) -> Result<String> {
        let token = self.auth_token(dispatcher, config, false).await?;
        Ok(token.access_token)
    }

    /// Return a valid token, refreshing it if `force` is set or the current one
    /// is missing, expired or was issued for other credentials.
    pub async fn auth_token(
        &self,
        dispatcher: &Dispatcher,
        config: &Config,
        force: bool,
    ) -> Result<Token> {
        let identity = config.credentials_identity();
        if !force {
            if let Some(token) = self.valid_token(&identity) {
                return Ok(token);
            }
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we were waiting.
        if !force {
            if let Some(token) = self.valid_token(&identity) {
                return Ok(token);
            }
        }

        let token = fetch_token(dispatcher, config).await?;

        let mut state = self.state.lock().expect("lock poisoned");
        if state.issued {
            state.token_changed = true;
        }
        state.issued = true;
        state.identity = Some(identity);
        state.token = Some(token.clone());

        Ok(token)
    }

    /// Fetch a new token from the gateway regardless of the current one.
    pub async fn refresh(&self, dispatcher: &Dispatcher, config: &Config) -> Result<Token> {
        self.auth_token(dispatcher, config, true).await
    }

    /// Install a token obtained elsewhere, bound to `config`'s credentials.
    pub fn set_token(&self, config: &Config, token: Token) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.identity = Some(config.credentials_identity());
        state.token = Some(token);
    }

    /// The current token, if any, valid or not.
    pub fn current_token(&self) -> Option<Token> {
        self.state.lock().expect("lock poisoned").token.clone()
    }

    /// Expiry of the current token.
    pub fn expires_at(&self) -> Option<DateTime> {
        self.current_token().and_then(|t| t.expires_at())
    }

    /// Check if there is no token or the current one has expired.
    pub fn has_expired(&self) -> bool {
        self.current_token().map(|t| t.has_expired()).unwrap_or(true)
    }

    /// Check if a refresh replaced a previously issued token.
    ///
    /// Callers caching the token outside of the client use this to invalidate
    /// their copy.
    pub fn has_token_changed(&self) -> bool {
        self.state.lock().expect("lock poisoned").token_changed
    }

    fn valid_token(&self, identity: &str) -> Option<Token> {
        let state = self.state.lock().expect("lock poisoned");
        if state.identity.as_deref() != Some(identity) {
            return None;
        }

        state.token.clone().filter(|t| !t.has_expired())
    }
}

async fn fetch_token(dispatcher: &Dispatcher, config: &Config) -> Result<Token> {
    require_non_empty("consumer_key", config.consumer_key())?;
    require_non_empty("consumer_secret", config.consumer_secret())?;

    debug!("refreshing access token for {:?}", Redact::from(config.consumer_key()));

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Basic {}", config.credentials()))?,
    );

    let url = format!("{}{}", config.base_url(), GENERATE_TOKEN_PATH);
    let resp = dispatcher
        .request(Method::GET, &url, None, Some(headers))
        .await?;

    let token_resp: TokenResponse = resp.json()?;
    let expires_in = token_resp.expires_in.seconds()?;
    let token = Token::new(token_resp.access_token, add_secs(now(), expires_in));

    debug!("got access token {:?}, expires in {expires_in}s", token);
    Ok(token)
}
