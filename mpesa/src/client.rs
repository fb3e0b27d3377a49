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

use crate::auth::Auth;
use crate::b2b::B2B;
use crate::b2c::B2C;
use crate::c2b::C2B;
use crate::config::{Config, IdentifierType};
use crate::constants::*;
use crate::credential::SecurityCredential;
use crate::dispatcher::{Dispatcher, Response};
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue, Method};
use log::debug;
use mpesa_core::validate::{require_in_range, require_non_empty};
use mpesa_core::{Context, Error, Result};
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};

/// Mpesa is the client for the M-Pesa gateway.
///
/// Clones share the same configuration, token and security credential
/// cache. Operations read a snapshot of the configuration when they start.
///
/// ```no_run
/// use mpesa::{Config, Mpesa};
/// use mpesa_core::Context;
///
/// # async fn example() -> mpesa_core::Result<()> {
/// let mut config = Config::new();
/// config
///     .set_consumer_key("consumer-key")
///     .set_consumer_secret("consumer-secret")
///     .set_short_code("174379", "PAYBILL")?
///     .set_passkey("passkey")
///     .set_stk_callback_url("https://example.com/callback");
///
/// let mpesa = Mpesa::new(Context::new(), config);
/// let resp = mpesa
///     .c2b()
///     .initiate_stk_push(1, "254708374149", "INV-001", "Invoice 1", None)
///     .await?;
/// println!("{}", resp.body());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Mpesa {
    dispatcher: Dispatcher,
    config: Arc<RwLock<Config>>,
    auth: Arc<Auth>,
    security_credential: Arc<SecurityCredential>,
}

impl Mpesa {
    /// Create a client sending requests through `ctx`.
    pub fn new(ctx: Context, config: Config) -> Self {
        Self {
            dispatcher: Dispatcher::new(ctx),
            config: Arc::new(RwLock::new(config)),
            auth: Arc::new(Auth::new()),
            security_credential: Arc::new(SecurityCredential::new()),
        }
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Config {
        self.config.read().expect("lock poisoned").clone()
    }

    /// Replace the configuration.
    pub fn set_config(&self, config: Config) {
        *self.config.write().expect("lock poisoned") = config;
    }

    /// Update the configuration in place.
    ///
    /// Changes are applied only if `f` succeeds.
    pub fn update_config<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Config) -> Result<()>,
    {
        let mut config = self.config.write().expect("lock poisoned");
        let mut updated = config.clone();
        f(&mut updated)?;
        *config = updated;
        Ok(())
    }

    /// The token manager of this client.
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// The dispatcher of this client.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// A valid bearer token, refreshed when needed.
    pub async fn token(&self) -> Result<String> {
        let config = self.config();
        self.auth.token(&self.dispatcher, &config).await
    }

    /// The security credential for the current configuration.
    pub async fn security_credential(&self) -> Result<String> {
        let config = self.config();
        self.security_credential
            .get(self.dispatcher.context(), &config)
            .await
    }

    /// Business to customer operations using `command_id`.
    pub fn b2c(&self, command_id: &str) -> B2C<'_> {
        B2C::new(self, command_id)
    }

    /// Business to business operations using `command_id`.
    pub fn b2b(&self, command_id: &str) -> B2B<'_> {
        B2B::new(self, command_id)
    }

    /// Customer to business operations.
    pub fn c2b(&self) -> C2B<'_> {
        C2B::new(self)
    }

    /// Query the balance of the configured short code.
    ///
    /// The balance is delivered asynchronously to the result url.
    pub async fn account_balance(&self, remarks: &str) -> Result<Response> {
        let config = self.config();
        require_non_empty("remarks", remarks)?;
        let (identifier_type, security_credential) = self.initiator(&config).await?;

        let payload = json!({
            "Initiator": config.initiator_name(),
            "SecurityCredential": security_credential,
            "CommandID": COMMAND_ID_ACCOUNT_BALANCE,
            "PartyA": config.short_code(),
            "IdentifierType": identifier_type.code(),
            "Remarks": remarks.trim(),
            "QueueTimeOutURL": config.queue_timeout_url(),
            "ResultURL": config.result_url(),
        });

        self.post(&config, ACCOUNT_BALANCE_PATH, payload).await
    }

    /// Query the status of a transaction.
    ///
    /// At least one of `transaction_id` and `original_conversation_id` must be
    /// set. `occasion` is optional.
    pub async fn transaction_status(
        &self,
        transaction_id: &str,
        original_conversation_id: &str,
        remarks: &str,
        occasion: &str,
    ) -> Result<Response> {
        let config = self.config();
        if transaction_id.trim().is_empty() && original_conversation_id.trim().is_empty() {
            return Err(Error::internal(
                "'transaction_id' or 'original_conversation_id' can not both be empty",
            ));
        }
        require_non_empty("remarks", remarks)?;
        let (identifier_type, security_credential) = self.initiator(&config).await?;

        let mut payload = json!({
            "Initiator": config.initiator_name(),
            "SecurityCredential": security_credential,
            "CommandID": COMMAND_ID_TRANSACTION_STATUS_QUERY,
            "PartyA": config.short_code(),
            "IdentifierType": identifier_type.code(),
            "ResultURL": config.result_url(),
            "QueueTimeOutURL": config.queue_timeout_url(),
            "Remarks": remarks.trim(),
            "Occasion": occasion.trim(),
        });
        if !transaction_id.trim().is_empty() {
            payload["TransactionID"] = Value::from(transaction_id.trim());
        }
        if !original_conversation_id.trim().is_empty() {
            payload["OriginalConversationID"] = Value::from(original_conversation_id.trim());
        }

        self.post(&config, TRANSACTION_STATUS_PATH, payload).await
    }

    /// Reverse a transaction.
    pub async fn reverse_transaction(
        &self,
        transaction_id: &str,
        amount: i64,
        receiver_party: &str,
        receiver_identifier_type: &str,
        remarks: &str,
        occasion: &str,
    ) -> Result<Response> {
        let config = self.config();
        require_non_empty("transaction_id", transaction_id)?;
        require_in_range("amount", amount, Some(1), None)?;
        require_non_empty("receiver_party", receiver_party)?;
        let receiver_identifier_type =
            IdentifierType::parse("receiver_identifier_type", receiver_identifier_type)?;
        require_non_empty("remarks", remarks)?;
        let (_, security_credential) = self.initiator(&config).await?;

        let payload = json!({
            "Initiator": config.initiator_name(),
            "SecurityCredential": security_credential,
            "CommandID": COMMAND_ID_TRANSACTION_REVERSAL,
            "TransactionID": transaction_id.trim(),
            "Amount": amount,
            "ReceiverParty": receiver_party.trim(),
            "RecieverIdentifierType": receiver_identifier_type.code(),
            "ResultURL": config.result_url(),
            "QueueTimeOutURL": config.queue_timeout_url(),
            "Remarks": remarks.trim(),
            "Occasion": occasion.trim(),
        });

        self.post(&config, REVERSAL_PATH, payload).await
    }

    /// Validate the settings shared by initiator operations and derive the
    /// security credential.
    pub(crate) async fn initiator(&self, config: &Config) -> Result<(IdentifierType, String)> {
        require_non_empty("short_code", config.short_code())?;
        let identifier_type = require_identifier_type(config)?;
        require_non_empty("initiator_name", config.initiator_name())?;
        require_non_empty("queue_timeout_url", config.queue_timeout_url())?;
        require_non_empty("result_url", config.result_url())?;

        let security_credential = self
            .security_credential
            .get(self.dispatcher.context(), config)
            .await?;

        Ok((identifier_type, security_credential))
    }

    /// POST `payload` to `path` with a bearer token.
    pub(crate) async fn post(&self, config: &Config, path: &str, payload: Value) -> Result<Response> {
        let token = self.auth.token(&self.dispatcher, config).await?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );

        let url = format!("{}{}", config.base_url(), path);
        debug!("posting to {url}");
        self.dispatcher
            .request(Method::POST, &url, Some(payload), Some(headers))
            .await
    }
}

pub(crate) fn require_identifier_type(config: &Config) -> Result<IdentifierType> {
    config
        .identifier_type()
        .ok_or_else(|| Error::internal("'identifier_type' can not be empty"))
}
