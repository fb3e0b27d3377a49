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

use crate::constants::*;
use log::debug;
use mpesa_core::hash::{base64_encode, hex_sha256};
use mpesa_core::utils::Redact;
use mpesa_core::validate::require_one_of;
use mpesa_core::{Context, Error, Result};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;

/// Gateway environment a client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    /// The sandbox gateway, used for development and testing.
    #[default]
    Sandbox,
    /// The live gateway.
    Production,
}

impl Environment {
    /// The name used in configuration: `sandbox` or `production`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }

    /// Base url of the gateway for this environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        require_one_of("environment", &s.to_ascii_lowercase(), &["sandbox", "production"])?;

        if s.trim().eq_ignore_ascii_case("production") {
            Ok(Environment::Production)
        } else {
            Ok(Environment::Sandbox)
        }
    }
}

/// Role of a short code or phone number in a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierType {
    /// A subscriber phone number.
    Msisdn,
    /// A till number (buy goods).
    Till,
    /// A paybill number.
    Paybill,
    /// An organization short code.
    ShortCode,
}

impl IdentifierType {
    /// Accepted identifier names.
    pub const NAMES: &'static [&'static str] = &["MSISDN", "TILL", "PAYBILL", "SHORTCODE"];

    /// Parse an identifier name (case-insensitive), naming `field` in the error.
    pub fn parse(field: &str, value: &str) -> Result<Self> {
        let value = value.trim();
        match value.to_ascii_uppercase().as_str() {
            "MSISDN" => Ok(IdentifierType::Msisdn),
            "TILL" => Ok(IdentifierType::Till),
            "PAYBILL" => Ok(IdentifierType::Paybill),
            "SHORTCODE" => Ok(IdentifierType::ShortCode),
            _ => Err(require_one_of(field, value, Self::NAMES)
                .err()
                .unwrap_or_else(|| Error::internal(format!("'{value}' is not a valid {field}")))),
        }
    }

    /// The identifier name.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierType::Msisdn => "MSISDN",
            IdentifierType::Till => "TILL",
            IdentifierType::Paybill => "PAYBILL",
            IdentifierType::ShortCode => "SHORTCODE",
        }
    }

    /// The numeric code the gateway expects on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            IdentifierType::Msisdn => "1",
            IdentifierType::Till => "2",
            IdentifierType::Paybill | IdentifierType::ShortCode => "4",
        }
    }
}

impl FromStr for IdentifierType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse("identifier_type", s)
    }
}

/// Keys accepted by [`Config::set`], [`Config::get`] and the map/JSON constructors.
pub const CONFIG_KEYS: &[&str] = &[
    "consumer_key",
    "consumer_secret",
    "environment",
    "initiator_name",
    "initiator_password",
    "security_credential",
    "sandbox_certificate_path",
    "production_certificate_path",
    "passkey",
    "short_code",
    "business_short_code",
    "identifier_type",
    "confirmation_url",
    "validation_url",
    "stk_callback_url",
    "queue_timeout_url",
    "result_url",
    "organization_msisdn",
    "pull_callback_url",
];

/// Callback urls reachable through [`Config::url`].
const URL_NAMES: &[&str] = &[
    "stk_callback_url",
    "result_url",
    "queue_timeout_url",
    "validation_url",
    "confirmation_url",
];

/// Config holds the merchant and API settings of a client.
///
/// Every setter trims its input. Derived values (basic auth credentials,
/// request password) are computed on demand from the current fields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    consumer_key: String,
    consumer_secret: String,
    environment: Environment,
    initiator_name: String,
    initiator_password: String,
    security_credential: String,
    sandbox_certificate_path: String,
    production_certificate_path: String,
    passkey: String,
    short_code: String,
    business_short_code: String,
    identifier_type: Option<IdentifierType>,
    confirmation_url: String,
    validation_url: String,
    stk_callback_url: String,
    queue_timeout_url: String,
    result_url: String,
    organization_msisdn: String,
    pull_callback_url: String,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("consumer_key", &Redact::from(&self.consumer_key))
            .field("consumer_secret", &Redact::from(&self.consumer_secret))
            .field("environment", &self.environment)
            .field("initiator_name", &self.initiator_name)
            .field("initiator_password", &Redact::from(&self.initiator_password))
            .field("security_credential", &Redact::from(&self.security_credential))
            .field("sandbox_certificate_path", &self.sandbox_certificate_path)
            .field("production_certificate_path", &self.production_certificate_path)
            .field("passkey", &Redact::from(&self.passkey))
            .field("short_code", &self.short_code)
            .field("business_short_code", &self.business_short_code)
            .field("identifier_type", &self.identifier_type)
            .field("confirmation_url", &self.confirmation_url)
            .field("validation_url", &self.validation_url)
            .field("stk_callback_url", &self.stk_callback_url)
            .field("queue_timeout_url", &self.queue_timeout_url)
            .field("result_url", &self.result_url)
            .field("organization_msisdn", &self.organization_msisdn)
            .field("pull_callback_url", &self.pull_callback_url)
            .finish()
    }
}

impl Config {
    /// Create an empty sandbox config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from key/value pairs.
    ///
    /// Keys outside [`CONFIG_KEYS`] are ignored.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();
        for key in CONFIG_KEYS {
            if matches!(*key, "short_code" | "identifier_type") {
                continue;
            }
            if let Some(value) = map.get(*key) {
                config.set(key, value)?;
            }
        }

        match (map.get("short_code"), map.get("identifier_type")) {
            (Some(short_code), Some(identifier_type)) => {
                config.set_short_code(short_code, identifier_type)?;
            }
            (Some(short_code), None) => {
                config.set("short_code", short_code)?;
            }
            (None, Some(identifier_type)) => {
                config.set("identifier_type", identifier_type)?;
            }
            (None, None) => {}
        }

        Ok(config)
    }

    /// Build a config from a JSON object whose values are strings.
    ///
    /// Keys outside [`CONFIG_KEYS`] are ignored.
    pub fn from_json(content: &str) -> Result<Self> {
        let parsed: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)
            .map_err(|e| Error::internal("config is not a valid JSON object").with_source(e))?;

        let mut map = HashMap::new();
        for key in CONFIG_KEYS {
            match parsed.get(*key) {
                None => {}
                Some(serde_json::Value::String(v)) => {
                    map.insert(key.to_string(), v.clone());
                }
                Some(v) => {
                    return Err(Error::internal(format!(
                        "Value of {key} - '{v}' in your config must be a string"
                    )))
                }
            }
        }

        Self::from_map(&map)
    }

    /// Load config from `MPESA_*` environment variables.
    pub fn from_env(ctx: &Context) -> Result<Self> {
        let envs = [
            (MPESA_CONSUMER_KEY, "consumer_key"),
            (MPESA_CONSUMER_SECRET, "consumer_secret"),
            (MPESA_ENVIRONMENT, "environment"),
            (MPESA_INITIATOR_NAME, "initiator_name"),
            (MPESA_INITIATOR_PASSWORD, "initiator_password"),
            (MPESA_SECURITY_CREDENTIAL, "security_credential"),
            (MPESA_SANDBOX_CERTIFICATE_PATH, "sandbox_certificate_path"),
            (MPESA_PRODUCTION_CERTIFICATE_PATH, "production_certificate_path"),
            (MPESA_PASSKEY, "passkey"),
            (MPESA_SHORT_CODE, "short_code"),
            (MPESA_IDENTIFIER_TYPE, "identifier_type"),
            (MPESA_BUSINESS_SHORT_CODE, "business_short_code"),
            (MPESA_CONFIRMATION_URL, "confirmation_url"),
            (MPESA_VALIDATION_URL, "validation_url"),
            (MPESA_STK_CALLBACK_URL, "stk_callback_url"),
            (MPESA_QUEUE_TIMEOUT_URL, "queue_timeout_url"),
            (MPESA_RESULT_URL, "result_url"),
            (MPESA_ORGANIZATION_MSISDN, "organization_msisdn"),
            (MPESA_PULL_CALLBACK_URL, "pull_callback_url"),
        ];

        let map = envs
            .iter()
            .filter_map(|(env, key)| ctx.env_var(env).map(|v| (key.to_string(), v)))
            .collect::<HashMap<_, _>>();
        debug!("loaded {} mpesa settings from env", map.len());

        Self::from_map(&map)
    }

    /// Set a config value by key.
    ///
    /// Fails for keys outside [`CONFIG_KEYS`] and for invalid environment or
    /// identifier type values. `short_code` and `identifier_type` go through
    /// [`Config::set_short_code`]: a short code can only be set once an
    /// identifier type is known, and an identifier type can not be cleared.
    pub fn set(&mut self, key: &str, value: &str) -> Result<&mut Self> {
        let v = value.trim().to_string();
        match key {
            "consumer_key" => self.consumer_key = v,
            "consumer_secret" => self.consumer_secret = v,
            "environment" => self.environment = v.parse()?,
            "initiator_name" => self.initiator_name = v,
            "initiator_password" => self.initiator_password = v,
            "security_credential" => self.security_credential = v,
            "sandbox_certificate_path" => self.sandbox_certificate_path = v,
            "production_certificate_path" => self.production_certificate_path = v,
            "passkey" => self.passkey = v,
            "short_code" => {
                return match self.identifier_type {
                    Some(identifier_type) => self.set_short_code(&v, identifier_type.as_str()),
                    None if v.is_empty() => {
                        self.short_code = v;
                        Ok(self)
                    }
                    None => Err(Error::internal(
                        "'identifier_type' can not be empty, set it together with 'short_code'",
                    )),
                };
            }
            "business_short_code" => self.business_short_code = v,
            "identifier_type" => {
                let short_code = self.short_code.clone();
                return self.set_short_code(&short_code, &v);
            }
            "confirmation_url" => self.confirmation_url = v,
            "validation_url" => self.validation_url = v,
            "stk_callback_url" => self.stk_callback_url = v,
            "queue_timeout_url" => self.queue_timeout_url = v,
            "result_url" => self.result_url = v,
            "organization_msisdn" => self.organization_msisdn = v,
            "pull_callback_url" => self.pull_callback_url = v,
            _ => return Err(Error::internal(format!("{key} not found in configuration"))),
        }

        Ok(self)
    }

    /// Get a config value by key, `None` for unknown keys.
    pub fn get(&self, key: &str) -> Option<&str> {
        let v = match key {
            "consumer_key" => &self.consumer_key,
            "consumer_secret" => &self.consumer_secret,
            "environment" => return Some(self.environment.as_str()),
            "initiator_name" => &self.initiator_name,
            "initiator_password" => &self.initiator_password,
            "security_credential" => &self.security_credential,
            "sandbox_certificate_path" => &self.sandbox_certificate_path,
            "production_certificate_path" => &self.production_certificate_path,
            "passkey" => &self.passkey,
            "short_code" => &self.short_code,
            "business_short_code" => &self.business_short_code,
            "identifier_type" => {
                return Some(self.identifier_type.map(|t| t.as_str()).unwrap_or(""))
            }
            "confirmation_url" => &self.confirmation_url,
            "validation_url" => &self.validation_url,
            "stk_callback_url" => &self.stk_callback_url,
            "queue_timeout_url" => &self.queue_timeout_url,
            "result_url" => &self.result_url,
            "organization_msisdn" => &self.organization_msisdn,
            "pull_callback_url" => &self.pull_callback_url,
            _ => return None,
        };

        Some(v.as_str())
    }

    /// Check whether `key` is a known config key.
    pub fn exists(key: &str) -> bool {
        CONFIG_KEYS.contains(&key)
    }

    /// Base64 encoded `consumer_key:consumer_secret`, used for basic auth.
    pub fn credentials(&self) -> String {
        base64_encode(format!("{}:{}", self.consumer_key, self.consumer_secret).as_bytes())
    }

    /// Digest identifying the api credentials and environment a token belongs to.
    pub fn credentials_identity(&self) -> String {
        hex_sha256(
            format!(
                "{}\n{}\n{}",
                self.environment.as_str(),
                self.consumer_key,
                self.consumer_secret
            )
            .as_bytes(),
        )
    }

    /// Base64 encoded `business_short_code + passkey + timestamp`.
    pub fn password(&self, timestamp: &str) -> String {
        base64_encode(format!("{}{}{}", self.business_short_code(), self.passkey, timestamp).as_bytes())
    }

    /// Set the environment: sandbox when `is_sandbox`, production otherwise.
    pub fn set_environment(&mut self, is_sandbox: bool) -> &mut Self {
        self.environment = if is_sandbox {
            Environment::Sandbox
        } else {
            Environment::Production
        };
        self
    }

    /// Current environment.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Whether the sandbox gateway is in use.
    pub fn is_sandbox(&self) -> bool {
        self.environment == Environment::Sandbox
    }

    /// Whether the live gateway is in use.
    pub fn is_production(&self) -> bool {
        !self.is_sandbox()
    }

    /// Base url of the configured environment.
    pub fn base_url(&self) -> &'static str {
        self.environment.base_url()
    }

    /// Set the consumer key.
    pub fn set_consumer_key(&mut self, value: &str) -> &mut Self {
        self.consumer_key = value.trim().to_string();
        self
    }

    /// The consumer key.
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// Set the consumer secret.
    pub fn set_consumer_secret(&mut self, value: &str) -> &mut Self {
        self.consumer_secret = value.trim().to_string();
        self
    }

    /// The consumer secret.
    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    /// Set the short code together with its identifier type.
    ///
    /// `identifier_type` must be one of `MSISDN`, `TILL`, `PAYBILL` or
    /// `SHORTCODE`; nothing is changed when it is not.
    pub fn set_short_code(&mut self, value: &str, identifier_type: &str) -> Result<&mut Self> {
        let identifier_type = IdentifierType::parse("identifier_type", identifier_type)?;

        self.identifier_type = Some(identifier_type);
        self.short_code = value.trim().to_string();
        Ok(self)
    }

    /// The short code.
    pub fn short_code(&self) -> &str {
        &self.short_code
    }

    /// The identifier type of the short code, if set.
    pub fn identifier_type(&self) -> Option<IdentifierType> {
        self.identifier_type
    }

    /// Set the business short code, used by STK push when the till and head
    /// office numbers differ.
    pub fn set_business_short_code(&mut self, value: &str) -> &mut Self {
        self.business_short_code = value.trim().to_string();
        self
    }

    /// The business short code, falling back to the short code when unset.
    pub fn business_short_code(&self) -> &str {
        if self.business_short_code.is_empty() {
            &self.short_code
        } else {
            &self.business_short_code
        }
    }

    /// Set the initiator name.
    pub fn set_initiator_name(&mut self, value: &str) -> &mut Self {
        self.initiator_name = value.trim().to_string();
        self
    }

    /// The initiator name.
    pub fn initiator_name(&self) -> &str {
        &self.initiator_name
    }

    /// Set the initiator password.
    pub fn set_initiator_password(&mut self, value: &str) -> &mut Self {
        self.initiator_password = value.trim().to_string();
        self
    }

    /// The initiator password.
    pub fn initiator_password(&self) -> &str {
        &self.initiator_password
    }

    /// Set a precomputed security credential, skipping certificate encryption.
    pub fn set_security_credential(&mut self, value: &str) -> &mut Self {
        self.security_credential = value.trim().to_string();
        self
    }

    /// The precomputed security credential, empty when it should be derived.
    pub fn security_credential(&self) -> &str {
        &self.security_credential
    }

    /// Set the certificate used in the sandbox environment.
    pub fn set_sandbox_certificate_path(&mut self, value: &str) -> &mut Self {
        self.sandbox_certificate_path = value.trim().to_string();
        self
    }

    /// Set the certificate used in the production environment.
    pub fn set_production_certificate_path(&mut self, value: &str) -> &mut Self {
        self.production_certificate_path = value.trim().to_string();
        self
    }

    /// Certificate path of the configured environment.
    ///
    /// Falls back to the gateway certificate bundled under `certs/` when no
    /// path is configured for the environment.
    pub fn certificate_path(&self) -> &str {
        let (configured, default) = match self.environment {
            Environment::Sandbox => (
                &self.sandbox_certificate_path,
                DEFAULT_SANDBOX_CERTIFICATE_PATH,
            ),
            Environment::Production => (
                &self.production_certificate_path,
                DEFAULT_PRODUCTION_CERTIFICATE_PATH,
            ),
        };

        if configured.is_empty() {
            default
        } else {
            configured
        }
    }

    /// Set the Lipa na M-Pesa online passkey.
    pub fn set_passkey(&mut self, value: &str) -> &mut Self {
        self.passkey = value.trim().to_string();
        self
    }

    /// The passkey.
    pub fn passkey(&self) -> &str {
        &self.passkey
    }

    /// Set the url receiving confirmed C2B transactions.
    pub fn set_confirmation_url(&mut self, value: &str) -> &mut Self {
        self.confirmation_url = value.trim().to_string();
        self
    }

    /// The confirmation url.
    pub fn confirmation_url(&self) -> &str {
        &self.confirmation_url
    }

    /// Set the url receiving C2B validation requests.
    pub fn set_validation_url(&mut self, value: &str) -> &mut Self {
        self.validation_url = value.trim().to_string();
        self
    }

    /// The validation url.
    pub fn validation_url(&self) -> &str {
        &self.validation_url
    }

    /// Set the url receiving STK push results.
    pub fn set_stk_callback_url(&mut self, value: &str) -> &mut Self {
        self.stk_callback_url = value.trim().to_string();
        self
    }

    /// The STK callback url.
    pub fn stk_callback_url(&self) -> &str {
        &self.stk_callback_url
    }

    /// Set the url notified when a request times out in the gateway queue.
    pub fn set_queue_timeout_url(&mut self, value: &str) -> &mut Self {
        self.queue_timeout_url = value.trim().to_string();
        self
    }

    /// The queue timeout url.
    pub fn queue_timeout_url(&self) -> &str {
        &self.queue_timeout_url
    }

    /// Set the url receiving asynchronous results.
    pub fn set_result_url(&mut self, value: &str) -> &mut Self {
        self.result_url = value.trim().to_string();
        self
    }

    /// The result url.
    pub fn result_url(&self) -> &str {
        &self.result_url
    }

    /// Set the MSISDN nominated for pull transactions.
    pub fn set_organization_msisdn(&mut self, value: &str) -> &mut Self {
        self.organization_msisdn = value.trim().to_string();
        self
    }

    /// The nominated MSISDN.
    pub fn organization_msisdn(&self) -> &str {
        &self.organization_msisdn
    }

    /// Set the url receiving pulled transactions.
    pub fn set_pull_callback_url(&mut self, value: &str) -> &mut Self {
        self.pull_callback_url = value.trim().to_string();
        self
    }

    /// The pull callback url.
    pub fn pull_callback_url(&self) -> &str {
        &self.pull_callback_url
    }

    /// Look up one of the callback urls by name.
    pub fn url(&self, name: &str) -> Result<&str> {
        let name = name.trim().to_ascii_lowercase();
        if !URL_NAMES.contains(&name.as_str()) {
            return Err(Error::internal(format!(
                "'{name}' not found in the configuration, available options are: '{}'",
                URL_NAMES.join(", ")
            )));
        }

        Ok(self.get(&name).unwrap_or_default())
    }
}
