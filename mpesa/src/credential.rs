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
use log::debug;
use mpesa_core::hash::{base64_encode, hex_sha256};
use mpesa_core::utils::Redact;
use mpesa_core::validate::require_non_empty;
use mpesa_core::{Context, Error, Result};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use std::sync::Mutex;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

#[derive(Clone)]
struct Cached {
    /// Digest of the inputs the value was derived from.
    tag: String,
    value: String,
}

/// SecurityCredential derives the encrypted initiator password required by
/// privileged operations.
///
/// The initiator password is encrypted with the public key of the gateway
/// certificate configured for the current environment (RSA, PKCS#1 v1.5) and
/// base64 encoded. The result is cached and reused until the password, the
/// environment or the certificate path change.
#[derive(Default)]
pub struct SecurityCredential {
    cached: Mutex<Option<Cached>>,
}

impl std::fmt::Debug for SecurityCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self.cached.lock().expect("lock poisoned");
        f.debug_struct("SecurityCredential")
            .field(
                "cached",
                &cached.as_ref().map(|c| Redact::from(&c.value)),
            )
            .finish()
    }
}

impl SecurityCredential {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the security credential for `config`.
    ///
    /// A precomputed `security_credential` in the config wins over derivation.
    pub async fn get(&self, ctx: &Context, config: &Config) -> Result<String> {
        if !config.security_credential().is_empty() {
            return Ok(config.security_credential().to_string());
        }

        require_non_empty("initiator_password", config.initiator_password())?;

        let path = config.certificate_path();

        let tag = hex_sha256(
            format!(
                "{}\n{}\n{}",
                config.environment().as_str(),
                path,
                config.initiator_password()
            )
            .as_bytes(),
        );

        let cached = self.cached.lock().expect("lock poisoned").clone();
        if let Some(cached) = cached.filter(|c| c.tag == tag) {
            return Ok(cached.value);
        }

        debug!("deriving security credential with certificate {path}");
        let pem = ctx.file_read_as_string(path).await?;
        let key = load_public_key(&pem)?;
        let value = encrypt(&key, config.initiator_password())?;

        *self.cached.lock().expect("lock poisoned") = Some(Cached {
            tag,
            value: value.clone(),
        });
        Ok(value)
    }

    /// Drop the cached value.
    pub fn clear(&self) {
        *self.cached.lock().expect("lock poisoned") = None;
    }
}

/// Load an RSA public key from a PEM encoded x509 certificate, SPKI public
/// key or PKCS#1 public key.
pub fn load_public_key(pem: &str) -> Result<RsaPublicKey> {
    let pem = pem.trim();

    if pem.contains("-----BEGIN CERTIFICATE-----") {
        let cert = Certificate::from_pem(pem.as_bytes()).map_err(|e| {
            Error::internal("failed to parse certificate").with_source(anyhow::Error::new(e))
        })?;
        let spki = cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| {
                Error::internal("failed to encode certificate public key")
                    .with_source(anyhow::Error::new(e))
            })?;
        return RsaPublicKey::from_public_key_der(&spki).map_err(|e| {
            Error::internal("certificate does not hold an RSA public key")
                .with_source(anyhow::Error::new(e))
        });
    }

    if pem.contains("-----BEGIN RSA PUBLIC KEY-----") {
        return RsaPublicKey::from_pkcs1_pem(pem).map_err(|e| {
            Error::internal("failed to parse RSA public key").with_source(anyhow::Error::new(e))
        });
    }

    RsaPublicKey::from_public_key_pem(pem).map_err(|e| {
        Error::internal("failed to parse public key").with_source(anyhow::Error::new(e))
    })
}

fn encrypt(key: &RsaPublicKey, plaintext: &str) -> Result<String> {
    let mut rng = rand::thread_rng();
    let encrypted = key
        .encrypt(&mut rng, Pkcs1v15Encrypt, plaintext.as_bytes())
        .map_err(|e| {
            Error::internal(format!("failed to encrypt initiator password: {e}"))
                .with_source(anyhow::Error::new(e))
        })?;

    Ok(base64_encode(&encrypted))
}
