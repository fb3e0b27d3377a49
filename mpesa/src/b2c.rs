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

use crate::client::Mpesa;
use crate::constants::{B2C_COMMAND_IDS, B2C_PAYMENT_REQUEST_PATH};
use crate::dispatcher::Response;
use mpesa_core::validate::{require_in_range, require_non_empty, require_one_of};
use mpesa_core::Result;
use serde_json::json;

/// Business to customer payments.
///
/// Created by [`Mpesa::b2c`].
#[derive(Debug, Clone)]
pub struct B2C<'a> {
    client: &'a Mpesa,
    command_id: String,
}

impl<'a> B2C<'a> {
    pub(crate) fn new(client: &'a Mpesa, command_id: &str) -> Self {
        Self {
            client,
            command_id: command_id.trim().to_string(),
        }
    }

    /// Use `command_id` for subsequent payments.
    pub fn with_command_id(mut self, command_id: &str) -> Self {
        self.command_id = command_id.trim().to_string();
        self
    }

    /// The command id payments are sent with.
    pub fn command_id(&self) -> &str {
        &self.command_id
    }

    /// Send `amount` to the MSISDN `to`.
    ///
    /// The result is delivered asynchronously to the configured result url.
    pub async fn send(&self, amount: i64, to: &str, remarks: &str, occasion: &str) -> Result<Response> {
        let config = self.client.config();
        require_one_of("command_id", &self.command_id, B2C_COMMAND_IDS)?;
        require_in_range("amount", amount, Some(1), None)?;
        require_non_empty("to", to)?;
        require_non_empty("remarks", remarks)?;
        let (_, security_credential) = self.client.initiator(&config).await?;

        let payload = json!({
            "InitiatorName": config.initiator_name(),
            "SecurityCredential": security_credential,
            "CommandID": self.command_id,
            "Amount": amount,
            "PartyA": config.short_code(),
            "PartyB": to.trim(),
            "Remarks": remarks.trim(),
            "QueueTimeOutURL": config.queue_timeout_url(),
            "ResultURL": config.result_url(),
            "Occasion": occasion.trim(),
        });

        self.client
            .post(&config, B2C_PAYMENT_REQUEST_PATH, payload)
            .await
    }
}
