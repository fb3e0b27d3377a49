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
use crate::config::IdentifierType;
use crate::constants::{B2B_COMMAND_IDS, B2B_PAYMENT_REQUEST_PATH, COMMAND_ID_BUSINESS_PAY_BILL};
use crate::dispatcher::Response;
use mpesa_core::validate::{require_in_range, require_non_empty, require_one_of};
use mpesa_core::Result;
use serde_json::{json, Value};

/// Business to business payments.
///
/// Created by [`Mpesa::b2b`].
#[derive(Debug, Clone)]
pub struct B2B<'a> {
    client: &'a Mpesa,
    command_id: String,
}

impl<'a> B2B<'a> {
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

    /// Send `amount` from the configured short code to `to`.
    ///
    /// `account_reference` is required for `BusinessPayBill` and optional
    /// otherwise.
    pub async fn send(
        &self,
        amount: i64,
        to: &str,
        receiver_identifier_type: &str,
        account_reference: &str,
        remarks: &str,
    ) -> Result<Response> {
        let config = self.client.config();
        require_one_of("command_id", &self.command_id, B2B_COMMAND_IDS)?;
        require_in_range("amount", amount, Some(1), None)?;
        require_non_empty("to", to)?;
        let receiver_identifier_type =
            IdentifierType::parse("receiver_identifier_type", receiver_identifier_type)?;
        if self.command_id == COMMAND_ID_BUSINESS_PAY_BILL {
            require_non_empty("account_reference", account_reference)?;
        }
        require_non_empty("remarks", remarks)?;
        let (sender_identifier_type, security_credential) =
            self.client.initiator(&config).await?;

        let mut payload = json!({
            "Initiator": config.initiator_name(),
            "SecurityCredential": security_credential,
            "CommandID": self.command_id,
            "SenderIdentifierType": sender_identifier_type.code(),
            "RecieverIdentifierType": receiver_identifier_type.code(),
            "Amount": amount,
            "PartyA": config.short_code(),
            "PartyB": to.trim(),
            "Remarks": remarks.trim(),
            "QueueTimeOutURL": config.queue_timeout_url(),
            "ResultURL": config.result_url(),
        });
        if !account_reference.trim().is_empty() {
            payload["AccountReference"] = Value::from(account_reference.trim());
        }

        self.client
            .post(&config, B2B_PAYMENT_REQUEST_PATH, payload)
            .await
    }
}
