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

use crate::client::{require_identifier_type, Mpesa};
use crate::config::IdentifierType;
use crate::constants::*;
use crate::dispatcher::Response;
use log::debug;
use mpesa_core::time::{format_timestamp, now};
use mpesa_core::validate::{require_in_range, require_non_empty, require_one_of};
use mpesa_core::{Error, Result};
use serde_json::{json, Value};

/// Customer to business operations.
///
/// Created by [`Mpesa::c2b`].
#[derive(Debug, Clone)]
pub struct C2B<'a> {
    client: &'a Mpesa,
    response_type: String,
}

impl<'a> C2B<'a> {
    pub(crate) fn new(client: &'a Mpesa) -> Self {
        Self {
            client,
            response_type: RESPONSE_TYPE_COMPLETED.to_string(),
        }
    }

    /// Set the action the gateway takes when the validation url is
    /// unreachable: `Completed` or `Cancelled`.
    pub fn with_response_type(mut self, response_type: &str) -> Self {
        self.response_type = response_type.trim().to_string();
        self
    }

    /// The response type used by [`C2B::register_url`].
    pub fn response_type(&self) -> &str {
        &self.response_type
    }

    /// Register the confirmation and validation urls of the short code.
    pub async fn register_url(&self) -> Result<Response> {
        let config = self.client.config();
        require_non_empty("short_code", config.short_code())?;
        require_non_empty("confirmation_url", config.confirmation_url())?;
        require_non_empty("validation_url", config.validation_url())?;
        require_one_of(
            "response_type",
            &self.response_type,
            &[RESPONSE_TYPE_COMPLETED, RESPONSE_TYPE_CANCELLED],
        )?;

        let payload = json!({
            "ShortCode": config.short_code(),
            "ResponseType": self.response_type,
            "ConfirmationURL": config.confirmation_url(),
            "ValidationURL": config.validation_url(),
        });

        self.client
            .post(&config, C2B_REGISTER_URL_PATH, payload)
            .await
    }

    /// Simulate a customer paying `amount` from `msisdn`.
    ///
    /// Only available in the sandbox. `bill_ref_number` is ignored for till
    /// numbers.
    pub async fn simulate(&self, amount: i64, msisdn: &str, bill_ref_number: &str) -> Result<Response> {
        let config = self.client.config();
        if !config.is_sandbox() {
            return Err(Error::internal(
                "c2b simulate is only available in the sandbox environment",
            ));
        }
        require_non_empty("short_code", config.short_code())?;
        let identifier_type = require_identifier_type(&config)?;
        require_non_empty("msisdn", msisdn)?;
        require_in_range("amount", amount, Some(1), None)?;

        let mut payload = json!({
            "ShortCode": config.short_code(),
            "CommandID": command_id(identifier_type),
            "Amount": amount,
            "Msisdn": msisdn.trim(),
        });
        if identifier_type != IdentifierType::Till {
            payload["BillRefNumber"] = Value::from(bill_ref_number.trim());
        }

        self.client.post(&config, C2B_SIMULATE_PATH, payload).await
    }

    /// Prompt the customer at `to` to authorize a payment of `amount`.
    ///
    /// `timestamp` uses the `YmdHis` format and defaults to the current time.
    pub async fn initiate_stk_push(
        &self,
        amount: i64,
        to: &str,
        account_reference: &str,
        description: &str,
        timestamp: Option<&str>,
    ) -> Result<Response> {
        let config = self.client.config();
        require_non_empty("business_short_code", config.business_short_code())?;
        require_non_empty("passkey", config.passkey())?;
        require_in_range("amount", amount, Some(1), None)?;
        require_non_empty("to", to)?;
        require_non_empty("short_code", config.short_code())?;
        require_non_empty("stk_callback_url", config.stk_callback_url())?;
        let timestamp = resolve_timestamp(timestamp)?;

        let transaction_type = command_id(config.identifier_type().unwrap_or(IdentifierType::Paybill));
        debug!("initiating stk push with timestamp {timestamp}");

        let payload = json!({
            "BusinessShortCode": config.business_short_code(),
            "Password": config.password(&timestamp),
            "Timestamp": timestamp,
            "TransactionType": transaction_type,
            "Amount": amount,
            "PartyA": to.trim(),
            "PartyB": config.short_code(),
            "PhoneNumber": to.trim(),
            "CallBackURL": config.stk_callback_url(),
            "AccountReference": account_reference.trim(),
            "TransactionDesc": description.trim(),
        });

        self.client.post(&config, STK_PUSH_PATH, payload).await
    }

    /// Query the status of an STK push.
    pub async fn stk_push_query(
        &self,
        checkout_request_id: &str,
        timestamp: Option<&str>,
    ) -> Result<Response> {
        let config = self.client.config();
        require_non_empty("business_short_code", config.business_short_code())?;
        require_non_empty("passkey", config.passkey())?;
        require_non_empty("checkout_request_id", checkout_request_id)?;
        let timestamp = resolve_timestamp(timestamp)?;

        let payload = json!({
            "BusinessShortCode": config.business_short_code(),
            "Password": config.password(&timestamp),
            "Timestamp": timestamp,
            "CheckoutRequestID": checkout_request_id.trim(),
        });

        self.client.post(&config, STK_PUSH_QUERY_PATH, payload).await
    }

    /// Register the short code for pull transaction queries.
    pub async fn pull_transactions_register(&self) -> Result<Response> {
        let config = self.client.config();
        require_non_empty("short_code", config.short_code())?;
        require_non_empty("organization_msisdn", config.organization_msisdn())?;
        require_non_empty("pull_callback_url", config.pull_callback_url())?;

        let payload = json!({
            "ShortCode": config.short_code(),
            "RequestType": "Pull",
            "NominatedNumber": config.organization_msisdn(),
            "CallBackURL": config.pull_callback_url(),
        });

        self.client
            .post(&config, PULL_TRANSACTIONS_REGISTER_PATH, payload)
            .await
    }

    /// Fetch transactions between `start_date` and `end_date`.
    ///
    /// Dates use the `Y-m-d H:i:s` format. `offset` pages through results.
    pub async fn pull_transactions_query(
        &self,
        start_date: &str,
        end_date: &str,
        offset: i64,
    ) -> Result<Response> {
        let config = self.client.config();
        require_non_empty("short_code", config.short_code())?;
        require_non_empty("start_date", start_date)?;
        require_non_empty("end_date", end_date)?;
        require_in_range("offset", offset, Some(0), None)?;

        let payload = json!({
            "ShortCode": config.short_code(),
            "StartDate": start_date.trim(),
            "EndDate": end_date.trim(),
            "OffSetValue": offset.to_string(),
        });

        self.client
            .post(&config, PULL_TRANSACTIONS_QUERY_PATH, payload)
            .await
    }
}

fn command_id(identifier_type: IdentifierType) -> &'static str {
    match identifier_type {
        IdentifierType::Till => COMMAND_ID_CUSTOMER_BUY_GOODS_ONLINE,
        _ => COMMAND_ID_CUSTOMER_PAY_BILL_ONLINE,
    }
}

fn resolve_timestamp(timestamp: Option<&str>) -> Result<String> {
    match timestamp.map(str::trim) {
        None | Some("") => Ok(format_timestamp(now())),
        Some(v) if v.len() == 14 && v.bytes().all(|b| b.is_ascii_digit()) => Ok(v.to_string()),
        Some(v) => Err(Error::internal(format!(
            "Invalid value: '{v}' for 'timestamp', expected YmdHis"
        ))),
    }
}
