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

// Base urls of the gateway.
pub const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke";
pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";

// Gateway certificates shipped in the crate's `certs/` directory, used when no
// certificate path is configured.
pub const DEFAULT_SANDBOX_CERTIFICATE_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/certs/sandbox.cer");
pub const DEFAULT_PRODUCTION_CERTIFICATE_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/certs/production.cer");

// Endpoint paths.
pub const GENERATE_TOKEN_PATH: &str = "/oauth/v1/generate?grant_type=client_credentials";
pub const B2C_PAYMENT_REQUEST_PATH: &str = "/mpesa/b2c/v1/paymentrequest";
pub const B2B_PAYMENT_REQUEST_PATH: &str = "/mpesa/b2b/v1/paymentrequest";
pub const C2B_REGISTER_URL_PATH: &str = "/mpesa/c2b/v1/registerurl";
pub const C2B_SIMULATE_PATH: &str = "/mpesa/c2b/v1/simulate";
pub const ACCOUNT_BALANCE_PATH: &str = "/mpesa/accountbalance/v1/query";
pub const TRANSACTION_STATUS_PATH: &str = "/mpesa/transactionstatus/v1/query";
pub const REVERSAL_PATH: &str = "/mpesa/reversal/v1/request";
pub const STK_PUSH_PATH: &str = "/mpesa/stkpush/v1/processrequest";
pub const STK_PUSH_QUERY_PATH: &str = "/mpesa/stkpushquery/v1/query";
pub const PULL_TRANSACTIONS_REGISTER_PATH: &str = "/pulltransactions/v1/register";
pub const PULL_TRANSACTIONS_QUERY_PATH: &str = "/pulltransactions/v1/query";

// Command ids.
pub const COMMAND_ID_SALARY_PAYMENT: &str = "SalaryPayment";
pub const COMMAND_ID_BUSINESS_PAYMENT: &str = "BusinessPayment";
pub const COMMAND_ID_PROMOTION_PAYMENT: &str = "PromotionPayment";
pub const COMMAND_ID_BUSINESS_PAY_BILL: &str = "BusinessPayBill";
pub const COMMAND_ID_BUSINESS_BUY_GOODS: &str = "BusinessBuyGoods";
pub const COMMAND_ID_DISBURSE_FUNDS_TO_BUSINESS: &str = "DisburseFundsToBusiness";
pub const COMMAND_ID_BUSINESS_TO_BUSINESS_TRANSFER: &str = "BusinessToBusinessTransfer";
pub const COMMAND_ID_MERCHANT_TO_MERCHANT_TRANSFER: &str = "MerchantToMerchantTransfer";
pub const COMMAND_ID_CUSTOMER_PAY_BILL_ONLINE: &str = "CustomerPayBillOnline";
pub const COMMAND_ID_CUSTOMER_BUY_GOODS_ONLINE: &str = "CustomerBuyGoodsOnline";
pub const COMMAND_ID_ACCOUNT_BALANCE: &str = "AccountBalance";
pub const COMMAND_ID_TRANSACTION_STATUS_QUERY: &str = "TransactionStatusQuery";
pub const COMMAND_ID_TRANSACTION_REVERSAL: &str = "TransactionReversal";

pub const B2C_COMMAND_IDS: &[&str] = &[
    COMMAND_ID_SALARY_PAYMENT,
    COMMAND_ID_BUSINESS_PAYMENT,
    COMMAND_ID_PROMOTION_PAYMENT,
];

pub const B2B_COMMAND_IDS: &[&str] = &[
    COMMAND_ID_BUSINESS_PAY_BILL,
    COMMAND_ID_BUSINESS_BUY_GOODS,
    COMMAND_ID_DISBURSE_FUNDS_TO_BUSINESS,
    COMMAND_ID_BUSINESS_TO_BUSINESS_TRANSFER,
    COMMAND_ID_MERCHANT_TO_MERCHANT_TRANSFER,
];

// C2B register url response types.
pub const RESPONSE_TYPE_COMPLETED: &str = "Completed";
pub const RESPONSE_TYPE_CANCELLED: &str = "Cancelled";

// Env values used by `Config::from_env`.
pub const MPESA_CONSUMER_KEY: &str = "MPESA_CONSUMER_KEY";
pub const MPESA_CONSUMER_SECRET: &str = "MPESA_CONSUMER_SECRET";
pub const MPESA_ENVIRONMENT: &str = "MPESA_ENVIRONMENT";
pub const MPESA_INITIATOR_NAME: &str = "MPESA_INITIATOR_NAME";
pub const MPESA_INITIATOR_PASSWORD: &str = "MPESA_INITIATOR_PASSWORD";
pub const MPESA_SECURITY_CREDENTIAL: &str = "MPESA_SECURITY_CREDENTIAL";
pub const MPESA_SANDBOX_CERTIFICATE_PATH: &str = "MPESA_SANDBOX_CERTIFICATE_PATH";
pub const MPESA_PRODUCTION_CERTIFICATE_PATH: &str = "MPESA_PRODUCTION_CERTIFICATE_PATH";
pub const MPESA_PASSKEY: &str = "MPESA_PASSKEY";
pub const MPESA_SHORT_CODE: &str = "MPESA_SHORT_CODE";
pub const MPESA_IDENTIFIER_TYPE: &str = "MPESA_IDENTIFIER_TYPE";
pub const MPESA_BUSINESS_SHORT_CODE: &str = "MPESA_BUSINESS_SHORT_CODE";
pub const MPESA_CONFIRMATION_URL: &str = "MPESA_CONFIRMATION_URL";
pub const MPESA_VALIDATION_URL: &str = "MPESA_VALIDATION_URL";
pub const MPESA_STK_CALLBACK_URL: &str = "MPESA_STK_CALLBACK_URL";
pub const MPESA_QUEUE_TIMEOUT_URL: &str = "MPESA_QUEUE_TIMEOUT_URL";
pub const MPESA_RESULT_URL: &str = "MPESA_RESULT_URL";
pub const MPESA_ORGANIZATION_MSISDN: &str = "MPESA_ORGANIZATION_MSISDN";
pub const MPESA_PULL_CALLBACK_URL: &str = "MPESA_PULL_CALLBACK_URL";
