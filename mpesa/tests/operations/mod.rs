use crate::mock::{client, full_config, MockHttpSend};
use mpesa::constants::*;
use mpesa_core::hash::base64_encode;
use mpesa_core::{ErrorKind, Result};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[tokio::test]
async fn test_stk_push() -> Result<()> {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    let resp = mpesa
        .c2b()
        .initiate_stk_push(10, " 254708374149 ", "INV-001", "Invoice 1", Some("20240101120000"))
        .await?;
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.json::<Value>()?["ResponseCode"], "0");

    let req = mock.last_api_request();
    assert_eq!(req.method, "POST");
    assert_eq!(
        req.uri,
        format!("{SANDBOX_BASE_URL}{STK_PUSH_PATH}")
    );
    assert_eq!(req.header("authorization"), Some("Bearer token-1"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(
        req.body,
        json!({
            "BusinessShortCode": "174379",
            "Password": base64_encode(
                b"174379bfb279f9aa9bdbcf158e97dd71a467cd2e0c893059b10f78e6b72ada1ed2c91920240101120000"
            ),
            "Timestamp": "20240101120000",
            "TransactionType": COMMAND_ID_CUSTOMER_PAY_BILL_ONLINE,
            "Amount": 10,
            "PartyA": "254708374149",
            "PartyB": "600000",
            "PhoneNumber": "254708374149",
            "CallBackURL": "https://example.com/stk",
            "AccountReference": "INV-001",
            "TransactionDesc": "Invoice 1",
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_stk_push_default_timestamp() -> Result<()> {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    mpesa
        .c2b()
        .initiate_stk_push(10, "254708374149", "INV-001", "Invoice 1", None)
        .await?;

    let req = mock.last_api_request();
    let timestamp = req.body["Timestamp"].as_str().unwrap().to_string();
    assert_eq!(timestamp.len(), 14);
    assert!(timestamp.bytes().all(|b| b.is_ascii_digit()));
    assert_eq!(
        req.body["Password"],
        mpesa.config().password(&timestamp).as_str()
    );
    Ok(())
}

#[tokio::test]
async fn test_stk_push_query() -> Result<()> {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    mpesa
        .c2b()
        .stk_push_query("ws_CO_191220191020363925", Some("20240101120000"))
        .await?;

    let req = mock.last_api_request();
    assert_eq!(req.uri, format!("{SANDBOX_BASE_URL}{STK_PUSH_QUERY_PATH}"));
    assert_eq!(req.body["BusinessShortCode"], "174379");
    assert_eq!(req.body["CheckoutRequestID"], "ws_CO_191220191020363925");
    assert_eq!(req.body["Timestamp"], "20240101120000");
    Ok(())
}

#[tokio::test]
async fn test_b2c_send() -> Result<()> {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    mpesa
        .b2c(COMMAND_ID_BUSINESS_PAYMENT)
        .send(100, "254708374149", "refund", "order-1")
        .await?;

    let req = mock.last_api_request();
    assert_eq!(
        req.uri,
        format!("{SANDBOX_BASE_URL}{B2C_PAYMENT_REQUEST_PATH}")
    );
    assert_eq!(
        req.body,
        json!({
            "InitiatorName": "testapi",
            "SecurityCredential": "precomputed-credential",
            "CommandID": "BusinessPayment",
            "Amount": 100,
            "PartyA": "600000",
            "PartyB": "254708374149",
            "Remarks": "refund",
            "QueueTimeOutURL": "https://example.com/timeout",
            "ResultURL": "https://example.com/result",
            "Occasion": "order-1",
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_b2b_send() -> Result<()> {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    mpesa
        .b2b(COMMAND_ID_BUSINESS_PAY_BILL)
        .send(250, "600001", "paybill", "ACC-42", "supplier")
        .await?;

    let req = mock.last_api_request();
    assert_eq!(
        req.uri,
        format!("{SANDBOX_BASE_URL}{B2B_PAYMENT_REQUEST_PATH}")
    );
    assert_eq!(
        req.body,
        json!({
            "Initiator": "testapi",
            "SecurityCredential": "precomputed-credential",
            "CommandID": "BusinessPayBill",
            "SenderIdentifierType": "4",
            "RecieverIdentifierType": "4",
            "Amount": 250,
            "PartyA": "600000",
            "PartyB": "600001",
            "AccountReference": "ACC-42",
            "Remarks": "supplier",
            "QueueTimeOutURL": "https://example.com/timeout",
            "ResultURL": "https://example.com/result",
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_b2b_business_pay_bill_requires_account_reference() {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    let err = mpesa
        .b2b(COMMAND_ID_BUSINESS_PAY_BILL)
        .send(250, "600001", "PAYBILL", "  ", "supplier")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.message().contains("'account_reference'"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_b2b_buy_goods_without_account_reference() -> Result<()> {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    mpesa
        .b2b(COMMAND_ID_BUSINESS_BUY_GOODS)
        .send(250, "600001", "TILL", "", "supplier")
        .await?;

    let req = mock.last_api_request();
    assert_eq!(req.body["RecieverIdentifierType"], "2");
    assert!(req.body.get("AccountReference").is_none());
    Ok(())
}

#[tokio::test]
async fn test_c2b_register_url() -> Result<()> {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    mpesa.c2b().register_url().await?;
    mpesa
        .c2b()
        .with_response_type(RESPONSE_TYPE_CANCELLED)
        .register_url()
        .await?;

    let reqs = mock.api_requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(
        reqs[0].body,
        json!({
            "ShortCode": "600000",
            "ResponseType": "Completed",
            "ConfirmationURL": "https://example.com/confirmation",
            "ValidationURL": "https://example.com/validation",
        })
    );
    assert_eq!(reqs[1].body["ResponseType"], "Cancelled");
    Ok(())
}

#[tokio::test]
async fn test_c2b_simulate_paybill() -> Result<()> {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    mpesa.c2b().simulate(5, "254708374149", "INV-7").await?;

    let req = mock.last_api_request();
    assert_eq!(req.uri, format!("{SANDBOX_BASE_URL}{C2B_SIMULATE_PATH}"));
    assert_eq!(
        req.body,
        json!({
            "ShortCode": "600000",
            "CommandID": "CustomerPayBillOnline",
            "Amount": 5,
            "Msisdn": "254708374149",
            "BillRefNumber": "INV-7",
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_c2b_simulate_till_drops_bill_ref() -> Result<()> {
    let mock = MockHttpSend::new();
    let mut config = full_config();
    config.set_short_code("5566778", "till")?;
    let mpesa = client(&mock, config);

    mpesa.c2b().simulate(5, "254708374149", "INV-7").await?;

    let req = mock.last_api_request();
    assert_eq!(req.body["CommandID"], "CustomerBuyGoodsOnline");
    assert!(req.body.get("BillRefNumber").is_none());
    Ok(())
}

#[tokio::test]
async fn test_c2b_simulate_in_production() {
    let mock = MockHttpSend::new();
    let mut config = full_config();
    config.set_environment(false);
    let mpesa = client(&mock, config);

    let err = mpesa
        .c2b()
        .simulate(5, "254708374149", "INV-7")
        .await
        .unwrap_err();

    assert!(err.is_internal());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_account_balance() -> Result<()> {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    mpesa.account_balance("monthly check").await?;

    let req = mock.last_api_request();
    assert_eq!(req.uri, format!("{SANDBOX_BASE_URL}{ACCOUNT_BALANCE_PATH}"));
    assert_eq!(
        req.body,
        json!({
            "Initiator": "testapi",
            "SecurityCredential": "precomputed-credential",
            "CommandID": "AccountBalance",
            "PartyA": "600000",
            "IdentifierType": "4",
            "Remarks": "monthly check",
            "QueueTimeOutURL": "https://example.com/timeout",
            "ResultURL": "https://example.com/result",
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_transaction_status() -> Result<()> {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    mpesa
        .transaction_status("", "AG_20240101_0000", "lookup", "")
        .await?;

    let req = mock.last_api_request();
    assert_eq!(
        req.uri,
        format!("{SANDBOX_BASE_URL}{TRANSACTION_STATUS_PATH}")
    );
    assert_eq!(req.body["CommandID"], "TransactionStatusQuery");
    assert_eq!(req.body["OriginalConversationID"], "AG_20240101_0000");
    assert!(req.body.get("TransactionID").is_none());
    Ok(())
}

#[tokio::test]
async fn test_transaction_status_requires_an_id() {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    let err = mpesa
        .transaction_status(" ", "", "lookup", "")
        .await
        .unwrap_err();

    assert!(err.is_internal());
    assert!(err.message().contains("'transaction_id'"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_reverse_transaction() -> Result<()> {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    mpesa
        .reverse_transaction("OEI2AK4Q16", 100, "600000", "shortcode", "wrong amount", "")
        .await?;

    let req = mock.last_api_request();
    assert_eq!(req.uri, format!("{SANDBOX_BASE_URL}{REVERSAL_PATH}"));
    assert_eq!(req.body["CommandID"], "TransactionReversal");
    assert_eq!(req.body["TransactionID"], "OEI2AK4Q16");
    assert_eq!(req.body["Amount"], 100);
    assert_eq!(req.body["ReceiverParty"], "600000");
    assert_eq!(req.body["RecieverIdentifierType"], "4");
    Ok(())
}

#[tokio::test]
async fn test_pull_transactions() -> Result<()> {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    mpesa.c2b().pull_transactions_register().await?;
    mpesa
        .c2b()
        .pull_transactions_query("2024-01-01 00:00:00", "2024-01-02 00:00:00", 0)
        .await?;

    let reqs = mock.api_requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(
        reqs[0].uri,
        format!("{SANDBOX_BASE_URL}{PULL_TRANSACTIONS_REGISTER_PATH}")
    );
    assert_eq!(
        reqs[0].body,
        json!({
            "ShortCode": "600000",
            "RequestType": "Pull",
            "NominatedNumber": "254708374149",
            "CallBackURL": "https://example.com/pull",
        })
    );
    assert_eq!(
        reqs[1].body,
        json!({
            "ShortCode": "600000",
            "StartDate": "2024-01-01 00:00:00",
            "EndDate": "2024-01-02 00:00:00",
            "OffSetValue": "0",
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_production_base_url() -> Result<()> {
    let mock = MockHttpSend::new();
    let mut config = full_config();
    config.set_environment(false);
    let mpesa = client(&mock, config);

    mpesa.c2b().register_url().await?;

    let reqs = mock.requests();
    assert_eq!(reqs.len(), 2);
    assert!(reqs[0].uri.starts_with(PRODUCTION_BASE_URL));
    assert_eq!(
        reqs[1].uri,
        format!("{PRODUCTION_BASE_URL}{C2B_REGISTER_URL_PATH}")
    );
    Ok(())
}

#[tokio::test]
async fn test_invalid_input_never_reaches_transport() {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());
    let c2b = mpesa.c2b();

    let results = vec![
        mpesa.b2c("Unknown").send(10, "254708374149", "x", "").await,
        mpesa.b2c(COMMAND_ID_SALARY_PAYMENT).send(0, "254708374149", "x", "").await,
        mpesa.b2c(COMMAND_ID_SALARY_PAYMENT).send(10, "", "x", "").await,
        mpesa.b2c(COMMAND_ID_SALARY_PAYMENT).send(10, "254708374149", "", "").await,
        mpesa.b2b(COMMAND_ID_SALARY_PAYMENT).send(10, "600001", "PAYBILL", "A", "x").await,
        mpesa.b2b(COMMAND_ID_BUSINESS_BUY_GOODS).send(10, "600001", "BANK", "", "x").await,
        mpesa.b2b(COMMAND_ID_BUSINESS_BUY_GOODS).send(-5, "600001", "TILL", "", "x").await,
        c2b.initiate_stk_push(0, "254708374149", "A", "B", None).await,
        c2b.initiate_stk_push(10, "", "A", "B", None).await,
        c2b.initiate_stk_push(10, "254708374149", "A", "B", Some("yesterday")).await,
        c2b.stk_push_query("", None).await,
        c2b.simulate(0, "254708374149", "A").await,
        c2b.simulate(10, "", "A").await,
        c2b.clone().with_response_type("Ignored").register_url().await,
        c2b.pull_transactions_query("", "2024-01-02 00:00:00", 0).await,
        c2b.pull_transactions_query("2024-01-01 00:00:00", "2024-01-02 00:00:00", -1).await,
        mpesa.account_balance("").await,
        mpesa.reverse_transaction("", 10, "600000", "PAYBILL", "x", "").await,
        mpesa.reverse_transaction("OEI2AK4Q16", 0, "600000", "PAYBILL", "x", "").await,
        mpesa.reverse_transaction("OEI2AK4Q16", 10, "", "PAYBILL", "x", "").await,
        mpesa.reverse_transaction("OEI2AK4Q16", 10, "600000", "BANK", "x", "").await,
    ];

    for (idx, result) in results.into_iter().enumerate() {
        let err = result.expect_err(&format!("case {idx} must fail"));
        assert_eq!(err.kind(), ErrorKind::Internal, "case {idx}: {err}");
    }
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_missing_config_never_reaches_transport() {
    let mock = MockHttpSend::new();
    let mpesa = client(&mock, full_config());

    let cases: Vec<(&str, &str)> = vec![
        ("initiator_name", ""),
        ("queue_timeout_url", ""),
        ("result_url", ""),
        ("passkey", ""),
        ("stk_callback_url", ""),
        ("confirmation_url", ""),
        ("organization_msisdn", ""),
    ];

    for (key, value) in cases {
        let mut config = full_config();
        config.set(key, value).unwrap();
        mpesa.set_config(config);

        let results = vec![
            mpesa.account_balance("check").await,
            mpesa.c2b().initiate_stk_push(10, "254708374149", "A", "B", None).await,
            mpesa.c2b().register_url().await,
            mpesa.c2b().pull_transactions_register().await,
        ];
        let failed: Vec<_> = results.into_iter().filter_map(|r| r.err()).collect();
        assert!(
            failed
                .iter()
                .any(|e| e.is_internal() && e.message().contains(&format!("'{key}'"))),
            "missing {key} must be reported"
        );
    }
}

#[tokio::test]
async fn test_client_error_keeps_request() {
    let body = r#"{"errorCode":"404.001.03","errorMessage":"Invalid Access Token"}"#;
    let mock = MockHttpSend::new().with_api_response(401, body);
    let mpesa = client(&mock, full_config());

    let err = mpesa
        .c2b()
        .stk_push_query("ws_CO_1", Some("20240101120000"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Client);
    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.body(), Some(body));

    let params = err.request().expect("request params must be attached");
    assert_eq!(params.method, "POST");
    assert_eq!(params.url, format!("{SANDBOX_BASE_URL}{STK_PUSH_QUERY_PATH}"));
    let sent: Value = serde_json::from_str(&params.body).unwrap();
    assert_eq!(sent, mock.last_api_request().body);
    assert_eq!(sent["CheckoutRequestID"], "ws_CO_1");
}

#[tokio::test]
async fn test_server_error() {
    let mock = MockHttpSend::new().with_api_response(503, "service unavailable");
    let mpesa = client(&mock, full_config());

    let err = mpesa.c2b().register_url().await.unwrap_err();

    assert!(err.is_server());
    assert_eq!(err.status_code(), Some(503));
    assert_eq!(err.body(), Some("service unavailable"));
    assert!(err.request().is_some());
}

#[tokio::test]
async fn test_transport_failure_is_internal() {
    let mock = MockHttpSend::new().failing();
    let mpesa = client(&mock, full_config());

    let err = mpesa.c2b().register_url().await.unwrap_err();

    assert!(err.is_internal());
    assert!(err.message().contains("connection refused"));
    assert!(err.status_code().is_none());
}
