use log::warn;
use mpesa::{Config, Mpesa};
use mpesa_core::{Context, OsEnv, Result};
use mpesa_file_read_tokio::TokioFileRead;
use mpesa_http_send_reqwest::ReqwestHttpSend;
use serde_json::Value;
use std::env;

fn init_client() -> Result<Option<Mpesa>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("MPESA_TEST").unwrap_or_default() != "on" {
        return Ok(None);
    }

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::from_env(&ctx)?;

    Ok(Some(Mpesa::new(ctx, config)))
}

#[tokio::test]
async fn test_live_token() -> Result<()> {
    let Some(mpesa) = init_client()? else {
        warn!("MPESA_TEST is not set, skipped");
        return Ok(());
    };

    let token = mpesa.token().await?;
    assert!(!token.is_empty());
    assert!(!mpesa.auth().has_expired());
    Ok(())
}

#[tokio::test]
async fn test_live_stk_push() -> Result<()> {
    let Some(mpesa) = init_client()? else {
        warn!("MPESA_TEST is not set, skipped");
        return Ok(());
    };
    let Ok(phone) = env::var("MPESA_TEST_PHONE_NUMBER") else {
        warn!("MPESA_TEST_PHONE_NUMBER is not set, skipped");
        return Ok(());
    };

    let resp = mpesa
        .c2b()
        .initiate_stk_push(1, &phone, "mpesa-rs", "integration test", None)
        .await?;

    let body: Value = resp.json()?;
    assert_eq!(body["ResponseCode"], "0");
    Ok(())
}
