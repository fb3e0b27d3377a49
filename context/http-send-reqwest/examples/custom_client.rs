use anyhow::Result;
use mpesa_core::hash::base64_encode;
use mpesa_core::Context;
use mpesa_http_send_reqwest::ReqwestHttpSend;
use reqwest::Client;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("mpesa-example/0.1")
        .build()?;

    let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));

    let key = std::env::var("MPESA_CONSUMER_KEY").unwrap_or_default();
    let secret = std::env::var("MPESA_CONSUMER_SECRET").unwrap_or_default();

    let req = http::Request::builder()
        .method("GET")
        .uri("https://sandbox.safaricom.co.ke/oauth/v1/generate?grant_type=client_credentials")
        .header(
            "Authorization",
            format!("Basic {}", base64_encode(format!("{key}:{secret}").as_bytes())),
        )
        .body(bytes::Bytes::new())?;

    let resp = ctx.http_send(req).await?;
    println!("Response status: {}", resp.status());
    println!("Response body: {}", String::from_utf8_lossy(resp.body()));

    Ok(())
}
