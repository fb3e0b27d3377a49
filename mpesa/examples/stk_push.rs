//! Send an STK push prompt using settings from `MPESA_*` environment variables.
//!
//! ```shell
//! MPESA_CONSUMER_KEY=... MPESA_CONSUMER_SECRET=... MPESA_SHORT_CODE=174379 \
//! MPESA_IDENTIFIER_TYPE=PAYBILL MPESA_PASSKEY=... MPESA_STK_CALLBACK_URL=https://example.com/cb \
//!     cargo run --example stk_push -- 254708374149 1
//! ```

use mpesa::{Config, Mpesa};
use mpesa_core::{Context, OsEnv};
use mpesa_file_read_tokio::TokioFileRead;
use mpesa_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let phone = args.next().unwrap_or_else(|| "254708374149".to_string());
    let amount: i64 = args.next().as_deref().unwrap_or("1").parse()?;

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::from_env(&ctx)?;
    let mpesa = Mpesa::new(ctx, config);

    match mpesa
        .c2b()
        .initiate_stk_push(amount, &phone, "example", "stk push example", None)
        .await
    {
        Ok(resp) => println!("accepted: {resp}"),
        Err(err) if err.is_client() => {
            println!("rejected ({:?}): {}", err.status_code(), err.body().unwrap_or_default())
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
