use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use mpesa::{Config, Mpesa};
use mpesa_core::{Context, HttpSend};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A request seen by [`MockHttpSend`].
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn is_token(&self) -> bool {
        self.uri.contains("/oauth/v1/generate")
    }
}

#[derive(Debug)]
struct State {
    requests: Vec<Recorded>,
    issued: usize,
    expires_in: Value,
    token_response: Option<(u16, String)>,
    api_response: (u16, String),
    token_delay: Option<Duration>,
    fail: bool,
}

/// MockHttpSend records every request and answers with canned responses.
///
/// Token requests get `token-<n>` where `n` counts the tokens issued so far.
#[derive(Debug, Clone)]
pub struct MockHttpSend {
    state: Arc<Mutex<State>>,
}

impl Default for MockHttpSend {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                requests: Vec::new(),
                issued: 0,
                expires_in: json!("3599"),
                token_response: None,
                api_response: (
                    200,
                    r#"{"ResponseCode":"0","ResponseDescription":"Success"}"#.to_string(),
                ),
                token_delay: None,
                fail: false,
            })),
        }
    }
}

impl MockHttpSend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expires_in(self, expires_in: Value) -> Self {
        self.state.lock().unwrap().expires_in = expires_in;
        self
    }

    pub fn with_token_response(self, status: u16, body: &str) -> Self {
        self.state.lock().unwrap().token_response = Some((status, body.to_string()));
        self
    }

    pub fn with_api_response(self, status: u16, body: &str) -> Self {
        self.state.lock().unwrap().api_response = (status, body.to_string());
        self
    }

    pub fn with_token_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().token_delay = Some(delay);
        self
    }

    pub fn failing(self) -> Self {
        self.state.lock().unwrap().fail = true;
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn token_requests(&self) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.is_token()).collect()
    }

    pub fn api_requests(&self) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| !r.is_token()).collect()
    }

    /// The single operation request sent so far.
    pub fn last_api_request(&self) -> Recorded {
        let mut requests = self.api_requests();
        assert_eq!(requests.len(), 1, "expected exactly one api request");
        requests.remove(0)
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> anyhow::Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();
        let recorded = Recorded {
            method: parts.method.to_string(),
            uri: parts.uri.to_string(),
            headers: parts.headers,
            body: serde_json::from_slice(&body)?,
        };
        let is_token = recorded.is_token();

        let (delay, status, body) = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(recorded);
            if state.fail {
                return Err(anyhow!("connection refused"));
            }

            if is_token {
                state.issued += 1;
                let (status, body) = match &state.token_response {
                    Some(resp) => resp.clone(),
                    None => (
                        200,
                        json!({
                            "access_token": format!("token-{}", state.issued),
                            "expires_in": state.expires_in,
                        })
                        .to_string(),
                    ),
                };
                (state.token_delay, status, body)
            } else {
                let (status, body) = state.api_response.clone();
                (None, status, body)
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(http::Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::from(body))?)
    }
}

/// A sandbox config with every field an operation may need.
pub fn full_config() -> Config {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut config = Config::new();
    config
        .set_consumer_key("abc")
        .set_consumer_secret("def")
        .set_initiator_name("testapi")
        .set_security_credential("precomputed-credential")
        .set_passkey("bfb279f9aa9bdbcf158e97dd71a467cd2e0c893059b10f78e6b72ada1ed2c919")
        .set_business_short_code("174379")
        .set_confirmation_url("https://example.com/confirmation")
        .set_validation_url("https://example.com/validation")
        .set_stk_callback_url("https://example.com/stk")
        .set_queue_timeout_url("https://example.com/timeout")
        .set_result_url("https://example.com/result")
        .set_organization_msisdn("254708374149")
        .set_pull_callback_url("https://example.com/pull");
    config
        .set_short_code("600000", "PAYBILL")
        .expect("identifier type must be valid");
    config
}

pub fn client(mock: &MockHttpSend, config: Config) -> Mpesa {
    Mpesa::new(Context::new().with_http_send(mock.clone()), config)
}
