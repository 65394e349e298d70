use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use sha2::Sha256;

use crate::error::{AppError, Result};

pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

pub struct LineClient {
    client: Client,
    api_base: String,
    channel_token: String,
}

impl LineClient {
    pub fn new(api_base: &str, channel_token: &str, timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build reply client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            channel_token: channel_token.to_string(),
        })
    }
}

#[async_trait]
impl ReplySender for LineClient {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        let body = ReplyRequest {
            reply_token,
            messages: vec![TextMessage { kind: "text", text }],
        };

        let res = self
            .client
            .post(format!("{}/v2/bot/message/reply", self.api_base))
            .bearer_auth(&self.channel_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ReplyError(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            return Err(AppError::ReplyError(format!("{}: {}", status, detail)));
        }

        Ok(())
    }
}

/// Base64 HMAC-SHA256 of `body` keyed by the channel secret.
pub fn sign(channel_secret: &str, body: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|e| AppError::ConfigError(format!("Invalid channel secret: {}", e)))?;
    mac.update(body);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> Result<()> {
    let expected = STANDARD
        .decode(signature.trim())
        .map_err(|_| AppError::SignatureError)?;

    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|_| AppError::SignatureError)?;
    mac.update(body);
    mac.verify_slice(&expected).map_err(|_| AppError::SignatureError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn signature_round_trips() {
        let body = br#"{"events":[]}"#;
        let signature = sign("secret", body).unwrap();
        assert!(verify_signature("secret", body, &signature).is_ok());
    }

    #[test]
    fn tampered_body_or_wrong_secret_is_rejected() {
        let body = br#"{"events":[]}"#;
        let signature = sign("secret", body).unwrap();

        assert!(matches!(
            verify_signature("secret", br#"{"events":[{}]}"#, &signature),
            Err(AppError::SignatureError)
        ));
        assert!(matches!(
            verify_signature("other", body, &signature),
            Err(AppError::SignatureError)
        ));
        assert!(matches!(
            verify_signature("secret", body, "not base64!"),
            Err(AppError::SignatureError)
        ));
    }

    #[tokio::test]
    async fn reply_posts_text_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .and(header("authorization", "Bearer token"))
            .and(body_json(json!({
                "replyToken": "abc",
                "messages": [{ "type": "text", "text": "こんにちは" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = LineClient::new(&server.uri(), "token", Duration::from_secs(5)).unwrap();
        client.reply("abc", "こんにちは").await.unwrap();
    }

    #[tokio::test]
    async fn reply_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid reply token"))
            .mount(&server)
            .await;

        let client = LineClient::new(&server.uri(), "token", Duration::from_secs(5)).unwrap();
        let err = client.reply("expired", "hi").await.unwrap_err();

        match err {
            AppError::ReplyError(msg) => assert!(msg.contains("Invalid reply token")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reply_times_out_on_hung_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client =
            LineClient::new(&server.uri(), "token", Duration::from_millis(200)).unwrap();
        let err = client.reply("abc", "hi").await.unwrap_err();
        assert!(matches!(err, AppError::ReplyError(_)));
    }
}
