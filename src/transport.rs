use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE, HeaderValue},
};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::{MultiValueMap, OAuthError};

/// Parsed key/value body of a token endpoint response.
pub type TokenResponseBody = Map<String, Value>;

const ACCEPT_TOKEN_BODIES: &str = "application/json, application/x-www-form-urlencoded";

/// Submits a form-encoded POST and returns the parsed response body.
///
/// Implementations own every transport concern (TLS, proxies, timeouts) and
/// must be safe to share between concurrent exchanges. A non-success status
/// must be reported as [`OAuthError::HttpStatus`].
#[async_trait]
pub trait FormTransport: Send + Sync {
    async fn submit_form(
        &self,
        url: &str,
        form: &MultiValueMap,
    ) -> Result<TokenResponseBody, OAuthError>;
}

/// Default transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, OAuthError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    /// Uses a caller-built client, e.g. one with custom TLS roots or a proxy.
    pub fn from_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl FormTransport for ReqwestTransport {
    async fn submit_form(
        &self,
        url: &str,
        form: &MultiValueMap,
    ) -> Result<TokenResponseBody, OAuthError> {
        let pairs: Vec<(&str, &str)> = form.pairs().collect();
        let response = self
            .http
            .post(url)
            .header(ACCEPT, HeaderValue::from_static(ACCEPT_TOKEN_BODIES))
            .form(&pairs)
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "token endpoint rejected request");
            return Err(OAuthError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        parse_token_body(content_type.as_deref(), body)
    }
}

/// Parses a token endpoint body as a JSON object, or as form-encoded pairs for
/// providers that answer with `application/x-www-form-urlencoded` or
/// `text/plain`.
pub fn parse_token_body(
    content_type: Option<&str>,
    body: String,
) -> Result<TokenResponseBody, OAuthError> {
    let media_type = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if media_type.contains("json") || body.trim_start().starts_with('{') {
        return match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(OAuthError::InvalidResponse {
                message: "token response is not a JSON object".to_string(),
                body,
            }),
            Err(err) => Err(OAuthError::InvalidResponse {
                message: err.to_string(),
                body,
            }),
        };
    }

    if media_type == "application/x-www-form-urlencoded" || media_type == "text/plain" {
        let map: TokenResponseBody = form_urlencoded::parse(body.trim().as_bytes())
            .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
            .collect();
        if map.is_empty() {
            return Err(OAuthError::InvalidResponse {
                message: "empty form-encoded token response".to_string(),
                body,
            });
        }
        return Ok(map);
    }

    Err(OAuthError::InvalidResponse {
        message: format!("unsupported token response content type: {media_type:?}"),
        body,
    })
}
