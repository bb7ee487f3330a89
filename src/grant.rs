use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{OAuthError, TokenResponseBody};

/// Normalized result of a successful token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub access_token: String,
    pub scope: Option<String>,
    pub refresh_token: Option<String>,
    /// Lifetime in seconds; `None` when the provider did not say.
    pub expires_in: Option<u64>,
}

impl AccessGrant {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            scope: None,
            refresh_token: None,
            expires_in: None,
        }
    }
}

/// Turns the extracted grant fields into the value handed back to callers.
///
/// Providers that return extra claims in the token response implement this to
/// build a richer grant from the raw body.
pub trait GrantFactory: Send + Sync {
    type Grant: Send;

    fn create_grant(&self, grant: AccessGrant, response: &TokenResponseBody) -> Self::Grant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGrantFactory;

impl GrantFactory for DefaultGrantFactory {
    type Grant = AccessGrant;

    fn create_grant(&self, grant: AccessGrant, _response: &TokenResponseBody) -> AccessGrant {
        grant
    }
}

/// Reads `access_token`, `scope`, `refresh_token` and `expires_in` from a parsed
/// token response.
///
/// A missing or empty `access_token` is an error rather than an empty grant.
pub fn extract_access_grant(response: &TokenResponseBody) -> Result<AccessGrant, OAuthError> {
    let access_token = match optional_string(response, "access_token")? {
        Some(token) if !token.is_empty() => token,
        _ => return Err(invalid(response, "token response has no access_token")),
    };

    Ok(AccessGrant {
        access_token,
        scope: optional_string(response, "scope")?,
        refresh_token: optional_string(response, "refresh_token")?,
        expires_in: optional_seconds(response, "expires_in")?,
    })
}

fn optional_string(response: &TokenResponseBody, key: &str) -> Result<Option<String>, OAuthError> {
    match response.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(invalid(response, &format!("{key} is not a string"))),
    }
}

fn optional_seconds(response: &TokenResponseBody, key: &str) -> Result<Option<u64>, OAuthError> {
    let parsed = match response.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number.as_u64(),
        // form-encoded responses carry every value as a string
        Some(Value::String(value)) => value.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| invalid(response, &format!("{key} is not a non-negative integer")))
}

fn invalid(response: &TokenResponseBody, message: &str) -> OAuthError {
    OAuthError::InvalidResponse {
        message: message.to_string(),
        body: Value::Object(response.clone()).to_string(),
    }
}
