use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("missing required configuration: {field}")]
    Misconfiguration { field: &'static str },

    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String, body: String },
}

impl OAuthError {
    /// True for failures reported by the token endpoint itself: a non-success
    /// status or a body that could not be turned into an access grant.
    pub fn is_exchange_failure(&self) -> bool {
        matches!(
            self,
            OAuthError::HttpStatus { .. } | OAuthError::InvalidResponse { .. }
        )
    }

    /// The RFC 6749 `error` code (`invalid_grant`, `invalid_client`, ...) from a
    /// rejected token request, when the endpoint answered with a JSON error body.
    pub fn oauth_error_code(&self) -> Option<String> {
        let OAuthError::HttpStatus { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value.get("error")?.as_str().map(str::to_string)
    }
}
