use async_trait::async_trait;

use crate::{GrantType, MultiValueMap, OAuth2Parameters, OAuthError};

/// The OAuth 2.0 operations a connect flow drives: build the redirect URL, then
/// trade the callback's authorization code (or a refresh token) for a grant.
#[async_trait]
pub trait OAuth2Operations: Send + Sync {
    type Grant: Send;

    fn build_authorize_url(&self, grant_type: GrantType, parameters: &OAuth2Parameters) -> String;

    /// Like [`build_authorize_url`](Self::build_authorize_url), but against the
    /// provider's authenticate endpoint when it has one.
    fn build_authenticate_url(
        &self,
        grant_type: GrantType,
        parameters: &OAuth2Parameters,
    ) -> String;

    async fn exchange_for_access(
        &self,
        authorization_code: &str,
        redirect_uri: &str,
        additional_parameters: Option<&MultiValueMap>,
    ) -> Result<Self::Grant, OAuthError>;

    async fn refresh_access(
        &self,
        refresh_token: &str,
        scope: Option<&str>,
        additional_parameters: Option<&MultiValueMap>,
    ) -> Result<Self::Grant, OAuthError>;
}
