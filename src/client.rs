use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::{
    DefaultGrantFactory, FormTransport, GrantFactory, GrantType, MultiValueMap, OAuth2Operations,
    OAuth2Parameters, OAuthError, ReqwestTransport,
    auth_url::{build_auth_url, client_base_url},
    grant::extract_access_grant,
};

#[derive(Debug, Clone)]
pub struct OAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub authenticate_url: Option<String>,
    pub access_token_url: String,
    pub timeout: Option<Duration>,
}

impl OAuth2Config {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorize_url: impl Into<String>,
        access_token_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_url: authorize_url.into(),
            authenticate_url: None,
            access_token_url: access_token_url.into(),
            timeout: None,
        }
    }

    pub fn with_authenticate_url(mut self, authenticate_url: impl Into<String>) -> Self {
        self.authenticate_url = Some(authenticate_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn validate(&self) -> Result<(), OAuthError> {
        let required = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("authorize_url", &self.authorize_url),
            ("access_token_url", &self.access_token_url),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(OAuthError::Misconfiguration { field });
            }
        }

        Url::parse(&self.authorize_url)?;
        Url::parse(&self.access_token_url)?;
        if let Some(authenticate_url) = &self.authenticate_url {
            Url::parse(authenticate_url)?;
        }
        Ok(())
    }
}

/// Builds authorize URLs and exchanges codes and refresh tokens for grants
/// against one provider registration.
///
/// Client id, secret and endpoints are fixed at construction. Calls share no
/// mutable state, so one client can serve concurrent exchanges.
#[derive(Clone)]
pub struct OAuth2Client<F = DefaultGrantFactory> {
    client_id: String,
    client_secret: String,
    access_token_url: String,
    authorize_url: String,
    authenticate_url: Option<String>,
    transport: Arc<dyn FormTransport>,
    grant_factory: F,
}

impl OAuth2Client<DefaultGrantFactory> {
    pub fn new(config: OAuth2Config) -> Result<Self, OAuthError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(config, transport)
    }

    pub fn with_transport(
        config: OAuth2Config,
        transport: impl FormTransport + 'static,
    ) -> Result<Self, OAuthError> {
        config.validate()?;
        let authorize_url = client_base_url(&config.authorize_url, &config.client_id);
        let authenticate_url = config
            .authenticate_url
            .as_deref()
            .map(|url| client_base_url(url, &config.client_id));

        Ok(Self {
            client_id: config.client_id,
            client_secret: config.client_secret,
            access_token_url: config.access_token_url,
            authorize_url,
            authenticate_url,
            transport: Arc::new(transport),
            grant_factory: DefaultGrantFactory,
        })
    }
}

impl<F: GrantFactory> OAuth2Client<F> {
    /// Replaces how the final grant is built from the token response.
    pub fn with_grant_factory<G: GrantFactory>(self, grant_factory: G) -> OAuth2Client<G> {
        OAuth2Client {
            client_id: self.client_id,
            client_secret: self.client_secret,
            access_token_url: self.access_token_url,
            authorize_url: self.authorize_url,
            authenticate_url: self.authenticate_url,
            transport: self.transport,
            grant_factory,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn access_token_url(&self) -> &str {
        &self.access_token_url
    }

    pub fn build_authorize_url(
        &self,
        grant_type: GrantType,
        parameters: &OAuth2Parameters,
    ) -> String {
        build_auth_url(&self.authorize_url, grant_type, parameters)
    }

    /// Falls back to [`build_authorize_url`](Self::build_authorize_url) when no
    /// authenticate endpoint was configured.
    pub fn build_authenticate_url(
        &self,
        grant_type: GrantType,
        parameters: &OAuth2Parameters,
    ) -> String {
        match &self.authenticate_url {
            Some(base) => build_auth_url(base, grant_type, parameters),
            None => self.build_authorize_url(grant_type, parameters),
        }
    }

    pub async fn exchange_for_access(
        &self,
        authorization_code: &str,
        redirect_uri: &str,
        additional_parameters: Option<&MultiValueMap>,
    ) -> Result<F::Grant, OAuthError> {
        let mut form = self.client_credentials();
        form.set("code", authorization_code);
        form.set("redirect_uri", redirect_uri);
        form.set("grant_type", "authorization_code");
        if let Some(additional) = additional_parameters {
            form.merge(additional);
        }

        self.post_for_access_grant("authorization_code", &form).await
    }

    pub async fn refresh_access(
        &self,
        refresh_token: &str,
        scope: Option<&str>,
        additional_parameters: Option<&MultiValueMap>,
    ) -> Result<F::Grant, OAuthError> {
        let mut form = self.client_credentials();
        form.set("refresh_token", refresh_token);
        if let Some(scope) = scope {
            form.set("scope", scope);
        }
        form.set("grant_type", "refresh_token");
        if let Some(additional) = additional_parameters {
            form.merge(additional);
        }

        self.post_for_access_grant("refresh_token", &form).await
    }

    fn client_credentials(&self) -> MultiValueMap {
        let mut form = MultiValueMap::new();
        form.set("client_id", self.client_id.as_str());
        form.set("client_secret", self.client_secret.as_str());
        form
    }

    async fn post_for_access_grant(
        &self,
        grant_type: &'static str,
        form: &MultiValueMap,
    ) -> Result<F::Grant, OAuthError> {
        tracing::debug!(
            token_url = %self.access_token_url,
            grant_type,
            "requesting access grant"
        );
        let response = self
            .transport
            .submit_form(&self.access_token_url, form)
            .await?;
        let grant = extract_access_grant(&response)?;
        tracing::debug!(
            grant_type,
            refresh_token = grant.refresh_token.is_some(),
            expires_in = ?grant.expires_in,
            "access grant issued"
        );
        Ok(self.grant_factory.create_grant(grant, &response))
    }
}

#[async_trait]
impl<F: GrantFactory> OAuth2Operations for OAuth2Client<F> {
    type Grant = F::Grant;

    fn build_authorize_url(&self, grant_type: GrantType, parameters: &OAuth2Parameters) -> String {
        OAuth2Client::build_authorize_url(self, grant_type, parameters)
    }

    fn build_authenticate_url(
        &self,
        grant_type: GrantType,
        parameters: &OAuth2Parameters,
    ) -> String {
        OAuth2Client::build_authenticate_url(self, grant_type, parameters)
    }

    async fn exchange_for_access(
        &self,
        authorization_code: &str,
        redirect_uri: &str,
        additional_parameters: Option<&MultiValueMap>,
    ) -> Result<F::Grant, OAuthError> {
        OAuth2Client::exchange_for_access(
            self,
            authorization_code,
            redirect_uri,
            additional_parameters,
        )
        .await
    }

    async fn refresh_access(
        &self,
        refresh_token: &str,
        scope: Option<&str>,
        additional_parameters: Option<&MultiValueMap>,
    ) -> Result<F::Grant, OAuthError> {
        OAuth2Client::refresh_access(self, refresh_token, scope, additional_parameters).await
    }
}

impl<F> fmt::Debug for OAuth2Client<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Client")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("access_token_url", &self.access_token_url)
            .field("authorize_url", &self.authorize_url)
            .field("authenticate_url", &self.authenticate_url)
            .finish_non_exhaustive()
    }
}
