use serde::{Deserialize, Serialize};

use crate::MultiValueMap;

/// OAuth 2.0 flow used to obtain the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    ImplicitGrant,
}

impl GrantType {
    /// Value of the `response_type` query parameter for this flow.
    pub fn response_type(self) -> &'static str {
        match self {
            GrantType::AuthorizationCode => "code",
            GrantType::ImplicitGrant => "token",
        }
    }
}

/// Per-attempt redirect parameters used to build an authorize URL.
///
/// `additional_parameters` must not redefine `client_id`, `redirect_uri`,
/// `response_type`, `scope` or `state`; they are emitted as-is after those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2Parameters {
    pub redirect_uri: String,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub additional_parameters: MultiValueMap,
}

impl OAuth2Parameters {
    pub fn new(redirect_uri: impl Into<String>) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
            scope: None,
            state: None,
            additional_parameters: MultiValueMap::new(),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_additional_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.additional_parameters.add(key, value);
        self
    }

    pub fn with_additional_parameters(mut self, parameters: MultiValueMap) -> Self {
        self.additional_parameters = parameters;
        self
    }
}
