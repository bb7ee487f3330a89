//! OAuth 2.0 client helpers for provider integrations.
//!
//! Builds authorize/authenticate redirect URLs for the authorization code and
//! implicit flows, and exchanges authorization codes or refresh tokens for an
//! [`AccessGrant`] at the provider's token endpoint. The HTTP transport and the
//! final grant type are pluggable through [`FormTransport`] and
//! [`GrantFactory`].

mod auth_url;
mod client;
mod error;
mod grant;
mod operations;
mod params;
mod transport;
mod types;

pub use client::{OAuth2Client, OAuth2Config};
pub use error::OAuthError;
pub use grant::{AccessGrant, DefaultGrantFactory, GrantFactory, extract_access_grant};
pub use operations::OAuth2Operations;
pub use params::{MultiValueMap, form_encode};
pub use transport::{FormTransport, ReqwestTransport, TokenResponseBody, parse_token_body};
pub use types::{GrantType, OAuth2Parameters};
