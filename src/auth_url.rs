use crate::{GrantType, OAuth2Parameters, params::form_encode};

/// Appends the client id as the first query parameter of an authorize or
/// authenticate endpoint.
pub(crate) fn client_base_url(endpoint: &str, client_id: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}client_id={}", form_encode(client_id))
}

/// Builds the redirect URL for `grant_type` from a base URL that already
/// carries `client_id`.
///
/// Parameter order is fixed: `redirect_uri`, `response_type`, then `scope` and
/// `state` when set, then every additional value in insertion order.
pub(crate) fn build_auth_url(
    base_url: &str,
    grant_type: GrantType,
    parameters: &OAuth2Parameters,
) -> String {
    let mut url = String::from(base_url);
    push_param(&mut url, "redirect_uri", &parameters.redirect_uri);
    push_param(&mut url, "response_type", grant_type.response_type());

    if let Some(scope) = &parameters.scope {
        push_param(&mut url, "scope", scope);
    }
    if let Some(state) = &parameters.state {
        push_param(&mut url, "state", state);
    }
    for (key, value) in parameters.additional_parameters.pairs() {
        push_param(&mut url, key, value);
    }

    url
}

fn push_param(url: &mut String, key: &str, value: &str) {
    url.push('&');
    url.push_str(&form_encode(key));
    url.push('=');
    url.push_str(&form_encode(value));
}
