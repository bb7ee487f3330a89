use std::time::Duration;

use oauth2_template::{
    AccessGrant, GrantType, MultiValueMap, OAuth2Client, OAuth2Config, OAuth2Parameters,
    OAuthError,
};
use serde_json::json;
use url::form_urlencoded;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OAuth2Client {
    let config = OAuth2Config::new(
        "client id",
        "client-secret",
        format!("{}/oauth/authorize", server.uri()),
        format!("{}/oauth/token", server.uri()),
    )
    .with_timeout(Duration::from_secs(5));
    OAuth2Client::new(config).unwrap()
}

async fn received_form(server: &MockServer) -> Vec<(String, String)> {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    form_urlencoded::parse(&requests[0].body)
        .into_owned()
        .collect()
}

#[tokio::test]
async fn exchanges_code_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "TOK", "expires_in": 3600 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let grant = client
        .exchange_for_access("AUTHCODE123", "https://app.example/cb", None)
        .await
        .unwrap();

    assert_eq!(
        grant,
        AccessGrant {
            access_token: "TOK".to_string(),
            scope: None,
            refresh_token: None,
            expires_in: Some(3600),
        }
    );
    assert_eq!(
        received_form(&server).await,
        vec![
            ("client_id".to_string(), "client id".to_string()),
            ("client_secret".to_string(), "client-secret".to_string()),
            ("code".to_string(), "AUTHCODE123".to_string()),
            ("redirect_uri".to_string(), "https://app.example/cb".to_string()),
            ("grant_type".to_string(), "authorization_code".to_string()),
        ]
    );
}

#[tokio::test]
async fn refresh_sends_repeated_additional_keys() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "NEW",
                "refresh_token": "REFRESH2",
                "scope": "read"
            })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let extra = MultiValueMap::new()
        .with("audience", "a")
        .with("audience", "b");
    let grant = client
        .refresh_access("REFRESH1", Some("read"), Some(&extra))
        .await
        .unwrap();
    assert_eq!(grant.refresh_token.as_deref(), Some("REFRESH2"));

    let form = received_form(&server).await;
    let keys: Vec<_> = form.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "client_id",
            "client_secret",
            "refresh_token",
            "scope",
            "grant_type",
            "audience",
            "audience"
        ]
    );
    assert!(form.contains(&("grant_type".to_string(), "refresh_token".to_string())));
    assert!(form.contains(&("refresh_token".to_string(), "REFRESH1".to_string())));
    assert!(form.contains(&("audience".to_string(), "b".to_string())));
}

#[tokio::test]
async fn accepts_form_encoded_token_responses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("access_token=LEGACY&expires=99&expires_in=5183999", "text/plain"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let grant = client
        .exchange_for_access("CODE", "https://app.example/cb", None)
        .await
        .unwrap();
    assert_eq!(grant.access_token, "LEGACY");
    assert_eq!(grant.expires_in, Some(5_183_999));
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "bad secret"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let error = client
        .exchange_for_access("CODE", "https://app.example/cb", None)
        .await
        .unwrap_err();
    match &error {
        OAuthError::HttpStatus { status, body } => {
            assert_eq!(*status, 401);
            assert!(body.contains("bad secret"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(error.oauth_error_code().as_deref(), Some("invalid_client"));

    let error = client
        .refresh_access("REFRESH1", None, None)
        .await
        .unwrap_err();
    assert!(matches!(error, OAuthError::HttpStatus { status: 401, .. }));
}

#[tokio::test]
async fn unparseable_success_body_is_an_exchange_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>oops</html>", "text/html"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .exchange_for_access("CODE", "https://app.example/cb", None)
        .await
        .unwrap_err();
    assert!(matches!(error, OAuthError::InvalidResponse { .. }));
    assert!(error.is_exchange_failure());
}

#[tokio::test]
async fn authorize_url_encodes_client_id_once() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let params = OAuth2Parameters::new("https://app.example/cb").with_state("abc");

    let url = client.build_authorize_url(GrantType::AuthorizationCode, &params);
    assert_eq!(
        url,
        format!(
            "{}/oauth/authorize?client_id=client+id&redirect_uri=https%3A%2F%2Fapp.example%2Fcb\
             &response_type=code&state=abc",
            server.uri()
        )
    );
}
