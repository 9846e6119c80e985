// self
use oauth2_relay::{
	_preludet::*,
	auth::{CredentialSet, Environment},
	error::{ConfigError, Error, InternalError, TransportError},
};

const JSON: Option<&str> = Some("application/json");
const VALID_BODY: &str = r#"{"code":"code-123","redirect_uri":"https://app.example.com/cb"}"#;
const TOKEN_BODY: &str = r#"{"access_token":"abc","token_type":"bearer"}"#;

fn expect_invalid_request(result: Result<impl Debug>) -> String {
	match result {
		Err(Error::InvalidRequest { description }) => description,
		other => panic!("Expected an invalid_request error, got {other:?}."),
	}
}

#[tokio::test]
async fn successful_exchange_relays_payload_bytes() {
	let (relay, endpoint) = build_fake_relay(dev_credentials(), FakeResponse::json(TOKEN_BODY));
	let payload = relay
		.exchange(JSON, VALID_BODY.as_bytes())
		.await
		.expect("Exchange should succeed when the provider issues a token.");

	assert_eq!(payload.as_bytes(), TOKEN_BODY.as_bytes());
	assert_eq!(
		endpoint.calls(),
		vec![RecordedExchange {
			client_id: DEV_CLIENT_ID.into(),
			client_secret: DEV_CLIENT_SECRET.into(),
			code: "code-123".into(),
			redirect_uri: "https://app.example.com/cb".into(),
		}]
	);
}

#[tokio::test]
async fn missing_fields_never_reach_upstream() {
	let (relay, endpoint) = build_fake_relay(dev_credentials(), FakeResponse::json(TOKEN_BODY));

	for body in [
		r#"{}"#,
		r#"{"code":"abc"}"#,
		r#"{"redirect_uri":"https://app.example.com/cb"}"#,
		r#"{"code":"","redirect_uri":"https://app.example.com/cb"}"#,
		r#"{"code":"abc","redirect_uri":""}"#,
	] {
		let description = expect_invalid_request(relay.exchange(JSON, body.as_bytes()).await);

		assert!(
			description.starts_with("Missing required parameters:"),
			"Unexpected description for {body}: {description}"
		);
	}

	assert_eq!(endpoint.call_count(), 0);
}

#[tokio::test]
async fn non_json_content_type_is_rejected_before_upstream() {
	let (relay, endpoint) = build_fake_relay(dev_credentials(), FakeResponse::json(TOKEN_BODY));

	for content_type in [None, Some("text/plain"), Some("application/x-www-form-urlencoded")] {
		let description =
			expect_invalid_request(relay.exchange(content_type, VALID_BODY.as_bytes()).await);

		assert_eq!(description, "Content-Type must be application/json.");
	}

	assert_eq!(endpoint.call_count(), 0);
}

#[tokio::test]
async fn malformed_json_is_an_invalid_request() {
	let (relay, endpoint) = build_fake_relay(dev_credentials(), FakeResponse::json(TOKEN_BODY));
	let description = expect_invalid_request(relay.exchange(JSON, b"{\"code\":").await);

	assert_eq!(description, "Request body must be valid JSON.");
	assert_eq!(endpoint.call_count(), 0);
}

#[tokio::test]
async fn unset_credentials_fail_before_any_other_check() {
	let (relay, endpoint) =
		build_fake_relay(CredentialSet::default(), FakeResponse::json(TOKEN_BODY));
	let err = relay
		.exchange(Some("text/plain"), b"not even json")
		.await
		.expect_err("Missing credentials must fail the exchange.");

	assert!(matches!(
		err,
		Error::Config(ConfigError::MissingCredentials { environment: Environment::Development })
	));
	assert_eq!(err.status(), 500);
	assert_eq!(endpoint.call_count(), 0);
}

#[tokio::test]
async fn production_requires_production_credentials() {
	let (relay, endpoint) = build_fake_relay(dev_credentials(), FakeResponse::json(TOKEN_BODY));
	let body = r#"{"code":"abc","redirect_uri":"https://app/cb","environment":"production"}"#;
	let err = relay
		.exchange(JSON, body.as_bytes())
		.await
		.expect_err("Production without production credentials must fail.");

	assert_eq!((err.status(), err.error_code()), (500, "server_error"));
	assert_eq!(
		err.error_description(),
		"Server configuration incomplete for production environment."
	);
	assert_eq!(endpoint.call_count(), 0);
}

#[tokio::test]
async fn environment_selects_credential_pair() {
	let (relay, endpoint) = build_fake_relay(full_credentials(), FakeResponse::json(TOKEN_BODY));

	relay
		.exchange(
			JSON,
			br#"{"code":"p","redirect_uri":"https://app/cb","environment":"production"}"#,
		)
		.await
		.expect("Production exchange should succeed.");
	relay
		.exchange(JSON, br#"{"code":"s","redirect_uri":"https://app/cb","environment":"staging"}"#)
		.await
		.expect("Unknown environments should fall back to the default pair.");

	let client_ids = endpoint.calls().into_iter().map(|call| call.client_id).collect::<Vec<_>>();

	assert_eq!(client_ids, vec![PROD_CLIENT_ID.to_owned(), DEV_CLIENT_ID.to_owned()]);
}

#[tokio::test]
async fn provider_errors_are_relayed_verbatim() {
	let upstream = r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#;
	let (relay, endpoint) = build_fake_relay(dev_credentials(), FakeResponse::json(upstream));
	let err = relay
		.exchange(JSON, VALID_BODY.as_bytes())
		.await
		.expect_err("Provider-level errors must not be treated as success.");

	assert_eq!(err.status(), 400);
	assert_eq!(err.error_code(), "bad_verification_code");

	let Error::Provider { payload } = err else {
		panic!("Expected a provider error.");
	};

	assert_eq!(payload.as_bytes(), upstream.as_bytes());
	assert_eq!(endpoint.call_count(), 1);
}

#[tokio::test]
async fn transport_failures_map_to_gateway_errors() {
	for response in [FakeResponse::Status(500), FakeResponse::Status(404), FakeResponse::Timeout] {
		let (relay, endpoint) = build_fake_relay(dev_credentials(), response);
		let err = relay
			.exchange(JSON, VALID_BODY.as_bytes())
			.await
			.expect_err("Transport failures must fail the exchange.");

		assert!(matches!(err, Error::Transport(_)));
		assert_eq!((err.status(), err.error_code()), (502, "server_error"));
		assert_eq!(err.error_description(), "Failed to exchange authorization code.");
		assert_eq!(endpoint.call_count(), 1, "Failures must never be retried.");
	}
}

#[tokio::test]
async fn timeouts_are_transport_errors() {
	let (relay, _) = build_fake_relay(dev_credentials(), FakeResponse::Timeout);
	let err =
		relay.exchange(JSON, VALID_BODY.as_bytes()).await.expect_err("Timeouts must fail.");

	assert!(matches!(err, Error::Transport(TransportError::Timeout)));
}

#[tokio::test]
async fn malformed_upstream_json_is_an_internal_error() {
	let (relay, _) = build_fake_relay(
		dev_credentials(),
		FakeResponse::Body(b"<html>Service Unavailable</html>".to_vec()),
	);
	let err = relay
		.exchange(JSON, VALID_BODY.as_bytes())
		.await
		.expect_err("Non-JSON upstream bodies must fail.");

	assert_eq!((err.status(), err.error_code()), (500, "server_error"));
	assert_eq!(err.error_description(), "Internal server error.");
}

#[tokio::test]
async fn falsy_error_members_are_relayed_as_success() {
	for upstream in [
		r#"{"error":0,"access_token":"abc"}"#,
		r#"{"error":false,"access_token":"abc"}"#,
		r#"{"error":"","access_token":"abc"}"#,
		r#"{"error":null,"access_token":"abc"}"#,
	] {
		let (relay, _) = build_fake_relay(dev_credentials(), FakeResponse::json(upstream));
		let payload = relay
			.exchange(JSON, VALID_BODY.as_bytes())
			.await
			.unwrap_or_else(|e| panic!("{upstream} should be a success, got {e:?}."));

		assert_eq!(payload.as_bytes(), upstream.as_bytes());
	}
}

#[tokio::test]
async fn null_upstream_payload_is_an_internal_error() {
	let (relay, endpoint) = build_fake_relay(dev_credentials(), FakeResponse::json("null"));
	let err = relay
		.exchange(JSON, VALID_BODY.as_bytes())
		.await
		.expect_err("A bare null payload must fail.");

	assert!(matches!(err, Error::Internal(InternalError::NullTokenResponse)));
	assert_eq!((err.status(), err.error_code()), (500, "server_error"));
	assert_eq!(err.error_description(), "Internal server error.");
	assert_eq!(endpoint.call_count(), 1);
}

#[tokio::test]
async fn code_verifier_is_accepted_but_not_forwarded() {
	let (relay, endpoint) = build_fake_relay(dev_credentials(), FakeResponse::json(TOKEN_BODY));

	relay
		.exchange(
			JSON,
			br#"{"code":"abc","redirect_uri":"https://app/cb","code_verifier":"verifier-xyz"}"#,
		)
		.await
		.expect("Requests carrying a PKCE verifier should still succeed.");

	assert_eq!(endpoint.call_count(), 1);
	assert!(!format!("{:?}", endpoint.calls()).contains("verifier-xyz"));
}
