//! Upstream transport for authorization-code exchanges.
//!
//! [`TokenEndpoint`] is the relay's only dependency on an HTTP stack. The bundled
//! [`ReqwestTokenEndpoint`] posts JSON to a provider token endpoint; tests and embedders
//! can substitute any implementation that returns the raw success body or a
//! [`TransportError`].

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::{header::ACCEPT, redirect::Policy};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{CodeGrant, CredentialPair},
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`TokenEndpoint::exchange_code`].
pub type EndpointFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Vec<u8>, TransportError>> + 'a + Send>>;

/// Narrow seam over the provider token endpoint.
///
/// Implementations perform exactly one request per call and never retry. A non-success
/// HTTP status must surface as [`TransportError::Status`] so the relay can answer with a
/// gateway error without inspecting the upstream body.
pub trait TokenEndpoint
where
	Self: 'static + Send + Sync,
{
	/// Exchanges `grant` using `credentials`, returning the raw 2xx response body.
	fn exchange_code<'a>(
		&'a self,
		credentials: &'a CredentialPair,
		grant: &'a CodeGrant,
	) -> EndpointFuture<'a>;
}

/// JSON document posted to the provider.
///
/// The PKCE verifier is intentionally absent; providers reached through the relay do not
/// accept it.
#[derive(Serialize)]
struct AccessTokenBody<'a> {
	client_id: &'a str,
	client_secret: &'a str,
	code: &'a str,
	redirect_uri: &'a str,
}
impl<'a> AccessTokenBody<'a> {
	fn new(credentials: &'a CredentialPair, grant: &'a CodeGrant) -> Self {
		Self {
			client_id: credentials.client_id.as_str(),
			client_secret: credentials.client_secret.secret(),
			code: grant.code.secret(),
			redirect_uri: &grant.redirect_uri,
		}
	}
}

/// reqwest-backed [`TokenEndpoint`].
///
/// Token endpoints return results directly, so redirects are not followed; a 3xx answer
/// is treated like any other non-success status.
#[derive(Clone, Debug)]
pub struct ReqwestTokenEndpoint {
	client: ReqwestClient,
	token_url: Url,
}
impl ReqwestTokenEndpoint {
	/// Builds an endpoint with its own client, `User-Agent`, and request timeout.
	pub fn new(
		token_url: Url,
		user_agent: &str,
		timeout: StdDuration,
	) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.user_agent(user_agent)
			.timeout(timeout)
			.redirect(Policy::none())
			.build()?;

		Ok(Self::with_client(client, token_url))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	///
	/// The caller is responsible for timeouts and redirect policy on `client`.
	pub fn with_client(client: ReqwestClient, token_url: Url) -> Self {
		Self { client, token_url }
	}

	/// Token endpoint this client posts to.
	pub fn token_url(&self) -> &Url {
		&self.token_url
	}
}
impl TokenEndpoint for ReqwestTokenEndpoint {
	fn exchange_code<'a>(
		&'a self,
		credentials: &'a CredentialPair,
		grant: &'a CodeGrant,
	) -> EndpointFuture<'a> {
		Box::pin(async move {
			let response = self
				.client
				.post(self.token_url.clone())
				.header(ACCEPT, "application/json")
				.json(&AccessTokenBody::new(credentials, grant))
				.send()
				.await?;
			let status = response.status();

			if !status.is_success() {
				return Err(TransportError::Status { status: status.as_u16() });
			}

			Ok(response.bytes().await?.to_vec())
		})
	}
}

/// Parsed upstream payload that keeps the original bytes for verbatim relaying.
#[derive(Clone, PartialEq)]
pub struct TokenPayload {
	raw: Vec<u8>,
	value: Value,
}
impl TokenPayload {
	/// Parses `raw` as JSON while retaining the exact bytes.
	pub fn from_slice(raw: impl Into<Vec<u8>>) -> Result<Self, serde_json::Error> {
		let raw = raw.into();
		let value = serde_json::from_slice(&raw)?;

		Ok(Self { raw, value })
	}

	/// Bytes exactly as the provider sent them.
	pub fn as_bytes(&self) -> &[u8] {
		&self.raw
	}

	/// Consumes the payload, returning the provider's bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		self.raw
	}

	/// Parsed JSON view. Callers must avoid logging this value; it may hold tokens.
	pub fn value(&self) -> &Value {
		&self.value
	}

	/// Provider-native `error` code, when the payload carries one as a string.
	pub fn oauth_error(&self) -> Option<&str> {
		self.value.get("error").and_then(Value::as_str)
	}

	/// Whether the provider reported an OAuth error despite a 2xx transport status.
	///
	/// An `error` member counts when it is truthy: `null`, `false`, `0`, and `""` do not.
	pub fn is_oauth_error(&self) -> bool {
		match self.value.get("error") {
			None | Some(Value::Null) | Some(Value::Bool(false)) => false,
			Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
			Some(Value::String(code)) => !code.is_empty(),
			Some(_) => true,
		}
	}
}
impl Debug for TokenPayload {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPayload")
			.field("len", &self.raw.len())
			.field("error", &self.oauth_error())
			.finish()
	}
}
