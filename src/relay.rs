//! Authorization-code relay: the single request pipeline behind the token route.
//!
//! [`Relay::exchange`] validates the inbound body, picks the credential pair for the
//! requested environment, calls the [`TokenEndpoint`] once, and classifies the upstream
//! answer. Nothing is cached or retried; every call yields exactly one payload or one
//! [`Error`].

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{CredentialSet, Environment, TokenRequest, is_json_content_type},
	error::InternalError,
	http::{ReqwestTokenEndpoint, TokenEndpoint, TokenPayload},
	obs::{self, ExchangeOutcome, ExchangeSpan},
};

/// Relay specialized for the crate's default reqwest transport.
pub type ReqwestRelay = Relay<ReqwestTokenEndpoint>;

/// Brokers authorization-code exchanges against one provider token endpoint.
///
/// The relay holds only read-only state, so a single instance is shared (behind `Arc`)
/// by every in-flight request.
pub struct Relay<E>
where
	E: ?Sized + TokenEndpoint,
{
	/// Upstream token endpoint.
	pub endpoint: Arc<E>,
	/// Credential table consulted per request.
	pub credentials: CredentialSet,
}
impl<E> Relay<E>
where
	E: ?Sized + TokenEndpoint,
{
	/// Creates a relay over `endpoint` with the provided credentials.
	pub fn new(endpoint: Arc<E>, credentials: CredentialSet) -> Self {
		Self { endpoint, credentials }
	}

	/// Runs the full exchange pipeline for one inbound request.
	///
	/// Checks run in a fixed order and each short-circuits: credentials for the requested
	/// environment, `Content-Type`, body syntax, required fields. The upstream is only
	/// contacted once all of them pass.
	pub async fn exchange(&self, content_type: Option<&str>, body: &[u8]) -> Result<TokenPayload> {
		let document = TokenRequest::parse_body(body);
		let environment = TokenRequest::environment_hint(document.as_ref());
		let span = ExchangeSpan::new(environment);

		obs::record_exchange_outcome(environment, ExchangeOutcome::Attempt);

		let result =
			span.instrument(self.exchange_inner(environment, content_type, document)).await;
		let outcome = match &result {
			Ok(_) => ExchangeOutcome::Success,
			Err(Error::Provider { .. }) => ExchangeOutcome::ProviderError,
			Err(_) => ExchangeOutcome::Failure,
		};

		obs::record_exchange_outcome(environment, outcome);

		if let Err(e) = &result {
			log_failure(environment, e);
		}

		result
	}

	async fn exchange_inner(
		&self,
		environment: Environment,
		content_type: Option<&str>,
		document: Option<Value>,
	) -> Result<TokenPayload> {
		let credentials = self.credentials.select(environment)?;

		if !is_json_content_type(content_type) {
			return Err(Error::invalid_request("Content-Type must be application/json."));
		}

		let grant = TokenRequest::from_value(document)?.into_grant()?;

		tracing::info!(
			client_id = credentials.client_id.as_str(),
			pkce_verifier = grant.code_verifier.is_some(),
			"Forwarding authorization code to the token endpoint."
		);

		let raw = self.endpoint.exchange_code(credentials, &grant).await?;
		let payload = TokenPayload::from_slice(raw)
			.map_err(|source| InternalError::TokenResponseParse { source })?;

		if payload.value().is_null() {
			return Err(InternalError::NullTokenResponse.into());
		}

		if payload.is_oauth_error() {
			return Err(Error::Provider { payload });
		}

		Ok(payload)
	}
}
impl<E> Debug for Relay<E>
where
	E: ?Sized + TokenEndpoint,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Relay").field("environments", &self.credentials.configured()).finish()
	}
}

fn log_failure(environment: Environment, err: &Error) {
	match err {
		Error::InvalidRequest { description } =>
			tracing::debug!(%environment, %description, "Rejected token request."),
		Error::Provider { .. } => tracing::info!(
			%environment,
			error = err.error_code(),
			"Provider rejected the exchange."
		),
		Error::Config(e) => tracing::error!(%environment, error = %e, "Relay is misconfigured."),
		Error::Transport(e) => tracing::warn!(
			%environment,
			error = %e,
			source = ?StdError::source(e),
			"Token endpoint call failed."
		),
		Error::Internal(e) => tracing::error!(
			%environment,
			error = %e,
			source = ?StdError::source(e),
			"Token exchange failed unexpectedly."
		),
	}
}
