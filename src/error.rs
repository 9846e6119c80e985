//! Relay-level error types shared across the request pipeline, upstream transport, and server.

// self
use crate::{_prelude::*, auth::Environment, http::TokenPayload};

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error produced by [`Relay::exchange`](crate::relay::Relay::exchange).
///
/// Every variant maps onto exactly one wire error via [`Error::status`] and
/// [`Error::error_code`]; the server layer never inspects anything else.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (missing credentials for the selected environment).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Upstream token endpoint could not be reached or answered with a non-success status.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Unexpected failure while processing an otherwise successful exchange.
	#[error(transparent)]
	Internal(#[from] InternalError),

	/// Caller sent a request the relay refuses to forward.
	#[error("Invalid token request: {description}")]
	InvalidRequest {
		/// Caller-facing explanation.
		description: String,
	},
	/// Provider answered with its own OAuth error object (bad or expired code, redirect mismatch).
	#[error(
		"Provider rejected the authorization code: {}.",
		.payload.oauth_error().unwrap_or("unknown")
	)]
	Provider {
		/// Upstream payload, relayed verbatim.
		payload: TokenPayload,
	},
}
impl Error {
	/// Builds an [`Error::InvalidRequest`] from any displayable description.
	pub fn invalid_request(description: impl Into<String>) -> Self {
		Self::InvalidRequest { description: description.into() }
	}

	/// HTTP status code surfaced to the caller.
	pub fn status(&self) -> u16 {
		match self {
			Self::InvalidRequest { .. } | Self::Provider { .. } => 400,
			Self::Config(_) | Self::Internal(_) => 500,
			Self::Transport(_) => 502,
		}
	}

	/// OAuth-style `error` code surfaced to the caller.
	///
	/// Provider errors carry their own code, which is returned as-is.
	pub fn error_code(&self) -> &str {
		match self {
			Self::InvalidRequest { .. } => "invalid_request",
			Self::Provider { payload } => payload.oauth_error().unwrap_or("invalid_grant"),
			Self::Config(_) | Self::Transport(_) | Self::Internal(_) => "server_error",
		}
	}

	/// Caller-facing `error_description`.
	///
	/// Transport and internal failures use fixed strings so upstream details never leak.
	pub fn error_description(&self) -> String {
		match self {
			Self::InvalidRequest { description } => description.clone(),
			Self::Config(e) => e.to_string(),
			Self::Transport(_) => "Failed to exchange authorization code.".into(),
			Self::Internal(_) => "Internal server error.".into(),
			Self::Provider { .. } => self.to_string(),
		}
	}
}

/// Configuration failures raised before any upstream call is attempted.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Credential pair for the selected environment is missing or incomplete.
	#[error("Server configuration incomplete for {environment} environment.")]
	MissingCredentials {
		/// Environment whose pair was requested.
		environment: Environment,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Token endpoint is not an absolute HTTP(S) URL.
	#[error("Token endpoint `{url}` must be an absolute http or https URL.")]
	InvalidTokenEndpoint {
		/// Offending endpoint.
		url: String,
	},
	/// Settings could not be read or deserialized.
	#[error("Relay settings could not be loaded.")]
	Settings(#[from] ::config::ConfigError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures talking to the upstream token endpoint.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Upstream did not answer within the configured timeout.
	#[error("Request timed out while calling the token endpoint.")]
	Timeout,
	/// Upstream answered with a non-success HTTP status.
	#[error("Token endpoint responded with HTTP {status}.")]
	Status {
		/// Upstream status code.
		status: u16,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() {
			return Self::Timeout;
		}
		if let Some(status) = e.status() {
			return Self::Status { status: status.as_u16() };
		}

		Self::network(e)
	}
}

/// Unexpected processing failures; logged server-side and reported generically.
#[derive(Debug, ThisError)]
pub enum InternalError {
	/// Upstream answered 2xx with a body that is not JSON.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Underlying parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Upstream answered 2xx with a bare JSON `null`.
	#[error("Token endpoint returned a null payload.")]
	NullTokenResponse,
}
