//! Process-wide relay settings.
//!
//! Settings come from environment variables through the `config` crate. Keys are
//! case-insensitive, so `CLIENT_ID` and `client_id` are equivalent. Credentials are
//! optional at load time; a missing pair only fails the requests that need it.

// std
use std::{net::SocketAddr, time::Duration as StdDuration};
// crates.io
use config::{Config, Environment as EnvSource};
// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, CredentialSet},
	error::ConfigError,
	obs::LogFormat,
};

/// Upstream used when `RELAY_TOKEN_ENDPOINT` is unset.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://github.com/login/oauth/access_token";
/// Listen address used when `RELAY_BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8787";
/// Upstream timeout used when `RELAY_UPSTREAM_TIMEOUT_SECS` is unset.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Immutable settings injected into the relay at construction.
#[derive(Clone, Deserialize)]
pub struct RelaySettings {
	/// Default (development) client identifier.
	#[serde(default)]
	pub client_id: Option<String>,
	/// Default (development) client secret.
	#[serde(default)]
	pub client_secret: Option<String>,
	/// Production client identifier.
	#[serde(default)]
	pub client_id_prod: Option<String>,
	/// Production client secret.
	#[serde(default)]
	pub client_secret_prod: Option<String>,
	/// Socket the HTTP server binds to.
	#[serde(rename = "relay_bind_addr", default = "default_bind_addr")]
	pub bind_addr: SocketAddr,
	/// Provider token endpoint.
	#[serde(rename = "relay_token_endpoint", default = "default_token_endpoint")]
	pub token_endpoint: Url,
	/// `User-Agent` sent upstream.
	#[serde(rename = "relay_user_agent", default = "default_user_agent")]
	pub user_agent: String,
	/// Upstream request timeout, in seconds.
	#[serde(rename = "relay_upstream_timeout_secs", default = "default_upstream_timeout_secs")]
	pub upstream_timeout_secs: u64,
	/// Log output format.
	#[serde(rename = "relay_log_format", default)]
	pub log_format: LogFormat,
}
impl RelaySettings {
	/// Loads settings from the process environment.
	pub fn load() -> Result<Self, ConfigError> {
		let config = Config::builder().add_source(EnvSource::default()).build()?;

		Self::from_config(config)
	}

	/// Deserializes and validates settings from an already-built [`Config`].
	pub fn from_config(config: Config) -> Result<Self, ConfigError> {
		let settings: Self = config.try_deserialize()?;

		settings.validate()?;

		Ok(settings)
	}

	/// Credential table derived from the configured pairs.
	pub fn credentials(&self) -> CredentialSet {
		CredentialSet {
			development: CredentialPair::new(
				self.client_id.as_deref(),
				self.client_secret.as_deref(),
			),
			production: CredentialPair::new(
				self.client_id_prod.as_deref(),
				self.client_secret_prod.as_deref(),
			),
		}
	}

	/// Upstream request timeout.
	pub fn upstream_timeout(&self) -> StdDuration {
		StdDuration::from_secs(self.upstream_timeout_secs)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		let endpoint = &self.token_endpoint;

		if !matches!(endpoint.scheme(), "http" | "https") || !endpoint.has_host() {
			return Err(ConfigError::InvalidTokenEndpoint { url: endpoint.to_string() });
		}

		Ok(())
	}
}
impl Debug for RelaySettings {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RelaySettings")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("client_id_prod", &self.client_id_prod)
			.field("client_secret_prod_set", &self.client_secret_prod.is_some())
			.field("bind_addr", &self.bind_addr)
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("user_agent", &self.user_agent)
			.field("upstream_timeout_secs", &self.upstream_timeout_secs)
			.field("log_format", &self.log_format)
			.finish()
	}
}

fn default_bind_addr() -> SocketAddr {
	SocketAddr::from(([0, 0, 0, 0], 8787))
}

fn default_token_endpoint() -> Url {
	Url::parse(DEFAULT_TOKEN_ENDPOINT).expect("Default token endpoint must be a valid URL.")
}

fn default_user_agent() -> String {
	concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into()
}

fn default_upstream_timeout_secs() -> u64 {
	DEFAULT_UPSTREAM_TIMEOUT_SECS
}
