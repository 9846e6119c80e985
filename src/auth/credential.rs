//! Confidential client credentials and per-environment selection.

// crates.io
use oauth2::{ClientId, ClientSecret};
// self
use crate::{_prelude::*, error::ConfigError};

/// Deployment environment requested by the caller.
///
/// Only the literal `production` selects [`Environment::Production`]; every other value,
/// including an absent one, falls back to [`Environment::Development`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Environment {
	/// Default credential pair (`CLIENT_ID` / `CLIENT_SECRET`).
	#[default]
	Development,
	/// Production credential pair (`CLIENT_ID_PROD` / `CLIENT_SECRET_PROD`).
	Production,
}
impl Environment {
	/// Resolves the environment from the caller-supplied label.
	pub fn from_label(label: Option<&str>) -> Self {
		match label {
			Some("production") => Self::Production,
			_ => Self::Development,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Development => "development",
			Self::Production => "production",
		}
	}
}
impl Display for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Client identifier and secret forwarded to the token endpoint.
///
/// The secret is wrapped in [`ClientSecret`], whose `Debug` output is redacted.
#[derive(Clone, Debug)]
pub struct CredentialPair {
	/// OAuth client identifier.
	pub client_id: ClientId,
	/// OAuth client secret. Never logged, never returned to callers.
	pub client_secret: ClientSecret,
}
impl CredentialPair {
	/// Builds a pair, returning `None` when either half is missing or empty.
	pub fn new(client_id: Option<&str>, client_secret: Option<&str>) -> Option<Self> {
		match (client_id, client_secret) {
			(Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some(Self {
				client_id: ClientId::new(id.to_owned()),
				client_secret: ClientSecret::new(secret.to_owned()),
			}),
			_ => None,
		}
	}
}

/// Immutable credential table consulted once per request.
#[derive(Clone, Debug, Default)]
pub struct CredentialSet {
	/// Default pair, also used when no environment is requested.
	pub development: Option<CredentialPair>,
	/// Production pair.
	pub production: Option<CredentialPair>,
}
impl CredentialSet {
	/// Creates a set with only the default pair configured.
	pub fn single(pair: CredentialPair) -> Self {
		Self { development: Some(pair), production: None }
	}

	/// Adds or replaces the production pair.
	pub fn with_production(mut self, pair: CredentialPair) -> Self {
		self.production = Some(pair);

		self
	}

	/// Picks the pair for `environment`.
	///
	/// There is no cross-environment fallback: a production request against a relay
	/// without production credentials fails rather than using the development pair.
	pub fn select(&self, environment: Environment) -> Result<&CredentialPair, ConfigError> {
		let pair = match environment {
			Environment::Development => self.development.as_ref(),
			Environment::Production => self.production.as_ref(),
		};

		pair.ok_or(ConfigError::MissingCredentials { environment })
	}

	/// Environments that currently have a usable pair.
	pub fn configured(&self) -> Vec<Environment> {
		[Environment::Development, Environment::Production]
			.into_iter()
			.filter(|env| self.select(*env).is_ok())
			.collect()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn pair(id: &str) -> CredentialPair {
		CredentialPair::new(Some(id), Some("secret")).expect("Credential fixture should be valid.")
	}

	#[test]
	fn only_production_label_selects_production() {
		assert_eq!(Environment::from_label(Some("production")), Environment::Production);
		assert_eq!(Environment::from_label(Some("Production")), Environment::Development);
		assert_eq!(Environment::from_label(Some("staging")), Environment::Development);
		assert_eq!(Environment::from_label(None), Environment::Development);
	}

	#[test]
	fn empty_halves_are_not_configured() {
		assert!(CredentialPair::new(Some("id"), Some("")).is_none());
		assert!(CredentialPair::new(Some(""), Some("secret")).is_none());
		assert!(CredentialPair::new(None, Some("secret")).is_none());
		assert!(CredentialPair::new(Some("id"), Some("secret")).is_some());
	}

	#[test]
	fn select_never_falls_back_across_environments() {
		let set = CredentialSet::single(pair("dev-id"));

		assert_eq!(
			set.select(Environment::Development)
				.expect("Development pair should be selected.")
				.client_id
				.as_str(),
			"dev-id"
		);
		assert!(matches!(
			set.select(Environment::Production),
			Err(ConfigError::MissingCredentials { environment: Environment::Production })
		));

		let set = set.with_production(pair("prod-id"));

		assert_eq!(
			set.select(Environment::Production)
				.expect("Production pair should be selected.")
				.client_id
				.as_str(),
			"prod-id"
		);
		assert_eq!(set.configured(), vec![Environment::Development, Environment::Production]);
	}

	#[test]
	fn debug_output_redacts_secret() {
		let rendered = format!("{:?}", pair("dev-id"));

		assert!(rendered.contains("dev-id"));
		assert!(!rendered.contains("\"secret\""));
	}
}
