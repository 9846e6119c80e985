//! Inbound token-request body parsing and validation.

// crates.io
use oauth2::{AuthorizationCode, PkceCodeVerifier};
use serde_json::Value;
// self
use crate::{_prelude::*, auth::Environment};

const MEDIA_TYPE_JSON: &str = "application/json";

/// Raw JSON body accepted on the token route.
///
/// Every field is optional at this stage so a missing field produces a descriptive
/// `invalid_request` instead of a generic deserialization failure.
#[derive(Clone, Default, Deserialize)]
pub struct TokenRequest {
	/// Authorization code issued by the provider.
	#[serde(default)]
	pub code: Option<String>,
	/// Redirect URI used in the authorization request.
	#[serde(default)]
	pub redirect_uri: Option<String>,
	/// PKCE verifier; accepted but not forwarded.
	#[serde(default)]
	pub code_verifier: Option<String>,
	/// Environment label selecting the credential pair.
	#[serde(default)]
	pub environment: Option<String>,
}
impl TokenRequest {
	/// Parses a request body once into a JSON document.
	///
	/// `None` means the bytes are not JSON; both [`TokenRequest::environment_hint`] and
	/// [`TokenRequest::from_value`] accept the result, so the body is never parsed twice.
	pub fn parse_body(body: &[u8]) -> Option<Value> {
		serde_json::from_slice(body).ok()
	}

	/// Strictly parses a request body.
	///
	/// Malformed JSON, non-object bodies, and mistyped fields all map to
	/// [`Error::InvalidRequest`].
	pub fn from_json(body: &[u8]) -> Result<Self> {
		Self::from_value(Self::parse_body(body))
	}

	/// Strictly converts a document produced by [`TokenRequest::parse_body`].
	pub fn from_value(value: Option<Value>) -> Result<Self> {
		let value =
			value.ok_or_else(|| Error::invalid_request("Request body must be valid JSON."))?;

		if !value.is_object() {
			return Err(Error::invalid_request("Request body must be a JSON object."));
		}

		serde_path_to_error::deserialize(value).map_err(|e| {
			Error::invalid_request(format!("Request body field `{}` is invalid.", e.path()))
		})
	}

	/// Best-effort environment lookup used before the body is validated.
	///
	/// A body that did not parse, or an `environment` that is not a string, resolves to
	/// [`Environment::Development`].
	pub fn environment_hint(value: Option<&Value>) -> Environment {
		Environment::from_label(
			value.and_then(|value| value.get("environment")).and_then(Value::as_str),
		)
	}

	/// Resolved environment for this request.
	pub fn environment(&self) -> Environment {
		Environment::from_label(self.environment.as_deref())
	}

	/// Validates required fields and converts the request into a [`CodeGrant`].
	pub fn into_grant(self) -> Result<CodeGrant> {
		let missing = [("code", &self.code), ("redirect_uri", &self.redirect_uri)]
			.into_iter()
			.filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
			.map(|(name, _)| name)
			.collect::<Vec<_>>();

		if !missing.is_empty() {
			return Err(Error::invalid_request(format!(
				"Missing required parameters: {}.",
				missing.join(", ")
			)));
		}

		let (Some(code), Some(redirect_uri)) = (self.code, self.redirect_uri) else {
			return Err(Error::invalid_request("Missing required parameters: code, redirect_uri."));
		};

		Ok(CodeGrant {
			code: AuthorizationCode::new(code),
			redirect_uri,
			code_verifier: self.code_verifier.filter(|v| !v.is_empty()).map(PkceCodeVerifier::new),
		})
	}
}
impl Debug for TokenRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRequest")
			.field("code_set", &self.code.is_some())
			.field("redirect_uri", &self.redirect_uri)
			.field("code_verifier_set", &self.code_verifier.is_some())
			.field("environment", &self.environment)
			.finish()
	}
}

/// Validated authorization-code grant ready to be forwarded upstream.
#[derive(Debug)]
pub struct CodeGrant {
	/// Authorization code; `Debug` output is redacted.
	pub code: AuthorizationCode,
	/// Redirect URI echoed to the provider.
	pub redirect_uri: String,
	/// PKCE verifier supplied by the caller.
	///
	/// Carried for forward compatibility only; the relay never sends it upstream.
	pub code_verifier: Option<PkceCodeVerifier>,
}

/// Returns true when the `Content-Type` header declares a JSON body.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
	content_type.is_some_and(|value| value.to_ascii_lowercase().contains(MEDIA_TYPE_JSON))
}
