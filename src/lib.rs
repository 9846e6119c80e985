//! Stateless OAuth 2.0 authorization-code relay: accept a code from an untrusted client, attach
//! the confidential client secret server-side, and hand the provider's token payload back.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod relay;
pub mod server;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{CodeGrant, CredentialPair, CredentialSet},
		error::TransportError,
		http::{EndpointFuture, TokenEndpoint},
		relay::Relay,
	};

	/// Development client identifier used by test fixtures.
	pub const DEV_CLIENT_ID: &str = "dev-client";
	/// Development client secret used by test fixtures.
	pub const DEV_CLIENT_SECRET: &str = "dev-secret";
	/// Production client identifier used by test fixtures.
	pub const PROD_CLIENT_ID: &str = "prod-client";
	/// Production client secret used by test fixtures.
	pub const PROD_CLIENT_SECRET: &str = "prod-secret";

	/// Upstream call captured by [`FakeTokenEndpoint`].
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub struct RecordedExchange {
		/// Client identifier forwarded upstream.
		pub client_id: String,
		/// Client secret forwarded upstream.
		pub client_secret: String,
		/// Authorization code forwarded upstream.
		pub code: String,
		/// Redirect URI forwarded upstream.
		pub redirect_uri: String,
	}

	/// Scripted answer returned by [`FakeTokenEndpoint`].
	#[derive(Clone, Debug)]
	pub enum FakeResponse {
		/// 2xx with the given raw body.
		Body(Vec<u8>),
		/// Non-success HTTP status.
		Status(u16),
		/// Upstream timed out.
		Timeout,
	}
	impl FakeResponse {
		/// 2xx with a JSON body.
		pub fn json(body: &str) -> Self {
			Self::Body(body.as_bytes().to_vec())
		}
	}

	/// In-memory [`TokenEndpoint`] that records every call.
	#[derive(Debug)]
	pub struct FakeTokenEndpoint {
		response: FakeResponse,
		calls: Mutex<Vec<RecordedExchange>>,
	}
	impl FakeTokenEndpoint {
		/// Creates an endpoint that always answers with `response`.
		pub fn new(response: FakeResponse) -> Self {
			Self { response, calls: Default::default() }
		}

		/// Number of upstream calls observed so far.
		pub fn call_count(&self) -> usize {
			self.calls.lock().len()
		}

		/// Snapshot of recorded calls.
		pub fn calls(&self) -> Vec<RecordedExchange> {
			self.calls.lock().clone()
		}
	}
	impl TokenEndpoint for FakeTokenEndpoint {
		fn exchange_code<'a>(
			&'a self,
			credentials: &'a CredentialPair,
			grant: &'a CodeGrant,
		) -> EndpointFuture<'a> {
			self.calls.lock().push(RecordedExchange {
				client_id: credentials.client_id.as_str().to_owned(),
				client_secret: credentials.client_secret.secret().to_owned(),
				code: grant.code.secret().to_owned(),
				redirect_uri: grant.redirect_uri.clone(),
			});

			let response = self.response.clone();

			Box::pin(async move {
				match response {
					FakeResponse::Body(body) => Ok(body),
					FakeResponse::Status(status) => Err(TransportError::Status { status }),
					FakeResponse::Timeout => Err(TransportError::Timeout),
				}
			})
		}
	}

	/// Development-only credential table.
	pub fn dev_credentials() -> CredentialSet {
		CredentialSet::single(
			CredentialPair::new(Some(DEV_CLIENT_ID), Some(DEV_CLIENT_SECRET))
				.expect("Development fixture credentials should be valid."),
		)
	}

	/// Credential table with both environments configured.
	pub fn full_credentials() -> CredentialSet {
		dev_credentials().with_production(
			CredentialPair::new(Some(PROD_CLIENT_ID), Some(PROD_CLIENT_SECRET))
				.expect("Production fixture credentials should be valid."),
		)
	}

	/// Constructs a [`Relay`] over a [`FakeTokenEndpoint`] scripted with `response`.
	pub fn build_fake_relay(
		credentials: CredentialSet,
		response: FakeResponse,
	) -> (Arc<Relay<FakeTokenEndpoint>>, Arc<FakeTokenEndpoint>) {
		let endpoint = Arc::new(FakeTokenEndpoint::new(response));
		let relay = Arc::new(Relay::new(Arc::clone(&endpoint), credentials));

		(relay, endpoint)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(any(test, feature = "test"))] pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
// Used by the `oauth2-relay` binary only.
use color_eyre as _;
#[cfg(test)] use {httpmock as _, tower as _};
