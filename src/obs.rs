//! Observability helpers for relay exchanges.
//!
//! - Every exchange runs inside a span named `oauth2_relay.exchange` with an `environment`
//!   field.
//! - Enable `metrics` to increment the `oauth2_relay_exchange_total` counter for every
//!   attempt and outcome, labeled by `environment` + `outcome`.
//! - [`init_tracing`] installs the process-wide subscriber used by the binary.

mod metrics;
mod subscriber;
mod tracing;

pub use metrics::*;
pub use subscriber::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeOutcome {
	/// Entry to [`Relay::exchange`](crate::relay::Relay::exchange).
	Attempt,
	/// Provider issued a token.
	Success,
	/// Provider answered with its own OAuth error object.
	ProviderError,
	/// Validation, configuration, transport, or internal failure.
	Failure,
}
impl ExchangeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeOutcome::Attempt => "attempt",
			ExchangeOutcome::Success => "success",
			ExchangeOutcome::ProviderError => "provider_error",
			ExchangeOutcome::Failure => "failure",
		}
	}
}
impl Display for ExchangeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
