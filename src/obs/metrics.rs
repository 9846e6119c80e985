// self
use crate::{auth::Environment, obs::ExchangeOutcome};

/// Records an exchange outcome via the global metrics recorder (when enabled).
pub fn record_exchange_outcome(environment: Environment, outcome: ExchangeOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_relay_exchange_total",
			"environment" => environment.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (environment, outcome);
	}
}
