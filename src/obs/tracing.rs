// crates.io
use tracing::{Instrument, Span, instrument::Instrumented};
// self
use crate::{_prelude::*, auth::Environment};

/// Span wrapper used around each exchange.
#[derive(Clone, Debug)]
pub struct ExchangeSpan {
	span: Span,
}
impl ExchangeSpan {
	/// Creates a new span tagged with the selected environment.
	pub fn new(environment: Environment) -> Self {
		let span = tracing::info_span!("oauth2_relay.exchange", environment = environment.as_str());

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}
