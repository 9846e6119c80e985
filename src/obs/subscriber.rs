// crates.io
use tracing_subscriber::{
	EnvFilter, fmt,
	layer::SubscriberExt,
	util::{SubscriberInitExt, TryInitError},
};
// self
use crate::_prelude::*;

const DEFAULT_DIRECTIVE: &str = "info";

/// Output format for the process-wide subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
	/// Human-readable single-line output.
	#[default]
	Compact,
	/// One JSON object per event.
	Json,
}

/// Installs the global subscriber, honoring `RUST_LOG` and falling back to `info`.
pub fn init_tracing(format: LogFormat) -> Result<(), TryInitError> {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
	let registry = tracing_subscriber::registry().with(filter);

	match format {
		LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
		LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn log_format_deserializes_from_labels() {
		let format: LogFormat =
			serde_json::from_str("\"json\"").expect("Log format label should deserialize.");

		assert_eq!(format, LogFormat::Json);
		assert!(serde_json::from_str::<LogFormat>("\"pretty\"").is_err());
	}
}
