//! `oauth2-relay` binary: load settings from the environment and serve the token route.

// crates.io
use color_eyre::Result;
// self
use oauth2_relay::{config::RelaySettings, obs, server};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let settings = RelaySettings::load()?;

	obs::init_tracing(settings.log_format)?;

	let configured = settings.credentials().configured();

	if configured.is_empty() {
		tracing::warn!("No client credentials configured; every exchange will fail.");
	} else {
		tracing::info!(environments = ?configured, "Client credentials loaded.");
	}

	server::serve(settings).await?;

	Ok(())
}
