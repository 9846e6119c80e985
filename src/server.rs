//! HTTP surface: route table, permissive CORS headers, and error-to-response mapping.
//!
//! | Method    | Path           | Handler                      |
//! |-----------|----------------|------------------------------|
//! | `OPTIONS` | any            | empty `200`                  |
//! | `POST`    | `/oauth/token` | [`Relay::exchange`]          |
//! | other     | any            | `404` with a `not_found` body |

// std
use std::{any::Any, io};
// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::{DefaultBodyLimit, State, rejection::BytesRejection},
	http::{
		HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
		header::{
			ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
			ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
		},
	},
	response::{IntoResponse, Response},
	routing::post,
};
use tokio::net::TcpListener;
use tower_http::{
	catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
// self
use crate::{
	_prelude::*,
	config::RelaySettings,
	error::ConfigError,
	http::{ReqwestTokenEndpoint, TokenEndpoint},
	relay::{Relay, ReqwestRelay},
};

/// Route that accepts authorization codes.
pub const TOKEN_ROUTE: &str = "/oauth/token";
/// Largest request body the token route buffers.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const CORS_HEADERS: [(HeaderName, &str); 3] = [
	(ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
	(ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
	(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization"),
];

/// Failures that stop the server from starting or running.
#[derive(Debug, ThisError)]
pub enum ServeError {
	/// Relay could not be assembled from the settings.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Listener could not be bound or the accept loop failed.
	#[error("HTTP server I/O failure.")]
	Io(#[from] io::Error),
}

/// Wire shape of every relay-generated error.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
	error: &'a str,
	error_description: String,
}

/// Builds the relay router around a shared [`Relay`].
pub fn router<E>(relay: Arc<Relay<E>>) -> Router
where
	E: ?Sized + TokenEndpoint,
{
	let router = Router::new()
		.route(TOKEN_ROUTE, post(exchange::<E>).options(preflight).fallback(fallback))
		.fallback(fallback)
		.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
		.with_state(relay)
		.layer(CatchPanicLayer::custom(panic_response))
		.layer(TraceLayer::new_for_http());

	CORS_HEADERS.into_iter().fold(router, |router, (name, value)| {
		router.layer(SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value)))
	})
}

/// Binds `settings.bind_addr` and serves until Ctrl-C or `SIGTERM`.
pub async fn serve(settings: RelaySettings) -> Result<(), ServeError> {
	let endpoint = ReqwestTokenEndpoint::new(
		settings.token_endpoint.clone(),
		&settings.user_agent,
		settings.upstream_timeout(),
	)?;
	let relay: Arc<ReqwestRelay> =
		Arc::new(Relay::new(Arc::new(endpoint), settings.credentials()));
	let listener = TcpListener::bind(settings.bind_addr).await?;

	tracing::info!(
		addr = %listener.local_addr()?,
		token_endpoint = settings.token_endpoint.as_str(),
		relay = ?relay,
		"Relay listening."
	);

	axum::serve(listener, router(relay)).with_graceful_shutdown(shutdown_signal()).await?;

	tracing::info!("Relay stopped.");

	Ok(())
}

async fn exchange<E>(
	State(relay): State<Arc<Relay<E>>>,
	headers: HeaderMap,
	body: Result<Bytes, BytesRejection>,
) -> Response
where
	E: ?Sized + TokenEndpoint,
{
	let body = match body {
		Ok(body) => body,
		Err(rejection) => {
			tracing::debug!(status = %rejection.status(), "Request body could not be buffered.");

			return body_rejection(&rejection).into_response();
		},
	};
	let content_type = headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok());

	match relay.exchange(content_type, &body).await {
		Ok(payload) => json_bytes(StatusCode::OK, payload.into_bytes()),
		Err(e) => e.into_response(),
	}
}

async fn preflight() -> StatusCode {
	StatusCode::OK
}

async fn fallback(method: Method) -> Response {
	if method == Method::OPTIONS {
		return StatusCode::OK.into_response();
	}

	let body = ErrorBody { error: "not_found", error_description: "Endpoint not found.".into() };

	(StatusCode::NOT_FOUND, Json(body)).into_response()
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status =
			StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		match self {
			Error::Provider { payload } => json_bytes(status, payload.into_bytes()),
			other => {
				let body = ErrorBody {
					error: other.error_code(),
					error_description: other.error_description(),
				};

				(status, Json(body)).into_response()
			},
		}
	}
}

fn body_rejection(rejection: &BytesRejection) -> Error {
	if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
		Error::invalid_request(format!("Request body exceeds {MAX_BODY_BYTES} bytes."))
	} else {
		Error::invalid_request("Request body could not be read.")
	}
}

fn json_bytes(status: StatusCode, body: Vec<u8>) -> Response {
	(status, [(CONTENT_TYPE, HeaderValue::from_static("application/json"))], body).into_response()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
	let detail = panic
		.downcast_ref::<String>()
		.map(String::as_str)
		.or_else(|| panic.downcast_ref::<&str>().copied())
		.unwrap_or("<non-string panic>");

	tracing::error!(panic = detail, "Request handler panicked.");

	let body =
		ErrorBody { error: "server_error", error_description: "Internal server error.".into() };

	(StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
		}
	};
	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			},
			Err(e) => {
				tracing::error!(error = %e, "Failed to listen for SIGTERM.");
				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	tracing::info!("Shutdown signal received.");
}
