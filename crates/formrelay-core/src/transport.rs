//! Transmission of form payloads.
//!
//! A [`Transport`] sends one [`SubmitRequest`] and resolves with the response
//! status, status text and body, or with a [`TransportError`] when no response
//! was received at all. Status codes are never treated as errors at this layer;
//! that is the job of [`interpret`](crate::interpret::interpret).

use async_trait::async_trait;

/// Header marking the request as programmatic.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";

/// Value of [`REQUESTED_WITH_HEADER`].
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// Header announcing the accepted response type.
pub const ACCEPT_HEADER: &str = "Accept";

/// Value of [`ACCEPT_HEADER`].
pub const ACCEPT_JSON: &str = "application/json";

/// Method used when the form declares none.
pub const DEFAULT_METHOD: &str = "POST";

/// One outbound submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest<P> {
	/// Destination, verbatim from the form's `action` attribute.
	pub action: String,
	/// Verb, verbatim from the form's `method` attribute.
	pub method: String,
	/// Request headers, in insertion order.
	pub headers: Vec<(String, String)>,
	/// Field data.
	pub body: P,
}

impl<P> SubmitRequest<P> {
	/// Returns the first header with the given name (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// A settled response, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// HTTP reason phrase.
	pub status_text: String,
	/// Raw response body.
	pub body: String,
}

impl TransportResponse {
	/// Creates a response.
	pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
		Self {
			status,
			status_text: status_text.into(),
			body: body.into(),
		}
	}

	/// Creates a response with a JSON body.
	pub fn json(status: u16, status_text: impl Into<String>, body: &serde_json::Value) -> Self {
		Self::new(status, status_text, body.to_string())
	}
}

/// The request produced no response (network failure, blocked request, ...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
	/// Human-readable description of the failure.
	pub message: String,
}

impl TransportError {
	/// Creates a transport error.
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

/// Sends submissions whose body is of type `P`.
#[async_trait(?Send)]
pub trait Transport<P> {
	/// Sends the request and waits for the complete response body.
	async fn send(
		&self,
		request: SubmitRequest<P>,
	) -> std::result::Result<TransportResponse, TransportError>;
}

/// Headers attached to every submission besides the CSRF token.
pub fn standard_headers() -> [(String, String); 2] {
	[
		(
			REQUESTED_WITH_HEADER.to_string(),
			REQUESTED_WITH_VALUE.to_string(),
		),
		(ACCEPT_HEADER.to_string(), ACCEPT_JSON.to_string()),
	]
}
