//! Response interpretation.
//!
//! [`interpret`] turns the settled transmission into a [`Verdict`]: what the
//! form should show. It is pure, so every branch of the response contract is
//! testable without a DOM.

use crate::contract::{AlertKind, ClientErrorPayload, ErrorBag, SuccessPayload, ValidationPayload};
use crate::transport::{TransportError, TransportResponse};
use crate::warn_log;

/// The only status treated as success.
pub const STATUS_OK: u16 = 200;

/// Status carrying per-field validation errors.
pub const STATUS_UNPROCESSABLE_ENTITY: u16 = 422;

/// Status reported for transmissions that produced no response.
pub const STATUS_NETWORK_FAILURE: u16 = 0;

/// What a settled submission means for the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
	/// Navigate the page.
	Redirect(String),
	/// Show a success alert.
	Success {
		/// Alert text (empty when the server sent none)
		message: String,
	},
	/// Mark fields invalid.
	Invalid(ErrorBag),
	/// A 422 without a usable error mapping. Nothing is shown.
	MalformedValidation,
	/// Show a warning alert (4xx other than 422).
	ClientError {
		/// Alert text
		message: String,
	},
	/// Show a danger alert with the status line.
	Failure {
		/// HTTP status, or [`STATUS_NETWORK_FAILURE`]
		status: u16,
		/// HTTP reason phrase, or the transport error description
		status_text: String,
	},
}

impl Verdict {
	fn failure(response: &TransportResponse) -> Self {
		Self::Failure {
			status: response.status,
			status_text: response.status_text.clone(),
		}
	}

	/// The alert this verdict renders, if any.
	pub fn alert(&self) -> Option<(AlertKind, String)> {
		match self {
			Self::Success { message } => Some((AlertKind::Success, message.clone())),
			Self::ClientError { message } => Some((AlertKind::Warning, message.clone())),
			Self::Failure {
				status,
				status_text,
			} => Some((AlertKind::Danger, format!("{} - {}", status, status_text))),
			Self::Redirect(_) | Self::Invalid(_) | Self::MalformedValidation => None,
		}
	}
}

/// Client errors handled through the response body: strictly between 400 and 500.
pub fn is_client_error(status: u16) -> bool {
	status > 400 && status < 500
}

/// Interprets a settled transmission.
pub fn interpret(result: std::result::Result<TransportResponse, TransportError>) -> Verdict {
	let response = match result {
		Ok(response) => response,
		Err(err) => {
			return Verdict::Failure {
				status: STATUS_NETWORK_FAILURE,
				status_text: err.message,
			};
		}
	};

	if response.status == STATUS_OK {
		return match serde_json::from_str::<SuccessPayload>(&response.body) {
			Ok(payload) => match payload.redirect.filter(|target| !target.is_empty()) {
				Some(target) => Verdict::Redirect(target),
				None => Verdict::Success {
					message: payload.message.unwrap_or_default(),
				},
			},
			Err(err) => {
				warn_log!("Unreadable success body: {}", err);
				Verdict::failure(&response)
			}
		};
	}

	if !is_client_error(response.status) {
		return Verdict::failure(&response);
	}

	if response.status == STATUS_UNPROCESSABLE_ENTITY {
		return match serde_json::from_str::<ValidationPayload>(&response.body) {
			Ok(ValidationPayload {
				errors: Some(errors),
			}) if !errors.is_empty() => Verdict::Invalid(errors),
			Ok(_) => Verdict::MalformedValidation,
			Err(err) => {
				warn_log!("Unreadable validation body: {}", err);
				Verdict::MalformedValidation
			}
		};
	}

	let message = serde_json::from_str::<ClientErrorPayload>(&response.body)
		.ok()
		.and_then(|payload| payload.message)
		.unwrap_or_else(|| response.status_text.clone());
	Verdict::ClientError { message }
}
