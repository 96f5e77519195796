//! Error types for formrelay.
//!
//! Failures reported by the server or the network never surface here: they are
//! rendered into the form as alerts or field feedback. [`FormRelayError`] covers
//! the conditions that prevent the controller itself from doing its job.

/// Errors raised by the submit controller and its browser bindings.
#[derive(Debug, thiserror::Error)]
pub enum FormRelayError {
	/// The configuration could not be parsed.
	#[error("Invalid configuration: {0}")]
	Config(#[from] serde_json::Error),

	/// A DOM operation failed.
	#[error("DOM operation failed: {0}")]
	Dom(String),

	/// The request could not be constructed.
	#[error("Failed to build request: {0}")]
	Transport(String),

	/// The element handed to the controller is not a form.
	#[error("Element <{0}> is not a form")]
	NotAForm(String),

	/// The page-level listener has already been installed.
	#[error("formrelay is already installed on this page")]
	AlreadyInstalled,

	/// A browser-only API was called outside the browser.
	#[error("{0} is only available in the browser (wasm32)")]
	Unsupported(&'static str),
}

impl FormRelayError {
	/// Create a DOM error
	pub fn dom(msg: impl Into<String>) -> Self {
		Self::Dom(msg.into())
	}

	/// Create a transport construction error
	pub fn transport(msg: impl Into<String>) -> Self {
		Self::Transport(msg.into())
	}
}

/// Result alias used across formrelay.
pub type Result<T> = std::result::Result<T, FormRelayError>;
