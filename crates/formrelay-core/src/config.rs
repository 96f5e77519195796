//! Controller configuration.
//!
//! The defaults reproduce the Bootstrap/Laravel contract: forms marked with
//! `form-ignore` are left alone, the CSRF token is read from the `_token`
//! hidden input and sent as `X-CSRF-TOKEN`, and the submit button shows a
//! Bootstrap spinner with the `Enviando...` label while a request is in flight.
//!
//! ## Example
//!
//! ```
//! use formrelay_core::config::{BindingMode, FormRelayConfig};
//!
//! let config = FormRelayConfig::from_json(r#"{"loading_label": "Sending..."}"#).unwrap();
//! assert_eq!(config.loading_label, "Sending...");
//! assert_eq!(config.ignore_class, "form-ignore");
//! assert_eq!(config.binding, BindingMode::Delegated);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::render::html_escape;

/// Default marker class for forms that must not be intercepted.
pub const DEFAULT_IGNORE_CLASS: &str = "form-ignore";

/// Default label shown next to the spinner while a request is in flight.
pub const DEFAULT_LOADING_LABEL: &str = "Enviando...";

/// Bootstrap spinner shown inside the submit button while a request is in flight.
pub const DEFAULT_SPINNER_HTML: &str =
	r#"<span class="spinner-border spinner-border-sm" role="status" aria-hidden="true"></span>"#;

/// How submit listeners are attached to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingMode {
	/// One listener at the document, filtered per event. Covers forms inserted later.
	#[default]
	Delegated,
	/// One listener per qualifying form present when the page becomes ready.
	Direct,
}

/// Where the CSRF token is looked up and how it is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
	/// Name of the hidden input carrying the token inside the form.
	pub field_name: String,
	/// Header used for tokens read from the form or the meta tag.
	pub header_name: String,
	/// `<meta name="...">` consulted when the form has no token input.
	pub meta_name: String,
	/// Cookie consulted as a last resort.
	pub cookie_name: String,
	/// Header used for the cookie token.
	pub cookie_header_name: String,
}

impl Default for CsrfConfig {
	fn default() -> Self {
		Self {
			field_name: "_token".to_string(),
			header_name: "X-CSRF-TOKEN".to_string(),
			meta_name: "csrf-token".to_string(),
			cookie_name: "XSRF-TOKEN".to_string(),
			cookie_header_name: "X-XSRF-TOKEN".to_string(),
		}
	}
}

/// Configuration for [`FormController`](crate::controller::FormController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormRelayConfig {
	/// Forms carrying this class are never intercepted.
	pub ignore_class: String,
	/// Listener strategy used by the browser installer.
	pub binding: BindingMode,
	/// Text shown next to the spinner. Rendered as text, never as markup.
	pub loading_label: String,
	/// Markup of the spinner placed in the submit button.
	pub spinner_html: String,
	/// CSRF token lookup.
	pub csrf: CsrfConfig,
	/// Remove the previous alert of a form before showing a new one.
	pub replace_alerts: bool,
	/// Reject a submit while the same form is still waiting for a response.
	pub guard_in_flight: bool,
}

impl Default for FormRelayConfig {
	fn default() -> Self {
		Self {
			ignore_class: DEFAULT_IGNORE_CLASS.to_string(),
			binding: BindingMode::default(),
			loading_label: DEFAULT_LOADING_LABEL.to_string(),
			spinner_html: DEFAULT_SPINNER_HTML.to_string(),
			csrf: CsrfConfig::default(),
			replace_alerts: true,
			guard_in_flight: true,
		}
	}
}

impl FormRelayConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a configuration from JSON. Missing keys keep their defaults.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Sets the marker class of ignored forms.
	pub fn with_ignore_class(mut self, class: impl Into<String>) -> Self {
		self.ignore_class = class.into();
		self
	}

	/// Sets the listener strategy.
	pub fn with_binding(mut self, binding: BindingMode) -> Self {
		self.binding = binding;
		self
	}

	/// Sets the loading label.
	pub fn with_loading_label(mut self, label: impl Into<String>) -> Self {
		self.loading_label = label.into();
		self
	}

	/// Sets the CSRF lookup configuration.
	pub fn with_csrf(mut self, csrf: CsrfConfig) -> Self {
		self.csrf = csrf;
		self
	}

	/// Keeps every alert instead of replacing the previous one.
	pub fn accumulate_alerts(mut self) -> Self {
		self.replace_alerts = false;
		self
	}

	/// Allows a form to be resubmitted while a request is still pending.
	pub fn allow_concurrent_submits(mut self) -> Self {
		self.guard_in_flight = false;
		self
	}

	/// Markup placed in the submit button while a request is in flight.
	pub fn loading_html(&self) -> String {
		format!("{} {}", self.spinner_html, html_escape(&self.loading_label))
	}
}
