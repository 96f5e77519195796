//! Per-form submission state machine.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──settle──▶ Settled ──submit──▶ Submitting ...
//! ```
//!
//! The state is stored on the form itself (`data-formrelay-state`), so it is
//! keyed by form identity without any side table. [`InFlight`] performs the
//! `Submitting` transition and its presentation changes; dropping it performs
//! the `Settled` transition and restores the form, whichever way the cycle
//! ended.

use crate::config::FormRelayConfig;
use crate::dom::{Dom, Query, query_first};
use crate::error::Result;
use crate::{debug_log, error_log};

/// Attribute holding a form's [`SubmissionState`].
pub const STATE_ATTRIBUTE: &str = "data-formrelay-state";

/// Lifecycle state of one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
	/// Never submitted through formrelay.
	#[default]
	Idle,
	/// A request is in flight.
	Submitting,
	/// The last request settled.
	Settled,
}

impl SubmissionState {
	/// Attribute value of the state.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Submitting => "submitting",
			Self::Settled => "settled",
		}
	}

	/// Parses an attribute value. Unknown values read as `Idle`.
	pub fn parse(value: &str) -> Self {
		match value {
			"submitting" => Self::Submitting,
			"settled" => Self::Settled,
			_ => Self::Idle,
		}
	}
}

/// Current state of a form.
pub fn state_of<D: Dom>(dom: &D, form: &D::Element) -> SubmissionState {
	dom.attribute(form, STATE_ATTRIBUTE)
		.map(|value| SubmissionState::parse(&value))
		.unwrap_or_default()
}

fn set_state<D: Dom>(dom: &D, form: &D::Element, state: SubmissionState) -> Result<()> {
	debug_log!("form state -> {}", state.as_str());
	dom.set_attribute(form, STATE_ATTRIBUTE, state.as_str())
}

/// Toggles the read-only state of every `input` of the form.
pub fn set_inputs_read_only<D: Dom>(dom: &D, form: &D::Element, read_only: bool) {
	for input in dom.query_all(form, &Query::Tag("input")) {
		dom.set_read_only(&input, read_only);
	}
}

/// The first `button[type=submit]` of the form.
pub fn submit_button<D: Dom>(dom: &D, form: &D::Element) -> Option<D::Element> {
	let query = Query::TagWithAttribute {
		tag: "button",
		name: "type",
		value: "submit",
	};
	query_first(dom, form, &query)
}

/// A form in the `Submitting` state.
///
/// Created by [`InFlight::begin`]; restores the form when dropped.
#[derive(Debug)]
pub struct InFlight<D: Dom> {
	dom: D,
	form: D::Element,
	button: Option<D::Element>,
	label: Option<String>,
}

impl<D: Dom> InFlight<D> {
	/// Captures the submit label, then disables the inputs and shows the
	/// loading state.
	pub fn begin(dom: &D, config: &FormRelayConfig, form: &D::Element) -> Result<Self> {
		let button = submit_button(dom, form);
		let label = button.as_ref().map(|button| dom.inner_text(button));
		let guard = Self {
			dom: dom.clone(),
			form: form.clone(),
			button,
			label,
		};

		set_state(dom, form, SubmissionState::Submitting)?;
		set_inputs_read_only(dom, form, true);
		if let Some(button) = &guard.button {
			dom.set_inner_html(button, &config.loading_html());
		}
		Ok(guard)
	}

	/// The label captured before the loading state was shown.
	pub fn original_label(&self) -> Option<&str> {
		self.label.as_deref()
	}
}

impl<D: Dom> Drop for InFlight<D> {
	fn drop(&mut self) {
		set_inputs_read_only(&self.dom, &self.form, false);
		if let (Some(button), Some(label)) = (&self.button, &self.label) {
			self.dom.set_text_content(button, label);
		}
		if let Err(err) = set_state(&self.dom, &self.form, SubmissionState::Settled) {
			error_log!("Failed to settle form: {}", err);
		}
	}
}
