//! Visual feedback rendered into forms.
//!
//! Alerts are `div.alert.alert-{kind}` elements prepended to the form and
//! tagged with [`ALERT_MARKER`]. Field errors follow Bootstrap's validation
//! markup: the input gets `is-invalid` and a sibling `div.invalid-feedback`
//! holds the messages as a list.

use std::borrow::Cow;

use crate::config::FormRelayConfig;
use crate::contract::{AlertKind, ErrorBag};
use crate::debug_log;
use crate::dom::{Dom, Query, query_first};
use crate::error::{FormRelayError, Result};

/// Attribute identifying alerts inserted by formrelay.
pub const ALERT_MARKER: &str = "data-formrelay-alert";

/// Attribute set on inputs whose clear-on-edit listener is registered.
pub const WATCHED_MARKER: &str = "data-formrelay-watched";

/// Class of inputs rejected by the server.
pub const INVALID_CLASS: &str = "is-invalid";

/// Class of inputs accepted by the server.
pub const VALID_CLASS: &str = "is-valid";

/// Class of the per-input message container.
pub const FEEDBACK_CLASS: &str = "invalid-feedback";

/// Escapes HTML special characters in a string.
///
/// Returns a borrowed reference if no escaping is needed.
pub fn html_escape(s: &str) -> Cow<'_, str> {
	if s.contains(['&', '<', '>', '"', '\'']) {
		let mut escaped = String::with_capacity(s.len() + 8);
		for c in s.chars() {
			match c {
				'&' => escaped.push_str("&amp;"),
				'<' => escaped.push_str("&lt;"),
				'>' => escaped.push_str("&gt;"),
				'"' => escaped.push_str("&quot;"),
				'\'' => escaped.push_str("&#x27;"),
				_ => escaped.push(c),
			}
		}
		Cow::Owned(escaped)
	} else {
		Cow::Borrowed(s)
	}
}

/// Renders messages as an unordered list.
pub fn messages_html(messages: &[String]) -> String {
	let mut html = String::from("<ul>");
	for message in messages {
		html.push_str("<li>");
		html.push_str(&html_escape(message));
		html.push_str("</li>");
	}
	html.push_str("</ul>");
	html
}

/// Prepends an alert to the form and returns it.
///
/// With [`FormRelayConfig::replace_alerts`], alerts previously inserted into
/// the same form are removed first.
pub fn show_alert<D: Dom>(
	dom: &D,
	config: &FormRelayConfig,
	form: &D::Element,
	kind: AlertKind,
	message: &str,
) -> Result<D::Element> {
	if config.replace_alerts {
		for stale in dom.query_all(form, &Query::HasAttribute(ALERT_MARKER)) {
			dom.remove(&stale);
		}
	}

	let alert = dom.create_element("div")?;
	dom.set_attribute(&alert, "class", &kind.class_name())?;
	dom.set_attribute(&alert, "role", "alert")?;
	dom.set_attribute(&alert, ALERT_MARKER, kind.as_str())?;
	dom.set_text_content(&alert, message);
	dom.prepend(form, &alert)?;
	Ok(alert)
}

/// Marks every `input[type=text]` of the form as valid.
///
/// Inputs left invalid by an earlier response lose `is-invalid` and their
/// feedback is emptied.
pub fn highlight_valid_inputs<D: Dom>(dom: &D, form: &D::Element) -> Result<()> {
	let query = Query::TagWithAttribute {
		tag: "input",
		name: "type",
		value: "text",
	};
	for input in dom.query_all(form, &query) {
		if dom.has_class(&input, INVALID_CLASS) {
			dom.remove_class(&input, INVALID_CLASS)?;
			if let Some(feedback) = existing_feedback(dom, &input) {
				dom.set_inner_html(&feedback, "");
			}
		}
		dom.add_class(&input, VALID_CLASS)?;
	}
	Ok(())
}

fn existing_feedback<D: Dom>(dom: &D, input: &D::Element) -> Option<D::Element> {
	let parent = dom.parent(input)?;
	query_first(dom, &parent, &Query::Class(FEEDBACK_CLASS))
}

/// Applies a validation error bag to a form.
///
/// Text inputs are first marked valid, then each named field is marked
/// invalid. Names without a matching input are skipped. Returns the names of
/// the fields that were marked.
pub fn show_field_errors<D: Dom>(
	dom: &D,
	form: &D::Element,
	errors: &ErrorBag,
) -> Result<Vec<String>> {
	highlight_valid_inputs(dom, form)?;

	let mut marked = Vec::with_capacity(errors.len());
	for (name, messages) in errors {
		let query = Query::TagWithAttribute {
			tag: "input",
			name: "name",
			value: name,
		};
		match query_first(dom, form, &query) {
			Some(input) => {
				mark_invalid(dom, &input, messages)?;
				marked.push(name.clone());
			}
			None => debug_log!("No input named '{}' for validation errors", name),
		}
	}
	Ok(marked)
}

/// Returns the feedback element of an input, creating it on first use.
///
/// The element lives inside the input's parent, so inputs sharing a parent
/// share one feedback element.
pub fn feedback_element<D: Dom>(dom: &D, input: &D::Element) -> Result<D::Element> {
	let parent = dom
		.parent(input)
		.ok_or_else(|| FormRelayError::dom("input has no parent element"))?;

	if let Some(existing) = existing_feedback(dom, input) {
		return Ok(existing);
	}

	let feedback = dom.create_element("div")?;
	dom.add_class(&feedback, FEEDBACK_CLASS)?;
	dom.append(&parent, &feedback)?;
	Ok(feedback)
}

/// Marks an input invalid and lists its messages in the feedback element.
pub fn mark_invalid<D: Dom>(dom: &D, input: &D::Element, messages: &[String]) -> Result<()> {
	let feedback = feedback_element(dom, input)?;
	dom.add_class(input, INVALID_CLASS)?;
	dom.remove_class(input, VALID_CLASS)?;
	dom.set_inner_html(&feedback, &messages_html(messages));
	watch_for_edit(dom, input, &feedback)
}

/// Registers the clear-on-edit listener of an input, once.
fn watch_for_edit<D: Dom>(dom: &D, input: &D::Element, feedback: &D::Element) -> Result<()> {
	if dom.attribute(input, WATCHED_MARKER).is_some() {
		return Ok(());
	}

	let handler_dom = dom.clone();
	let handler_input = input.clone();
	let handler_feedback = feedback.clone();
	dom.on_input(
		input,
		Box::new(move || {
			if !handler_dom.has_class(&handler_input, INVALID_CLASS) {
				return;
			}
			if let Err(err) = handler_dom.remove_class(&handler_input, INVALID_CLASS) {
				crate::error_log!("Failed to clear invalid state: {}", err);
			}
			handler_dom.set_inner_html(&handler_feedback, "");
		}),
	)?;
	dom.set_attribute(input, WATCHED_MARKER, "")
}
