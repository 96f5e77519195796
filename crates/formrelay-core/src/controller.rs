//! The form submission controller.
//!
//! [`FormController`] owns the submit lifecycle of every qualifying form:
//!
//! 1. resolve the form, its `action`, `method` and field data
//! 2. capture the submit label, disable inputs, show the loading state
//! 3. send one request with the CSRF, `X-Requested-With` and `Accept` headers
//! 4. interpret the response and render the outcome
//! 5. restore inputs and the submit label, whatever happened
//!
//! ## Example
//!
//! ```
//! use formrelay_core::testing::{MemoryDom, MockTransport};
//! use formrelay_core::transport::TransportResponse;
//! use formrelay_core::{Dom, FormController, FormRelayConfig, SubmitOutcome};
//!
//! let dom = MemoryDom::new();
//! let form = dom.append_new(&dom.body(), "form", &[("action", "/contact"), ("method", "POST")]);
//! let transport = MockTransport::new();
//! transport.respond(TransportResponse::new(200, "OK", r#"{"message": "Thanks!"}"#));
//!
//! let controller = FormController::new(dom.clone(), transport, FormRelayConfig::default());
//! let outcome = futures::executor::block_on(controller.submit(form.clone())).unwrap();
//!
//! assert!(matches!(outcome, SubmitOutcome::Settled(_)));
//! assert_eq!(dom.inner_text(&dom.alerts(&form)[0]), "Thanks!");
//! ```

use crate::config::FormRelayConfig;
use crate::csrf::find_token;
use crate::dom::{Dom, Query, closest};
use crate::error::{FormRelayError, Result};
use crate::interpret::{Verdict, interpret};
use crate::lifecycle::{InFlight, SubmissionState, state_of};
use crate::render::{show_alert, show_field_errors};
use crate::transport::{DEFAULT_METHOD, SubmitRequest, Transport, standard_headers};
use crate::{debug_log, info_log, warn_log};

/// Result of one submit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
	/// The form was already submitting; nothing was sent.
	Rejected,
	/// The request settled and its verdict was rendered.
	Settled(Verdict),
}

/// Drives the submit lifecycle of forms in a document.
pub struct FormController<D: Dom, T> {
	dom: D,
	transport: T,
	config: FormRelayConfig,
}

impl<D, T> FormController<D, T>
where
	D: Dom,
	T: Transport<D::Payload>,
{
	/// Creates a controller.
	pub fn new(dom: D, transport: T, config: FormRelayConfig) -> Self {
		Self {
			dom,
			transport,
			config,
		}
	}

	/// The active configuration.
	pub fn config(&self) -> &FormRelayConfig {
		&self.config
	}

	/// The DOM backend.
	pub fn dom(&self) -> &D {
		&self.dom
	}

	/// Returns whether a form is handled by this controller.
	pub fn is_qualifying(&self, form: &D::Element) -> bool {
		self.dom.tag_name(form) == "form" && !self.dom.has_class(form, &self.config.ignore_class)
	}

	/// Resolves the form a submit event targets: the target itself or its
	/// nearest form ancestor, provided it qualifies.
	///
	/// Event listeners call this to decide whether to suppress the default
	/// navigation.
	pub fn intercept(&self, target: &D::Element) -> Option<D::Element> {
		closest(&self.dom, target, "form").filter(|form| self.is_qualifying(form))
	}

	/// Every qualifying form below `root`, in document order.
	pub fn qualifying_forms(&self, root: &D::Element) -> Vec<D::Element> {
		self.dom
			.query_all(root, &Query::Tag("form"))
			.into_iter()
			.filter(|form| self.is_qualifying(form))
			.collect()
	}

	/// Builds the request for a form from its current state.
	pub fn build_request(&self, form: &D::Element) -> Result<SubmitRequest<D::Payload>> {
		let action = self.dom.attribute(form, "action").unwrap_or_default();
		let method = self
			.dom
			.attribute(form, "method")
			.unwrap_or_else(|| DEFAULT_METHOD.to_string());

		let mut headers = Vec::with_capacity(3);
		match find_token(&self.dom, &self.config.csrf, form) {
			Some(token) => headers.push(token.header(&self.config.csrf)),
			None => warn_log!("No CSRF token found for form '{}'", action),
		}
		headers.extend(standard_headers());

		let body = self.dom.collect_payload(form)?;
		Ok(SubmitRequest {
			action,
			method,
			headers,
			body,
		})
	}

	/// Runs one submit cycle for a form.
	///
	/// Server and network failures are rendered into the form and reported as
	/// [`SubmitOutcome::Settled`]; `Err` is reserved for failures of the DOM
	/// backend itself. The form is restored in every case.
	pub async fn submit(&self, form: D::Element) -> Result<SubmitOutcome> {
		let tag = self.dom.tag_name(&form);
		if tag != "form" {
			return Err(FormRelayError::NotAForm(tag));
		}

		if self.config.guard_in_flight
			&& state_of(&self.dom, &form) == SubmissionState::Submitting
		{
			warn_log!("Form is already submitting; ignoring submit");
			return Ok(SubmitOutcome::Rejected);
		}

		let request = self.build_request(&form)?;
		info_log!("Submitting {} {}", request.method, request.action);

		let in_flight = InFlight::begin(&self.dom, &self.config, &form)?;
		let verdict = interpret(self.transport.send(request).await);
		debug_log!("Verdict: {:?}", verdict);

		self.render(&form, &verdict)?;
		drop(in_flight);
		Ok(SubmitOutcome::Settled(verdict))
	}

	/// Renders a verdict into a form.
	pub fn render(&self, form: &D::Element, verdict: &Verdict) -> Result<()> {
		match verdict {
			Verdict::Redirect(target) => self.dom.navigate(target),
			Verdict::Invalid(errors) => {
				show_field_errors(&self.dom, form, errors)?;
				Ok(())
			}
			Verdict::MalformedValidation => {
				warn_log!("Validation response carried no field errors");
				Ok(())
			}
			Verdict::Success { .. } | Verdict::ClientError { .. } | Verdict::Failure { .. } => {
				if let Some((kind, message)) = verdict.alert() {
					show_alert(&self.dom, &self.config, form, kind, &message)?;
				}
				Ok(())
			}
		}
	}
}
