//! End-to-end submit lifecycle tests against the in-memory DOM.
//!
//! Each test builds a small page, queues the server answer, runs one or more
//! submit cycles and inspects the resulting document.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use rstest::{fixture, rstest};
use serde_json::json;

use formrelay_core::dom::Dom;
use formrelay_core::lifecycle::{STATE_ATTRIBUTE, state_of};
use formrelay_core::render::{FEEDBACK_CLASS, INVALID_CLASS, VALID_CLASS};
use formrelay_core::testing::{MemoryDom, MockTransport, NodeRef, SubmissionPayload};
use formrelay_core::{
	FormController, FormRelayConfig, FormRelayError, Query, SubmissionState, SubmitOutcome,
	SubmitRequest, Transport, TransportError, TransportResponse, Verdict,
};

struct Page {
	dom: MemoryDom,
	form: NodeRef,
	button: NodeRef,
	transport: MockTransport,
}

impl Page {
	fn controller(&self) -> FormController<MemoryDom, MockTransport> {
		self.controller_with(FormRelayConfig::default())
	}

	fn controller_with(&self, config: FormRelayConfig) -> FormController<MemoryDom, MockTransport> {
		FormController::new(self.dom.clone(), self.transport.clone(), config)
	}

	fn input(&self, name: &str) -> NodeRef {
		self.dom.find_input(&self.form, name).unwrap()
	}

	fn alert_texts(&self) -> Vec<String> {
		self.dom
			.alerts(&self.form)
			.iter()
			.map(|alert| self.dom.inner_text(alert))
			.collect()
	}
}

#[fixture]
fn page() -> Page {
	let dom = MemoryDom::new();
	dom.append_new(
		&dom.head(),
		"meta",
		&[("name", "csrf-token"), ("content", "meta-token")],
	);
	let form = dom.append_new(
		&dom.body(),
		"form",
		&[("action", "/register"), ("method", "POST")],
	);
	dom.append_new(
		&form,
		"input",
		&[("type", "hidden"), ("name", "_token"), ("value", "form-token")],
	);
	for name in ["name", "email"] {
		let group = dom.append_new(&form, "div", &[("class", "mb-3")]);
		dom.append_new(&group, "input", &[("type", "text"), ("name", name)]);
	}
	let button = dom.append_new(&form, "button", &[("type", "submit")]);
	dom.set_text_content(&button, "Register");

	Page {
		dom,
		form,
		button,
		transport: MockTransport::new(),
	}
}

#[rstest]
fn test_intercept_resolves_enclosing_form(page: Page) {
	let controller = page.controller();

	assert_eq!(controller.intercept(&page.button), Some(page.form));
	assert_eq!(controller.intercept(&page.form), Some(page.form));
	assert_eq!(controller.intercept(&page.dom.body()), None);
}

#[rstest]
fn test_ignored_forms_are_not_intercepted(page: Page) {
	let ignored = page
		.dom
		.append_new(&page.dom.body(), "form", &[("class", "inline form-ignore")]);
	let button = page.dom.append_new(&ignored, "button", &[("type", "submit")]);
	let controller = page.controller();

	assert_eq!(controller.intercept(&button), None);
	assert_eq!(
		controller.qualifying_forms(&page.dom.body()),
		vec![page.form]
	);
}

#[rstest]
fn test_custom_ignore_class(page: Page) {
	page.dom.add_class(&page.form, "no-ajax").unwrap();
	let controller = page.controller_with(FormRelayConfig::default().with_ignore_class("no-ajax"));

	assert_eq!(controller.intercept(&page.button), None);
}

#[rstest]
#[tokio::test]
async fn test_request_carries_form_state(page: Page) {
	page.dom.set_value(&page.input("email"), "ada@example.com");
	page.transport
		.respond_json(200, "OK", json!({ "message": "Welcome" }));

	page.controller().submit(page.form).await.unwrap();

	let requests = page.transport.requests();
	assert_eq!(requests.len(), 1);
	let request = &requests[0];
	assert_eq!(request.action, "/register");
	assert_eq!(request.method, "POST");
	assert_eq!(request.header("x-csrf-token"), Some("form-token"));
	assert_eq!(request.header("X-Requested-With"), Some("XMLHttpRequest"));
	assert_eq!(request.header("Accept"), Some("application/json"));
	assert_eq!(request.body.get("email"), Some("ada@example.com"));
	assert_eq!(request.body.get("_token"), Some("form-token"));
}

#[rstest]
#[tokio::test]
async fn test_missing_action_and_method_use_defaults() {
	let dom = MemoryDom::new();
	let form = dom.append_new(&dom.body(), "form", &[]);
	let transport = MockTransport::new();
	transport.respond_json(200, "OK", json!({}));

	let controller = FormController::new(dom.clone(), transport.clone(), FormRelayConfig::default());
	controller.submit(form).await.unwrap();

	let request = &transport.requests()[0];
	assert_eq!(request.action, "");
	assert_eq!(request.method, "POST");
	assert_eq!(request.header("X-CSRF-TOKEN"), None);
	assert_eq!(request.header("X-XSRF-TOKEN"), None);
}

#[rstest]
#[tokio::test]
async fn test_redirect_navigates_without_alert(page: Page) {
	page.transport.respond_json(
		200,
		"OK",
		json!({ "redirect": "/dashboard", "message": "ignored" }),
	);

	let outcome = page.controller().submit(page.form).await.unwrap();

	assert_eq!(
		outcome,
		SubmitOutcome::Settled(Verdict::Redirect("/dashboard".to_string()))
	);
	assert_eq!(page.dom.navigations(), vec!["/dashboard".to_string()]);
	assert!(page.alert_texts().is_empty());
}

#[rstest]
#[case(json!({ "message": "Saved" }), "Saved")]
#[case(json!({ "redirect": "", "message": "Saved" }), "Saved")]
#[case(json!({}), "")]
#[tokio::test]
async fn test_success_alert(page: Page, #[case] body: serde_json::Value, #[case] expected: &str) {
	page.transport.respond_json(200, "OK", body);

	page.controller().submit(page.form).await.unwrap();

	let alerts = page.dom.alerts(&page.form);
	assert_eq!(alerts.len(), 1);
	assert_eq!(
		page.dom.attribute(&alerts[0], "class").as_deref(),
		Some("alert alert-success")
	);
	assert_eq!(page.dom.inner_text(&alerts[0]), expected);
	assert_eq!(page.dom.children(&page.form).first(), Some(&alerts[0]));
	assert!(page.dom.navigations().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_validation_errors_mark_fields(page: Page) {
	page.transport.respond_json(
		422,
		"Unprocessable Content",
		json!({ "errors": { "email": ["Invalid email", "Already taken"] } }),
	);

	page.controller().submit(page.form).await.unwrap();

	let email = page.input("email");
	let name = page.input("name");
	assert!(page.dom.has_class(&email, INVALID_CLASS));
	assert!(!page.dom.has_class(&email, VALID_CLASS));
	assert!(page.dom.has_class(&name, VALID_CLASS));

	let group = page.dom.parent(&email).unwrap();
	let feedback = page.dom.query_all(&group, &Query::Class(FEEDBACK_CLASS));
	assert_eq!(feedback.len(), 1);
	assert_eq!(
		page.dom.inner_html(&feedback[0]),
		"<ul><li>Invalid email</li><li>Already taken</li></ul>"
	);
	assert!(page.alert_texts().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_fields_absent_from_next_response_become_valid(page: Page) {
	let controller = page.controller();
	page.transport.respond_json(
		422,
		"",
		json!({ "errors": { "email": ["Taken"], "name": ["Bad"] } }),
	);
	page.transport
		.respond_json(422, "", json!({ "errors": { "name": ["Still bad"] } }));

	controller.submit(page.form).await.unwrap();
	controller.submit(page.form).await.unwrap();

	let email = page.input("email");
	assert!(page.dom.has_class(&email, VALID_CLASS));
	assert!(!page.dom.has_class(&email, INVALID_CLASS));
	let email_group = page.dom.parent(&email).unwrap();
	let email_feedback = page.dom.query_all(&email_group, &Query::Class(FEEDBACK_CLASS));
	assert_eq!(page.dom.inner_html(&email_feedback[0]), "");

	let name = page.input("name");
	assert!(page.dom.has_class(&name, INVALID_CLASS));
	assert!(!page.dom.has_class(&name, VALID_CLASS));
	let name_group = page.dom.parent(&name).unwrap();
	let name_feedback = page.dom.query_all(&name_group, &Query::Class(FEEDBACK_CLASS));
	assert_eq!(
		page.dom.inner_html(&name_feedback[0]),
		"<ul><li>Still bad</li></ul>"
	);
}

#[rstest]
#[tokio::test]
async fn test_shared_feedback_follows_server_field_order() {
	let dom = MemoryDom::new();
	let form = dom.append_new(&dom.body(), "form", &[("action", "/people")]);
	let row = dom.append_new(&form, "div", &[("class", "row")]);
	dom.append_new(&row, "input", &[("type", "text"), ("name", "first_name")]);
	dom.append_new(&row, "input", &[("type", "text"), ("name", "last_name")]);
	let transport = MockTransport::new();
	// Raw body: the field order matters and json! would sort the keys
	transport.respond(TransportResponse::new(
		422,
		"Unprocessable Content",
		r#"{"errors": {"last_name": ["Last required"], "first_name": ["First required"]}}"#,
	));

	let controller = FormController::new(dom.clone(), transport, FormRelayConfig::default());
	controller.submit(form).await.unwrap();

	let feedback = dom.query_all(&row, &Query::Class(FEEDBACK_CLASS));
	assert_eq!(feedback.len(), 1);
	assert_eq!(
		dom.inner_html(&feedback[0]),
		"<ul><li>First required</li></ul>"
	);
}

#[rstest]
#[case(json!({ "errors": {} }))]
#[case(json!({ "message": "The given data was invalid." }))]
#[case(json!({ "errors": null }))]
#[tokio::test]
async fn test_unusable_validation_body_is_silent(page: Page, #[case] body: serde_json::Value) {
	page.transport.respond_json(422, "Unprocessable Content", body);

	let outcome = page.controller().submit(page.form).await.unwrap();

	assert_eq!(outcome, SubmitOutcome::Settled(Verdict::MalformedValidation));
	assert!(page.alert_texts().is_empty());
	for input in page.dom.inputs(&page.form) {
		assert!(!page.dom.has_class(&input, INVALID_CLASS));
		assert!(!page.dom.has_class(&input, VALID_CLASS));
	}
}

#[rstest]
#[tokio::test]
async fn test_revalidation_keeps_one_feedback_per_input(page: Page) {
	let controller = page.controller();
	page.transport
		.respond_json(422, "", json!({ "errors": { "email": ["First"] } }));
	page.transport
		.respond_json(422, "", json!({ "errors": { "email": "Second" } }));

	controller.submit(page.form).await.unwrap();
	controller.submit(page.form).await.unwrap();

	let email = page.input("email");
	let group = page.dom.parent(&email).unwrap();
	let feedback = page.dom.query_all(&group, &Query::Class(FEEDBACK_CLASS));
	assert_eq!(feedback.len(), 1);
	assert_eq!(page.dom.inner_html(&feedback[0]), "<ul><li>Second</li></ul>");
	assert_eq!(page.dom.input_listener_count(&email), 1);
}

#[rstest]
#[tokio::test]
async fn test_editing_clears_field_error(page: Page) {
	page.transport.respond_json(
		422,
		"",
		json!({ "errors": { "email": ["Invalid email"], "name": ["Required"] } }),
	);
	page.controller().submit(page.form).await.unwrap();

	let email = page.input("email");
	page.dom.type_into(&email, "ada@example.com");

	assert!(!page.dom.has_class(&email, INVALID_CLASS));
	let group = page.dom.parent(&email).unwrap();
	let feedback = page.dom.query_all(&group, &Query::Class(FEEDBACK_CLASS));
	assert_eq!(page.dom.inner_html(&feedback[0]), "");
	assert!(page.dom.has_class(&page.input("name"), INVALID_CLASS));
}

#[rstest]
#[case(403, "Forbidden", json!({ "message": "Not allowed" }), "Not allowed")]
#[case(404, "Not Found", json!({}), "Not Found")]
#[case(419, "Page Expired", json!({ "message": "CSRF token mismatch." }), "CSRF token mismatch.")]
#[tokio::test]
async fn test_client_error_warning(
	page: Page,
	#[case] status: u16,
	#[case] status_text: &str,
	#[case] body: serde_json::Value,
	#[case] expected: &str,
) {
	page.transport.respond_json(status, status_text, body);

	page.controller().submit(page.form).await.unwrap();

	let alerts = page.dom.alerts(&page.form);
	assert_eq!(alerts.len(), 1);
	assert_eq!(
		page.dom.attribute(&alerts[0], "class").as_deref(),
		Some("alert alert-warning")
	);
	assert_eq!(page.dom.inner_text(&alerts[0]), expected);
	for input in page.dom.inputs(&page.form) {
		assert!(!page.dom.has_class(&input, INVALID_CLASS));
	}
}

#[rstest]
#[case(500, "Server Error", "500 - Server Error")]
#[case(500, "Internal Server Error", "500 - Internal Server Error")]
#[case(400, "Bad Request", "400 - Bad Request")]
#[case(302, "Found", "302 - Found")]
#[tokio::test]
async fn test_server_failure_danger(
	page: Page,
	#[case] status: u16,
	#[case] status_text: &str,
	#[case] expected: &str,
) {
	page.transport
		.respond_json(status, status_text, json!({ "message": "hidden" }));

	page.controller().submit(page.form).await.unwrap();

	let alerts = page.dom.alerts(&page.form);
	assert_eq!(
		page.dom.attribute(&alerts[0], "class").as_deref(),
		Some("alert alert-danger")
	);
	assert_eq!(page.dom.inner_text(&alerts[0]), expected);
}

#[rstest]
#[tokio::test]
async fn test_unreadable_success_body_is_danger(page: Page) {
	page.transport
		.respond(TransportResponse::new(200, "OK", "<html>oops</html>"));

	page.controller().submit(page.form).await.unwrap();

	assert_eq!(page.alert_texts(), vec!["200 - OK".to_string()]);
}

#[rstest]
#[tokio::test]
async fn test_network_failure_is_danger(page: Page) {
	page.transport.fail("Failed to fetch");

	let outcome = page.controller().submit(page.form).await.unwrap();

	assert_eq!(
		outcome,
		SubmitOutcome::Settled(Verdict::Failure {
			status: 0,
			status_text: "Failed to fetch".to_string(),
		})
	);
	assert_eq!(page.alert_texts(), vec!["0 - Failed to fetch".to_string()]);
}

#[rstest]
#[case::redirect(Ok(TransportResponse::json(200, "OK", &json!({ "redirect": "/x" }))))]
#[case::success(Ok(TransportResponse::json(200, "OK", &json!({ "message": "ok" }))))]
#[case::invalid(Ok(TransportResponse::json(422, "", &json!({ "errors": { "name": ["x"] } }))))]
#[case::warning(Ok(TransportResponse::json(403, "Forbidden", &json!({}))))]
#[case::danger(Ok(TransportResponse::new(503, "Service Unavailable", "")))]
#[case::network(Err(TransportError::new("offline")))]
#[tokio::test]
async fn test_form_is_restored_after_every_outcome(
	page: Page,
	#[case] response: Result<TransportResponse, TransportError>,
) {
	match response {
		Ok(response) => page.transport.respond(response),
		Err(err) => page.transport.fail(&err.message),
	}

	page.controller().submit(page.form).await.unwrap();

	assert_eq!(state_of(&page.dom, &page.form), SubmissionState::Settled);
	assert_eq!(page.dom.inner_text(&page.button), "Register");
	for input in page.dom.inputs(&page.form) {
		assert!(!page.dom.is_read_only(&input));
	}
}

#[rstest]
#[tokio::test]
async fn test_resubmission_replaces_alert(page: Page) {
	let controller = page.controller();
	page.transport
		.respond_json(500, "Internal Server Error", json!({}));
	page.transport.respond_json(200, "OK", json!({ "message": "Saved" }));

	controller.submit(page.form).await.unwrap();
	controller.submit(page.form).await.unwrap();

	assert_eq!(page.alert_texts(), vec!["Saved".to_string()]);
}

#[rstest]
#[tokio::test]
async fn test_accumulated_alerts_stack_newest_first(page: Page) {
	let controller = page.controller_with(FormRelayConfig::default().accumulate_alerts());
	page.transport
		.respond_json(500, "Internal Server Error", json!({}));
	page.transport.respond_json(200, "OK", json!({ "message": "Saved" }));

	controller.submit(page.form).await.unwrap();
	controller.submit(page.form).await.unwrap();

	assert_eq!(
		page.alert_texts(),
		vec!["Saved".to_string(), "500 - Internal Server Error".to_string()]
	);
}

#[rstest]
#[tokio::test]
async fn test_submitting_form_rejects_resubmit(page: Page) {
	page.dom
		.set_attribute(&page.form, STATE_ATTRIBUTE, "submitting")
		.unwrap();

	let outcome = page.controller().submit(page.form).await.unwrap();

	assert_eq!(outcome, SubmitOutcome::Rejected);
	assert!(page.transport.requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_concurrent_submits_can_be_allowed(page: Page) {
	page.dom
		.set_attribute(&page.form, STATE_ATTRIBUTE, "submitting")
		.unwrap();
	page.transport.respond_json(200, "OK", json!({}));

	let outcome = page
		.controller_with(FormRelayConfig::default().allow_concurrent_submits())
		.submit(page.form)
		.await
		.unwrap();

	assert!(matches!(outcome, SubmitOutcome::Settled(_)));
	assert_eq!(page.transport.requests().len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_submit_rejects_non_form(page: Page) {
	let result = page.controller().submit(page.button).await;

	assert!(matches!(result, Err(FormRelayError::NotAForm(tag)) if tag == "button"));
	assert!(page.transport.requests().is_empty());
}

/// Transport whose response is released by the test.
#[derive(Clone, Default)]
struct GatedTransport {
	gate: Rc<RefCell<Option<oneshot::Receiver<TransportResponse>>>>,
	sent: Rc<RefCell<usize>>,
}

#[async_trait(?Send)]
impl Transport<SubmissionPayload> for GatedTransport {
	async fn send(
		&self,
		_request: SubmitRequest<SubmissionPayload>,
	) -> Result<TransportResponse, TransportError> {
		*self.sent.borrow_mut() += 1;
		let gate = self.gate.borrow_mut().take();
		match gate {
			Some(receiver) => receiver
				.await
				.map_err(|_| TransportError::new("gate dropped")),
			None => Err(TransportError::new("no gate")),
		}
	}
}

#[rstest]
#[tokio::test]
async fn test_in_flight_form_is_locked_until_settled(page: Page) {
	let (release, gate) = oneshot::channel();
	let transport = GatedTransport::default();
	*transport.gate.borrow_mut() = Some(gate);
	let controller = FormController::new(page.dom.clone(), transport.clone(), FormRelayConfig::default());

	let observe = async {
		assert_eq!(state_of(&page.dom, &page.form), SubmissionState::Submitting);
		assert!(page.dom.is_read_only(&page.input("email")));
		assert!(page.dom.inner_html(&page.button).contains("Enviando..."));
		release
			.send(TransportResponse::json(200, "OK", &json!({ "message": "Done" })))
			.unwrap();
	};

	let (first, second, ()) = futures::join!(
		controller.submit(page.form),
		controller.submit(page.form),
		observe
	);

	assert!(matches!(first.unwrap(), SubmitOutcome::Settled(_)));
	assert_eq!(second.unwrap(), SubmitOutcome::Rejected);
	assert_eq!(*transport.sent.borrow(), 1);
	assert_eq!(page.alert_texts(), vec!["Done".to_string()]);
	assert_eq!(page.dom.inner_text(&page.button), "Register");
	assert!(!page.dom.is_read_only(&page.input("email")));
}
