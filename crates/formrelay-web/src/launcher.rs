//! Page installer.
//!
//! [`install`] waits for the document to be parsed, then starts listening for
//! `submit` events according to [`BindingMode`]:
//!
//! - `Delegated`: one listener on the document element. Forms inserted later are
//!   handled too.
//! - `Direct`: one listener per qualifying form present at install time.
//!
//! Each intercepted event suppresses the native navigation and spawns one
//! submit cycle with `wasm_bindgen_futures::spawn_local`.
//!
//! ## Page configuration
//!
//! ```html
//! <script type="application/json" id="formrelay-config">
//!   { "ignore_class": "no-ajax", "binding": "direct" }
//! </script>
//! ```

use formrelay_core::config::FormRelayConfig;
use formrelay_core::error::{FormRelayError, Result};

use std::cell::Cell;

#[cfg(target_arch = "wasm32")]
use {
	crate::dom::WebDom,
	crate::transport::FetchTransport,
	formrelay_core::config::BindingMode,
	formrelay_core::controller::{FormController, SubmitOutcome},
	formrelay_core::transport::Transport,
	formrelay_core::{debug_log, error_log, info_log},
	std::rc::Rc,
	wasm_bindgen::JsCast,
	wasm_bindgen::prelude::*,
	web_sys::{Element, Event, EventTarget, FormData},
};

/// Id of the `<script type="application/json">` block holding the page
/// configuration.
pub const CONFIG_ELEMENT_ID: &str = "formrelay-config";

thread_local! {
	static INSTALLED: Cell<bool> = const { Cell::new(false) };
}

/// Runs `attempt` unless a previous attempt succeeded.
///
/// Only a successful attempt marks the page installed, so a failed install
/// can be retried.
fn install_once(attempt: impl FnOnce() -> Result<()>) -> Result<()> {
	if INSTALLED.with(Cell::get) {
		return Err(FormRelayError::AlreadyInstalled);
	}
	attempt()?;
	INSTALLED.with(|installed| installed.set(true));
	Ok(())
}

/// Parses the page configuration block.
///
/// A missing or blank block yields the default configuration.
pub fn parse_page_config(text: Option<&str>) -> Result<FormRelayConfig> {
	match text.map(str::trim) {
		Some(json) if !json.is_empty() => FormRelayConfig::from_json(json),
		_ => Ok(FormRelayConfig::default()),
	}
}

/// Reads the configuration block of the current page.
#[cfg(target_arch = "wasm32")]
pub fn load_page_config(dom: &WebDom) -> Result<FormRelayConfig> {
	let text = dom
		.document()
		.get_element_by_id(CONFIG_ELEMENT_ID)
		.and_then(|element| element.text_content());
	parse_page_config(text.as_deref())
}

/// Reads the configuration block of the current page (non-WASM stub).
#[cfg(not(target_arch = "wasm32"))]
pub fn load_page_config() -> Result<FormRelayConfig> {
	Err(FormRelayError::Unsupported("load_page_config"))
}

/// Installs formrelay on the current page.
///
/// Fails with [`FormRelayError::AlreadyInstalled`] once a previous call
/// succeeded.
#[cfg(target_arch = "wasm32")]
pub fn install(config: FormRelayConfig) -> Result<()> {
	install_once(|| {
		#[cfg(feature = "console_error_panic_hook")]
		console_error_panic_hook::set_once();

		let dom = WebDom::from_window()?;
		let controller = Rc::new(FormController::new(dom.clone(), FetchTransport, config));

		when_ready(&dom, move || {
			let bound = controller
				.dom()
				.root()
				.and_then(|root| bind(&controller, &root));
			match bound {
				Ok(count) => info_log!(
					"formrelay listening ({:?}, {} listener(s))",
					controller.config().binding,
					count
				),
				Err(err) => error_log!("formrelay failed to bind: {}", err),
			}
		})
	})
}

/// Installs formrelay on the current page (non-WASM stub).
#[cfg(not(target_arch = "wasm32"))]
pub fn install(_config: FormRelayConfig) -> Result<()> {
	install_once(|| Err(FormRelayError::Unsupported("install")))
}

/// Runs `callback` once the document is parsed.
#[cfg(target_arch = "wasm32")]
fn when_ready<F>(dom: &WebDom, callback: F) -> Result<()>
where
	F: FnOnce() + 'static,
{
	if dom.document().ready_state() != "loading" {
		callback();
		return Ok(());
	}

	let listener = Closure::once_into_js(callback);
	dom.document()
		.add_event_listener_with_callback("DOMContentLoaded", listener.unchecked_ref())
		.map_err(|err| FormRelayError::dom(crate::dom::describe_js_error(&err)))
}

/// Starts intercepting `submit` events under `scope` with `controller`.
///
/// `Delegated` puts one listener on `scope` itself; `Direct` puts one on
/// every qualifying form under it right now. Returns the number of
/// listeners added. [`install`] calls this with the document element and
/// [`FetchTransport`].
#[cfg(target_arch = "wasm32")]
pub fn bind<T>(controller: &Rc<FormController<WebDom, T>>, scope: &Element) -> Result<usize>
where
	T: Transport<FormData> + 'static,
{
	match controller.config().binding {
		BindingMode::Delegated => {
			listen_for_submit(scope, controller)?;
			Ok(1)
		}
		BindingMode::Direct => {
			let forms = controller.qualifying_forms(scope);
			for form in &forms {
				listen_for_submit(form, controller)?;
			}
			Ok(forms.len())
		}
	}
}

#[cfg(target_arch = "wasm32")]
fn listen_for_submit<T>(target: &EventTarget, controller: &Rc<FormController<WebDom, T>>) -> Result<()>
where
	T: Transport<FormData> + 'static,
{
	let controller = Rc::clone(controller);
	let closure = Closure::wrap(Box::new(move |event: Event| {
		handle_submit_event(&controller, &event);
	}) as Box<dyn FnMut(_)>);

	target
		.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())
		.map_err(|err| FormRelayError::dom(crate::dom::describe_js_error(&err)))?;

	closure.forget(); // Keep closure alive for the page lifetime
	Ok(())
}

/// Intercepts one `submit` event and spawns its submit cycle.
#[cfg(target_arch = "wasm32")]
fn handle_submit_event<T>(controller: &Rc<FormController<WebDom, T>>, event: &Event)
where
	T: Transport<FormData> + 'static,
{
	let Some(target) = event
		.target()
		.and_then(|target| target.dyn_into::<Element>().ok())
	else {
		return;
	};
	let Some(form) = controller.intercept(&target) else {
		debug_log!("Ignoring submit of non-qualifying form");
		return;
	};

	event.prevent_default();

	let controller = Rc::clone(controller);
	wasm_bindgen_futures::spawn_local(async move {
		match controller.submit(form).await {
			Ok(SubmitOutcome::Rejected) => debug_log!("Submit ignored while in flight"),
			Ok(SubmitOutcome::Settled(verdict)) => debug_log!("Submit settled: {:?}", verdict),
			Err(err) => error_log!("Submit failed: {}", err),
		}
	});
}

#[cfg(target_arch = "wasm32")]
fn to_js_error(err: FormRelayError) -> JsValue {
	js_sys::Error::new(&err.to_string()).into()
}

/// Installs formrelay with a JSON configuration.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = installWithConfig)]
pub fn install_with_config(json: &str) -> std::result::Result<(), JsValue> {
	let config = FormRelayConfig::from_json(json).map_err(to_js_error)?;
	install(config).map_err(to_js_error)
}

/// Installs formrelay with a JSON configuration (non-WASM stub).
///
/// The configuration is still validated.
#[cfg(not(target_arch = "wasm32"))]
pub fn install_with_config(json: &str) -> Result<()> {
	let config = FormRelayConfig::from_json(json)?;
	install(config)
}

/// Installs formrelay with the page configuration block.
///
/// Runs on module load with the `autostart` feature.
#[cfg(target_arch = "wasm32")]
#[cfg_attr(feature = "autostart", wasm_bindgen(start))]
#[cfg_attr(not(feature = "autostart"), wasm_bindgen)]
pub fn start() -> std::result::Result<(), JsValue> {
	let dom = WebDom::from_window().map_err(to_js_error)?;
	let config = load_page_config(&dom).map_err(to_js_error)?;
	install(config).map_err(to_js_error)
}

/// Installs formrelay with the page configuration block (non-WASM stub).
#[cfg(not(target_arch = "wasm32"))]
pub fn start() -> Result<()> {
	Err(FormRelayError::Unsupported("start"))
}
