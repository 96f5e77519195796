//! `web-sys` implementation of [`Dom`].

use formrelay_core::dom::{Dom, Query};
use formrelay_core::error::{FormRelayError, Result};
use formrelay_core::{debug_log, error_log};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, FormData, HtmlDocument, HtmlElement, HtmlFormElement, HtmlInputElement};

/// Describes a thrown JavaScript value.
pub(crate) fn describe_js_error(err: &JsValue) -> String {
	if let Some(error) = err.dyn_ref::<js_sys::Error>() {
		return String::from(error.message());
	}
	err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

fn dom_error(err: JsValue) -> FormRelayError {
	FormRelayError::dom(describe_js_error(&err))
}

/// The page's live document.
#[derive(Debug, Clone)]
pub struct WebDom {
	document: Document,
}

impl WebDom {
	/// Wraps a document.
	pub fn new(document: Document) -> Self {
		Self { document }
	}

	/// The document of the current window.
	pub fn from_window() -> Result<Self> {
		let document = web_sys::window()
			.and_then(|window| window.document())
			.ok_or_else(|| FormRelayError::dom("no document available"))?;
		Ok(Self::new(document))
	}

	/// The wrapped document.
	pub fn document(&self) -> &Document {
		&self.document
	}

	/// The `<html>` element, root of every document-wide query.
	pub fn root(&self) -> Result<Element> {
		self.document
			.document_element()
			.ok_or_else(|| FormRelayError::dom("document has no root element"))
	}
}

impl Dom for WebDom {
	type Element = Element;
	type Payload = FormData;

	fn attribute(&self, element: &Element, name: &str) -> Option<String> {
		element.get_attribute(name)
	}

	fn set_attribute(&self, element: &Element, name: &str, value: &str) -> Result<()> {
		element.set_attribute(name, value).map_err(dom_error)
	}

	fn remove_attribute(&self, element: &Element, name: &str) -> Result<()> {
		element.remove_attribute(name).map_err(dom_error)
	}

	fn has_class(&self, element: &Element, class: &str) -> bool {
		element.class_list().contains(class)
	}

	fn add_class(&self, element: &Element, class: &str) -> Result<()> {
		element.class_list().add_1(class).map_err(dom_error)
	}

	fn remove_class(&self, element: &Element, class: &str) -> Result<()> {
		element.class_list().remove_1(class).map_err(dom_error)
	}

	fn tag_name(&self, element: &Element) -> String {
		element.tag_name().to_ascii_lowercase()
	}

	fn parent(&self, element: &Element) -> Option<Element> {
		element.parent_element()
	}

	fn query_all(&self, root: &Element, query: &Query<'_>) -> Vec<Element> {
		let selector = query.to_selector();
		let list = match root.query_selector_all(&selector) {
			Ok(list) => list,
			Err(err) => {
				error_log!("Invalid selector '{}': {}", selector, describe_js_error(&err));
				return Vec::new();
			}
		};
		(0..list.length())
			.filter_map(|index| list.item(index))
			.filter_map(|node| node.dyn_into::<Element>().ok())
			.collect()
	}

	fn set_read_only(&self, element: &Element, read_only: bool) {
		if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
			input.set_read_only(read_only);
		}
	}

	fn inner_text(&self, element: &Element) -> String {
		match element.dyn_ref::<HtmlElement>() {
			Some(html) => html.inner_text(),
			None => element.text_content().unwrap_or_default(),
		}
	}

	fn set_text_content(&self, element: &Element, text: &str) {
		element.set_text_content(Some(text));
	}

	fn set_inner_html(&self, element: &Element, html: &str) {
		element.set_inner_html(html);
	}

	fn create_element(&self, tag: &str) -> Result<Element> {
		self.document.create_element(tag).map_err(dom_error)
	}

	fn prepend(&self, parent: &Element, child: &Element) -> Result<()> {
		parent.prepend_with_node_1(child).map_err(dom_error)
	}

	fn append(&self, parent: &Element, child: &Element) -> Result<()> {
		parent.append_child(child).map(|_| ()).map_err(dom_error)
	}

	fn remove(&self, element: &Element) {
		element.remove();
	}

	fn collect_payload(&self, form: &Element) -> Result<FormData> {
		let form = form
			.dyn_ref::<HtmlFormElement>()
			.ok_or_else(|| FormRelayError::NotAForm(self.tag_name(form)))?;
		FormData::new_with_form(form).map_err(dom_error)
	}

	fn meta_content(&self, name: &str) -> Option<String> {
		let query = Query::TagWithAttribute {
			tag: "meta",
			name: "name",
			value: name,
		};
		self.document
			.query_selector(&query.to_selector())
			.ok()
			.flatten()
			.and_then(|meta| meta.get_attribute("content"))
	}

	fn cookie(&self) -> Option<String> {
		self.document
			.dyn_ref::<HtmlDocument>()
			.and_then(|document| document.cookie().ok())
			.filter(|cookie| !cookie.is_empty())
	}

	fn navigate(&self, url: &str) -> Result<()> {
		debug_log!("Navigating to {}", url);
		let window = web_sys::window().ok_or_else(|| FormRelayError::dom("no window available"))?;
		window.location().set_href(url).map_err(dom_error)
	}

	fn on_input(&self, element: &Element, handler: Box<dyn Fn()>) -> Result<()> {
		let closure = Closure::wrap(Box::new(move |_event: Event| {
			handler();
		}) as Box<dyn FnMut(_)>);

		element
			.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())
			.map_err(dom_error)?;

		closure.forget(); // Lives as long as the element
		Ok(())
	}
}
