//! DOM abstraction layer
//!
//! The submit lifecycle only needs a narrow slice of the DOM: attribute and
//! class access, a handful of subtree queries, content replacement, and an
//! `input` event hook. [`Dom`] captures that slice so the controller runs
//! unchanged against `web-sys` in the browser and against
//! [`MemoryDom`](crate::testing::MemoryDom) in native tests.

use crate::error::Result;

/// Subtree queries issued by the controller.
///
/// Each query has a CSS selector equivalent (see [`Query::to_selector`]) that
/// browser backends pass to `querySelectorAll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
	/// Every element with the given tag name.
	Tag(&'a str),
	/// Elements with the given tag whose attribute equals a value.
	TagWithAttribute {
		/// Tag name
		tag: &'a str,
		/// Attribute name
		name: &'a str,
		/// Expected attribute value
		value: &'a str,
	},
	/// Elements carrying a class.
	Class(&'a str),
	/// Elements carrying an attribute, whatever its value.
	HasAttribute(&'a str),
}

impl Query<'_> {
	/// Renders the query as a CSS selector.
	///
	/// Attribute values are always quoted, so field names such as `items[]`
	/// produce a valid selector.
	pub fn to_selector(&self) -> String {
		match self {
			Self::Tag(tag) => (*tag).to_string(),
			Self::TagWithAttribute { tag, name, value } => {
				format!("{}[{}=\"{}\"]", tag, name, escape_selector_value(value))
			}
			Self::Class(class) => format!(".{}", class),
			Self::HasAttribute(name) => format!("[{}]", name),
		}
	}
}

fn escape_selector_value(value: &str) -> String {
	value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// The rendering substrate the controller drives.
///
/// Implementations are cheap handles (`Clone`) onto a shared document; the
/// `input` handlers registered through [`Dom::on_input`] capture a clone.
pub trait Dom: Clone + 'static {
	/// Handle to an element of the document.
	type Element: Clone + PartialEq + std::fmt::Debug + 'static;

	/// Field data collected from a form, ready to be sent as a request body.
	type Payload;

	/// Returns an attribute value.
	fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

	/// Sets an attribute value.
	fn set_attribute(&self, element: &Self::Element, name: &str, value: &str) -> Result<()>;

	/// Removes an attribute.
	fn remove_attribute(&self, element: &Self::Element, name: &str) -> Result<()>;

	/// Returns whether the element's class list contains `class`.
	fn has_class(&self, element: &Self::Element, class: &str) -> bool;

	/// Adds a class. Adding a present class is a no-op.
	fn add_class(&self, element: &Self::Element, class: &str) -> Result<()>;

	/// Removes a class. Removing an absent class is a no-op.
	fn remove_class(&self, element: &Self::Element, class: &str) -> Result<()>;

	/// Lowercase tag name.
	fn tag_name(&self, element: &Self::Element) -> String;

	/// Parent element, if any.
	fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

	/// Descendants of `root` matching `query`, in document order.
	fn query_all(&self, root: &Self::Element, query: &Query<'_>) -> Vec<Self::Element>;

	/// Toggles the read-only state of an input.
	fn set_read_only(&self, element: &Self::Element, read_only: bool);

	/// Rendered text of an element.
	fn inner_text(&self, element: &Self::Element) -> String;

	/// Replaces the element's children with a text node.
	fn set_text_content(&self, element: &Self::Element, text: &str);

	/// Replaces the element's children with parsed markup.
	fn set_inner_html(&self, element: &Self::Element, html: &str);

	/// Creates a detached element.
	fn create_element(&self, tag: &str) -> Result<Self::Element>;

	/// Inserts `child` as the first child of `parent`.
	fn prepend(&self, parent: &Self::Element, child: &Self::Element) -> Result<()>;

	/// Inserts `child` as the last child of `parent`.
	fn append(&self, parent: &Self::Element, child: &Self::Element) -> Result<()>;

	/// Detaches an element from the document.
	fn remove(&self, element: &Self::Element);

	/// Collects the current field values of a form.
	fn collect_payload(&self, form: &Self::Element) -> Result<Self::Payload>;

	/// Content of `<meta name="{name}">` in the document.
	fn meta_content(&self, name: &str) -> Option<String>;

	/// The document cookie string.
	fn cookie(&self) -> Option<String>;

	/// Navigates the whole page.
	fn navigate(&self, url: &str) -> Result<()>;

	/// Runs `handler` every time the element receives an `input` event.
	fn on_input(&self, element: &Self::Element, handler: Box<dyn Fn()>) -> Result<()>;
}

/// Returns the element itself or its nearest ancestor with the given tag.
pub fn closest<D: Dom>(dom: &D, element: &D::Element, tag: &str) -> Option<D::Element> {
	let mut current = Some(element.clone());
	while let Some(node) = current {
		if dom.tag_name(&node) == tag {
			return Some(node);
		}
		current = dom.parent(&node);
	}
	None
}

/// First descendant of `root` matching `query`.
pub fn query_first<D: Dom>(dom: &D, root: &D::Element, query: &Query<'_>) -> Option<D::Element> {
	dom.query_all(root, query).into_iter().next()
}
