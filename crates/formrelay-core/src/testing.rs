//! In-memory substrate for exercising the controller natively.
//!
//! [`MemoryDom`] is a small element tree implementing [`Dom`]; it understands
//! exactly the queries the controller issues and records navigations.
//! [`MockTransport`] replays queued responses and records every request.
//!
//! ```
//! use formrelay_core::dom::Dom;
//! use formrelay_core::testing::MemoryDom;
//!
//! let dom = MemoryDom::new();
//! let form = dom.append_new(&dom.body(), "form", &[("action", "/signup")]);
//! let email = dom.append_new(&form, "input", &[("type", "text"), ("name", "email")]);
//! dom.set_value(&email, "ada@example.com");
//!
//! assert_eq!(dom.attribute(&form, "action").as_deref(), Some("/signup"));
//! assert_eq!(dom.find_input(&form, "email"), Some(email));
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;

use crate::dom::{Dom, Query};
use crate::error::{FormRelayError, Result};
use crate::render::ALERT_MARKER;
use crate::transport::{SubmitRequest, Transport, TransportError, TransportResponse};

/// Handle to an element of a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(usize);

#[derive(Debug, Default)]
struct Node {
	tag: String,
	attributes: BTreeMap<String, String>,
	classes: Vec<String>,
	parent: Option<NodeRef>,
	children: Vec<NodeRef>,
	// Serialized content set through set_text_content / set_inner_html
	content: String,
	value: String,
	read_only: bool,
}

#[derive(Default)]
struct Tree {
	nodes: Vec<Node>,
	listeners: HashMap<NodeRef, Vec<Rc<dyn Fn()>>>,
	cookie: Option<String>,
	navigations: Vec<String>,
}

impl Tree {
	fn node(&self, node: NodeRef) -> &Node {
		&self.nodes[node.0]
	}

	fn node_mut(&mut self, node: NodeRef) -> &mut Node {
		&mut self.nodes[node.0]
	}

	fn insert(&mut self, tag: &str) -> NodeRef {
		let node = NodeRef(self.nodes.len());
		self.nodes.push(Node {
			tag: tag.to_ascii_lowercase(),
			..Node::default()
		});
		node
	}

	fn detach(&mut self, node: NodeRef) {
		if let Some(parent) = self.node_mut(node).parent.take() {
			self.node_mut(parent).children.retain(|child| *child != node);
		}
	}

	fn attach(&mut self, parent: NodeRef, child: NodeRef, index: Option<usize>) {
		self.detach(child);
		self.node_mut(child).parent = Some(parent);
		let children = &mut self.node_mut(parent).children;
		match index {
			Some(index) => children.insert(index, child),
			None => children.push(child),
		}
	}

	fn clear_children(&mut self, node: NodeRef) {
		for child in std::mem::take(&mut self.node_mut(node).children) {
			self.node_mut(child).parent = None;
		}
	}

	fn descendants(&self, root: NodeRef, out: &mut Vec<NodeRef>) {
		for child in &self.node(root).children {
			out.push(*child);
			self.descendants(*child, out);
		}
	}

	fn attribute(&self, node: NodeRef, name: &str) -> Option<String> {
		let node = self.node(node);
		if name == "class" {
			return (!node.classes.is_empty()).then(|| node.classes.join(" "));
		}
		node.attributes.get(name).cloned()
	}

	fn matches(&self, node: NodeRef, query: &Query<'_>) -> bool {
		let element = self.node(node);
		match query {
			Query::Tag(tag) => element.tag == *tag,
			Query::TagWithAttribute { tag, name, value } => {
				element.tag == *tag && self.attribute(node, name).as_deref() == Some(*value)
			}
			Query::Class(class) => element.classes.iter().any(|c| c == class),
			Query::HasAttribute(name) => self.attribute(node, name).is_some(),
		}
	}
}

/// An in-memory document: `<html><head/><body/></html>`.
#[derive(Clone)]
pub struct MemoryDom {
	tree: Rc<RefCell<Tree>>,
	head: NodeRef,
	body: NodeRef,
}

impl std::fmt::Debug for MemoryDom {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryDom")
			.field("nodes", &self.tree.borrow().nodes.len())
			.finish()
	}
}

impl Default for MemoryDom {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryDom {
	/// Creates an empty document.
	pub fn new() -> Self {
		let mut tree = Tree::default();
		let html = tree.insert("html");
		let head = tree.insert("head");
		let body = tree.insert("body");
		tree.attach(html, head, None);
		tree.attach(html, body, None);
		Self {
			tree: Rc::new(RefCell::new(tree)),
			head,
			body,
		}
	}

	/// The `<html>` element.
	pub fn document_element(&self) -> NodeRef {
		NodeRef(0)
	}

	/// The `<head>` element.
	pub fn head(&self) -> NodeRef {
		self.head
	}

	/// The `<body>` element.
	pub fn body(&self) -> NodeRef {
		self.body
	}

	/// Creates an element with attributes and appends it to `parent`.
	///
	/// A `value` attribute also initializes the element's current value.
	pub fn append_new(&self, parent: &NodeRef, tag: &str, attributes: &[(&str, &str)]) -> NodeRef {
		let mut tree = self.tree.borrow_mut();
		let node = tree.insert(tag);
		for (name, value) in attributes {
			let element = tree.node_mut(node);
			match *name {
				"class" => element.classes = value.split_whitespace().map(String::from).collect(),
				"value" => {
					element.value = (*value).to_string();
					element.attributes.insert((*name).to_string(), (*value).to_string());
				}
				_ => {
					element.attributes.insert((*name).to_string(), (*value).to_string());
				}
			}
		}
		tree.attach(*parent, node, None);
		node
	}

	/// Child elements in order.
	pub fn children(&self, element: &NodeRef) -> Vec<NodeRef> {
		self.tree.borrow().node(*element).children.clone()
	}

	/// The serialized content last written through `set_inner_html` or
	/// `set_text_content`.
	pub fn inner_html(&self, element: &NodeRef) -> String {
		self.tree.borrow().node(*element).content.clone()
	}

	/// Every `input` below `root`.
	pub fn inputs(&self, root: &NodeRef) -> Vec<NodeRef> {
		self.query_all(root, &Query::Tag("input"))
	}

	/// The first `input` below `root` with the given name.
	pub fn find_input(&self, root: &NodeRef, name: &str) -> Option<NodeRef> {
		let query = Query::TagWithAttribute {
			tag: "input",
			name: "name",
			value: name,
		};
		self.query_all(root, &query).into_iter().next()
	}

	/// Alerts inserted by formrelay into `form`, top first.
	pub fn alerts(&self, form: &NodeRef) -> Vec<NodeRef> {
		self.query_all(form, &Query::HasAttribute(ALERT_MARKER))
	}

	/// Current read-only state.
	pub fn is_read_only(&self, element: &NodeRef) -> bool {
		self.tree.borrow().node(*element).read_only
	}

	/// Current value of a form control.
	pub fn value(&self, element: &NodeRef) -> String {
		self.tree.borrow().node(*element).value.clone()
	}

	/// Sets a form control's value without dispatching events.
	pub fn set_value(&self, element: &NodeRef, value: &str) {
		self.tree.borrow_mut().node_mut(*element).value = value.to_string();
	}

	/// Sets a value and dispatches `input`, as a user edit would.
	pub fn type_into(&self, element: &NodeRef, value: &str) {
		self.set_value(element, value);
		self.dispatch_input(element);
	}

	/// Runs the `input` listeners of an element.
	pub fn dispatch_input(&self, element: &NodeRef) {
		let handlers = self
			.tree
			.borrow()
			.listeners
			.get(element)
			.cloned()
			.unwrap_or_default();
		for handler in handlers {
			handler();
		}
	}

	/// Number of `input` listeners registered on an element.
	pub fn input_listener_count(&self, element: &NodeRef) -> usize {
		self.tree
			.borrow()
			.listeners
			.get(element)
			.map_or(0, Vec::len)
	}

	/// Sets the document cookie string.
	pub fn set_cookie(&self, cookie: &str) {
		self.tree.borrow_mut().cookie = Some(cookie.to_string());
	}

	/// URLs passed to `navigate`, in order.
	pub fn navigations(&self) -> Vec<String> {
		self.tree.borrow().navigations.clone()
	}
}

/// Field data collected by [`MemoryDom`]: name/value pairs in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionPayload(pub Vec<(String, String)>);

impl SubmissionPayload {
	/// First value submitted under `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}
}

impl Dom for MemoryDom {
	type Element = NodeRef;
	type Payload = SubmissionPayload;

	fn attribute(&self, element: &NodeRef, name: &str) -> Option<String> {
		self.tree.borrow().attribute(*element, name)
	}

	fn set_attribute(&self, element: &NodeRef, name: &str, value: &str) -> Result<()> {
		let mut tree = self.tree.borrow_mut();
		let node = tree.node_mut(*element);
		if name == "class" {
			node.classes = value.split_whitespace().map(String::from).collect();
		} else {
			node.attributes.insert(name.to_string(), value.to_string());
		}
		Ok(())
	}

	fn remove_attribute(&self, element: &NodeRef, name: &str) -> Result<()> {
		let mut tree = self.tree.borrow_mut();
		let node = tree.node_mut(*element);
		if name == "class" {
			node.classes.clear();
		} else {
			node.attributes.remove(name);
		}
		Ok(())
	}

	fn has_class(&self, element: &NodeRef, class: &str) -> bool {
		self.tree
			.borrow()
			.node(*element)
			.classes
			.iter()
			.any(|c| c == class)
	}

	fn add_class(&self, element: &NodeRef, class: &str) -> Result<()> {
		let mut tree = self.tree.borrow_mut();
		let classes = &mut tree.node_mut(*element).classes;
		if !classes.iter().any(|c| c == class) {
			classes.push(class.to_string());
		}
		Ok(())
	}

	fn remove_class(&self, element: &NodeRef, class: &str) -> Result<()> {
		self.tree
			.borrow_mut()
			.node_mut(*element)
			.classes
			.retain(|c| c != class);
		Ok(())
	}

	fn tag_name(&self, element: &NodeRef) -> String {
		self.tree.borrow().node(*element).tag.clone()
	}

	fn parent(&self, element: &NodeRef) -> Option<NodeRef> {
		self.tree.borrow().node(*element).parent
	}

	fn query_all(&self, root: &NodeRef, query: &Query<'_>) -> Vec<NodeRef> {
		let tree = self.tree.borrow();
		let mut all = Vec::new();
		tree.descendants(*root, &mut all);
		all.into_iter()
			.filter(|node| tree.matches(*node, query))
			.collect()
	}

	fn set_read_only(&self, element: &NodeRef, read_only: bool) {
		self.tree.borrow_mut().node_mut(*element).read_only = read_only;
	}

	fn inner_text(&self, element: &NodeRef) -> String {
		self.inner_html(element)
	}

	fn set_text_content(&self, element: &NodeRef, text: &str) {
		let mut tree = self.tree.borrow_mut();
		tree.clear_children(*element);
		tree.node_mut(*element).content = text.to_string();
	}

	fn set_inner_html(&self, element: &NodeRef, html: &str) {
		let mut tree = self.tree.borrow_mut();
		tree.clear_children(*element);
		tree.node_mut(*element).content = html.to_string();
	}

	fn create_element(&self, tag: &str) -> Result<NodeRef> {
		Ok(self.tree.borrow_mut().insert(tag))
	}

	fn prepend(&self, parent: &NodeRef, child: &NodeRef) -> Result<()> {
		self.tree.borrow_mut().attach(*parent, *child, Some(0));
		Ok(())
	}

	fn append(&self, parent: &NodeRef, child: &NodeRef) -> Result<()> {
		self.tree.borrow_mut().attach(*parent, *child, None);
		Ok(())
	}

	fn remove(&self, element: &NodeRef) {
		self.tree.borrow_mut().detach(*element);
	}

	fn collect_payload(&self, form: &NodeRef) -> Result<SubmissionPayload> {
		let tag = self.tag_name(form);
		if tag != "form" {
			return Err(FormRelayError::NotAForm(tag));
		}
		let tree = self.tree.borrow();
		let mut all = Vec::new();
		tree.descendants(*form, &mut all);
		let fields = all
			.into_iter()
			.filter(|node| matches!(tree.node(*node).tag.as_str(), "input" | "select" | "textarea"))
			.filter_map(|node| {
				let name = tree.attribute(node, "name")?;
				Some((name, tree.node(node).value.clone()))
			})
			.collect();
		Ok(SubmissionPayload(fields))
	}

	fn meta_content(&self, name: &str) -> Option<String> {
		let query = Query::TagWithAttribute {
			tag: "meta",
			name: "name",
			value: name,
		};
		let meta = self
			.query_all(&self.document_element(), &query)
			.into_iter()
			.next()?;
		self.attribute(&meta, "content")
	}

	fn cookie(&self) -> Option<String> {
		self.tree.borrow().cookie.clone()
	}

	fn navigate(&self, url: &str) -> Result<()> {
		self.tree.borrow_mut().navigations.push(url.to_string());
		Ok(())
	}

	fn on_input(&self, element: &NodeRef, handler: Box<dyn Fn()>) -> Result<()> {
		self.tree
			.borrow_mut()
			.listeners
			.entry(*element)
			.or_default()
			.push(Rc::from(handler));
		Ok(())
	}
}

/// A transport replaying queued responses.
///
/// Cloning shares the queue and the request log. When the queue is empty,
/// `send` fails with a network error.
#[derive(Clone, Default)]
pub struct MockTransport {
	responses: Rc<RefCell<VecDeque<std::result::Result<TransportResponse, TransportError>>>>,
	requests: Rc<RefCell<Vec<SubmitRequest<SubmissionPayload>>>>,
}

impl MockTransport {
	/// Creates a transport with an empty queue.
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues a response.
	pub fn respond(&self, response: TransportResponse) {
		self.responses.borrow_mut().push_back(Ok(response));
	}

	/// Queues a JSON response.
	pub fn respond_json(&self, status: u16, status_text: &str, body: serde_json::Value) {
		self.respond(TransportResponse::json(status, status_text, &body));
	}

	/// Queues a network failure.
	pub fn fail(&self, message: &str) {
		self.responses
			.borrow_mut()
			.push_back(Err(TransportError::new(message)));
	}

	/// Requests sent so far.
	pub fn requests(&self) -> Vec<SubmitRequest<SubmissionPayload>> {
		self.requests.borrow().clone()
	}
}

#[async_trait(?Send)]
impl Transport<SubmissionPayload> for MockTransport {
	async fn send(
		&self,
		request: SubmitRequest<SubmissionPayload>,
	) -> std::result::Result<TransportResponse, TransportError> {
		self.requests.borrow_mut().push(request);
		self.responses
			.borrow_mut()
			.pop_front()
			.unwrap_or_else(|| Err(TransportError::new("no response queued")))
	}
}
