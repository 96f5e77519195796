//! Response bodies understood by the controller.
//!
//! These mirror what a Laravel-style backend returns for AJAX form posts:
//!
//! | Status | Body |
//! |--------|------|
//! | 200 | `{"redirect": "/next", "message": "Saved"}` (both optional) |
//! | 422 | `{"errors": {"email": ["The email field is required."]}}` |
//! | other 4xx | `{"message": "Forbidden"}` |

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Field name to list of messages, in the order the server sent the fields.
pub type ErrorBag = IndexMap<String, Vec<String>>;

/// Body of a 200 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessPayload {
	/// Page to navigate to.
	#[serde(default)]
	pub redirect: Option<String>,
	/// Message shown in a success alert when there is no redirect.
	#[serde(default)]
	pub message: Option<String>,
}

/// Body of a 422 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ValidationPayload {
	/// Per-field messages. A single string is accepted as a one-item list.
	#[serde(default, deserialize_with = "deserialize_error_bag")]
	pub errors: Option<ErrorBag>,
}

/// Body of any other 4xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientErrorPayload {
	/// Message shown in a warning alert.
	#[serde(default)]
	pub message: Option<String>,
}

fn deserialize_error_bag<'de, D>(deserializer: D) -> Result<Option<ErrorBag>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Messages {
		Many(Vec<String>),
		One(String),
	}

	let raw: Option<IndexMap<String, Messages>> = Option::deserialize(deserializer)?;
	Ok(raw.map(|fields| {
		fields
			.into_iter()
			.map(|(name, messages)| {
				let messages = match messages {
					Messages::Many(list) => list,
					Messages::One(message) => vec![message],
				};
				(name, messages)
			})
			.collect()
	}))
}

/// Visual style of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
	/// `alert-success`
	Success,
	/// `alert-warning`
	Warning,
	/// `alert-danger`
	Danger,
}

impl AlertKind {
	/// Suffix used in the `alert-*` class.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Success => "success",
			Self::Warning => "warning",
			Self::Danger => "danger",
		}
	}

	/// Full class attribute of an alert of this kind.
	pub fn class_name(self) -> String {
		format!("alert alert-{}", self.as_str())
	}
}

impl std::fmt::Display for AlertKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
