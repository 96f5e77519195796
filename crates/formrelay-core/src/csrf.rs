//! CSRF token discovery
//!
//! Tokens are looked up in the order a Laravel page provides them:
//! 1. **Hidden input**: `<input type="hidden" name="_token">` inside the form
//! 2. **Meta tag**: `<meta name="csrf-token" content="...">` in the document
//! 3. **Cookie**: the `XSRF-TOKEN` cookie, URL-decoded
//!
//! The first two are sent as `X-CSRF-TOKEN`; the cookie value is sent as
//! `X-XSRF-TOKEN`, which is the header the backend expects for it.

use crate::config::CsrfConfig;
use crate::dom::{Dom, Query, query_first};

/// Where a token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
	/// Hidden input inside the form.
	FormInput,
	/// `<meta>` tag in the document.
	Meta,
	/// Document cookie.
	Cookie,
}

/// A discovered token together with the header it must be sent in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken {
	/// Token value.
	pub value: String,
	/// Where the token came from.
	pub source: TokenSource,
}

impl CsrfToken {
	/// Header name and value for this token.
	pub fn header(&self, config: &CsrfConfig) -> (String, String) {
		let name = match self.source {
			TokenSource::FormInput | TokenSource::Meta => &config.header_name,
			TokenSource::Cookie => &config.cookie_header_name,
		};
		(name.clone(), self.value.clone())
	}
}

/// Finds the CSRF token for a form.
///
/// Returns `None` if no source provides one.
pub fn find_token<D: Dom>(dom: &D, config: &CsrfConfig, form: &D::Element) -> Option<CsrfToken> {
	if let Some(value) = token_from_input(dom, config, form) {
		return Some(CsrfToken {
			value,
			source: TokenSource::FormInput,
		});
	}

	if let Some(value) = dom.meta_content(&config.meta_name) {
		return Some(CsrfToken {
			value,
			source: TokenSource::Meta,
		});
	}

	dom.cookie()
		.and_then(|cookies| parse_cookie_value(&cookies, &config.cookie_name))
		.map(|raw| CsrfToken {
			value: urlencoding::decode(&raw)
				.map(|decoded| decoded.into_owned())
				.unwrap_or(raw),
			source: TokenSource::Cookie,
		})
}

fn token_from_input<D: Dom>(dom: &D, config: &CsrfConfig, form: &D::Element) -> Option<String> {
	let query = Query::TagWithAttribute {
		tag: "input",
		name: "name",
		value: &config.field_name,
	};
	let input = query_first(dom, form, &query)?;
	dom.attribute(&input, "value")
}

/// Raw value of cookie `name` in a `document.cookie` string, still encoded.
pub fn parse_cookie_value(cookies: &str, name: &str) -> Option<String> {
	cookies
		.split(';')
		.filter_map(|pair| pair.split_once('='))
		.find(|(key, _)| key.trim() == name)
		.map(|(_, value)| value.trim().to_string())
}
