//! # formrelay
//!
//! Background submission for server-rendered forms, compiled to WebAssembly.
//!
//! Every `<form>` on the page that does not carry the ignore class
//! (`form-ignore`) is sent with `fetch` instead of navigating. While the
//! request is in flight the inputs are read-only and the submit button shows a
//! spinner. The JSON answer of a Laravel-style backend is rendered back into
//! the form with Bootstrap markup:
//!
//! - `200 {"redirect": ...}` navigates, `200 {"message": ...}` shows a success alert
//! - `422 {"errors": {field: [messages]}}` marks fields `is-invalid` with an
//!   `invalid-feedback` list, cleared as soon as the field is edited
//! - other 4xx show a warning alert with `message`
//! - anything else, network failures included, shows a danger alert
//!   `"{status} - {statusText}"`
//!
//! ## Feature Flags
//!
//! - `web` (default) - Browser binding ([`web`])
//! - `autostart` - Install on module load, reading
//!   `<script type="application/json" id="formrelay-config">`
//! - `console_error_panic_hook` - Readable panics in the browser console
//! - `debug-log` - `debug_log!` output in debug builds
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use formrelay::prelude::*;
//!
//! #[wasm_bindgen(start)]
//! pub fn main() -> Result<(), JsValue> {
//!     install(FormRelayConfig::default().with_binding(BindingMode::Direct))
//!         .map_err(|err| JsValue::from_str(&err.to_string()))
//! }
//! ```

pub mod core;
#[cfg(feature = "web")]
pub mod web;

pub use formrelay_core::{
	AlertKind, BindingMode, CsrfConfig, Dom, ErrorBag, FormController, FormRelayConfig,
	FormRelayError, Result, SubmitOutcome, SubmitRequest, Transport, TransportError,
	TransportResponse, Verdict,
};
#[cfg(feature = "web")]
pub use formrelay_web::{install, install_with_config, start};

/// Re-exports of the most used items.
pub mod prelude {
	pub use crate::{
		BindingMode, CsrfConfig, FormController, FormRelayConfig, FormRelayError, SubmitOutcome,
		Verdict,
	};

	#[cfg(feature = "web")]
	pub use crate::install;
	#[cfg(all(feature = "web", target_arch = "wasm32"))]
	pub use formrelay_web::{FetchTransport, WebDom};
}
