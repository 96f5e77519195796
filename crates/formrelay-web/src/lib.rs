//! # formrelay-web
//!
//! Browser binding for [`formrelay_core`]: [`WebDom`] implements the DOM
//! trait on `web-sys`, [`FetchTransport`] sends submissions with `fetch`, and
//! [`install`] wires both to the page's `submit` events.
//!
//! ## JavaScript entry points
//!
//! ```js
//! import init, { start, installWithConfig } from "./formrelay_web.js";
//!
//! await init();
//! start();                                         // reads #formrelay-config
//! // or
//! installWithConfig('{"ignore_class": "no-ajax"}');
//! ```
//!
//! With the `autostart` feature, `start` runs as soon as the module loads.
//!
//! Outside `wasm32` only the configuration helpers are functional; the
//! installers return [`FormRelayError::Unsupported`].
//!
//! [`FormRelayError::Unsupported`]: formrelay_core::FormRelayError::Unsupported

#![warn(missing_docs)]

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod launcher;
#[cfg(target_arch = "wasm32")]
pub mod transport;

#[cfg(target_arch = "wasm32")]
pub use dom::WebDom;
pub use launcher::{
	CONFIG_ELEMENT_ID, install, install_with_config, load_page_config, parse_page_config, start,
};
#[cfg(target_arch = "wasm32")]
pub use launcher::bind;
#[cfg(target_arch = "wasm32")]
pub use transport::FetchTransport;
