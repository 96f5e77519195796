//! # formrelay-core
//!
//! The submit lifecycle of formrelay, independent of any rendering substrate.
//!
//! A qualifying form (any `<form>` not carrying the ignore class) is submitted
//! in the background instead of navigating the page. The server's answer is
//! rendered back into the form:
//!
//! | Response | Effect |
//! |----------|--------|
//! | 200 with `redirect` | navigate the page |
//! | 200 otherwise | success alert with `message` |
//! | 422 with `errors` | mark fields invalid, list their messages |
//! | other 4xx | warning alert with `message` |
//! | anything else | danger alert `"{status} - {statusText}"` |
//!
//! The controller talks to the page through the [`Dom`] trait and to the
//! network through the [`Transport`] trait. `formrelay-web` implements both on
//! top of `web-sys`; [`testing`] provides in-memory implementations.
//!
//! ## Features
//!
//! - `debug-log`: enables [`debug_log!`] output in debug builds

#![warn(missing_docs)]

pub mod config;
pub mod contract;
pub mod controller;
pub mod csrf;
pub mod dom;
pub mod error;
pub mod interpret;
pub mod lifecycle;
pub mod logging;
pub mod render;
pub mod testing;
pub mod transport;

pub use config::{BindingMode, CsrfConfig, FormRelayConfig};
pub use contract::{AlertKind, ErrorBag};
pub use controller::{FormController, SubmitOutcome};
pub use dom::{Dom, Query};
pub use error::{FormRelayError, Result};
pub use interpret::{Verdict, interpret};
pub use lifecycle::{InFlight, SubmissionState};
pub use transport::{SubmitRequest, Transport, TransportError, TransportResponse};

#[cfg(target_arch = "wasm32")]
#[doc(hidden)]
pub mod __private {
	pub use web_sys;
}
