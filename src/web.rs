//! Browser binding
//!
//! This module provides access to formrelay-web: the `web-sys` DOM, the
//! `fetch` transport and the page installer.
//!
//! ## Example
//!
//! ```rust,ignore
//! use formrelay::prelude::*;
//!
//! let config = FormRelayConfig::default().with_ignore_class("no-ajax");
//! install(config)?;
//! ```

pub use formrelay_web::*;
