//! Substrate-independent submit lifecycle
//!
//! This module provides access to formrelay-core: configuration, the
//! [`FormController`](formrelay_core::FormController), response
//! interpretation, feedback rendering and the in-memory test substrate.

pub use formrelay_core::*;
