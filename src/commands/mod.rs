//! CLI command implementations
//!
//! `submit` drives a running console the way the browser does: it fills a
//! [`Console`](flashweb_core::Console) form, posts it through
//! [`HttpTransport`](flashweb_client::HttpTransport) and prints the resulting
//! notification.

pub mod fields;
pub mod submit;
