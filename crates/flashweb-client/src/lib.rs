//! flashweb-client - Submission client for the flashweb relay
//!
//! Turns one [`OperationRequest`](flashweb_core::OperationRequest) into exactly
//! one multipart request and resolves to exactly one of the two
//! [`OperationResult`](flashweb_core::OperationResult) branches.
//!
//! The network sits behind the [`Transport`] trait so the console can be
//! exercised against an in-memory transport in tests. [`HttpTransport`]
//! is the reqwest implementation used by the CLI and, compiled for
//! `wasm32`, by the browser front-end.
//!
//! # Example
//!
//! ```no_run
//! use flashweb_client::{submit, HttpTransport};
//! use flashweb_core::{Action, Console};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new("http://127.0.0.1:8080/")?;
//! let mut console = Console::new();
//! console.form.set_programmer("dummy:emulate=M25P10.RES");
//! console.form.set_action(Action::Probe);
//!
//! let (action, request) = console.begin_submit();
//! let outcome = submit(&transport, &request).await;
//! console.apply(action, outcome);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// The transport futures are !Send on wasm32, so no Send bound is wanted
#![allow(async_fn_in_trait)]

mod error;
mod http;
mod submit;
mod transport;

pub use error::{Result, TransportError};
pub use http::{HttpTransport, API_PATH};
pub use submit::submit;
pub use transport::{RawResponse, Transport};
