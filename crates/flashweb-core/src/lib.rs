//! flashweb-core - Model layer for the flashweb console
//!
//! This crate holds everything the console needs that does not touch the
//! network or a display: the operation form, which of its fields are
//! relevant for the selected action, the result model decoded from the
//! relay, and the notification log that outcomes are rendered into.
//!
//! Front-ends (the egui web app, the `flashweb submit` command) own a
//! [`Console`] and feed it outcomes produced by `flashweb-client`.
//!
//! # Example
//!
//! ```
//! use flashweb_core::{Action, Console, FieldId, OperationResult};
//!
//! let mut console = Console::new();
//! console.form.set_programmer("dummy:emulate=M25P10.RES");
//! console.form.set_action(Action::Read);
//! assert!(!console.visible_fields().contains(&FieldId::File));
//!
//! let (action, request) = console.begin_submit();
//! assert_eq!(request.action, Action::Read);
//!
//! console.apply(
//!     action,
//!     OperationResult::Success {
//!         message: "Read 1MB".into(),
//!         artifact_url: Some("/outputs/dump.bin".into()),
//!     },
//! );
//! assert_eq!(console.log.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod action;
pub mod console;
pub mod error;
pub mod form;
pub mod notify;
pub mod result;
pub mod visibility;

pub use action::Action;
pub use console::Console;
pub use error::{Error, Result};
pub use form::{FileUpload, Flags, FormModel, OperationRequest, Part, PartValue, TransportPayload};
pub use notify::{
    render_failure, render_success, title_case, Notification, NotificationId, NotificationKind,
    NotificationLog,
};
pub use result::{ExecResponse, OperationResult};
pub use visibility::{visible_fields, FieldId, FieldSpec, OPTIONAL_FIELDS};
