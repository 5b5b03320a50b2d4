//! Owned application state of one console
//!
//! A [`Console`] bundles the form and the notification log so front-ends
//! pass one value around instead of sharing page-global state. It is only
//! mutated from the UI context; submissions hand back outcomes which are
//! then applied here.

use crate::action::Action;
use crate::form::{FormModel, OperationRequest};
use crate::notify::{self, NotificationId, NotificationLog};
use crate::result::OperationResult;
use crate::visibility::{self, FieldId};
use std::collections::BTreeSet;

/// Form plus notification log
#[derive(Debug, Default)]
pub struct Console {
    /// Current form values
    pub form: FormModel,
    /// Rendered outcomes, newest first
    pub log: NotificationLog,
}

impl Console {
    /// Create a console with an empty form and log
    pub fn new() -> Self {
        Self::default()
    }

    /// Optional fields relevant for the selected action
    pub fn visible_fields(&self) -> BTreeSet<FieldId> {
        visibility::visible_fields(self.form.selected_action())
    }

    /// Snapshot the form for one submission
    ///
    /// The form stays untouched and usable while the request is in flight.
    /// The returned action is what the outcome will be rendered under, even
    /// if the user switches action before the response arrives.
    pub fn begin_submit(&self) -> (Action, OperationRequest) {
        let request = self.form.snapshot();
        (request.action, request)
    }

    /// Render a success into the log
    pub fn apply_success(
        &mut self,
        action: Action,
        message: &str,
        artifact_url: Option<&str>,
    ) -> NotificationId {
        log::info!("{} succeeded", action);
        self.log
            .push(notify::render_success(action, message, artifact_url))
    }

    /// Render a failure into the log
    pub fn apply_failure(
        &mut self,
        action: Action,
        status_code: u16,
        body: &str,
    ) -> NotificationId {
        log::warn!("{} failed with status {}", action, status_code);
        self.log
            .push(notify::render_failure(action, status_code, body))
    }

    /// Render whichever branch the outcome took
    pub fn apply(&mut self, action: Action, result: OperationResult) -> NotificationId {
        match result {
            OperationResult::Success {
                message,
                artifact_url,
            } => self.apply_success(action, &message, artifact_url.as_deref()),
            OperationResult::Failure {
                status_code,
                message,
            } => self.apply_failure(action, status_code, &message),
        }
    }

    /// Remove one notification
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        self.log.dismiss(id)
    }
}
