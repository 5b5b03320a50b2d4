//! Notifications rendered from operation outcomes
//!
//! Rendering is a pure function of its input: the same result rendered twice
//! gives two equal, independent notifications. The [`NotificationLog`] keeps
//! them newest first and lets each one be dismissed on its own.

use crate::action::Action;
use crate::result::OperationResult;
use std::collections::VecDeque;
use std::fmt::Write as _;

/// Styling of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Operation succeeded
    Success,
    /// Operation failed
    Failure,
}

impl NotificationKind {
    fn css_class(self) -> &'static str {
        match self {
            Self::Success => "notification success",
            Self::Failure => "notification failure",
        }
    }
}

/// Handle identifying a notification inside a [`NotificationLog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

impl NotificationId {
    /// Numeric value, used for `data-dismiss` attributes and widget ids
    pub fn get(self) -> u64 {
        self.0
    }
}

/// View model of one rendered outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Success or failure styling
    pub kind: NotificationKind,
    /// Title-cased action name
    pub title: String,
    /// HTTP status, only for failures
    pub status_code: Option<u16>,
    /// Tool message or raw response body, verbatim
    pub message: String,
    /// Artifact download link
    pub link: Option<String>,
}

impl Notification {
    /// Plain text shown to the user, as a terminal would print it
    pub fn text(&self) -> String {
        let mut out = self.title.clone();
        match self.kind {
            NotificationKind::Success => out.push_str(": success"),
            NotificationKind::Failure => {
                if let Some(code) = self.status_code {
                    let _ = write!(out, ": failed ({})", code);
                }
            }
        }
        out.push('\n');
        out.push_str(&self.message);
        if let Some(link) = &self.link {
            let _ = write!(out, "\nDownload: {}", link);
        }
        out
    }

    /// Render as an HTML fragment with its own dismiss control
    pub fn to_html(&self, id: NotificationId) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            r#"<div class="{}" data-notification="{}">"#,
            self.kind.css_class(),
            id.get()
        );
        let _ = write!(
            html,
            r#"<button class="dismiss" data-dismiss="{}" aria-label="Dismiss">&times;</button>"#,
            id.get()
        );
        let _ = write!(html, "<h4>{}</h4>", escape_html(&self.title));
        if let Some(code) = self.status_code {
            let _ = write!(html, r#"<p class="status">Status: {}</p>"#, code);
        }
        let _ = write!(html, "<pre>{}</pre>", escape_html(&self.message));
        if let Some(link) = &self.link {
            let _ = write!(
                html,
                r#"<a href="{0}" download>{0}</a>"#,
                escape_html(link)
            );
        }
        html.push_str("</div>");
        html
    }
}

/// Capitalize the first letter of every whitespace-separated word
///
/// The rest of each word and the whitespace itself are left untouched.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Render a successful outcome
pub fn render_success(action: Action, message: &str, artifact_url: Option<&str>) -> Notification {
    Notification {
        kind: NotificationKind::Success,
        title: title_case(action.as_str()),
        status_code: None,
        message: message.to_string(),
        link: artifact_url.map(str::to_string),
    }
}

/// Render a failed outcome
pub fn render_failure(action: Action, status_code: u16, body: &str) -> Notification {
    Notification {
        kind: NotificationKind::Failure,
        title: title_case(action.as_str()),
        status_code: Some(status_code),
        message: body.to_string(),
        link: None,
    }
}

/// Render either branch of an outcome
pub fn render(action: Action, result: &OperationResult) -> Notification {
    match result {
        OperationResult::Success {
            message,
            artifact_url,
        } => render_success(action, message, artifact_url.as_deref()),
        OperationResult::Failure {
            status_code,
            message,
        } => render_failure(action, *status_code, message),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Running log of notifications, newest first
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: VecDeque<(NotificationId, Notification)>,
    next_id: u64,
}

impl NotificationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a notification at the head of the log
    pub fn push(&mut self, notification: Notification) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;
        self.entries.push_front((id, notification));
        id
    }

    /// Remove one notification
    ///
    /// Returns false if the id is not (or no longer) in the log.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        match self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Look up a notification
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, n)| n)
    }

    /// Iterate newest first
    pub fn iter(&self) -> impl Iterator<Item = (NotificationId, &Notification)> {
        self.entries.iter().map(|(id, n)| (*id, n))
    }

    /// Number of notifications
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the whole log as an HTML fragment
    pub fn to_html(&self) -> String {
        self.iter().map(|(id, n)| n.to_html(id)).collect()
    }
}
