//! Operation form model and its wire payload
//!
//! The form performs no semantic validation. Whether a write has an image,
//! whether the programmer string makes sense, all of that is decided by the
//! relay and the external tool.

use crate::action::Action;
use crate::error::Result;

/// Multipart field carrying the programmer string
pub const FIELD_PROGRAMMER: &str = "programmer";
/// Multipart field carrying the action wire name
pub const FIELD_ACTION: &str = "action";
/// Multipart field carrying the image file
pub const FIELD_FILE: &str = "file-upload";
/// Presence flag requesting a forced operation
pub const FIELD_FORCE: &str = "force";
/// Presence flag requesting verbose tool output
pub const FIELD_VERBOSE: &str = "very-very-verbose";

/// Value sent for presence flags, matching what a checked checkbox submits
const FLAG_ON: &str = "on";

/// An image file picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// File name as reported by the picker
    pub name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Create an upload from a name and its contents
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Independent boolean options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Force the operation
    pub force: bool,
    /// Ask the tool for its most verbose output
    pub verbose: bool,
}

/// Snapshot of the form taken for one submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationRequest {
    /// Programmer identifier, optionally with `:key=value,...` parameters
    pub programmer: String,
    /// Selected operation
    pub action: Action,
    /// Image file, only meaningful for write and verify
    pub file: Option<FileUpload>,
    /// Boolean options
    pub flags: Flags,
}

impl OperationRequest {
    /// Convert the request into the multipart parts sent to the relay
    ///
    /// An empty file counts as no file, the same way a browser form with no
    /// file chosen submits nothing useful for `file-upload`.
    pub fn to_transport_payload(&self) -> TransportPayload {
        let mut payload = TransportPayload::default();
        payload.push_text(FIELD_PROGRAMMER, self.programmer.clone());
        payload.push_text(FIELD_ACTION, self.action.as_str());

        if let Some(file) = self.file.as_ref().filter(|f| !f.bytes.is_empty()) {
            payload.parts.push(Part {
                name: FIELD_FILE,
                value: PartValue::File {
                    name: file.name.clone(),
                    bytes: file.bytes.clone(),
                },
            });
        }

        if self.flags.force {
            payload.push_text(FIELD_FORCE, FLAG_ON);
        }
        if self.flags.verbose {
            payload.push_text(FIELD_VERBOSE, FLAG_ON);
        }

        payload
    }
}

/// Content of one multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    /// Plain text field
    Text(String),
    /// Binary file field
    File {
        /// File name reported to the server
        name: String,
        /// File contents
        bytes: Vec<u8>,
    },
}

/// One named multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Field name
    pub name: &'static str,
    /// Field content
    pub value: PartValue,
}

/// Ordered multipart payload for one submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportPayload {
    parts: Vec<Part>,
}

impl TransportPayload {
    fn push_text(&mut self, name: &'static str, value: impl Into<String>) {
        self.parts.push(Part {
            name,
            value: PartValue::Text(value.into()),
        });
    }

    /// Look up a part by field name
    pub fn get(&self, name: &str) -> Option<&PartValue> {
        self.parts.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    /// Text value of a field, if present and textual
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PartValue::Text(s) => Some(s),
            PartValue::File { .. } => None,
        }
    }

    /// Whether a field is present at all
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over the parts in order
    pub fn iter(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the payload has no parts
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl IntoIterator for TransportPayload {
    type Item = Part;
    type IntoIter = std::vec::IntoIter<Part>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

/// Current user-entered form values
///
/// The selected action always has a value; the form starts on the default
/// action and can only ever be switched to another one.
#[derive(Debug, Clone, Default)]
pub struct FormModel {
    programmer: String,
    action: Action,
    file: Option<FileUpload>,
    flags: Flags,
}

impl FormModel {
    /// Create an empty form with the default action selected
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently selected action
    pub fn selected_action(&self) -> Action {
        self.action
    }

    /// Select an action
    pub fn set_action(&mut self, action: Action) {
        log::debug!("Action: {}", action);
        self.action = action;
    }

    /// Select an action by its wire name
    pub fn set_action_str(&mut self, action: &str) -> Result<()> {
        self.set_action(action.parse()?);
        Ok(())
    }

    /// Current programmer string
    pub fn programmer(&self) -> &str {
        &self.programmer
    }

    /// Mutable access for text-edit widgets
    pub fn programmer_mut(&mut self) -> &mut String {
        &mut self.programmer
    }

    /// Set the programmer string
    pub fn set_programmer(&mut self, programmer: impl Into<String>) {
        self.programmer = programmer.into();
    }

    /// Currently attached file, if any
    pub fn file(&self) -> Option<&FileUpload> {
        self.file.as_ref()
    }

    /// Attach an image file
    ///
    /// The file is kept even when the selected action does not use it.
    pub fn set_file(&mut self, file: FileUpload) {
        log::debug!("File: {} ({} bytes)", file.name, file.bytes.len());
        self.file = Some(file);
    }

    /// Drop the attached file
    pub fn clear_file(&mut self) {
        self.file = None;
    }

    /// Current flags
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Mutable access for checkbox widgets
    pub fn flags_mut(&mut self) -> &mut Flags {
        &mut self.flags
    }

    /// Set the force flag
    pub fn set_force(&mut self, force: bool) {
        self.flags.force = force;
    }

    /// Set the verbose flag
    pub fn set_verbose(&mut self, verbose: bool) {
        self.flags.verbose = verbose;
    }

    /// Take a snapshot for submission
    pub fn snapshot(&self) -> OperationRequest {
        OperationRequest {
            programmer: self.programmer.clone(),
            action: self.action,
            file: self.file.clone(),
            flags: self.flags,
        }
    }

    /// Convert the current values into the wire payload
    pub fn to_transport_payload(&self) -> TransportPayload {
        self.snapshot().to_transport_payload()
    }
}
