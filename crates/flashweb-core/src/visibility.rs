//! Which optional form fields apply to which action
//!
//! Every optional field carries a tag set of actions. A field is shown
//! exactly when the selected action is in its tag set; fields may be tagged
//! with several actions (the image file is shared by write and verify).

use crate::action::Action;
use std::collections::BTreeSet;

/// Optional form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    /// Image file upload
    File,
    /// Force checkbox
    Force,
    /// Very verbose checkbox
    Verbose,
}

/// Declaration of an optional field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field identity
    pub id: FieldId,
    /// Label shown next to the widget
    pub label: &'static str,
    /// Hover text
    pub help: &'static str,
    /// Actions the field applies to
    pub actions: &'static [Action],
}

impl FieldSpec {
    /// Whether the field applies to `action`
    pub fn applies_to(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

/// All optional fields, in form order
pub const OPTIONAL_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        id: FieldId::File,
        label: "Image file",
        help: "Image to write to the chip, or to compare the chip against",
        actions: &[Action::Write, Action::Verify],
    },
    FieldSpec {
        id: FieldId::Force,
        label: "Force",
        help: "Force the operation even if the tool considers it unsafe",
        actions: &Action::ALL,
    },
    FieldSpec {
        id: FieldId::Verbose,
        label: "Very very verbose",
        help: "Ask the tool for its most detailed output",
        actions: &Action::ALL,
    },
];

/// Declaration for a field
pub fn field_spec(id: FieldId) -> &'static FieldSpec {
    // Indices follow the declaration order of OPTIONAL_FIELDS
    let index = match id {
        FieldId::File => 0,
        FieldId::Force => 1,
        FieldId::Verbose => 2,
    };
    &OPTIONAL_FIELDS[index]
}

/// Set of optional fields relevant for `action`
pub fn visible_fields(action: Action) -> BTreeSet<FieldId> {
    OPTIONAL_FIELDS
        .iter()
        .filter(|spec| spec.applies_to(action))
        .map(|spec| spec.id)
        .collect()
}

/// Whether a single field is relevant for `action`
pub fn is_visible(field: FieldId, action: Action) -> bool {
    field_spec(field).applies_to(action)
}
