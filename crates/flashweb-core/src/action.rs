//! Flash operations the console can request

use crate::error::{Error, Result};
use core::fmt;
use core::str::FromStr;

/// One of the operations the external flash tool performs
///
/// Exactly one action is selected at any time; the form starts on
/// [`Action::Probe`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    /// Detect the chip attached to the programmer
    #[default]
    Probe,
    /// Erase the whole chip
    Erase,
    /// Dump the chip contents to a downloadable file
    Read,
    /// Program an image file into the chip
    Write,
    /// Compare the chip contents against an image file
    Verify,
}

impl Action {
    /// All actions in form order
    pub const ALL: [Action; 5] = [
        Action::Probe,
        Action::Erase,
        Action::Read,
        Action::Write,
        Action::Verify,
    ];

    /// Name used on the wire (`action` multipart field)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Probe => "probe",
            Self::Erase => "erase",
            Self::Read => "read",
            Self::Write => "write",
            Self::Verify => "verify",
        }
    }

    /// Whether the action operates on an uploaded image
    pub fn takes_input_file(self) -> bool {
        matches!(self, Self::Write | Self::Verify)
    }

    /// Whether a successful run leaves a file behind for download
    pub fn produces_artifact(self) -> bool {
        matches!(self, Self::Read)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| Error::InvalidParameter("Invalid value for ACTION.".into()))
    }
}
