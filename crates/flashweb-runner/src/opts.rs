//! Options handed to an adapter and what it returns

use crate::error::Result;
use flashweb_core::Action;
use std::path::PathBuf;

/// Highest verbosity level the utility understands (`-VVV`)
pub const MAX_VERBOSITY: u8 = 3;

/// Validated options for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashromOpts {
    /// Operation to perform
    pub action: Action,
    /// Pass `-f`
    pub force: bool,
    /// Number of `V`s in the verbosity flag, 0 for none
    pub verbosity: u8,
    /// Programmer string passed to `-p`
    pub programmer: String,
    /// Staged image for write and verify
    pub input_path: Option<PathBuf>,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Combined tool output
    pub message: String,
    /// File name of a produced artifact, relative to the output directory
    pub artifact: Option<String>,
}

/// Runs the flash utility with the given options
///
/// Adapters trust the options they are given; consistency checks happen in
/// [`FlashromService`](crate::FlashromService).
pub trait FlashromAdapter {
    /// Run the utility
    fn run(&self, opts: &FlashromOpts) -> Result<ExecResult>;
}
