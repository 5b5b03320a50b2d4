//! Parameter validation and input staging

use crate::error::{Result, RunnerError};
use crate::opts::{ExecResult, FlashromAdapter, FlashromOpts, MAX_VERBOSITY};
use flashweb_core::Action;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Validates one request and runs it through an adapter
///
/// The service is built per request: set the parameters, then call
/// [`execute`](Self::execute). An uploaded image is written to a uniquely
/// named file in the input directory and removed again when the service is
/// dropped.
pub struct FlashromService<A> {
    adapter: A,
    input_dir: PathBuf,
    action: Option<Action>,
    programmer: String,
    verbosity: u8,
    force: bool,
    input_file: Option<PathBuf>,
}

impl<A: FlashromAdapter> FlashromService<A> {
    /// Create a service staging uploads below `input_dir`
    pub fn new(adapter: A, input_dir: impl Into<PathBuf>) -> Self {
        Self {
            adapter,
            input_dir: input_dir.into(),
            action: None,
            programmer: String::new(),
            verbosity: 0,
            force: false,
            input_file: None,
        }
    }

    /// Set the action from its wire name
    pub fn set_action(&mut self, action: &str) -> Result<()> {
        match action.parse::<Action>() {
            Ok(action) => {
                log::debug!("Action: {}", action);
                self.action = Some(action);
                Ok(())
            }
            Err(e) => {
                log::error!("Invalid value for ACTION: {:?}", action);
                Err(e.into())
            }
        }
    }

    /// Set the programmer string, passed through unchecked
    pub fn set_programmer(&mut self, programmer: impl Into<String>) {
        self.programmer = programmer.into();
        log::debug!("Programmer: {}", self.programmer);
    }

    /// Stage the uploaded image
    pub fn set_file(&mut self, data: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.input_dir)?;

        let mut file = tempfile::Builder::new()
            .suffix(".bin")
            .tempfile_in(&self.input_dir)
            .inspect_err(|e| log::error!("Unexpected error while creating input file: {}", e))?;
        file.write_all(data)?;
        let (_, path) = file.keep().map_err(|e| RunnerError::Io(e.error))?;

        log::debug!("File uploaded to {}", path.display());
        self.remove_input_file();
        self.input_file = Some(path);
        Ok(())
    }

    /// Set the verbosity level (0 to 3)
    pub fn set_verbosity(&mut self, value: u8) -> Result<()> {
        if value > MAX_VERBOSITY {
            log::error!("Invalid value for VERBOSITY: {}", value);
            return Err(RunnerError::InvalidParameter(
                "Invalid value for VERBOSITY".into(),
            ));
        }
        self.verbosity = value;
        log::debug!("Verbosity level: {}", value);
        Ok(())
    }

    /// Enable `-f`
    pub fn set_force(&mut self) {
        self.force = true;
        log::debug!("Force flag: true");
    }

    /// Disable `-f`
    pub fn unset_force(&mut self) {
        self.force = false;
        log::debug!("Force flag: false");
    }

    /// Path of the staged image, if any
    pub fn input_file(&self) -> Option<&Path> {
        self.input_file.as_deref()
    }

    /// Check the parameters and run the adapter
    pub fn execute(&self) -> Result<ExecResult> {
        let opts = self.build_opts()?;
        log::debug!("Execution options: {:?}", opts);

        match self.adapter.run(&opts) {
            Ok(result) => Ok(result),
            Err(RunnerError::Io(e)) => {
                log::error!("General execution failure: {}", e);
                Err(RunnerError::Execution(format!(
                    "Unable to execute flashrom utility: {}",
                    e
                )))
            }
            Err(e) => {
                log::error!("Execution failure: {}", e);
                Err(e)
            }
        }
    }

    fn build_opts(&self) -> Result<FlashromOpts> {
        let action = self
            .action
            .ok_or_else(|| RunnerError::InvalidParameter("Invalid value for ACTION.".into()))?;
        let name = action.as_str().to_uppercase();

        let input_path = match (action.takes_input_file(), &self.input_file) {
            (true, Some(path)) => {
                if !path.exists() {
                    log::error!("Input file missing, aborting execution");
                    return Err(RunnerError::Execution(
                        "File expected but does not exist. Cannot continue.".into(),
                    ));
                }
                Some(path.clone())
            }
            (true, None) => {
                return Err(RunnerError::InvalidParameter(format!(
                    "Invalid Parameter. Action={} requires an input file.",
                    name
                )));
            }
            (false, Some(_)) if matches!(action, Action::Probe | Action::Erase) => {
                return Err(RunnerError::InvalidParameter(format!(
                    "Invalid Parameter. Action={} cannot use an input file.",
                    name
                )));
            }
            (false, Some(_)) => {
                log::debug!("Ignoring input file for {}", action);
                None
            }
            (false, None) => None,
        };

        Ok(FlashromOpts {
            action,
            force: self.force,
            verbosity: self.verbosity,
            programmer: self.programmer.clone(),
            input_path,
        })
    }

    fn remove_input_file(&mut self) {
        if let Some(path) = self.input_file.take() {
            if let Err(e) = fs::remove_file(&path) {
                log::warn!("Failed to remove staged input {}: {}", path.display(), e);
            }
        }
    }
}

impl<A> Drop for FlashromService<A> {
    fn drop(&mut self) {
        if let Some(path) = self.input_file.take() {
            let _ = fs::remove_file(path);
        }
    }
}
