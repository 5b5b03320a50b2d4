//! flashweb-runner - Server side of the flashweb relay
//!
//! The relay receives a console submission, hands it to a
//! [`FlashromService`] which checks the parameters for consistency and
//! stages the uploaded image, and the service runs a [`FlashromAdapter`].
//! The adapter used in production, [`ShellCommandAdapter`], invokes the
//! `flashrom` utility as a subprocess.
//!
//! ```text
//!   multipart form ──► FlashromService ──► FlashromOpts ──► FlashromAdapter
//!                      (validate, stage)                    (flashrom -p ...)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use flashweb_runner::{FlashromService, ShellCommandAdapter};
//!
//! let adapter = ShellCommandAdapter::new("flashrom", "outputs/");
//! let mut service = FlashromService::new(adapter, "inputs/");
//! service.set_action("read")?;
//! service.set_programmer("dummy:emulate=M25P10.RES");
//! let result = service.execute()?;
//! println!("{}", result.message);
//! # Ok::<(), flashweb_runner::RunnerError>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod error;
mod opts;
mod service;
mod shell;

pub use error::{Result, RunnerError};
pub use opts::{ExecResult, FlashromAdapter, FlashromOpts, MAX_VERBOSITY};
pub use service::FlashromService;
pub use shell::{
    prepare_response, CommandExecutor, ProcessOutput, ShellCommandAdapter, SystemExecutor,
};
