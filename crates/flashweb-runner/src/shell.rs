//! Runs the `flashrom` utility as a subprocess
//!
//! Arguments are handed to the process directly, never through a shell, so
//! programmer strings and paths need no quoting.

use crate::error::{Result, RunnerError};
use crate::opts::{ExecResult, FlashromAdapter, FlashromOpts, MAX_VERBOSITY};
use flashweb_core::Action;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    /// Captured stdout
    pub stdout: Vec<u8>,
    /// Captured stderr
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    /// Whether the process exited with code 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Starts a process and waits for it
pub trait CommandExecutor {
    /// Run `program` with `args`, capturing its output
    fn execute(&self, program: &OsStr, args: &[OsString]) -> io::Result<ProcessOutput>;
}

/// Executor spawning real processes
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor {
    env: Vec<(OsString, OsString)>,
}

impl SystemExecutor {
    /// Create an executor passing extra environment variables to the child
    pub fn with_env<K, V>(env: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            env: env.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl CommandExecutor for SystemExecutor {
    fn execute(&self, program: &OsStr, args: &[OsString]) -> io::Result<ProcessOutput> {
        log::info!("Running subprocess: {:?} {:?}", program, args);

        let output = Command::new(program)
            .args(args)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .output()?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Combine stdout and stderr into the message shown to the user
pub fn prepare_response(output: &ProcessOutput) -> String {
    let out = String::from_utf8_lossy(&output.stdout);
    let err = String::from_utf8_lossy(&output.stderr);
    let (out, err) = (out.trim(), err.trim());

    match (out.is_empty(), err.is_empty()) {
        (false, false) => format!("STDOUT:\n{}\n\nSTDERR:\n{}", out, err),
        (true, false) => err.to_string(),
        (false, true) => out.to_string(),
        (true, true) => match output.code {
            Some(code) => format!("Application exited without details - CODE: {}", code),
            None => "Application exited without details - CODE: unknown".to_string(),
        },
    }
}

/// [`FlashromAdapter`] invoking the utility on this host
///
/// Read dumps are written to uniquely named files in the output directory;
/// the file name is returned as the artifact.
pub struct ShellCommandAdapter<E = SystemExecutor> {
    program: OsString,
    prefix_args: Vec<OsString>,
    output_dir: PathBuf,
    executor: E,
}

impl ShellCommandAdapter<SystemExecutor> {
    /// Create an adapter running `program` and writing dumps to `output_dir`
    pub fn new(program: impl Into<OsString>, output_dir: impl Into<PathBuf>) -> Self {
        Self::with_executor(program, output_dir, SystemExecutor::default())
    }
}

impl<E: CommandExecutor> ShellCommandAdapter<E> {
    /// Create an adapter with a custom executor
    pub fn with_executor(
        program: impl Into<OsString>,
        output_dir: impl Into<PathBuf>,
        executor: E,
    ) -> Self {
        let output_dir = output_dir.into();
        log::debug!("ShellCommandAdapter output_dir={}", output_dir.display());
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
            output_dir,
            executor,
        }
    }

    /// Arguments placed before the flashrom arguments
    ///
    /// Useful when the utility is reached through a wrapper such as `sudo`.
    pub fn with_prefix_args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        self.prefix_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Build the argument list (without the program itself)
    ///
    /// `output` is the dump destination and is only used for reads.
    pub fn make_command(
        &self,
        opts: &FlashromOpts,
        output: Option<&Path>,
    ) -> Result<Vec<OsString>> {
        let mut args = self.prefix_args.clone();
        args.push("-p".into());
        args.push(opts.programmer.as_str().into());

        let input = || {
            opts.input_path.as_deref().ok_or_else(|| {
                RunnerError::InvalidParameter(format!(
                    "Action={} requires an input file.",
                    opts.action.as_str().to_uppercase()
                ))
            })
        };

        match opts.action {
            Action::Probe => {}
            Action::Erase => args.push("-E".into()),
            Action::Write => {
                args.push("-w".into());
                args.push(input()?.into());
            }
            Action::Verify => {
                args.push("-v".into());
                args.push(input()?.into());
            }
            Action::Read => {
                let output = output.ok_or_else(|| {
                    RunnerError::Execution("No output file reserved for read".into())
                })?;
                args.push("-r".into());
                args.push(output.into());
            }
        }

        // Global flags
        if opts.force {
            args.push("-f".into());
        }
        if opts.verbosity > 0 {
            let level = opts.verbosity.min(MAX_VERBOSITY) as usize;
            args.push(format!("-{}", "V".repeat(level)).into());
        }

        Ok(args)
    }

    fn reserve_output(&self) -> Result<(String, PathBuf)> {
        fs::create_dir_all(&self.output_dir)?;
        let file = tempfile::Builder::new()
            .suffix(".bin")
            .tempfile_in(&self.output_dir)?;
        let (_, path) = file.keep().map_err(|e| RunnerError::Io(e.error))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| RunnerError::Execution("Invalid output file name".into()))?;
        Ok((name, path))
    }
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        log::warn!("Failed to remove {}: {}", path.display(), e);
    }
}

impl<E: CommandExecutor> FlashromAdapter for ShellCommandAdapter<E> {
    fn run(&self, opts: &FlashromOpts) -> Result<ExecResult> {
        let artifact = if opts.action.produces_artifact() {
            Some(self.reserve_output()?)
        } else {
            None
        };
        let output_path = artifact.as_ref().map(|(_, path)| path.as_path());
        let cleanup = || {
            if let Some(path) = output_path {
                discard(path);
            }
        };

        let args = match self.make_command(opts, output_path) {
            Ok(args) => args,
            Err(e) => {
                cleanup();
                return Err(e);
            }
        };

        let output = match self.executor.execute(&self.program, &args) {
            Ok(output) => output,
            Err(e) => {
                log::error!("Failed to start {:?}: {}", self.program, e);
                cleanup();
                return Err(RunnerError::Execution(format!(
                    "Unable to execute {}: {}",
                    self.program.to_string_lossy(),
                    e
                )));
            }
        };

        let message = prepare_response(&output);

        if !output.success() {
            log::warn!(
                "Non-zero exit code: {:?}, stdout: {:?}, stderr: {:?}",
                output.code,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            cleanup();
            return Err(RunnerError::Execution(message));
        }

        log::debug!("flashrom execution succeeded");
        Ok(ExecResult {
            message,
            artifact: artifact.map(|(name, _)| name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const PROGRAMMER: &str = "dummy:emulate=M25P10.RES";

    struct FakeExecutor {
        output: ProcessOutput,
        calls: RefCell<Vec<(OsString, Vec<OsString>)>>,
    }

    impl FakeExecutor {
        fn new(output: ProcessOutput) -> Self {
            Self {
                output,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn ok() -> Self {
            Self::new(ProcessOutput {
                code: Some(0),
                ..Default::default()
            })
        }
    }

    impl CommandExecutor for &FakeExecutor {
        fn execute(&self, program: &OsStr, args: &[OsString]) -> io::Result<ProcessOutput> {
            self.calls
                .borrow_mut()
                .push((program.to_os_string(), args.to_vec()));
            Ok(self.output.clone())
        }
    }

    fn opts(action: Action) -> FlashromOpts {
        FlashromOpts {
            action,
            force: false,
            verbosity: 0,
            programmer: PROGRAMMER.into(),
            input_path: None,
        }
    }

    fn args(strs: &[&str]) -> Vec<OsString> {
        strs.iter().map(OsString::from).collect()
    }

    fn adapter<'a>(
        exec: &'a FakeExecutor,
        dir: &tempfile::TempDir,
    ) -> ShellCommandAdapter<&'a FakeExecutor> {
        ShellCommandAdapter::with_executor("flashrom", dir.path(), exec)
    }

    fn last_args(exec: &FakeExecutor) -> Vec<OsString> {
        exec.calls.borrow().last().unwrap().1.clone()
    }

    #[test]
    fn test_command_for_probe() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FakeExecutor::ok();
        adapter(&exec, &dir).run(&opts(Action::Probe)).unwrap();
        let (program, called) = exec.calls.borrow()[0].clone();
        assert_eq!(program, "flashrom");
        assert_eq!(called, args(&["-p", PROGRAMMER]));
    }

    #[test]
    fn test_command_for_erase() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FakeExecutor::ok();
        adapter(&exec, &dir).run(&opts(Action::Erase)).unwrap();
        assert_eq!(last_args(&exec), args(&["-p", PROGRAMMER, "-E"]));
    }

    #[test]
    fn test_command_for_basic_write() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FakeExecutor::ok();
        let input = dir.path().join("testfile.bin");
        let opts = FlashromOpts {
            input_path: Some(input.clone()),
            ..opts(Action::Write)
        };
        adapter(&exec, &dir).run(&opts).unwrap();

        let mut expected = args(&["-p", PROGRAMMER, "-w"]);
        expected.push(input.into());
        assert_eq!(last_args(&exec), expected);
    }

    #[test]
    fn test_command_for_write_with_verbosity_and_force() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FakeExecutor::ok();
        let input = dir.path().join("testfile.bin");
        let opts = FlashromOpts {
            force: true,
            verbosity: 3,
            input_path: Some(input.clone()),
            ..opts(Action::Write)
        };
        adapter(&exec, &dir).run(&opts).unwrap();

        let mut expected = args(&["-p", PROGRAMMER, "-w"]);
        expected.push(input.into());
        expected.extend(args(&["-f", "-VVV"]));
        assert_eq!(last_args(&exec), expected);
    }

    #[test]
    fn test_verbosity_levels() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FakeExecutor::ok();
        let adapter = adapter(&exec, &dir);
        for (level, flag) in [(1, "-V"), (2, "-VV"), (3, "-VVV"), (9, "-VVV")] {
            let opts = FlashromOpts {
                verbosity: level,
                ..opts(Action::Probe)
            };
            let built = adapter.make_command(&opts, None).unwrap();
            assert_eq!(built.last().unwrap(), flag);
        }
    }

    #[test]
    fn test_command_for_verify() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FakeExecutor::ok();
        let input = dir.path().join("testfile.bin");
        let opts = FlashromOpts {
            input_path: Some(input.clone()),
            ..opts(Action::Verify)
        };
        adapter(&exec, &dir).run(&opts).unwrap();

        let mut expected = args(&["-p", PROGRAMMER, "-v"]);
        expected.push(input.into());
        assert_eq!(last_args(&exec), expected);
    }

    #[test]
    fn test_command_for_read_returns_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FakeExecutor::ok();
        let result = adapter(&exec, &dir).run(&opts(Action::Read)).unwrap();

        let name = result.artifact.unwrap();
        assert!(name.ends_with(".bin"));
        let output = dir.path().join(&name);
        assert!(output.exists());

        let mut expected = args(&["-p", PROGRAMMER, "-r"]);
        expected.push(output.into());
        assert_eq!(last_args(&exec), expected);
    }

    #[test]
    fn test_write_without_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FakeExecutor::ok();
        let err = adapter(&exec, &dir).run(&opts(Action::Write)).unwrap_err();
        assert!(err.is_client_error());
        assert!(exec.calls.borrow().is_empty());
    }

    #[test]
    fn test_prefix_args() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FakeExecutor::ok();
        let adapter = ShellCommandAdapter::with_executor("sudo", dir.path(), &exec)
            .with_prefix_args(["-n", "flashrom"]);
        adapter.run(&opts(Action::Erase)).unwrap();
        assert_eq!(
            last_args(&exec),
            args(&["-n", "flashrom", "-p", PROGRAMMER, "-E"])
        );
    }

    #[test]
    fn test_non_zero_exit_is_execution_error() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FakeExecutor::new(ProcessOutput {
            code: Some(1),
            stdout: Vec::new(),
            stderr: b"No EEPROM/flash device found.\n".to_vec(),
        });
        let err = adapter(&exec, &dir).run(&opts(Action::Read)).unwrap_err();
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "No EEPROM/flash device found.");
        // The reserved dump is cleaned up
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_response_from_stdout() {
        let output = ProcessOutput {
            code: Some(0),
            stdout: b"Hello, World!".to_vec(),
            stderr: Vec::new(),
        };
        assert_eq!(prepare_response(&output), "Hello, World!");
    }

    #[test]
    fn test_response_from_stderr() {
        let output = ProcessOutput {
            code: Some(0),
            stdout: Vec::new(),
            stderr: b"Good-bye, World!".to_vec(),
        };
        assert_eq!(prepare_response(&output), "Good-bye, World!");
    }

    #[test]
    fn test_response_from_stdout_and_stderr() {
        let output = ProcessOutput {
            code: Some(0),
            stdout: b"Hello, World!\n".to_vec(),
            stderr: b"Good-bye, World!\n".to_vec(),
        };
        assert_eq!(
            prepare_response(&output),
            "STDOUT:\nHello, World!\n\nSTDERR:\nGood-bye, World!"
        );
    }

    #[test]
    fn test_response_without_output() {
        let output = ProcessOutput {
            code: Some(2),
            ..Default::default()
        };
        assert_eq!(
            prepare_response(&output),
            "Application exited without details - CODE: 2"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_captures_output() {
        let output = SystemExecutor::default()
            .execute(
                OsStr::new("sh"),
                &args(&["-c", "printf out; printf err >&2; exit 3"]),
            )
            .unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout, b"out");
        assert_eq!(output.stderr, b"err");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_passes_env() {
        let exec = SystemExecutor::with_env([("FLASHWEB_TEST_VAR", "set")]);
        let output = exec
            .execute(OsStr::new("sh"), &args(&["-c", "printf %s \"$FLASHWEB_TEST_VAR\""]))
            .unwrap();
        assert_eq!(output.stdout, b"set");
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_program_is_execution_error() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = ShellCommandAdapter::new("/nonexistent/flashrom", dir.path());
        let err = adapter.run(&opts(Action::Probe)).unwrap_err();
        assert!(matches!(err, RunnerError::Execution(_)));
    }
}
