//! Execution of external programs (lastz, Rscript, gnuplot).
//!
//! All invocations go through the [CommandRunner] trait so that the pipeline can be driven
//! by a fake runner in tests.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::errors::LastzPlotError;

/// What to do with the standard output of an external program
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Capture {
    /// stdout is written to the file (created or truncated)
    ToFile(PathBuf),
    /// stdout and stderr are discarded
    Discard,
    /// stdout and stderr go to our own
    Inherit,
}

/// A fully described invocation of an external program.
#[derive(Clone, Debug)]
pub struct ExternalCommand {
    program: String,
    args: Vec<OsString>,
    /// directory in which the program is run, ours if None
    current_dir: Option<PathBuf>,
    capture: Capture,
} // end of ExternalCommand

impl ExternalCommand {
    pub fn new(program: &str) -> Self {
        ExternalCommand { program: program.to_string(), args: Vec::new(), current_dir: None, capture: Capture::Inherit }
    }

    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    pub fn capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    pub fn get_program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn get_capture(&self) -> &Capture {
        &self.capture
    }

    /// command line as a string, for logs
    pub fn display(&self) -> String {
        let mut s = self.program.clone();
        for a in &self.args {
            s.push(' ');
            s.push_str(&a.to_string_lossy());
        }
        s
    }
} // end of impl ExternalCommand

/// Exit status of a finished program. code is None if it was killed by a signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CommandStatus {
    pub code: Option<i32>,
}

impl CommandStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Capability of running a program to completion.
pub trait CommandRunner {
    /// runs cmd, blocking until it exits. An error is returned only if the program could not be launched.
    fn execute(&self, cmd: &ExternalCommand) -> Result<CommandStatus, LastzPlotError>;

    /// true if the program can be launched (its exit code is not checked)
    fn is_available(&self, program: &str, probe_arg: &str) -> bool {
        let cmd = ExternalCommand::new(program).arg(probe_arg).capture(Capture::Discard);
        self.execute(&cmd).is_ok()
    }
} // end of trait CommandRunner

//===================================================================

/// Runs programs with std::process::Command
#[derive(Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn execute(&self, cmd: &ExternalCommand) -> Result<CommandStatus, LastzPlotError> {
        log::debug!("CMD: {}", cmd.display());
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        if let Some(dir) = &cmd.current_dir {
            command.current_dir(dir);
        }
        match &cmd.capture {
            Capture::ToFile(path) => {
                let out = File::create(path).map_err(|e| LastzPlotError::io(path, e))?;
                command.stdout(Stdio::from(out));
            }
            Capture::Discard => {
                command.stdout(Stdio::null()).stderr(Stdio::null());
            }
            Capture::Inherit => {}
        }
        let status = command
            .status()
            .map_err(|e| LastzPlotError::tool(&cmd.program, format!("could not execute: {}", e)))?;
        log::debug!("{} exited with {}", cmd.program, status);
        Ok(CommandStatus { code: status.code() })
    } // end of execute
} // end of impl CommandRunner for SystemRunner

//===================================================================
