//! Process creation, stream wiring and waiting.
//!
//! Orchestrators only talk to the [`Launcher`] trait. [`OsLauncher`] backs it
//! with `std::process`, which forks and replaces the program image in one
//! step. Channels are created with `O_CLOEXEC`, so every end the child does
//! not own is closed once the new program starts, and signal handlers
//! installed by the interpreter are reset to their defaults by the exec.

use crate::command::{Command, ExitCode};
use crate::error::ShellError;
use std::fs::File;
use std::process::{self, Child, ChildStdout, ExitStatus, Stdio};
use tracing::debug;

/// Where a child's standard input comes from.
pub enum Input<C> {
    /// The interpreter's own standard input.
    Inherit,
    /// Read end of a channel opened by an earlier launch.
    Channel(C),
    /// Immediate end of stream.
    Closed,
}

/// Where a child's standard output goes.
pub enum Output {
    Inherit,
    /// A file opened by the caller; the launcher takes ownership.
    File(File),
    /// A fresh channel whose read end is handed back in [`Spawned::output`].
    Channel,
}

/// Stream plan for one launch.
pub struct Streams<C> {
    pub stdin: Input<C>,
    pub stdout: Output,
}

impl<C> Streams<C> {
    pub fn inherit() -> Self {
        Self {
            stdin: Input::Inherit,
            stdout: Output::Inherit,
        }
    }
}

/// A launched child and, for [`Output::Channel`], the read end of its output.
pub struct Spawned<H, C> {
    pub child: H,
    pub output: Option<C>,
}

/// The capability every orchestrator is written against:
/// create a child with the given streams, then wait for that specific child.
///
/// A handle returned by `spawn` must eventually be passed to `wait`.
pub trait Launcher {
    /// Read end of an inter-process channel.
    type Channel;
    /// Identity of a running child.
    type Child;

    fn spawn(
        &mut self,
        command: &Command,
        streams: Streams<Self::Channel>,
    ) -> Result<Spawned<Self::Child, Self::Channel>, ShellError>;

    fn wait(&mut self, child: Self::Child) -> Result<ExitCode, ShellError>;
}

/// A child launched by [`OsLauncher`].
pub struct OsChild {
    program: String,
    inner: Child,
}

impl OsChild {
    pub fn id(&self) -> u32 {
        self.inner.id()
    }
}

/// [`Launcher`] backed by `std::process::Command`.
#[derive(Debug, Default)]
pub struct OsLauncher;

impl Launcher for OsLauncher {
    type Channel = ChildStdout;
    type Child = OsChild;

    fn spawn(
        &mut self,
        command: &Command,
        streams: Streams<ChildStdout>,
    ) -> Result<Spawned<OsChild, ChildStdout>, ShellError> {
        let Some((program, args)) = command.argv().split_first() else {
            return Err(ShellError::CommandNotFound {
                program: String::new(),
            });
        };

        let stdin = match streams.stdin {
            Input::Inherit => Stdio::inherit(),
            Input::Channel(reader) => Stdio::from(reader),
            Input::Closed => Stdio::null(),
        };
        let stdout = match streams.stdout {
            Output::Inherit => Stdio::inherit(),
            Output::File(file) => Stdio::from(file),
            Output::Channel => Stdio::piped(),
        };

        let mut inner = process::Command::new(program)
            .args(args)
            .stdin(stdin)
            .stdout(stdout)
            .spawn()
            .map_err(|source| ShellError::from_spawn(program, source))?;

        debug!(pid = inner.id(), %command, "spawned");
        let output = inner.stdout.take();
        Ok(Spawned {
            child: OsChild {
                program: program.clone(),
                inner,
            },
            output,
        })
    }

    fn wait(&mut self, mut child: OsChild) -> Result<ExitCode, ShellError> {
        let pid = child.id();
        let status = child.inner.wait().map_err(|source| ShellError::Wait {
            program: child.program.clone(),
            source,
        })?;
        let code = status.code().unwrap_or_else(|| terminated_by_signal(status));
        debug!(pid, program = %child.program, code, "reaped");
        Ok(code)
    }
}

fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = exit_status.signal() {
        128 + signal
    } else if exit_status.core_dumped() {
        255
    } else {
        -1
    }
}
