use crate::builtin::Builtins;
use crate::command::{Command, ExitCode, Flow};
use crate::config::{Config, PipelineMode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::launcher::{Input, Launcher, OsLauncher, Output, Streams};
use crate::lexer::Tokenizer;
use crate::parser::{self, Statement};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use tracing::debug;

/// Reads lines, picks the operator they use and drives the child processes.
///
/// All process work goes through a [`Launcher`]; the default is
/// [`OsLauncher`].
///
/// Example
/// ```no_run
/// use hashshell::{Config, Interpreter};
/// let mut sh = Interpreter::new(Config::default());
/// sh.execute_line("echo a ## echo b", &mut std::io::stdout());
/// ```
pub struct Interpreter<L: Launcher = OsLauncher> {
    env: Environment,
    config: Config,
    tokenizer: Tokenizer,
    builtins: Builtins,
    launcher: L,
}

impl Interpreter<OsLauncher> {
    pub fn new(config: Config) -> Self {
        Self::with_launcher(config, OsLauncher)
    }
}

impl Default for Interpreter<OsLauncher> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<L: Launcher> Interpreter<L> {
    pub fn with_launcher(config: Config, launcher: L) -> Self {
        Self {
            env: Environment::new(),
            tokenizer: Tokenizer::new(config.max_args),
            config,
            builtins: Builtins::default(),
            launcher,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Working directory followed by the prompt marker.
    pub fn prompt(&self) -> String {
        format!(
            "{}{}",
            self.env.current_dir.display(),
            self.config.prompt_marker
        )
    }

    /// Interactive loop. Returns on end of input or `exit`.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new()?;
        let mut stdout = io::stdout();

        loop {
            match rl.readline(&self.prompt()) {
                Ok(line) => {
                    if self.execute_line(&line, &mut stdout) == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    writeln!(stdout)?;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }

    /// Parses and executes one raw line. Diagnostics go to `out`.
    pub fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> Flow {
        let statement = parser::parse(line, &self.tokenizer);
        debug!(kind = ?statement.kind(), "dispatch");
        self.execute(statement, out)
    }

    pub fn execute(&mut self, statement: Statement, out: &mut dyn Write) -> Flow {
        match statement {
            Statement::Empty => Flow::Continue,
            Statement::Plain(cmd) => self.run_command(&cmd, out),
            Statement::Redirect { command, target } => {
                self.run_redirected(&command, &target, out);
                Flow::Continue
            }
            Statement::MalformedRedirect => {
                report(out, ShellError::MalformedRedirect);
                Flow::Continue
            }
            Statement::Sequential(group) => self.run_sequential(&group, out),
            Statement::Concurrent(group) => self.run_concurrent(&group, out),
            Statement::Pipeline(stages) => {
                self.run_pipeline(&stages, out);
                Flow::Continue
            }
        }
    }

    /// Runs `cmd` as a built-in if it names one, otherwise launches it and waits.
    pub fn run_command(&mut self, cmd: &Command, out: &mut dyn Write) -> Flow {
        if cmd.is_empty() {
            return Flow::Continue;
        }
        if let Some(builtin) = self.builtins.lookup(cmd) {
            return builtin.run(out, &mut self.env);
        }
        self.run(cmd, out);
        Flow::Continue
    }

    /// Launches `cmd` with inherited streams and blocks until it exits.
    ///
    /// Returns `None` if the child could not be created or waited on.
    pub fn run(&mut self, cmd: &Command, out: &mut dyn Write) -> Option<ExitCode> {
        self.launch_and_wait(cmd, Streams::inherit(), out)
    }

    /// Like [`run`](Self::run) with standard output sent to `target`.
    ///
    /// The file is created or truncated with mode 0644. If it cannot be
    /// opened nothing is launched.
    pub fn run_redirected(
        &mut self,
        cmd: &Command,
        target: &Path,
        out: &mut dyn Write,
    ) -> Option<ExitCode> {
        let file = match open_truncated(target) {
            Ok(file) => file,
            Err(source) => {
                report(
                    out,
                    ShellError::RedirectTarget {
                        path: target.to_path_buf(),
                        source,
                    },
                );
                return None;
            }
        };

        let streams = Streams {
            stdin: Input::Inherit,
            stdout: Output::File(file),
        };
        self.launch_and_wait(cmd, streams, out)
    }

    /// Executes each member to completion before starting the next.
    pub fn run_sequential(&mut self, group: &[Command], out: &mut dyn Write) -> Flow {
        for cmd in group {
            if self.run_command(cmd, out) == Flow::Exit {
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    /// Launches every non-built-in member without waiting, then waits for all
    /// of them. Built-ins run inline as they are reached.
    ///
    /// `exit` returns at once; children already launched are left running.
    pub fn run_concurrent(&mut self, group: &[Command], out: &mut dyn Write) -> Flow {
        let mut outstanding = Vec::new();

        for cmd in group {
            if let Some(builtin) = self.builtins.lookup(cmd) {
                if builtin.run(out, &mut self.env) == Flow::Exit {
                    return Flow::Exit;
                }
                continue;
            }

            let _ = out.flush();
            match self.launcher.spawn(cmd, Streams::inherit()) {
                Ok(spawned) => outstanding.push(spawned.child),
                Err(e) => report(out, e),
            }
        }

        debug!(count = outstanding.len(), "waiting for concurrent batch");
        for child in outstanding {
            self.reap(child, out);
        }
        Flow::Continue
    }

    /// Connects each stage's output to the next stage's input.
    ///
    /// The first stage reads the interpreter's input and the last one writes to
    /// the interpreter's output. In [`PipelineMode::Staged`] each stage is
    /// waited on before the next is launched; in [`PipelineMode::Concurrent`]
    /// all stages are launched first.
    pub fn run_pipeline(&mut self, stages: &[Command], out: &mut dyn Write) {
        let last = stages.len().saturating_sub(1);
        let mut input = Input::Inherit;
        let mut running = Vec::new();

        for (i, stage) in stages.iter().enumerate() {
            let stdout = if i < last {
                Output::Channel
            } else {
                Output::Inherit
            };

            let _ = out.flush();
            match self.launcher.spawn(stage, Streams { stdin: input, stdout }) {
                Ok(spawned) => {
                    input = spawned.output.map_or(Input::Closed, Input::Channel);
                    match self.config.pipeline {
                        PipelineMode::Staged => {
                            self.reap(spawned.child, out);
                        }
                        PipelineMode::Concurrent => running.push(spawned.child),
                    }
                }
                Err(e) => {
                    report(out, e);
                    input = Input::Closed;
                }
            }
        }

        for child in running {
            self.reap(child, out);
        }
    }

    fn launch_and_wait(
        &mut self,
        cmd: &Command,
        streams: Streams<L::Channel>,
        out: &mut dyn Write,
    ) -> Option<ExitCode> {
        let _ = out.flush();
        match self.launcher.spawn(cmd, streams) {
            Ok(spawned) => self.reap(spawned.child, out),
            Err(ShellError::CommandNotFound { program }) => {
                report(out, ShellError::CommandNotFound { program });
                Some(0)
            }
            Err(e) => {
                report(out, e);
                None
            }
        }
    }

    fn reap(&mut self, child: L::Child, out: &mut dyn Write) -> Option<ExitCode> {
        match self.launcher.wait(child) {
            Ok(code) => Some(code),
            Err(e) => {
                report(out, e);
                None
            }
        }
    }
}

fn open_truncated(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)
}

/// Prints `err` for the user. OS-level failures go to standard error.
fn report(out: &mut dyn Write, err: ShellError) {
    debug!(error = ?err, "command failed");
    match err {
        ShellError::Spawn { .. } | ShellError::Wait { .. } | ShellError::RedirectTarget { .. } => {
            eprintln!("{err}");
        }
        _ => {
            let _ = writeln!(out, "{err}");
        }
    }
}
