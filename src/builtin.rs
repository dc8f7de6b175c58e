use crate::command::{Command, Flow};
use crate::env::Environment;
use crate::error::ShellError;
use std::env;
use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing::debug;

/// Commands executed inside the interpreter process.
///
/// They mutate interpreter state (working directory, liveness), so they must
/// never run in a child. A built-in is recognized by its name alone and takes
/// its arguments verbatim: nothing after the name is treated as a flag.
pub(crate) trait BuiltinCommand: Sized {
    /// Name matched against the first token of a command.
    fn name() -> &'static str;

    /// Builds the command from the tokens following its name.
    fn from_args(args: &[&str]) -> Self;

    fn execute(self, out: &mut dyn Write, env: &mut Environment) -> Result<Flow, ShellError>;
}

/// Object-safe form of a parsed built-in, ready to run.
pub(crate) trait Builtin {
    fn run(self: Box<Self>, out: &mut dyn Write, env: &mut Environment) -> Flow;
}

impl<T: BuiltinCommand> Builtin for T {
    fn run(self: Box<Self>, out: &mut dyn Write, env: &mut Environment) -> Flow {
        match T::execute(*self, out, env) {
            Ok(flow) => flow,
            Err(e) => {
                debug!(error = ?e, builtin = T::name(), "builtin failed");
                let _ = writeln!(out, "{e}");
                Flow::Continue
            }
        }
    }
}

/// Creates a built-in from a tokenized command, if the name matches.
pub(crate) trait BuiltinFactory {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn Builtin>>;
}

pub(crate) struct Factory<T> {
    _phantom: PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T: BuiltinCommand + 'static> BuiltinFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn Builtin>> {
        if name != T::name() {
            return None;
        }
        Some(Box::new(T::from_args(args)))
    }
}

/// The built-in set: `cd` and `exit`.
pub(crate) struct Builtins {
    factories: Vec<Box<dyn BuiltinFactory>>,
}

impl Builtins {
    /// Returns the built-in named by `cmd[0]`, or `None` if `cmd` should be
    /// launched as a program.
    pub(crate) fn lookup(&self, cmd: &Command) -> Option<Box<dyn Builtin>> {
        let name = cmd.program()?;
        let args: Vec<&str> = cmd.args().iter().map(String::as_str).collect();
        self.factories
            .iter()
            .find_map(|factory| factory.try_create(name, &args))
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self {
            factories: vec![
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<Exit>::default()),
            ],
        }
    }
}

/// Change the current working directory.
/// If no target is provided, changes to the directory named by HOME.
/// Arguments after the first are ignored.
pub struct Cd {
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_args(args: &[&str]) -> Self {
        Cd {
            target: args.first().map(|t| t.to_string()),
        }
    }

    fn execute(self, _out: &mut dyn Write, env: &mut Environment) -> Result<Flow, ShellError> {
        let target = match self.target {
            Some(t) => PathBuf::from(t),
            None => match env.home() {
                Some(home) => home,
                None => return Ok(Flow::Continue),
            },
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir).map_err(|source| {
            ShellError::ChangeDirectory {
                path: new_dir.clone(),
                source,
            }
        })?;
        env::set_current_dir(&canonical).map_err(|source| ShellError::ChangeDirectory {
            path: canonical.clone(),
            source,
        })?;

        debug!(dir = %canonical.display(), "changed directory");
        env.current_dir = canonical;
        Ok(Flow::Continue)
    }
}

/// Exit the shell. Any arguments are ignored.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_args(_args: &[&str]) -> Self {
        Exit
    }

    fn execute(self, out: &mut dyn Write, _env: &mut Environment) -> Result<Flow, ShellError> {
        let _ = writeln!(out, "Exiting shell...");
        let _ = out.flush();
        Ok(Flow::Exit)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::INCORRECT_COMMAND;
    use std::env as stdenv;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Serializes tests that touch the process working directory.
    pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn test_env() -> Environment {
        Environment {
            current_dir: stdenv::current_dir().unwrap(),
        }
    }

    fn tokens(words: &[&str]) -> Command {
        Command::new(words.iter().map(|w| w.to_string()).collect())
    }

    #[test]
    fn test_lookup_recognizes_builtins_only() {
        let builtins = Builtins::default();
        assert!(builtins.lookup(&tokens(&["cd", "/tmp"])).is_some());
        assert!(builtins.lookup(&tokens(&["exit"])).is_some());
        assert!(builtins.lookup(&tokens(&["ls", "-l"])).is_none());
        assert!(builtins.lookup(&Command::default()).is_none());
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();
        let orig = stdenv::current_dir().unwrap();

        let mut env = test_env();
        let cmd = Cd {
            target: Some(canonical_temp.to_string_lossy().to_string()),
        };
        let flow = cmd.execute(&mut Vec::new(), &mut env).unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(fs::canonicalize(stdenv::current_dir().unwrap()).unwrap(), canonical_temp);
        assert_eq!(env.current_dir, canonical_temp);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_cd_missing_dir_reports_and_stays() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();

        let mut out = Vec::new();
        let flow = Box::new(Cd {
            target: Some("/definitely/missing".to_string()),
        })
        .run(&mut out, &mut env);

        assert_eq!(flow, Flow::Continue);
        assert_eq!(String::from_utf8(out).unwrap(), format!("{INCORRECT_COMMAND}\n"));
        assert_eq!(stdenv::current_dir().unwrap(), orig);
        assert_eq!(env.current_dir, orig);
    }

    #[test]
    fn test_cd_ignores_extra_arguments() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();
        let orig = stdenv::current_dir().unwrap();

        let path = canonical_temp.to_string_lossy().to_string();

        let mut env = test_env();
        let builtin = Builtins::default()
            .lookup(&tokens(&["cd", path.as_str(), "extra"]))
            .unwrap();
        builtin.run(&mut Vec::new(), &mut env);

        assert_eq!(env.current_dir, canonical_temp);
        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_exit_prints_farewell() {
        let mut env = test_env();
        let mut out = Vec::new();
        let flow = Builtins::default()
            .lookup(&tokens(&["exit"]))
            .unwrap()
            .run(&mut out, &mut env);

        assert_eq!(flow, Flow::Exit);
        assert_eq!(String::from_utf8(out).unwrap(), "Exiting shell...\n");
    }

    #[test]
    fn test_cd_takes_dash_argument_as_path() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();

        let mut out = Vec::new();
        let flow = Builtins::default()
            .lookup(&tokens(&["cd", "-nosuchdir"]))
            .unwrap()
            .run(&mut out, &mut env);

        assert_eq!(flow, Flow::Continue);
        assert_eq!(String::from_utf8(out).unwrap(), format!("{INCORRECT_COMMAND}\n"));
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_exit_ignores_arguments() {
        let lines: [&[&str]; 4] = [
            &["exit", "--now"],
            &["exit", "help"],
            &["exit", "--help"],
            &["exit", "1"],
        ];
        for line in lines {
            let mut env = test_env();
            let mut out = Vec::new();
            let flow = Builtins::default()
                .lookup(&tokens(line))
                .unwrap()
                .run(&mut out, &mut env);

            assert_eq!(flow, Flow::Exit, "{line:?}");
            assert_eq!(String::from_utf8(out).unwrap(), "Exiting shell...\n");
        }
    }
}
