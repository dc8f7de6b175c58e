use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Diagnostic printed for unknown programs, failed `cd` and malformed redirections.
pub const INCORRECT_COMMAND: &str = "Shell: Incorrect command";

/// Failures observed while executing a line.
///
/// Each variant is reported where it occurs and never ends the read-eval loop.
/// The `Display` text is what the user sees.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The program could not be executed: missing, not executable, a bad path.
    #[error("Shell: Incorrect command")]
    CommandNotFound { program: String },

    /// The OS ran out of resources to create a child process.
    #[error("fork: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("wait: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Shell: Incorrect command")]
    ChangeDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `>` with no command before it or no file after it.
    #[error("Shell: Incorrect command")]
    MalformedRedirect,

    #[error("open: {}: {source}", .path.display())]
    RedirectTarget {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ShellError {
    /// Classifies a failed launch of `program`.
    ///
    /// Only resource exhaustion (`ENOMEM`, `EAGAIN`) is a fork failure.
    /// Anything else means the program itself could not be executed.
    pub fn from_spawn(program: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::OutOfMemory | io::ErrorKind::WouldBlock => ShellError::Spawn {
                program: program.to_string(),
                source,
            },
            _ => ShellError::CommandNotFound {
                program: program.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_incorrect_command() {
        let err = ShellError::from_spawn("nope", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, ShellError::CommandNotFound { .. }));
        assert_eq!(err.to_string(), INCORRECT_COMMAND);
    }

    #[test]
    fn test_resource_exhaustion_is_spawn_failure() {
        let err = ShellError::from_spawn("ls", io::Error::from(io::ErrorKind::OutOfMemory));
        assert!(matches!(err, ShellError::Spawn { .. }));
        assert!(err.to_string().starts_with("fork: "));
    }

    #[test]
    fn test_would_block_is_spawn_failure() {
        let err = ShellError::from_spawn("ls", io::Error::from(io::ErrorKind::WouldBlock));
        assert!(matches!(err, ShellError::Spawn { .. }));
    }

    #[test]
    fn test_other_exec_errors_are_incorrect_command() {
        for kind in [
            io::ErrorKind::PermissionDenied,
            io::ErrorKind::NotADirectory,
            io::ErrorKind::IsADirectory,
            io::ErrorKind::InvalidInput,
            io::ErrorKind::Other,
        ] {
            let err = ShellError::from_spawn("x", io::Error::from(kind));
            assert!(matches!(err, ShellError::CommandNotFound { .. }), "{kind:?}");
            assert_eq!(err.to_string(), INCORRECT_COMMAND);
        }
    }

    #[test]
    fn test_redirect_target_names_path() {
        let err = ShellError::RedirectTarget {
            path: PathBuf::from("/nope/out.txt"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("open: /nope/out.txt: "));
    }
}
