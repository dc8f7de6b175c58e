use std::env as stdenv;
use std::path::PathBuf;

/// Interpreter-side view of the process environment.
///
/// `current_dir` mirrors the process working directory and is what the
/// prompt shows.
#[derive(Debug, Clone)]
pub struct Environment {
    pub current_dir: PathBuf,
}

impl Environment {
    /// Captures the working directory of the current process.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { current_dir }
    }

    /// Target of a bare `cd`, from the `HOME` variable.
    pub fn home(&self) -> Option<PathBuf> {
        stdenv::var_os("HOME").map(PathBuf::from)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::env as stdenv;
    use std::path::PathBuf;

    #[test]
    fn test_env_captures_working_directory() {
        let _lock = crate::builtin::tests::lock_current_dir();
        let env = Environment::new();
        assert_eq!(env.current_dir, stdenv::current_dir().unwrap());
    }

    #[test]
    fn test_home_follows_process_env() {
        let env = Environment::new();
        assert_eq!(env.home(), stdenv::var_os("HOME").map(PathBuf::from));
    }
}
