use std::fmt;
use std::str::FromStr;

/// How a pipeline waits for its stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipelineMode {
    /// Wait for stage `i` before launching stage `i + 1`.
    ///
    /// A stage that writes more than the channel buffer holds blocks forever,
    /// since nothing drains the channel until it has exited.
    Staged,
    /// Launch every stage, then wait for all of them.
    #[default]
    Concurrent,
}

impl FromStr for PipelineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staged" => Ok(PipelineMode::Staged),
            "concurrent" => Ok(PipelineMode::Concurrent),
            other => Err(format!(
                "unknown pipeline mode `{other}`, expected `staged` or `concurrent`"
            )),
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineMode::Staged => "staged",
            PipelineMode::Concurrent => "concurrent",
        })
    }
}

/// Interpreter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of arguments kept per command.
    pub max_args: usize,
    pub pipeline: PipelineMode,
    /// Printed right after the working directory in the prompt.
    pub prompt_marker: String,
}

impl Config {
    pub const DEFAULT_MAX_ARGS: usize = 99;
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_args: Self::DEFAULT_MAX_ARGS,
            pipeline: PipelineMode::default(),
            prompt_marker: "$".to_string(),
        }
    }
}
