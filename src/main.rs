use argh::FromArgs;
use hashshell::{Config, Interpreter, PipelineMode, signals};
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// Interactive shell with `>`, `##`, `&&` and `|` operators.
struct Options {
    #[argh(option, default = "Config::DEFAULT_MAX_ARGS")]
    /// maximum number of arguments kept per command; extra ones are dropped.
    max_args: usize,

    #[argh(option, default = "PipelineMode::default()")]
    /// pipeline wait strategy: `staged` or `concurrent`.
    pipeline: PipelineMode,

    #[argh(option, default = "String::from(\"$\")")]
    /// text printed after the working directory in the prompt.
    prompt_marker: String,

    #[argh(option, default = "String::from(\"warn\")")]
    /// log filter used when RUST_LOG is not set.
    log_level: String,
}

impl From<Options> for Config {
    fn from(options: Options) -> Self {
        Config {
            max_args: options.max_args,
            pipeline: options.pipeline,
            prompt_marker: options.prompt_marker,
        }
    }
}

fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let options: Options = argh::from_env();
    init_tracing(&options.log_level);

    // failure is already logged
    let _ = signals::install();

    Interpreter::new(options.into()).repl()
}
