//! A small interactive command interpreter.
//!
//! Each input line is classified by the single operator it contains and run
//! as one of:
//! - a plain command or built-in (`cd`, `exit`),
//! - an output redirection (`cmd > file`),
//! - a sequential chain (`a ## b`),
//! - a concurrent batch (`a && b`),
//! - a pipeline (`a | b`).
//!
//! Operators are matched by substring with fixed precedence
//! (`>`, `##`, `&&`, `|`); see [`parser::OperatorKind`]. There is no quoting,
//! escaping or variable expansion.
//!
//! The entry point is [`Interpreter`]. Process creation is abstracted by
//! [`launcher::Launcher`] so orchestration can be exercised without spawning.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod interpreter;
pub mod launcher;
pub mod lexer;
pub mod parser;
pub mod signals;

pub use config::{Config, PipelineMode};
pub use error::ShellError;
pub use interpreter::Interpreter;
