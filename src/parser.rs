use crate::command::{Command, CommandGroup};
use crate::lexer::{Tokenizer, trim};
use std::path::PathBuf;

/// Operator selected for a line.
///
/// Detection is plain substring containment with fixed precedence:
/// `>` first, then `##`, then `&&`, then `|`. Only one operator is honoured
/// per line; any other marker characters stay inside the arguments of the
/// resulting sub-commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// Output redirection (`cmd > file`).
    Redirect,
    /// Sequential separator (`##`).
    Sequential,
    /// Concurrent separator (`&&`).
    Concurrent,
    /// Pipeline separator (`|`).
    Pipe,
    /// No operator.
    Plain,
}

impl OperatorKind {
    pub const REDIRECT: &'static str = ">";
    pub const SEQUENTIAL: &'static str = "##";
    pub const CONCURRENT: &'static str = "&&";
    pub const PIPE: &'static str = "|";

    /// Classifies `line`; the first rule that matches wins.
    pub fn classify(line: &str) -> Self {
        if line.contains(Self::REDIRECT) {
            OperatorKind::Redirect
        } else if line.contains(Self::SEQUENTIAL) {
            OperatorKind::Sequential
        } else if line.contains(Self::CONCURRENT) {
            OperatorKind::Concurrent
        } else if line.contains(Self::PIPE) {
            OperatorKind::Pipe
        } else {
            OperatorKind::Plain
        }
    }
}

/// One line, classified and tokenized, ready to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Blank line.
    Empty,
    Plain(Command),
    Redirect { command: Command, target: PathBuf },
    /// `>` with nothing before or nothing after it.
    MalformedRedirect,
    Sequential(CommandGroup),
    Concurrent(CommandGroup),
    Pipeline(CommandGroup),
}

impl Statement {
    pub fn kind(&self) -> OperatorKind {
        match self {
            Statement::Empty | Statement::Plain(_) => OperatorKind::Plain,
            Statement::Redirect { .. } | Statement::MalformedRedirect => OperatorKind::Redirect,
            Statement::Sequential(_) => OperatorKind::Sequential,
            Statement::Concurrent(_) => OperatorKind::Concurrent,
            Statement::Pipeline(_) => OperatorKind::Pipe,
        }
    }
}

/// Splits `line` on `marker`, trims each member and drops the blank ones.
pub fn split_group(line: &str, marker: &str, tokenizer: &Tokenizer) -> CommandGroup {
    line.split(marker)
        .map(trim)
        .filter(|member| !member.is_empty())
        .map(|member| tokenizer.tokenize(member))
        .filter(|cmd| !cmd.is_empty())
        .collect()
}

/// Classifies and tokenizes one raw input line.
pub fn parse(line: &str, tokenizer: &Tokenizer) -> Statement {
    let line = trim(line);
    if line.is_empty() {
        return Statement::Empty;
    }

    match OperatorKind::classify(line) {
        OperatorKind::Redirect => {
            let Some((command, target)) = line.split_once(OperatorKind::REDIRECT) else {
                return Statement::MalformedRedirect;
            };
            let (command, target) = (trim(command), trim(target));
            if command.is_empty() || target.is_empty() {
                return Statement::MalformedRedirect;
            }
            Statement::Redirect {
                command: tokenizer.tokenize(command),
                target: PathBuf::from(target),
            }
        }
        OperatorKind::Sequential => {
            Statement::Sequential(split_group(line, OperatorKind::SEQUENTIAL, tokenizer))
        }
        OperatorKind::Concurrent => {
            Statement::Concurrent(split_group(line, OperatorKind::CONCURRENT, tokenizer))
        }
        OperatorKind::Pipe => Statement::Pipeline(split_group(line, OperatorKind::PIPE, tokenizer)),
        OperatorKind::Plain => Statement::Plain(tokenizer.tokenize(line)),
    }
}
