use std::fmt::Display;
use std::process::Command;

use itertools::Itertools;

use crate::throttle::{LineThrottle, ProgressKind};

/// One prepared subprocess invocation: the executable, its argument
/// vector, and how its output lines should be throttled. Built fresh
/// from a configuration snapshot and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    progress: Option<ProgressKind>,
    gap: usize,
}

impl CommandSpec {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            progress: None,
            gap: 0,
        }
    }

    pub fn with_progress(mut self, kind: ProgressKind) -> Self {
        self.gap = kind.default_gap();
        self.progress = Some(kind);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn progress(&self) -> Option<ProgressKind> {
        self.progress
    }

    pub fn gap(&self) -> usize {
        self.gap
    }

    pub fn throttle(&self) -> LineThrottle {
        LineThrottle::new(self.progress, self.gap)
    }

    /// The line echoed to the log before the process starts.
    pub fn echo_line(&self) -> String {
        format!("command: {}", self)
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}",
            self.program,
            self.args.iter().join(" ")
        )
    }
}
