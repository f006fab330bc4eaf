//! Barcode scanner capabilities.
//!
//! A scanner is only another way to fill the SKU field, so the session logic is
//! the same whether a SKU was typed or captured.

use std::collections::VecDeque;
use std::process::{Command, Stdio};

/// Capture one decoded SKU, or `None` if nothing was read.
pub trait SkuScanner {
    fn capture(&mut self) -> Option<String>;
}

/// Scanning disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoScanner;

impl SkuScanner for NoScanner {
    fn capture(&mut self) -> Option<String> {
        None
    }
}

/// Returns queued results in order, then `None`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedScanner {
    queue: VecDeque<Option<String>>,
}

impl ScriptedScanner {
    pub fn new<I, S>(results: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            queue: results.into_iter().map(|r| r.map(Into::into)).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl SkuScanner for ScriptedScanner {
    fn capture(&mut self) -> Option<String> {
        self.queue.pop_front().flatten()
    }
}

/// Runs an external decoder (e.g. `zbarcam --oneshot --raw`) and takes the first
/// non-blank line it prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandScanner {
    program: String,
    args: Vec<String>,
}

impl CommandScanner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line. `None` if it is blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SkuScanner for CommandScanner {
    fn capture(&mut self) -> Option<String> {
        let output = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(program = %self.program, error = %e, "scanner command failed to start");
                return None;
            }
        };

        if !output.status.success() {
            tracing::warn!(program = %self.program, status = %output.status, "scanner command failed");
            return None;
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    }
}
