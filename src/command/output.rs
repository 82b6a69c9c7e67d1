//! Printable results of commands.

use std::fmt;

use crate::merge::MergeOutcome;
use crate::repo::{LogEntry, StatusReport};
use crate::storage::CommitId;

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// nothing to print
    Silent,
    /// log or global-log entries
    Log(Vec<LogEntry>),
    /// commit ids, one per line
    Ids(Vec<CommitId>),
    /// status report
    Status(StatusReport),
    /// result of a merge
    Merge(MergeOutcome),
}

impl CommandOutput {
    pub fn is_silent(&self) -> bool {
        match self {
            CommandOutput::Silent => true,
            CommandOutput::Merge(outcome) => outcome.to_string().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutput::Silent => Ok(()),
            CommandOutput::Log(entries) => {
                for entry in entries {
                    writeln!(f, "{}", entry)?;
                }
                Ok(())
            }
            CommandOutput::Ids(ids) => {
                for id in ids {
                    writeln!(f, "{}", id)?;
                }
                Ok(())
            }
            CommandOutput::Status(report) => write!(f, "{}", report),
            CommandOutput::Merge(_) if self.is_silent() => Ok(()),
            CommandOutput::Merge(outcome) => writeln!(f, "{}", outcome),
        }
    }
}
