//! Output formatting for CLI commands.
//!
//! Provides abstraction layer for outputting results in text or JSON format.

use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use svcs_core::{Commit, CommitOutcome, RestoreAction};

/// Result code for a command that did what was asked.
pub const RESULT_OK: u8 = 0;

/// Result code for a request refused because a precondition did not hold.
pub const RESULT_REJECTED: u8 = 1;

/// Result code for an unexpected failure.
pub const RESULT_FAILED: u8 = 2;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writer for command output with format abstraction.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    /// Create a new OutputWriter.
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            stdout: io::stdout(),
        }
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Write output using the configured format.
    ///
    /// The `data` parameter must be a serializable struct that includes
    /// `success: bool` and `result_code: u8` fields.
    ///
    /// The `text_fn` closure is called only in text mode to generate the
    /// human-readable output.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                writeln!(&self.stdout, "{}", json)?;
            }
            OutputFormat::Text => {
                let text = text_fn();
                if !text.is_empty() {
                    write!(&self.stdout, "{}", text)?;
                }
            }
        }
        Ok(())
    }

    /// Report a refused request.
    ///
    /// Text mode prints `message` on stdout like any other command output.
    pub fn reject(&self, message: &str) -> Result<()> {
        let data = MessageOutput {
            success: false,
            result_code: RESULT_REJECTED,
            message: message.to_string(),
        };
        self.write(&data, || format!("{}\n", message))
    }

    /// Write an error message to stderr.
    ///
    /// In JSON mode, writes a JSON error object with success=false.
    /// In text mode, writes the error message directly.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code,
                    error: format!("{:#}", error),
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(io::stderr(), "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = writeln!(io::stderr(), "Error: {:#}", error);
            }
        }
    }
}

// ============================================================================
// Data Transfer Objects (DTOs) for JSON output
// ============================================================================

/// Error output structure.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

/// Output for refused requests and unknown commands.
#[derive(Debug, Serialize)]
pub struct MessageOutput {
    pub success: bool,
    pub result_code: u8,
    pub message: String,
}

/// One command in the usage summary.
#[derive(Debug, Serialize)]
pub struct CommandInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// Output for the usage summary.
#[derive(Debug, Serialize)]
pub struct HelpOutput {
    pub success: bool,
    pub result_code: u8,
    pub commands: Vec<CommandInfo>,
}

/// Output for `config` command.
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub success: bool,
    pub result_code: u8,
    pub username: String,
}

/// Output for `add <path>`.
#[derive(Debug, Serialize)]
pub struct AddOutput {
    pub success: bool,
    pub result_code: u8,
    pub name: String,
    pub already_tracked: bool,
}

/// Output for `add` without a path.
#[derive(Debug, Serialize)]
pub struct TrackedOutput {
    pub success: bool,
    pub result_code: u8,
    pub files: Vec<String>,
}

/// Output for `commit` command.
#[derive(Debug, Serialize)]
pub struct CommitOutput {
    pub success: bool,
    pub result_code: u8,
    #[serde(flatten)]
    pub outcome: CommitOutcome,
}

/// Output for `log` command. Commits are listed newest first.
#[derive(Debug, Serialize)]
pub struct LogOutput {
    pub success: bool,
    pub result_code: u8,
    pub commits: Vec<Commit>,
}

/// What checkout did to one tracked file.
#[derive(Debug, Clone, Serialize)]
pub struct RestoredFile {
    pub name: String,
    pub action: RestoreAction,
}

/// Output for `checkout` command.
#[derive(Debug, Serialize)]
pub struct CheckoutOutput {
    pub success: bool,
    pub result_code: u8,
    pub commit: String,
    pub files: Vec<RestoredFile>,
}
