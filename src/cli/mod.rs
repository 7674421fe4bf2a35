//! Command-line interface for Unfurl.
//!
//! This module handles argument parsing and user interface only.
//! NO rewrite logic is performed here.

use crate::rewrite::DirectiveConfig;
use clap::Parser;
use serde::Serialize;
use serde_json::Value;

/// Unfurl: span-safe rewriter for end-of-line rubocop directives.
#[derive(Parser, Debug)]
#[command(name = "unfurl")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_required = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit machine-readable JSON instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available Unfurl commands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Scan for end-of-line directives without modifying anything.
    ///
    /// Exits with status 1 when offenses are found.
    Check {
        /// Path to a single Ruby file.
        #[arg(short, long, required_unless_present = "glob")]
        file: Option<std::path::PathBuf>,

        /// Glob pattern selecting Ruby files (e.g. "app/**/*.rb").
        #[arg(short, long, conflicts_with = "file")]
        glob: Option<String>,

        /// Directive syntax overrides.
        #[command(flatten)]
        directive: DirectiveArgs,
    },

    /// Rewrite end-of-line directives into block form.
    Fix {
        /// Path to a single Ruby file.
        #[arg(short, long, required_unless_present = "glob")]
        file: Option<std::path::PathBuf>,

        /// Glob pattern selecting Ruby files (e.g. "app/**/*.rb").
        #[arg(short, long, conflicts_with = "file")]
        glob: Option<String>,

        /// Directive syntax overrides.
        #[command(flatten)]
        directive: DirectiveArgs,

        /// Run in preview mode without mutating the file.
        #[arg(long, conflicts_with = "glob")]
        preview: bool,

        /// Skip the reparse/rescan gates after rewriting.
        #[arg(long)]
        no_validate: bool,

        /// Create a backup before rewriting.
        #[arg(long)]
        create_backup: bool,

        /// Optional operation ID for the backup (auto-generated UUID if not provided).
        #[arg(long)]
        operation_id: Option<String>,
    },

    /// Restore files from a backup manifest.
    Undo {
        /// Path to the backup manifest file.
        #[arg(short, long)]
        manifest: std::path::PathBuf,
    },
}

/// Directive syntax overrides shared by check and fix.
#[derive(clap::Args, Debug)]
pub struct DirectiveArgs {
    /// Directive marker prefix (default "# rubocop:").
    #[arg(long, value_name = "PREFIX")]
    pub marker: Option<String>,

    /// Recognized action keyword, repeatable (default: disable, todo).
    #[arg(long = "action", value_name = "WORD")]
    pub actions: Vec<String>,
}

impl DirectiveArgs {
    /// Resolve the overrides against the default directive syntax.
    pub fn to_config(&self) -> DirectiveConfig {
        let mut config = DirectiveConfig::default();
        if let Some(marker) = &self.marker {
            config.marker = marker.clone();
        }
        if !self.actions.is_empty() {
            config.actions = self.actions.clone();
        }
        config
    }
}

/// Parse command-line arguments.
///
/// This function is the entry point for CLI argument parsing.
/// It returns the parsed Cli struct or exits on error.
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// JSON success payload for CLI responses.
#[derive(Serialize)]
pub struct CliSuccessPayload {
    /// Status indicator ("ok").
    pub status: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CliSuccessPayload {
    /// Construct a payload containing only the message.
    pub fn message_only(message: String) -> Self {
        Self {
            status: "ok",
            message,
            data: None,
        }
    }

    /// Construct a payload with structured data.
    pub fn with_data(message: String, data: Value) -> Self {
        Self {
            status: "ok",
            message,
            data: Some(data),
        }
    }
}

/// JSON error payload for CLI responses.
#[derive(Serialize)]
pub struct CliErrorPayload {
    /// Status indicator ("error").
    pub status: &'static str,
    /// Structured error details.
    pub error: ErrorDetails,
}

/// Details for a CLI error payload.
#[derive(Serialize)]
pub struct ErrorDetails {
    /// Error kind identifier (Parse, InvalidSpan, etc.).
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Optional file context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl CliErrorPayload {
    /// Build payload from an UnfurlError instance.
    pub fn from_error(error: &crate::UnfurlError) -> Self {
        CliErrorPayload {
            status: "error",
            error: ErrorDetails {
                kind: error.kind(),
                message: error.to_string(),
                file: error
                    .file_path()
                    .map(|path| path.to_string_lossy().to_string()),
            },
        }
    }
}
