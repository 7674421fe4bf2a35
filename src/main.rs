//! Unfurl CLI binary
//!
//! This is the main entry point for the unfurl command-line interface.
//! The CLI is a thin adapter over existing APIs - NO logic is implemented here.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use unfurl::cli::{CliErrorPayload, CliSuccessPayload, Commands};
use unfurl::patch::{
    preview_rewrite, restore_from_manifest, rewrite_file_with_validation, rewrite_files,
    scan_file, scan_files, BackupWriter, RewriteRunConfig,
};
use unfurl::rewrite::DirectiveConfig;
use unfurl::{Result, UnfurlError};

/// What a command produced: a message, optional JSON data, and whether the
/// run found offenses (drives the exit status for `check`).
struct CommandOutcome {
    message: String,
    data: Option<serde_json::Value>,
    offending: bool,
}

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = unfurl::cli::parse_args();

    // Initialize logger if verbose
    if cli.verbose {
        env_logger::init();
    }

    // Execute command
    let result = match &cli.command {
        Commands::Check {
            file,
            glob,
            directive,
        } => execute_check(file.as_deref(), glob.as_deref(), &directive.to_config()),

        Commands::Fix {
            file,
            glob,
            directive,
            preview,
            no_validate,
            create_backup,
            operation_id,
        } => execute_fix(FixRequest {
            file: file.as_deref(),
            glob: glob.as_deref(),
            config: directive.to_config(),
            preview: *preview,
            validate: !*no_validate,
            create_backup: *create_backup,
            operation_id: operation_id.clone(),
        }),

        Commands::Undo { manifest } => execute_undo(manifest),
    };

    // Handle result
    match result {
        Ok(outcome) => {
            if cli.json {
                let payload = match outcome.data {
                    Some(data) => CliSuccessPayload::with_data(outcome.message, data),
                    None => CliSuccessPayload::message_only(outcome.message),
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&payload)
                        .unwrap_or_else(|_| "{\"status\":\"ok\"}".to_string())
                );
            } else {
                println!("{}", outcome.message);
            }

            if outcome.offending {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            if cli.json {
                let payload = CliErrorPayload::from_error(&e);
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(&payload)
                        .unwrap_or_else(|_| "{\"status\":\"error\"}".to_string())
                );
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::from(2)
        }
    }
}

/// Execute the check command: scan only, report findings.
fn execute_check(
    file: Option<&Path>,
    glob: Option<&str>,
    config: &DirectiveConfig,
) -> Result<CommandOutcome> {
    let reports = match (file, glob) {
        (Some(path), _) => vec![(path.to_path_buf(), scan_file(path, config)?)],
        (None, Some(pattern)) => scan_files(pattern, config)?,
        (None, None) => {
            return Err(UnfurlError::Other(
                "Either --file or --glob is required".to_string(),
            ))
        }
    };

    let mut lines = Vec::new();
    let mut total = 0;
    for (path, findings) in &reports {
        for finding in findings {
            total += 1;
            lines.push(format!("{}:{}: {}", path.display(), finding.line, finding.message));
        }
    }
    lines.push(format!(
        "{} offense(s) found in {} file(s)",
        total,
        reports.len()
    ));

    let data = Some(serde_json::Value::Array(
        reports
            .iter()
            .map(|(path, findings)| {
                serde_json::json!({
                    "file": path.display().to_string(),
                    "findings": findings,
                })
            })
            .collect(),
    ));

    Ok(CommandOutcome {
        message: lines.join("\n"),
        data,
        offending: total > 0,
    })
}

/// Arguments for the fix command.
struct FixRequest<'a> {
    file: Option<&'a Path>,
    glob: Option<&'a str>,
    config: DirectiveConfig,
    preview: bool,
    validate: bool,
    create_backup: bool,
    operation_id: Option<String>,
}

/// Execute the fix command.
///
/// This function is a thin adapter that:
/// 1. Optionally snapshots the affected files into a backup
/// 2. Applies the rewrite (or preview) through the patch API
/// 3. Formats the summary for the user
fn execute_fix(request: FixRequest<'_>) -> Result<CommandOutcome> {
    match (request.file, request.glob) {
        (Some(path), _) if request.preview => {
            let (summary, report) = preview_rewrite(path, &request.config)?;
            Ok(CommandOutcome {
                message: format!(
                    "Preview: {} directive(s) would be rewritten in {} (+{} -{} bytes)",
                    summary.findings.len(),
                    path.display(),
                    report.bytes_added,
                    report.bytes_removed
                ),
                data: Some(serde_json::json!({
                    "summary": summary,
                    "preview": report,
                })),
                offending: false,
            })
        }

        (Some(path), _) => {
            let manifest = if request.create_backup
                && !scan_file(path, &request.config)?.is_empty()
            {
                backup_files(&[path.to_path_buf()], request.operation_id)?
            } else {
                None
            };
            let summary = rewrite_file_with_validation(path, &request.config, request.validate)?;

            let mut message = format!(
                "Rewrote {} directive(s) in {}",
                summary.findings.len(),
                path.display()
            );
            if let Some(manifest_path) = &manifest {
                message.push_str(&format!("\nBackup manifest: {}", manifest_path.display()));
            }

            Ok(CommandOutcome {
                message,
                data: serde_json::to_value(&summary).ok(),
                offending: false,
            })
        }

        (None, Some(pattern)) => {
            let manifest = if request.create_backup {
                let affected: Vec<PathBuf> = scan_files(pattern, &request.config)?
                    .into_iter()
                    .filter(|(_, findings)| !findings.is_empty())
                    .map(|(path, _)| path)
                    .collect();
                backup_files(&affected, request.operation_id)?
            } else {
                None
            };

            let run = rewrite_files(&RewriteRunConfig {
                glob_pattern: pattern.to_string(),
                directive: request.config,
                validate: request.validate,
            })?;

            let changed = run.summaries.iter().filter(|s| s.changed).count();
            let mut message = format!(
                "Rewrote {} directive(s) across {} file(s) ({} failure(s))",
                run.findings_count,
                changed,
                run.failures.len()
            );
            if let Some(manifest_path) = &manifest {
                message.push_str(&format!("\nBackup manifest: {}", manifest_path.display()));
            }

            let offending = !run.failures.is_empty();
            Ok(CommandOutcome {
                message,
                data: serde_json::to_value(&run).ok(),
                offending,
            })
        }

        (None, None) => Err(UnfurlError::Other(
            "Either --file or --glob is required".to_string(),
        )),
    }
}

/// Execute the undo command: restore from a backup manifest.
fn execute_undo(manifest: &Path) -> Result<CommandOutcome> {
    let workspace_root = std::env::current_dir().map_err(|e| UnfurlError::Io {
        path: PathBuf::from("."),
        source: e,
    })?;

    let restored = restore_from_manifest(manifest, &workspace_root)?;

    Ok(CommandOutcome {
        message: format!("Restored {} file(s)", restored),
        data: None,
        offending: false,
    })
}

/// Snapshot the given files into a backup rooted at the current directory.
/// Returns the manifest path, or None when there is nothing to back up.
fn backup_files(files: &[PathBuf], operation_id: Option<String>) -> Result<Option<PathBuf>> {
    if files.is_empty() {
        return Ok(None);
    }

    let workspace_root = std::env::current_dir().map_err(|e| UnfurlError::Io {
        path: PathBuf::from("."),
        source: e,
    })?;

    let mut writer = BackupWriter::new(&workspace_root, operation_id)?;
    for path in files {
        // Relative CLI paths are resolved against the workspace root.
        let absolute = if path.is_absolute() {
            path.clone()
        } else {
            workspace_root.join(path)
        };
        writer.snapshot(&absolute)?;
    }
    Ok(Some(writer.finalize()?))
}
