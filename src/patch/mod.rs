//! File-level rewrite harness with atomic writes and validation gates.
//!
//! This module provides byte-exact rewriting with:
//! - Atomic file replacement (write temp + fsync + rename)
//! - File hash tracking (before/after)
//! - Tree-sitter reparse gate and rescan gate
//! - Automatic rollback on any gate failure
//! - Preview mode that never touches the original file
//! - Glob-driven multi-file runs

mod backup;

pub use backup::{restore_from_manifest, BackupManifest, BackupWriter};

use crate::error::{Result, UnfurlError};
use crate::ingest::{extract_ruby_comments, is_ruby_source};
use crate::rewrite::{rewrite_directives, scan_directives, DirectiveConfig, Edit, EditSet, Finding};
use crate::validate::run_validation_gates;
use ropey::Rope;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Result summary for one rewritten file.
#[derive(Debug, Clone, Serialize)]
pub struct FileRewriteSummary {
    /// Path of the file.
    pub file: PathBuf,
    /// Offenses detected (one per rewritten directive).
    pub findings: Vec<Finding>,
    /// Whether the file content changed (or would change, in preview).
    pub changed: bool,
    /// SHA-256 before rewriting.
    pub before_hash: String,
    /// SHA-256 after rewriting.
    pub after_hash: String,
}

/// Preview metadata describing the diff a rewrite would produce.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewReport {
    /// The file that would be rewritten.
    pub file: String,
    /// 1-based line number where the change begins.
    pub line_start: usize,
    /// 1-based line number where the change ends.
    pub line_end: usize,
    /// Number of lines added by the rewrite.
    pub lines_added: usize,
    /// Number of lines removed by the rewrite.
    pub lines_removed: usize,
    /// Number of bytes inserted.
    pub bytes_added: usize,
    /// Number of bytes removed.
    pub bytes_removed: usize,
}

/// Configuration for a glob-driven rewrite run.
#[derive(Debug, Clone)]
pub struct RewriteRunConfig {
    /// Glob pattern for matching files (e.g. `app/**/*.rb`).
    pub glob_pattern: String,
    /// Directive syntax to detect.
    pub directive: DirectiveConfig,
    /// Whether to run validation gates after each file.
    pub validate: bool,
}

/// A per-file failure collected during a multi-file run.
#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    /// The file that failed.
    pub file: PathBuf,
    /// The error message.
    pub error: String,
}

/// Aggregate result of a glob-driven rewrite run.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteRunResult {
    /// Per-file summaries for files that were processed.
    pub summaries: Vec<FileRewriteSummary>,
    /// Total offenses detected across the run.
    pub findings_count: usize,
    /// Files that failed; failures do not abort the run.
    pub failures: Vec<RunFailure>,
}

/// Scan a single file for same-line directives without modifying it.
pub fn scan_file(file_path: &Path, config: &DirectiveConfig) -> Result<Vec<Finding>> {
    let source = read_file(file_path)?;
    let text = std::str::from_utf8(&source)?;

    let comments = extract_ruby_comments(file_path, &source)?;
    Ok(scan_directives(text, &comments, config)
        .iter()
        .map(|m| m.finding())
        .collect())
}

/// Scan all Ruby files matching a glob pattern.
///
/// Returns `(path, findings)` pairs in glob order, including files with no
/// findings. Non-Ruby files and directories are skipped.
pub fn scan_files(
    glob_pattern: &str,
    config: &DirectiveConfig,
) -> Result<Vec<(PathBuf, Vec<Finding>)>> {
    let mut reports = Vec::new();

    for path in ruby_files_matching(glob_pattern)? {
        let findings = scan_file(&path, config)?;
        reports.push((path, findings));
    }

    Ok(reports)
}

/// Rewrite one file's same-line directives into block form, with gates.
///
/// This function:
/// 1. Reads the file and computes its hash
/// 2. Extracts the comment stream and builds the edit set
/// 3. Applies the edits against the original buffer in memory
/// 4. Writes the result to a temp file, fsyncs, atomic rename
/// 5. Runs the reparse and rescan gates (unless `validate` is false)
/// 6. On any gate failure, rolls back atomically
///
/// A file with no qualifying directives is left untouched and reported as
/// unchanged.
pub fn rewrite_file_with_validation(
    file_path: &Path,
    config: &DirectiveConfig,
    validate: bool,
) -> Result<FileRewriteSummary> {
    // Step 1: Read original file and compute hash
    let original = read_file(file_path)?;
    let before_hash = compute_hash(&original);
    let text = std::str::from_utf8(&original)?;

    // Step 2: Detect and build edits
    let comments = extract_ruby_comments(file_path, &original)?;
    let rewrites = rewrite_directives(text, &comments, config);

    if rewrites.is_empty() {
        return Ok(FileRewriteSummary {
            file: file_path.to_path_buf(),
            findings: Vec::new(),
            changed: false,
            before_hash: before_hash.clone(),
            after_hash: before_hash,
        });
    }

    let findings: Vec<Finding> = rewrites.iter().map(|r| r.finding.clone()).collect();
    let edits: Vec<Edit> = rewrites.into_iter().flat_map(|r| r.edits).collect();
    let edit_set = EditSet::from_edits(file_path, edits, text)?;

    // Step 3: Apply against the original buffer
    let patched = edit_set.apply(text);

    // Step 4: Durable write
    write_atomic(file_path, patched.as_bytes(), "rewrite")?;

    // Step 5: Gates, with rollback on failure
    if validate {
        if let Err(e) = run_validation_gates(file_path, config) {
            log::warn!("Validation failed, rolling back rewrite: {:?}", e);

            if let Err(rollback_err) = write_atomic(file_path, &original, "rollback") {
                log::error!(
                    "Failed to restore {} during rollback: {}",
                    file_path.display(),
                    rollback_err
                );
            }
            return Err(e);
        }
    }

    // Step 6: Compute after hash and return
    let refreshed = read_file(file_path)?;
    let after_hash = compute_hash(&refreshed);

    Ok(FileRewriteSummary {
        file: file_path.to_path_buf(),
        findings,
        changed: true,
        before_hash,
        after_hash,
    })
}

/// Compute a rewrite without touching the original file.
///
/// The rewritten content is written to a scratch temp file and the gates run
/// there. Returns the summary (with the hash the file would have) and a
/// preview report describing the diff.
pub fn preview_rewrite(
    file_path: &Path,
    config: &DirectiveConfig,
) -> Result<(FileRewriteSummary, PreviewReport)> {
    let original = read_file(file_path)?;
    let before_hash = compute_hash(&original);
    let text = std::str::from_utf8(&original)?;

    let comments = extract_ruby_comments(file_path, &original)?;
    let rewrites = rewrite_directives(text, &comments, config);

    if rewrites.is_empty() {
        let summary = FileRewriteSummary {
            file: file_path.to_path_buf(),
            findings: Vec::new(),
            changed: false,
            before_hash: before_hash.clone(),
            after_hash: before_hash,
        };
        let report = empty_preview_report(file_path);
        return Ok((summary, report));
    }

    let findings: Vec<Finding> = rewrites.iter().map(|r| r.finding.clone()).collect();
    let edits: Vec<Edit> = rewrites.into_iter().flat_map(|r| r.edits).collect();
    let edit_set = EditSet::from_edits(file_path, edits, text)?;
    let patched = edit_set.apply(text);

    // Gate on a scratch copy so the original stays untouched.
    let mut scratch = tempfile::Builder::new()
        .suffix(".rb")
        .tempfile()
        .map_err(|e| UnfurlError::Io {
            path: file_path.to_path_buf(),
            source: e,
        })?;
    scratch.write_all(patched.as_bytes()).map_err(|e| UnfurlError::Io {
        path: scratch.path().to_path_buf(),
        source: e,
    })?;
    scratch.flush().map_err(|e| UnfurlError::Io {
        path: scratch.path().to_path_buf(),
        source: e,
    })?;
    run_validation_gates(scratch.path(), config)?;

    let report = compute_preview_report(file_path, text, &edit_set);
    let summary = FileRewriteSummary {
        file: file_path.to_path_buf(),
        findings,
        changed: true,
        before_hash,
        after_hash: compute_hash(patched.as_bytes()),
    };

    Ok((summary, report))
}

/// Rewrite every Ruby file matching a glob pattern.
///
/// Per-file failures are collected in the result rather than aborting the
/// run; an invalid glob pattern is fatal.
pub fn rewrite_files(run: &RewriteRunConfig) -> Result<RewriteRunResult> {
    let mut summaries = Vec::new();
    let mut failures = Vec::new();
    let mut findings_count = 0;

    for path in ruby_files_matching(&run.glob_pattern)? {
        log::debug!("Rewriting {}", path.display());

        match rewrite_file_with_validation(&path, &run.directive, run.validate) {
            Ok(summary) => {
                findings_count += summary.findings.len();
                summaries.push(summary);
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                failures.push(RunFailure {
                    file: path,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(RewriteRunResult {
        summaries,
        findings_count,
        failures,
    })
}

/// Expand a glob pattern to the Ruby files it matches, in glob order.
fn ruby_files_matching(pattern: &str) -> Result<Vec<PathBuf>> {
    let glob_paths = glob::glob(pattern)
        .map_err(|e| UnfurlError::Other(format!("Invalid glob pattern: {}", e)))?;

    let mut paths = Vec::new();
    for entry in glob_paths {
        let path =
            entry.map_err(|e| UnfurlError::Other(format!("Glob iteration error: {}", e)))?;

        if path.is_dir() || !is_ruby_source(&path) {
            continue;
        }
        paths.push(path);
    }

    Ok(paths)
}

fn compute_preview_report(file_path: &Path, source: &str, edit_set: &EditSet) -> PreviewReport {
    let rope = Rope::from_str(source);

    let line_start = edit_set
        .edits()
        .first()
        .map(|e| rope.byte_to_line(e.start) + 1)
        .unwrap_or(0);
    let line_end = edit_set
        .edits()
        .last()
        .map(|e| rope.byte_to_line(e.end) + 1)
        .unwrap_or(0);

    let lines_added = edit_set
        .edits()
        .iter()
        .map(|e| e.content.matches('\n').count())
        .sum();
    let lines_removed = edit_set
        .edits()
        .iter()
        .map(|e| source[e.start..e.end].matches('\n').count())
        .sum();

    PreviewReport {
        file: file_path.to_string_lossy().into_owned(),
        line_start,
        line_end,
        lines_added,
        lines_removed,
        bytes_added: edit_set.bytes_added(),
        bytes_removed: edit_set.bytes_removed(),
    }
}

fn empty_preview_report(file_path: &Path) -> PreviewReport {
    PreviewReport {
        file: file_path.to_string_lossy().into_owned(),
        line_start: 0,
        line_end: 0,
        lines_added: 0,
        lines_removed: 0,
        bytes_added: 0,
        bytes_removed: 0,
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| UnfurlError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Compute SHA-256 hash of file contents.
pub(crate) fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("{:x}", result)
}

fn write_atomic(file_path: &Path, content: &[u8], suffix: &str) -> Result<()> {
    let temp_path = temp_path_for(file_path, suffix)?;
    let mut temp_file = File::create(&temp_path).map_err(|e| UnfurlError::Io {
        path: temp_path.clone(),
        source: e,
    })?;
    temp_file.write_all(content).map_err(|e| UnfurlError::Io {
        path: temp_path.clone(),
        source: e,
    })?;
    temp_file.sync_all().map_err(|e| UnfurlError::Io {
        path: temp_path.clone(),
        source: e,
    })?;
    std::fs::rename(&temp_path, file_path).map_err(|e| UnfurlError::Io {
        path: file_path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

fn temp_path_for(file_path: &Path, suffix: &str) -> Result<PathBuf> {
    let file_dir = file_path
        .parent()
        .ok_or_else(|| UnfurlError::Other("File has no parent directory".to_string()))?;
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("tmp");
    Ok(file_dir.join(format!(".{}.{}.tmp", file_name, suffix)))
}
