//! Backup and undo support for rewrite operations.
//!
//! Before a `fix` run mutates files, their original bytes can be copied into
//! `.unfurl-backup/<operation_id>/`, preserving relative paths, together with
//! a `manifest.json` describing each entry. Restore verifies content hashes
//! before putting anything back.

use crate::error::{Result, UnfurlError};
use crate::patch::compute_hash;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name backups live under, relative to the workspace root.
const BACKUP_DIR_NAME: &str = ".unfurl-backup";

/// Metadata about a backed-up file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupEntry {
    /// Original path of the file, relative to the workspace root.
    pub original_path: PathBuf,
    /// SHA-256 hash of the original file content.
    pub hash: String,
    /// Byte count of the original file.
    pub size: u64,
}

/// Manifest describing one backup operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupManifest {
    /// Unique identifier for this operation.
    pub operation_id: String,
    /// Version of the tool that wrote the backup.
    pub tool_version: String,
    /// Timestamp when the backup was created (RFC 3339).
    pub timestamp: String,
    /// Files that were backed up.
    pub files: Vec<BackupEntry>,
    /// Absolute path to the backup directory.
    #[serde(skip)]
    pub backup_dir: PathBuf,
}

impl BackupManifest {
    fn new(operation_id: String, backup_dir: PathBuf) -> Self {
        BackupManifest {
            operation_id,
            tool_version: crate::VERSION.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            files: Vec::new(),
            backup_dir,
        }
    }

    /// Save the manifest as `manifest.json` in the backup directory.
    pub fn save(&self) -> Result<()> {
        let manifest_path = self.backup_dir.join("manifest.json");
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| UnfurlError::Other(format!("Failed to serialize manifest: {}", e)))?;
        fs::write(&manifest_path, json).map_err(|e| UnfurlError::Io {
            path: manifest_path,
            source: e,
        })
    }

    /// Load a manifest from a file, re-deriving the backup directory from
    /// the manifest's own location.
    pub fn load(manifest_path: &Path) -> Result<Self> {
        let json = fs::read_to_string(manifest_path).map_err(|e| UnfurlError::Io {
            path: manifest_path.to_path_buf(),
            source: e,
        })?;

        let mut manifest: BackupManifest = serde_json::from_str(&json)
            .map_err(|e| UnfurlError::Other(format!("Failed to parse manifest: {}", e)))?;

        manifest.backup_dir = manifest_path
            .parent()
            .ok_or_else(|| UnfurlError::Other("Manifest has no parent directory".to_string()))?
            .to_path_buf();

        Ok(manifest)
    }
}

/// Writer that snapshots files before they are rewritten.
pub struct BackupWriter {
    manifest: BackupManifest,
    workspace_root: PathBuf,
}

impl BackupWriter {
    /// Create a writer rooted at `workspace_root`.
    ///
    /// `operation_id` names the backup directory; a fresh UUID v4 is
    /// generated when none is given.
    pub fn new(workspace_root: &Path, operation_id: Option<String>) -> Result<Self> {
        let op_id = operation_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let backup_dir = workspace_root.join(BACKUP_DIR_NAME).join(&op_id);

        fs::create_dir_all(&backup_dir).map_err(|e| UnfurlError::Io {
            path: backup_dir.clone(),
            source: e,
        })?;

        Ok(BackupWriter {
            manifest: BackupManifest::new(op_id, backup_dir),
            workspace_root: workspace_root.to_path_buf(),
        })
    }

    /// The operation ID naming this backup.
    pub fn operation_id(&self) -> &str {
        &self.manifest.operation_id
    }

    /// Path of the manifest file this writer will produce.
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest.backup_dir.join("manifest.json")
    }

    /// Snapshot one file into the backup directory.
    ///
    /// The file must live under the workspace root; its relative path is
    /// preserved inside the backup directory so restores land in place.
    pub fn snapshot(&mut self, file_path: &Path) -> Result<()> {
        let content = fs::read(file_path).map_err(|e| UnfurlError::Io {
            path: file_path.to_path_buf(),
            source: e,
        })?;

        let relative = file_path.strip_prefix(&self.workspace_root).map_err(|_| {
            UnfurlError::Other(format!(
                "File '{}' is not under workspace root '{}'",
                file_path.display(),
                self.workspace_root.display()
            ))
        })?;

        let backup_path = self.manifest.backup_dir.join(relative);
        if let Some(parent) = backup_path.parent() {
            fs::create_dir_all(parent).map_err(|e| UnfurlError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&backup_path, &content).map_err(|e| UnfurlError::Io {
            path: backup_path,
            source: e,
        })?;

        self.manifest.files.push(BackupEntry {
            original_path: relative.to_path_buf(),
            hash: compute_hash(&content),
            size: content.len() as u64,
        });

        Ok(())
    }

    /// Write the manifest and return its path.
    pub fn finalize(self) -> Result<PathBuf> {
        self.manifest.save()?;
        Ok(self.manifest.backup_dir.join("manifest.json"))
    }
}

/// Restore files from a backup manifest. Returns the number restored.
///
/// Every backup entry is hash-verified before anything is written back, so
/// a tampered or truncated backup never clobbers the workspace.
pub fn restore_from_manifest(manifest_path: &Path, workspace_root: &Path) -> Result<usize> {
    let manifest = BackupManifest::load(manifest_path)?;

    // Verify all entries first; restore is all-or-nothing per manifest.
    for entry in &manifest.files {
        let backup_path = manifest.backup_dir.join(&entry.original_path);
        let content = fs::read(&backup_path).map_err(|e| UnfurlError::Io {
            path: backup_path.clone(),
            source: e,
        })?;

        let actual_hash = compute_hash(&content);
        if actual_hash != entry.hash {
            return Err(UnfurlError::Other(format!(
                "Hash mismatch for {}: expected {}, got {}",
                entry.original_path.display(),
                entry.hash,
                actual_hash
            )));
        }
    }

    let mut restored = 0;
    for entry in &manifest.files {
        let backup_path = manifest.backup_dir.join(&entry.original_path);
        let original_path = workspace_root.join(&entry.original_path);

        let content = fs::read(&backup_path).map_err(|e| UnfurlError::Io {
            path: backup_path,
            source: e,
        })?;

        if let Some(parent) = original_path.parent() {
            fs::create_dir_all(parent).map_err(|e| UnfurlError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&original_path, &content).map_err(|e| UnfurlError::Io {
            path: original_path.clone(),
            source: e,
        })?;

        restored += 1;
    }

    Ok(restored)
}
