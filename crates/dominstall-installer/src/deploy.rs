use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::audit::AuditLog;
use crate::file_log::{append_file_log_entry, file_log_bytes};
use crate::fs::InstallFs;
use crate::types::DeployReport;

/// Recursion bound for payload trees; guards against symlink cycles.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

pub struct TreeDeployer<'a> {
    fs: &'a dyn InstallFs,
    max_depth: u32,
}

impl<'a> TreeDeployer<'a> {
    pub fn new(fs: &'a dyn InstallFs, max_depth: u32) -> Self {
        Self { fs, max_depth }
    }

    /// Every attempted file gets one file-log line (`ERROR:`-prefixed when the
    /// copy failed). Copy failures are counted, not returned; the only error is
    /// a file-log that can no longer be written.
    pub fn deploy(
        &self,
        source: &Path,
        target: &Path,
        file_log: &mut dyn Write,
        audit: &mut AuditLog,
    ) -> Result<DeployReport> {
        let mut report = DeployReport::default();
        self.deploy_level(source, target, self.max_depth, file_log, audit, &mut report)?;
        Ok(report)
    }

    fn deploy_level(
        &self,
        source: &Path,
        target: &Path,
        depth: u32,
        file_log: &mut dyn Write,
        audit: &mut AuditLog,
        report: &mut DeployReport,
    ) -> Result<()> {
        if depth == 0 {
            debug!("depth limit reached at {}", source.display());
            return Ok(());
        }

        let entries = match self.fs.list_entries(source) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no payload tree at {}", source.display());
                return Ok(());
            }
            Err(err) => {
                warn!("cannot read payload directory {}: {err}", source.display());
                audit.line(format!("Error reading directory [{}]: {err}", source.display()));
                return Ok(());
            }
        };

        for entry in entries {
            let source_path = source.join(&entry.name);
            let target_path = target.join(&entry.name);

            if entry.is_dir {
                if let Err(err) = self.fs.create_dir_all(&target_path) {
                    warn!("cannot create directory {}: {err}", target_path.display());
                    audit.line(format!(
                        "Error creating directory [{}]: {err}",
                        target_path.display()
                    ));
                }
                self.deploy_level(&source_path, &target_path, depth - 1, file_log, audit, report)?;
                continue;
            }

            if file_log_bytes(&target_path).is_none() {
                warn!("skipping {}: path cannot be recorded", target_path.display());
                audit.line(format!(
                    "Error copying file [{}]: path cannot be recorded in the file log",
                    source_path.display()
                ));
                report.errors += 1;
                append_file_log_entry(file_log, &target_path, false).with_context(|| {
                    format!("failed to record {} in file log", target_path.display())
                })?;
                continue;
            }

            let copied = match self.fs.copy_file(&source_path, &target_path, true) {
                Ok(()) => {
                    debug!("copied {}", target_path.display());
                    report.copied += 1;
                    true
                }
                Err(err) => {
                    warn!(
                        "error copying file {} -> {}: {err}",
                        source_path.display(),
                        target_path.display()
                    );
                    audit.line(format!(
                        "Error copying file [{}] -> [{}]: {err}",
                        source_path.display(),
                        target_path.display()
                    ));
                    report.errors += 1;
                    false
                }
            };

            append_file_log_entry(file_log, &target_path, copied).with_context(|| {
                format!("failed to record {} in file log", target_path.display())
            })?;
        }

        Ok(())
    }
}
