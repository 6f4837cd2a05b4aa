use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::audit::AuditLog;
use crate::file_log::read_file_log_paths;
use crate::fs::InstallFs;
use crate::types::UninstallReport;

pub fn uninstall_files(
    fs: &dyn InstallFs,
    file_log_path: &Path,
    audit: &mut AuditLog,
) -> UninstallReport {
    let mut report = UninstallReport::default();

    let paths = match read_file_log_paths(fs, file_log_path) {
        Ok(paths) => paths,
        Err(err) => {
            warn!("{err:#}");
            audit.line(format!("Cannot open: [{}]", file_log_path.display()));
            return report;
        }
    };
    report.file_log_found = true;

    for entry in paths {
        match fs.delete_file(&entry) {
            Ok(()) => {
                debug!("deleted {}", entry.display());
                report.removed += 1;
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("already gone: {}", entry.display());
                audit.line(format!("File not found: {}", entry.display()));
                report.missing += 1;
            }
            Err(err) => {
                warn!("cannot delete {}: {err}", entry.display());
                audit.line(format!("Cannot delete file: {}: {err}", entry.display()));
                report.failed += 1;
            }
        }
    }

    report
}
