use std::path::Path;

use dominstall_installer::InstallFs;
use dominstall_security::{is_executable_path, SignatureStatus, SignatureVerifier};
use tracing::warn;

/// Depth of a `--sigcheck` directory sweep, root level included.
pub(crate) const SIGCHECK_MAX_DEPTH: u32 = 10;

/// `0|<signer>|<path>`, `1|-|<path>` or `2|-|<path>|Signature Error|<message>`.
pub(crate) fn format_signature_line(path: &Path, status: &SignatureStatus) -> String {
    match status {
        SignatureStatus::Trusted { signer } => {
            format!("{}|{signer}|{}", status.code(), path.display())
        }
        SignatureStatus::Unsigned => format!("{}|-|{}", status.code(), path.display()),
        SignatureStatus::Error(message) => format!(
            "{}|-|{}|Signature Error|{message}",
            status.code(),
            path.display()
        ),
    }
}

pub(crate) fn format_check_line(path: &Path, status: &SignatureStatus) -> String {
    let detail = match status {
        SignatureStatus::Trusted { signer } => signer.as_str(),
        SignatureStatus::Unsigned => "not signed",
        SignatureStatus::Error(message) => message.as_str(),
    };
    format!("[{}] sign status: {} [{detail}]", path.display(), status.code())
}

/// Report lines for every executable below `root`, in listing order.
pub(crate) fn sweep_signatures(
    fs: &dyn InstallFs,
    verifier: &dyn SignatureVerifier,
    root: &Path,
    max_depth: u32,
) -> Vec<String> {
    let mut lines = Vec::new();
    sweep_level(fs, verifier, root, max_depth, &mut lines);
    lines
}

fn sweep_level(
    fs: &dyn InstallFs,
    verifier: &dyn SignatureVerifier,
    dir: &Path,
    depth: u32,
    lines: &mut Vec<String>,
) {
    if depth == 0 {
        return;
    }

    let entries = match fs.list_entries(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("cannot scan {}: {err}", dir.display());
            return;
        }
    };

    for entry in entries {
        let path = dir.join(&entry.name);
        if entry.is_dir {
            sweep_level(fs, verifier, &path, depth - 1, lines);
        } else if is_executable_path(&path) {
            let status = verifier.verify(&path);
            lines.push(format_signature_line(&path, &status));
        }
    }
}
