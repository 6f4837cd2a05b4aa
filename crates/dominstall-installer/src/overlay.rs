use std::path::{Path, PathBuf};

use dominstall_core::{parse_version, BuildNumber};
use tracing::debug;

use crate::fs::InstallFs;

pub const OVERLAY_DIR_MARKER: &str = "Release_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayMatch {
    pub path: PathBuf,
    pub build: BuildNumber,
}

#[derive(Debug)]
struct OverlayScan {
    target: BuildNumber,
    best: Option<OverlayMatch>,
}

impl OverlayScan {
    fn new(target: BuildNumber) -> Self {
        Self { target, best: None }
    }

    fn consider(&mut self, name: &str, path: PathBuf) {
        let Some(index) = name.find(OVERLAY_DIR_MARKER) else {
            return;
        };
        let build = parse_version(&name[index + OVERLAY_DIR_MARKER.len()..]).build;

        if build.is_unknown() {
            debug!("ignoring overlay {name}: version does not parse");
            return;
        }
        if build > self.target {
            debug!("ignoring overlay {name}: build {build} is newer than host {}", self.target);
            return;
        }
        if self.best.as_ref().is_some_and(|best| build <= best.build) {
            return;
        }

        self.best = Some(OverlayMatch { path, build });
    }
}

/// Picks the top-level `Release_<version>` directory with the highest build
/// that does not exceed `target_build`. Ties keep the first in listing order.
pub fn select_best_overlay(
    fs: &dyn InstallFs,
    root: &Path,
    target_build: BuildNumber,
) -> Option<OverlayMatch> {
    let entries = match fs.list_entries(root) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("cannot scan {} for overlays: {err}", root.display());
            return None;
        }
    };

    let mut scan = OverlayScan::new(target_build);
    for entry in entries.into_iter().filter(|entry| entry.is_dir) {
        let Some(name) = entry.name.to_str() else {
            continue;
        };
        scan.consider(name, root.join(&entry.name));
    }

    scan.best
}
