use anyhow::{Context, Result};
use dominstall_core::SoftwareDescriptor;
use std::io;
use std::path::Path;

use crate::fs::InstallFs;
use crate::RegistryLayout;

/// Reads an `install.ini`. A missing file is `Ok(None)`, not an error.
pub fn read_descriptor(fs: &dyn InstallFs, path: &Path) -> Result<Option<SoftwareDescriptor>> {
    let raw = match fs.read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read install descriptor: {}", path.display()));
        }
    };

    Ok(Some(SoftwareDescriptor::parse(&raw)))
}

pub fn read_installed_descriptors(
    fs: &dyn InstallFs,
    layout: &RegistryLayout,
) -> Result<Vec<SoftwareDescriptor>> {
    let root = layout.registry_root();
    let entries = match fs.list_entries(&root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read install registry: {}", root.display()));
        }
    };

    let mut descriptors = Vec::new();
    for entry in entries.into_iter().filter(|entry| entry.is_dir) {
        let path = layout.install_ini_for_entry(&entry.name);
        if let Some(descriptor) = read_descriptor(fs, &path)? {
            if !descriptor.name.is_empty() {
                descriptors.push(descriptor);
            }
        }
    }

    Ok(descriptors)
}
