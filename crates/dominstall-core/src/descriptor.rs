use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::version::{parse_version, ParsedVersion};

/// Product identity as declared by an `install.ini` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SoftwareDescriptor {
    pub name: String,
    pub version: String,
    pub description: String,
    pub vendor: String,
}

impl SoftwareDescriptor {
    /// Reads `key=value` lines. Keys are matched case-sensitively against
    /// `name`, `version`, `description` and `vendor`; everything else is
    /// ignored. Lines without `=` are skipped and later keys win.
    pub fn parse(raw: &str) -> Self {
        let mut descriptor = Self::default();

        for line in raw.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value_before_control(value);
            match key {
                "name" => descriptor.name = value.to_string(),
                "version" => descriptor.version = value.to_string(),
                "description" => descriptor.description = value.to_string(),
                "vendor" => descriptor.vendor = value.to_string(),
                _ => {}
            }
        }

        descriptor
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.version.is_empty()
            && self.description.is_empty()
            && self.vendor.is_empty()
    }

    pub fn parsed_version(&self) -> ParsedVersion {
        parse_version(&self.version)
    }

    /// A payload descriptor must carry a usable name and a version before
    /// anything is touched on disk.
    pub fn ensure_installable(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(anyhow!("no install configuration found: install.ini has no name"));
        }
        validate_product_name(&self.name)?;
        if self.version.is_empty() {
            return Err(anyhow!("no software version found for '{}'", self.name));
        }
        Ok(())
    }
}

/// Product names become a directory under the registry root, so they must
/// stay a single path component.
pub fn validate_product_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(anyhow!("invalid product name: must not be empty"));
    }
    if name.len() > 255 {
        return Err(anyhow!("invalid product name: longer than 255 bytes"));
    }
    if name == "." || name == ".." {
        return Err(anyhow!("invalid product name: '{name}'"));
    }
    if name
        .chars()
        .any(|ch| ch == '/' || ch == '\\' || ch.is_control())
    {
        return Err(anyhow!(
            "invalid product name: '{}' contains a path separator or control character",
            name.escape_debug()
        ));
    }
    Ok(())
}

fn value_before_control(value: &str) -> &str {
    match value.find(|ch: char| (ch as u32) < 32) {
        Some(end) => &value[..end],
        None => value,
    }
}
