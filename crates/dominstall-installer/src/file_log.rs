use anyhow::{Context, Result};
use std::io::{self, BufRead, Split, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::fs::InstallFs;

pub const FILE_LOG_ERROR_PREFIX: &str = "ERROR:";

pub(crate) fn file_log_bytes(path: &Path) -> Option<&[u8]> {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        Some(path.as_os_str().as_bytes())
    }
    #[cfg(not(unix))]
    {
        path.to_str().map(str::as_bytes)
    }
}

/// Flushed before returning: the file-log is the only record a later
/// uninstall can replay. Unrepresentable paths are always logged as errors.
pub fn append_file_log_entry(writer: &mut dyn Write, path: &Path, ok: bool) -> io::Result<()> {
    match file_log_bytes(path) {
        Some(bytes) => {
            if !ok {
                writer.write_all(FILE_LOG_ERROR_PREFIX.as_bytes())?;
            }
            writer.write_all(bytes)?;
        }
        None => {
            writeln!(writer, "{FILE_LOG_ERROR_PREFIX}{}", path.display())?;
            return writer.flush();
        }
    }
    writer.write_all(b"\n")?;
    writer.flush()
}

pub fn read_file_log_paths(fs: &dyn InstallFs, path: &Path) -> Result<FileLogPaths> {
    let reader = fs
        .open_lines(path)
        .with_context(|| format!("failed to open file log: {}", path.display()))?;
    Ok(FileLogPaths {
        lines: reader.split(b'\n'),
    })
}

pub struct FileLogPaths {
    lines: Split<Box<dyn BufRead>>,
}

impl Iterator for FileLogPaths {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => {
                    warn!("stopped reading file log: {err}");
                    return None;
                }
            };
            let entry = trim_control(&line);
            if entry.is_empty() {
                continue;
            }
            match path_from_bytes(entry) {
                Some(path) => return Some(path),
                None => {
                    warn!(
                        "skipping undecodable file log entry: {}",
                        String::from_utf8_lossy(entry)
                    );
                }
            }
        }
    }
}

fn trim_control(line: &[u8]) -> &[u8] {
    match line.iter().position(|byte| *byte < 32) {
        Some(end) => &line[..end],
        None => line,
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> Option<PathBuf> {
    use std::os::unix::ffi::OsStrExt;
    Some(PathBuf::from(std::ffi::OsStr::from_bytes(bytes)))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> Option<PathBuf> {
    std::str::from_utf8(bytes).ok().map(PathBuf::from)
}
