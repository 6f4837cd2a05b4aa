use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    pub name: OsString,
    pub is_dir: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Truncate,
    Append,
}

pub trait InstallFs {
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<FsEntry>>;

    fn is_dir(&self, path: &Path) -> bool;

    fn create_dir_all(&self, dir: &Path) -> io::Result<()>;

    fn copy_file(&self, source: &Path, destination: &Path, overwrite: bool) -> io::Result<()>;

    fn delete_file(&self, path: &Path) -> io::Result<()>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn open_lines(&self, path: &Path) -> io::Result<Box<dyn BufRead>>;

    /// Opens an unbuffered log stream; every write reaches the file before
    /// the call returns.
    fn open_log(&self, path: &Path, mode: LogMode) -> io::Result<Box<dyn Write>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl InstallFs for StdFs {
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<FsEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            // Follows symlinks so linked directories are walked; the deployer's
            // depth bound keeps cycles finite.
            let is_dir = match fs::metadata(entry.path()) {
                Ok(metadata) => metadata.is_dir(),
                Err(_) => entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false),
            };
            entries.push(FsEntry {
                name: entry.file_name(),
                is_dir,
            });
        }
        entries.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(entries)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn copy_file(&self, source: &Path, destination: &Path, overwrite: bool) -> io::Result<()> {
        if !overwrite && destination.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination exists: {}", destination.display()),
            ));
        }
        fs::copy(source, destination).map(|_| ())
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn open_lines(&self, path: &Path) -> io::Result<Box<dyn BufRead>> {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }

    fn open_log(&self, path: &Path, mode: LogMode) -> io::Result<Box<dyn Write>> {
        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            LogMode::Truncate => options.write(true).truncate(true),
            LogMode::Append => options.append(true),
        };
        Ok(Box::new(options.open(path)?))
    }
}
