//! The platform filesystem adapter.
//!
//! Everything the session needs from the host filesystem goes through here:
//! stat results, deterministic directory listings, the Unix-style `LIST`
//! line rendering and the buffered write handle used by uploads. Paths are
//! UTF-8 at this boundary; `std::path` performs the UTF-16 conversion at the
//! OS boundary on Windows.

use super::error::{Error, ErrorKind};
use chrono::{DateTime, Datelike, Local, Timelike};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncWriteExt, BufWriter};

// Buffer size for streamed uploads.
const WRITE_BUF_SIZE: usize = 1024 * 1024;

// Owner/group shown in LIST lines. The server has no account mapping, so a
// fixed opaque label is used.
const LIST_OWNER: &str = "embftp";

// Hard-coded English month names; strftime-style output would depend on the
// host locale and break certain FTP clients.
const MONTH_NAMES: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// The coarse file type distinctions the command handlers care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// A regular file
    RegularFile,
    /// A directory
    Dir,
    /// Anything else (device, fifo, socket, ...)
    Other,
}

/// The result of stat-ing a path. An absent path still produces a value,
/// with [`FileStatus::is_ok`] returning `false`.
#[derive(Debug, Clone)]
pub struct FileStatus {
    path: PathBuf,
    is_ok: bool,
    file_type: FileType,
    len: u64,
    modified: Option<SystemTime>,
    #[cfg(unix)]
    mode: u32,
    #[cfg(not(unix))]
    readonly: bool,
}

impl FileStatus {
    /// Stats `path`, following symlinks.
    pub fn of(path: &Path) -> FileStatus {
        match std::fs::metadata(path) {
            Ok(meta) => {
                let file_type = if meta.is_dir() {
                    FileType::Dir
                } else if meta.is_file() {
                    FileType::RegularFile
                } else {
                    FileType::Other
                };
                FileStatus {
                    path: path.to_path_buf(),
                    is_ok: true,
                    file_type,
                    len: meta.len(),
                    modified: meta.modified().ok(),
                    #[cfg(unix)]
                    mode: {
                        use std::os::unix::fs::MetadataExt;
                        meta.mode()
                    },
                    #[cfg(not(unix))]
                    readonly: meta.permissions().readonly(),
                }
            }
            Err(_) => FileStatus {
                path: path.to_path_buf(),
                is_ok: false,
                file_type: FileType::Other,
                len: 0,
                modified: None,
                #[cfg(unix)]
                mode: 0,
                #[cfg(not(unix))]
                readonly: true,
            },
        }
    }

    /// `true` when the path exists and could be stat-ed.
    pub fn is_ok(&self) -> bool {
        self.is_ok
    }

    /// The file type. [`FileType::Other`] for absent paths.
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Size in bytes; zero for absent paths.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Tells whether a directory iterator can be opened on this path.
    pub fn can_open_dir(&self) -> bool {
        self.is_ok && self.file_type == FileType::Dir && std::fs::read_dir(&self.path).is_ok()
    }

    /// The nine-character `rwxrwxrwx` permission field for `LIST` output.
    pub fn permission_string(&self) -> String {
        if !self.is_ok {
            return "---------".to_string();
        }
        render_permissions(self)
    }

    /// The `LIST` time field: `MMM dd hh:mm` for entries modified in the
    /// current year, `MMM dd  yyyy` otherwise.
    pub fn time_string(&self) -> String {
        let modified = match self.modified {
            Some(t) => t,
            None => return "Jan  1  1970".to_string(),
        };
        let mtime: DateTime<Local> = modified.into();
        if mtime.year() == Local::now().year() {
            format!(
                "{}{:>3} {:>2}:{:02}",
                MONTH_NAMES[mtime.month0() as usize],
                mtime.day(),
                mtime.hour(),
                mtime.minute()
            )
        } else {
            format!("{}{:>3}  {}", MONTH_NAMES[mtime.month0() as usize], mtime.day(), mtime.year())
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        fn render_permissions(status: &FileStatus) -> String {
            let mut out = String::with_capacity(9);
            for shift in [6u32, 3, 0] {
                let bits = status.mode >> shift;
                out.push(if bits & 0b100 != 0 { 'r' } else { '-' });
                out.push(if bits & 0b010 != 0 { 'w' } else { '-' });
                out.push(if bits & 0b001 != 0 { 'x' } else { '-' });
            }
            out
        }
    } else {
        // Windows only models a read-only attribute.
        fn render_permissions(status: &FileStatus) -> String {
            if status.readonly {
                "r-xr-xr-x".to_string()
            } else {
                "rwxrwxrwx".to_string()
            }
        }
    }
}

/// Renders one `LIST` line (without the terminating CRLF) for a directory
/// entry.
pub fn list_line(name: &str, status: &FileStatus) -> String {
    format!(
        "{}{}   1 {:>10} {:>10} {:>10} {} {}",
        if status.file_type() == FileType::Dir { 'd' } else { '-' },
        status.permission_string(),
        LIST_OWNER,
        LIST_OWNER,
        status.len(),
        status.time_string(),
        name
    )
}

/// Reads a directory and stats every entry.
///
/// The result is keyed by entry name in a `BTreeMap`, which gives the
/// byte-wise lexicographic order `LIST` output is required to have.
pub fn dir_content(path: &Path) -> Result<BTreeMap<String, FileStatus>, Error> {
    let mut content = BTreeMap::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let status = FileStatus::of(&path.join(entry.file_name()));
        content.insert(name, status);
    }
    Ok(content)
}

/// How [`WritableFile::open`] treats an existing target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate an existing file, create a missing one.
    Truncate,
    /// Create a missing file; writes go to the end of an existing one.
    Append,
}

/// A buffered streaming write handle for uploads.
#[derive(Debug)]
pub struct WritableFile {
    inner: BufWriter<tokio::fs::File>,
}

impl WritableFile {
    /// Opens `path` for writing in the given mode. Failures are local
    /// errors: the target was already vetted by the caller's checks.
    pub async fn open(path: &Path, mode: WriteMode) -> Result<WritableFile, Error> {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true);
        match mode {
            WriteMode::Truncate => options.truncate(true),
            WriteMode::Append => options.append(true),
        };
        let file = options.open(path).await.map_err(|err| Error::new(ErrorKind::LocalError, err))?;
        Ok(WritableFile {
            inner: BufWriter::with_capacity(WRITE_BUF_SIZE, file),
        })
    }

    /// Copies `reader` to the file until EOF and flushes. Returns the number
    /// of bytes written.
    pub async fn write_stream<R>(&mut self, reader: &mut R) -> Result<u64, Error>
    where
        R: AsyncRead + Unpin,
    {
        let bytes = tokio::io::copy(reader, &mut self.inner)
            .await
            .map_err(|err| Error::new(ErrorKind::LocalError, err))?;
        self.inner.flush().await.map_err(|err| Error::new(ErrorKind::LocalError, err))?;
        Ok(bytes)
    }
}

/// Renames a file or directory. Fails when `to` exists on platforms that do
/// not overwrite; callers pre-check existence so the behavior is uniform.
pub fn rename(from: &Path, to: &Path) -> Result<(), Error> {
    std::fs::rename(from, to).map_err(|err| Error::new(ErrorKind::TransientFileNotAvailable, err))
}

/// Deletes a regular file.
pub fn remove_file(path: &Path) -> Result<(), Error> {
    std::fs::remove_file(path).map_err(|err| Error::new(ErrorKind::TransientFileNotAvailable, err))
}

/// Removes a directory; fails when it is not empty. RFC 959 treats
/// directory failures as permanent.
pub fn remove_dir(path: &Path) -> Result<(), Error> {
    std::fs::remove_dir(path).map_err(|err| Error::new(ErrorKind::PermanentFileNotAvailable, err))
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        /// Creates a directory, mode 0755.
        pub fn create_dir(path: &Path) -> Result<(), Error> {
            use std::os::unix::fs::DirBuilderExt;
            std::fs::DirBuilder::new()
                .mode(0o755)
                .create(path)
                .map_err(|err| Error::new(ErrorKind::PermanentFileNotAvailable, err))
        }
    } else {
        /// Creates a directory with the platform's default ACL.
        pub fn create_dir(path: &Path) -> Result<(), Error> {
            std::fs::create_dir(path).map_err(|err| Error::new(ErrorKind::PermanentFileNotAvailable, err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn stat_missing_path() {
        let status = FileStatus::of(Path::new("/definitely/not/here"));
        assert!(!status.is_ok());
        assert_eq!(status.file_type(), FileType::Other);
        assert_eq!(status.len(), 0);
        assert_eq!(status.permission_string(), "---------");
        assert!(!status.can_open_dir());
    }

    #[test]
    fn stat_file_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("hello.txt");
        std::fs::File::create(&file_path).unwrap().write_all(b"Hello World").unwrap();

        let file_status = FileStatus::of(&file_path);
        assert!(file_status.is_ok());
        assert_eq!(file_status.file_type(), FileType::RegularFile);
        assert_eq!(file_status.len(), 11);
        assert!(!file_status.can_open_dir());

        let dir_status = FileStatus::of(dir.path());
        assert_eq!(dir_status.file_type(), FileType::Dir);
        assert!(dir_status.can_open_dir());
    }

    #[test]
    fn dir_content_is_sorted_bytewise() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "A.txt", "c"] {
            std::fs::File::create(dir.path().join(name)).unwrap();
        }
        let content = dir_content(dir.path()).unwrap();
        let names: Vec<&String> = content.keys().collect();
        // Uppercase sorts before lowercase in byte order.
        assert_eq!(names, ["A.txt", "b.txt", "c"]);
    }

    #[test]
    fn list_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("hello.txt");
        std::fs::File::create(&file_path).unwrap().write_all(b"Hello World").unwrap();

        let line = list_line("hello.txt", &FileStatus::of(&file_path));
        assert!(line.starts_with('-'), "not a regular file line: {}", line);
        assert!(line.ends_with(" hello.txt"), "name missing: {}", line);
        assert!(line.contains("        11 "), "size field wrong: {}", line);

        let dir_line = list_line("sub", &FileStatus::of(dir.path()));
        assert!(dir_line.starts_with('d'), "not a dir line: {}", dir_line);
    }

    #[tokio::test]
    async fn append_mode_extends_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");

        let mut file = WritableFile::open(&path, WriteMode::Truncate).await.unwrap();
        file.write_stream(&mut &b"one"[..]).await.unwrap();
        drop(file);

        let mut file = WritableFile::open(&path, WriteMode::Append).await.unwrap();
        file.write_stream(&mut &b"two"[..]).await.unwrap();
        drop(file);

        assert_eq!(std::fs::read(&path).unwrap(), b"onetwo");

        let mut file = WritableFile::open(&path, WriteMode::Truncate).await.unwrap();
        file.write_stream(&mut &b"x"[..]).await.unwrap();
        drop(file);
        assert_eq!(std::fs::read(&path).unwrap(), b"x");
    }
}
