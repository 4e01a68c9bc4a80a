//! Pure path normalization.
//!
//! FTP paths are always POSIX style with `/` as the virtual root. These
//! functions resolve `.` and `..` components textually, never touching the
//! filesystem, so that a client-supplied path can be mapped onto a user's
//! local root without any possibility of escaping it.

use std::path::{Path, PathBuf};

/// Resolves `.` and `..` components and collapses separator runs.
///
/// When `windows_style` is set both `/` and `\` separate components and a
/// drive letter (`C:`) or UNC host (`\\host`, `//host`) can form the root.
/// A `..` at an absolute root is dropped (there is nothing above the root);
/// in a relative path unresolvable `..` components are kept. The empty path
/// yields `"."`.
pub fn clean_path(path: &str, windows_style: bool, output_sep: char) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let root = detect_root(path, windows_style);
    let rest = &path[root.len()..];

    let is_sep = |c: char| c == '/' || (windows_style && c == '\\');

    let mut components: Vec<&str> = Vec::new();
    for component in rest.split(is_sep) {
        match component {
            "" | "." => {}
            ".." => {
                if !root.is_empty() {
                    // There is an absolute root, so ".." can never climb
                    // above it.
                    components.pop();
                } else if matches!(components.last(), Some(&last) if last != "..") {
                    components.pop();
                } else {
                    components.push("..");
                }
            }
            other => components.push(other),
        }
    }

    if components.is_empty() && root.is_empty() {
        return ".".to_string();
    }

    let mut out = String::with_capacity(path.len());
    out.push_str(root);
    if windows_style && !root.is_empty() {
        // A drive or UNC host must be followed by a separator.
        out.push(output_sep);
    }
    let mut first = true;
    for component in components {
        if !first {
            out.push(output_sep);
        }
        first = false;
        out.push_str(component);
    }
    out
}

/// Normalizes using the conventions of the platform this runs on.
pub fn clean_path_native(path: &str) -> String {
    if cfg!(windows) {
        clean_path(path, true, '\\')
    } else {
        clean_path(path, false, '/')
    }
}

// Returns the absolute-root prefix of `path`, or "" for a relative path.
fn detect_root(path: &str, windows_style: bool) -> &str {
    if windows_style {
        let bytes = path.as_bytes();
        // Local drive: letter followed by a colon.
        if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
            return &path[..2];
        }
        // UNC host: two (back)slashes followed by a host name.
        if bytes.len() > 2 && (bytes[0] == b'/' || bytes[0] == b'\\') && (bytes[1] == b'/' || bytes[1] == b'\\') && bytes[2] != b'/' && bytes[2] != b'\\' {
            let host_end = path[2..].find(&['/', '\\'][..]).map(|i| i + 2).unwrap_or(path.len());
            return &path[..host_end];
        }
        ""
    } else if path.starts_with('/') {
        "/"
    } else {
        ""
    }
}

/// Turns a client-supplied path into an absolute virtual path.
///
/// A path that does not start with `/` is taken relative to `working_dir`.
/// The result is normalized POSIX form; any `..` that would climb above the
/// virtual root is swallowed by [`clean_path`].
pub fn to_ftp_absolute(working_dir: &str, input: &str) -> String {
    if input.starts_with('/') {
        clean_path(input, false, '/')
    } else {
        clean_path(&format!("{}/{}", working_dir, input), false, '/')
    }
}

/// Maps an absolute virtual path onto a user's local root.
///
/// `ftp_absolute` must come out of [`to_ftp_absolute`], which guarantees it
/// is absolute and free of `..`, so the joined result cannot leave `root`.
pub fn to_local_path(root: &Path, ftp_absolute: &str) -> PathBuf {
    let joined = format!("{}/{}", root.display(), ftp_absolute);
    PathBuf::from(clean_path_native(&joined))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_path_posix() {
        assert_eq!(clean_path("", false, '/'), ".");
        assert_eq!(clean_path("/", false, '/'), "/");
        assert_eq!(clean_path("/foo/bar", false, '/'), "/foo/bar");
        assert_eq!(clean_path("/foo//bar/", false, '/'), "/foo/bar");
        assert_eq!(clean_path("/foo/./bar", false, '/'), "/foo/bar");
        assert_eq!(clean_path("/foo/../bar", false, '/'), "/bar");
        assert_eq!(clean_path("/../../bar", false, '/'), "/bar");
        assert_eq!(clean_path("/..", false, '/'), "/");
        assert_eq!(clean_path("foo/..", false, '/'), ".");
        assert_eq!(clean_path("a/b/../../..", false, '/'), "..");
        assert_eq!(clean_path("../a", false, '/'), "../a");
        assert_eq!(clean_path("..//../a/./b", false, '/'), "../../a/b");
    }

    #[test]
    fn clean_path_windows() {
        assert_eq!(clean_path("C:\\foo\\bar", true, '\\'), "C:\\foo\\bar");
        assert_eq!(clean_path("c:/foo/../bar", true, '\\'), "c:\\bar");
        assert_eq!(clean_path("C:\\..\\..", true, '\\'), "C:\\");
        assert_eq!(clean_path("\\\\host\\share\\..\\x", true, '\\'), "\\\\host\\x");
        assert_eq!(clean_path("//host/share", true, '\\'), "//host\\share");
        assert_eq!(clean_path("foo\\bar\\..", true, '\\'), "foo");
    }

    #[test]
    fn clean_path_is_idempotent() {
        for input in ["/a/../b/./c//", "../../x", "C:/a/../b", "", "/"] {
            let once = clean_path(input, false, '/');
            assert_eq!(clean_path(&once, false, '/'), once);
        }
    }

    #[test]
    fn ftp_absolute_resolution() {
        assert_eq!(to_ftp_absolute("/", ""), "/");
        assert_eq!(to_ftp_absolute("/", "foo.txt"), "/foo.txt");
        assert_eq!(to_ftp_absolute("/sub", "foo.txt"), "/sub/foo.txt");
        assert_eq!(to_ftp_absolute("/sub", "/abs/x"), "/abs/x");
        assert_eq!(to_ftp_absolute("/sub", ".."), "/");
        assert_eq!(to_ftp_absolute("/", "../../etc/passwd"), "/etc/passwd");
    }

    #[test]
    fn local_mapping_stays_under_root() {
        let root = Path::new("/srv/ftp");
        let virt = to_ftp_absolute("/", "/../hello.txt");
        assert_eq!(virt, "/hello.txt");
        let local = to_local_path(root, &virt);
        assert!(local.starts_with(root), "{:?} escaped the root", local);
        assert_eq!(local, PathBuf::from(clean_path_native("/srv/ftp/hello.txt")));
    }
}
