//! Filesystem access for the FTP server: virtual path translation, the
//! platform adapter for metadata and directory listings, and the shared
//! read-only file cache.

pub(crate) mod error;
pub(crate) mod filesystem;
pub(crate) mod mapped;
pub(crate) mod path;
