#![deny(missing_docs)]
//! An embeddable FTP server library for Rust
//!
//! embftp implements the RFC 959 / RFC 3659 command subset needed to expose a
//! directory tree on the local filesystem to FTP clients, in passive mode
//! only. A host application constructs a [`Server`], registers users with
//! per-user roots and permission masks, starts it on a worker pool of its
//! choosing and stops it on demand.
//!
//! # Quick Start
//!
//! ```no_run
//! use embftp::auth::Permissions;
//! use embftp::Server;
//!
//! let mut server = Server::new("127.0.0.1", 2121);
//! server.add_user_anonymous(std::env::temp_dir(), Permissions::READ_ONLY);
//! server.add_user("upload", "secret", "/srv/ftp/upload", Permissions::all());
//! server.start(2);
//! // ...
//! server.stop();
//! ```

pub mod auth;
pub(crate) mod server;
pub(crate) mod storage;

// Boxed dynamic errors carried as sources inside the library error types.
pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use crate::server::ftpserver::Server;
