//! Contains the in-memory user database consulted by the `PASS` command and
//! the permission bit-set that gates every filesystem operation.

use bitflags::bitflags;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

bitflags! {
    /// The things a user is allowed to do, or-ed together bit-wise.
    ///
    /// Every command that touches the filesystem checks one or more of these
    /// bits before doing anything. The bits are fully independent: granting
    /// `FILE_WRITE` without `FILE_DELETE` for example allows uploading new
    /// files but not overwriting existing ones.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Permissions: u32 {
        /// Download files (`RETR`, `SIZE`)
        const FILE_READ = 0b0_0000_0001;
        /// Upload new files (`STOR`, `APPE` on a new path)
        const FILE_WRITE = 0b0_0000_0010;
        /// Append to existing files (`APPE`)
        const FILE_APPEND = 0b0_0000_0100;
        /// Delete files, and overwrite them with `STOR`
        const FILE_DELETE = 0b0_0000_1000;
        /// Rename files (`RNFR`/`RNTO`)
        const FILE_RENAME = 0b0_0001_0000;
        /// List and enter directories (`LIST`, `NLST`, `CWD`, `CDUP`)
        const DIR_LIST = 0b0_0010_0000;
        /// Create directories (`MKD`)
        const DIR_CREATE = 0b0_0100_0000;
        /// Remove directories (`RMD`)
        const DIR_DELETE = 0b0_1000_0000;
        /// Rename directories (`RNFR`/`RNTO`)
        const DIR_RENAME = 0b1_0000_0000;
    }
}

impl Permissions {
    /// Download and list only; the classic read-only account.
    pub const READ_ONLY: Permissions = Permissions::FILE_READ.union(Permissions::DIR_LIST);
}

/// A registered account. Immutable once added to the [`UserDatabase`].
pub struct User {
    username: String,
    password: String,
    local_root: PathBuf,
    permissions: Permissions,
}

// Passwords stay out of logs and traces.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password", &"******")
            .field("local_root", &self.local_root)
            .field("permissions", &self.permissions)
            .finish()
    }
}

impl User {
    /// The name the user logs in with. Empty for the anonymous slot.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The local directory that acts as this user's virtual `/`.
    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    /// The permission bits granted at registration.
    pub fn permissions(&self) -> Permissions {
        self.permissions
    }
}

/// Tells whether a login name refers to the single anonymous slot.
///
/// The empty string, `"anonymous"` and `"ftp"` are the well-known names FTP
/// clients use for password-less access; all three map to one account.
pub fn is_anonymous(username: &str) -> bool {
    username.is_empty() || username == "anonymous" || username == "ftp"
}

/// A thread-safe map from username to account record.
///
/// Registration happens before the server starts; lookups happen on every
/// `PASS` command. Registered users cannot be changed or removed.
#[derive(Debug, Default)]
pub struct UserDatabase {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    named: HashMap<String, Arc<User>>,
    anonymous: Option<Arc<User>>,
}

impl UserDatabase {
    /// Creates an empty database.
    pub fn new() -> Self {
        UserDatabase::default()
    }

    /// Registers an account. Returns `false` when the username is already
    /// taken, or when it denotes the anonymous slot and that slot is filled.
    pub fn add_user<P: Into<PathBuf>>(&self, username: &str, password: &str, local_root: P, permissions: Permissions) -> bool {
        let mut inner = self.inner.lock().expect("user database mutex poisoned");
        let user = Arc::new(User {
            username: username.to_string(),
            password: password.to_string(),
            local_root: local_root.into(),
            permissions,
        });
        if is_anonymous(username) {
            if inner.anonymous.is_some() {
                return false;
            }
            inner.anonymous = Some(user);
            true
        } else {
            if inner.named.contains_key(username) {
                return false;
            }
            inner.named.insert(username.to_string(), user);
            true
        }
    }

    /// Looks up an account by credentials.
    ///
    /// The anonymous slot matches regardless of the supplied password; a
    /// named account only matches on an exact password match.
    pub fn get_user(&self, username: &str, password: &str) -> Option<Arc<User>> {
        let inner = self.inner.lock().expect("user database mutex poisoned");
        if is_anonymous(username) {
            inner.anonymous.clone()
        } else {
            inner.named.get(username).filter(|user| user.password == password).cloned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn permission_bits_are_independent() {
        let p = Permissions::FILE_WRITE | Permissions::DIR_LIST;
        assert!(p.contains(Permissions::FILE_WRITE));
        assert!(!p.contains(Permissions::FILE_DELETE));
        assert!(p.intersects(Permissions::FILE_READ | Permissions::DIR_LIST));
        assert_eq!(Permissions::READ_ONLY, Permissions::FILE_READ | Permissions::DIR_LIST);
        assert_eq!(Permissions::empty().bits(), 0);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let db = UserDatabase::new();
        assert!(db.add_user("alice", "a", "/tmp", Permissions::all()));
        assert!(!db.add_user("alice", "b", "/other", Permissions::empty()));
        // The original record is untouched.
        let user = db.get_user("alice", "a").unwrap();
        assert_eq!(user.local_root(), Path::new("/tmp"));
        assert_eq!(user.permissions(), Permissions::all());
    }

    #[test]
    fn anonymous_slot_is_shared_between_reserved_names() {
        let db = UserDatabase::new();
        assert!(db.add_user("anonymous", "", "/srv", Permissions::READ_ONLY));
        assert!(!db.add_user("ftp", "", "/srv", Permissions::READ_ONLY));
        assert!(!db.add_user("", "", "/srv", Permissions::READ_ONLY));
        // Any password matches the anonymous slot.
        for name in ["", "anonymous", "ftp"] {
            assert!(db.get_user(name, "whatever").is_some());
        }
    }

    #[test]
    fn named_lookup_requires_password_match() {
        let db = UserDatabase::new();
        assert!(db.add_user("bob", "hunter2", "/home/bob", Permissions::all()));
        assert!(db.get_user("bob", "hunter2").is_some());
        assert!(db.get_user("bob", "wrong").is_none());
        assert!(db.get_user("eve", "hunter2").is_none());
    }
}
