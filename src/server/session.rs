//! Per-connection session state.
//!
//! One `Session` exists per control connection. All mutation happens from
//! the session's own control loop; the data channel only ever takes items
//! out (the pending listener) and reports back through the control channel
//! message queue.

use super::registry::SessionRegistry;
use crate::auth::User;
use crate::storage::path;
use std::fmt::{self, Formatter};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

// TraceId correlates all log statements of one session.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub struct TraceId(u64);

impl TraceId {
    pub fn new() -> Self {
        TraceId(rand::random())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

// The session shared via an asynchronous lock
pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

// This is where we keep the state for a ftp session.
#[derive(Debug)]
pub struct Session {
    pub trace_id: TraceId,
    // The account bound by a successful PASS. None before login.
    pub user: Option<Arc<User>>,
    // The username recorded by USER, consumed by the next PASS.
    pub username_for_login: Option<String>,
    // The verb of the last recognized command, for USER->PASS and
    // RNFR->RNTO sequencing. Unknown commands leave it untouched.
    pub last_verb: Option<&'static str>,
    // Virtual working directory; absolute, normalized, '/'-separated.
    pub cwd: String,
    // TYPE I was selected. Transfers are binary on the wire either way.
    pub binary_mode: bool,
    // Set by QUIT; the control loop closes the connection after flushing
    // the 221 reply.
    pub quit_requested: bool,
    // The source path remembered by RNFR, waiting for RNTO.
    pub rename_from: Option<String>,
    // The passive-mode listener opened by PASV. Consumed (at most once) by
    // the next transfer command.
    pub data_listener: Option<TcpListener>,
    registry: Arc<SessionRegistry>,
}

impl Session {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Session {
            trace_id: TraceId::new(),
            user: None,
            username_for_login: None,
            last_verb: None,
            cwd: "/".to_string(),
            binary_mode: false,
            quit_requested: false,
            rename_from: None,
            data_listener: None,
            registry,
        }
    }

    /// Makes a client-supplied path absolute in the virtual namespace,
    /// resolving it against the working directory.
    pub fn to_ftp_absolute(&self, input: &str) -> String {
        path::to_ftp_absolute(&self.cwd, input)
    }

    /// Maps a client-supplied path onto `user`'s local root. The result is
    /// guaranteed to stay inside the root.
    pub fn to_local_path(&self, user: &User, input: &str) -> PathBuf {
        path::to_local_path(user.local_root(), &self.to_ftp_absolute(input))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // The registry only holds a weak reference, so this cannot race a
        // resurrection; the entry is simply gone afterwards.
        self.registry.remove(self.trace_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Permissions, UserDatabase};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn path_translation_respects_cwd_and_root() {
        let registry = Arc::new(SessionRegistry::new());
        let mut session = Session::new(registry);
        let db = UserDatabase::new();
        db.add_user("u", "p", "/srv/ftp", Permissions::all());
        let user = db.get_user("u", "p").unwrap();

        assert_eq!(session.to_ftp_absolute("a.txt"), "/a.txt");
        session.cwd = "/sub".to_string();
        assert_eq!(session.to_ftp_absolute("a.txt"), "/sub/a.txt");
        assert_eq!(session.to_ftp_absolute("/b/c.txt"), "/b/c.txt");
        assert_eq!(session.to_ftp_absolute("../up.txt"), "/up.txt");

        let local = session.to_local_path(&user, "../../../escape.txt");
        assert!(local.starts_with(Path::new("/srv/ftp")));
    }
}
