//! Contains the `Server` struct that is used to configure and control a FTP
//! server instance.

use crate::auth::{Permissions, UserDatabase};
use crate::server::controlchan::{self, LoopConfig};
use crate::server::registry::SessionRegistry;
use crate::server::shutdown;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket};

const DEFAULT_GREETING: &str = "Welcome to the embFTP server";
const SHUTDOWN_JOIN_TIMEOUT: Duration = Duration::from_secs(10);
const LISTEN_BACKLOG: u32 = 1024;

/// An embeddable FTP server.
///
/// The server exposes a sub-tree of the local filesystem per registered
/// user, in passive mode only. [`start`](Server::start) spawns the given
/// number of worker threads and returns; [`stop`](Server::stop) shuts the
/// workers down again. Both are plain blocking calls intended to be made
/// from ordinary (non-async) host code.
///
/// # Example
///
/// ```no_run
/// use embftp::auth::Permissions;
/// use embftp::Server;
///
/// let mut server = Server::new("127.0.0.1", 2121);
/// server.add_user_anonymous("/srv/ftp/pub", Permissions::READ_ONLY);
/// assert!(server.start(2));
/// // ...
/// server.stop();
/// ```
#[derive(Debug)]
pub struct Server {
    address: String,
    port: u16,
    greeting: &'static str,
    logger: slog::Logger,
    data_done_delay: Duration,
    users: Arc<UserDatabase>,
    registry: Arc<SessionRegistry>,
    running: Option<Running>,
}

#[derive(Debug)]
struct Running {
    runtime: tokio::runtime::Runtime,
    shutdown_topic: Arc<shutdown::Notifier>,
    bound_addr: SocketAddr,
}

impl Server {
    /// Creates a server that will listen on the given address and control
    /// port once started. Port `0` lets the operating system choose a free
    /// port; [`port`](Server::port) reports the chosen one after `start`.
    pub fn new<A: Into<String>>(address: A, port: u16) -> Self {
        Server {
            address: address.into(),
            port,
            greeting: DEFAULT_GREETING,
            logger: slog::Logger::root(slog::Discard, slog::o!()),
            data_done_delay: Duration::ZERO,
            users: Arc::new(UserDatabase::new()),
            registry: Arc::new(SessionRegistry::new()),
            running: None,
        }
    }

    /// Sets the greeting sent in the 220 reply when a client connects.
    pub fn greeting(mut self, greeting: &'static str) -> Self {
        self.greeting = greeting;
        self
    }

    /// Sets the structured logger that receives informational and error
    /// output. Defaults to discarding everything.
    pub fn logger<L: Into<Option<slog::Logger>>>(mut self, logger: L) -> Self {
        self.logger = logger.into().unwrap_or_else(|| slog::Logger::root(slog::Discard, slog::o!()));
        self
    }

    /// Interposes a pause between closing a data connection and sending the
    /// final 226 reply, for clients that race the close. Defaults to zero.
    pub fn data_done_delay(mut self, delay: Duration) -> Self {
        self.data_done_delay = delay;
        self
    }

    /// Registers an account with its own local root and permission mask.
    ///
    /// The names `""`, `"anonymous"` and `"ftp"` all denote the single
    /// anonymous slot, for which the password is ignored at login.
    ///
    /// Returns `false`, changing nothing, when the username is taken.
    pub fn add_user<P: Into<PathBuf>>(&self, username: &str, password: &str, local_root: P, permissions: Permissions) -> bool {
        let added = self.users.add_user(username, password, local_root, permissions);
        if !added {
            slog::error!(self.logger, "Error adding user \"{}\": the user already exists", username);
        }
        added
    }

    /// Registers the anonymous account FTP clients use for password-less
    /// access. Returns `false` when the anonymous slot is already taken.
    pub fn add_user_anonymous<P: Into<PathBuf>>(&self, local_root: P, permissions: Permissions) -> bool {
        self.add_user("anonymous", "", local_root, permissions)
    }

    /// Binds the control listener and spawns `n_threads` worker threads.
    ///
    /// Returns `false` after logging an error when the address cannot be
    /// resolved or bound, when `n_threads` is zero, or when the server is
    /// already running. Must not be called from inside an async runtime.
    pub fn start(&mut self, n_threads: usize) -> bool {
        if n_threads == 0 {
            slog::error!(self.logger, "Cannot start FTP server without worker threads");
            return false;
        }
        if self.running.is_some() {
            slog::error!(self.logger, "FTP server is already running");
            return false;
        }

        let ip: IpAddr = match self.address.parse() {
            Ok(ip) => ip,
            Err(err) => {
                slog::error!(self.logger, "Error creating address from string \"{}\": {}", self.address, err);
                return false;
            }
        };
        let bind_addr = SocketAddr::new(ip, self.port);

        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(n_threads)
            .thread_name("embftp-worker")
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                slog::error!(self.logger, "Error creating worker pool: {}", err);
                return false;
            }
        };

        let listener = match runtime.block_on(bind(bind_addr)) {
            Ok(listener) => listener,
            Err(err) => {
                slog::error!(self.logger, "Error binding control listener on {}: {}", bind_addr, err);
                return false;
            }
        };
        let bound_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(err) => {
                slog::error!(self.logger, "Error reading control listener address: {}", err);
                return false;
            }
        };

        let shutdown_topic = Arc::new(shutdown::Notifier::new());
        let config = LoopConfig {
            users: Arc::clone(&self.users),
            greeting: self.greeting,
            logger: self.logger.clone(),
            data_done_delay: self.data_done_delay,
            registry: Arc::clone(&self.registry),
            shutdown_topic: Arc::clone(&shutdown_topic),
        };
        let logger = self.logger.clone();
        let topic = Arc::clone(&shutdown_topic);
        runtime.spawn(async move {
            let mut shutdown_listener = topic.subscribe().await;
            loop {
                tokio::select! {
                    accepted = listener.accept() => match accepted {
                        Ok((tcp_stream, peer_addr)) => {
                            slog::info!(logger, "Incoming control connection from {}", peer_addr);
                            let session_shutdown = topic.subscribe().await;
                            if let Err(err) = controlchan::spawn_loop(config.clone(), tcp_stream, session_shutdown).await {
                                slog::error!(logger, "Could not spawn control loop for connection from {}: {:?}", peer_addr, err);
                            }
                        }
                        Err(err) => {
                            slog::error!(logger, "Error accepting incoming control connection: {}", err);
                        }
                    },
                    _ = shutdown_listener.listen() => {
                        slog::info!(logger, "Closing control listener");
                        break;
                    }
                }
            }
        });

        slog::info!(self.logger, "FTP server listening at {} on port {}", bound_addr.ip(), bound_addr.port());
        self.running = Some(Running {
            runtime,
            shutdown_topic,
            bound_addr,
        });
        true
    }

    /// Stops the server: the control listener closes, live sessions are
    /// torn down (control and data sockets included) and the worker threads
    /// are joined. A server that is not running is left alone.
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            let topic = Arc::clone(&running.shutdown_topic);
            running.runtime.block_on(async move {
                topic.notify().await;
                topic.linger().await;
            });
            running.runtime.shutdown_timeout(SHUTDOWN_JOIN_TIMEOUT);
            slog::info!(self.logger, "FTP server stopped");
        }
    }

    /// The number of currently live sessions.
    pub fn open_connection_count(&self) -> usize {
        self.registry.count()
    }

    /// The control port. After a successful `start` this is the actual
    /// bound port, which matters when the server was created with port `0`.
    pub fn port(&self) -> u16 {
        self.running.as_ref().map(|running| running.bound_addr.port()).unwrap_or(self.port)
    }

    /// The listen address. After a successful `start` this is the actual
    /// bound address.
    pub fn address(&self) -> String {
        self.running
            .as_ref()
            .map(|running| running.bound_addr.ip().to_string())
            .unwrap_or_else(|| self.address.clone())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
    }
}

// Binds with reuse-address set, the way long-running servers must.
async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(LISTEN_BACKLOG)
}
