use std::fmt;

/// A parsed control-channel command.
///
/// Parameters that the handler validates itself (`USER`, `CWD`, `RNTO`) may
/// be empty here; the verbs the server recognizes but does not support get
/// their own variants so that each can keep its historical reply.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    // Access control
    User {
        /// The login name, possibly empty.
        username: String,
    },
    Pass {
        /// The password; empty is fine for the anonymous account.
        password: String,
    },
    Cwd {
        /// The directory to change to, possibly empty.
        path: String,
    },
    Cdup,
    Quit,

    // Transfer parameters
    Pasv,
    Type {
        /// The raw type parameter; only `A` and `I` are accepted.
        param: String,
    },

    // Service commands
    Retr {
        path: String,
    },
    Stor {
        path: String,
    },
    Appe {
        path: String,
    },
    List {
        /// Raw parameter; flag words like `-la` are stripped by the handler.
        param: Option<String>,
    },
    Nlst {
        param: Option<String>,
    },
    Dele {
        path: String,
    },
    Rmd {
        path: String,
    },
    Mkd {
        path: String,
    },
    Pwd,
    Rnfr {
        path: String,
    },
    Rnto {
        /// The rename target, possibly empty.
        path: String,
    },
    Syst,
    Noop,

    // RFC 2389 / RFC 3659
    Feat,
    Opts {
        /// The raw option string, e.g. `UTF8 ON`.
        option: String,
    },
    Size {
        path: String,
    },

    // Recognized but unsupported
    Port,
    Stru,
    Mode,
    Rein,
    Acct,
    Allo,
    Rest,
    Abor,
    Stou,
    Site,
    Stat,
    Help,
}

impl Command {
    /// The wire verb of this command, used for sequencing bookkeeping.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::User { .. } => "USER",
            Command::Pass { .. } => "PASS",
            Command::Cwd { .. } => "CWD",
            Command::Cdup => "CDUP",
            Command::Quit => "QUIT",
            Command::Pasv => "PASV",
            Command::Type { .. } => "TYPE",
            Command::Retr { .. } => "RETR",
            Command::Stor { .. } => "STOR",
            Command::Appe { .. } => "APPE",
            Command::List { .. } => "LIST",
            Command::Nlst { .. } => "NLST",
            Command::Dele { .. } => "DELE",
            Command::Rmd { .. } => "RMD",
            Command::Mkd { .. } => "MKD",
            Command::Pwd => "PWD",
            Command::Rnfr { .. } => "RNFR",
            Command::Rnto { .. } => "RNTO",
            Command::Syst => "SYST",
            Command::Noop => "NOOP",
            Command::Feat => "FEAT",
            Command::Opts { .. } => "OPTS",
            Command::Size { .. } => "SIZE",
            Command::Port => "PORT",
            Command::Stru => "STRU",
            Command::Mode => "MODE",
            Command::Rein => "REIN",
            Command::Acct => "ACCT",
            Command::Allo => "ALLO",
            Command::Rest => "REST",
            Command::Abor => "ABOR",
            Command::Stou => "STOU",
            Command::Site => "SITE",
            Command::Stat => "STAT",
            Command::Help => "HELP",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
