//! This module contains one command handler per supported FTP verb,
//! following the contracts of RFC 959 and RFC 3659 where the server
//! implements them.

mod appe;
mod cdup;
mod cwd;
mod dele;
mod feat;
mod list;
mod mkd;
mod nlst;
mod noop;
mod not_supported;
mod opts;
mod pass;
mod pasv;
mod pwd;
mod quit;
mod retr;
mod rmd;
mod rnfr;
mod rnto;
mod size;
mod stor;
mod syst;
mod type_;
mod user;

pub(super) use appe::Appe;
pub(super) use cdup::Cdup;
pub(super) use cwd::Cwd;
pub(super) use dele::Dele;
pub(super) use feat::Feat;
pub(super) use list::List;
pub(super) use mkd::Mkd;
pub(super) use nlst::Nlst;
pub(super) use noop::Noop;
pub(super) use not_supported::NotSupported;
pub(super) use opts::Opts;
pub(super) use pass::Pass;
pub(super) use pasv::Pasv;
pub(super) use pwd::Pwd;
pub(super) use quit::Quit;
pub(super) use retr::Retr;
pub(super) use rmd::Rmd;
pub(super) use rnfr::Rnfr;
pub(super) use rnto::Rnto;
pub(super) use size::Size;
pub(super) use stor::Stor;
pub(super) use syst::Syst;
pub(super) use type_::Type;
pub(super) use user::User;

use crate::server::controlchan::handler::CommandContext;
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::datachan::{DataCommand, DataTransfer};
use crate::storage::error::{Error, ErrorKind};
use tokio::net::TcpListener;

// Wraps a path in double quotes for the 257 replies of PWD and MKD,
// doubling any quote inside it.
pub(super) fn quote_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 2);
    out.push('"');
    for c in path.chars() {
        out.push(c);
        if c == '"' {
            out.push(c);
        }
    }
    out.push('"');
    out
}

// The one place a storage failure turns into a reply code. The message text
// stays with the command that failed.
pub(super) fn storage_error_reply(err: &Error, text: &str) -> Reply {
    let code = match err.kind() {
        ErrorKind::TransientFileNotAvailable => ReplyCode::TransientFileError,
        ErrorKind::PermanentFileNotAvailable | ErrorKind::PermissionDenied => ReplyCode::FileError,
        ErrorKind::LocalError => ReplyCode::LocalError,
    };
    Reply::new(code, text)
}

// Hands a consumed PASV listener to the data channel together with the
// payload description. The final reply arrives via the control channel
// message queue.
pub(super) async fn start_transfer(args: &CommandContext, listener: TcpListener, cmd: DataCommand) {
    let transfer = DataTransfer {
        listener,
        tx_control_chan: args.tx_control_chan.clone(),
        logger: args.logger.clone(),
        done_delay: args.data_done_delay,
        shutdown: args.shutdown_topic.subscribe().await,
    };
    transfer.spawn(cmd);
}

#[cfg(test)]
mod tests {
    use super::quote_path;
    use pretty_assertions::assert_eq;

    #[test]
    fn quoting_doubles_embedded_quotes() {
        assert_eq!(quote_path("/"), "\"/\"");
        assert_eq!(quote_path("/a b"), "\"/a b\"");
        assert_eq!(quote_path("/we\"ird"), "\"/we\"\"ird\"");
    }
}
