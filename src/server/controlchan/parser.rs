use super::{error::ControlChanError, Command};

use std::str;

/// Parses one CRLF-terminated control-channel line into a [`Command`].
///
/// The verb is matched case-insensitively and canonicalized to upper case;
/// the remainder of the line is the parameter, passed through as UTF-8.
pub fn parse(line: &[u8]) -> Result<Command, ControlChanError> {
    let line = str::from_utf8(line)?;
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    let (verb, params) = match line.find(' ') {
        Some(pos) => (&line[..pos], &line[pos + 1..]),
        None => (line, ""),
    };
    let verb = verb.to_ascii_uppercase();
    let params = params.to_string();

    let cmd = match verb.as_str() {
        "USER" => Command::User { username: params },
        "PASS" => Command::Pass { password: params },
        "CWD" | "XCWD" => Command::Cwd { path: params },
        "CDUP" => Command::Cdup,
        "QUIT" => Command::Quit,
        "PASV" => Command::Pasv,
        "TYPE" => Command::Type { param: params },
        "RETR" => Command::Retr { path: required(params)? },
        "STOR" => Command::Stor { path: required(params)? },
        "APPE" => Command::Appe { path: required(params)? },
        "LIST" => Command::List { param: optional(params) },
        "NLST" => Command::Nlst { param: optional(params) },
        "DELE" => Command::Dele { path: required(params)? },
        "RMD" | "XRMD" => Command::Rmd { path: required(params)? },
        "MKD" | "XMKD" => Command::Mkd { path: required(params)? },
        "PWD" | "XPWD" => Command::Pwd,
        "RNFR" => Command::Rnfr { path: params },
        "RNTO" => Command::Rnto { path: params },
        "SYST" => Command::Syst,
        "NOOP" => Command::Noop,
        "FEAT" => Command::Feat,
        "OPTS" => Command::Opts { option: params },
        "SIZE" => Command::Size { path: required(params)? },
        "PORT" => Command::Port,
        "STRU" => Command::Stru,
        "MODE" => Command::Mode,
        "REIN" => Command::Rein,
        "ACCT" => Command::Acct,
        "ALLO" => Command::Allo,
        "REST" => Command::Rest,
        "ABOR" => Command::Abor,
        "STOU" => Command::Stou,
        "SITE" => Command::Site,
        "STAT" => Command::Stat,
        "HELP" => Command::Help,
        _ => return Err(ControlChanError::UnknownCommand { command: verb }),
    };
    Ok(cmd)
}

fn required(params: String) -> Result<String, ControlChanError> {
    if params.is_empty() {
        Err(ControlChanError::InvalidCommand)
    } else {
        Ok(params)
    }
}

fn optional(params: String) -> Option<String> {
    if params.is_empty() {
        None
    } else {
        Some(params)
    }
}
