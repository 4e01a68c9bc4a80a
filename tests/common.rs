#![allow(dead_code)]

use embftp::auth::Permissions;
use embftp::Server;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{IpAddr, Ipv4Addr, Shutdown, SocketAddr, TcpStream};
use std::path::Path;
use std::time::Duration;

const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

/// A started server rooted in a scratch directory that is cleaned up with
/// the fixture.
pub struct TestServer {
    pub server: Server,
    root: tempfile::TempDir,
}

impl TestServer {
    /// Starts a server with only the anonymous account, on an OS-chosen
    /// port.
    pub fn anonymous(permissions: Permissions) -> TestServer {
        let root = tempfile::tempdir().unwrap();
        let mut server = Server::new("127.0.0.1", 0);
        assert!(server.add_user_anonymous(root.path(), permissions));
        assert!(server.start(2));
        TestServer { server, root }
    }

    /// Starts a server with one named account.
    pub fn with_user(username: &str, password: &str, permissions: Permissions) -> TestServer {
        let root = tempfile::tempdir().unwrap();
        let mut server = Server::new("127.0.0.1", 0);
        assert!(server.add_user(username, password, root.path(), permissions));
        assert!(server.start(2));
        TestServer { server, root }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), self.server.port())
    }

    /// The directory served as the virtual `/`.
    pub fn root(&self) -> &Path {
        self.root.path()
    }
}

/// A blocking FTP control-channel client, just good enough for tests.
pub struct Client {
    reader: BufReader<TcpStream>,
}

impl Client {
    /// Connects and consumes the 220 banner.
    pub fn connect(addr: SocketAddr) -> Client {
        let stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(REPLY_TIMEOUT)).unwrap();
        let mut client = Client {
            reader: BufReader::new(stream),
        };
        let banner = client.read_reply();
        assert!(banner.starts_with("220 "), "unexpected banner: {}", banner);
        client
    }

    /// Sends one command line.
    pub fn send(&mut self, line: &str) {
        let stream = self.reader.get_mut();
        stream.write_all(line.as_bytes()).unwrap();
        stream.write_all(b"\r\n").unwrap();
    }

    /// Reads one CRLF-terminated reply line, without the line ending.
    pub fn read_reply(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        assert!(line.ends_with("\r\n"), "reply not CRLF terminated: {:?}", line);
        line.trim_end().to_string()
    }

    /// Sends a command and returns its single-line reply.
    pub fn cmd(&mut self, line: &str) -> String {
        self.send(line);
        self.read_reply()
    }

    /// Sends a command and collects a multi-line reply, e.g. FEAT. Returns
    /// all lines including the terminating `NNN ` line.
    pub fn cmd_multiline(&mut self, line: &str) -> Vec<String> {
        self.send(line);
        let first = self.read_reply();
        let mut lines = vec![first.clone()];
        if first.len() >= 4 && first.as_bytes()[3] == b'-' {
            let code = &first[..3].to_string();
            loop {
                let next = self.read_reply();
                let done = next.starts_with(code.as_str()) && next.as_bytes().get(3) == Some(&b' ');
                lines.push(next);
                if done {
                    break;
                }
            }
        }
        lines
    }

    pub fn login(&mut self, username: &str, password: &str) {
        let reply = self.cmd(&format!("USER {}", username));
        assert!(reply.starts_with("331 "), "USER: {}", reply);
        let reply = self.cmd(&format!("PASS {}", password));
        assert!(reply.starts_with("230 "), "PASS: {}", reply);
    }

    pub fn login_anonymous(&mut self) {
        self.login("anonymous", "anon@example.com");
    }

    /// Asserts that the server has closed its end of the connection.
    pub fn expect_eof(&mut self) {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).unwrap_or(0);
        assert_eq!(n, 0, "expected EOF, got: {:?}", line);
    }

    /// Issues PASV and returns the advertised data endpoint.
    pub fn pasv(&mut self) -> SocketAddr {
        let reply = self.cmd("PASV");
        assert!(reply.starts_with("227 "), "PASV: {}", reply);
        parse_pasv(&reply)
    }

    /// Uploads `content` at `path` through a fresh passive transfer.
    pub fn stor(&mut self, path: &str, content: &[u8]) {
        let data_addr = self.pasv();
        let mut data = TcpStream::connect(data_addr).unwrap();
        let reply = self.cmd(&format!("STOR {}", path));
        assert!(reply.starts_with("150 "), "STOR: {}", reply);
        data.write_all(content).unwrap();
        data.shutdown(Shutdown::Write).unwrap();
        let reply = self.read_reply();
        assert!(reply.starts_with("226 "), "STOR completion: {}", reply);
        drop(data);
    }

    /// Downloads `path` through a fresh passive transfer.
    pub fn retr(&mut self, path: &str) -> Vec<u8> {
        let data_addr = self.pasv();
        let mut data = TcpStream::connect(data_addr).unwrap();
        let reply = self.cmd(&format!("RETR {}", path));
        assert!(reply.starts_with("150 "), "RETR: {}", reply);
        let mut content = Vec::new();
        data.read_to_end(&mut content).unwrap();
        let reply = self.read_reply();
        assert!(reply.starts_with("226 "), "RETR completion: {}", reply);
        content
    }

    /// Fetches LIST output lines for `param` (pass `""` for the working
    /// directory).
    pub fn list(&mut self, param: &str) -> Vec<String> {
        let command = if param.is_empty() { "LIST".to_string() } else { format!("LIST {}", param) };
        self.transfer_lines(&command)
    }

    /// Fetches NLST output lines.
    pub fn nlst(&mut self, param: &str) -> Vec<String> {
        let command = if param.is_empty() { "NLST".to_string() } else { format!("NLST {}", param) };
        self.transfer_lines(&command)
    }

    fn transfer_lines(&mut self, command: &str) -> Vec<String> {
        let data_addr = self.pasv();
        let mut data = TcpStream::connect(data_addr).unwrap();
        let reply = self.cmd(command);
        assert!(reply.starts_with("150 "), "{}: {}", command, reply);
        let mut content = String::new();
        data.read_to_string(&mut content).unwrap();
        let reply = self.read_reply();
        assert!(reply.starts_with("226 "), "{} completion: {}", command, reply);
        content.split("\r\n").filter(|line| !line.is_empty()).map(str::to_string).collect()
    }
}

/// Extracts `h1.h2.h3.h4:(p1*256+p2)` from a 227 reply.
pub fn parse_pasv(line: &str) -> SocketAddr {
    let body = line
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(body, _)| body)
        .unwrap_or_else(|| panic!("malformed 227 reply: {}", line));
    let nums: Vec<u16> = body.split(',').map(|part| part.trim().parse().unwrap()).collect();
    assert_eq!(nums.len(), 6, "need 6 numbers in: {}", line);
    let ip = Ipv4Addr::new(nums[0] as u8, nums[1] as u8, nums[2] as u8, nums[3] as u8);
    SocketAddr::new(IpAddr::V4(ip), nums[4] * 256 + nums[5])
}
