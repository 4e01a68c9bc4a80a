//! The RNFR/RNTO two-step.

mod common;

use common::{Client, TestServer};
use embftp::auth::Permissions;
use pretty_assertions::assert_eq;

#[test]
fn rename_a_file() {
    let fixture = TestServer::anonymous(Permissions::all());
    std::fs::write(fixture.root().join("old.txt"), b"content").unwrap();

    let mut client = Client::connect(fixture.addr());
    client.login_anonymous();

    assert_eq!(client.cmd("RNFR /old.txt"), "350 Enter target name");
    assert_eq!(client.cmd("RNTO /new.txt"), "250 OK");

    assert!(!fixture.root().join("old.txt").exists());
    assert_eq!(std::fs::read(fixture.root().join("new.txt")).unwrap(), b"content");
}

#[test]
fn rename_never_overwrites() {
    let fixture = TestServer::anonymous(Permissions::all());
    std::fs::write(fixture.root().join("a.txt"), b"X").unwrap();
    std::fs::write(fixture.root().join("b.txt"), b"Y").unwrap();

    let mut client = Client::connect(fixture.addr());
    client.login_anonymous();

    assert_eq!(client.cmd("RNFR /a.txt"), "350 Enter target name");
    assert_eq!(client.cmd("RNTO /b.txt"), "450 Target path exists already.");

    // Both files keep their names and contents.
    assert_eq!(std::fs::read(fixture.root().join("a.txt")).unwrap(), b"X");
    assert_eq!(std::fs::read(fixture.root().join("b.txt")).unwrap(), b"Y");
}

#[test]
fn rename_there_and_back_restores_the_original() {
    let fixture = TestServer::anonymous(Permissions::all());
    std::fs::write(fixture.root().join("a.txt"), b"round trip").unwrap();

    let mut client = Client::connect(fixture.addr());
    client.login_anonymous();

    client.cmd("RNFR a.txt");
    assert_eq!(client.cmd("RNTO b.txt"), "250 OK");
    client.cmd("RNFR b.txt");
    assert_eq!(client.cmd("RNTO a.txt"), "250 OK");

    assert_eq!(std::fs::read(fixture.root().join("a.txt")).unwrap(), b"round trip");
    assert!(!fixture.root().join("b.txt").exists());
}

#[test]
fn rnto_requires_a_preceding_rnfr() {
    let fixture = TestServer::anonymous(Permissions::all());
    let mut client = Client::connect(fixture.addr());
    client.login_anonymous();
    assert_eq!(client.cmd("RNTO /b.txt"), "503 Please specify target file first");
}

#[test]
fn a_command_between_rnfr_and_rnto_resets_the_sequence() {
    let fixture = TestServer::anonymous(Permissions::all());
    std::fs::write(fixture.root().join("a.txt"), b"X").unwrap();

    let mut client = Client::connect(fixture.addr());
    client.login_anonymous();

    assert_eq!(client.cmd("RNFR /a.txt"), "350 Enter target name");
    client.cmd("NOOP");
    assert_eq!(client.cmd("RNTO /b.txt"), "503 Please specify target file first");
    assert!(fixture.root().join("a.txt").exists());
}

#[test]
fn one_rnfr_feeds_at_most_one_rnto() {
    let fixture = TestServer::anonymous(Permissions::all());
    std::fs::write(fixture.root().join("a.txt"), b"X").unwrap();

    let mut client = Client::connect(fixture.addr());
    client.login_anonymous();

    client.cmd("RNFR /a.txt");
    assert_eq!(client.cmd("RNTO /b.txt"), "250 OK");
    assert_eq!(client.cmd("RNTO /c.txt"), "503 Please specify target file first");
}

#[test]
fn rnfr_of_a_missing_file_fails() {
    let fixture = TestServer::anonymous(Permissions::all());
    let mut client = Client::connect(fixture.addr());
    client.login_anonymous();
    assert_eq!(client.cmd("RNFR /missing.txt"), "550 File does not exist");
}

#[test]
fn empty_rnto_target_is_a_parameter_error() {
    let fixture = TestServer::anonymous(Permissions::all());
    std::fs::write(fixture.root().join("a.txt"), b"X").unwrap();
    let mut client = Client::connect(fixture.addr());
    client.login_anonymous();
    client.cmd("RNFR /a.txt");
    assert_eq!(client.cmd("RNTO"), "501 No target name given");
}

#[test]
fn file_rename_permission_gates_files_but_not_dirs() {
    let fixture = TestServer::anonymous(Permissions::DIR_LIST | Permissions::DIR_RENAME);
    std::fs::write(fixture.root().join("f.txt"), b"X").unwrap();
    std::fs::create_dir(fixture.root().join("d")).unwrap();

    let mut client = Client::connect(fixture.addr());
    client.login_anonymous();

    // No FILE_RENAME: files are off limits.
    assert_eq!(client.cmd("RNFR /f.txt"), "550 Permission denied");

    // DIR_RENAME: directories work.
    assert_eq!(client.cmd("RNFR /d"), "350 Enter target name");
    assert_eq!(client.cmd("RNTO /e"), "250 OK");
    assert!(fixture.root().join("e").is_dir());
}
