//! Client tests against scripted in-process servers.

use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::net::{UnixDatagram, UnixListener};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use nix::sys::socket::{
    AddressFamily, Backlog, SockFlag, SockType, UnixAddr, bind, listen, socket,
};
use pwgr_proto::FrameError;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{ClientError, ProxyClient, UidClient};

struct ServerDir {
    dir: TempDir,
}

impl ServerDir {
    fn socket_path(&self) -> PathBuf {
        self.dir.path().join("server.sock")
    }
}

#[fixture]
fn server_dir() -> ServerDir {
    ServerDir {
        dir: TempDir::new().expect("temp dir"),
    }
}

/// Seqpacket server answering one connection with `reply` (or nothing).
fn seqpacket_server(path: &Path, reply: Option<Vec<u8>>) -> JoinHandle<Vec<u8>> {
    let fd = socket(
        AddressFamily::Unix,
        SockType::SeqPacket,
        SockFlag::SOCK_CLOEXEC,
        None,
    )
    .expect("socket");
    bind(fd.as_raw_fd(), &UnixAddr::new(path).expect("address")).expect("bind");
    listen(&fd, Backlog::new(4).expect("backlog")).expect("listen");
    let listener = UnixListener::from(fd);

    thread::spawn(move || {
        let (mut connection, _) = listener.accept().expect("accept");
        let mut request = vec![0; 256];
        let len = connection.read(&mut request).expect("read request");
        request.truncate(len);
        if let Some(bytes) = reply {
            connection.write_all(&bytes).expect("write reply");
        }
        request
    })
}

/// Datagram server answering one datagram with `reply`.
fn datagram_server(path: &Path, reply: Vec<u8>) -> JoinHandle<Vec<u8>> {
    let server = UnixDatagram::bind(path).expect("bind server");
    thread::spawn(move || {
        let mut request = vec![0; 256];
        let (len, peer) = server.recv_from(&mut request).expect("recv");
        request.truncate(len);
        server.send_to_addr(&reply, &peer).expect("reply");
        request
    })
}

#[rstest]
#[case::found(b"\0root".to_vec(), Some("root".to_owned()))]
#[case::missing(vec![1], None)]
fn proxy_lookup_uid(server_dir: ServerDir, #[case] reply: Vec<u8>, #[case] expected: Option<String>) {
    let path = server_dir.socket_path();
    let server = seqpacket_server(&path, Some(reply));

    let answer = ProxyClient::new(&path).lookup_uid(0x0102_0304).expect("lookup");

    assert_eq!(answer, expected);
    assert_eq!(server.join().expect("server"), vec![0, 4, 3, 2, 1]);
}

#[rstest]
#[case::member(vec![0, 1], Some(true))]
#[case::not_member(vec![0, 0], Some(false))]
#[case::missing_group(vec![1], None)]
fn proxy_membership(server_dir: ServerDir, #[case] reply: Vec<u8>, #[case] expected: Option<bool>) {
    let path = server_dir.socket_path();
    let server = seqpacket_server(&path, Some(reply));

    let answer = ProxyClient::new(&path)
        .user_is_member("alice", "staff")
        .expect("membership");

    assert_eq!(answer, expected);
    assert_eq!(server.join().expect("server"), b"\x01alice\0staff\0");
}

#[rstest]
fn proxy_reports_closed_connection(server_dir: ServerDir) {
    let path = server_dir.socket_path();
    let server = seqpacket_server(&path, None);

    let error = ProxyClient::new(&path).lookup_uid(0).expect_err("no reply");

    assert!(matches!(error, ClientError::NoReply), "{error}");
    server.join().expect("server");
}

#[rstest]
fn proxy_rejects_malformed_reply(server_dir: ServerDir) {
    let path = server_dir.socket_path();
    let server = seqpacket_server(&path, Some(vec![0, 7]));

    let error = ProxyClient::new(&path)
        .user_is_member("alice", "staff")
        .expect_err("bad membership byte");

    assert!(matches!(error, ClientError::Protocol(FrameError::MalformedFrame { .. })), "{error}");
    server.join().expect("server");
}

#[rstest]
fn proxy_rejects_names_with_nul_before_connecting(server_dir: ServerDir) {
    let error = ProxyClient::new(server_dir.socket_path())
        .user_is_member("ali\0ce", "staff")
        .expect_err("interior nul");

    assert!(matches!(error, ClientError::Protocol(FrameError::InteriorNul { .. })), "{error}");
}

#[rstest]
fn proxy_reports_missing_daemon(server_dir: ServerDir) {
    let error = ProxyClient::new(server_dir.socket_path())
        .lookup_uid(0)
        .expect_err("nothing listening");

    assert!(matches!(error, ClientError::Connect { .. }), "{error}");
}

#[rstest]
fn uid_client_round_trip(server_dir: ServerDir) {
    let path = server_dir.socket_path();
    let server = datagram_server(&path, b"\0daemon".to_vec());

    let client = UidClient::connect(&path).expect("connect");
    assert_eq!(client.lookup_uid(1).expect("lookup"), Some("daemon".to_owned()));
    assert_eq!(server.join().expect("server"), vec![0, 1, 0, 0, 0]);
}

#[rstest]
fn uid_client_times_out_when_daemon_is_silent(server_dir: ServerDir) {
    let path = server_dir.socket_path();
    let _silent = UnixDatagram::bind(&path).expect("bind silent server");

    let client = UidClient::connect(&path).expect("connect");
    client
        .set_timeout(Duration::from_millis(50))
        .expect("timeout");

    let error = client.lookup_uid(0).expect_err("timeout");
    assert!(matches!(error, ClientError::Timeout), "{error}");
}
