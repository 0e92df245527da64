//! Unit tests for the Unix socket channels.

use std::cell::RefCell;
use std::fs;
use std::io::{self, Read, Write};
use std::os::unix::net::{UnixDatagram, UnixListener};

use pwgr_proto::FrameBuffer;
use rstest::{fixture, rstest};

use super::{Channel, ChannelError, DatagramChannel, SeqPacketChannel, Served, TransportError};
use crate::dispatch::FrameHandler;
use crate::tests::support::{TempEndpoint, bound_datagram_client, connect_seqpacket};

/// Echoes every frame back with a leading marker byte and records it.
#[derive(Default)]
struct EchoHandler {
    seen: RefCell<Vec<Vec<u8>>>,
    silent: bool,
}

impl FrameHandler for EchoHandler {
    fn handle_frame(&self, frame: &[u8]) -> Option<FrameBuffer> {
        self.seen.borrow_mut().push(frame.to_vec());
        if self.silent {
            return None;
        }
        let mut reply = FrameBuffer::new();
        reply.push(b'>').expect("fits");
        reply.extend(frame).expect("fits");
        Some(reply)
    }
}

#[fixture]
fn endpoint() -> TempEndpoint {
    TempEndpoint::new()
}

#[rstest]
fn datagram_reply_goes_to_sender(endpoint: TempEndpoint) {
    let mut channel = DatagramChannel::bind(endpoint.endpoint()).expect("bind");
    let client = bound_datagram_client(&endpoint, "client.sock");
    client.send_to(b"ping", endpoint.path()).expect("send");

    let handler = EchoHandler::default();
    assert_eq!(channel.serve_one(&handler).expect("serve"), Served::Handled);

    let mut reply = [0_u8; 16];
    let len = client.recv(&mut reply).expect("reply");
    assert_eq!(reply.get(..len), Some(&b">ping"[..]));
}

#[rstest]
fn datagram_from_unbound_sender_is_handled_without_reply(endpoint: TempEndpoint) {
    let mut channel = DatagramChannel::bind(endpoint.endpoint()).expect("bind");
    let client = UnixDatagram::unbound().expect("unbound client");
    client.send_to(b"ping", endpoint.path()).expect("send");

    let handler = EchoHandler::default();
    assert_eq!(channel.serve_one(&handler).expect("serve"), Served::Handled);
    assert_eq!(handler.seen.borrow().as_slice(), [b"ping".to_vec()]);
}

#[rstest]
fn zero_length_datagram_reports_peer_closed(endpoint: TempEndpoint) {
    let mut channel = DatagramChannel::bind(endpoint.endpoint()).expect("bind");
    let client = bound_datagram_client(&endpoint, "client.sock");
    client.send_to(&[], endpoint.path()).expect("send");

    let handler = EchoHandler::default();
    assert_eq!(channel.serve_one(&handler).expect("serve"), Served::PeerClosed);
    assert!(handler.seen.borrow().is_empty());
}

#[rstest]
fn reply_to_a_full_sender_queue_is_dropped_without_blocking(endpoint: TempEndpoint) {
    let mut channel = DatagramChannel::bind(endpoint.endpoint()).expect("bind");
    let client = bound_datagram_client(&endpoint, "client.sock");
    let handler = EchoHandler::default();

    // The client never reads, so its receive queue fills after a few replies.
    let outcomes: Vec<_> = (0..256)
        .map(|_| {
            client.send_to(b"ping", endpoint.path()).expect("send");
            channel.serve_one(&handler)
        })
        .collect();

    let dropped = outcomes
        .iter()
        .filter(|outcome| {
            matches!(
                outcome,
                Err(TransportError::Send { source }) if source.kind() == io::ErrorKind::WouldBlock
            )
        })
        .count();
    assert!(dropped > 0, "a full sender queue must drop replies");
    assert_eq!(handler.seen.borrow().len(), outcomes.len());
}

#[rstest]
fn seqpacket_answers_one_request_per_connection(endpoint: TempEndpoint) {
    let mut channel = SeqPacketChannel::bind(endpoint.endpoint()).expect("bind");
    let mut client = connect_seqpacket(endpoint.path());
    client.write_all(b"\x00\x01\x02\x03\x04").expect("send");

    let handler = EchoHandler::default();
    assert_eq!(channel.serve_one(&handler).expect("serve"), Served::Handled);

    let mut reply = Vec::new();
    client.read_to_end(&mut reply).expect("reply then close");
    assert_eq!(reply, b">\x00\x01\x02\x03\x04");
}

#[rstest]
fn seqpacket_closes_connection_without_reply_when_handler_is_silent(endpoint: TempEndpoint) {
    let mut channel = SeqPacketChannel::bind(endpoint.endpoint()).expect("bind");
    let mut client = connect_seqpacket(endpoint.path());
    client.write_all(b"junk").expect("send");

    let handler = EchoHandler {
        silent: true,
        ..EchoHandler::default()
    };
    assert_eq!(channel.serve_one(&handler).expect("serve"), Served::Handled);

    let mut reply = Vec::new();
    client.read_to_end(&mut reply).expect("closed");
    assert!(reply.is_empty());
}

#[rstest]
fn seqpacket_ignores_connection_closed_before_sending(endpoint: TempEndpoint) {
    let mut channel = SeqPacketChannel::bind(endpoint.endpoint()).expect("bind");
    drop(connect_seqpacket(endpoint.path()));

    let handler = EchoHandler::default();
    assert_eq!(channel.serve_one(&handler).expect("serve"), Served::Handled);
    assert!(handler.seen.borrow().is_empty());
}

#[rstest]
fn dropping_a_channel_removes_its_socket_file(endpoint: TempEndpoint) {
    let channel = SeqPacketChannel::bind(endpoint.endpoint()).expect("bind");
    assert!(endpoint.path().exists());
    drop(channel);
    assert!(!endpoint.path().exists());

    let datagram = DatagramChannel::bind(endpoint.endpoint()).expect("bind");
    assert_eq!(datagram.path(), endpoint.path());
    drop(datagram);
    assert!(!endpoint.path().exists());
}

#[rstest]
fn stale_socket_files_are_replaced(endpoint: TempEndpoint) {
    drop(UnixDatagram::bind(endpoint.path()).expect("bind stale datagram"));
    assert!(endpoint.path().exists(), "stale socket should remain");
    drop(DatagramChannel::bind(endpoint.endpoint()).expect("replace stale datagram"));

    drop(UnixListener::bind(endpoint.path()).expect("bind stale stream"));
    drop(SeqPacketChannel::bind(endpoint.endpoint()).expect("replace stale socket"));
}

#[rstest]
fn live_sockets_are_not_replaced(endpoint: TempEndpoint) {
    let _live = SeqPacketChannel::bind(endpoint.endpoint()).expect("bind live");
    let error = SeqPacketChannel::bind(endpoint.endpoint()).expect_err("in use");
    assert!(matches!(error, ChannelError::InUse { .. }), "{error}");
}

#[rstest]
fn live_datagram_sockets_are_not_replaced(endpoint: TempEndpoint) {
    let _live = DatagramChannel::bind(endpoint.endpoint()).expect("bind live");
    let error = DatagramChannel::bind(endpoint.endpoint()).expect_err("in use");
    assert!(matches!(error, ChannelError::InUse { .. }), "{error}");
}

#[rstest]
fn regular_files_are_left_alone(endpoint: TempEndpoint) {
    fs::write(endpoint.path(), b"not a socket").expect("write file");

    let error = DatagramChannel::bind(endpoint.endpoint()).expect_err("not a socket");
    assert!(matches!(error, ChannelError::NotSocket { .. }), "{error}");
    assert!(endpoint.path().exists());
}
