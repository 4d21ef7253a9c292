// fixtures.rs — shared transports and frame builders for integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sprox::constants;
use sprox::protocol::Frame;
use sprox::reader::{Reader, ReaderSession};
use sprox::transport::mock::MockTransport;
use sprox::transport::traits::Transport;

pub fn ok_frame(opcode: u8, payload: &[u8]) -> Vec<u8> {
    Frame::encode_response(0x00, opcode, payload).unwrap()
}

pub fn status_frame(status: u8, opcode: u8) -> Vec<u8> {
    Frame::encode_response(status, opcode, &[]).unwrap()
}

pub fn firmware_frame(version: u32) -> Vec<u8> {
    ok_frame(constants::FCT_GET_FIRMWARE, &version.to_be_bytes())
}

/// A transport wrapper delegating into an `Rc<RefCell<MockTransport>>` so
/// tests can keep inspecting sent frames after the session owns the
/// transport.
pub struct SharedTransport {
    inner: Rc<RefCell<MockTransport>>,
}

impl Transport for SharedTransport {
    fn send(&mut self, data: &[u8]) -> sprox::Result<()> {
        self.inner.borrow_mut().send(data)
    }

    fn receive(&mut self, timeout_ms: u64) -> sprox::Result<Vec<u8>> {
        self.inner.borrow_mut().receive(timeout_ms)
    }

    fn reset(&mut self) -> sprox::Result<()> {
        self.inner.borrow_mut().reset()
    }
}

/// Open a session over a shared mock seeded with the firmware answer and
/// the given frames; returns the session plus the mock handle.
pub fn shared_session(
    version: u32,
    frames: Vec<Vec<u8>>,
) -> (ReaderSession, Rc<RefCell<MockTransport>>) {
    let inner = Rc::new(RefCell::new(MockTransport::new()));
    inner.borrow_mut().push_response(firmware_frame(version));
    for f in frames {
        inner.borrow_mut().push_response(f);
    }

    let transport = SharedTransport {
        inner: inner.clone(),
    };
    let session = Reader::new_with_transport(Box::new(transport))
        .open()
        .unwrap();
    (session, inner)
}

/// Open a plain mock-backed session.
pub fn session(version: u32, frames: Vec<Vec<u8>>) -> ReaderSession {
    let mut mock = MockTransport::new();
    mock.push_response(firmware_frame(version));
    for f in frames {
        mock.push_response(f);
    }
    Reader::new_with_transport(Box::new(mock)).open().unwrap()
}

/// The payload a reader answers to an embedded select-any call.
pub fn a_select_payload(atq: [u8; 2], sak: u8, uid: &[u8]) -> Vec<u8> {
    let mut p = vec![atq[0], atq[1], sak, uid.len() as u8];
    p.extend_from_slice(uid);
    p
}

/// Request frames for one host-driven reselect of a 4-byte UID card.
pub fn reselect_frames() -> Vec<Vec<u8>> {
    vec![
        ok_frame(constants::CSB_A_REQUEST, &[0x04, 0x00]),
        ok_frame(constants::CSB_A_SELECT, &[0x08]),
    ]
}

/// An ISO 15693 tag answer carried inside the reader exchange opcode.
pub fn tag15693_ok(payload: &[u8]) -> Vec<u8> {
    let mut resp = vec![0x00];
    resp.extend_from_slice(payload);
    ok_frame(constants::V3_EXCHANGE, &resp)
}

/// Extract the parameter bytes (after the receive limit) of a sent
/// request frame for the given opcode, in order of transmission.
pub fn sent_params(mock: &Rc<RefCell<MockTransport>>, opcode: u8) -> Vec<Vec<u8>> {
    mock.borrow()
        .sent
        .iter()
        .filter(|f| f.len() > 6 && f[1] == opcode)
        .map(|f| f[6..f.len() - 1].to_vec())
        .collect()
}
