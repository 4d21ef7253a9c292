//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize common MockTransport setup so tests across the
//! crate and tests/ directory can reuse the same logic.
#![allow(dead_code)]

use crate::protocol::Frame;
use crate::reader::{Reader, ReaderSession};
use crate::transport::mock::MockTransport;
use crate::{Result, constants};

/// Build a success response frame for the given opcode.
#[doc(hidden)]
pub fn ok_frame(opcode: u8, payload: &[u8]) -> Vec<u8> {
    Frame::encode_response(0x00, opcode, payload).unwrap()
}

/// Build an error response frame carrying a card status byte.
#[doc(hidden)]
pub fn status_frame(status: u8, opcode: u8) -> Vec<u8> {
    Frame::encode_response(status, opcode, &[]).unwrap()
}

/// The firmware answer consumed by `Reader::open`.
#[doc(hidden)]
pub fn firmware_frame(version: u32) -> Vec<u8> {
    ok_frame(constants::FCT_GET_FIRMWARE, &version.to_be_bytes())
}

/// Build a MockTransport pre-seeded with the firmware answer for `version`
/// followed by the given response frames.
#[doc(hidden)]
pub fn mock_with_frames(version: u32, frames: Vec<Vec<u8>>) -> MockTransport {
    let mut mock = MockTransport::new();
    mock.push_response(firmware_frame(version));
    for f in frames {
        mock.push_response(f);
    }
    mock
}

/// Convenience: create an open ReaderSession backed by a MockTransport
/// pre-seeded with the firmware answer and the provided response frames.
#[doc(hidden)]
pub fn session_with(version: u32, frames: Vec<Vec<u8>>) -> Result<ReaderSession> {
    let mock = mock_with_frames(version, frames);
    Reader::new_with_transport(Box::new(mock)).open()
}
