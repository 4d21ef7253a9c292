// sprox-rs/sprox/src/protocol/frame.rs

use crate::protocol::checksum::lrc;
use crate::{Error, Result, constants};

/// Host<->reader wire frame helper. Provides encode/decode of both frame
/// directions (binary mode).
///
/// Request:  [STX(1)] [Opcode(1)] [Len BE(2)] [Payload(n)] [LRC(1)]
/// Response: [STX(1)] [Status(1)] [Opcode(1)] [Len BE(2)] [Payload(n)] [LRC(1)]
///
/// The LRC is the XOR of every byte between STX and LRC.
pub struct Frame;

/// A decoded response frame. The status byte is not interpreted here;
/// mapping it to a typed error is the dispatcher's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    pub status: u8,
    pub opcode: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Encode a request frame. Payloads longer than the reader's frame
    /// capacity fail locally, before anything is transmitted.
    pub fn encode_request(opcode: u8, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() > constants::FRAME_CONTENT_SIZE {
            return Err(Error::CommandOverflow {
                limit: constants::FRAME_CONTENT_SIZE,
                actual: payload.len(),
            });
        }

        let mut out = Vec::with_capacity(constants::FRAME_MIN_REQUEST_LEN + payload.len());
        out.push(constants::FRAME_STX);
        out.push(opcode);
        out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out.push(lrc(&out[1..]));
        Ok(out)
    }

    /// Encode a response frame. The reader side of the protocol; used by
    /// tests and the mock transport to fabricate reader answers.
    pub fn encode_response(status: u8, opcode: u8, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() > constants::FRAME_CONTENT_SIZE {
            return Err(Error::CommandOverflow {
                limit: constants::FRAME_CONTENT_SIZE,
                actual: payload.len(),
            });
        }

        let mut out = Vec::with_capacity(constants::FRAME_MIN_RESPONSE_LEN + payload.len());
        out.push(constants::FRAME_STX);
        out.push(status);
        out.push(opcode);
        out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out.push(lrc(&out[1..]));
        Ok(out)
    }

    /// Decode a full response frame.
    pub fn decode_response(raw: &[u8]) -> Result<ResponseFrame> {
        if raw.first() == Some(&constants::FRAME_NAK) {
            return Err(Error::ReceiveNak);
        }
        if raw.len() < constants::FRAME_MIN_RESPONSE_LEN {
            return Err(Error::ResponseInvalid(format!(
                "frame too short ({} bytes)",
                raw.len()
            )));
        }
        if raw[0] != constants::FRAME_STX {
            return Err(Error::ResponseInvalid("invalid stx".into()));
        }

        let declared = u16::from_be_bytes([raw[3], raw[4]]) as usize;
        let required = constants::FRAME_MIN_RESPONSE_LEN + declared;
        if raw.len() != required {
            return Err(Error::ResponseInvalid(format!(
                "declared {} payload bytes, frame is {} bytes",
                declared,
                raw.len()
            )));
        }

        let lrc_actual = raw[raw.len() - 1];
        let lrc_expected = lrc(&raw[1..raw.len() - 1]);
        if lrc_actual != lrc_expected {
            return Err(Error::ChecksumMismatch {
                expected: lrc_expected,
                actual: lrc_actual,
            });
        }

        Ok(ResponseFrame {
            status: raw[1],
            opcode: raw[2],
            payload: raw[5..5 + declared].to_vec(),
        })
    }
}
