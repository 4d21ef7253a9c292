// sprox-rs/sprox/src/reader/dispatch.rs

//! The transport function dispatcher: every reader function is one opcode
//! plus a parameter payload, and every call is one synchronous frame
//! round trip. This is the single place the crate performs blocking I/O;
//! everything above it is pure protocol state logic.

use crate::protocol::Frame;
use crate::transport::Transport;
use crate::{Error, Result};

use super::session::{Connected, Reader};

/// One request/response round trip over an arbitrary transport. The
/// request carries the caller's receive limit so the reader can bound its
/// answer; a longer answer is rejected host-side as `ResponseOverflow`
/// without handing the caller any bytes.
pub(crate) fn roundtrip(
    transport: &mut dyn Transport,
    opcode: u8,
    send: &[u8],
    recv_max: usize,
    timeout_ms: u64,
) -> Result<Vec<u8>> {
    let mut params = Vec::with_capacity(2 + send.len());
    params.extend_from_slice(&(recv_max.min(usize::from(u16::MAX)) as u16).to_be_bytes());
    params.extend_from_slice(send);

    let frame = Frame::encode_request(opcode, &params)?;
    log::trace!(
        "> {:#04x} {}",
        opcode,
        crate::utils::bytes_to_hex_spaced(send)
    );
    transport.send(&frame)?;

    let raw = transport.receive(timeout_ms)?;
    let resp = Frame::decode_response(&raw)?;

    if resp.opcode != opcode {
        return Err(Error::ResponseInvalid(format!(
            "opcode echo {:#04x} does not match {:#04x}",
            resp.opcode, opcode
        )));
    }
    if resp.status != 0 {
        let err = Error::from_card_status(resp.status);
        log::trace!("< status {:#04x} -> {}", resp.status, err);
        return Err(err);
    }
    if resp.payload.len() > recv_max {
        return Err(Error::ResponseOverflow {
            expected: recv_max,
            actual: resp.payload.len(),
        });
    }

    log::trace!("< {}", crate::utils::bytes_to_hex_spaced(&resp.payload));
    Ok(resp.payload)
}

impl Reader<Connected> {
    /// Execute one reader function: opcode in, response payload out.
    pub fn function(
        &mut self,
        opcode: u8,
        send: &[u8],
        recv_max: usize,
        timeout_ms: u64,
    ) -> Result<Vec<u8>> {
        roundtrip(&mut *self.transport, opcode, send, recv_max, timeout_ms)
    }
}
