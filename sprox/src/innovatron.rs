// sprox-rs/sprox/src/innovatron.rs

//! Innovatron ("B prime") activation for legacy Calypso transit cards: a
//! parallel, pre-ISO activation path that shares only the block exchange
//! machinery with ISO 14443-4.
//!
//! Only Calypso-enabled reader SKUs implement these opcodes; on other
//! hardware the reader reports an ordinary command failure rather than a
//! distinct precondition error, and this layer passes that through.

use crate::protocol::parser;
use crate::reader::{Connected, Reader};
use crate::{Result, constants};

/// Innovatron cards are always addressed with this fixed CID once active.
pub const BI_CID: u8 = 0xFC;

/// Longest proprietary ATR an APGEN may answer.
const ATR_MAX_LEN: usize = 32;

impl Reader<Connected> {
    /// APGEN: combined request+select. Returns the 4-byte UID and the
    /// card's proprietary ATR.
    pub fn bi_apgen(&mut self) -> Result<([u8; 4], Vec<u8>)> {
        let resp = self.function(
            constants::BI_APGEN,
            &[],
            4 + ATR_MAX_LEN,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        parser::ensure_len(&resp, 4)?;
        let mut uid = [0u8; 4];
        uid.copy_from_slice(&resp[..4]);
        let atr = resp[4..].to_vec();
        Ok((uid, atr))
    }

    /// ATTRIB: activate the card with the given UID into the
    /// exchange-ready state on CID 0xFC.
    pub fn bi_attrib(&mut self, uid: &[u8; 4]) -> Result<()> {
        self.function(
            constants::BI_ATTRIB,
            uid,
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        Ok(())
    }

    /// COM_R/RR block exchange with the active Innovatron card.
    pub fn bi_exchange(&mut self, send: &[u8], recv_max: usize) -> Result<Vec<u8>> {
        self.tcl_exchange(BI_CID, send, recv_max)
    }

    /// DISC: release the card.
    pub fn bi_disc(&mut self) -> Result<()> {
        self.tcl_deselect(BI_CID)
    }
}
