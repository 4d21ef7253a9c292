// sprox-rs/sprox/src/tcl.rs

//! T=CL (ISO/IEC 14443-4) engine: ATS, PPS, CID-addressed block exchange
//! and DESELECT. Protocol-independent once a card is layer-3 active on
//! either the A or the B side; chaining is handled by the reader firmware.
//!
//! A T=CL-active card must be DESELECTed before HALT; issuing HALT while
//! T=CL is active is a protocol violation this layer leaves to the caller.

use crate::reader::{Connected, Reader};
use crate::types::{Ats, Pupi};
use crate::{Error, Result, constants};

/// CID value meaning "no CID byte in the block format".
pub const CID_NONE: u8 = 0xFF;

/// Longest ATS a card may legally answer.
const ATS_MAX_LEN: usize = 32;

fn check_cid(cid: u8) -> Result<()> {
    if cid <= 14 || cid == CID_NONE {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!("cid {} out of range", cid)))
    }
}

impl Reader<Connected> {
    /// RATS/ATS for a type A card that announced ISO 14443-4 support. The
    /// parsed ATS is remembered for PPS validation.
    pub fn tcl_get_ats(&mut self, cid: u8) -> Result<Ats> {
        check_cid(cid)?;
        let resp = self.function(
            constants::TCL_GET_ATS,
            &[cid],
            ATS_MAX_LEN,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        let ats = Ats::parse(&resp)?;
        self.last_ats = Some(ats.clone());
        Ok(ats)
    }

    /// PPS baud-rate negotiation. The requested DSI/DRI pair is validated
    /// against the ATS capability bits before anything is transmitted:
    /// some cards silently ignore an unsupported PPS instead of rejecting
    /// it, so sending one would desynchronize the link.
    pub fn tcl_pps(&mut self, cid: u8, dsi: u8, dri: u8) -> Result<()> {
        check_cid(cid)?;
        if dsi > 3 || dri > 3 {
            return Err(Error::InvalidParameter(format!(
                "divisor indexes {}:{} out of range",
                dsi, dri
            )));
        }
        let ats = self.last_ats.as_ref().ok_or_else(|| {
            Error::InvalidParameter("pps requires an ats to validate against".into())
        })?;
        if !ats.supports_rates(dsi, dri) {
            return Err(Error::InvalidParameter(format!(
                "card does not support dsi {} / dri {}",
                dsi, dri
            )));
        }

        self.function(
            constants::TCL_PPS,
            &[cid, dsi, dri],
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        Ok(())
    }

    /// ATTRIB: activate a layer-3 selected type B card into T=CL on
    /// `cid`. Addressed by PUPI, explicit or remembered.
    pub fn tcl_attrib(&mut self, pupi: Option<&Pupi>, cid: u8) -> Result<()> {
        check_cid(cid)?;
        let pupi = match pupi.or(self.last_b_pupi.as_ref()) {
            Some(p) => *p,
            None => {
                return Err(Error::InvalidParameter(
                    "no pupi given and no card previously selected".into(),
                ));
            }
        };

        let mut params = Vec::with_capacity(5);
        params.extend_from_slice(pupi.as_bytes());
        params.push(cid);
        self.function(
            constants::TCL_ATTRIB,
            &params,
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        Ok(())
    }

    /// CID-addressed APDU exchange. Pass [`CID_NONE`] when the card was
    /// activated without a CID.
    pub fn tcl_exchange(&mut self, cid: u8, send: &[u8], recv_max: usize) -> Result<Vec<u8>> {
        check_cid(cid)?;
        self.check_exchange_len(send.len())?;
        let mut params = Vec::with_capacity(1 + send.len());
        params.push(cid);
        params.extend_from_slice(send);
        self.function(
            constants::TCL_EXCHANGE,
            &params,
            recv_max,
            crate::utils::etu_to_ms(constants::DEFAULT_EXCHANGE_TIMEOUT_ETU),
        )
    }

    /// DESELECT the T=CL card, returning it to the halted layer-3 state.
    pub fn tcl_deselect(&mut self, cid: u8) -> Result<()> {
        check_cid(cid)?;
        self.function(
            constants::TCL_DESELECT,
            &[cid],
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        self.last_ats = None;
        Ok(())
    }
}
