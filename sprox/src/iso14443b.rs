// sprox-rs/sprox/src/iso14443b.rs

//! ISO/IEC 14443-B layer 3: REQB/WUPB, slotted anticollision, halt and raw
//! exchange. The PUPI takes the role the UID has on the type A side; it is
//! the addressing token for HALTB and for the T=CL ATTRIB that follows.

use crate::protocol::crc::{append, crc_b};
use crate::protocol::parser;
use crate::reader::{Capabilities, Connected, Reader};
use crate::types::{Atqb, Pupi};
use crate::{Error, Result, constants};

/// REQB/WUPB parameter byte: bit 3 selects wake-up, bits 0-2 carry the
/// slot count exponent.
fn reqb_param(wakeup: bool, slot_exp: u8) -> u8 {
    (slot_exp & 0x07) | if wakeup { 0x08 } else { 0x00 }
}

impl Reader<Connected> {
    /// Raw REQB/WUPB round: the host builds the 5-byte command frame
    /// (APf, AFI, PARAM, CRC_B) itself and verifies the 14-byte answer
    /// byte for byte. This is the only request path old firmware has.
    fn b_request_raw(&mut self, afi: u8, wakeup: bool, slot_exp: u8) -> Result<Atqb> {
        let mut cmd = vec![constants::PICC_APF, afi, reqb_param(wakeup, slot_exp)];
        let crc = crc_b(&cmd);
        append(&mut cmd, crc);

        let resp = self.b_exchange(&cmd, constants::DEFAULT_EXCHANGE_TIMEOUT_ETU, false, 16)?;
        decode_raw_atqb(&resp)
    }

    /// WUPB: wake idle and halted cards matching the AFI (0 = all).
    pub fn b_request_any(&mut self, afi: u8) -> Result<Atqb> {
        self.retry_card_once(|s| s.b_request_raw(afi, true, 0))
    }

    /// REQB: address idle cards only.
    pub fn b_request_idle(&mut self, afi: u8) -> Result<Atqb> {
        self.retry_card_once(|s| s.b_request_raw(afi, false, 0))
    }

    /// Select any card in the field, idle or halted. Device-side on recent
    /// firmware, raw WUPB otherwise.
    pub fn b_select_any(&mut self, afi: u8) -> Result<Atqb> {
        let atqb = if self.capabilities().has(Capabilities::B_SELECT) {
            self.b_select_device(constants::CSB_B_SELECT_ANY, afi)
        } else {
            self.retry_card_once(|s| s.b_request_raw(afi, true, 0))
        }?;
        self.last_b_pupi = Some(atqb.pupi());
        Ok(atqb)
    }

    /// Select an idle card; halted cards stay silent.
    pub fn b_select_idle(&mut self, afi: u8) -> Result<Atqb> {
        let atqb = if self.capabilities().has(Capabilities::B_SELECT) {
            self.b_select_device(constants::CSB_B_SELECT_IDLE, afi)
        } else {
            self.retry_card_once(|s| s.b_request_raw(afi, false, 0))
        }?;
        self.last_b_pupi = Some(atqb.pupi());
        Ok(atqb)
    }

    fn b_select_device(&mut self, opcode: u8, afi: u8) -> Result<Atqb> {
        let resp = self.function(opcode, &[afi], 11, crate::utils::DEFAULT_READ_TIMEOUT_MS)?;
        Atqb::try_from(&resp[..])
    }

    /// 16-slot anticollision over any cards (wake-up variant).
    pub fn b_anticoll_any(&mut self, afi: u8) -> Result<Atqb> {
        self.b_anticoll_host(afi, true)
    }

    /// 16-slot anticollision over idle cards.
    pub fn b_anticoll_idle(&mut self, afi: u8) -> Result<Atqb> {
        self.b_anticoll_host(afi, false)
    }

    /// Host-driven slotted anticollision: REQB announcing 16 slots, then
    /// slot markers until one slot holds a single clean answer. Collisions
    /// and silent slots move on to the next slot; anything else aborts.
    fn b_anticoll_host(&mut self, afi: u8, wakeup: bool) -> Result<Atqb> {
        match self.b_request_raw(afi, wakeup, 4) {
            Ok(atqb) => {
                self.last_b_pupi = Some(atqb.pupi());
                return Ok(atqb);
            }
            Err(Error::Collision) | Err(Error::NoTag) => {}
            Err(e) => return Err(e),
        }

        for slot in 2..=16u8 {
            let mut cmd = vec![((slot - 1) << 4) | constants::PICC_APF];
            let crc = crc_b(&cmd);
            append(&mut cmd, crc);

            match self
                .b_exchange(&cmd, constants::DEFAULT_EXCHANGE_TIMEOUT_ETU, false, 16)
                .and_then(|resp| decode_raw_atqb(&resp))
            {
                Ok(atqb) => {
                    self.last_b_pupi = Some(atqb.pupi());
                    return Ok(atqb);
                }
                Err(Error::Collision) | Err(Error::NoTag) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(Error::NoTag)
    }

    /// Probe one explicit time slot. Only recent firmware exposes the
    /// device-side slot command.
    pub fn b_anticoll_slot(&mut self, afi: u8, slot: u8) -> Result<Atqb> {
        self.require(Capabilities::SLOT_ANTICOLL)?;
        if !(1..=16).contains(&slot) {
            return Err(Error::InvalidParameter(format!(
                "slot {} out of range 1..=16",
                slot
            )));
        }
        let resp = self.function(
            constants::CSB_B_ANTICOLL,
            &[afi, slot],
            11,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        let atqb = Atqb::try_from(&resp[..])?;
        self.last_b_pupi = Some(atqb.pupi());
        Ok(atqb)
    }

    /// HALTB addressed to the explicit PUPI, or to the remembered one when
    /// `None` is passed.
    pub fn b_halt(&mut self, pupi: Option<&Pupi>) -> Result<()> {
        let pupi = match pupi.or(self.last_b_pupi.as_ref()) {
            Some(p) => *p,
            None => {
                return Err(Error::InvalidParameter(
                    "no pupi given and no card previously selected".into(),
                ));
            }
        };

        let mut cmd = vec![constants::PICC_HLTB];
        cmd.extend_from_slice(pupi.as_bytes());
        let crc = crc_b(&cmd);
        append(&mut cmd, crc);

        let resp = self.b_exchange(&cmd, constants::DEFAULT_EXCHANGE_TIMEOUT_ETU, false, 8)?;
        // answer is a lone 0x00 plus CRC
        parser::ensure_len(&resp, 1)?;
        if resp[0] != 0x00 {
            return Err(Error::ResponseInvalid(format!(
                "haltb answered {:#04x}",
                resp[0]
            )));
        }
        Ok(())
    }

    /// Raw type B frame exchange with explicit timeout and CRC handling.
    pub fn b_exchange(
        &mut self,
        send: &[u8],
        timeout_etu: u16,
        append_crc: bool,
        recv_max: usize,
    ) -> Result<Vec<u8>> {
        self.check_exchange_len(send.len())?;
        let mut params = Vec::with_capacity(3 + send.len());
        params.push(if append_crc { 0x01 } else { 0x00 });
        params.extend_from_slice(&timeout_etu.to_be_bytes());
        params.extend_from_slice(send);
        self.function(
            constants::CSB_B_EXCHANGE,
            &params,
            recv_max,
            crate::utils::etu_to_ms(timeout_etu),
        )
    }
}

/// Verify a raw 14-byte ATQB answer (0x50, 11 info bytes, CRC_B) and strip
/// it down to the information bytes.
fn decode_raw_atqb(resp: &[u8]) -> Result<Atqb> {
    parser::expect_len(resp, 14)?;
    if resp[0] != constants::PICC_ATQB {
        return Err(Error::ResponseInvalid(format!(
            "atqb starts with {:#04x}",
            resp[0]
        )));
    }
    let crc = crc_b(&resp[..12]);
    if crc.to_le_bytes() != [resp[12], resp[13]] {
        return Err(Error::Crc);
    }
    Atqb::try_from(&resp[1..12])
}
