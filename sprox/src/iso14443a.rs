// sprox-rs/sprox/src/iso14443a.rs

//! ISO/IEC 14443-A layer 3: request, anticollision cascade, select, halt
//! and raw exchange.
//!
//! Card state machine: IDLE -> (REQA/WUPA) -> READY -> (anticollision) ->
//! READY -> (SELECT) -> ACTIVE -> (HALT) -> HALTED. A halted card answers
//! WUPA only, never REQA.

use crate::protocol::parser;
use crate::reader::{Capabilities, Connected, Reader};
use crate::types::{Atq, Sak, Uid};
use crate::utils::etu_to_ms;
use crate::{Error, Result, constants};

const SEL_COMMANDS: [u8; 3] = [
    constants::PICC_SEL_CL1,
    constants::PICC_SEL_CL2,
    constants::PICC_SEL_CL3,
];

impl Reader<Connected> {
    /// Retry a card operation exactly once when the first attempt fails
    /// with a card-origin error. The very first request after field
    /// activation is sometimes lost by older readers, and anticollision or
    /// select may need one more round after a noisy answer; nothing in
    /// this crate retries more than once.
    pub(crate) fn retry_card_once<T>(
        &mut self,
        mut f: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<T> {
        match f(self) {
            Ok(v) => Ok(v),
            Err(e) if e.is_card_error() => f(self),
            Err(e) => Err(e),
        }
    }

    fn a_request_raw(&mut self, req_code: u8) -> Result<Atq> {
        let resp = self.function(
            constants::CSB_A_REQUEST,
            &[req_code],
            2,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        parser::expect_len(&resp, 2)?;
        Ok(Atq::from_bytes([resp[0], resp[1]]))
    }

    /// WUPA: wake idle and halted cards. Returns the 2-byte ATQ.
    pub fn a_request_any(&mut self) -> Result<Atq> {
        self.retry_card_once(|s| s.a_request_raw(constants::PICC_WUPA))
    }

    /// REQA: address idle cards only. Returns the 2-byte ATQ.
    pub fn a_request_idle(&mut self) -> Result<Atq> {
        self.retry_card_once(|s| s.a_request_raw(constants::PICC_REQA))
    }

    /// One anticollision round at the given cascade level. Returns the
    /// 4 UID bytes of that level after verifying the BCC.
    fn a_anticoll_level(&mut self, sel_cmd: u8) -> Result<[u8; 4]> {
        let resp = self.function(
            constants::CSB_A_ANTICOLL,
            &[sel_cmd],
            5,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        parser::expect_len(&resp, 5)?;
        let bcc = resp[0] ^ resp[1] ^ resp[2] ^ resp[3];
        if bcc != resp[4] {
            return Err(Error::SerNr);
        }
        Ok([resp[0], resp[1], resp[2], resp[3]])
    }

    fn a_select_level(&mut self, sel_cmd: u8, part: &[u8; 4]) -> Result<Sak> {
        let mut params = [0u8; 5];
        params[0] = sel_cmd;
        params[1..].copy_from_slice(part);
        let resp = self.function(
            constants::CSB_A_SELECT,
            &params,
            1,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        parser::expect_len(&resp, 1)?;
        Ok(Sak::new(resp[0]))
    }

    /// Cascade level 1 anticollision. Cards with 7 or 10-byte UIDs answer
    /// a cascade tag here; use [`a_select_any`](Self::a_select_any) to
    /// resolve the full UID.
    pub fn a_anticoll(&mut self) -> Result<[u8; 4]> {
        self.a_anticoll_level(constants::PICC_SEL_CL1)
    }

    /// Select any card in the field, idle or halted.
    pub fn a_select_any(&mut self) -> Result<(Uid, Atq, Sak)> {
        let res = if self.capabilities().has(Capabilities::EMBEDDED_SELECT) {
            self.a_select_embedded(constants::CSB_SELECT_ANY)
        } else {
            self.a_select_host(true)
        }?;
        self.mif_auth_ok = false;
        self.last_a_uid = Some(res.0);
        Ok(res)
    }

    /// Select an idle card; halted cards stay silent.
    pub fn a_select_idle(&mut self) -> Result<(Uid, Atq, Sak)> {
        let res = if self.capabilities().has(Capabilities::EMBEDDED_SELECT) {
            self.a_select_embedded(constants::CSB_SELECT_IDLE)
        } else {
            self.a_select_host(false)
        }?;
        self.mif_auth_ok = false;
        self.last_a_uid = Some(res.0);
        Ok(res)
    }

    /// Device-side request+anticollision+select in a single transaction.
    fn a_select_embedded(&mut self, opcode: u8) -> Result<(Uid, Atq, Sak)> {
        let resp = self.function(opcode, &[], 14, crate::utils::DEFAULT_READ_TIMEOUT_MS)?;
        parser::ensure_len(&resp, 4)?;
        let atq = Atq::from_bytes([resp[0], resp[1]]);
        let sak = Sak::new(resp[2]);
        let uid_len = resp[3] as usize;
        parser::expect_len(&resp, 4 + uid_len)?;
        let uid = Uid::try_from(&resp[4..4 + uid_len])
            .map_err(|_| Error::ResponseInvalid(format!("bad uid length {}", uid_len)))?;
        Ok((uid, atq, sak))
    }

    /// Host-driven request -> anticollision cascade -> select sequence for
    /// firmware without the embedded transaction.
    fn a_select_host(&mut self, wakeup: bool) -> Result<(Uid, Atq, Sak)> {
        let req_code = if wakeup {
            constants::PICC_WUPA
        } else {
            constants::PICC_REQA
        };
        let atq = self.retry_card_once(|s| s.a_request_raw(req_code))?;
        let uid_len = atq.uid_size()?;
        let levels = match uid_len {
            4 => 1,
            7 => 2,
            _ => 3,
        };

        let mut uid_bytes = Vec::with_capacity(uid_len);
        let mut sak = Sak::new(0);
        for level in 0..levels {
            let sel_cmd = SEL_COMMANDS[level];
            let part = self.retry_card_once(|s| s.a_anticoll_level(sel_cmd))?;
            sak = self.retry_card_once(|s| s.a_select_level(sel_cmd, &part))?;

            let last = level + 1 == levels;
            if last {
                if part[0] == constants::PICC_CASCADE_TAG || sak.cascade() {
                    return Err(Error::ResponseInvalid(
                        "cascade continues past announced uid size".into(),
                    ));
                }
                uid_bytes.extend_from_slice(&part);
            } else {
                if part[0] != constants::PICC_CASCADE_TAG || !sak.cascade() {
                    return Err(Error::ResponseInvalid(
                        "cascade ends before announced uid size".into(),
                    ));
                }
                uid_bytes.extend_from_slice(&part[1..]);
            }
        }

        let uid = Uid::try_from(&uid_bytes[..])?;
        Ok((uid, atq, sak))
    }

    /// Reselect a previously known card: the explicit UID, or the
    /// session's remembered one when `None` is passed. Any standing Mifare
    /// authentication is invalidated by a reselect, successful or not.
    pub fn a_select_again(&mut self, uid: Option<&Uid>) -> Result<()> {
        self.mif_auth_ok = false;
        let uid = match uid.or(self.last_a_uid.as_ref()) {
            Some(u) => *u,
            None => {
                return Err(Error::InvalidParameter(
                    "no uid given and no card previously selected".into(),
                ));
            }
        };

        self.a_request_raw(constants::PICC_WUPA)?;
        for (level, part) in uid_cascade_parts(uid.as_bytes()).iter().enumerate() {
            let sak = self.a_select_level(SEL_COMMANDS[level], part)?;
            let last = part[0] != constants::PICC_CASCADE_TAG;
            if last != !sak.cascade() {
                return Err(Error::ResponseInvalid("unexpected cascade bit".into()));
            }
        }

        self.last_a_uid = Some(uid);
        Ok(())
    }

    /// HALT the selected card. The remembered UID survives so the card can
    /// be reselected later; authentication state does not.
    pub fn a_halt(&mut self) -> Result<()> {
        self.function(
            constants::CSB_A_HALT,
            &[],
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        self.mif_auth_ok = false;
        Ok(())
    }

    /// Raw frame exchange with the active card. `timeout_etu` is the card
    /// timeout in elementary time units; `append_crc` asks the reader to
    /// add and verify CRC_A; `recv_max` bounds the answer.
    pub fn a_exchange(
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
            constants::CSB_A_EXCHANGE,
            &params,
            recv_max,
            etu_to_ms(timeout_etu),
        )
    }

    /// Bit-oriented exchange. `param1`/`param2` select non-standard bit
    /// handling (transmitted bit count, parity suppression) as used for
    /// raw anticollision frames.
    pub fn a_exchange_raw_bits(
        &mut self,
        param1: u8,
        param2: u8,
        send: &[u8],
        timeout_etu: u16,
        recv_max: usize,
    ) -> Result<Vec<u8>> {
        self.check_exchange_len(send.len())?;
        let mut params = Vec::with_capacity(4 + send.len());
        params.push(param1);
        params.push(param2);
        params.extend_from_slice(&timeout_etu.to_be_bytes());
        params.extend_from_slice(send);
        self.function(
            constants::CSB_A_EXCHANGE_BITS,
            &params,
            recv_max,
            etu_to_ms(timeout_etu),
        )
    }
}

/// Split a complete UID into the 4-byte chunks sent at each cascade
/// level, inserting cascade tags for 7 and 10-byte UIDs.
fn uid_cascade_parts(uid: &[u8]) -> Vec<[u8; 4]> {
    match uid.len() {
        4 => vec![[uid[0], uid[1], uid[2], uid[3]]],
        7 => vec![
            [constants::PICC_CASCADE_TAG, uid[0], uid[1], uid[2]],
            [uid[3], uid[4], uid[5], uid[6]],
        ],
        _ => vec![
            [constants::PICC_CASCADE_TAG, uid[0], uid[1], uid[2]],
            [constants::PICC_CASCADE_TAG, uid[3], uid[4], uid[5]],
            [uid[6], uid[7], uid[8], uid[9]],
        ],
    }
}
