// sprox-rs/sprox/src/iso15693/mod.rs

//! ISO/IEC 15693 vicinity tags: inventory/select, block read/write/lock in
//! both the standard (1-byte) and extended (2-byte) address encodings, and
//! system information.
//!
//! Tag state machine: IDLE -> select -> SELECTED -> data operations ->
//! halt. Every data operation optionally takes an explicit UID; when one
//! is given the layer reselects that tag first and then addresses it in
//! the command frame, at the cost of a doubled round trip versus passing
//! `None` for the already-selected tag.

pub mod icode1;

use crate::protocol::parser;
use crate::reader::{Connected, Reader};
use crate::types::Uid15693;
use crate::{Error, Result, constants};

/// Decoded GetSystemInformation answer. Every field after the UID is
/// optional; presence is gated bit-by-bit by the leading info-flags byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub uid: Uid15693,
    pub dsfid: Option<u8>,
    pub afi: Option<u8>,
    /// Highest block number, as transmitted (a tag with 28 blocks reports 27).
    pub block_count: Option<u16>,
    /// Block size in bytes, already decoded from the size-minus-one field.
    pub block_size: Option<u8>,
    pub ic_reference: Option<u8>,
}

impl Reader<Connected> {
    /// Inventory+select any tag matching the AFI (0 = all families).
    pub fn iso15693_select_any(&mut self, afi: u8) -> Result<Uid15693> {
        let resp = self.function(
            constants::V3_SELECT_ANY,
            &[afi],
            8,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        let uid = Uid15693::try_from(&resp[..])?;
        self.last_15693_uid = Some(uid);
        Ok(uid)
    }

    /// Select a specific tag: the explicit UID, or the remembered one when
    /// `None` is passed.
    pub fn iso15693_select_again(&mut self, uid: Option<&Uid15693>) -> Result<()> {
        let uid = match uid.or(self.last_15693_uid.as_ref()) {
            Some(u) => *u,
            None => {
                return Err(Error::InvalidParameter(
                    "no uid given and no tag previously selected".into(),
                ));
            }
        };

        self.iso15693_exchange_std_command(
            Some(&uid),
            constants::V3_CMD_SELECT,
            &[],
            false,
            4,
        )?;
        self.last_15693_uid = Some(uid);
        Ok(())
    }

    /// Put the selected tag into the quiet state.
    pub fn iso15693_halt(&mut self) -> Result<()> {
        self.function(
            constants::V3_HALT,
            &[],
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        Ok(())
    }

    /// Raw ISO 15693 frame exchange. With `append_crc` the reader appends
    /// and verifies the CRC; otherwise the caller owns the trailing bytes.
    pub fn iso15693_exchange(
        &mut self,
        send: &[u8],
        append_crc: bool,
        recv_max: usize,
    ) -> Result<Vec<u8>> {
        self.check_exchange_len(send.len())?;
        let mut params = Vec::with_capacity(1 + send.len());
        params.push(if append_crc { 0x01 } else { 0x00 });
        params.extend_from_slice(send);
        self.function(
            constants::V3_EXCHANGE,
            &params,
            recv_max,
            crate::utils::etu_to_ms(constants::DEFAULT_EXCHANGE_TIMEOUT_ETU),
        )
    }

    /// Build and run one standard command frame: request flags, command,
    /// optional UID, parameters. The UID travels least-significant byte
    /// first on the wire, reversed from its canonical form; the reader
    /// handles the CRC. Returns the answer with the response-flags byte
    /// stripped, after mapping a tag-reported error.
    pub fn iso15693_exchange_std_command(
        &mut self,
        uid: Option<&Uid15693>,
        command: u8,
        params: &[u8],
        extended: bool,
        recv_max: usize,
    ) -> Result<Vec<u8>> {
        let mut flags = constants::V3_FLAG_HIGH_RATE;
        if uid.is_some() {
            flags |= constants::V3_FLAG_ADDRESS;
        }
        if extended {
            flags |= constants::V3_FLAG_PROT_EXT;
        }

        let mut frame = Vec::with_capacity(2 + 8 + params.len());
        frame.push(flags);
        frame.push(command);
        if let Some(uid) = uid {
            frame.extend(uid.as_bytes().iter().rev());
        }
        frame.extend_from_slice(params);

        let resp = self.iso15693_exchange(&frame, true, recv_max + 1)?;
        decode_tag_response(&resp)
    }

    /// Custom/manufacturer command frame: like the standard form but with
    /// the IC manufacturer code between command and UID.
    pub fn iso15693_exchange_custom_command(
        &mut self,
        uid: Option<&Uid15693>,
        command: u8,
        mfg_code: u8,
        params: &[u8],
        recv_max: usize,
    ) -> Result<Vec<u8>> {
        let mut flags = constants::V3_FLAG_HIGH_RATE;
        if uid.is_some() {
            flags |= constants::V3_FLAG_ADDRESS;
        }

        let mut frame = Vec::with_capacity(3 + 8 + params.len());
        frame.push(flags);
        frame.push(command);
        frame.push(mfg_code);
        if let Some(uid) = uid {
            frame.extend(uid.as_bytes().iter().rev());
        }
        frame.extend_from_slice(params);

        let resp = self.iso15693_exchange(&frame, true, recv_max + 1)?;
        decode_tag_response(&resp)
    }

    /// Shared read path. `extended` selects the 2-byte address/count
    /// encoding; the standard encoding rejects addresses past 0xFF
    /// locally.
    fn iso15693_read_proc(
        &mut self,
        extended: bool,
        uid: Option<&Uid15693>,
        first_block: u16,
        count: u16,
    ) -> Result<Vec<u8>> {
        if count == 0 {
            return Err(Error::InvalidParameter("read of zero blocks".into()));
        }
        let uid = self.iso15693_implicit_select(uid)?;

        let single = count == 1;
        let mut params = Vec::with_capacity(4);
        let command = if extended {
            params.extend_from_slice(&first_block.to_le_bytes());
            if single {
                constants::V3_CMD_EXT_READ_SINGLE
            } else {
                params.extend_from_slice(&(count - 1).to_le_bytes());
                constants::V3_CMD_EXT_READ_MULTIPLE
            }
        } else {
            check_std_range(first_block, count)?;
            params.push(first_block as u8);
            if single {
                constants::V3_CMD_READ_SINGLE
            } else {
                params.push((count - 1) as u8);
                constants::V3_CMD_READ_MULTIPLE
            }
        };

        self.iso15693_exchange_std_command(
            uid.as_ref(),
            command,
            &params,
            extended,
            usize::from(count) * 32,
        )
    }

    /// Shared write path.
    fn iso15693_write_proc(
        &mut self,
        extended: bool,
        uid: Option<&Uid15693>,
        first_block: u16,
        count: u16,
        data: &[u8],
    ) -> Result<()> {
        if count == 0 || data.is_empty() {
            return Err(Error::InvalidParameter("write of zero blocks".into()));
        }
        if data.len() % usize::from(count) != 0 {
            return Err(Error::InvalidParameter(format!(
                "{} data bytes do not divide into {} blocks",
                data.len(),
                count
            )));
        }
        let uid = self.iso15693_implicit_select(uid)?;

        let single = count == 1;
        let mut params = Vec::with_capacity(4 + data.len());
        let command = if extended {
            params.extend_from_slice(&first_block.to_le_bytes());
            if single {
                constants::V3_CMD_EXT_WRITE_SINGLE
            } else {
                params.extend_from_slice(&(count - 1).to_le_bytes());
                constants::V3_CMD_EXT_WRITE_MULTIPLE
            }
        } else {
            check_std_range(first_block, count)?;
            params.push(first_block as u8);
            if single {
                constants::V3_CMD_WRITE_SINGLE
            } else {
                params.push((count - 1) as u8);
                constants::V3_CMD_WRITE_MULTIPLE
            }
        };
        params.extend_from_slice(data);

        self.iso15693_exchange_std_command(uid.as_ref(), command, &params, extended, 4)?;
        Ok(())
    }

    /// Shared lock path.
    fn iso15693_lock_proc(
        &mut self,
        extended: bool,
        uid: Option<&Uid15693>,
        block: u16,
    ) -> Result<()> {
        let uid = self.iso15693_implicit_select(uid)?;

        let mut params = Vec::with_capacity(2);
        let command = if extended {
            params.extend_from_slice(&block.to_le_bytes());
            constants::V3_CMD_EXT_LOCK
        } else {
            check_std_range(block, 1)?;
            params.push(block as u8);
            constants::V3_CMD_LOCK
        };

        self.iso15693_exchange_std_command(uid.as_ref(), command, &params, extended, 4)?;
        Ok(())
    }

    /// The implicit reselect performed when a data operation names an
    /// explicit tag. A select failure short-circuits the data operation.
    fn iso15693_implicit_select(&mut self, uid: Option<&Uid15693>) -> Result<Option<Uid15693>> {
        match uid {
            Some(u) => {
                let u = *u;
                self.iso15693_select_again(Some(&u))?;
                Ok(Some(u))
            }
            None => Ok(None),
        }
    }

    /// Read one block (standard 1-byte addressing).
    pub fn iso15693_read_single_block(
        &mut self,
        uid: Option<&Uid15693>,
        block: u8,
    ) -> Result<Vec<u8>> {
        self.iso15693_read_proc(false, uid, u16::from(block), 1)
    }

    /// Read one block (extended 2-byte addressing).
    pub fn iso15693_extended_read_single_block(
        &mut self,
        uid: Option<&Uid15693>,
        block: u16,
    ) -> Result<Vec<u8>> {
        self.iso15693_read_proc(true, uid, block, 1)
    }

    /// Read a run of blocks (standard addressing).
    pub fn iso15693_read_multiple_blocks(
        &mut self,
        uid: Option<&Uid15693>,
        first_block: u8,
        count: u16,
    ) -> Result<Vec<u8>> {
        self.iso15693_read_proc(false, uid, u16::from(first_block), count)
    }

    /// Read a run of blocks (extended addressing).
    pub fn iso15693_extended_read_multiple_blocks(
        &mut self,
        uid: Option<&Uid15693>,
        first_block: u16,
        count: u16,
    ) -> Result<Vec<u8>> {
        self.iso15693_read_proc(true, uid, first_block, count)
    }

    /// Write one block (standard addressing).
    pub fn iso15693_write_single_block(
        &mut self,
        uid: Option<&Uid15693>,
        block: u8,
        data: &[u8],
    ) -> Result<()> {
        self.iso15693_write_proc(false, uid, u16::from(block), 1, data)
    }

    /// Write one block (extended addressing).
    pub fn iso15693_extended_write_single_block(
        &mut self,
        uid: Option<&Uid15693>,
        block: u16,
        data: &[u8],
    ) -> Result<()> {
        self.iso15693_write_proc(true, uid, block, 1, data)
    }

    /// Write a run of blocks (standard addressing). `data` holds the
    /// concatenated block contents.
    pub fn iso15693_write_multiple_blocks(
        &mut self,
        uid: Option<&Uid15693>,
        first_block: u8,
        count: u16,
        data: &[u8],
    ) -> Result<()> {
        self.iso15693_write_proc(false, uid, u16::from(first_block), count, data)
    }

    /// Write a run of blocks (extended addressing).
    pub fn iso15693_extended_write_multiple_blocks(
        &mut self,
        uid: Option<&Uid15693>,
        first_block: u16,
        count: u16,
        data: &[u8],
    ) -> Result<()> {
        self.iso15693_write_proc(true, uid, first_block, count, data)
    }

    /// Permanently lock one block (standard addressing).
    pub fn iso15693_lock_block(&mut self, uid: Option<&Uid15693>, block: u8) -> Result<()> {
        self.iso15693_lock_proc(false, uid, u16::from(block))
    }

    /// Permanently lock one block (extended addressing).
    pub fn iso15693_extended_lock_block(
        &mut self,
        uid: Option<&Uid15693>,
        block: u16,
    ) -> Result<()> {
        self.iso15693_lock_proc(true, uid, block)
    }

    /// GetSystemInformation (standard form).
    pub fn iso15693_get_system_information(
        &mut self,
        uid: Option<&Uid15693>,
    ) -> Result<SystemInfo> {
        self.iso15693_sysinfo_proc(false, uid)
    }

    /// GetSystemInformation (extended form, 2-byte block count).
    pub fn iso15693_extended_get_system_information(
        &mut self,
        uid: Option<&Uid15693>,
    ) -> Result<SystemInfo> {
        self.iso15693_sysinfo_proc(true, uid)
    }

    fn iso15693_sysinfo_proc(
        &mut self,
        extended: bool,
        uid: Option<&Uid15693>,
    ) -> Result<SystemInfo> {
        let uid = self.iso15693_implicit_select(uid)?;
        let command = if extended {
            constants::V3_CMD_EXT_GET_SYSTEM_INFO
        } else {
            constants::V3_CMD_GET_SYSTEM_INFO
        };
        let resp = self.iso15693_exchange_std_command(uid.as_ref(), command, &[], extended, 32)?;
        decode_system_info(&resp, extended)
    }
}

/// Map a tag answer: response flags with bit 0 set carry an error code in
/// the next byte; otherwise the payload follows the flags byte.
fn decode_tag_response(resp: &[u8]) -> Result<Vec<u8>> {
    let flags = parser::byte_at(resp, 0)?;
    if flags & 0x01 != 0 {
        let code = parser::byte_at(resp, 1).unwrap_or(0);
        log::debug!("tag reported error {:#04x}", code);
        return Err(Error::CodeError);
    }
    Ok(resp[1..].to_vec())
}

/// Decode the variable-structure GetSystemInformation payload. Each bit of
/// the leading info-flags byte gates the presence of the matching field.
fn decode_system_info(payload: &[u8], extended: bool) -> Result<SystemInfo> {
    let info_flags = parser::byte_at(payload, 0)?;
    let uid_wire = parser::slice_at(payload, 1, 8)?;
    let canonical: Vec<u8> = uid_wire.iter().rev().copied().collect();
    let uid = Uid15693::try_from(&canonical[..])?;
    let mut idx = 9usize;

    let dsfid = if info_flags & 0x01 != 0 {
        let b = parser::byte_at(payload, idx)?;
        idx += 1;
        Some(b)
    } else {
        None
    };
    let afi = if info_flags & 0x02 != 0 {
        let b = parser::byte_at(payload, idx)?;
        idx += 1;
        Some(b)
    } else {
        None
    };
    let (block_count, block_size) = if info_flags & 0x04 != 0 {
        let count = if extended {
            let c = u16::from_le_bytes([
                parser::byte_at(payload, idx)?,
                parser::byte_at(payload, idx + 1)?,
            ]);
            idx += 2;
            c
        } else {
            let c = u16::from(parser::byte_at(payload, idx)?);
            idx += 1;
            c
        };
        let size = (parser::byte_at(payload, idx)? & 0x1F) + 1;
        idx += 1;
        (Some(count), Some(size))
    } else {
        (None, None)
    };
    let ic_reference = if info_flags & 0x08 != 0 {
        Some(parser::byte_at(payload, idx)?)
    } else {
        None
    };

    Ok(SystemInfo {
        uid,
        dsfid,
        afi,
        block_count,
        block_size,
        ic_reference,
    })
}

fn check_std_range(first_block: u16, count: u16) -> Result<()> {
    if first_block > 0xFF || first_block + (count - 1) > 0xFF {
        return Err(Error::InvalidParameter(format!(
            "block range {}..{} needs extended addressing",
            first_block,
            first_block + count - 1
        )));
    }
    Ok(())
}
