// sprox-rs/sprox/src/iso15693/icode1.rs

//! Philips ICODE1 tags: the pre-standard cousin of ISO 15693. Selection
//! and UID bookkeeping follow the same pattern as the standard layer, but
//! the command set is the reader's own and there is no multi-block write.

use crate::reader::{Connected, Reader};
use crate::types::Uid15693;
use crate::{Error, Result, constants};

/// ICODE1 blocks are always 4 bytes.
pub const I1_BLOCK_SIZE: usize = 4;

impl Reader<Connected> {
    /// Select any ICODE1 tag in the field.
    pub fn i1_select_any(&mut self) -> Result<Uid15693> {
        let resp = self.function(
            constants::I1_SELECT_ANY,
            &[],
            8,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        let uid = Uid15693::try_from(&resp[..])?;
        self.last_i1_uid = Some(uid);
        Ok(uid)
    }

    /// Read `count` consecutive 4-byte blocks starting at `first_block`.
    pub fn i1_read_blocks(&mut self, first_block: u8, count: u8) -> Result<Vec<u8>> {
        if count == 0 {
            return Err(Error::InvalidParameter("read of zero blocks".into()));
        }
        let resp = self.function(
            constants::I1_READ,
            &[first_block, count],
            usize::from(count) * I1_BLOCK_SIZE,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        if resp.len() != usize::from(count) * I1_BLOCK_SIZE {
            return Err(Error::ResponseInvalid(format!(
                "expected {} block bytes, got {}",
                usize::from(count) * I1_BLOCK_SIZE,
                resp.len()
            )));
        }
        Ok(resp)
    }

    /// Write one 4-byte block.
    pub fn i1_write_block(&mut self, block: u8, data: &[u8; 4]) -> Result<()> {
        let mut params = Vec::with_capacity(1 + I1_BLOCK_SIZE);
        params.push(block);
        params.extend_from_slice(data);
        self.function(
            constants::I1_WRITE,
            &params,
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        Ok(())
    }

    /// ICODE1 has no documented multi-block write.
    pub fn i1_write_multiple_blocks(
        &mut self,
        _first_block: u8,
        _count: u8,
        _data: &[u8],
    ) -> Result<()> {
        Err(Error::UnknownFunction)
    }
}
