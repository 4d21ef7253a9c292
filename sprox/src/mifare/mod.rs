// sprox-rs/sprox/src/mifare/mod.rs

//! NXP Mifare Classic on top of the ISO 14443-A layer: the key stores,
//! the multi-key authentication search, block/sector/card data access,
//! value blocks and sector trailers.

pub mod access;
pub(crate) mod auth;
pub mod keystore;
pub mod value;

pub use access::AccessConditions;
pub use keystore::{KeyStore, KeyType, MifareKey, TRANSPORT_KEY};
pub use value::ValueBlock;

use crate::protocol::parser;
use crate::reader::{Capabilities, Connected, Reader};
use crate::types::{BlockData, Uid};
use crate::{Error, Result, constants};

use auth::KeyOrder;

/// Number of sectors covered by the 768-byte bulk operations (a Mifare
/// Classic 1K: 16 sectors of 3 data blocks).
pub const TAG768_SECTORS: u8 = 16;

/// First block number of a sector.
pub(crate) fn first_block(sector: u8) -> u8 {
    if sector < 32 {
        sector * 4
    } else {
        128 + (sector - 32) * 16
    }
}

/// Data blocks in a sector (the trailer not included): 3 below sector 32,
/// 15 above.
pub(crate) fn data_block_count(sector: u8) -> Result<u8> {
    match sector {
        0..=31 => Ok(3),
        32..=39 => Ok(15),
        _ => Err(Error::InvalidParameter(format!(
            "sector {} out of range",
            sector
        ))),
    }
}

/// The sector trailer block. Callers validate the sector number first.
pub(crate) fn trailer_block(sector: u8) -> u8 {
    if sector < 32 {
        first_block(sector) + 3
    } else {
        first_block(sector) + 15
    }
}

impl Reader<Connected> {
    pub(crate) fn mif_read_block_raw(&mut self, block: u8) -> Result<BlockData> {
        let resp = self.function(
            constants::MIF_READ,
            &[block],
            16,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        parser::expect_len(&resp, 16)?;
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&resp);
        Ok(BlockData::from_bytes(bytes))
    }

    pub(crate) fn mif_write_block_raw(&mut self, block: u8, data: &BlockData) -> Result<()> {
        let mut params = Vec::with_capacity(17);
        params.push(block);
        params.extend_from_slice(data.as_bytes());
        self.function(
            constants::MIF_WRITE,
            &params,
            0,
            crate::utils::DEFAULT_READ_TIMEOUT_MS,
        )?;
        Ok(())
    }

    /// Read one block. With `key: None` the stored-key search runs, A
    /// before B per slot; with an explicit key only that key is tried.
    pub fn mif_read_block(
        &mut self,
        uid: Option<&Uid>,
        block: u8,
        key: Option<&MifareKey>,
    ) -> Result<BlockData> {
        self.mif_auth_then_op(uid, block, key, KeyOrder::AThenB, |s| {
            s.mif_read_block_raw(block)
        })
    }

    /// Write one block. The search tries B before A: by convention B is
    /// the write key.
    pub fn mif_write_block(
        &mut self,
        uid: Option<&Uid>,
        block: u8,
        data: &BlockData,
        key: Option<&MifareKey>,
    ) -> Result<()> {
        self.mif_auth_then_op(uid, block, key, KeyOrder::BThenA, |s| {
            s.mif_write_block_raw(block, data)
        })
    }

    /// Read a whole sector's data blocks (the trailer is not included).
    /// Large sectors go through the device-side sector command when the
    /// firmware has it, one authentication for the whole run; otherwise
    /// block by block.
    pub fn mif_read_sector(
        &mut self,
        uid: Option<&Uid>,
        sector: u8,
        key: Option<&MifareKey>,
    ) -> Result<Vec<u8>> {
        let count = data_block_count(sector)?;
        let first = first_block(sector);

        if count == 15 && self.capabilities().has(Capabilities::SECTOR_RW) {
            return self.mif_auth_then_op(uid, first, key, KeyOrder::AThenB, |s| {
                let resp = s.function(
                    constants::MIF_READ_SECTOR,
                    &[sector],
                    usize::from(count) * 16,
                    crate::utils::DEFAULT_READ_TIMEOUT_MS,
                )?;
                parser::expect_len(&resp, usize::from(count) * 16)?;
                Ok(resp)
            });
        }

        let mut out = Vec::with_capacity(usize::from(count) * 16);
        for i in 0..count {
            let data = self.mif_read_block(uid, first + i, key)?;
            out.extend_from_slice(data.as_bytes());
        }
        Ok(out)
    }

    /// Write a whole sector's data blocks. `data` must hold exactly the
    /// sector's data capacity.
    pub fn mif_write_sector(
        &mut self,
        uid: Option<&Uid>,
        sector: u8,
        data: &[u8],
        key: Option<&MifareKey>,
    ) -> Result<()> {
        let count = data_block_count(sector)?;
        let first = first_block(sector);
        if data.len() != usize::from(count) * 16 {
            return Err(Error::InvalidParameter(format!(
                "sector {} takes {} bytes, got {}",
                sector,
                usize::from(count) * 16,
                data.len()
            )));
        }

        if count == 15 && self.capabilities().has(Capabilities::SECTOR_RW) {
            return self.mif_auth_then_op(uid, first, key, KeyOrder::BThenA, |s| {
                let mut params = Vec::with_capacity(1 + data.len());
                params.push(sector);
                params.extend_from_slice(data);
                s.function(
                    constants::MIF_WRITE_SECTOR,
                    &params,
                    0,
                    crate::utils::DEFAULT_READ_TIMEOUT_MS,
                )?;
                Ok(())
            });
        }

        for i in 0..count {
            let mut block = [0u8; 16];
            let offset = usize::from(i) * 16;
            block.copy_from_slice(&data[offset..offset + 16]);
            self.mif_write_block(uid, first + i, &BlockData::from_bytes(block), key)?;
        }
        Ok(())
    }

    /// Read the 768 data bytes of a Mifare Classic 1K. Sectors that fail
    /// authentication are skipped (left zeroed) and reported through the
    /// returned bitmask, bit N for sector N; any harder error aborts the
    /// whole read.
    pub fn mif_read_tag768(
        &mut self,
        uid: Option<&Uid>,
        key: Option<&MifareKey>,
    ) -> Result<(u16, Vec<u8>)> {
        let mut data = vec![0u8; usize::from(TAG768_SECTORS) * 48];
        let mut mask = 0u16;
        for sector in 0..TAG768_SECTORS {
            match self.mif_read_sector(uid, sector, key) {
                Ok(sector_data) => {
                    let offset = usize::from(sector) * 48;
                    data[offset..offset + 48].copy_from_slice(&sector_data);
                    mask |= 1 << sector;
                }
                Err(Error::Auth) | Err(Error::NotAuth) => {
                    log::debug!("sector {} unreadable, skipping", sector);
                }
                Err(e) => return Err(e),
            }
        }
        Ok((mask, data))
    }

    /// Write the 768 data bytes of a Mifare Classic 1K, sector by sector,
    /// with the same skip-on-auth-failure policy as the bulk read. Block 0
    /// is the read-only manufacturer block and is never written. Returns
    /// the per-sector success bitmask.
    pub fn mif_write_tag768(
        &mut self,
        uid: Option<&Uid>,
        data: &[u8],
        key: Option<&MifareKey>,
    ) -> Result<u16> {
        if data.len() != usize::from(TAG768_SECTORS) * 48 {
            return Err(Error::InvalidParameter(format!(
                "tag image takes {} bytes, got {}",
                usize::from(TAG768_SECTORS) * 48,
                data.len()
            )));
        }

        let mut mask = 0u16;
        for sector in 0..TAG768_SECTORS {
            let first = first_block(sector);
            let mut sector_result = Ok(());
            for i in 0..3u8 {
                let block = first + i;
                if block == 0 {
                    continue;
                }
                let offset = usize::from(sector) * 48 + usize::from(i) * 16;
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(&data[offset..offset + 16]);
                sector_result =
                    self.mif_write_block(uid, block, &BlockData::from_bytes(bytes), key);
                if sector_result.is_err() {
                    break;
                }
            }
            match sector_result {
                Ok(()) => mask |= 1 << sector,
                Err(Error::Auth) | Err(Error::NotAuth) => {
                    log::debug!("sector {} unwritable, skipping", sector);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(mask)
    }
}
